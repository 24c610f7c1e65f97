//! 剪贴板监控模块
//!
//! # 设计思路
//!
//! 在后台线程以固定间隔轮询系统剪贴板，把新的文本内容推入历史存储。
//! 单次轮询失败（剪贴板被占用、持有非文本内容等）只跳过本拍，
//! 绝不终止进程；只有"打开剪贴板句柄"连续失败才指数退避后重建句柄。
//!
//! # 实现思路
//!
//! - 轮询间隔钳制到安全区间，配置异常不会导致忙轮询。
//! - 线程内记录上一次看到的内容，避免每拍都去打存储的锁；
//!   相邻重复的最终去重仍由存储的 `add_item` 保证。
//! - 停止通过 `AtomicBool` 标志协作完成，`MonitorHandle` 负责 join。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::clipboard::SystemClipboard;
use crate::history::HistoryStore;

const POLL_INTERVAL_DEFAULT_MS: u64 = 500;
const POLL_INTERVAL_MIN_MS: u64 = 100;
const POLL_INTERVAL_MAX_MS: u64 = 10_000;
const REOPEN_BASE_DELAY_MS: u64 = 100;
const REOPEN_MAX_DELAY_MS: u64 = 5_000;

fn normalize_poll_interval_ms(value_ms: u64) -> u64 {
    if value_ms == 0 {
        return POLL_INTERVAL_DEFAULT_MS;
    }
    value_ms.clamp(POLL_INTERVAL_MIN_MS, POLL_INTERVAL_MAX_MS)
}

fn compute_reopen_backoff_ms(attempt: u32) -> u64 {
    let exp = 1_u64 << attempt.saturating_sub(1).min(6);
    REOPEN_BASE_DELAY_MS
        .saturating_mul(exp)
        .min(REOPEN_MAX_DELAY_MS)
}

/// 后台监控线程的控制句柄
pub struct MonitorHandle {
    stop_flag: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl MonitorHandle {
    /// 请求停止并等待线程退出
    pub fn stop(mut self) {
        self.stop_flag.store(true, Ordering::SeqCst);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }

    /// 阻塞到监控线程退出（正常情况下永不返回，用于 `clipstack monitor`）
    pub fn join(mut self) {
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

/// 在后台线程启动剪贴板轮询监控
///
/// # 参数
/// * `store` - 捕获内容写入的历史存储
/// * `poll_interval_ms` - 轮询间隔，自动钳制到 [100ms, 10s]
pub fn start_monitoring(store: Arc<HistoryStore>, poll_interval_ms: u64) -> MonitorHandle {
    let interval = Duration::from_millis(normalize_poll_interval_ms(poll_interval_ms));
    let stop_flag = Arc::new(AtomicBool::new(false));
    let thread_stop = Arc::clone(&stop_flag);

    let thread = thread::spawn(move || {
        log::info!("📋 剪贴板监控已启动，轮询间隔 {}ms", interval.as_millis());
        let mut clipboard: Option<SystemClipboard> = None;
        let mut last_seen: Option<String> = None;
        let mut reopen_attempt: u32 = 0;

        while !thread_stop.load(Ordering::SeqCst) {
            if clipboard.is_none() {
                match SystemClipboard::new() {
                    Ok(handle) => {
                        reopen_attempt = 0;
                        clipboard = Some(handle);
                    }
                    Err(err) => {
                        reopen_attempt = reopen_attempt.saturating_add(1);
                        let backoff_ms = compute_reopen_backoff_ms(reopen_attempt);
                        log::warn!(
                            "📋 打开剪贴板失败，{backoff_ms}ms 后重试（attempt={reopen_attempt}）: {err}"
                        );
                        thread::sleep(Duration::from_millis(backoff_ms));
                        continue;
                    }
                }
            }

            if let Some(handle) = clipboard.as_mut() {
                match handle.get_text() {
                    Ok(text) => {
                        let changed = last_seen.as_deref() != Some(text.as_str());
                        if changed && !text.trim().is_empty() {
                            if let Err(err) = store.add_item(&text, None) {
                                log::error!("📋 保存捕获内容失败: {err}");
                            }
                        }
                        if changed {
                            last_seen = Some(text);
                        }
                    }
                    Err(err) => {
                        // 非文本内容或瞬时读取失败，跳过本拍
                        log::debug!("📋 本拍读取跳过: {err}");
                    }
                }
            }

            thread::sleep(interval);
        }
        log::info!("📋 剪贴板监控已停止");
    });

    MonitorHandle {
        stop_flag,
        thread: Some(thread),
    }
}
