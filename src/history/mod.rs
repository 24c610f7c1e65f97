//! 历史存储模块
//!
//! # 设计思路
//!
//! 将有界、可持久化的剪贴板历史集中到一个存储实例中，上层（CLI、监控线程）
//! 通过显式句柄访问，不存在进程级可变单例。
//!
//! # 优势
//!
//! - **类型安全**：Rust struct + serde，编译期保证数据结构正确
//! - **一致性**：单一写入者，所有变更串行通过一把锁
//! - **持久性**：每次变更先落盘再返回，失败则回滚内存状态
//! - **可维护性**：数据模型、变更操作、文件格式各归一个子模块

use std::collections::BTreeMap;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::classifier::ContentType;
use crate::error::AppError;

mod persist;
mod store;

pub use persist::FORMAT_VERSION;

// ============================================================================
// 数据模型
// ============================================================================

/// 一次剪贴板捕获及其派生元数据
///
/// 创建后不可变：内容变化时替换整个条目，而不是原地修改，
/// 因此 `length`/`line_count`/`word_count` 永远与 `content` 一致。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipboardItem {
    pub content: String,
    /// 捕获时间，Unix 秒（浮点），在插入顺序上单调不减
    pub timestamp: f64,
    pub content_type: ContentType,
    /// `content` 的字符数
    pub length: usize,
    /// 换行符分隔的段数（≥1）
    pub line_count: usize,
    /// 空白分隔的词数
    pub word_count: usize,
}

impl ClipboardItem {
    /// 根据内容计算全部派生元数据
    pub fn new(content: impl Into<String>, timestamp: f64, content_type: ContentType) -> Self {
        let content = content.into();
        let length = content.chars().count();
        let line_count = content.split('\n').count();
        let word_count = content.split_whitespace().count();
        Self {
            content,
            timestamp,
            content_type,
            length,
            line_count,
            word_count,
        }
    }
}

/// 历史聚合统计，每次调用基于当前快照重新计算，永不缓存
#[derive(Debug, Clone, Serialize)]
pub struct HistoryStats {
    pub total_items: usize,
    /// 类型标签 → 条目数
    pub content_types: BTreeMap<String, usize>,
    pub total_characters: usize,
    pub total_words: usize,
    pub total_lines: usize,
    pub average_length: f64,
}

/// 启动加载的结果报告
///
/// 损坏的历史文件不会让加载失败，调用方通过此报告获知降级情况。
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    /// 整个文件不可读/不可解析/版本不受支持，存储以空历史启动
    pub corrupt: bool,
    /// 缺少必需字段而被跳过的记录数
    pub skipped_records: usize,
}

impl LoadReport {
    pub fn has_warnings(&self) -> bool {
        self.corrupt || self.skipped_records > 0
    }
}

// ============================================================================
// 存储配置与状态
// ============================================================================

/// 存储消费的配置子集
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub storage_path: std::path::PathBuf,
    /// 容量上限，超出时淘汰最旧条目（≥1）
    pub max_history: usize,
    pub long_text_threshold: usize,
}

/// 历史存储：有序、有界、持久化的条目序列
///
/// 内部顺序为最旧在前、最新在后（"最近 = 最高索引"）。
/// 所有操作都在同一把锁内完成，后台监控线程与前台 CLI 变更不会交错写入。
/// 注意：锁只覆盖本进程；多个进程共享同一个历史文件会互相覆盖更新，
/// 这是文档化的限制而非受支持的模式。
pub struct HistoryStore {
    items: Mutex<Vec<ClipboardItem>>,
    config: StoreConfig,
    load_report: LoadReport,
}

impl HistoryStore {
    /// 打开存储：从 `storage_path` 加载已有历史，文件缺失或损坏时以空历史启动
    pub fn open(config: StoreConfig) -> Result<Self, AppError> {
        if config.max_history == 0 {
            return Err(AppError::Config("max_history 必须为正整数".to_string()));
        }

        let (mut items, load_report) = persist::load_from_path(&config.storage_path);
        if items.len() > config.max_history {
            let excess = items.len() - config.max_history;
            items.drain(..excess);
            log::info!("历史条目超出容量上限，已裁掉最旧的 {excess} 条");
        }

        Ok(Self {
            items: Mutex::new(items),
            config,
            load_report,
        })
    }

    /// 启动加载的警告报告
    pub fn load_report(&self) -> &LoadReport {
        &self.load_report
    }

    pub(crate) fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// 在锁内访问条目序列，锁中毒转为 `AppError::Store`
    pub(crate) fn with_items<T>(
        &self,
        op: impl FnOnce(&mut Vec<ClipboardItem>) -> Result<T, AppError>,
    ) -> Result<T, AppError> {
        let mut items = self
            .items
            .lock()
            .map_err(|e| AppError::Store(format!("获取历史记录锁失败: {e}")))?;
        op(&mut items)
    }
}
