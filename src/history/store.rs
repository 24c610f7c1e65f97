//! 历史存储的变更与查询操作
//!
//! 每个变更操作都在锁内完成"修改内存 → 落盘 → 失败则回滚"的完整序列，
//! 保证内存状态与磁盘状态永不分叉。

use std::path::Path;

use chrono::Utc;

use crate::classifier::{self, ContentType};
use crate::error::AppError;

use super::{persist, ClipboardItem, HistoryStats, HistoryStore};

fn now_secs() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

impl HistoryStore {
    /// 追加一次捕获
    ///
    /// - 内容与最近一条相同时为幂等空操作，返回已有条目。
    /// - 未指定类型时由分类器推断。
    /// - 达到容量上限时先淘汰最旧条目（FIFO）再追加。
    /// - 时间戳取当前时间并钳制到不早于最近一条，保证序列单调不减。
    pub fn add_item(
        &self,
        content: &str,
        content_type: Option<ContentType>,
    ) -> Result<ClipboardItem, AppError> {
        let threshold = self.config().long_text_threshold;
        let max_history = self.config().max_history;

        self.with_items(|items| {
            if let Some(last) = items.last() {
                if last.content == content {
                    log::debug!("内容与最近一条相同，跳过重复捕获");
                    return Ok(last.clone());
                }
            }

            let content_type =
                content_type.unwrap_or_else(|| classifier::classify(content, threshold));
            let timestamp = match items.last() {
                Some(last) => now_secs().max(last.timestamp),
                None => now_secs(),
            };
            let item = ClipboardItem::new(content, timestamp, content_type);

            let backup = items.clone();
            while items.len() >= max_history {
                items.remove(0);
            }
            items.push(item.clone());

            if let Err(e) = persist::save_to_path(&self.config().storage_path, items) {
                *items = backup;
                return Err(e);
            }
            Ok(item)
        })
    }

    /// 当前序列的只读快照，最旧在前、最新在后
    pub fn get_items(&self) -> Result<Vec<ClipboardItem>, AppError> {
        self.with_items(|items| Ok(items.clone()))
    }

    /// 按快照顺序的 0 基索引取条目（0 = 最旧）
    pub fn restore_item(&self, index: usize) -> Result<ClipboardItem, AppError> {
        self.with_items(|items| {
            items
                .get(index)
                .cloned()
                .ok_or(AppError::IndexOutOfRange {
                    index,
                    len: items.len(),
                })
        })
    }

    /// 清空历史并持久化空状态
    pub fn clear(&self) -> Result<(), AppError> {
        self.with_items(|items| {
            let backup = std::mem::take(items);
            if let Err(e) = persist::save_to_path(&self.config().storage_path, items) {
                *items = backup;
                return Err(e);
            }
            Ok(())
        })
    }

    /// 基于当前快照重新计算聚合统计
    pub fn get_history_stats(&self) -> Result<HistoryStats, AppError> {
        self.with_items(|items| {
            let mut content_types = std::collections::BTreeMap::new();
            let mut total_characters = 0;
            let mut total_words = 0;
            let mut total_lines = 0;
            for item in items.iter() {
                *content_types
                    .entry(item.content_type.as_str().to_string())
                    .or_insert(0) += 1;
                total_characters += item.length;
                total_words += item.word_count;
                total_lines += item.line_count;
            }
            let average_length = if items.is_empty() {
                0.0
            } else {
                total_characters as f64 / items.len() as f64
            };
            Ok(HistoryStats {
                total_items: items.len(),
                content_types,
                total_characters,
                total_words,
                total_lines,
                average_length,
            })
        })
    }

    /// 把完整序列导出到指定路径，返回导出的条目数
    pub fn export(&self, path: &Path) -> Result<usize, AppError> {
        self.with_items(|items| {
            persist::save_to_path(path, items)?;
            Ok(items.len())
        })
    }

    /// 从导出文件导入，替换当前序列，返回导入后的条目数
    ///
    /// 任何一条记录校验失败则整体失败，当前序列不变。
    /// 导入序列超出容量上限时保留最新的 `max_history` 条。
    pub fn import(&self, path: &Path) -> Result<usize, AppError> {
        let mut imported = persist::read_for_import(path)?;
        let max_history = self.config().max_history;
        if imported.len() > max_history {
            let excess = imported.len() - max_history;
            imported.drain(..excess);
            log::info!("导入条目超出容量上限，已裁掉最旧的 {excess} 条");
        }

        self.with_items(move |items| {
            let backup = std::mem::replace(items, imported);
            if let Err(e) = persist::save_to_path(&self.config().storage_path, items) {
                *items = backup;
                return Err(e);
            }
            Ok(items.len())
        })
    }

    pub fn len(&self) -> Result<usize, AppError> {
        self.with_items(|items| Ok(items.len()))
    }

    pub fn is_empty(&self) -> Result<bool, AppError> {
        Ok(self.len()? == 0)
    }
}
