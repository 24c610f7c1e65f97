//! 历史文件格式模块
//!
//! # 设计思路
//!
//! 持久化状态是一个带版本号的 JSON 文档：
//!
//! ```json
//! { "version": 1, "items": [ { "content": "...", "timestamp": 1723000000.5,
//!   "content_type": "text", "length": 3, "line_count": 1, "word_count": 1 } ] }
//! ```
//!
//! 读取策略分两档：
//! - **启动加载（宽松）**：文件缺失→空；整体损坏或版本不受支持→空 + 警告；
//!   单条记录缺字段→跳过该条 + 警告。加载永不失败。
//! - **导入（严格）**：任何一条记录解析或校验失败，整个导入原子性中止，
//!   错误中指明首个出错记录。
//!
//! 记录上的未知多余字段在读取时一律忽略（前向兼容）。
//! 写入采用先写临时文件再重命名，避免写一半的文件覆盖完整历史。

use std::fs;
use std::path::Path;

use serde::Serialize;
use serde_json::Value;

use crate::error::AppError;

use super::{ClipboardItem, LoadReport};

/// 当前历史文件格式版本
pub const FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
struct HistoryFile<'a> {
    version: u32,
    items: &'a [ClipboardItem],
}

/// 原子化写出整个序列：先写 `<path>.tmp` 再重命名
pub(crate) fn save_to_path(path: &Path, items: &[ClipboardItem]) -> Result<(), AppError> {
    let file = HistoryFile {
        version: FORMAT_VERSION,
        items,
    };
    let content = serde_json::to_string_pretty(&file)
        .map_err(|e| AppError::Persistence(format!("序列化历史失败: {e}")))?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)
                .map_err(|e| AppError::Persistence(format!("创建历史目录失败: {e}")))?;
        }
    }

    let tmp = path.with_extension("tmp");
    fs::write(&tmp, content)
        .map_err(|e| AppError::Persistence(format!("写入临时历史文件失败: {e}")))?;
    fs::rename(&tmp, path)
        .map_err(|e| AppError::Persistence(format!("替换历史文件失败: {e}")))?;
    Ok(())
}

/// 从文档顶层取出记录数组
///
/// 兼容两种形态：带版本号的对象（当前格式），以及旧版工具写出的裸数组。
fn extract_records(value: Value) -> Result<Vec<Value>, String> {
    match value {
        Value::Array(records) => Ok(records),
        Value::Object(mut map) => {
            let version = map
                .get("version")
                .and_then(Value::as_u64)
                .ok_or_else(|| "缺少 version 字段".to_string())?;
            if version > u64::from(FORMAT_VERSION) {
                return Err(format!("不支持的历史文件版本 {version}"));
            }
            match map.remove("items") {
                Some(Value::Array(records)) => Ok(records),
                _ => Err("缺少 items 数组".to_string()),
            }
        }
        _ => Err("顶层既不是对象也不是数组".to_string()),
    }
}

/// 宽松加载：返回可用条目与降级报告，永不失败
pub(crate) fn load_from_path(path: &Path) -> (Vec<ClipboardItem>, LoadReport) {
    let mut report = LoadReport::default();

    if !path.exists() {
        return (Vec::new(), report);
    }

    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            log::warn!("读取历史文件失败，以空历史启动: {e}");
            report.corrupt = true;
            return (Vec::new(), report);
        }
    };

    let value: Value = match serde_json::from_str(&content) {
        Ok(value) => value,
        Err(e) => {
            log::warn!("历史文件不是合法 JSON，以空历史启动: {e}");
            report.corrupt = true;
            return (Vec::new(), report);
        }
    };

    let records = match extract_records(value) {
        Ok(records) => records,
        Err(reason) => {
            log::warn!("历史文件结构异常（{reason}），以空历史启动");
            report.corrupt = true;
            return (Vec::new(), report);
        }
    };

    let mut items = Vec::with_capacity(records.len());
    for (index, record) in records.into_iter().enumerate() {
        match serde_json::from_value::<ClipboardItem>(record) {
            Ok(item) => items.push(item),
            Err(e) => {
                log::warn!("跳过第 {} 条无效历史记录: {e}", index + 1);
                report.skipped_records += 1;
            }
        }
    }

    (items, report)
}

/// 校验单条记录满足数据模型不变量
fn validate_item(item: &ClipboardItem, prev_timestamp: Option<f64>) -> Result<(), String> {
    if !item.timestamp.is_finite() || item.timestamp < 0.0 {
        return Err(format!("时间戳 {} 不是合法的非负数", item.timestamp));
    }
    if let Some(prev) = prev_timestamp {
        if item.timestamp < prev {
            return Err(format!("时间戳 {} 早于前一条记录的 {prev}", item.timestamp));
        }
    }
    let length = item.content.chars().count();
    if item.length != length {
        return Err(format!("length 为 {} 但内容实际字符数为 {length}", item.length));
    }
    let line_count = item.content.split('\n').count();
    if item.line_count != line_count {
        return Err(format!("line_count 为 {} 但内容实际段数为 {line_count}", item.line_count));
    }
    let word_count = item.content.split_whitespace().count();
    if item.word_count != word_count {
        return Err(format!("word_count 为 {} 但内容实际词数为 {word_count}", item.word_count));
    }
    Ok(())
}

/// 严格读取：用于导入，任何一条记录出错即整体失败
pub(crate) fn read_for_import(path: &Path) -> Result<Vec<ClipboardItem>, AppError> {
    let content = fs::read_to_string(path)
        .map_err(|e| AppError::Persistence(format!("读取导入文件失败: {e}")))?;
    let value: Value = serde_json::from_str(&content)
        .map_err(|e| AppError::Persistence(format!("解析导入文件失败: {e}")))?;
    let records = extract_records(value)
        .map_err(|reason| AppError::Persistence(format!("导入文件结构异常: {reason}")))?;

    let mut items = Vec::with_capacity(records.len());
    for (index, record) in records.into_iter().enumerate() {
        let item = serde_json::from_value::<ClipboardItem>(record).map_err(|e| {
            AppError::Validation {
                record: index + 1,
                reason: e.to_string(),
            }
        })?;
        validate_item(&item, items.last().map(|prev: &ClipboardItem| prev.timestamp)).map_err(
            |reason| AppError::Validation {
                record: index + 1,
                reason,
            },
        )?;
        items.push(item);
    }

    Ok(items)
}

#[cfg(test)]
mod tests {
    use std::time::{SystemTime, UNIX_EPOCH};

    use crate::classifier::ContentType;
    use crate::error::AppError;

    use super::super::ClipboardItem;
    use super::{load_from_path, read_for_import, save_to_path};

    fn unique_temp_dir() -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock error")
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("clipstack-persist-test-{nanos}"));
        std::fs::create_dir_all(&dir).expect("create temp dir");
        dir
    }

    fn sample_items() -> Vec<ClipboardItem> {
        vec![
            ClipboardItem::new("hello world", 100.0, ContentType::Text),
            ClipboardItem::new("https://example.com", 101.5, ContentType::Url),
            ClipboardItem::new("fn main() {}", 102.25, ContentType::Code),
        ]
    }

    #[test]
    fn save_and_load_roundtrip_preserves_everything() {
        let dir = unique_temp_dir();
        let path = dir.join("history.json");

        let items = sample_items();
        save_to_path(&path, &items).expect("save history");
        let (loaded, report) = load_from_path(&path);

        assert_eq!(loaded, items);
        assert!(!report.has_warnings());
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn missing_file_loads_empty_without_warning() {
        let dir = unique_temp_dir();
        let (loaded, report) = load_from_path(&dir.join("absent.json"));

        assert!(loaded.is_empty());
        assert!(!report.has_warnings());
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn corrupt_file_loads_empty_with_warning() {
        let dir = unique_temp_dir();
        let path = dir.join("history.json");
        std::fs::write(&path, "not-json{{{").expect("write corrupt file");

        let (loaded, report) = load_from_path(&path);

        assert!(loaded.is_empty());
        assert!(report.corrupt);
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn unsupported_version_loads_empty_with_warning() {
        let dir = unique_temp_dir();
        let path = dir.join("history.json");
        std::fs::write(&path, r#"{"version": 99, "items": []}"#).expect("write future version");

        let (loaded, report) = load_from_path(&path);

        assert!(loaded.is_empty());
        assert!(report.corrupt);
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn record_missing_field_is_skipped_and_counted() {
        let dir = unique_temp_dir();
        let path = dir.join("history.json");
        std::fs::write(
            &path,
            r#"{"version": 1, "items": [
                {"content": "a", "timestamp": 1.0, "content_type": "text", "length": 1, "line_count": 1, "word_count": 1},
                {"timestamp": 2.0, "content_type": "text", "length": 1, "line_count": 1, "word_count": 1},
                {"content": "c", "timestamp": 3.0, "content_type": "text", "length": 1, "line_count": 1, "word_count": 1}
            ]}"#,
        )
        .expect("write partial file");

        let (loaded, report) = load_from_path(&path);

        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].content, "a");
        assert_eq!(loaded[1].content, "c");
        assert_eq!(report.skipped_records, 1);
        assert!(!report.corrupt);
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn unknown_extra_fields_are_ignored() {
        let dir = unique_temp_dir();
        let path = dir.join("history.json");
        std::fs::write(
            &path,
            r##"{"version": 1, "items": [
                {"content": "a", "timestamp": 1.0, "content_type": "text",
                 "length": 1, "line_count": 1, "word_count": 1,
                 "pinned": true, "color": "#112233"}
            ]}"##,
        )
        .expect("write file with extras");

        let (loaded, report) = load_from_path(&path);

        assert_eq!(loaded.len(), 1);
        assert!(!report.has_warnings());
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn legacy_bare_array_is_accepted() {
        let dir = unique_temp_dir();
        let path = dir.join("history.json");
        std::fs::write(
            &path,
            r#"[{"content": "old", "timestamp": 5.0, "content_type": "text",
                "length": 3, "line_count": 1, "word_count": 1}]"#,
        )
        .expect("write legacy file");

        let (loaded, report) = load_from_path(&path);

        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].content, "old");
        assert!(!report.has_warnings());
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn import_rejects_record_with_missing_field() {
        let dir = unique_temp_dir();
        let path = dir.join("import.json");
        std::fs::write(
            &path,
            r#"{"version": 1, "items": [
                {"content": "a", "timestamp": 1.0, "content_type": "text", "length": 1, "line_count": 1, "word_count": 1},
                {"timestamp": 2.0, "content_type": "text", "length": 1, "line_count": 1, "word_count": 1}
            ]}"#,
        )
        .expect("write import file");

        match read_for_import(&path) {
            Err(AppError::Validation { record, .. }) => assert_eq!(record, 2),
            other => panic!("expected validation error, got {other:?}"),
        }
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn import_rejects_inconsistent_metadata() {
        let dir = unique_temp_dir();
        let path = dir.join("import.json");
        std::fs::write(
            &path,
            r#"{"version": 1, "items": [
                {"content": "abc", "timestamp": 1.0, "content_type": "text", "length": 99, "line_count": 1, "word_count": 1}
            ]}"#,
        )
        .expect("write import file");

        match read_for_import(&path) {
            Err(AppError::Validation { record, reason }) => {
                assert_eq!(record, 1);
                assert!(reason.contains("length"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn import_rejects_out_of_order_timestamps() {
        let dir = unique_temp_dir();
        let path = dir.join("import.json");
        std::fs::write(
            &path,
            r#"{"version": 1, "items": [
                {"content": "a", "timestamp": 10.0, "content_type": "text", "length": 1, "line_count": 1, "word_count": 1},
                {"content": "b", "timestamp": 5.0, "content_type": "text", "length": 1, "line_count": 1, "word_count": 1}
            ]}"#,
        )
        .expect("write import file");

        match read_for_import(&path) {
            Err(AppError::Validation { record, .. }) => assert_eq!(record, 2),
            other => panic!("expected validation error, got {other:?}"),
        }
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn import_accepts_valid_export() {
        let dir = unique_temp_dir();
        let path = dir.join("import.json");
        let items = sample_items();
        save_to_path(&path, &items).expect("save export");

        let imported = read_for_import(&path).expect("import back");
        assert_eq!(imported, items);
        let _ = std::fs::remove_dir_all(dir);
    }
}
