//! 搜索引擎模块
//!
//! # 设计思路
//!
//! 所有搜索都是快照上的纯函数：输入一段 `ClipboardItem` 序列，输出过滤或
//! 排序后的结果，不持有存储、不做任何变更。空序列对任何操作都返回空结果，
//! 空查询对 fuzzy/exact 返回空结果（不是"匹配一切"），搜索永不失败。
//!
//! # 实现思路
//!
//! - 打分规则集中在 [`score`] 子模块，本模块只负责过滤、排序与组合。
//! - 模糊结果按分值降序，平分时新条目（时间戳大）在前，再平则保持原序。
//! - `advanced_search` 把类型过滤与三种查询方式组合成一次调用，
//!   模糊分支丢弃分值并按相关度下限截断。

pub mod score;

use std::str::FromStr;

use crate::classifier::ContentType;
use crate::history::ClipboardItem;

pub use score::similarity;

/// `advanced_search` 的查询方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchType {
    Fuzzy,
    Exact,
    Type,
}

impl FromStr for SearchType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fuzzy" => Ok(SearchType::Fuzzy),
            "exact" => Ok(SearchType::Exact),
            "type" => Ok(SearchType::Type),
            other => Err(format!("未知搜索方式 '{other}'（可选: fuzzy/exact/type）")),
        }
    }
}

/// 模糊搜索：返回 (条目, 分值) 对，分值降序，截断到 `limit`
///
/// 空白查询返回空结果；零分条目不进入结果。
pub fn fuzzy_search(
    items: &[ClipboardItem],
    query: &str,
    limit: usize,
) -> Vec<(ClipboardItem, f64)> {
    if query.trim().is_empty() {
        return Vec::new();
    }

    let mut scored: Vec<(usize, f64)> = items
        .iter()
        .enumerate()
        .map(|(index, item)| (index, score::similarity(query, &item.content)))
        .filter(|(_, s)| *s > 0.0)
        .collect();

    scored.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| {
                items[b.0]
                    .timestamp
                    .partial_cmp(&items[a.0].timestamp)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .then_with(|| a.0.cmp(&b.0))
    });
    scored.truncate(limit);

    scored
        .into_iter()
        .map(|(index, s)| (items[index].clone(), s))
        .collect()
}

/// 精确子串搜索（大小写不敏感），保持原序
pub fn exact_search(items: &[ClipboardItem], substring: &str) -> Vec<ClipboardItem> {
    if substring.trim().is_empty() {
        return Vec::new();
    }
    let needle = substring.to_lowercase();
    items
        .iter()
        .filter(|item| item.content.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

/// 按内容类型过滤，保持原序
pub fn content_type_search(items: &[ClipboardItem], content_type: ContentType) -> Vec<ClipboardItem> {
    items
        .iter()
        .filter(|item| item.content_type == content_type)
        .cloned()
        .collect()
}

/// 组合搜索：先按 `content_type` 收窄（如给出），再按 `search_type` 查询
///
/// 模糊分支丢弃分值，只保留分值 ≥ `min_score` 的条目（按相关度排序）；
/// `Type` 分支把 `query` 解析为类型标签，解析失败时返回空结果而非错误。
pub fn advanced_search(
    items: &[ClipboardItem],
    query: &str,
    search_type: SearchType,
    content_type: Option<ContentType>,
    min_score: f64,
) -> Vec<ClipboardItem> {
    let narrowed: Vec<ClipboardItem> = match content_type {
        Some(ct) => content_type_search(items, ct),
        None => items.to_vec(),
    };

    match search_type {
        SearchType::Fuzzy => fuzzy_search(&narrowed, query, narrowed.len())
            .into_iter()
            .filter(|(_, s)| *s >= min_score)
            .map(|(item, _)| item)
            .collect(),
        SearchType::Exact => exact_search(&narrowed, query),
        SearchType::Type => match query.parse::<ContentType>() {
            Ok(ct) => content_type_search(&narrowed, ct),
            Err(_) => Vec::new(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(content: &str, timestamp: f64, content_type: ContentType) -> ClipboardItem {
        ClipboardItem::new(content, timestamp, content_type)
    }

    fn demo_items() -> Vec<ClipboardItem> {
        vec![
            item("python function", 1.0, ContentType::Code),
            item("javascript code", 2.0, ContentType::Code),
            item("https://python.org", 3.0, ContentType::Url),
        ]
    }

    #[test]
    fn fuzzy_ranks_python_entries_above_unrelated() {
        let items = demo_items();
        let results = fuzzy_search(&items, "python", 2);

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0.content, "python function");
        assert_eq!(results[1].0.content, "https://python.org");
        assert!(results[0].1 > results[1].1);
    }

    #[test]
    fn fuzzy_scores_are_monotonically_non_increasing_and_in_range() {
        let items = demo_items();
        let results = fuzzy_search(&items, "python", items.len());

        for pair in results.windows(2) {
            assert!(pair[0].1 >= pair[1].1);
        }
        for (_, score) in &results {
            assert!((0.0..=100.0).contains(score));
        }
    }

    #[test]
    fn fuzzy_empty_query_returns_empty() {
        let items = demo_items();
        assert!(fuzzy_search(&items, "", 10).is_empty());
        assert!(fuzzy_search(&items, "   ", 10).is_empty());
    }

    #[test]
    fn fuzzy_on_empty_items_returns_empty() {
        assert!(fuzzy_search(&[], "python", 10).is_empty());
    }

    #[test]
    fn fuzzy_ties_prefer_newer_items() {
        let items = vec![
            item("same words", 1.0, ContentType::Text),
            item("same words", 2.0, ContentType::Text),
        ];
        let results = fuzzy_search(&items, "same words", 10);

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0.timestamp, 2.0);
        assert_eq!(results[1].0.timestamp, 1.0);
    }

    #[test]
    fn exact_search_is_case_insensitive_and_order_preserving() {
        let items = vec![
            item("Hello World", 1.0, ContentType::Text),
            item("no match here", 2.0, ContentType::Text),
            item("hello again", 3.0, ContentType::Text),
        ];
        let results = exact_search(&items, "HELLO");

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].content, "Hello World");
        assert_eq!(results[1].content, "hello again");
    }

    #[test]
    fn exact_empty_query_returns_empty() {
        assert!(exact_search(&demo_items(), "").is_empty());
    }

    #[test]
    fn content_type_search_preserves_order() {
        let items = demo_items();
        let code = content_type_search(&items, ContentType::Code);

        assert_eq!(code.len(), 2);
        assert_eq!(code[0].content, "python function");
        assert_eq!(code[1].content, "javascript code");

        let urls = content_type_search(&items, ContentType::Url);
        assert_eq!(urls.len(), 1);
        assert_eq!(urls[0].content, "https://python.org");
    }

    #[test]
    fn advanced_search_narrows_by_type_before_fuzzy() {
        let items = demo_items();
        let results = advanced_search(&items, "python", SearchType::Fuzzy, Some(ContentType::Code), 30.0);

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].content, "python function");
    }

    #[test]
    fn advanced_search_fuzzy_applies_score_floor() {
        let items = demo_items();
        let results = advanced_search(&items, "python", SearchType::Fuzzy, None, 30.0);

        // "javascript code" 的分值低于下限，被丢弃
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|item| item.content.contains("python")));
    }

    #[test]
    fn advanced_search_type_mode_parses_query() {
        let items = demo_items();
        let results = advanced_search(&items, "url", SearchType::Type, None, 0.0);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].content, "https://python.org");

        assert!(advanced_search(&items, "banana", SearchType::Type, None, 0.0).is_empty());
    }

    #[test]
    fn search_type_labels_parse() {
        assert_eq!("fuzzy".parse::<SearchType>().expect("fuzzy"), SearchType::Fuzzy);
        assert_eq!("exact".parse::<SearchType>().expect("exact"), SearchType::Exact);
        assert_eq!("type".parse::<SearchType>().expect("type"), SearchType::Type);
        assert!("banana".parse::<SearchType>().is_err());
    }
}
