//! 模糊相似度打分
//!
//! # 设计思路
//!
//! 分值域 [0, 100]，大小写不敏感。综合四条线索取最大值：
//! 整体相等（100）、子串包含（按覆盖率 60–100）、最佳单词编辑距离
//! （权重 90）、全文编辑距离（权重 80），另有字符子序列兜底（上限 50）。
//! 这样"查询恰好是某个单词"的条目排在"查询埋在长串中间"的条目之前，
//! 而拼写有出入的内容仍能拿到非零分。

/// 字符级 Levenshtein 编辑距离（两行 DP）
pub(crate) fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];

    for (i, &ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            curr[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// 归一化编辑相似度：1 - 距离/较长长度，两个空串视为 1
pub(crate) fn edit_ratio(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    1.0 - levenshtein(a, b) as f64 / max_len as f64
}

/// needle 是否为 haystack 的字符子序列
pub(crate) fn is_subsequence(needle: &str, haystack: &str) -> bool {
    let mut chars = needle.chars().peekable();
    for c in haystack.chars() {
        match chars.peek() {
            Some(&next) if next == c => {
                chars.next();
            }
            Some(_) => {}
            None => return true,
        }
    }
    chars.peek().is_none()
}

/// 查询与内容的相似度，∈ [0, 100]
pub fn similarity(query: &str, content: &str) -> f64 {
    let q = query.to_lowercase();
    let c = content.to_lowercase();
    if q.is_empty() || c.is_empty() {
        return 0.0;
    }
    if q == c {
        return 100.0;
    }

    let q_len = q.chars().count() as f64;
    let c_len = c.chars().count() as f64;
    let mut best = 0.0f64;

    if c.contains(&q) {
        best = 60.0 + 40.0 * q_len / c_len;
    }

    for token in c.split_whitespace() {
        best = best.max(90.0 * edit_ratio(&q, token));
    }
    best = best.max(80.0 * edit_ratio(&q, &c));

    if is_subsequence(&q, &c) {
        best = best.max(25.0 + 25.0 * q_len / c_len);
    }

    best.clamp(0.0, 100.0)
}
