//! 内容类型分类模块
//!
//! # 设计思路
//!
//! 剪贴板捕获的文本按固定优先级归入封闭的类型集合
//! （url > email > code > long_text > text），上层据此做过滤、统计与展示。
//! 分类是纯函数：无副作用、对任意输入都有结果，无法识别的内容落入 `text`。
//!
//! # 实现思路
//!
//! - 使用 `RegexSet` 进行一次性多模式代码特征匹配，性能优于逐条匹配。
//! - 通过 `once_cell::sync::Lazy` 在首次调用时编译正则，后续零成本复用。
//! - URL/邮箱使用锚定正则对 trim 后的全文匹配，避免把"包含链接的句子"
//!   误判为链接本身。

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::{Regex, RegexSet};
use serde::{Deserialize, Serialize};

/// 剪贴板条目的内容类型
///
/// 封闭枚举而非自由字符串，保证分类结果可被穷尽匹配。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Url,
    Email,
    Code,
    LongText,
    Text,
}

impl ContentType {
    /// 持久化文件与 CLI 中使用的标签
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Url => "url",
            ContentType::Email => "email",
            ContentType::Code => "code",
            ContentType::LongText => "long_text",
            ContentType::Text => "text",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "url" => Ok(ContentType::Url),
            "email" => Ok(ContentType::Email),
            "code" => Ok(ContentType::Code),
            "long_text" => Ok(ContentType::LongText),
            "text" => Ok(ContentType::Text),
            other => Err(format!(
                "未知内容类型 '{other}'（可选: url/email/code/long_text/text）"
            )),
        }
    }
}

/// 锚定 URL 匹配：scheme://host 形式，整段内容就是一个链接
static URL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.-]*://[^\s/$.?#][^\s]*$").unwrap()
});

/// 锚定邮箱匹配：local@domain.tld，整段内容就是一个地址
static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap()
});

/// 预编译的正则表达式集合：用于代码特征检测
///
/// 检测的模式包括：
/// 1. 行首语句关键字（fn, function, def, class, struct, impl, let 等）
/// 2. 花括号
/// 3. 行尾分号
/// 4. 行首缩进块（制表符或四空格）
/// 5. C/C++ 预处理器（#include, #define 等）
/// 6. 类型箭头 / 匹配箭头（->, =>）
/// 7. 作用域解析运算符（::）
static CODE_PATTERNS: Lazy<RegexSet> = Lazy::new(|| {
    RegexSet::new([
        r"(?m)^[\s]*(fn|function|const|let|var|class|struct|impl|mod|use|import|export|def|async|pub|static|interface|type|enum|trait)\s",
        r"\{",
        r"(?m);[ \t]*$",
        r"(?m)^(\t| {4})\S",
        r"(?m)^[\s]*#(include|define|ifdef|ifndef|endif)",
        r"->",
        r"=>",
        r"::",
    ])
    .unwrap()
});

/// 判断文本是否可能包含代码
///
/// 极短文本（<5 字符且无换行）直接排除，避免误判。
pub fn is_likely_code(text: &str) -> bool {
    if text.len() < 5 && !text.contains('\n') {
        return false;
    }
    CODE_PATTERNS.is_match(text)
}

/// 将原始文本映射到内容类型，首个命中的规则生效
///
/// # 参数
/// * `content` - 剪贴板文本
/// * `long_text_threshold` - 超过该字符数的普通文本归为 `long_text`
pub fn classify(content: &str, long_text_threshold: usize) -> ContentType {
    let trimmed = content.trim();
    if URL_PATTERN.is_match(trimmed) {
        return ContentType::Url;
    }
    if EMAIL_PATTERN.is_match(trimmed) {
        return ContentType::Email;
    }
    if is_likely_code(content) {
        return ContentType::Code;
    }
    if content.chars().count() > long_text_threshold {
        return ContentType::LongText;
    }
    ContentType::Text
}
