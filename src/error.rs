//! 统一错误类型模块
//!
//! # 设计思路
//!
//! 定义全局统一的 `AppError` 枚举，替代各模块中分散的
//! `.map_err(|e| e.to_string())`、`format!(...)`、`expect()` 等不一致模式。
//!
//! 库内所有可失败操作统一返回 `Result<T, AppError>`，CLI 层直接打印
//! `Display` 输出即可获得一致的错误信息。
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息。
//! - 文件 I/O 失败统一映射为 `Persistence` 并携带操作上下文。
//! - 历史文件在启动加载时损坏不算错误：存储降级为空历史并通过
//!   `LoadReport` 向调用方报告警告，绝不让进程崩溃。

/// 应用级统一错误类型
///
/// 库内所有可失败操作均返回此类型，确保 CLI 收到一致的错误格式。
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 剪贴板读写操作失败
    #[error("剪贴板操作失败: {0}")]
    Clipboard(String),

    /// 按索引取条目时索引越界
    #[error("索引 {index} 超出范围（共 {len} 条）")]
    IndexOutOfRange { index: usize, len: usize },

    /// 导入时记录校验失败（整个导入原子性中止）
    #[error("导入校验失败（第 {record} 条记录）: {reason}")]
    Validation { record: usize, reason: String },

    /// 历史文件写入/读取在操作中途失败
    #[error("持久化失败: {0}")]
    Persistence(String),

    /// 配置解析或路径解析失败
    #[error("配置错误: {0}")]
    Config(String),

    /// 历史存储内部错误（如锁中毒）
    #[error("历史存储错误: {0}")]
    Store(String),
}
