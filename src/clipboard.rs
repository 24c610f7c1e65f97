//! 系统剪贴板适配器
//!
//! `arboard` 的薄封装：只负责文本读写与错误映射，不含任何业务逻辑。
//! 历史存储与搜索引擎均不依赖本模块，方便在测试中用纯数据替代。

use crate::error::AppError;

/// 系统剪贴板句柄
pub struct SystemClipboard {
    inner: arboard::Clipboard,
}

impl SystemClipboard {
    pub fn new() -> Result<Self, AppError> {
        let inner = arboard::Clipboard::new()
            .map_err(|e| AppError::Clipboard(format!("打开剪贴板失败: {e}")))?;
        Ok(Self { inner })
    }

    /// 读取剪贴板文本；剪贴板为空或持有非文本内容时返回错误
    pub fn get_text(&mut self) -> Result<String, AppError> {
        self.inner
            .get_text()
            .map_err(|e| AppError::Clipboard(format!("读取剪贴板失败: {e}")))
    }

    /// 将文本写入剪贴板
    pub fn set_text(&mut self, text: &str) -> Result<(), AppError> {
        self.inner
            .set_text(text.to_string())
            .map_err(|e| AppError::Clipboard(format!("写入剪贴板失败: {e}")))
    }
}
