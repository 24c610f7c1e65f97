//! 应用配置模块
//!
//! 配置文件位于系统配置目录下的 `clipstack/config.json`，历史文件默认
//! 位于系统数据目录下的 `clipstack/history.json`。配置文件缺失或损坏时
//! 回退到默认值，加载永不失败；数值字段在加载后统一消毒。

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::history::StoreConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// 历史文件位置
    #[serde(default = "default_storage_path")]
    pub storage_path: PathBuf,
    /// 历史容量上限（正整数）
    #[serde(default = "default_max_history")]
    pub max_history: usize,
    /// 普通文本超过该字符数归为 long_text
    #[serde(default = "default_long_text_threshold")]
    pub long_text_threshold: usize,
    /// advanced 模糊搜索的相关度下限，∈ [0, 100]
    #[serde(default = "default_fuzzy_match_floor")]
    pub fuzzy_match_floor: f64,
    /// 监控轮询间隔（毫秒）
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_storage_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("clipstack")
        .join("history.json")
}

fn default_max_history() -> usize {
    100
}

fn default_long_text_threshold() -> usize {
    200
}

fn default_fuzzy_match_floor() -> f64 {
    30.0
}

fn default_poll_interval_ms() -> u64 {
    500
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage_path: default_storage_path(),
            max_history: default_max_history(),
            long_text_threshold: default_long_text_threshold(),
            fuzzy_match_floor: default_fuzzy_match_floor(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl AppConfig {
    /// 异常数值回退到默认，保证后续模块拿到的配置总是可用的
    fn sanitized(mut self) -> Self {
        if self.max_history == 0 {
            log::warn!("max_history 不能为 0，回退到默认值 {}", default_max_history());
            self.max_history = default_max_history();
        }
        if !self.fuzzy_match_floor.is_finite() {
            self.fuzzy_match_floor = default_fuzzy_match_floor();
        }
        self.fuzzy_match_floor = self.fuzzy_match_floor.clamp(0.0, 100.0);
        self
    }

    /// 存储消费的配置子集
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            storage_path: self.storage_path.clone(),
            max_history: self.max_history,
            long_text_threshold: self.long_text_threshold,
        }
    }
}

/// 默认配置文件路径
pub fn config_file_path() -> Result<PathBuf, AppError> {
    let base = dirs::config_dir()
        .ok_or_else(|| AppError::Config("无法确定系统配置目录".to_string()))?;
    Ok(base.join("clipstack").join("config.json"))
}

/// 从指定路径加载配置，缺失或损坏时回退到默认值
pub fn load_config_from_path(config_path: &Path) -> AppConfig {
    if config_path.exists() {
        if let Ok(content) = std::fs::read_to_string(config_path) {
            match serde_json::from_str::<AppConfig>(&content) {
                Ok(config) => return config.sanitized(),
                Err(e) => log::warn!("配置文件解析失败，使用默认配置: {e}"),
            }
        }
    }
    AppConfig::default().sanitized()
}

/// 从默认位置加载配置
pub fn load_config() -> AppConfig {
    match config_file_path() {
        Ok(path) => load_config_from_path(&path),
        Err(_) => AppConfig::default().sanitized(),
    }
}
