//! # ClipStack — 剪贴板历史管理库
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                     CLI (clap 子命令)                     │
//! │  add / list / search / peek / pop / restore / clear      │
//! │  export / import / stats / monitor                       │
//! └───────┬──────────────────────────────────────────────────┘
//!         ↕ Result<T, AppError>
//! ┌───────┼──────────────────────────────────────────────────┐
//! │       ↕              核心库                               │
//! │                                                          │
//! │  ┌─ error ────── AppError (统一错误类型)                  │
//! │  │                                                       │
//! │  ├─ config ───── AppConfig 加载与消毒                     │
//! │  │                                                       │
//! │  ├─ classifier ─ 内容类型分类（正则特征）                  │
//! │  │                                                       │
//! │  ├─ history ──── 有界历史存储 + JSON 持久化                │
//! │  │   ├─ store         变更/查询（锁内落盘，失败回滚）      │
//! │  │   └─ persist       带版本号的文件格式（宽松读/严格导入） │
//! │  │                                                       │
//! │  ├─ search ───── 快照上的纯函数搜索                        │
//! │  │   └─ score         模糊相似度打分 [0,100]              │
//! │  │                                                       │
//! │  ├─ clipboard ── 系统剪贴板适配（arboard）                 │
//! │  └─ monitor ──── 后台轮询监控线程                          │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`error`] | 统一错误类型 `AppError`，所有可失败操作的返回类型 |
//! | [`config`] | 配置文件加载、默认值与数值消毒 |
//! | [`classifier`] | 纯函数内容分类：url / email / code / long_text / text |
//! | [`history`] | 有界、持久化的条目序列：追加、去重、淘汰、导入导出、统计 |
//! | [`search`] | 模糊/精确/类型/组合搜索，作用于只读快照 |
//! | [`clipboard`] | 系统剪贴板文本读写的薄封装 |
//! | [`monitor`] | 后台轮询线程，把新捕获推入历史存储 |
//!
//! 数据流：monitor/CLI → classifier（经 `add_item`）→ history（落盘）
//! → search（查询快照）→ CLI 展示。

pub mod classifier;
pub mod clipboard;
pub mod config;
pub mod error;
pub mod history;
pub mod monitor;
pub mod search;
