//! # ClipStack — 命令行入口
//!
//! 本文件仅负责参数解析与结果展示，业务逻辑全部在库模块中，
//! 详见 `lib.rs` 架构文档。子命令与核心操作一一对应：
//! add/list/search/peek/pop/restore/clear/export/import/stats/monitor。

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Local, Utc};
use clap::{Parser, Subcommand};

use clipstack::classifier::ContentType;
use clipstack::clipboard::SystemClipboard;
use clipstack::config;
use clipstack::error::AppError;
use clipstack::history::{ClipboardItem, HistoryStore};
use clipstack::monitor;
use clipstack::search::{self, SearchType};

#[derive(Parser)]
#[command(name = "clipstack")]
#[command(about = "面向开发者的剪贴板历史管理器", long_about = None)]
struct Cli {
    /// 配置文件路径（默认为系统配置目录下的 clipstack/config.json）
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 把文本（缺省时取当前剪贴板内容）加入历史
    Add {
        text: Option<String>,
    },
    /// 显示历史，最新在前
    List {
        /// 最多显示的条数
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// 搜索历史
    Search {
        query: String,
        /// 搜索方式: fuzzy / exact / type
        #[arg(long, default_value = "fuzzy")]
        mode: String,
        /// 先按内容类型收窄: url / email / code / long_text / text
        #[arg(long = "type")]
        content_type: Option<String>,
        /// 最多显示的条数
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// 查看最新条目
    Peek,
    /// 把最新条目写回系统剪贴板
    Pop,
    /// 按 list 显示的序号把条目写回系统剪贴板（1 = 最新）
    Restore {
        number: usize,
    },
    /// 清空历史
    Clear,
    /// 把历史导出到文件
    Export {
        path: PathBuf,
    },
    /// 从导出文件导入历史（替换当前序列）
    Import {
        path: PathBuf,
    },
    /// 显示历史统计
    Stats,
    /// 持续监控剪贴板变化并自动入库（Ctrl-C 退出）
    Monitor {
        /// 轮询间隔（毫秒）
        #[arg(long)]
        interval_ms: Option<u64>,
    },
}

/// 单行预览：取首行并截断到 `max_len` 个字符
fn format_preview(content: &str, max_len: usize) -> String {
    let first_line = content.lines().next().unwrap_or("");
    let mut preview: String = first_line.chars().take(max_len).collect();
    if first_line.chars().count() > max_len || content.lines().count() > 1 {
        preview.push('…');
    }
    preview
}

fn format_timestamp(timestamp: f64) -> String {
    DateTime::<Utc>::from_timestamp(timestamp as i64, 0)
        .map(|dt| dt.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| format!("{timestamp}"))
}

fn print_item_line(number: usize, item: &ClipboardItem) {
    println!(
        "{:>4}. [{:<9}] {}  {}",
        number,
        item.content_type.as_str(),
        format_timestamp(item.timestamp),
        format_preview(&item.content, 60),
    );
}

fn open_store(cli_config: Option<&PathBuf>) -> Result<(HistoryStore, config::AppConfig), AppError> {
    let app_config = match cli_config {
        Some(path) => config::load_config_from_path(path),
        None => config::load_config(),
    };
    let store = HistoryStore::open(app_config.store_config())?;
    if store.load_report().has_warnings() {
        let report = store.load_report();
        log::warn!(
            "历史文件加载降级: corrupt={} skipped={}",
            report.corrupt,
            report.skipped_records
        );
    }
    Ok((store, app_config))
}

fn run(cli: Cli) -> Result<(), AppError> {
    let (store, app_config) = open_store(cli.config.as_ref())?;

    match cli.command {
        Commands::Add { text } => {
            let content = match text {
                Some(text) => text,
                None => SystemClipboard::new()?.get_text()?,
            };
            if content.trim().is_empty() {
                println!("内容为空，跳过");
                return Ok(());
            }
            let item = store.add_item(&content, None)?;
            println!(
                "已添加 [{}] {}",
                item.content_type.as_str(),
                format_preview(&item.content, 60)
            );
        }
        Commands::List { limit } => {
            let items = store.get_items()?;
            if items.is_empty() {
                println!("历史为空");
                return Ok(());
            }
            let limit = limit.unwrap_or(items.len());
            for (offset, item) in items.iter().rev().take(limit).enumerate() {
                print_item_line(offset + 1, item);
            }
        }
        Commands::Search {
            query,
            mode,
            content_type,
            limit,
        } => {
            let search_type = mode.parse::<SearchType>().map_err(AppError::Config)?;
            let content_type = content_type
                .map(|label| label.parse::<ContentType>())
                .transpose()
                .map_err(AppError::Config)?;
            let items = store.get_items()?;
            let mut results = search::advanced_search(
                &items,
                &query,
                search_type,
                content_type,
                app_config.fuzzy_match_floor,
            );
            if let Some(limit) = limit {
                results.truncate(limit);
            }
            if results.is_empty() {
                println!("无匹配结果");
                return Ok(());
            }
            for (offset, item) in results.iter().enumerate() {
                print_item_line(offset + 1, item);
            }
        }
        Commands::Peek => {
            let items = store.get_items()?;
            match items.last() {
                Some(item) => println!("{}", item.content),
                None => println!("历史为空"),
            }
        }
        Commands::Pop => {
            let items = store.get_items()?;
            let item = items.last().ok_or(AppError::IndexOutOfRange { index: 0, len: 0 })?;
            SystemClipboard::new()?.set_text(&item.content)?;
            println!(
                "已复制最新条目 [{}] {}",
                item.content_type.as_str(),
                format_preview(&item.content, 60)
            );
        }
        Commands::Restore { number } => {
            let len = store.len()?;
            if number == 0 || number > len {
                return Err(AppError::IndexOutOfRange { index: number, len });
            }
            let item = store.restore_item(len - number)?;
            SystemClipboard::new()?.set_text(&item.content)?;
            println!(
                "已恢复第 {number} 条 [{}] {}",
                item.content_type.as_str(),
                format_preview(&item.content, 60)
            );
        }
        Commands::Clear => {
            let count = store.len()?;
            store.clear()?;
            println!("已清空 {count} 条历史");
        }
        Commands::Export { path } => {
            let count = store.export(&path)?;
            println!("已导出 {count} 条到 {}", path.display());
        }
        Commands::Import { path } => {
            let count = store.import(&path)?;
            println!("已从 {} 导入，当前共 {count} 条", path.display());
        }
        Commands::Stats => {
            let stats = store.get_history_stats()?;
            println!("总条数: {}", stats.total_items);
            println!("总字符数: {}", stats.total_characters);
            println!("总词数: {}", stats.total_words);
            println!("总段数: {}", stats.total_lines);
            println!("平均长度: {:.1}", stats.average_length);
            if !stats.content_types.is_empty() {
                println!("按类型:");
                for (label, count) in &stats.content_types {
                    println!("  {label:<9} {count}");
                }
            }
        }
        Commands::Monitor { interval_ms } => {
            let interval = interval_ms.unwrap_or(app_config.poll_interval_ms);
            let handle = monitor::start_monitoring(Arc::new(store), interval);
            handle.join();
        }
    }

    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("错误: {err}");
        std::process::exit(1);
    }
}
