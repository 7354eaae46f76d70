//! # collect 子命令 CLI 定义
//!
//! 并行解析大量回收目录并导出 CSV
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/collect.rs`

use clap::{Args, ValueEnum};
use std::path::PathBuf;

/// 可汇总的计算种类
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum CollectKind {
    /// DFT (prep.output)
    Prep,
    /// VMC (pip0.d)
    Vmc,
    /// LRDMC (pip0_fn.d)
    Lrdmc,
}

impl std::fmt::Display for CollectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollectKind::Prep => write!(f, "prep"),
            CollectKind::Vmc => write!(f, "vmc"),
            CollectKind::Lrdmc => write!(f, "lrdmc"),
        }
    }
}

/// collect 子命令参数
#[derive(Args, Debug)]
pub struct CollectArgs {
    /// Root directory to search for retrieved folders
    pub root: PathBuf,

    /// Calculation that produced the folders
    #[arg(long, value_enum)]
    pub kind: CollectKind,

    /// Output CSV file
    #[arg(long, default_value = "results.csv")]
    pub output: PathBuf,

    /// Glob on the folder path relative to the root (e.g., '*/retrieved')
    #[arg(long)]
    pub pattern: Option<String>,

    /// Number of parallel jobs (0 = all CPUs)
    #[arg(short, long, default_value_t = 0)]
    pub jobs: usize,
}
