//! # prepare 子命令 CLI 定义
//!
//! 按作业 TOML 生成工作目录，可选生成 sbatch 包装脚本
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/prepare.rs`

use clap::Args;
use std::path::PathBuf;

/// prepare 子命令参数
#[derive(Args, Debug)]
pub struct PrepareArgs {
    /// Job description (TOML)
    pub job: PathBuf,

    /// Directory to stage the job into
    #[arg(short, long)]
    pub output: PathBuf,

    /// Program that reads the driver script on stdin
    #[arg(long, default_value = "bash")]
    pub code: String,

    // ─────────────────────────────────────────────────────────────
    // Slurm options
    // ─────────────────────────────────────────────────────────────
    /// Also write a Slurm wrapper script (submit.sbatch)
    #[arg(long, default_value_t = false)]
    pub sbatch: bool,

    /// Slurm partition
    #[arg(long, default_value = "compute")]
    pub partition: String,

    /// Number of nodes (defaults to the job's num_machines)
    #[arg(long)]
    pub nodes: Option<u32>,

    /// Number of tasks (defaults to the job's total MPI processes)
    #[arg(long)]
    pub ntasks: Option<u32>,

    /// Time limit (e.g., '24:00:00')
    #[arg(long, default_value = "24:00:00")]
    pub time: String,

    /// Module list (comma-separated)
    #[arg(long, default_value = "")]
    pub modules: String,
}
