//! # workflow 子命令 CLI 定义
//!
//! 在本地运行工作流，包含多个子命令：
//! - `dft`: makefort10 → [assemblingpseudo] → convertfort10mol → prep
//! - `dft-precise`: 同上，prep 在一系列网格间距上循环
//! - `qmc`: vmcopt → vmc → lrdmc
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/workflow.rs`

use clap::{Args, Subcommand};
use std::path::PathBuf;

/// workflow 主命令参数
#[derive(Args, Debug)]
pub struct WorkflowArgs {
    #[command(subcommand)]
    pub command: WorkflowCommands,
}

/// workflow 子命令
#[derive(Subcommand, Debug)]
pub enum WorkflowCommands {
    /// DFT energy of a structure
    Dft(ChainArgs),

    /// DFT energy over a series of grid spacings
    DftPrecise(DftPreciseArgs),

    /// VMC optimisation, VMC and LRDMC starting from a wave function
    Qmc(ChainArgs),
}

/// 所有工作流共用的参数
#[derive(Args, Debug)]
pub struct ChainArgs {
    /// Workflow description (TOML)
    pub input: PathBuf,

    /// Root directory for job folders
    #[arg(long, default_value = "jobs")]
    pub work_root: PathBuf,
}

/// dft-precise 子命令参数
#[derive(Args, Debug)]
pub struct DftPreciseArgs {
    #[command(flatten)]
    pub chain: ChainArgs,

    /// Write the convergence data to a CSV file
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Plot energy against grid spacing (PNG, or SVG by extension)
    #[arg(long)]
    pub plot: Option<PathBuf>,
}
