//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `prepare`: 生成单个作业目录
//! - `run`: 在本地运行单个作业并解析结果
//! - `parse`: 解析已有的回收目录
//! - `workflow`: 运行工作流（嵌套子命令）
//!   - `dft`, `dft-precise`, `qmc`
//! - `basis`: 基组与赝势工具（嵌套子命令）
//!   - `cut`, `pseudo`
//! - `collect`: 并行解析大量回收目录并导出 CSV
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: prepare, run, parse, workflow, basis, collect

pub mod basis;
pub mod collect;
pub mod parse;
pub mod prepare;
pub mod run;
pub mod workflow;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// turboflow - TurboRVB 作业准备、输出解析与工作流
#[derive(Parser)]
#[command(name = "turboflow")]
#[command(author = "Changjiang Wu")]
#[command(version)]
#[command(about = "Job preparation, output parsing and workflow chains for TurboRVB", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Silence all log output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Also write logs to this file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// Stage the working directory of one calculation described by a job TOML
    Prepare(prepare::PrepareArgs),

    /// Run one calculation locally and print its parsed results
    Run(run::RunArgs),

    /// Parse an existing retrieved directory
    Parse(parse::ParseArgs),

    /// Run a workflow chain locally
    Workflow(workflow::WorkflowArgs),

    /// Basis-set and pseudopotential utilities
    Basis(basis::BasisArgs),

    /// Parse many retrieved directories in parallel and export a CSV
    Collect(collect::CollectArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::try_parse_from(["turboflow", "-vv", "parse", "vmc", "out", "--log-file", "l.log"])
            .unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(!cli.quiet);
        assert_eq!(cli.log_file, Some(PathBuf::from("l.log")));
        assert!(matches!(cli.command, Commands::Parse(_)));
    }
}
