//! # run 子命令 CLI 定义
//!
//! 在本地运行单个作业
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/run.rs`

use clap::Args;
use std::path::PathBuf;

/// run 子命令参数
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Job description (TOML)
    pub job: PathBuf,

    /// Root directory for job folders
    #[arg(long, default_value = "jobs")]
    pub work_root: PathBuf,

    /// Program that reads the driver script on stdin
    #[arg(long, default_value = "bash")]
    pub code: String,
}
