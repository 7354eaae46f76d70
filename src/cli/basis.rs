//! # basis 子命令 CLI 定义
//!
//! 基组与赝势工具，包含多个子命令：
//! - `cut`: 去掉指数不小于 Z² 的原函数
//! - `pseudo`: 按 fort.10 中的元素组装 pseudo.dat
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/basis.rs`

use clap::{Args, Subcommand};
use std::path::PathBuf;

/// basis 主命令参数
#[derive(Args, Debug)]
pub struct BasisArgs {
    #[command(subcommand)]
    pub command: BasisCommands,
}

/// basis 子命令
#[derive(Subcommand, Debug)]
pub enum BasisCommands {
    /// Drop primitives whose exponent is at least Z squared
    Cut(CutArgs),

    /// Assemble pseudo.dat for the elements of a fort.10
    Pseudo(PseudoArgs),
}

/// cut 子命令参数
#[derive(Args, Debug)]
pub struct CutArgs {
    /// Structured basis sets (TOML, one [[basis]] table per element)
    pub input: PathBuf,

    /// Output TOML
    #[arg(short, long)]
    pub output: PathBuf,
}

/// pseudo 子命令参数
#[derive(Args, Debug)]
pub struct PseudoArgs {
    /// Wave-function file whose header lists the atoms
    pub fort10: PathBuf,

    /// Pseudopotentials (TOML, one [[pseudo]] table per element)
    pub library: PathBuf,

    /// Output file
    #[arg(short, long, default_value = "pseudo.dat")]
    pub output: PathBuf,
}
