//! # parse 子命令 CLI 定义
//!
//! 解析已有的回收目录
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/parse.rs`

use crate::calculations::OutputKind;
use clap::{Args, ValueEnum};
use std::path::PathBuf;

/// 回收目录的种类
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum ParseKind {
    /// fort.10_new from makefort10 / convertfort10mol
    Fort10,
    /// pseudo.dat from assemblingpseudo
    Pseudo,
    /// DFT (prep)
    Prep,
    /// VMC wave-function optimisation
    Vmcopt,
    /// VMC
    Vmc,
    /// LRDMC
    Lrdmc,
}

impl From<ParseKind> for OutputKind {
    fn from(kind: ParseKind) -> Self {
        match kind {
            ParseKind::Fort10 => OutputKind::Fort10,
            ParseKind::Pseudo => OutputKind::Pseudo,
            ParseKind::Prep => OutputKind::Prep,
            ParseKind::Vmcopt => OutputKind::Vmcopt,
            ParseKind::Vmc => OutputKind::Vmc,
            ParseKind::Lrdmc => OutputKind::Lrdmc,
        }
    }
}

/// parse 子命令参数
#[derive(Args, Debug)]
pub struct ParseArgs {
    /// Calculation that produced the directory
    #[arg(value_enum)]
    pub kind: ParseKind,

    /// Retrieved directory
    pub dir: PathBuf,
}
