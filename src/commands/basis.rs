//! # basis 命令实现
//!
//! 基组与赝势工具：
//! - `cut`: 对 TOML 中的每个结构化基组去掉指数不小于 Z² 的原函数
//! - `pseudo`: 读取 fort.10 中的原子序数，从赝势库组装 pseudo.dat
//!
//! ## 依赖关系
//! - 使用 `cli/basis.rs` 定义的参数
//! - 使用 `models/basis.rs`, `models/pseudo.rs`, `parsers/fort10.rs`, `parsers/pseudo_dat.rs`
//! - 使用 `utils/config.rs` 读写 TOML

use crate::cli::basis::{BasisArgs, BasisCommands, CutArgs, PseudoArgs};
use crate::error::{Result, TurboflowError};
use crate::models::{PseudoPotential, StructuredBasis};
use crate::parsers::fort10::read_atomic_numbers;
use crate::parsers::pseudo_dat::assemble_pseudo;
use crate::utils::config::{load_toml, save_toml};
use crate::utils::output;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;

/// 基组文件：`[[basis]]` 表的列表
#[derive(Debug, Serialize, Deserialize)]
pub struct BasisLibrary {
    pub basis: Vec<StructuredBasis>,
}

/// 赝势库：`[[pseudo]]` 表的列表
#[derive(Debug, Deserialize)]
pub struct PseudoLibrary {
    pub pseudo: Vec<PseudoPotential>,
}

impl PseudoLibrary {
    /// 元素 → 赝势
    pub fn by_element(self) -> BTreeMap<String, PseudoPotential> {
        self.pseudo
            .into_iter()
            .map(|p| (p.element.clone(), p))
            .collect()
    }
}

/// 执行 basis 命令
pub fn execute(args: BasisArgs) -> Result<()> {
    match args.command {
        BasisCommands::Cut(cut) => execute_cut(cut),
        BasisCommands::Pseudo(pseudo) => execute_pseudo(pseudo),
    }
}

fn execute_cut(args: CutArgs) -> Result<()> {
    let library: BasisLibrary = load_toml(&args.input)?;
    let cut = cut_library(&library)?;

    for (before, after) in library.basis.iter().zip(&cut.basis) {
        output::print_info(&format!(
            "{}: {} -> {} blocks ({})",
            before.element,
            before.blocks.len(),
            after.blocks.len(),
            after.name
        ));
    }

    save_toml(&cut, &args.output)?;
    output::print_done(&format!("Cut basis written to '{}'", args.output.display()));
    Ok(())
}

/// 对库中每个基组执行 cut
pub fn cut_library(library: &BasisLibrary) -> Result<BasisLibrary> {
    Ok(BasisLibrary {
        basis: library
            .basis
            .iter()
            .map(StructuredBasis::cut)
            .collect::<Result<Vec<_>>>()?,
    })
}

fn execute_pseudo(args: PseudoArgs) -> Result<()> {
    let atomic_numbers = read_atomic_numbers(&args.fort10)?;
    let library: PseudoLibrary = load_toml(&args.library)?;
    let text = assemble_pseudo(&atomic_numbers, &library.by_element())?;

    fs::write(&args.output, text).map_err(|e| TurboflowError::FileWriteError {
        path: args.output.display().to_string(),
        source: e,
    })?;
    output::print_done(&format!(
        "pseudo.dat for {} atom(s) written to '{}'",
        atomic_numbers.len(),
        args.output.display()
    ));
    Ok(())
}
