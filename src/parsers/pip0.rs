//! # pip0.d 解析器
//!
//! VMC (`pip0.d`) 与 LRDMC (`pip0_fn.d`) 的能量统计文件。
//! 第 2 行（下标 1）最后两个字段为能量及误差，
//! 第 3 行（下标 2）最后两个字段为方差及误差。
//!
//! ## 依赖关系
//! - 被 `calculations/vmc.rs`, `calculations/lrdmc.rs`, `commands/collect.rs` 使用

use crate::error::{Result, TurboflowError};
use crate::models::Estimate;
use std::fs;
use std::path::Path;

const ENERGY_LINE: usize = 1;
const VARIANCE_LINE: usize = 2;

/// 能量与方差估计
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergyEstimates {
    pub energy: Estimate,
    pub variance_square: Estimate,
}

/// 解析 pip0 文件
pub fn parse_pip0_file(path: &Path) -> Result<EnergyEstimates> {
    let content = fs::read_to_string(path).map_err(|e| TurboflowError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_pip0_content(&content, &path.display().to_string())
}

pub fn parse_pip0_content(content: &str, source: &str) -> Result<EnergyEstimates> {
    let lines: Vec<&str> = content.lines().collect();
    Ok(EnergyEstimates {
        energy: estimate_at(&lines, ENERGY_LINE, source)?,
        variance_square: estimate_at(&lines, VARIANCE_LINE, source)?,
    })
}

/// 读取指定行的最后两个字段
fn estimate_at(lines: &[&str], index: usize, source: &str) -> Result<Estimate> {
    let parse_error = |reason: String| TurboflowError::ParseError {
        format: "pip0".to_string(),
        path: source.to_string(),
        reason,
    };

    let line = lines
        .get(index)
        .ok_or_else(|| parse_error(format!("Missing line {}", index + 1)))?;
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 2 {
        return Err(parse_error(format!("Line {} has fewer than 2 fields", index + 1)));
    }

    let value = tokens[tokens.len() - 2];
    let error = tokens[tokens.len() - 1];
    Ok(Estimate::new(
        value
            .parse()
            .map_err(|_| parse_error(format!("Invalid number '{}'", value)))?,
        error
            .parse()
            .map_err(|_| parse_error(format!("Invalid number '{}'", error)))?,
    ))
}
