//! # 计算结果数据模型
//!
//! 存储各 TurboRVB 计算解析后的结构化结果。
//!
//! ## 依赖关系
//! - 被 `parsers/` 产生
//! - 被 `calculations/`, `workflows/`, `commands/` 使用

use crate::tree::MemoryTree;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 带统计误差的估计值
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Estimate {
    pub value: f64,
    pub error: f64,
}

impl Estimate {
    pub fn new(value: f64, error: f64) -> Self {
        Estimate { value, error }
    }
}

impl std::fmt::Display for Estimate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.6} ± {:.6}", self.value, self.error)
    }
}

/// DFT (prep) 计算结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrepResult {
    /// 收敛后的波函数 `fort.10_new`
    pub fort10: PathBuf,

    /// `occupationlevels.dat`
    pub occupation_file: PathBuf,

    /// 最终自洽能量 (Ha)，未找到时为 0.0
    pub energy: f64,

    /// 每次迭代的能量
    pub convergence: Vec<f64>,
}

/// VMC 波函数优化结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VmcoptResult {
    pub fort10: PathBuf,
    pub fort10_averaged: PathBuf,
    pub fort11: PathBuf,
    pub fort12: PathBuf,
    pub forces: PathBuf,
    pub story: PathBuf,
}

/// VMC 计算结果
#[derive(Debug, Clone)]
pub struct VmcResult {
    pub fort11: PathBuf,
    pub fort12: PathBuf,

    /// `pip0.d`
    pub energy_data: PathBuf,

    pub energy: Estimate,
    pub variance_square: Estimate,

    /// `turborvb.scratch` 的内存副本，供后续 LRDMC 使用
    pub scratch: MemoryTree,
}

/// LRDMC 计算结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LrdmcResult {
    pub fort11: PathBuf,
    pub fort12: PathBuf,

    /// `pip0_fn.d`
    pub energy_data: PathBuf,

    pub energy: Estimate,
    pub variance_square: Estimate,
}
