//! # 赝势数据模型
//!
//! 半局域高斯赝势：每个分量是一组 `c · r^(n-2) · exp(-α r²)` 项，
//! 第一个分量为局域部分，其余依次为 l = 0, 1, ... 的非局域部分。
//!
//! ## 依赖关系
//! - 被 `parsers/pseudo_dat.rs`, `commands/basis.rs` 使用

use serde::{Deserialize, Serialize};

/// 赝势中的一个高斯项
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PseudoTerm {
    pub coefficient: f64,
    /// r 的幂次 n（TurboRVB 约定）
    pub r_power: i32,
    pub exponent: f64,
}

/// 单个元素的赝势
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PseudoPotential {
    pub element: String,
    /// 去除的芯电子数
    #[serde(default)]
    pub core_electrons: u32,
    /// 截断半径 (Bohr)
    pub cutoff: f64,
    pub components: Vec<Vec<PseudoTerm>>,
}

impl PseudoPotential {
    /// 各分量的项数
    pub fn term_counts(&self) -> Vec<usize> {
        self.components.iter().map(|c| c.len()).collect()
    }
}
