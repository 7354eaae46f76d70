//! # 高斯基组数据模型
//!
//! 两种输入表示（原始字典 / 结构化基组）在边界处统一解析为 `AtomBasis`，
//! 之后的格式化只处理 `AtomBasis`。
//!
//! ## 依赖关系
//! - 被 `parsers/makefort10_input.rs`, `commands/basis.rs` 使用
//! - 使用 `models/elements.rs`

use super::elements::atomic_number;
use crate::error::{Result, TurboflowError};
use serde::{Deserialize, Serialize};

/// 允许的最大角动量 (h 轨道)
pub const MAX_ANGULAR_MOMENTUM: u32 = 5;

/// 单个高斯函数的 makefort10 轨道代码
pub fn orbital_code(l: u32) -> Option<u32> {
    match l {
        0 => Some(16),
        1 => Some(36),
        2 => Some(68),
        3 => Some(48),
        4 => Some(51),
        5 => Some(72),
        _ => None,
    }
}

/// 收缩高斯壳层的 makefort10 轨道代码
pub fn contracted_orbital_code(l: u32) -> Option<u32> {
    if l <= MAX_ANGULAR_MOMENTUM {
        Some(300 + 100 * l)
    } else {
        None
    }
}

/// 高斯原函数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Primitive {
    pub exponent: f64,
    pub coefficient: f64,
}

/// 同一角动量的壳层
#[derive(Debug, Clone, PartialEq)]
pub struct Shell {
    pub angular_momentum: u32,
    pub primitives: Vec<Primitive>,
}

/// 单个元素的基组（规范表示）
#[derive(Debug, Clone, PartialEq)]
pub struct AtomBasis {
    pub element: String,
    pub shells: Vec<Shell>,
    pub valence_electrons: f64,
}

/// 原始字典形式：每个壳层是 `[l, exponent, coefficient]` 三元组列表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawBasis {
    pub basis: Vec<Vec<(u32, f64, f64)>>,
    pub valence_electrons: f64,
}

/// 结构化基组中的一个块
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasisBlock {
    /// 主量子数
    pub n: u32,
    /// `[角动量, 函数个数]` 列表，只使用第一项的角动量
    pub l: Vec<[u32; 2]>,
    /// `[exponent, coefficient]` 列表
    pub coefficients: Vec<[f64; 2]>,
}

/// 结构化基组（来自基组库）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredBasis {
    pub element: String,
    pub name: String,
    /// 价电子数
    pub n_el: u32,
    pub blocks: Vec<BasisBlock>,
}

/// 基组来源
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BasisSource {
    Structured(StructuredBasis),
    Raw(RawBasis),
}

impl BasisSource {
    /// 解析为规范的 `AtomBasis`
    pub fn resolve(&self, element: &str) -> Result<AtomBasis> {
        let shells = match self {
            BasisSource::Raw(raw) => raw
                .basis
                .iter()
                .map(|triples| shell_from_triples(element, triples))
                .collect::<Result<Vec<_>>>()?,
            BasisSource::Structured(sb) => sb
                .blocks
                .iter()
                .map(|block| shell_from_block(element, block))
                .collect::<Result<Vec<_>>>()?,
        };

        let valence_electrons = match self {
            BasisSource::Raw(raw) => raw.valence_electrons,
            BasisSource::Structured(sb) => sb.n_el as f64,
        };

        Ok(AtomBasis {
            element: element.to_string(),
            shells,
            valence_electrons,
        })
    }
}

fn check_angular_momentum(element: &str, l: u32) -> Result<u32> {
    if l > MAX_ANGULAR_MOMENTUM {
        return Err(TurboflowError::UnsupportedAngularMomentum {
            element: element.to_string(),
            l,
        });
    }
    Ok(l)
}

fn shell_from_triples(element: &str, triples: &[(u32, f64, f64)]) -> Result<Shell> {
    let first = triples.first().ok_or_else(|| {
        TurboflowError::InvalidArgument(format!("Empty shell in basis of {}", element))
    })?;

    let mut momenta: Vec<u32> = triples.iter().map(|t| t.0).collect();
    momenta.sort_unstable();
    momenta.dedup();
    if momenta.len() > 1 {
        return Err(TurboflowError::MixedAngularMomentum {
            element: element.to_string(),
            found: momenta,
        });
    }

    Ok(Shell {
        angular_momentum: check_angular_momentum(element, first.0)?,
        primitives: triples
            .iter()
            .map(|&(_, exponent, coefficient)| Primitive {
                exponent,
                coefficient,
            })
            .collect(),
    })
}

fn shell_from_block(element: &str, block: &BasisBlock) -> Result<Shell> {
    let l = block.l.first().map(|pair| pair[0]).ok_or_else(|| {
        TurboflowError::InvalidArgument(format!(
            "Basis block of {} has no angular momentum",
            element
        ))
    })?;

    Ok(Shell {
        angular_momentum: check_angular_momentum(element, l)?,
        primitives: block
            .coefficients
            .iter()
            .map(|&[exponent, coefficient]| Primitive {
                exponent,
                coefficient,
            })
            .collect(),
    })
}

impl StructuredBasis {
    /// 去掉指数不小于 Z² 的原函数；空块整体删除，名称追加 `-cut`
    pub fn cut(&self) -> Result<StructuredBasis> {
        let z = atomic_number(&self.element)? as f64;
        let limit = z * z;

        let blocks = self
            .blocks
            .iter()
            .filter_map(|block| {
                let coefficients: Vec<[f64; 2]> = block
                    .coefficients
                    .iter()
                    .copied()
                    .filter(|[exp, _]| *exp < limit)
                    .collect();
                if coefficients.is_empty() {
                    None
                } else {
                    Some(BasisBlock {
                        n: block.n,
                        l: block.l.clone(),
                        coefficients,
                    })
                }
            })
            .collect();

        Ok(StructuredBasis {
            element: self.element.clone(),
            name: format!("{}-cut", self.name),
            n_el: self.n_el,
            blocks,
        })
    }
}
