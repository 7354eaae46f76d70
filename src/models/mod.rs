//! # 数据模型模块
//!
//! 定义分子结构、基组、赝势与计算结果数据模型。
//!
//! ## 依赖关系
//! - 被 `parsers/`, `calculations/`, `workflows/` 和 `commands/` 使用
//! - 子模块: elements, structure, basis, pseudo, results

pub mod basis;
pub mod elements;
pub mod pseudo;
pub mod results;
pub mod structure;

pub use basis::{AtomBasis, BasisSource, Shell, StructuredBasis};
pub use pseudo::PseudoPotential;
pub use results::{Estimate, LrdmcResult, PrepResult, VmcResult, VmcoptResult};
pub use structure::{Atom, Structure};
