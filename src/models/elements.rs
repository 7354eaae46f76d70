//! # 元素周期表与单位常量
//!
//! 元素符号与原子序数互查，以及 Å/Bohr 换算。
//!
//! ## 依赖关系
//! - 被 `models/structure.rs`, `models/basis.rs`, `parsers/` 使用
//! - 无外部模块依赖

use crate::error::{Result, TurboflowError};

/// 1 Bohr 对应的 Å
pub const BOHR_ANGSTROM: f64 = 0.5291772105638411;

/// 1 Å 对应的 Bohr（与 turbo-genius 默认盒子计算保持一致）
pub const ANGSTROM_TO_BOHR: f64 = 1.8897259886;

/// 按原子序数排列的元素符号，下标 0 为占位
const SYMBOLS: [&str; 119] = [
    "X", "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne", "Na", "Mg", "Al", "Si", "P", "S",
    "Cl", "Ar", "K", "Ca", "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn", "Ga", "Ge",
    "As", "Se", "Br", "Kr", "Rb", "Sr", "Y", "Zr", "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd",
    "In", "Sn", "Sb", "Te", "I", "Xe", "Cs", "Ba", "La", "Ce", "Pr", "Nd", "Pm", "Sm", "Eu", "Gd",
    "Tb", "Dy", "Ho", "Er", "Tm", "Yb", "Lu", "Hf", "Ta", "W", "Re", "Os", "Ir", "Pt", "Au", "Hg",
    "Tl", "Pb", "Bi", "Po", "At", "Rn", "Fr", "Ra", "Ac", "Th", "Pa", "U", "Np", "Pu", "Am", "Cm",
    "Bk", "Cf", "Es", "Fm", "Md", "No", "Lr", "Rf", "Db", "Sg", "Bh", "Hs", "Mt", "Ds", "Rg", "Cn",
    "Nh", "Fl", "Mc", "Lv", "Ts", "Og",
];

/// 元素符号 -> 原子序数
pub fn atomic_number(symbol: &str) -> Result<u32> {
    SYMBOLS
        .iter()
        .skip(1)
        .position(|s| *s == symbol)
        .map(|idx| idx as u32 + 1)
        .ok_or_else(|| TurboflowError::UnknownElement(symbol.to_string()))
}

/// 原子序数 -> 元素符号
pub fn chemical_symbol(z: u32) -> Result<&'static str> {
    match SYMBOLS.get(z as usize) {
        Some(s) if z > 0 => Ok(s),
        _ => Err(TurboflowError::UnknownElement(format!("Z={}", z))),
    }
}
