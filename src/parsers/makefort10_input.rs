//! # makefort10.input 写入器
//!
//! 把 namelist、原子坐标和各元素基组写成 makefort10.x 的固定格式输入。
//!
//! ## 基组块格式
//! ```text
//! ATOM_8
//! &shells
//! nshelldet=3
//! nshelljas=1
//! /
//! 1 1 16                          # 单个高斯：2l+1, 1, 轨道代码
//! 1 0.2                           #           1, 指数
//! 3 4 400                         # 收缩壳层：2l+1, 2n, 收缩轨道代码
//! 1  e1  e2  c1  c2               #           1, 指数..., 系数...
//! #  Parameters atomic Jastrow wf
//! ...
//! ```
//!
//! ## 依赖关系
//! - 被 `calculations/makefort10.rs` 使用
//! - 使用 `models/basis.rs`, `namelist/`

use crate::error::{Result, TurboflowError};
use crate::models::basis::{contracted_orbital_code, orbital_code};
use crate::models::elements::atomic_number;
use crate::models::{AtomBasis, Shell, Structure};
use crate::namelist::Makefort10Namelists;
use crate::utils::format::format_real;
use std::collections::BTreeMap;

/// 单个壳层的两行记录
pub fn shell_records(element: &str, shell: &Shell) -> Result<String> {
    let l = shell.angular_momentum;
    let unsupported = || TurboflowError::UnsupportedAngularMomentum {
        element: element.to_string(),
        l,
    };

    match shell.primitives.as_slice() {
        [] => Ok(String::new()),
        [single] => {
            let code = orbital_code(l).ok_or_else(unsupported)?;
            Ok(format!(
                "{} 1 {}\n1 {}\n",
                2 * l + 1,
                code,
                format_real(single.exponent)
            ))
        }
        prims => {
            let code = contracted_orbital_code(l).ok_or_else(unsupported)?;
            let exponents: Vec<String> = prims
                .iter()
                .map(|p| format!("{:20.17}", p.exponent))
                .collect();
            let coefficients: Vec<String> = prims
                .iter()
                .map(|p| format!("{:20.17}", p.coefficient))
                .collect();
            Ok(format!(
                "{} {} {}\n1 {} {}\n",
                2 * l + 1,
                2 * prims.len(),
                code,
                exponents.join(" "),
                coefficients.join(" ")
            ))
        }
    }
}

/// 单个元素的基组块
pub fn basis_block(z: u32, det: &AtomBasis, jas: Option<&AtomBasis>) -> Result<String> {
    let det_shells: Vec<&Shell> = det
        .shells
        .iter()
        .filter(|s| !s.primitives.is_empty())
        .collect();
    let jas_shells: Vec<&Shell> = jas
        .map(|j| j.shells.iter().filter(|s| !s.primitives.is_empty()).collect())
        .unwrap_or_default();

    let mut out = format!("ATOM_{}\n&shells\nnshelldet={}\n", z, det_shells.len());
    if jas.is_some() {
        out.push_str(&format!("nshelljas={}\n", jas_shells.len()));
    }
    out.push_str("/\n");

    for shell in det_shells {
        out.push_str(&shell_records(&det.element, shell)?);
    }
    out.push_str("#  Parameters atomic Jastrow wf\n");
    for shell in jas_shells {
        out.push_str(&shell_records(&det.element, shell)?);
    }
    Ok(out)
}

/// 生成完整的 makefort10.input
pub fn to_makefort10_input(
    namelists: &Makefort10Namelists,
    structure: &Structure,
    determinant: &BTreeMap<String, AtomBasis>,
    jastrow: &BTreeMap<String, AtomBasis>,
) -> Result<String> {
    let mut out = namelists.dump();

    out.push_str("ATOMIC_POSITIONS\n");
    for atom in &structure.atoms {
        let basis = determinant
            .get(&atom.element)
            .ok_or_else(|| TurboflowError::MissingBasis(atom.element.clone()))?;
        let z = atomic_number(&atom.element)?;
        let p = atom.position_bohr();
        out.push_str(&format!(
            "{} {} {:3.10}  {:3.10}  {:3.10}\n",
            format_real(basis.valence_electrons),
            format_real(z as f64),
            p[0],
            p[1],
            p[2]
        ));
    }
    out.push_str("/\n");

    for (z, element) in structure.species()? {
        let det = determinant
            .get(&element)
            .ok_or_else(|| TurboflowError::MissingBasis(element.clone()))?;
        out.push_str(&basis_block(z, det, jastrow.get(&element))?);
    }

    Ok(out)
}
