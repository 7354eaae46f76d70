//! # pseudo.dat 写入器
//!
//! 把各元素的赝势按原子序数升序拼接为 TurboRVB 的 `pseudo.dat`。
//!
//! ## 格式说明
//! ```text
//! ECP
//!   1   1.5000000000   2        # 元素序号(从 1 开始) 截断半径 分量数
//!   3   1                       # 每个分量的项数
//!   4.0000000000  1   5.0000000000    # 系数 r 幂次 指数
//!   ...
//! ```
//!
//! ## 依赖关系
//! - 被 `commands/basis.rs` 使用
//! - 使用 `models/pseudo.rs`, `parsers/fort10.rs`

use crate::error::{Result, TurboflowError};
use crate::models::elements::chemical_symbol;
use crate::models::PseudoPotential;
use std::collections::{BTreeMap, BTreeSet};

/// 单个元素的赝势块
pub fn pseudo_block(pseudo: &PseudoPotential, index: usize) -> String {
    let mut out = format!(
        "{:4} {:14.10} {:4}\n",
        index,
        pseudo.cutoff,
        pseudo.components.len()
    );

    let counts: Vec<String> = pseudo
        .term_counts()
        .iter()
        .map(|n| format!("{:4}", n))
        .collect();
    out.push_str(&counts.join(""));
    out.push('\n');

    for term in pseudo.components.iter().flatten() {
        out.push_str(&format!(
            "{:20.10} {:3} {:20.10}\n",
            term.coefficient, term.r_power, term.exponent
        ));
    }
    out
}

/// 按原子序数升序组装 `pseudo.dat`，重复元素只写一次
pub fn assemble_pseudo(
    atomic_numbers: &[u32],
    pseudos: &BTreeMap<String, PseudoPotential>,
) -> Result<String> {
    let elements: BTreeSet<u32> = atomic_numbers.iter().copied().collect();

    let mut out = String::from("ECP\n");
    for (i, z) in elements.into_iter().enumerate() {
        let symbol = chemical_symbol(z)?;
        let pseudo = pseudos
            .get(symbol)
            .ok_or_else(|| TurboflowError::MissingPseudo(symbol.to_string()))?;
        tracing::debug!(element = symbol, index = i + 1, "assembling pseudopotential");
        out.push_str(&pseudo_block(pseudo, i + 1));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::pseudo::PseudoTerm;

    fn pseudo(element: &str, cutoff: f64) -> PseudoPotential {
        PseudoPotential {
            element: element.to_string(),
            core_electrons: 2,
            cutoff,
            components: vec![
                vec![
                    PseudoTerm {
                        coefficient: 4.0,
                        r_power: 1,
                        exponent: 5.0,
                    },
                    PseudoTerm {
                        coefficient: -2.5,
                        r_power: 2,
                        exponent: 1.25,
                    },
                ],
                vec![PseudoTerm {
                    coefficient: 0.5,
                    r_power: 2,
                    exponent: 0.75,
                }],
            ],
        }
    }

    #[test]
    fn test_block_layout() {
        let block = pseudo_block(&pseudo("O", 1.5), 2);
        let lines: Vec<&str> = block.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "   2   1.5000000000    2");
        assert_eq!(lines[1], "   2   1");
        let fields: Vec<&str> = lines[3].split_whitespace().collect();
        assert_eq!(fields, vec!["-2.5000000000", "2", "1.2500000000"]);
    }

    #[test]
    fn test_assembly_is_sorted_and_deduplicated() {
        let mut pseudos = BTreeMap::new();
        pseudos.insert("O".to_string(), pseudo("O", 1.5));
        pseudos.insert("C".to_string(), pseudo("C", 2.0));

        let text = assemble_pseudo(&[8, 6, 8, 8], &pseudos).unwrap();
        assert!(text.starts_with("ECP\n   1   2.0000000000    2\n"));
        assert!(text.contains("   2   1.5000000000    2\n"));
        assert_eq!(text.matches("ECP").count(), 1);
        assert_eq!(text.lines().count(), 1 + 2 * 5);
    }

    #[test]
    fn test_missing_pseudo() {
        let pseudos = BTreeMap::new();
        assert!(matches!(
            assemble_pseudo(&[1], &pseudos),
            Err(TurboflowError::MissingPseudo(ref s)) if s == "H"
        ));
    }
}
