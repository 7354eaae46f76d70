//! # fort.10 头部读取
//!
//! 只读取 fort.10 开头的原子块，得到每个原子的原子序数。
//!
//! ## 格式说明
//! ```text
//! # Nelup  Nel  # Ion                 # 以 # 开头的注释行被跳过
//!   4      8    3                     # 第一行数据：第 3 个字段为原子数
//! ...                                 # 其余 5 行头部
//!   6.0   8.0   0.0  0.0  0.22        # 原子行：第 2 个字段为原子序数
//! ```
//!
//! ## 依赖关系
//! - 被 `commands/basis.rs` 使用

use crate::error::{Result, TurboflowError};
use std::fs;
use std::path::Path;

/// 原子行之前的数据行数
const HEADER_LINES: usize = 6;

/// 读取 fort.10 文件中的原子序数（按出现顺序）
pub fn read_atomic_numbers(path: &Path) -> Result<Vec<u32>> {
    let content = fs::read_to_string(path).map_err(|e| TurboflowError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_atomic_numbers(&content, &path.display().to_string())
}

/// 从字符串内容读取原子序数
pub fn parse_atomic_numbers(content: &str, source: &str) -> Result<Vec<u32>> {
    let parse_error = |reason: String| TurboflowError::ParseError {
        format: "fort.10".to_string(),
        path: source.to_string(),
        reason,
    };

    let mut numat: Option<usize> = None;
    let mut atoms = Vec::new();
    let mut index = 0;

    for line in content.lines() {
        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let tokens: Vec<&str> = trimmed.split_whitespace().collect();

        if index == 0 {
            let count = tokens
                .get(2)
                .ok_or_else(|| parse_error("Header line has fewer than 3 fields".to_string()))?;
            numat = Some(
                count
                    .parse()
                    .map_err(|_| parse_error(format!("Invalid atom count '{}'", count)))?,
            );
        }
        if index >= HEADER_LINES {
            let z = tokens
                .get(1)
                .ok_or_else(|| parse_error(format!("Atom line '{}' is too short", trimmed)))?;
            let z: f64 = z
                .parse()
                .map_err(|_| parse_error(format!("Invalid atomic number '{}'", z)))?;
            atoms.push(z as u32);
        }

        index += 1;
        if numat.map_or(false, |n| index >= n + HEADER_LINES) {
            break;
        }
    }

    let numat = numat.ok_or_else(|| parse_error("No data lines".to_string()))?;
    if atoms.len() != numat {
        return Err(parse_error(format!(
            "Expected {} atoms, found {}",
            numat,
            atoms.len()
        )));
    }
    Ok(atoms)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "\
 # Nelup  #Nel  # Ion
          4           8           3
 # Shell Det.   # Shell Jas.
          6           2
 # Jas 2body  # Det   #  3 body atomic par.
         -6           4           0
 # Det mat. =/0  # Jas mat. =/0
          0           0
 # Eq. Det atomic par.  # Eq. 3 body atomic. par.
          0           0
 # unconstrained iesfree,iessw,ieskinr,I/O flag
          0           0           0           0
 # Ion coordinates
   6.00000000000000        8.00000000000000       0.000000000000000E+000
   1.00000000000000        1.00000000000000        1.43
   1.00000000000000        1.00000000000000       -1.43
 # Constraints for forces: ion - coordinate
";

    #[test]
    fn test_read_atomic_numbers() {
        assert_eq!(parse_atomic_numbers(HEADER, "fort.10").unwrap(), vec![8, 1, 1]);
    }

    #[test]
    fn test_stops_after_atom_block() {
        let content = format!("{}  1 1 1\n  garbage\n", HEADER);
        assert_eq!(parse_atomic_numbers(&content, "fort.10").unwrap().len(), 3);
    }

    #[test]
    fn test_truncated_header_is_an_error() {
        let content = "  4 8 3\n 6 2\n";
        assert!(parse_atomic_numbers(content, "fort.10").is_err());
        assert!(parse_atomic_numbers("# only comments\n", "fort.10").is_err());
    }
}
