//! # prep.output 解析器
//!
//! 从 DFT (prep) 输出中提取每次迭代的能量与最终自洽能量。
//!
//! ## 解析规则
//! - 含 `Iter` 的行：`Iter` 之后的第 6 个字段（下标 6）为该次迭代能量；
//!   字段不足时跳过该行
//! - 含 `inal self c` 的行：第 7 个字段（下标 6）为最终能量；
//!   从未出现时能量为 0.0
//!
//! ## 依赖关系
//! - 被 `calculations/prep.rs`, `commands/collect.rs` 使用

use crate::error::{Result, TurboflowError};
use std::fs;
use std::path::Path;

const ITER_MARKER: &str = "Iter";
const FINAL_MARKER: &str = "inal self c";
const ITER_TOKEN: usize = 6;
const FINAL_TOKEN: usize = 6;

/// prep 输出中的能量信息
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PrepLog {
    pub energy: f64,
    pub convergence: Vec<f64>,
}

/// 解析 prep.output 文件
pub fn parse_prep_output(path: &Path) -> Result<PrepLog> {
    let content = fs::read_to_string(path).map_err(|e| TurboflowError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_prep_content(&content, &path.display().to_string())
}

/// 从字符串内容解析
pub fn parse_prep_content(content: &str, source: &str) -> Result<PrepLog> {
    let parse_float = |token: &str, line_no: usize| -> Result<f64> {
        token.parse().map_err(|_| TurboflowError::ParseError {
            format: "prep.output".to_string(),
            path: source.to_string(),
            reason: format!("Invalid number '{}' at line {}", token, line_no),
        })
    };

    let mut log = PrepLog::default();

    for (i, line) in content.lines().enumerate() {
        let tokens: Vec<&str> = line.split_whitespace().collect();

        if line.contains(ITER_MARKER) {
            match tokens.get(ITER_TOKEN) {
                Some(token) => log.convergence.push(parse_float(token, i + 1)?),
                None => tracing::debug!(line = i + 1, "iteration line without energy, skipped"),
            }
        }

        if line.contains(FINAL_MARKER) {
            let token = tokens.get(FINAL_TOKEN).ok_or_else(|| TurboflowError::ParseError {
                format: "prep.output".to_string(),
                path: source.to_string(),
                reason: format!("Final energy line {} is too short", i + 1),
            })?;
            log.energy = parse_float(token, i + 1)?;
        }
    }

    Ok(log)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iteration_energy() {
        let log = parse_prep_content("Iter    1    2    3    4    5   -7.123456\n", "p").unwrap();
        assert_eq!(log.convergence, vec![-7.123456]);
        assert_eq!(log.energy, 0.0);
    }

    #[test]
    fn test_short_iteration_line_is_skipped() {
        let content = "\
 Iter  Total energy
 Iter  1  0.1  0.2  0.3  0.4
 Iter  1  0.1  0.2  0.3  0.4  -17.1
 Iter  2  0.1  0.2  0.3  0.4  -17.2
 Final self consistent energy (Ha) =  -17.25
";
        let log = parse_prep_content(content, "p").unwrap();
        assert_eq!(log.convergence, vec![-17.1, -17.2]);
        assert_eq!(log.energy, -17.25);
    }

    #[test]
    fn test_bad_token_is_an_error() {
        assert!(parse_prep_content("Iter 1 2 3 4 5 abc\n", "p").is_err());
        assert!(parse_prep_content("Final self c\n", "p").is_err());
    }
}
