//! # XYZ 格式解析器
//!
//! ## XYZ 格式说明
//! ```text
//! 3                      # number of atoms
//! water                  # comment line (structure name)
//! O  0.0  0.0  0.1173    # symbol x y z (Å)
//! ...
//! ```
//!
//! ## 依赖关系
//! - 被 `commands/`, `calculations/makefort10.rs` 使用
//! - 使用 `models/structure.rs`

use crate::error::{Result, TurboflowError};
use crate::models::{Atom, Structure};
use std::fs;
use std::path::Path;

/// 解析 XYZ 文件
pub fn parse_xyz_file(path: &Path) -> Result<Structure> {
    let content = fs::read_to_string(path).map_err(|e| TurboflowError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_xyz_content(
        &content,
        path.file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown"),
    )
}

/// 从字符串内容解析 XYZ 格式
pub fn parse_xyz_content(content: &str, default_name: &str) -> Result<Structure> {
    let parse_error = |reason: String| TurboflowError::ParseError {
        format: "xyz".to_string(),
        path: default_name.to_string(),
        reason,
    };

    let lines: Vec<&str> = content.lines().collect();
    if lines.len() < 2 {
        return Err(parse_error("File too short".to_string()));
    }

    let natoms: usize = lines[0]
        .trim()
        .parse()
        .map_err(|_| parse_error(format!("Invalid atom count '{}'", lines[0].trim())))?;

    // 扩展 XYZ 的注释行可能是 key=value 列表，此时不作为名称
    let comment = lines[1].trim();
    let name = if comment.is_empty() || comment.contains('=') {
        default_name.to_string()
    } else {
        comment.to_string()
    };

    let mut atoms = Vec::with_capacity(natoms);
    for (i, line) in lines.iter().skip(2).take(natoms).enumerate() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 4 {
            return Err(parse_error(format!("Invalid atom line {}", i + 3)));
        }
        let mut position = [0.0; 3];
        for k in 0..3 {
            position[k] = parts[k + 1]
                .parse()
                .map_err(|_| parse_error(format!("Invalid coordinate at line {}", i + 3)))?;
        }
        atoms.push(Atom::new(parts[0], position));
    }

    if atoms.len() != natoms {
        return Err(parse_error(format!(
            "Expected {} atoms, found {}",
            natoms,
            atoms.len()
        )));
    }

    Ok(Structure::new(name, atoms))
}

/// 将 Structure 转换为 XYZ 格式字符串
pub fn to_xyz_string(structure: &Structure) -> String {
    let mut result = format!("{}\n{}\n", structure.atoms.len(), structure.name);
    for atom in &structure.atoms {
        result.push_str(&format!(
            "{:<2} {:16.10} {:16.10} {:16.10}\n",
            atom.element, atom.position[0], atom.position[1], atom.position[2]
        ));
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    const WATER: &str = "3\nwater\nO 0.0 0.0 0.1173\nH 0.0 0.7572 -0.4692\nH 0.0 -0.7572 -0.4692\n";

    #[test]
    fn test_parse_xyz() {
        let s = parse_xyz_content(WATER, "fallback").unwrap();
        assert_eq!(s.name, "water");
        assert_eq!(s.atoms.len(), 3);
        assert_eq!(s.atoms[1].element, "H");
        assert!((s.atoms[2].position[1] + 0.7572).abs() < 1e-12);
    }

    #[test]
    fn test_extended_comment_uses_default_name() {
        let content = "1\nLattice=\"\" Properties=species:S:1:pos:R:3\nH 0 0 0\n";
        let s = parse_xyz_content(content, "h").unwrap();
        assert_eq!(s.name, "h");
    }

    #[test]
    fn test_truncated_file_is_an_error() {
        let content = "3\nwater\nO 0.0 0.0 0.1173\n";
        assert!(parse_xyz_content(content, "w").is_err());
        assert!(parse_xyz_content("x\n\n", "w").is_err());
    }

    #[test]
    fn test_xyz_round_trip() {
        let s = parse_xyz_content(WATER, "w").unwrap();
        let back = parse_xyz_content(&to_xyz_string(&s), "w").unwrap();
        assert_eq!(back.atoms, s.atoms);
        assert_eq!(back.name, "water");
    }
}
