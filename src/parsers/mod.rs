//! # 解析器模块
//!
//! 提供结构文件、TurboRVB 输入文件生成与输出文件的解析器。
//!
//! ## 依赖关系
//! - 被 `calculations/`, `commands/`, `workflows/` 使用
//! - 使用 `models/` 数据模型
//! - 子模块: xyz, fort10, makefort10_input, pseudo_dat, prep, pip0

pub mod fort10;
pub mod makefort10_input;
pub mod pip0;
pub mod prep;
pub mod pseudo_dat;
pub mod xyz;

use crate::error::{Result, TurboflowError};
use crate::models::Structure;
use std::path::Path;

/// 从文件路径推断格式并解析结构
pub fn parse_structure_file(path: &Path) -> Result<Structure> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "xyz" => xyz::parse_xyz_file(path),
        _ => Err(TurboflowError::InvalidArgument(format!(
            "Cannot determine structure format for: {}",
            path.display()
        ))),
    }
}
