//! # 分子结构数据模型
//!
//! 原子符号与笛卡尔坐标（Å），只读地供给 makefort10 与 prep 使用。
//!
//! ## 依赖关系
//! - 被 `parsers/xyz.rs`, `calculations/`, `workflows/` 使用
//! - 使用 `models/elements.rs`

use super::elements::{atomic_number, ANGSTROM_TO_BOHR, BOHR_ANGSTROM};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// 原子信息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Atom {
    /// 元素符号
    pub element: String,

    /// 笛卡尔坐标 [x, y, z]，单位 Å
    pub position: [f64; 3],
}

impl Atom {
    pub fn new(element: impl Into<String>, position: [f64; 3]) -> Self {
        Atom {
            element: element.into(),
            position,
        }
    }

    /// 以 Bohr 为单位的坐标
    pub fn position_bohr(&self) -> [f64; 3] {
        self.position.map(|x| x / BOHR_ANGSTROM)
    }
}

/// 分子结构
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Structure {
    /// 结构名称
    pub name: String,

    /// 原子列表
    pub atoms: Vec<Atom>,
}

impl Structure {
    pub fn new(name: impl Into<String>, atoms: Vec<Atom>) -> Self {
        Structure {
            name: name.into(),
            atoms,
        }
    }

    /// 计算化学式
    pub fn formula(&self) -> String {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();

        for atom in &self.atoms {
            *counts.entry(atom.element.as_str()).or_insert(0) += 1;
        }

        counts
            .into_iter()
            .map(|(el, count)| {
                if count == 1 {
                    el.to_string()
                } else {
                    format!("{}{}", el, count)
                }
            })
            .collect::<Vec<_>>()
            .join("")
    }

    /// 结构中出现的元素，按原子序数升序
    pub fn species(&self) -> Result<Vec<(u32, String)>> {
        let mut seen = BTreeSet::new();
        for atom in &self.atoms {
            seen.insert((atomic_number(&atom.element)?, atom.element.clone()));
        }
        Ok(seen.into_iter().collect())
    }

    /// 各方向坐标跨度 (max - min)，单位 Å
    pub fn extent(&self) -> [f64; 3] {
        if self.atoms.is_empty() {
            return [0.0; 3];
        }
        let mut min = [f64::INFINITY; 3];
        let mut max = [f64::NEG_INFINITY; 3];
        for atom in &self.atoms {
            for k in 0..3 {
                min[k] = min[k].min(atom.position[k]);
                max[k] = max[k].max(atom.position[k]);
            }
        }
        [max[0] - min[0], max[1] - min[1], max[2] - min[2]]
    }

    /// prep 默认模拟盒子：(跨度 + 15 Å) 换算为 Bohr
    pub fn default_box(&self) -> [f64; 3] {
        self.extent().map(|d| (d + 15.0) * ANGSTROM_TO_BOHR)
    }
}
