//! # makefort10 默认 namelist
//!
//! 每次调用都生成一份新的默认参数，不在多次计算之间共享可变状态。
//!
//! ## 依赖关系
//! - 被 `calculations/makefort10.rs` 使用

use super::{NamelistGroup, NamelistValue, ValueKind};
use crate::error::{Result, TurboflowError};

/// makefort10.input 中的三个 namelist 组
#[derive(Debug, Clone, PartialEq)]
pub struct Makefort10Namelists {
    pub system: NamelistGroup,
    pub electrons: NamelistGroup,
    pub symmetries: NamelistGroup,
}

impl Makefort10Namelists {
    /// 默认参数模板
    pub fn defaults() -> Result<Self> {
        let mut system = NamelistGroup::new("system");
        system.add("posunits", ValueKind::Str, "bohr", false)?;
        system.add("natoms", ValueKind::Int, 1, false)?;
        system.add("ntyp", ValueKind::Int, 1, false)?;
        system.add("complexfort10", ValueKind::Bool, false, false)?;
        system.add("pbcfort10", ValueKind::Bool, false, false)?;

        let mut electrons = NamelistGroup::new("electrons");
        electrons.add("orbtype", ValueKind::Str, "normal", false)?;
        electrons.add("jorbtype", ValueKind::Str, "normal", false)?;
        electrons.add("twobody", ValueKind::Int, -15, false)?;
        electrons.add("twobodypar", ValueKind::Float, 1.0, false)?;
        electrons.add("twobodypar(1)", ValueKind::Float, 1.0, true)?;
        electrons.add("twobodypar(2)", ValueKind::Float, 1.0, true)?;
        electrons.add("filling", ValueKind::Str, "diagonal", false)?;
        electrons.add("yes_crystal", ValueKind::Bool, false, false)?;
        electrons.add("yes_crystalj", ValueKind::Bool, false, false)?;
        electrons.add("no_4body_jas", ValueKind::Bool, true, false)?;
        electrons.add("neldiff", ValueKind::Int, 0, false)?;
        electrons.add("onebodypar(1)", ValueKind::Float, 1.0, true)?;

        let mut symmetries = NamelistGroup::new("symmetries");
        symmetries.add("nosym", ValueKind::Bool, false, false)?;
        symmetries.add("eqatoms", ValueKind::Bool, true, false)?;
        symmetries.add("rot_det", ValueKind::Bool, true, false)?;
        symmetries.add("symmagp", ValueKind::Bool, true, true)?;
        symmetries.add("nosym_contr", ValueKind::Bool, true, true)?;

        Ok(Makefort10Namelists {
            system,
            electrons,
            symmetries,
        })
    }

    /// 更新所有含有 `key` 的组；没有任何组含有时报错
    pub fn apply_update(&mut self, key: &str, value: &NamelistValue) -> Result<()> {
        let mut found = false;
        for group in [&mut self.system, &mut self.electrons, &mut self.symmetries] {
            if group.contains(key) {
                group.update(key, value.clone())?;
                found = true;
            }
        }
        if !found {
            return Err(TurboflowError::UnknownNamelistKey {
                group: "system/electrons/symmetries".to_string(),
                key: key.to_string(),
            });
        }
        Ok(())
    }

    /// 按顺序输出三个组
    pub fn dump(&self) -> String {
        format!(
            "{}{}{}",
            self.system.dump(),
            self.electrons.dump(),
            self.symmetries.dump()
        )
    }
}
