//! # vmc 适配器
//!
//! 变分蒙特卡罗能量计算。除能量外还回收 `turborvb.scratch`，
//! 供随后的 LRDMC 继续使用。
//!
//! ## 依赖关系
//! - 被 `workflows/qmc.rs`, `calculations/job_file.rs`, `commands/collect.rs` 使用
//! - 使用 `parsers/pip0.rs`, `tree/`

use super::script::DriverScript;
use super::{Calculation, JobOptions, JobSpec, FORT10, FORT11, FORT12, SCRATCH};
use crate::engine::RetrievedFolder;
use crate::error::Result;
use crate::models::VmcResult;
use crate::namelist::NamelistValue;
use crate::parsers::pip0::parse_pip0_file;
use crate::tree::{copy_between_trees, MemoryTree};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

const INPUT_FILE: &str = "vmc.input";
const OUTPUT_FILE: &str = "vmc.output";
pub const ENERGY_FILE: &str = "pip0.d";

/// vmc 参数
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VmcParameters {
    pub namelist_update: BTreeMap<String, NamelistValue>,
    /// 后处理丢弃的平衡步数
    pub eq: Option<u32>,
    /// 重新分组 (rebinning) 长度
    pub reb: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct Vmc {
    pub fort10: PathBuf,
    pub pseudo: Option<PathBuf>,
    pub parameters: VmcParameters,
}

impl Calculation for Vmc {
    type Output = VmcResult;

    fn label(&self) -> &'static str {
        "vmc"
    }

    fn prepare(&self, options: &JobOptions) -> Result<JobSpec> {
        let mut post = String::from("turbo-genius.sh -j vmc -post -am manual");
        if let Some(eq) = self.parameters.eq {
            post.push_str(&format!(" -eq {}", eq));
        }
        if let Some(reb) = self.parameters.reb {
            post.push_str(&format!(" -reb {}", reb));
        }

        let mut script = DriverScript::new();
        script
            .push("turbo-genius.sh -j vmc -g")
            .push(format!("cp datasvmc.input {}", INPUT_FILE))
            .namelist_update(INPUT_FILE, &self.parameters.namelist_update)
            .push(format!(
                "mpirun -np {} turborvb-mpi.x < {} > {}",
                options.resources.total_mpiprocs(),
                INPUT_FILE,
                OUTPUT_FILE
            ))
            .push(format!("cp {} out_vmc", OUTPUT_FILE))
            .push(post);

        let mut job = JobSpec::new(self.label(), options);
        job.copy(FORT10, &self.fort10)
            .pseudo(self.pseudo.as_ref())
            .inline(&options.input_filename, script.render())
            .retrieve([
                FORT11,
                FORT12,
                "fort.12_fn",
                ENERGY_FILE,
                "out_forcevmc",
                SCRATCH,
            ]);
        Ok(job)
    }

    fn parse(&self, retrieved: &RetrievedFolder) -> Result<VmcResult> {
        parse_retrieved(retrieved)
    }
}

/// 解析 vmc 回收目录
pub fn parse_retrieved(retrieved: &RetrievedFolder) -> Result<VmcResult> {
    let energy_data = retrieved.require(ENERGY_FILE)?;
    let estimates = parse_pip0_file(&energy_data)?;

    let mut scratch = MemoryTree::new();
    copy_between_trees(SCRATCH, ".", retrieved.tree(), &mut scratch, None)?;

    Ok(VmcResult {
        fort11: retrieved.require(FORT11)?,
        fort12: retrieved.require(FORT12)?,
        energy_data,
        energy: estimates.energy,
        variance_square: estimates.variance_square,
        scratch,
    })
}
