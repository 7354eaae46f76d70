//! # vmcopt 适配器
//!
//! VMC 波函数优化。优化结束后保留最终波函数为 `fort.10_org`，
//! 并对优化后段的参数做平均得到 `fort.10_averaged`。
//!
//! ## 依赖关系
//! - 被 `workflows/qmc.rs`, `calculations/job_file.rs` 使用

use super::script::DriverScript;
use super::{Calculation, JobOptions, JobSpec, FORT10, FORT11, FORT12};
use crate::engine::RetrievedFolder;
use crate::error::Result;
use crate::models::VmcoptResult;
use crate::namelist::NamelistValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

const INPUT_FILE: &str = "vmcopt.input";
const OUTPUT_FILE: &str = "vmcopt.output";
const FORT10_ORG: &str = "fort.10_org";
const FORT10_AVERAGED: &str = "fort.10_averaged";
const FORCES: &str = "forces.dat";
const STORY: &str = "story.d";

/// vmcopt 参数
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VmcoptParameters {
    pub namelist_update: BTreeMap<String, NamelistValue>,
    /// 平均时丢弃的优化步数
    pub eq: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct Vmcopt {
    pub fort10: PathBuf,
    pub pseudo: Option<PathBuf>,
    pub parameters: VmcoptParameters,
}

impl Calculation for Vmcopt {
    type Output = VmcoptResult;

    fn label(&self) -> &'static str {
        "vmcopt"
    }

    fn prepare(&self, options: &JobOptions) -> Result<JobSpec> {
        let mut post = String::from("turbo-genius.sh -j vmcopt -post");
        if let Some(eq) = self.parameters.eq {
            post.push_str(&format!(" -optwarmup {}", eq));
        }

        let mut script = DriverScript::new();
        script
            .push("turbo-genius.sh -j vmcopt -g")
            .push(format!("cp datasmin.input {}", INPUT_FILE))
            .namelist_update(INPUT_FILE, &self.parameters.namelist_update)
            .push(format!(
                "mpirun -np {} turborvb-mpi.x < {} > {}",
                options.resources.total_mpiprocs(),
                INPUT_FILE,
                OUTPUT_FILE
            ))
            .push(format!("cp {} out_min", OUTPUT_FILE))
            .push(format!("cp {} {}", FORT10, FORT10_ORG))
            .push(post);

        let mut job = JobSpec::new(self.label(), options);
        job.copy(FORT10, &self.fort10)
            .pseudo(self.pseudo.as_ref())
            .inline(&options.input_filename, script.render())
            .retrieve([
                FORT10_ORG,
                FORT10_AVERAGED,
                FORT11,
                FORT12,
                FORCES,
                STORY,
                OUTPUT_FILE,
            ]);
        Ok(job)
    }

    fn parse(&self, retrieved: &RetrievedFolder) -> Result<VmcoptResult> {
        parse_retrieved(retrieved)
    }
}

/// 解析 vmcopt 回收目录
pub fn parse_retrieved(retrieved: &RetrievedFolder) -> Result<VmcoptResult> {
    Ok(VmcoptResult {
        fort10: retrieved.require(FORT10_ORG)?,
        fort10_averaged: retrieved.require(FORT10_AVERAGED)?,
        fort11: retrieved.require(FORT11)?,
        fort12: retrieved.require(FORT12)?,
        forces: retrieved.require(FORCES)?,
        story: retrieved.require(STORY)?,
    })
}
