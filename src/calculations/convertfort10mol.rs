//! # convertfort10mol 适配器
//!
//! 把 makefort10 生成的波函数转换为分子轨道形式。
//!
//! ## 依赖关系
//! - 被 `workflows/dft.rs`, `calculations/job_file.rs` 使用

use super::script::DriverScript;
use super::{Calculation, JobOptions, JobSpec, FORT10_NEW};
use crate::engine::RetrievedFolder;
use crate::error::Result;
use crate::namelist::NamelistValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

const INPUT_FILE: &str = "convertfort10mol.input";

/// convertfort10mol 参数
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Convertfort10molParameters {
    pub namelist_update: BTreeMap<String, NamelistValue>,
}

#[derive(Debug, Clone)]
pub struct Convertfort10mol {
    pub fort10: PathBuf,
    pub pseudo: Option<PathBuf>,
    pub parameters: Convertfort10molParameters,
}

impl Calculation for Convertfort10mol {
    type Output = PathBuf;

    fn label(&self) -> &'static str {
        "convertfort10mol"
    }

    fn prepare(&self, options: &JobOptions) -> Result<JobSpec> {
        let mut script = DriverScript::new();
        script
            .push("turbo-genius.sh -j convertfort10mol -g")
            .namelist_update(INPUT_FILE, &self.parameters.namelist_update)
            .push(format!(
                "convertfort10mol.x < {} > convertfort10mol.output",
                INPUT_FILE
            ));

        let mut job = JobSpec::new(self.label(), options);
        job.copy("fort.10_in", &self.fort10)
            .pseudo(self.pseudo.as_ref())
            .inline(&options.input_filename, script.render())
            .retrieve([FORT10_NEW]);
        Ok(job)
    }

    fn parse(&self, retrieved: &RetrievedFolder) -> Result<PathBuf> {
        retrieved.require(FORT10_NEW)
    }
}
