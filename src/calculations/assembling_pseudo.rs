//! # assemblingpseudo 适配器
//!
//! 按 `fort.10` 中的元素从赝势库组装 `pseudo.dat`。
//!
//! ## 依赖关系
//! - 被 `workflows/dft.rs`, `calculations/job_file.rs` 使用

use super::script::DriverScript;
use super::{Calculation, JobOptions, JobSpec, FORT10, PSEUDO};
use crate::engine::RetrievedFolder;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// assemblingpseudo 参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssemblingPseudoParameters {
    /// 赝势库名称
    pub pseudo: String,
}

#[derive(Debug, Clone)]
pub struct AssemblingPseudo {
    pub fort10: PathBuf,
    pub parameters: AssemblingPseudoParameters,
}

impl Calculation for AssemblingPseudo {
    type Output = PathBuf;

    fn label(&self) -> &'static str {
        "assemblingpseudo"
    }

    fn prepare(&self, options: &JobOptions) -> Result<JobSpec> {
        let mut script = DriverScript::new();
        script.push(format!("echo {} | assembling_pseudo.x", self.parameters.pseudo));

        let mut job = JobSpec::new(self.label(), options);
        job.copy(FORT10, &self.fort10)
            .inline(&options.input_filename, script.render())
            .retrieve([PSEUDO]);
        Ok(job)
    }

    fn parse(&self, retrieved: &RetrievedFolder) -> Result<PathBuf> {
        parse_retrieved(retrieved)
    }
}

/// 回收目录中的 `pseudo.dat`
pub fn parse_retrieved(retrieved: &RetrievedFolder) -> Result<PathBuf> {
    retrieved.require(PSEUDO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::FileSource;

    #[test]
    fn test_prepare() {
        let calc = AssemblingPseudo {
            fort10: PathBuf::from("/data/fort.10_new"),
            parameters: AssemblingPseudoParameters {
                pseudo: "BFD".to_string(),
            },
        };
        let job = calc.prepare(&JobOptions::default()).unwrap();
        assert_eq!(
            job.inline_text("execute.sh").unwrap(),
            "echo BFD | assembling_pseudo.x\n"
        );
        assert_eq!(
            job.file("fort.10"),
            Some(&FileSource::Copy(PathBuf::from("/data/fort.10_new")))
        );
        assert_eq!(job.retrieve_list, vec!["pseudo.dat", "execute.out"]);
    }
}
