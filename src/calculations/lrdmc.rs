//! # lrdmc 适配器
//!
//! 格点正则化扩散蒙特卡罗。从 VMC 的 `fort.11`/`fort.12` 与 scratch 目录继续，
//! 以 VMC 能量作为试探能量 `etry`。
//!
//! ## 依赖关系
//! - 被 `workflows/qmc.rs`, `calculations/job_file.rs`, `commands/collect.rs` 使用
//! - 使用 `parsers/pip0.rs`, `tree/`

use super::script::{namelist_entries, DriverScript};
use super::{Calculation, JobOptions, JobSpec, FORT10, FORT11, FORT12, SCRATCH};
use crate::engine::RetrievedFolder;
use crate::error::Result;
use crate::models::LrdmcResult;
use crate::namelist::NamelistValue;
use crate::parsers::pip0::parse_pip0_file;
use crate::tree::MemoryTree;
use crate::utils::format::format_real;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

const INPUT_FILE: &str = "fn.input";
const OUTPUT_FILE: &str = "fn.output";
pub const ENERGY_FILE: &str = "pip0_fn.d";

/// lrdmc 参数
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LrdmcParameters {
    pub namelist_update: BTreeMap<String, NamelistValue>,
    pub eq: Option<u32>,
    pub reb: Option<u32>,
    /// 能量文件中的列号
    pub col: Option<u32>,
}

/// scratch 目录来源
#[derive(Debug, Clone, PartialEq)]
pub enum ScratchSource {
    /// 上一步解析得到的内存副本，条目名为 `turborvb.scratch`
    Tree(MemoryTree),
    /// 本地目录
    Directory(PathBuf),
}

#[derive(Debug, Clone)]
pub struct Lrdmc {
    pub fort10: PathBuf,
    pub fort11: PathBuf,
    pub fort12: PathBuf,
    pub pseudo: Option<PathBuf>,
    pub scratch: ScratchSource,
    /// 试探能量 (Ha)
    pub trial_energy: Option<f64>,
    pub parameters: LrdmcParameters,
}

impl Calculation for Lrdmc {
    type Output = LrdmcResult;

    fn label(&self) -> &'static str {
        "lrdmc"
    }

    fn prepare(&self, options: &JobOptions) -> Result<JobSpec> {
        let mut entries = Vec::new();
        if let Some(etry) = self.trial_energy {
            entries.push(("etry".to_string(), format_real(etry)));
        }
        entries.extend(namelist_entries(&self.parameters.namelist_update));

        let mut post = String::from("turbo-genius.sh -j lrdmc -post -am manual");
        if let Some(eq) = self.parameters.eq {
            post.push_str(&format!(" -eq {}", eq));
        }
        if let Some(reb) = self.parameters.reb {
            post.push_str(&format!(" -reb {}", reb));
        }
        if let Some(col) = self.parameters.col {
            post.push_str(&format!(" -col {}", col));
        }

        let mut script = DriverScript::new();
        script
            .push("turbo-genius.sh -j lrdmc -g")
            .push(format!("cp datasfn.input {}", INPUT_FILE))
            .rewrite_keys(INPUT_FILE, &entries)
            .push(format!(
                "mpirun -np {} turborvb-mpi.x < {} > {}",
                options.resources.total_mpiprocs(),
                INPUT_FILE,
                OUTPUT_FILE
            ))
            .push(format!("cp {} out_fn", OUTPUT_FILE))
            .push(post);

        let mut job = JobSpec::new(self.label(), options);
        match &self.scratch {
            ScratchSource::Tree(tree) => job.tree(SCRATCH, tree.clone()),
            ScratchSource::Directory(dir) => job.copy(SCRATCH, dir),
        };
        job.copy(FORT10, &self.fort10)
            .copy(FORT11, &self.fort11)
            .copy(FORT12, &self.fort12)
            .pseudo(self.pseudo.as_ref())
            .inline(&options.input_filename, script.render())
            .retrieve([FORT11, FORT12, ENERGY_FILE, SCRATCH]);
        Ok(job)
    }

    fn parse(&self, retrieved: &RetrievedFolder) -> Result<LrdmcResult> {
        parse_retrieved(retrieved)
    }
}

/// 解析 lrdmc 回收目录
pub fn parse_retrieved(retrieved: &RetrievedFolder) -> Result<LrdmcResult> {
    let energy_data = retrieved.require(ENERGY_FILE)?;
    let estimates = parse_pip0_file(&energy_data)?;

    Ok(LrdmcResult {
        fort11: retrieved.require(FORT11)?,
        fort12: retrieved.require(FORT12)?,
        energy_data,
        energy: estimates.energy,
        variance_square: estimates.variance_square,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::{vmc, FileSource};
    use crate::engine::stage_job;
    use std::fs;

    fn lrdmc(trial_energy: Option<f64>, parameters: LrdmcParameters) -> Lrdmc {
        let mut scratch = MemoryTree::new();
        scratch.insert("turborvb.scratch/randseed.0", "seed");
        Lrdmc {
            fort10: PathBuf::from("fort.10_averaged"),
            fort11: PathBuf::from("vmc/fort.11"),
            fort12: PathBuf::from("vmc/fort.12"),
            pseudo: None,
            scratch: ScratchSource::Tree(scratch),
            trial_energy,
            parameters,
        }
    }

    #[test]
    fn test_trial_energy_is_substituted_first() {
        let mut parameters = LrdmcParameters {
            col: Some(2),
            ..LrdmcParameters::default()
        };
        parameters
            .namelist_update
            .insert("alat".to_string(), NamelistValue::Float(-0.2));

        let job = lrdmc(Some(-17.21), parameters)
            .prepare(&JobOptions::default())
            .unwrap();
        let script = job.inline_text("execute.sh").unwrap();
        let lines: Vec<&str> = script.lines().collect();

        assert_eq!(lines[1], "cp datasfn.input fn.input");
        assert_eq!(lines[2], "cp fn.input source");
        assert_eq!(lines[3], r"sed 's/^\s*!\?etry\s*=.*$/etry=-17.21/gI' source > dest");
        assert!(lines[5].contains("/alat=-0.2/gI"));
        assert_eq!(lines[7], "cp dest fn.input");
        assert_eq!(lines[8], "mpirun -np 1 turborvb-mpi.x < fn.input > fn.output");
        assert_eq!(lines[10], "turbo-genius.sh -j lrdmc -post -am manual -col 2");
    }

    #[test]
    fn test_empty_vmc_scratch_is_staged_as_empty_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let retrieved = tmp.path().join("retrieved");
        fs::create_dir_all(retrieved.join(SCRATCH)).unwrap();
        fs::write(retrieved.join("fort.11"), "").unwrap();
        fs::write(retrieved.join("fort.12"), "").unwrap();
        fs::write(
            retrieved.join("pip0.d"),
            " bins\n Energy = -17.21 0.0012\n Variance = 0.31 0.004\n",
        )
        .unwrap();

        let vmc = vmc::parse_retrieved(&RetrievedFolder::new(&retrieved)).unwrap();
        assert_eq!(vmc.scratch.len(), 0);
        assert!(!vmc.scratch.is_empty());

        let calc = Lrdmc {
            fort10: retrieved.join("fort.11"),
            fort11: vmc.fort11.clone(),
            fort12: vmc.fort12.clone(),
            pseudo: None,
            scratch: ScratchSource::Tree(vmc.scratch),
            trial_energy: Some(vmc.energy.value),
            parameters: LrdmcParameters::default(),
        };
        let job = calc.prepare(&JobOptions::default()).unwrap();
        let work = tmp.path().join("work");
        stage_job(&job, &work).unwrap();

        assert!(work.join(SCRATCH).is_dir());
        assert_eq!(fs::read_dir(work.join(SCRATCH)).unwrap().count(), 0);
    }

    #[test]
    fn test_staged_inputs() {
        let job = lrdmc(None, LrdmcParameters::default())
            .prepare(&JobOptions::default())
            .unwrap();
        assert!(matches!(job.file("turborvb.scratch"), Some(FileSource::Tree(_))));
        assert_eq!(
            job.file("fort.11"),
            Some(&FileSource::Copy(PathBuf::from("vmc/fort.11")))
        );
        assert!(!job.inline_text("execute.sh").unwrap().contains("sed"));
        assert_eq!(
            job.retrieve_list,
            vec!["fort.11", "fort.12", "pip0_fn.d", "turborvb.scratch", "execute.out"]
        );
    }
}
