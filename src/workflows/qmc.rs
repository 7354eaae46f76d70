//! # QMC 工作流
//!
//! vmcopt → vmc → lrdmc：
//! - vmc 使用 vmcopt 的平均波函数 `fort.10_averaged`
//! - lrdmc 使用同一波函数、vmc 的 `fort.11`/`fort.12` 与 `turborvb.scratch`，
//!   并以 vmc 能量作为试探能量
//!
//! 输出 LRDMC 能量及其误差。
//!
//! ## 依赖关系
//! - 被 `commands/workflow.rs` 使用
//! - 使用 `workflows/context.rs`, `calculations/`

use super::context::WorkflowContext;
use crate::calculations::lrdmc::{LrdmcParameters, ScratchSource};
use crate::calculations::vmc::VmcParameters;
use crate::calculations::vmcopt::VmcoptParameters;
use crate::calculations::{JobOptions, Lrdmc, Vmc, Vmcopt};
use crate::engine::JobRunner;
use crate::error::Result;
use crate::models::{Estimate, LrdmcResult};
use crate::namelist::NamelistValue;
use crate::utils::config::{base_dir, load_toml, resolve_path};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// QMC 工作流参数，按阶段前缀分发
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QmcParameters {
    pub vmcopt_namelist_update: BTreeMap<String, NamelistValue>,
    pub vmcopt_eq: Option<u32>,
    pub vmc_namelist_update: BTreeMap<String, NamelistValue>,
    pub vmc_eq: Option<u32>,
    pub vmc_reb: Option<u32>,
    pub lrdmc_namelist_update: BTreeMap<String, NamelistValue>,
    pub lrdmc_eq: Option<u32>,
    pub lrdmc_reb: Option<u32>,
    pub lrdmc_col: Option<u32>,
}

impl QmcParameters {
    fn vmcopt(&self) -> VmcoptParameters {
        VmcoptParameters {
            namelist_update: self.vmcopt_namelist_update.clone(),
            eq: self.vmcopt_eq,
        }
    }

    fn vmc(&self) -> VmcParameters {
        VmcParameters {
            namelist_update: self.vmc_namelist_update.clone(),
            eq: self.vmc_eq,
            reb: self.vmc_reb,
        }
    }

    fn lrdmc(&self) -> LrdmcParameters {
        LrdmcParameters {
            namelist_update: self.lrdmc_namelist_update.clone(),
            eq: self.lrdmc_eq,
            reb: self.lrdmc_reb,
            col: self.lrdmc_col,
        }
    }
}

/// 各阶段使用的程序
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QmcCodes {
    pub vmcopt: String,
    pub vmc: String,
    pub lrdmc: String,
}

impl Default for QmcCodes {
    fn default() -> Self {
        QmcCodes {
            vmcopt: "bash".to_string(),
            vmc: "bash".to_string(),
            lrdmc: "bash".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct QmcFile {
    fort10: PathBuf,
    pseudo: Option<PathBuf>,
    #[serde(default)]
    parameters: QmcParameters,
    #[serde(default)]
    codes: QmcCodes,
    #[serde(default)]
    options: JobOptions,
}

/// QMC 工作流输出
#[derive(Debug, Clone)]
pub struct QmcOutput {
    pub energy: f64,
    pub energy_err: f64,
    pub vmc_energy: Estimate,
    pub lrdmc: LrdmcResult,
}

#[derive(Debug, Clone)]
pub struct QmcChain {
    pub fort10: PathBuf,
    pub pseudo: Option<PathBuf>,
    pub parameters: QmcParameters,
    pub codes: QmcCodes,
    pub options: JobOptions,
}

impl QmcChain {
    /// 读取工作流文件，路径相对于该文件
    pub fn load(path: &Path) -> Result<Self> {
        let file: QmcFile = load_toml(path)?;
        let base = base_dir(path);
        Ok(QmcChain {
            fort10: resolve_path(&base, &file.fort10),
            pseudo: file.pseudo.map(|p| resolve_path(&base, &p)),
            parameters: file.parameters,
            codes: file.codes,
            options: file.options,
        })
    }

    pub fn run(&self, runner: &mut dyn JobRunner) -> Result<QmcOutput> {
        let mut ctx = WorkflowContext::new("qmc");
        if self.pseudo.is_some() {
            tracing::info!("using pseudopotential for all stages");
        }

        let vmcopt = Vmcopt {
            fort10: self.fort10.clone(),
            pseudo: self.pseudo.clone(),
            parameters: self.parameters.vmcopt(),
        };
        let optimized = ctx.run_stage("vmcopt", runner, &self.codes.vmcopt, &vmcopt, &self.options)?;

        let vmc = Vmc {
            fort10: optimized.fort10_averaged.clone(),
            pseudo: self.pseudo.clone(),
            parameters: self.parameters.vmc(),
        };
        let sampled = ctx.run_stage("vmc", runner, &self.codes.vmc, &vmc, &self.options)?;

        let lrdmc = Lrdmc {
            fort10: optimized.fort10_averaged,
            fort11: sampled.fort11,
            fort12: sampled.fort12,
            pseudo: self.pseudo.clone(),
            scratch: ScratchSource::Tree(sampled.scratch),
            trial_energy: Some(sampled.energy.value),
            parameters: self.parameters.lrdmc(),
        };
        let projected = ctx.run_stage("lrdmc", runner, &self.codes.lrdmc, &lrdmc, &self.options)?;
        ctx.finish()?;

        Ok(QmcOutput {
            energy: projected.energy.value,
            energy_err: projected.energy.error,
            vmc_energy: sampled.energy,
            lrdmc: projected,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::FileSource;
    use crate::error::TurboflowError;
    use crate::workflows::testing::FakeRunner;
    use std::fs;

    const PIP0: &str = " bins\n Energy = -17.2140349 0.0012637\n Variance = 0.31 0.004\n";
    const PIP0_FN: &str = " bins\n Energy = -17.2391 0.0009\n Variance = 0.29 0.003\n";

    fn chain(pseudo: Option<PathBuf>) -> QmcChain {
        let mut parameters = QmcParameters {
            vmcopt_eq: Some(100),
            lrdmc_col: Some(3),
            ..QmcParameters::default()
        };
        parameters
            .vmc_namelist_update
            .insert("ngen".to_string(), NamelistValue::Int(5000));
        QmcChain {
            fort10: PathBuf::from("/data/fort.10_new"),
            pseudo,
            parameters,
            codes: QmcCodes::default(),
            options: JobOptions::default(),
        }
    }

    #[test]
    fn test_chain_threads_outputs() {
        let tmp = tempfile::tempdir().unwrap();
        let mut runner = FakeRunner::new(tmp.path())
            .fixture("pip0.d", PIP0)
            .fixture("pip0_fn.d", PIP0_FN);

        let out = chain(Some(PathBuf::from("/data/pseudo.dat")))
            .run(&mut runner)
            .unwrap();
        assert_eq!(runner.labels(), vec!["vmcopt", "vmc", "lrdmc"]);
        assert_eq!(out.energy, -17.2391);
        assert_eq!(out.energy_err, 0.0009);
        assert_eq!(out.vmc_energy, Estimate::new(-17.2140349, 0.0012637));

        let averaged = tmp.path().join("001_vmcopt/fort.10_averaged");
        let vmc_job = &runner.jobs[1].1;
        assert_eq!(vmc_job.file("fort.10"), Some(&FileSource::Copy(averaged.clone())));
        assert!(vmc_job.inline_text("execute.sh").unwrap().contains("/ngen=5000/gI"));

        let lrdmc_job = &runner.jobs[2].1;
        assert_eq!(lrdmc_job.file("fort.10"), Some(&FileSource::Copy(averaged)));
        assert_eq!(
            lrdmc_job.file("fort.11"),
            Some(&FileSource::Copy(tmp.path().join("002_vmc/fort.11")))
        );
        assert_eq!(
            lrdmc_job.file("pseudo.dat"),
            Some(&FileSource::Copy(PathBuf::from("/data/pseudo.dat")))
        );
        match lrdmc_job.file("turborvb.scratch") {
            Some(FileSource::Tree(tree)) => assert_eq!(tree.len(), 1),
            other => panic!("unexpected scratch source: {:?}", other),
        }
        let script = lrdmc_job.inline_text("execute.sh").unwrap();
        assert!(script.contains("/etry=-17.2140349/gI"));
        assert!(script.contains("-col 3"));

        let vmcopt_script = runner.jobs[0].1.inline_text("execute.sh").unwrap();
        assert!(vmcopt_script.contains("-optwarmup 100"));
    }

    #[test]
    fn test_chain_without_pseudo() {
        let tmp = tempfile::tempdir().unwrap();
        let mut runner = FakeRunner::new(tmp.path())
            .fixture("pip0.d", PIP0)
            .fixture("pip0_fn.d", PIP0_FN);
        chain(None).run(&mut runner).unwrap();
        assert!(runner.jobs.iter().all(|(_, job)| job.file("pseudo.dat").is_none()));
    }

    #[test]
    fn test_bad_vmc_output_stops_the_chain() {
        let tmp = tempfile::tempdir().unwrap();
        let mut runner = FakeRunner::new(tmp.path()).fixture("pip0.d", "truncated\n");
        assert!(matches!(
            chain(None).run(&mut runner),
            Err(TurboflowError::ParseError { .. })
        ));
        assert_eq!(runner.labels(), vec!["vmcopt", "vmc"]);
    }

    #[test]
    fn test_load_workflow_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("qmc.toml");
        fs::write(
            &path,
            r#"
fort10 = "fort.10_new"
pseudo = "/abs/pseudo.dat"

[parameters]
vmc_eq = 10
lrdmc_reb = 5

[parameters.lrdmc_namelist_update]
alat = -0.2

[codes]
lrdmc = "sh"
"#,
        )
        .unwrap();

        let qmc = QmcChain::load(&path).unwrap();
        assert_eq!(qmc.fort10, tmp.path().join("fort.10_new"));
        assert_eq!(qmc.pseudo, Some(PathBuf::from("/abs/pseudo.dat")));
        assert_eq!(qmc.parameters.vmc().eq, Some(10));
        assert_eq!(qmc.parameters.lrdmc().reb, Some(5));
        assert_eq!(
            qmc.parameters.lrdmc_namelist_update["alat"],
            NamelistValue::Float(-0.2)
        );
        assert_eq!(qmc.codes.lrdmc, "sh");
        assert_eq!(qmc.codes.vmc, "bash");
    }
}
