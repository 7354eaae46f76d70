//! # DFT 工作流
//!
//! makefort10 → [assemblingpseudo，仅当给出赝势名] → convertfort10mol → prep。
//! 输出最终 DFT 能量，使用赝势时同时输出 `pseudo.dat`。
//!
//! 工作流文件示例：
//!
//! ```toml
//! structure = "water.xyz"
//!
//! [parameters]
//! basis = "cc-pVTZ"
//! pseudo = "BFD"
//! grid = 0.1
//!
//! [codes]
//! prep = "bash"
//! ```
//!
//! ## 依赖关系
//! - 被 `commands/workflow.rs`, `workflows/dft_precise.rs` 使用
//! - 使用 `workflows/context.rs`, `calculations/`

use super::context::WorkflowContext;
use crate::calculations::assembling_pseudo::AssemblingPseudoParameters;
use crate::calculations::convertfort10mol::Convertfort10molParameters;
use crate::calculations::makefort10::Makefort10Parameters;
use crate::calculations::prep::{BoxSpec, PrepParameters};
use crate::calculations::{AssemblingPseudo, Convertfort10mol, JobOptions, Makefort10, Prep};
use crate::engine::JobRunner;
use crate::error::Result;
use crate::models::{PrepResult, Structure};
use crate::parsers::parse_structure_file;
use crate::utils::config::{base_dir, load_toml, resolve_path};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// DFT 工作流参数
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DftParameters {
    pub basis: Option<String>,
    /// 赝势名；给出时运行 assemblingpseudo
    pub pseudo: Option<String>,
    /// 缺省时按结构尺寸计算
    #[serde(rename = "box")]
    pub cell_box: Option<BoxSpec>,
    pub grid: Option<f64>,
    pub doublegrid: bool,
}

/// 各阶段使用的程序
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DftCodes {
    pub makefort10: String,
    pub assemblingpseudo: String,
    pub convertfort10mol: String,
    pub prep: String,
}

impl Default for DftCodes {
    fn default() -> Self {
        DftCodes {
            makefort10: "bash".to_string(),
            assemblingpseudo: "bash".to_string(),
            convertfort10mol: "bash".to_string(),
            prep: "bash".to_string(),
        }
    }
}

/// 工作流文件
#[derive(Debug, Deserialize)]
struct DftFile {
    structure: PathBuf,
    #[serde(default)]
    parameters: DftParameters,
    #[serde(default)]
    codes: DftCodes,
    #[serde(default)]
    options: JobOptions,
}

/// DFT 工作流输出
#[derive(Debug, Clone)]
pub struct DftOutput {
    pub energy: f64,
    pub pseudo: Option<PathBuf>,
    pub prep: PrepResult,
}

/// prep 之前得到的波函数
#[derive(Debug, Clone)]
pub(crate) struct Wavefunction {
    pub fort10: PathBuf,
    pub pseudo: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct DftChain {
    pub structure: Structure,
    pub parameters: DftParameters,
    pub codes: DftCodes,
    pub options: JobOptions,
}

impl DftChain {
    /// 读取工作流文件，结构文件路径相对于该文件
    pub fn load(path: &Path) -> Result<Self> {
        let file: DftFile = load_toml(path)?;
        let structure = parse_structure_file(&resolve_path(&base_dir(path), &file.structure))?;
        Ok(DftChain {
            structure,
            parameters: file.parameters,
            codes: file.codes,
            options: file.options,
        })
    }

    /// makefort10 → [assemblingpseudo] → convertfort10mol
    pub(crate) fn prepare_wavefunction(
        &self,
        ctx: &mut WorkflowContext,
        runner: &mut dyn JobRunner,
    ) -> Result<Wavefunction> {
        let mf10 = Makefort10 {
            structure: self.structure.clone(),
            parameters: Makefort10Parameters {
                basis: self.parameters.basis.clone(),
                basisjas: None,
                pseudo: self.parameters.pseudo.clone(),
            },
        };
        let fort10 = ctx.run_stage("mf10", runner, &self.codes.makefort10, &mf10, &self.options)?;

        let pseudo = match &self.parameters.pseudo {
            Some(name) => {
                let ap = AssemblingPseudo {
                    fort10: fort10.clone(),
                    parameters: AssemblingPseudoParameters {
                        pseudo: name.clone(),
                    },
                };
                Some(ctx.run_stage("ap", runner, &self.codes.assemblingpseudo, &ap, &self.options)?)
            }
            None => {
                tracing::debug!("no pseudopotential given, assemblingpseudo skipped");
                None
            }
        };

        let cf10m = Convertfort10mol {
            fort10,
            pseudo: pseudo.clone(),
            parameters: Convertfort10molParameters::default(),
        };
        let fort10 = ctx.run_stage(
            "cf10m",
            runner,
            &self.codes.convertfort10mol,
            &cf10m,
            &self.options,
        )?;

        Ok(Wavefunction { fort10, pseudo })
    }

    /// prep 参数；未给出盒子时使用结构的默认盒子
    pub(crate) fn prep_parameters(&self, grid: Option<f64>) -> PrepParameters {
        let cell_box = self
            .parameters
            .cell_box
            .clone()
            .unwrap_or_else(|| BoxSpec::from(self.structure.default_box()));
        PrepParameters {
            doublegrid: self.parameters.doublegrid,
            grid,
            cell_box: Some(cell_box),
            ..PrepParameters::default()
        }
    }

    pub fn run(&self, runner: &mut dyn JobRunner) -> Result<DftOutput> {
        let mut ctx = WorkflowContext::new("dft");
        let wf = self.prepare_wavefunction(&mut ctx, runner)?;

        let prep = Prep {
            fort10: wf.fort10,
            pseudo: wf.pseudo.clone(),
            parameters: self.prep_parameters(self.parameters.grid),
        };
        let result = ctx.run_stage("prep", runner, &self.codes.prep, &prep, &self.options)?;
        ctx.finish()?;

        Ok(DftOutput {
            energy: result.energy,
            pseudo: wf.pseudo,
            prep: result,
        })
    }
}
