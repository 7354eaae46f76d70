//! # 作业文件
//!
//! 单个计算的 TOML 描述。`calculation` 字段选择适配器，
//! 其余字段为该适配器的输入与 `[parameters]`，可选的 `[options]` 覆盖作业选项。
//!
//! ```toml
//! calculation = "prep"
//! fort10 = "fort.10_new"
//! pseudo = "pseudo.dat"
//!
//! [parameters]
//! grid = 0.1
//! box = [20.0, 20.0, 22.0]
//! ```
//!
//! ## 依赖关系
//! - 被 `commands/prepare.rs`, `commands/run.rs` 使用
//! - 使用 `utils/config.rs`, `parsers/xyz.rs`

use super::assembling_pseudo::{self, AssemblingPseudoParameters};
use super::convertfort10mol::Convertfort10molParameters;
use super::lrdmc::{self, LrdmcParameters, ScratchSource};
use super::makefort10::{self, Makefort10Parameters, Makefort10StandaloneParameters};
use super::prep::{self, PrepParameters};
use super::vmc::{self, VmcParameters};
use super::vmcopt::{self, VmcoptParameters};
use super::{
    AssemblingPseudo, Calculation, Convertfort10mol, JobOptions, JobSpec, Lrdmc, Makefort10,
    Makefort10Standalone, Prep, Vmc, Vmcopt,
};
use crate::engine::RetrievedFolder;
use crate::error::Result;
use crate::models::{BasisSource, LrdmcResult, PrepResult, VmcResult, VmcoptResult};
use crate::parsers::parse_structure_file;
use crate::utils::config::{base_dir, load_toml, resolve_path};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

// ─────────────────────────────────────────────────────────────
// TOML 表示
// ─────────────────────────────────────────────────────────────

/// 作业文件
#[derive(Debug, Clone, Deserialize)]
pub struct JobFile {
    #[serde(default)]
    pub options: Option<JobOptions>,

    #[serde(flatten)]
    pub job: JobKind,
}

/// 各计算的输入
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "calculation", rename_all = "kebab-case")]
pub enum JobKind {
    Makefort10 {
        structure: PathBuf,
        #[serde(default)]
        parameters: Makefort10Parameters,
    },
    Makefort10Standalone {
        structure: PathBuf,
        #[serde(default)]
        parameters: Makefort10StandaloneParameters,
        determinant_basis: BTreeMap<String, BasisSource>,
        #[serde(default)]
        jastrow_basis: BTreeMap<String, BasisSource>,
    },
    #[serde(rename = "assemblingpseudo")]
    AssemblingPseudo {
        fort10: PathBuf,
        parameters: AssemblingPseudoParameters,
    },
    Convertfort10mol {
        fort10: PathBuf,
        pseudo: Option<PathBuf>,
        #[serde(default)]
        parameters: Convertfort10molParameters,
    },
    Prep {
        fort10: PathBuf,
        pseudo: Option<PathBuf>,
        #[serde(default)]
        parameters: PrepParameters,
    },
    Vmcopt {
        fort10: PathBuf,
        pseudo: Option<PathBuf>,
        #[serde(default)]
        parameters: VmcoptParameters,
    },
    Vmc {
        fort10: PathBuf,
        pseudo: Option<PathBuf>,
        #[serde(default)]
        parameters: VmcParameters,
    },
    Lrdmc {
        fort10: PathBuf,
        fort11: PathBuf,
        fort12: PathBuf,
        /// VMC 回收的 `turborvb.scratch` 目录
        scratch: PathBuf,
        pseudo: Option<PathBuf>,
        trial_energy: Option<f64>,
        #[serde(default)]
        parameters: LrdmcParameters,
    },
}

impl JobFile {
    /// 读取作业文件，得到适配器与作业选项
    pub fn load(path: &Path) -> Result<(AnyCalculation, JobOptions)> {
        let file: JobFile = load_toml(path)?;
        let base = base_dir(path);
        let calculation = file.job.resolve(&base)?;
        let options = file
            .options
            .unwrap_or_else(|| calculation.default_options());
        Ok((calculation, options))
    }
}

impl JobKind {
    /// 相对路径按 `base` 解析并构造适配器
    pub fn resolve(self, base: &Path) -> Result<AnyCalculation> {
        let path = |p: PathBuf| resolve_path(base, &p);
        let optional = |p: Option<PathBuf>| p.map(|p| resolve_path(base, &p));

        Ok(match self {
            JobKind::Makefort10 {
                structure,
                parameters,
            } => AnyCalculation::Makefort10(Makefort10 {
                structure: parse_structure_file(&path(structure))?,
                parameters,
            }),
            JobKind::Makefort10Standalone {
                structure,
                parameters,
                determinant_basis,
                jastrow_basis,
            } => AnyCalculation::Makefort10Standalone(Makefort10Standalone {
                structure: parse_structure_file(&path(structure))?,
                parameters,
                determinant_basis,
                jastrow_basis,
            }),
            JobKind::AssemblingPseudo { fort10, parameters } => {
                AnyCalculation::AssemblingPseudo(AssemblingPseudo {
                    fort10: path(fort10),
                    parameters,
                })
            }
            JobKind::Convertfort10mol {
                fort10,
                pseudo,
                parameters,
            } => AnyCalculation::Convertfort10mol(Convertfort10mol {
                fort10: path(fort10),
                pseudo: optional(pseudo),
                parameters,
            }),
            JobKind::Prep {
                fort10,
                pseudo,
                parameters,
            } => AnyCalculation::Prep(Prep {
                fort10: path(fort10),
                pseudo: optional(pseudo),
                parameters,
            }),
            JobKind::Vmcopt {
                fort10,
                pseudo,
                parameters,
            } => AnyCalculation::Vmcopt(Vmcopt {
                fort10: path(fort10),
                pseudo: optional(pseudo),
                parameters,
            }),
            JobKind::Vmc {
                fort10,
                pseudo,
                parameters,
            } => AnyCalculation::Vmc(Vmc {
                fort10: path(fort10),
                pseudo: optional(pseudo),
                parameters,
            }),
            JobKind::Lrdmc {
                fort10,
                fort11,
                fort12,
                scratch,
                pseudo,
                trial_energy,
                parameters,
            } => AnyCalculation::Lrdmc(Lrdmc {
                fort10: path(fort10),
                fort11: path(fort11),
                fort12: path(fort12),
                pseudo: optional(pseudo),
                scratch: ScratchSource::Directory(path(scratch)),
                trial_energy,
                parameters,
            }),
        })
    }
}

// ─────────────────────────────────────────────────────────────
// 统一调度
// ─────────────────────────────────────────────────────────────

/// 任意一种计算
#[derive(Debug, Clone)]
pub enum AnyCalculation {
    Makefort10(Makefort10),
    Makefort10Standalone(Makefort10Standalone),
    AssemblingPseudo(AssemblingPseudo),
    Convertfort10mol(Convertfort10mol),
    Prep(Prep),
    Vmcopt(Vmcopt),
    Vmc(Vmc),
    Lrdmc(Lrdmc),
}

impl AnyCalculation {
    pub fn label(&self) -> &'static str {
        match self {
            AnyCalculation::Makefort10(c) => c.label(),
            AnyCalculation::Makefort10Standalone(c) => c.label(),
            AnyCalculation::AssemblingPseudo(c) => c.label(),
            AnyCalculation::Convertfort10mol(c) => c.label(),
            AnyCalculation::Prep(c) => c.label(),
            AnyCalculation::Vmcopt(c) => c.label(),
            AnyCalculation::Vmc(c) => c.label(),
            AnyCalculation::Lrdmc(c) => c.label(),
        }
    }

    pub fn default_options(&self) -> JobOptions {
        match self {
            AnyCalculation::Makefort10Standalone(c) => c.default_options(),
            _ => JobOptions::default(),
        }
    }

    pub fn prepare(&self, options: &JobOptions) -> Result<JobSpec> {
        match self {
            AnyCalculation::Makefort10(c) => c.prepare(options),
            AnyCalculation::Makefort10Standalone(c) => c.prepare(options),
            AnyCalculation::AssemblingPseudo(c) => c.prepare(options),
            AnyCalculation::Convertfort10mol(c) => c.prepare(options),
            AnyCalculation::Prep(c) => c.prepare(options),
            AnyCalculation::Vmcopt(c) => c.prepare(options),
            AnyCalculation::Vmc(c) => c.prepare(options),
            AnyCalculation::Lrdmc(c) => c.prepare(options),
        }
    }

    pub fn parse(&self, retrieved: &RetrievedFolder) -> Result<CalculationOutput> {
        Ok(match self {
            AnyCalculation::Makefort10(c) => CalculationOutput::Fort10(c.parse(retrieved)?),
            AnyCalculation::Makefort10Standalone(c) => {
                CalculationOutput::Fort10(c.parse(retrieved)?)
            }
            AnyCalculation::AssemblingPseudo(c) => CalculationOutput::Pseudo(c.parse(retrieved)?),
            AnyCalculation::Convertfort10mol(c) => CalculationOutput::Fort10(c.parse(retrieved)?),
            AnyCalculation::Prep(c) => CalculationOutput::Prep(c.parse(retrieved)?),
            AnyCalculation::Vmcopt(c) => CalculationOutput::Vmcopt(c.parse(retrieved)?),
            AnyCalculation::Vmc(c) => CalculationOutput::Vmc(c.parse(retrieved)?),
            AnyCalculation::Lrdmc(c) => CalculationOutput::Lrdmc(c.parse(retrieved)?),
        })
    }
}

/// 解析结果
#[derive(Debug, Clone)]
pub enum CalculationOutput {
    Fort10(PathBuf),
    Pseudo(PathBuf),
    Prep(PrepResult),
    Vmcopt(VmcoptResult),
    Vmc(VmcResult),
    Lrdmc(LrdmcResult),
}

/// 可单独解析的计算种类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    Fort10,
    Pseudo,
    Prep,
    Vmcopt,
    Vmc,
    Lrdmc,
}

impl CalculationOutput {
    /// 不依赖计算输入，直接解析回收目录
    pub fn parse_kind(kind: OutputKind, retrieved: &RetrievedFolder) -> Result<Self> {
        Ok(match kind {
            OutputKind::Fort10 => CalculationOutput::Fort10(makefort10::parse_fort10_new(retrieved)?),
            OutputKind::Pseudo => {
                CalculationOutput::Pseudo(assembling_pseudo::parse_retrieved(retrieved)?)
            }
            OutputKind::Prep => CalculationOutput::Prep(prep::parse_retrieved(retrieved)?),
            OutputKind::Vmcopt => CalculationOutput::Vmcopt(vmcopt::parse_retrieved(retrieved)?),
            OutputKind::Vmc => CalculationOutput::Vmc(vmc::parse_retrieved(retrieved)?),
            OutputKind::Lrdmc => CalculationOutput::Lrdmc(lrdmc::parse_retrieved(retrieved)?),
        })
    }

    /// 用于表格输出的 (字段, 值) 行
    pub fn rows(&self) -> Vec<(String, String)> {
        let path = |p: &PathBuf| p.display().to_string();
        let row = |k: &str, v: String| (k.to_string(), v);

        match self {
            CalculationOutput::Fort10(p) => vec![row("fort10", path(p))],
            CalculationOutput::Pseudo(p) => vec![row("pseudo", path(p))],
            CalculationOutput::Prep(r) => vec![
                row("energy (Ha)", format!("{:.8}", r.energy)),
                row("iterations", r.convergence.len().to_string()),
                row("fort10", path(&r.fort10)),
                row("occupations", path(&r.occupation_file)),
            ],
            CalculationOutput::Vmcopt(r) => vec![
                row("fort10", path(&r.fort10)),
                row("fort10_averaged", path(&r.fort10_averaged)),
                row("fort11", path(&r.fort11)),
                row("fort12", path(&r.fort12)),
                row("forces", path(&r.forces)),
                row("story", path(&r.story)),
            ],
            CalculationOutput::Vmc(r) => vec![
                row("energy (Ha)", r.energy.to_string()),
                row("variance square", r.variance_square.to_string()),
                row("scratch files", r.scratch.len().to_string()),
                row("energy data", path(&r.energy_data)),
            ],
            CalculationOutput::Lrdmc(r) => vec![
                row("energy (Ha)", r.energy.to_string()),
                row("variance square", r.variance_square.to_string()),
                row("energy data", path(&r.energy_data)),
            ],
        }
    }
}
