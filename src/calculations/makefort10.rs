//! # makefort10 适配器
//!
//! 生成初始波函数 `fort.10`。两种方式：
//! - `Makefort10`：由 turbo-genius 从基组库生成 `makefort10.input`
//! - `Makefort10Standalone`：直接写出完整的 `makefort10.input`
//!
//! ## 依赖关系
//! - 被 `workflows/dft.rs`, `calculations/job_file.rs` 使用
//! - 使用 `parsers/xyz.rs`, `parsers/makefort10_input.rs`, `namelist/makefort10.rs`

use super::script::DriverScript;
use super::{Calculation, JobOptions, JobSpec, FORT10_NEW};
use crate::engine::RetrievedFolder;
use crate::error::Result;
use crate::models::{AtomBasis, BasisSource, Structure};
use crate::namelist::{Makefort10Namelists, NamelistValue};
use crate::parsers::makefort10_input::to_makefort10_input;
use crate::parsers::xyz::to_xyz_string;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

const STRUCTURE_FILE: &str = "structure.xyz";
const INPUT_FILE: &str = "makefort10.input";
const OUTPUT_FILE: &str = "makefort10.output";

// ─────────────────────────────────────────────────────────────
// turbo-genius 方式
// ─────────────────────────────────────────────────────────────

/// turbo-genius 基组库参数
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Makefort10Parameters {
    /// 行列式基组名
    pub basis: Option<String>,
    /// Jastrow 基组名
    pub basisjas: Option<String>,
    /// 赝势名
    pub pseudo: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Makefort10 {
    pub structure: Structure,
    pub parameters: Makefort10Parameters,
}

impl Calculation for Makefort10 {
    type Output = PathBuf;

    fn label(&self) -> &'static str {
        "makefort10"
    }

    fn prepare(&self, options: &JobOptions) -> Result<JobSpec> {
        let mut genius = format!("turbo-genius.sh -j makefort10 -g  -str {}", STRUCTURE_FILE);
        if let Some(basis) = &self.parameters.basis {
            genius.push_str(&format!(" -basis {}", basis));
        }
        if let Some(basisjas) = &self.parameters.basisjas {
            genius.push_str(&format!(" -basisjas {}", basisjas));
        }
        if let Some(pseudo) = &self.parameters.pseudo {
            genius.push_str(&format!(" -pp {}", pseudo));
        }

        let mut script = DriverScript::new();
        script
            .push(genius)
            .push(format!("makefort10.x < {} > {}", INPUT_FILE, OUTPUT_FILE));

        let mut job = JobSpec::new(self.label(), options);
        job.inline(STRUCTURE_FILE, to_xyz_string(&self.structure))
            .inline(&options.input_filename, script.render())
            .retrieve([FORT10_NEW]);
        Ok(job)
    }

    fn parse(&self, retrieved: &RetrievedFolder) -> Result<PathBuf> {
        parse_fort10_new(retrieved)
    }
}

/// 回收目录中的 `fort.10_new`
pub fn parse_fort10_new(retrieved: &RetrievedFolder) -> Result<PathBuf> {
    retrieved.require(FORT10_NEW)
}

// ─────────────────────────────────────────────────────────────
// 独立方式
// ─────────────────────────────────────────────────────────────

/// 独立 makefort10 参数
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Makefort10StandaloneParameters {
    /// 使用赝势时 twobody 取 -6
    pub pseudo: bool,
    pub namelist_update: BTreeMap<String, NamelistValue>,
}

#[derive(Debug, Clone)]
pub struct Makefort10Standalone {
    pub structure: Structure,
    pub parameters: Makefort10StandaloneParameters,
    /// 元素 → 行列式基组
    pub determinant_basis: BTreeMap<String, BasisSource>,
    /// 元素 → Jastrow 基组（可缺省）
    pub jastrow_basis: BTreeMap<String, BasisSource>,
}

impl Makefort10Standalone {
    /// 根据结构与参数生成 namelist
    pub fn namelists(&self) -> Result<Makefort10Namelists> {
        let mut nl = Makefort10Namelists::defaults()?;
        let twobody = if self.parameters.pseudo { -6 } else { -15 };
        nl.apply_update("twobody", &NamelistValue::Int(twobody))?;
        nl.apply_update("natoms", &self.structure.atoms.len().into())?;
        nl.apply_update("ntyp", &self.structure.species()?.len().into())?;
        for (key, value) in &self.parameters.namelist_update {
            nl.apply_update(key, value)?;
        }
        Ok(nl)
    }

    /// 把结构中出现的元素的基组解析为规范形式
    fn resolve_basis(
        &self,
        sources: &BTreeMap<String, BasisSource>,
    ) -> Result<BTreeMap<String, AtomBasis>> {
        let mut resolved = BTreeMap::new();
        for (_, element) in self.structure.species()? {
            if let Some(source) = sources.get(&element) {
                resolved.insert(element.clone(), source.resolve(&element)?);
            }
        }
        Ok(resolved)
    }
}

impl Calculation for Makefort10Standalone {
    type Output = PathBuf;

    fn label(&self) -> &'static str {
        "makefort10-standalone"
    }

    fn default_options(&self) -> JobOptions {
        JobOptions {
            input_filename: INPUT_FILE.to_string(),
            output_filename: OUTPUT_FILE.to_string(),
            ..JobOptions::default()
        }
    }

    fn prepare(&self, options: &JobOptions) -> Result<JobSpec> {
        let determinant = self.resolve_basis(&self.determinant_basis)?;
        let jastrow = self.resolve_basis(&self.jastrow_basis)?;
        let text = to_makefort10_input(&self.namelists()?, &self.structure, &determinant, &jastrow)?;

        let mut job = JobSpec::new(self.label(), options);
        job.inline(&options.input_filename, text)
            .retrieve([FORT10_NEW]);
        Ok(job)
    }

    fn parse(&self, retrieved: &RetrievedFolder) -> Result<PathBuf> {
        parse_fort10_new(retrieved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TurboflowError;
    use crate::models::basis::RawBasis;
    use crate::models::Atom;

    fn water() -> Structure {
        Structure::new(
            "water",
            vec![
                Atom::new("O", [0.0, 0.0, 0.1173]),
                Atom::new("H", [0.0, 0.7572, -0.4692]),
                Atom::new("H", [0.0, -0.7572, -0.4692]),
            ],
        )
    }

    fn raw(valence: f64) -> BasisSource {
        BasisSource::Raw(RawBasis {
            basis: vec![vec![(0, 1.5, 1.0)], vec![(1, 0.5, 0.3), (1, 0.2, 0.7)]],
            valence_electrons: valence,
        })
    }

    #[test]
    fn test_wrapper_script() {
        let calc = Makefort10 {
            structure: water(),
            parameters: Makefort10Parameters {
                basis: Some("cc-pVDZ".to_string()),
                basisjas: None,
                pseudo: Some("BFD".to_string()),
            },
        };
        let job = calc.prepare(&JobOptions::default()).unwrap();
        assert_eq!(
            job.inline_text("execute.sh").unwrap(),
            "turbo-genius.sh -j makefort10 -g  -str structure.xyz -basis cc-pVDZ -pp BFD\n\
             makefort10.x < makefort10.input > makefort10.output\n"
        );
        assert!(job.inline_text("structure.xyz").unwrap().starts_with("3\nwater\n"));
        assert_eq!(job.retrieve_list, vec!["fort.10_new", "execute.out"]);
        assert_eq!(job.stdin_name, "execute.sh");
    }

    #[test]
    fn test_standalone_namelists() {
        let mut calc = Makefort10Standalone {
            structure: water(),
            parameters: Makefort10StandaloneParameters::default(),
            determinant_basis: BTreeMap::new(),
            jastrow_basis: BTreeMap::new(),
        };
        let nl = calc.namelists().unwrap();
        assert_eq!(nl.system.get("natoms").unwrap().value, NamelistValue::Int(3));
        assert_eq!(nl.system.get("ntyp").unwrap().value, NamelistValue::Int(2));
        assert_eq!(nl.electrons.get("twobody").unwrap().value, NamelistValue::Int(-15));

        calc.parameters.pseudo = true;
        calc.parameters
            .namelist_update
            .insert("nosym".to_string(), NamelistValue::Bool(true));
        let nl = calc.namelists().unwrap();
        assert_eq!(nl.electrons.get("twobody").unwrap().value, NamelistValue::Int(-6));
        assert_eq!(nl.symmetries.get("nosym").unwrap().value, NamelistValue::Bool(true));
    }

    #[test]
    fn test_standalone_job() {
        let mut det = BTreeMap::new();
        det.insert("O".to_string(), raw(6.0));
        det.insert("H".to_string(), raw(1.0));
        let mut jas = BTreeMap::new();
        jas.insert("O".to_string(), raw(6.0));

        let calc = Makefort10Standalone {
            structure: water(),
            parameters: Makefort10StandaloneParameters::default(),
            determinant_basis: det,
            jastrow_basis: jas,
        };
        let options = calc.default_options();
        let job = calc.prepare(&options).unwrap();

        assert_eq!(job.stdin_name, "makefort10.input");
        assert_eq!(job.retrieve_list, vec!["fort.10_new", "makefort10.output"]);
        let text = job.inline_text("makefort10.input").unwrap();
        assert!(text.contains("ATOM_1\n&shells\nnshelldet=2\n/\n"));
        assert!(text.contains("ATOM_8\n&shells\nnshelldet=2\nnshelljas=2\n/\n"));
        assert!(text.contains("3 4 400\n"));
    }

    #[test]
    fn test_standalone_requires_determinant_basis() {
        let calc = Makefort10Standalone {
            structure: water(),
            parameters: Makefort10StandaloneParameters::default(),
            determinant_basis: BTreeMap::new(),
            jastrow_basis: BTreeMap::new(),
        };
        assert!(matches!(
            calc.prepare(&calc.default_options()),
            Err(TurboflowError::MissingBasis(_))
        ));
    }
}
