//! # prep (DFT) 适配器
//!
//! 在给定网格与模拟盒子上做 DFT 自洽计算，得到收敛的 `fort.10`。
//!
//! ## 依赖关系
//! - 被 `workflows/dft.rs`, `workflows/dft_precise.rs`, `calculations/job_file.rs` 使用
//! - 使用 `parsers/prep.rs`

use super::script::{namelist_entries, DriverScript};
use super::{Calculation, JobOptions, JobSpec, FORT10, FORT10_NEW};
use crate::engine::RetrievedFolder;
use crate::error::{Result, TurboflowError};
use crate::models::PrepResult;
use crate::namelist::NamelistValue;
use crate::parsers::prep::parse_prep_output;
use crate::utils::format::format_real;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

const INPUT_FILE: &str = "prep.input";
pub const OUTPUT_FILE: &str = "prep.output";
const OCCUPATION_FILE: &str = "occupationlevels.dat";

/// 模拟盒子：一个数（立方）或 1/3 个数的列表 (Bohr)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BoxSpec {
    Scalar(f64),
    List(Vec<f64>),
}

impl BoxSpec {
    /// 三个方向的长度
    pub fn dims(&self) -> Result<[f64; 3]> {
        match self {
            BoxSpec::Scalar(a) => Ok([*a; 3]),
            BoxSpec::List(v) => match v.as_slice() {
                [a] => Ok([*a; 3]),
                [a, b, c] => Ok([*a, *b, *c]),
                _ => Err(TurboflowError::BadBox(format!(
                    "expected 1 or 3 values, got {}",
                    v.len()
                ))),
            },
        }
    }
}

impl From<[f64; 3]> for BoxSpec {
    fn from(dims: [f64; 3]) -> Self {
        BoxSpec::List(dims.to_vec())
    }
}

/// prep 参数
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrepParameters {
    pub doublegrid: bool,
    /// 网格间距
    pub grid: Option<f64>,
    #[serde(rename = "box")]
    pub cell_box: Option<BoxSpec>,
    /// 各轨道占据数 (0/1/2)，同时设置 `nelocc`
    pub occupation_update: Option<Vec<u32>>,
    pub namelist_update: BTreeMap<String, NamelistValue>,
}

#[derive(Debug, Clone)]
pub struct Prep {
    pub fort10: PathBuf,
    pub pseudo: Option<PathBuf>,
    pub parameters: PrepParameters,
}

impl Prep {
    fn genius_command(&self) -> Result<String> {
        let mut command = String::from("turbo-genius.sh -j prep -g");
        if self.parameters.doublegrid {
            command.push_str(" --doublegrid");
        }
        if let Some(grid) = self.parameters.grid {
            command.push_str(&format!(" -grid {}", format_real(grid)));
        }
        if let Some(cell_box) = &self.parameters.cell_box {
            let [a, b, c] = cell_box.dims()?;
            command.push_str(&format!(
                " -box {} {} {}",
                format_real(a),
                format_real(b),
                format_real(c)
            ));
        }
        Ok(command)
    }
}

impl Calculation for Prep {
    type Output = PrepResult;

    fn label(&self) -> &'static str {
        "prep"
    }

    fn prepare(&self, options: &JobOptions) -> Result<JobSpec> {
        let mut script = DriverScript::new();
        script.push(self.genius_command()?);

        let mut updates = self.parameters.namelist_update.clone();
        if let Some(occupations) = &self.parameters.occupation_update {
            let occs: Vec<String> = occupations.iter().map(|o| o.to_string()).collect();
            script
                .push(format!("cp {} source", INPUT_FILE))
                .push(format!(
                    "sed 's/^[012][012 ]*/{}/g' source > dest",
                    occs.join(" ")
                ))
                .push(format!("cp dest {}", INPUT_FILE));
            updates.insert("nelocc".to_string(), occupations.len().into());
        }

        script
            .rewrite_keys(INPUT_FILE, &namelist_entries(&updates))
            .push(format!(
                "mpirun -np {} prep-mpi.x < {} > {}",
                options.resources.total_mpiprocs(),
                INPUT_FILE,
                OUTPUT_FILE
            ));

        let mut job = JobSpec::new(self.label(), options);
        job.copy(FORT10, &self.fort10)
            .pseudo(self.pseudo.as_ref())
            .inline(&options.input_filename, script.render())
            .retrieve([FORT10_NEW, OCCUPATION_FILE, OUTPUT_FILE]);
        Ok(job)
    }

    fn parse(&self, retrieved: &RetrievedFolder) -> Result<PrepResult> {
        parse_retrieved(retrieved)
    }
}

/// 解析 prep 回收目录
pub fn parse_retrieved(retrieved: &RetrievedFolder) -> Result<PrepResult> {
    let fort10 = retrieved.require(FORT10_NEW)?;
    let occupation_file = retrieved.require(OCCUPATION_FILE)?;
    let log = parse_prep_output(&retrieved.require(OUTPUT_FILE)?)?;

    Ok(PrepResult {
        fort10,
        occupation_file,
        energy: log.energy,
        convergence: log.convergence,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prep(parameters: PrepParameters) -> Prep {
        Prep {
            fort10: PathBuf::from("fort.10_new"),
            pseudo: None,
            parameters,
        }
    }

    #[test]
    fn test_box_spec() {
        assert_eq!(BoxSpec::Scalar(10.0).dims().unwrap(), [10.0; 3]);
        assert_eq!(BoxSpec::List(vec![12.0]).dims().unwrap(), [12.0; 3]);
        assert_eq!(
            BoxSpec::List(vec![1.0, 2.0, 3.0]).dims().unwrap(),
            [1.0, 2.0, 3.0]
        );
        assert!(matches!(
            BoxSpec::List(vec![1.0, 2.0]).dims(),
            Err(TurboflowError::BadBox(_))
        ));
    }

    #[test]
    fn test_parameters_from_toml() {
        let p: PrepParameters = toml::from_str("box = 20\ngrid = 0.1\ndoublegrid = true\n").unwrap();
        assert_eq!(p.cell_box, Some(BoxSpec::Scalar(20.0)));
        assert_eq!(p.grid, Some(0.1));

        let p: PrepParameters = toml::from_str("box = [20.0, 21.0, 22.5]\n").unwrap();
        assert_eq!(p.cell_box.unwrap().dims().unwrap(), [20.0, 21.0, 22.5]);
    }

    #[test]
    fn test_minimal_script() {
        let job = prep(PrepParameters::default())
            .prepare(&JobOptions::default())
            .unwrap();
        assert_eq!(
            job.inline_text("execute.sh").unwrap(),
            "turbo-genius.sh -j prep -g\nmpirun -np 1 prep-mpi.x < prep.input > prep.output\n"
        );
        assert_eq!(
            job.retrieve_list,
            vec!["fort.10_new", "occupationlevels.dat", "prep.output", "execute.out"]
        );
    }

    #[test]
    fn test_full_script() {
        let mut parameters = PrepParameters {
            doublegrid: true,
            grid: Some(0.1),
            cell_box: Some(BoxSpec::List(vec![20.0, 21.5, 22.0])),
            occupation_update: Some(vec![2, 2, 1]),
            ..PrepParameters::default()
        };
        parameters
            .namelist_update
            .insert("maxit".to_string(), NamelistValue::Int(50));

        let mut options = JobOptions::default();
        options.resources.num_mpiprocs_per_machine = 8;
        let job = prep(parameters).prepare(&options).unwrap();
        let script = job.inline_text("execute.sh").unwrap();
        let lines: Vec<&str> = script.lines().collect();

        assert_eq!(
            lines[0],
            "turbo-genius.sh -j prep -g --doublegrid -grid 0.1 -box 20.0 21.5 22.0"
        );
        assert_eq!(lines[1], "cp prep.input source");
        assert_eq!(lines[2], "sed 's/^[012][012 ]*/2 2 1/g' source > dest");
        assert_eq!(lines[3], "cp dest prep.input");
        assert_eq!(lines[4], "cp prep.input source");
        assert!(lines[5].contains("/maxit=50/gI"));
        assert!(lines[7].contains("/nelocc=3/gI"));
        assert_eq!(lines[9], "cp dest prep.input");
        assert_eq!(lines[10], "mpirun -np 8 prep-mpi.x < prep.input > prep.output");
    }

    #[test]
    fn test_bad_box_fails_prepare() {
        let parameters = PrepParameters {
            cell_box: Some(BoxSpec::List(vec![])),
            ..PrepParameters::default()
        };
        assert!(prep(parameters).prepare(&JobOptions::default()).is_err());
    }
}
