//! # DFT 网格收敛工作流
//!
//! 与 DFT 工作流相同地准备波函数，然后在一系列逐步减小的网格间距上
//! 依次运行 prep，收集 (间距, 能量)。间距序列在运行前全部算出。
//!
//! ## 依赖关系
//! - 被 `commands/workflow.rs` 使用
//! - 使用 `workflows/dft.rs`, `utils/plot.rs`
//! - 使用 `csv` 导出收敛数据

use super::context::WorkflowContext;
use super::dft::DftChain;
use crate::calculations::Prep;
use crate::engine::JobRunner;
use crate::error::{Result, TurboflowError};
use crate::utils::plot;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

// ─────────────────────────────────────────────────────────────
// 网格间距序列
// ─────────────────────────────────────────────────────────────

/// 从 `start` 开始每次减少 `step`，严格大于 `floor` 时继续
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DensitySchedule {
    pub start: f64,
    pub step: f64,
    pub floor: f64,
}

impl Default for DensitySchedule {
    fn default() -> Self {
        DensitySchedule {
            start: 0.10,
            step: 0.005,
            floor: 0.08,
        }
    }
}

impl DensitySchedule {
    /// (序号, 间距) 列表
    pub fn points(&self) -> Vec<(usize, f64)> {
        self.into_iter().collect()
    }
}

impl IntoIterator for &DensitySchedule {
    type Item = (usize, f64);
    type IntoIter = DensityIter;

    fn into_iter(self) -> DensityIter {
        DensityIter {
            schedule: *self,
            index: 0,
        }
    }
}

pub struct DensityIter {
    schedule: DensitySchedule,
    index: usize,
}

impl Iterator for DensityIter {
    type Item = (usize, f64);

    fn next(&mut self) -> Option<(usize, f64)> {
        let s = &self.schedule;
        if s.step <= 0.0 {
            return None;
        }
        let raw = s.start - s.step * self.index as f64;
        // 去掉累积的舍入误差
        let density = (raw * 1e12).round() / 1e12;
        if density <= s.floor + s.step * 1e-9 {
            return None;
        }
        let item = (self.index, density);
        self.index += 1;
        Some(item)
    }
}

// ─────────────────────────────────────────────────────────────
// 收敛数据
// ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DensityPoint {
    pub density: f64,
    pub energy: f64,
}

/// 按序号排列的 (间距, 能量)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DensityConvergence {
    pub points: BTreeMap<usize, DensityPoint>,
    /// 工作流使用的赝势文件
    pub pseudo: Option<PathBuf>,
}

impl DensityConvergence {
    pub fn insert(&mut self, index: usize, density: f64, energy: f64) {
        self.points.insert(index, DensityPoint { density, energy });
    }

    /// 导出为 CSV: index, density, energy
    pub fn to_csv(&self, output_path: &Path) -> Result<()> {
        let mut wtr = csv::Writer::from_path(output_path)?;
        wtr.write_record(["index", "density", "energy"])?;
        for (index, point) in &self.points {
            wtr.write_record(&[
                index.to_string(),
                format!("{:.4}", point.density),
                format!("{:.8}", point.energy),
            ])?;
        }
        wtr.flush().map_err(|e| TurboflowError::FileWriteError {
            path: output_path.display().to_string(),
            source: e,
        })?;
        Ok(())
    }

    /// 能量随网格间距变化的图
    pub fn plot(&self, output_path: &Path) -> Result<()> {
        let data: Vec<(f64, f64)> = self
            .points
            .values()
            .map(|p| (p.density, p.energy))
            .collect();
        plot::plot_density_convergence(&data, output_path, "DFT grid convergence")
    }
}

// ─────────────────────────────────────────────────────────────
// 工作流
// ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct DftPreciseChain {
    pub dft: DftChain,
    pub schedule: DensitySchedule,
}

impl DftPreciseChain {
    pub fn new(dft: DftChain) -> Self {
        DftPreciseChain {
            dft,
            schedule: DensitySchedule::default(),
        }
    }

    /// 与 DFT 工作流使用相同的文件格式，`grid` 被忽略
    pub fn load(path: &Path) -> Result<Self> {
        Ok(DftPreciseChain::new(DftChain::load(path)?))
    }

    pub fn run(&self, runner: &mut dyn JobRunner) -> Result<DensityConvergence> {
        let points = self.schedule.points();
        if points.is_empty() {
            return Err(TurboflowError::InvalidArgument(format!(
                "density schedule {:?} yields no points",
                self.schedule
            )));
        }

        let mut ctx = WorkflowContext::new("dft-precise");
        let wf = self.dft.prepare_wavefunction(&mut ctx, runner)?;

        let mut convergence = DensityConvergence {
            pseudo: wf.pseudo.clone(),
            ..DensityConvergence::default()
        };
        for (index, density) in points {
            tracing::info!(index, density, "running density");
            let prep = Prep {
                fort10: wf.fort10.clone(),
                pseudo: wf.pseudo.clone(),
                parameters: self.dft.prep_parameters(Some(density)),
            };
            let stage = format!("prep_{}", index);
            let result = ctx.run_stage(&stage, runner, &self.dft.codes.prep, &prep, &self.dft.options)?;
            convergence.insert(index, density, result.energy);
        }

        ctx.finish()?;
        Ok(convergence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::JobOptions;
    use crate::models::{Atom, Structure};
    use crate::workflows::dft::{DftCodes, DftParameters};
    use crate::workflows::testing::FakeRunner;
    use std::fs;

    #[test]
    fn test_default_schedule() {
        let points = DensitySchedule::default().points();
        assert_eq!(points, vec![(0, 0.1), (1, 0.095), (2, 0.09), (3, 0.085)]);
    }

    #[test]
    fn test_custom_schedule() {
        let schedule = DensitySchedule {
            start: 0.2,
            step: 0.05,
            floor: 0.05,
        };
        assert_eq!(schedule.points(), vec![(0, 0.2), (1, 0.15), (2, 0.1)]);

        let empty = DensitySchedule {
            start: 0.05,
            step: 0.01,
            floor: 0.08,
        };
        assert!(empty.points().is_empty());
    }

    fn chain() -> DftPreciseChain {
        DftPreciseChain::new(DftChain {
            structure: Structure::new("he", vec![Atom::new("He", [0.0, 0.0, 0.0])]),
            parameters: DftParameters {
                grid: Some(0.3),
                ..DftParameters::default()
            },
            codes: DftCodes::default(),
            options: JobOptions::default(),
        })
    }

    #[test]
    fn test_density_loop() {
        let tmp = tempfile::tempdir().unwrap();
        let mut runner = FakeRunner::new(tmp.path())
            .fixture("prep.output", " Final self consistent energy (Ha) = -2.{n}\n");

        let conv = chain().run(&mut runner).unwrap();

        assert_eq!(
            runner.labels(),
            vec!["makefort10", "convertfort10mol", "prep", "prep", "prep", "prep"]
        );
        assert_eq!(conv.points.len(), 4);
        assert_eq!(conv.points[&0], DensityPoint { density: 0.1, energy: -2.3 });
        assert_eq!(conv.points[&3], DensityPoint { density: 0.085, energy: -2.6 });

        // 网格参数被间距序列覆盖
        let script = runner.jobs[3].1.inline_text("execute.sh").unwrap();
        assert!(script.starts_with("turbo-genius.sh -j prep -g -grid 0.095 -box "));
    }

    #[test]
    fn test_empty_schedule_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let mut runner = FakeRunner::new(tmp.path());
        let mut precise = chain();
        precise.schedule.floor = 0.2;
        assert!(matches!(
            precise.run(&mut runner),
            Err(TurboflowError::InvalidArgument(_))
        ));
        assert!(runner.jobs.is_empty());
    }

    #[test]
    fn test_csv_export() {
        let tmp = tempfile::tempdir().unwrap();
        let mut conv = DensityConvergence::default();
        conv.insert(1, 0.095, -17.2);
        conv.insert(0, 0.1, -17.1);

        let path = tmp.path().join("conv.csv");
        conv.to_csv(&path).unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "index,density,energy\n0,0.1000,-17.10000000\n1,0.0950,-17.20000000\n"
        );
    }
}
