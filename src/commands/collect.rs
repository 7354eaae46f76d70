//! # collect 命令实现
//!
//! 在根目录下查找某类计算的回收目录，并行解析能量并导出 CSV。
//!
//! ## 功能
//! - 按标志文件识别回收目录（`prep.output`, `pip0.d`, `pip0_fn.d`）
//! - rayon 并行解析
//! - 解析失败的目录单独报告，不影响其余结果
//!
//! ## 依赖关系
//! - 使用 `cli/collect.rs` 定义的参数
//! - 使用 `batch/`, `parsers/prep.rs`, `parsers/pip0.rs`
//! - 使用 `csv` 导出结果

use crate::batch::{BatchRunner, DirectoryCollector};
use crate::calculations::{lrdmc, prep, vmc};
use crate::cli::collect::{CollectArgs, CollectKind};
use crate::error::{Result, TurboflowError};
use crate::parsers::pip0::parse_pip0_file;
use crate::parsers::prep::parse_prep_output;
use crate::utils::output;

use serde::Serialize;
use std::path::Path;

/// CSV 中的一行
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnergyRecord {
    pub directory: String,
    pub energy: f64,
    pub energy_err: Option<f64>,
    pub variance: Option<f64>,
    pub variance_err: Option<f64>,
    /// prep 的自洽迭代次数
    pub iterations: Option<usize>,
}

/// 每类计算的标志文件
pub fn marker_file(kind: CollectKind) -> &'static str {
    match kind {
        CollectKind::Prep => prep::OUTPUT_FILE,
        CollectKind::Vmc => vmc::ENERGY_FILE,
        CollectKind::Lrdmc => lrdmc::ENERGY_FILE,
    }
}

/// 解析单个回收目录
pub fn collect_record(kind: CollectKind, dir: &Path) -> Result<EnergyRecord> {
    let directory = dir.display().to_string();
    let file = dir.join(marker_file(kind));

    match kind {
        CollectKind::Prep => {
            let log = parse_prep_output(&file)?;
            Ok(EnergyRecord {
                directory,
                energy: log.energy,
                energy_err: None,
                variance: None,
                variance_err: None,
                iterations: Some(log.convergence.len()),
            })
        }
        CollectKind::Vmc | CollectKind::Lrdmc => {
            let estimates = parse_pip0_file(&file)?;
            Ok(EnergyRecord {
                directory,
                energy: estimates.energy.value,
                energy_err: Some(estimates.energy.error),
                variance: Some(estimates.variance_square.value),
                variance_err: Some(estimates.variance_square.error),
                iterations: None,
            })
        }
    }
}

/// 写出 CSV
pub fn write_records(records: &[EnergyRecord], output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush().map_err(|e| TurboflowError::FileWriteError {
        path: output_path.display().to_string(),
        source: e,
    })?;
    Ok(())
}

/// 执行 collect 命令
pub fn execute(args: CollectArgs) -> Result<()> {
    output::print_header(&format!("Collecting {} results", args.kind));

    let mut collector = DirectoryCollector::new(&args.root, marker_file(args.kind));
    if let Some(pattern) = &args.pattern {
        collector = collector.with_pattern(pattern)?;
    }
    let dirs = collector.collect()?;

    if dirs.is_empty() {
        output::print_warning(&format!(
            "No folders containing '{}' under {}",
            marker_file(args.kind),
            args.root.display()
        ));
        return Ok(());
    }
    output::print_info(&format!("Found {} folders", dirs.len()));

    let kind = args.kind;
    let result = BatchRunner::new(args.jobs).run(dirs, |dir| collect_record(kind, dir))?;

    if !result.failures.is_empty() {
        output::print_separator();
        for (dir, err) in &result.failures {
            output::print_warning(&format!("{}: {}", dir, err));
        }
        output::print_separator();
    }

    let records: Vec<EnergyRecord> = result.successes.into_iter().map(|(_, r)| r).collect();
    if records.is_empty() {
        output::print_warning("No folder could be parsed.");
        return Ok(());
    }
    write_records(&records, &args.output)?;

    output::print_done(&format!(
        "Collected {} result(s) into '{}' ({} failed)",
        records.len(),
        args.output.display(),
        result.failures.len()
    ));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const PIP0: &str = " bins\n Energy = -17.21 0.0012\n Variance = 0.31 0.004\n";

    #[test]
    fn test_collect_records_in_parallel() {
        let tmp = tempfile::tempdir().unwrap();
        for (dir, content) in [("001_vmc/retrieved", PIP0), ("002_vmc/retrieved", "broken\n")] {
            fs::create_dir_all(tmp.path().join(dir)).unwrap();
            fs::write(tmp.path().join(dir).join("pip0.d"), content).unwrap();
        }

        let dirs = DirectoryCollector::new(tmp.path(), marker_file(CollectKind::Vmc))
            .collect()
            .unwrap();
        let result = BatchRunner::new(2)
            .quiet()
            .run(dirs, |dir| collect_record(CollectKind::Vmc, dir))
            .unwrap();

        assert_eq!(result.success(), 1);
        assert_eq!(result.failed(), 1);
        let record = &result.successes[0].1;
        assert_eq!(record.energy, -17.21);
        assert_eq!(record.energy_err, Some(0.0012));
        assert_eq!(record.iterations, None);
    }

    #[test]
    fn test_prep_record_and_csv() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(
            tmp.path().join("prep.output"),
            " Iter 1 a b c d -1.0\n Iter 2 a b c d -1.1\n Final self consistent energy (Ha) = -1.15\n",
        )
        .unwrap();

        let record = collect_record(CollectKind::Prep, tmp.path()).unwrap();
        assert_eq!(record.energy, -1.15);
        assert_eq!(record.iterations, Some(2));

        let csv_path = tmp.path().join("out.csv");
        write_records(&[record], &csv_path).unwrap();
        let text = fs::read_to_string(&csv_path).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("directory,energy,energy_err,variance,variance_err,iterations")
        );
        assert!(lines.next().unwrap().ends_with(",-1.15,,,,2"));
    }
}
