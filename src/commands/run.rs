//! # run 命令实现
//!
//! 在本地运行单个作业，检查回收列表并打印解析结果。
//!
//! ## 依赖关系
//! - 使用 `cli/run.rs` 定义的参数
//! - 使用 `calculations/job_file.rs`, `engine/local.rs`

use super::print_rows;
use crate::calculations::JobFile;
use crate::cli::run::RunArgs;
use crate::engine::{JobRunner, LocalRunner};
use crate::error::Result;
use crate::utils::output;

/// 执行 run 命令
pub fn execute(args: RunArgs) -> Result<()> {
    let (calculation, options) = JobFile::load(&args.job)?;
    output::print_header(&format!("Running {} job", calculation.label()));

    let job = calculation.prepare(&options)?;
    let mut runner = LocalRunner::new(&args.work_root);
    let retrieved = runner.run(&args.code, &job)?;
    output::print_success(&format!("Retrieved into '{}'", retrieved.root().display()));

    let parsed = calculation.parse(&retrieved)?;
    print_rows(parsed.rows());
    Ok(())
}
