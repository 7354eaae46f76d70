//! # parse 命令实现
//!
//! 解析已有的回收目录并打印结果表。
//!
//! ## 依赖关系
//! - 使用 `cli/parse.rs` 定义的参数
//! - 使用 `calculations/job_file.rs` 的 `CalculationOutput`

use super::print_rows;
use crate::calculations::CalculationOutput;
use crate::cli::parse::ParseArgs;
use crate::engine::RetrievedFolder;
use crate::error::{Result, TurboflowError};
use crate::utils::output;

/// 执行 parse 命令
pub fn execute(args: ParseArgs) -> Result<()> {
    if !args.dir.is_dir() {
        return Err(TurboflowError::DirectoryNotFound {
            path: args.dir.display().to_string(),
        });
    }

    let folder = RetrievedFolder::new(&args.dir);
    let parsed = CalculationOutput::parse_kind(args.kind.into(), &folder)?;
    output::print_info(&format!("{}", args.dir.display()));
    print_rows(parsed.rows());
    Ok(())
}
