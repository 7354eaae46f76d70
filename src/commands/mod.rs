//! # 命令执行模块
//!
//! 实现各子命令的业务逻辑。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/`, `calculations/`, `engine/`, `workflows/`, `utils/`
//! - 子模块: prepare, run, parse, workflow, basis, collect

pub mod basis;
pub mod collect;
pub mod parse;
pub mod prepare;
pub mod run;
pub mod workflow;

use crate::cli::Commands;
use crate::error::Result;
use tabled::{Table, Tabled};

/// 执行命令
pub fn run(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Prepare(args) => prepare::execute(args),
        Commands::Run(args) => run::execute(args),
        Commands::Parse(args) => parse::execute(args),
        Commands::Workflow(args) => workflow::execute(args),
        Commands::Basis(args) => basis::execute(args),
        Commands::Collect(args) => collect::execute(args),
    }
}

/// 两列结果表
#[derive(Debug, Clone, Tabled)]
struct ResultRow {
    #[tabled(rename = "Quantity")]
    quantity: String,
    #[tabled(rename = "Value")]
    value: String,
}

/// 打印 (字段, 值) 表格
pub(crate) fn print_rows(rows: Vec<(String, String)>) {
    let rows: Vec<ResultRow> = rows
        .into_iter()
        .map(|(quantity, value)| ResultRow { quantity, value })
        .collect();
    println!("{}", Table::new(&rows));
}
