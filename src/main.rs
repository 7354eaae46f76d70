//! # turboflow - TurboRVB 作业准备、输出解析与工作流
//!
//! 把 TurboRVB 各可执行程序包装成类型化的计算：生成输入文件与驱动脚本，
//! 检查并解析回收的输出，再把多个计算串成 DFT / QMC 工作流。
//!
//! ## 子命令
//! - `prepare`  - 生成单个作业目录（可选 sbatch 脚本）
//! - `run`      - 本地运行单个作业
//! - `parse`    - 解析回收目录
//! - `workflow` - 运行 dft / dft-precise / qmc 工作流
//! - `basis`    - 基组裁剪与 pseudo.dat 组装
//! - `collect`  - 并行汇总大量回收目录
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/          (命令行参数定义)
//!   ├── commands/     (命令执行逻辑)
//!   │     ├── workflows/    (工作流状态机)
//!   │     ├── engine/       (作业执行)
//!   │     ├── calculations/ (计算适配器)
//!   │     ├── namelist/     (Fortran namelist)
//!   │     ├── parsers/      (输入生成与输出解析)
//!   │     ├── tree/         (文件树复制)
//!   │     └── models/       (数据模型)
//!   ├── batch/        (并行批处理)
//!   ├── utils/        (工具函数)
//!   └── error.rs      (错误处理)
//! ```

mod batch;
mod calculations;
mod cli;
mod commands;
mod engine;
mod error;
mod models;
mod namelist;
mod parsers;
mod tree;
mod utils;
mod workflows;

use clap::Parser;
use cli::Cli;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();

    if let Err(e) = utils::logging::setup_logging(cli.verbose, cli.quiet, cli.log_file.clone()) {
        utils::output::print_error(&format!("{}", e));
        std::process::exit(e.exit_code());
    }

    if let Err(e) = commands::run(cli.command) {
        tracing::error!(error = %e, "command failed");
        utils::output::print_error(&format!("{}", e));
        std::process::exit(e.exit_code());
    }
}
