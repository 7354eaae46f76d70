//! # prepare 命令实现
//!
//! 按作业 TOML 生成工作目录，供手动或经 Slurm 运行。
//!
//! ## 功能
//! - 写出输入文件、驱动脚本并复制所需文件
//! - 可选生成 `submit.sbatch`
//! - 打印回收列表
//!
//! ## 依赖关系
//! - 使用 `cli/prepare.rs` 定义的参数
//! - 使用 `calculations/job_file.rs`, `engine/`
//! - 使用 `utils/slurm.rs`, `utils/output.rs`

use crate::calculations::JobFile;
use crate::cli::prepare::PrepareArgs;
use crate::engine::stage_job;
use crate::error::{Result, TurboflowError};
use crate::utils::output;
use crate::utils::slurm::{generate_sbatch_script, SlurmConfig};

use std::fs;

/// 执行 prepare 命令
pub fn execute(args: PrepareArgs) -> Result<()> {
    let (calculation, options) = JobFile::load(&args.job)?;
    output::print_header(&format!("Preparing {} job", calculation.label()));

    let job = calculation.prepare(&options)?;
    stage_job(&job, &args.output)?;
    output::print_success(&format!(
        "Staged {} file(s) into '{}'",
        job.files.len(),
        args.output.display()
    ));

    if args.sbatch {
        let modules: Vec<String> = args
            .modules
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let config = SlurmConfig {
            job_name: job.label.clone(),
            partition: args.partition.clone(),
            nodes: args.nodes.unwrap_or(options.resources.num_machines),
            ntasks: args.ntasks.unwrap_or(options.resources.total_mpiprocs()),
            time_limit: args.time.clone(),
            modules,
        };
        let exec_cmd = format!("{} < {} > {}", args.code, job.stdin_name, job.stdout_name);
        let sbatch_path = args.output.join("submit.sbatch");

        fs::create_dir_all(args.output.join("slurm_logs")).map_err(|e| {
            TurboflowError::FileWriteError {
                path: args.output.join("slurm_logs").display().to_string(),
                source: e,
            }
        })?;
        fs::write(
            &sbatch_path,
            generate_sbatch_script(&config, &args.output, &exec_cmd),
        )
        .map_err(|e| TurboflowError::FileWriteError {
            path: sbatch_path.display().to_string(),
            source: e,
        })?;
        output::print_info(&format!("Slurm script: {}", sbatch_path.display()));
    }

    output::print_file_list("Files retrieved after the run:", &job.retrieve_list);
    output::print_done(&format!(
        "Run with: cd {} && {} < {} > {}",
        args.output.display(),
        args.code,
        job.stdin_name,
        job.stdout_name
    ));
    Ok(())
}
