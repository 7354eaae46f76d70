//! # Slurm 脚本生成工具
//!
//! 为已准备好的作业目录生成 sbatch 包装脚本，驱动脚本本身不变。
//!
//! ## 依赖关系
//! - 被 `commands/prepare.rs` 使用
//! - 无外部模块依赖

use std::path::Path;

/// Slurm 作业配置
#[derive(Debug, Clone)]
pub struct SlurmConfig {
    pub job_name: String,
    pub partition: String,
    pub nodes: u32,
    pub ntasks: u32,
    pub time_limit: String,
    pub modules: Vec<String>,
}

impl Default for SlurmConfig {
    fn default() -> Self {
        SlurmConfig {
            job_name: "turborvb".to_string(),
            partition: "compute".to_string(),
            nodes: 1,
            ntasks: 1,
            time_limit: "24:00:00".to_string(),
            modules: vec![],
        }
    }
}

/// 生成 sbatch 脚本内容
pub fn generate_sbatch_script(config: &SlurmConfig, workdir: &Path, exec_cmd: &str) -> String {
    let module_loads = config
        .modules
        .iter()
        .map(|m| format!("module load {}", m))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"#!/bin/bash
#SBATCH --partition {}
#SBATCH --nodes={}
#SBATCH --time {}
#SBATCH -n {}
#SBATCH -J {}
#SBATCH -o slurm_logs/%x.out
#SBATCH -e slurm_logs/%x.err

set -euo pipefail

module purge 2>&1
{}

cd "{}"
echo "Running: {}"
{}
"#,
        config.partition,
        config.nodes,
        config.time_limit,
        config.ntasks,
        config.job_name,
        module_loads,
        workdir.display(),
        exec_cmd,
        exec_cmd,
    )
}
