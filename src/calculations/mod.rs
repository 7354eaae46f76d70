//! # 计算适配器模块
//!
//! 每个 TurboRVB 可执行程序对应一个适配器：把类型化的输入转换为
//! 工作目录中的文件集合（输入文件 + 驱动脚本）与固定的回收文件列表，
//! 并把回收目录解析为结构化结果。
//!
//! ## 依赖关系
//! - 被 `engine/`, `workflows/`, `commands/` 使用
//! - 使用 `models/`, `namelist/`, `parsers/`, `tree/`
//! - 子模块: script, makefort10, assembling_pseudo, convertfort10mol,
//!   prep, vmcopt, vmc, lrdmc, job_file

pub mod assembling_pseudo;
pub mod convertfort10mol;
pub mod job_file;
pub mod lrdmc;
pub mod makefort10;
pub mod prep;
pub mod script;
pub mod vmc;
pub mod vmcopt;

pub use assembling_pseudo::AssemblingPseudo;
pub use convertfort10mol::Convertfort10mol;
pub use job_file::{AnyCalculation, CalculationOutput, JobFile, OutputKind};
pub use lrdmc::Lrdmc;
pub use makefort10::{Makefort10, Makefort10Standalone};
pub use prep::Prep;
pub use vmc::Vmc;
pub use vmcopt::Vmcopt;

use crate::engine::RetrievedFolder;
use crate::error::Result;
use crate::tree::MemoryTree;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 所有计算共用的文件名
pub const FORT10: &str = "fort.10";
pub const FORT10_NEW: &str = "fort.10_new";
pub const FORT11: &str = "fort.11";
pub const FORT12: &str = "fort.12";
pub const PSEUDO: &str = "pseudo.dat";
pub const SCRATCH: &str = "turborvb.scratch";

// ─────────────────────────────────────────────────────────────
// 作业选项
// ─────────────────────────────────────────────────────────────

/// 调度资源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Resources {
    pub num_machines: u32,
    pub num_mpiprocs_per_machine: u32,
}

impl Default for Resources {
    fn default() -> Self {
        Resources {
            num_machines: 1,
            num_mpiprocs_per_machine: 1,
        }
    }
}

impl Resources {
    /// MPI 进程总数
    pub fn total_mpiprocs(&self) -> u32 {
        self.num_machines * self.num_mpiprocs_per_machine
    }
}

/// 作业选项：驱动脚本名、标准输出名与资源
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobOptions {
    pub input_filename: String,
    pub output_filename: String,
    pub resources: Resources,
}

impl Default for JobOptions {
    fn default() -> Self {
        JobOptions {
            input_filename: "execute.sh".to_string(),
            output_filename: "execute.out".to_string(),
            resources: Resources::default(),
        }
    }
}

// ─────────────────────────────────────────────────────────────
// 作业描述
// ─────────────────────────────────────────────────────────────

/// 待写入工作目录的文件来源
#[derive(Debug, Clone, PartialEq)]
pub enum FileSource {
    /// 直接写入的文本
    Inline(String),
    /// 复制本地文件或目录
    Copy(PathBuf),
    /// 从内存树中复制同名条目
    Tree(MemoryTree),
}

/// 工作目录中的一个条目
#[derive(Debug, Clone, PartialEq)]
pub struct StagedFile {
    pub name: String,
    pub source: FileSource,
}

/// 一次计算的工作目录描述
#[derive(Debug, Clone, PartialEq)]
pub struct JobSpec {
    /// 阶段标签，用于目录命名与日志
    pub label: String,
    pub files: Vec<StagedFile>,
    /// 作为程序标准输入的文件
    pub stdin_name: String,
    /// 程序标准输出写入的文件
    pub stdout_name: String,
    /// 作业结束后必须存在并被回收的条目
    pub retrieve_list: Vec<String>,
}

impl JobSpec {
    pub fn new(label: impl Into<String>, options: &JobOptions) -> Self {
        JobSpec {
            label: label.into(),
            files: Vec::new(),
            stdin_name: options.input_filename.clone(),
            stdout_name: options.output_filename.clone(),
            retrieve_list: Vec::new(),
        }
    }

    pub fn inline(&mut self, name: &str, content: impl Into<String>) -> &mut Self {
        self.stage(name, FileSource::Inline(content.into()))
    }

    pub fn copy(&mut self, name: &str, path: impl Into<PathBuf>) -> &mut Self {
        self.stage(name, FileSource::Copy(path.into()))
    }

    pub fn tree(&mut self, name: &str, tree: MemoryTree) -> &mut Self {
        self.stage(name, FileSource::Tree(tree))
    }

    /// 可选的赝势文件
    pub fn pseudo(&mut self, pseudo: Option<&PathBuf>) -> &mut Self {
        if let Some(path) = pseudo {
            self.copy(PSEUDO, path);
        }
        self
    }

    fn stage(&mut self, name: &str, source: FileSource) -> &mut Self {
        self.files.push(StagedFile {
            name: name.to_string(),
            source,
        });
        self
    }

    /// 设置回收列表，标准输出文件总在其中
    pub fn retrieve<I, S>(&mut self, names: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.retrieve_list = names.into_iter().map(Into::into).collect();
        if !self.retrieve_list.contains(&self.stdout_name) {
            self.retrieve_list.push(self.stdout_name.clone());
        }
        self
    }

    pub fn file(&self, name: &str) -> Option<&FileSource> {
        self.files
            .iter()
            .find(|f| f.name == name)
            .map(|f| &f.source)
    }

    /// 内联文件的文本（测试与预览用）
    pub fn inline_text(&self, name: &str) -> Option<&str> {
        match self.file(name) {
            Some(FileSource::Inline(text)) => Some(text),
            _ => None,
        }
    }
}

/// 计算适配器
pub trait Calculation {
    type Output;

    /// 阶段标签
    fn label(&self) -> &'static str;

    /// 未显式指定时使用的作业选项
    fn default_options(&self) -> JobOptions {
        JobOptions::default()
    }

    /// 生成工作目录描述
    fn prepare(&self, options: &JobOptions) -> Result<JobSpec>;

    /// 解析回收目录
    fn parse(&self, retrieved: &RetrievedFolder) -> Result<Self::Output>;
}
