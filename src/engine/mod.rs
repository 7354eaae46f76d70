//! # 作业执行层
//!
//! 调度、远程传输与重试不在本程序范围内；这里只定义执行作业的接口，
//! 以及在本地目录中落地作业、检查回收列表的公共步骤。
//!
//! ## 依赖关系
//! - 被 `workflows/`, `commands/run.rs`, `commands/prepare.rs` 使用
//! - 使用 `calculations/` 的 `JobSpec`, `tree/`
//! - 子模块: local

pub mod local;

pub use local::LocalRunner;

use crate::calculations::{FileSource, JobSpec};
use crate::error::{Result, TurboflowError};
use crate::tree::{copy_all, copy_to_path, LocalTree};
use std::fs;
use std::path::{Path, PathBuf};

/// 作业结束后回收的目录
#[derive(Debug, Clone)]
pub struct RetrievedFolder {
    tree: LocalTree,
}

impl RetrievedFolder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        RetrievedFolder {
            tree: LocalTree::new(root),
        }
    }

    pub fn root(&self) -> &Path {
        self.tree.root()
    }

    pub fn tree(&self) -> &LocalTree {
        &self.tree
    }

    /// 必须存在的条目的路径
    pub fn require(&self, name: &str) -> Result<PathBuf> {
        let path = self.tree.resolve(name);
        if path.exists() {
            Ok(path)
        } else {
            Err(TurboflowError::FileNotFound {
                path: path.display().to_string(),
            })
        }
    }
}

/// 执行作业并返回回收目录
pub trait JobRunner {
    /// `code` 为读取驱动脚本（标准输入）的程序
    fn run(&mut self, code: &str, job: &JobSpec) -> Result<RetrievedFolder>;
}

fn create_parent(target: &Path) -> Result<()> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(|e| TurboflowError::FileWriteError {
            path: parent.display().to_string(),
            source: e,
        })?;
    }
    Ok(())
}

/// 在 `dir` 中落地作业的全部文件
pub fn stage_job(job: &JobSpec, dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| TurboflowError::FileWriteError {
        path: dir.display().to_string(),
        source: e,
    })?;

    for staged in &job.files {
        let target = dir.join(&staged.name);
        match &staged.source {
            FileSource::Inline(text) => {
                create_parent(&target)?;
                fs::write(&target, text).map_err(|e| TurboflowError::FileWriteError {
                    path: target.display().to_string(),
                    source: e,
                })?;
            }
            FileSource::Copy(source) if source.is_dir() => {
                copy_all(".", &LocalTree::new(source), &mut LocalTree::new(&target), None)?;
            }
            FileSource::Copy(source) => {
                if !source.is_file() {
                    return Err(TurboflowError::FileNotFound {
                        path: source.display().to_string(),
                    });
                }
                create_parent(&target)?;
                fs::copy(source, &target).map_err(|e| TurboflowError::FileWriteError {
                    path: target.display().to_string(),
                    source: e,
                })?;
            }
            FileSource::Tree(tree) => {
                copy_to_path(&staged.name, ".", tree, dir, None)?;
            }
        }
        tracing::debug!(job = %job.label, file = %staged.name, "staged");
    }
    Ok(())
}

/// 回收列表中缺失的条目
pub fn missing_outputs(job: &JobSpec, workdir: &Path) -> Vec<String> {
    job.retrieve_list
        .iter()
        .filter(|name| !workdir.join(name.as_str()).exists())
        .cloned()
        .collect()
}

/// 检查回收列表并把条目复制到 `retrieved`
pub fn retrieve_outputs(job: &JobSpec, workdir: &Path, retrieved: &Path) -> Result<RetrievedFolder> {
    let missing = missing_outputs(job, workdir);
    if !missing.is_empty() {
        return Err(TurboflowError::MissingOutputFiles {
            stage: job.label.clone(),
            missing,
        });
    }

    fs::create_dir_all(retrieved).map_err(|e| TurboflowError::FileWriteError {
        path: retrieved.display().to_string(),
        source: e,
    })?;
    let work = LocalTree::new(workdir);
    for name in &job.retrieve_list {
        copy_to_path(name, ".", &work, retrieved, None)?;
    }
    Ok(RetrievedFolder::new(retrieved))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::JobOptions;
    use crate::tree::MemoryTree;

    fn sample_job(source_file: &Path, source_dir: &Path) -> JobSpec {
        let mut scratch = MemoryTree::new();
        scratch.insert("turborvb.scratch/randseed.0", "seed");

        let mut job = JobSpec::new("sample", &JobOptions::default());
        job.inline("execute.sh", "echo hi\n")
            .inline("inputs/extra.in", "x\n")
            .copy("fort.10", source_file)
            .copy("data", source_dir)
            .tree("turborvb.scratch", scratch)
            .retrieve(["fort.10_new"]);
        job
    }

    #[test]
    fn test_stage_job() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("src");
        fs::create_dir_all(src.join("data/sub")).unwrap();
        fs::write(src.join("fort.10_in"), "wf").unwrap();
        fs::write(src.join("data/sub/a"), "a").unwrap();

        let work = tmp.path().join("work");
        stage_job(&sample_job(&src.join("fort.10_in"), &src.join("data")), &work).unwrap();

        assert_eq!(fs::read_to_string(work.join("execute.sh")).unwrap(), "echo hi\n");
        assert_eq!(fs::read_to_string(work.join("inputs/extra.in")).unwrap(), "x\n");
        assert_eq!(fs::read_to_string(work.join("fort.10")).unwrap(), "wf");
        assert_eq!(fs::read_to_string(work.join("data/sub/a")).unwrap(), "a");
        assert_eq!(
            fs::read_to_string(work.join("turborvb.scratch/randseed.0")).unwrap(),
            "seed"
        );
    }

    #[test]
    fn test_stage_missing_source() {
        let tmp = tempfile::tempdir().unwrap();
        let job = sample_job(&tmp.path().join("nope"), &tmp.path().join("nodir"));
        assert!(matches!(
            stage_job(&job, &tmp.path().join("work")),
            Err(TurboflowError::FileNotFound { .. })
        ));
    }

    #[test]
    fn test_missing_outputs_exit_code() {
        let tmp = tempfile::tempdir().unwrap();
        let mut job = JobSpec::new("prep", &JobOptions::default());
        job.retrieve(["fort.10_new", "prep.output"]);
        fs::write(tmp.path().join("prep.output"), "").unwrap();

        let err = retrieve_outputs(&job, tmp.path(), &tmp.path().join("out")).unwrap_err();
        match &err {
            TurboflowError::MissingOutputFiles { stage, missing } => {
                assert_eq!(stage, "prep");
                assert_eq!(missing, &vec!["fort.10_new".to_string(), "execute.out".to_string()]);
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(err.exit_code(), 300);
    }

    #[test]
    fn test_retrieve_outputs_copies_entries() {
        let tmp = tempfile::tempdir().unwrap();
        let work = tmp.path().join("work");
        fs::create_dir_all(work.join("turborvb.scratch")).unwrap();
        fs::write(work.join("turborvb.scratch/r"), "r").unwrap();
        fs::write(work.join("execute.out"), "done").unwrap();
        fs::write(work.join("unlisted"), "").unwrap();

        let mut job = JobSpec::new("vmc", &JobOptions::default());
        job.retrieve(["turborvb.scratch"]);
        let folder = retrieve_outputs(&job, &work, &tmp.path().join("retrieved")).unwrap();

        assert!(folder.require("turborvb.scratch/r").is_ok());
        assert!(folder.require("execute.out").is_ok());
        assert!(folder.require("unlisted").is_err());
    }
}
