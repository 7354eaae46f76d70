//! # 本地执行器
//!
//! 在本机顺序执行作业：每个作业使用 `<root>/<序号>_<标签>/work` 作为工作目录，
//! 结束后把回收列表中的条目复制到同级的 `retrieved` 目录。
//!
//! ## 依赖关系
//! - 被 `commands/run.rs`, `commands/workflow.rs` 使用
//! - 使用 `utils/progress.rs`

use super::{retrieve_outputs, stage_job, JobRunner, RetrievedFolder};
use crate::calculations::JobSpec;
use crate::error::{Result, TurboflowError};
use crate::utils::progress;
use std::fs::File;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// 本地执行器
pub struct LocalRunner {
    root: PathBuf,
    counter: usize,
    show_progress: bool,
}

impl LocalRunner {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        LocalRunner {
            root: root.into(),
            counter: 0,
            show_progress: true,
        }
    }

    /// 关闭 spinner（测试与静默模式）
    pub fn quiet(mut self) -> Self {
        self.show_progress = false;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn next_job_dir(&mut self, label: &str) -> PathBuf {
        self.counter += 1;
        self.root.join(format!("{:03}_{}", self.counter, label))
    }
}

impl JobRunner for LocalRunner {
    fn run(&mut self, code: &str, job: &JobSpec) -> Result<RetrievedFolder> {
        let job_dir = self.next_job_dir(&job.label);
        let work = job_dir.join("work");
        stage_job(job, &work)?;
        tracing::info!(job = %job.label, dir = %work.display(), "running job");

        let stdin_path = work.join(&job.stdin_name);
        let stdin = File::open(&stdin_path).map_err(|e| TurboflowError::FileReadError {
            path: stdin_path.display().to_string(),
            source: e,
        })?;
        let stdout_path = work.join(&job.stdout_name);
        let stdout = File::create(&stdout_path).map_err(|e| TurboflowError::FileWriteError {
            path: stdout_path.display().to_string(),
            source: e,
        })?;

        let spinner = self
            .show_progress
            .then(|| progress::create_spinner(&format!("{} ({})", job.label, code)));

        let result = Command::new(code)
            .current_dir(&work)
            .stdin(Stdio::from(stdin))
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::piped())
            .output();

        if let Some(pb) = spinner {
            pb.finish_and_clear();
        }

        let output = result.map_err(|e| match e.kind() {
            ErrorKind::NotFound => TurboflowError::CommandNotFound {
                command: code.to_string(),
            },
            _ => TurboflowError::CommandFailed {
                command: code.to_string(),
                stderr: e.to_string(),
            },
        })?;

        // 非零退出码不直接判定失败，以回收列表是否齐全为准
        if !output.status.success() {
            tracing::warn!(
                job = %job.label,
                status = %output.status,
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "job exited with non-zero status"
            );
        }

        retrieve_outputs(job, &work, &job_dir.join("retrieved"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::JobOptions;
    use std::fs;

    fn job(script: &str) -> JobSpec {
        let mut job = JobSpec::new("demo", &JobOptions::default());
        job.inline("execute.sh", script)
            .inline("fort.10", "wf\n")
            .retrieve(["fort.10_new"]);
        job
    }

    #[test]
    fn test_run_and_retrieve() {
        let tmp = tempfile::tempdir().unwrap();
        let mut runner = LocalRunner::new(tmp.path()).quiet();

        let folder = runner
            .run("sh", &job("cp fort.10 fort.10_new\necho finished\n"))
            .unwrap();
        assert_eq!(folder.root(), tmp.path().join("001_demo/retrieved"));
        assert_eq!(
            fs::read_to_string(folder.require("fort.10_new").unwrap()).unwrap(),
            "wf\n"
        );
        assert_eq!(
            fs::read_to_string(folder.require("execute.out").unwrap()).unwrap(),
            "finished\n"
        );

        let second = runner.run("sh", &job("cp fort.10 fort.10_new\n")).unwrap();
        assert_eq!(second.root(), tmp.path().join("002_demo/retrieved"));
    }

    #[test]
    fn test_missing_output_is_reported() {
        let tmp = tempfile::tempdir().unwrap();
        let mut runner = LocalRunner::new(tmp.path()).quiet();
        let err = runner.run("sh", &job("exit 3\n")).unwrap_err();
        assert!(matches!(err, TurboflowError::MissingOutputFiles { .. }));
        assert_eq!(err.exit_code(), 300);
    }

    #[test]
    fn test_unknown_code() {
        let tmp = tempfile::tempdir().unwrap();
        let mut runner = LocalRunner::new(tmp.path()).quiet();
        assert!(matches!(
            runner.run("definitely-not-a-real-program-xyz", &job("")),
            Err(TurboflowError::CommandNotFound { .. })
        ));
    }
}
