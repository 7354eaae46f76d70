//! # 工作流上下文
//!
//! 记录工作流的状态与已完成阶段。状态只能向前推进：
//! 未开始 → 阶段提交 → 阶段完成 → (下一阶段提交 → ...) → 结束。
//!
//! ## 依赖关系
//! - 被 `workflows/dft.rs`, `workflows/dft_precise.rs`, `workflows/qmc.rs` 使用
//! - 使用 `engine/`, `calculations/`

use crate::calculations::{Calculation, JobOptions};
use crate::engine::{JobRunner, RetrievedFolder};
use crate::error::{Result, TurboflowError};
use crate::utils::output;
use std::fmt;
use std::path::PathBuf;

/// 工作流状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowState {
    NotStarted,
    Submitted(String),
    Completed(String),
    Finished,
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkflowState::NotStarted => write!(f, "not started"),
            WorkflowState::Submitted(stage) => write!(f, "{} submitted", stage),
            WorkflowState::Completed(stage) => write!(f, "{} complete", stage),
            WorkflowState::Finished => write!(f, "finished"),
        }
    }
}

/// 已完成阶段的记录
#[derive(Debug, Clone, PartialEq)]
pub struct StageRecord {
    pub name: String,
    pub retrieved: PathBuf,
}

/// 工作流上下文
#[derive(Debug)]
pub struct WorkflowContext {
    workflow: String,
    state: WorkflowState,
    records: Vec<StageRecord>,
}

impl WorkflowContext {
    pub fn new(workflow: impl Into<String>) -> Self {
        WorkflowContext {
            workflow: workflow.into(),
            state: WorkflowState::NotStarted,
            records: Vec::new(),
        }
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn records(&self) -> &[StageRecord] {
        &self.records
    }

    pub fn record(&self, stage: &str) -> Option<&StageRecord> {
        self.records.iter().find(|r| r.name == stage)
    }

    fn transition(&mut self, to: WorkflowState) -> Result<()> {
        let allowed = match (&self.state, &to) {
            (WorkflowState::NotStarted, WorkflowState::Submitted(stage))
            | (WorkflowState::Completed(_), WorkflowState::Submitted(stage)) => {
                self.record(stage).is_none()
            }
            (WorkflowState::Submitted(a), WorkflowState::Completed(b)) => a == b,
            (WorkflowState::Completed(_), WorkflowState::Finished) => true,
            _ => false,
        };

        if !allowed {
            return Err(TurboflowError::InvalidTransition {
                workflow: self.workflow.clone(),
                from: self.state.to_string(),
                to: to.to_string(),
            });
        }
        tracing::debug!(workflow = %self.workflow, from = %self.state, to = %to, "transition");
        self.state = to;
        Ok(())
    }

    /// 提交阶段
    pub fn submit(&mut self, stage: &str) -> Result<()> {
        self.transition(WorkflowState::Submitted(stage.to_string()))
    }

    /// 阶段完成
    pub fn complete(&mut self, stage: &str, retrieved: &RetrievedFolder) -> Result<()> {
        self.transition(WorkflowState::Completed(stage.to_string()))?;
        self.records.push(StageRecord {
            name: stage.to_string(),
            retrieved: retrieved.root().to_path_buf(),
        });
        Ok(())
    }

    /// 结束工作流
    pub fn finish(&mut self) -> Result<()> {
        self.transition(WorkflowState::Finished)?;
        output::print_success(&format!(
            "Workflow '{}' finished after {} stages",
            self.workflow,
            self.records.len()
        ));
        Ok(())
    }

    /// 提交一个计算、等待其结束并解析结果
    pub fn run_stage<C: Calculation>(
        &mut self,
        stage: &str,
        runner: &mut dyn JobRunner,
        code: &str,
        calculation: &C,
        options: &JobOptions,
    ) -> Result<C::Output> {
        self.submit(stage)?;
        output::print_stage(&self.workflow, stage);
        tracing::info!(workflow = %self.workflow, stage, code, "submitting");

        let job = calculation.prepare(options)?;
        let retrieved = runner.run(code, &job)?;
        let parsed = calculation.parse(&retrieved)?;

        self.complete(stage, &retrieved)?;
        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_transitions() {
        let folder = RetrievedFolder::new("/tmp/x");
        let mut ctx = WorkflowContext::new("dft");
        assert_eq!(ctx.state(), &WorkflowState::NotStarted);

        ctx.submit("mf10").unwrap();
        ctx.complete("mf10", &folder).unwrap();
        ctx.submit("prep").unwrap();
        ctx.complete("prep", &folder).unwrap();
        ctx.finish().unwrap();

        assert_eq!(ctx.state(), &WorkflowState::Finished);
        assert_eq!(ctx.records().len(), 2);
        assert!(ctx.record("mf10").is_some());
    }

    #[test]
    fn test_invalid_transitions() {
        let folder = RetrievedFolder::new("/tmp/x");
        let mut ctx = WorkflowContext::new("qmc");

        assert!(ctx.finish().is_err());
        assert!(ctx.complete("vmc", &folder).is_err());

        ctx.submit("vmc").unwrap();
        assert!(ctx.submit("lrdmc").is_err());
        assert!(ctx.complete("lrdmc", &folder).is_err());
        ctx.complete("vmc", &folder).unwrap();

        // 已完成的阶段不能再次提交
        assert!(matches!(
            ctx.submit("vmc"),
            Err(TurboflowError::InvalidTransition { .. })
        ));

        ctx.finish().unwrap();
        assert!(ctx.submit("lrdmc").is_err());
    }
}
