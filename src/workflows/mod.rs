//! # 工作流模块
//!
//! 把多个计算串成固定的阶段序列，前一阶段的输出作为后一阶段的输入：
//! - `dft`: makefort10 → [assemblingpseudo] → convertfort10mol → prep
//! - `dft_precise`: 同上，prep 在一系列网格密度上循环
//! - `qmc`: vmcopt → vmc → lrdmc
//!
//! ## 依赖关系
//! - 被 `commands/workflow.rs` 使用
//! - 使用 `calculations/`, `engine/`
//! - 子模块: context, dft, dft_precise, qmc

pub mod context;
pub mod dft;
pub mod dft_precise;
pub mod qmc;

pub use context::{StageRecord, WorkflowContext, WorkflowState};
pub use dft::{DftChain, DftOutput};
pub use dft_precise::{DensityConvergence, DensitySchedule, DftPreciseChain};
pub use qmc::{QmcChain, QmcOutput};
