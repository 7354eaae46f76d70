//! # 批量处理模块
//!
//! 批量解析已完成的回收目录。
//!
//! ## 功能
//! - 按标志文件收集回收目录
//! - 并行解析
//! - 进度反馈与统计
//!
//! ## 依赖关系
//! - 被 `commands/collect.rs` 使用
//! - 使用 `rayon` 进行并行处理
//! - 使用 `indicatif` 显示进度

pub mod collector;
pub mod runner;

pub use collector::DirectoryCollector;
pub use runner::{BatchResult, BatchRunner, ProcessResult};
