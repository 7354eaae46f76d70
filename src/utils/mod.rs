//! # 工具函数模块
//!
//! 提供美化输出、进度条、日志、配置读取、数值格式化与绘图等工具。
//!
//! ## 依赖关系
//! - 被 `commands/`, `engine/`, `workflows/` 等模块使用
//! - 子模块: output, progress, logging, config, format, plot, slurm

pub mod config;
pub mod format;
pub mod logging;
pub mod output;
pub mod plot;
pub mod progress;
pub mod slurm;
