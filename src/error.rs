//! # 统一错误处理模块
//!
//! 定义 turboflow 的所有错误类型，使用 `thiserror` 派生。
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use thiserror::Error;

/// 计算未产生全部预期输出文件时的退出码
pub const EXIT_MISSING_OUTPUT_FILES: i32 = 300;

/// turboflow 统一错误类型
#[derive(Error, Debug)]
pub enum TurboflowError {
    // ─────────────────────────────────────────────────────────────
    // I/O 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to read file: {path}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: String },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ─────────────────────────────────────────────────────────────
    // 解析错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to parse {format} file: {path}\nReason: {reason}")]
    ParseError {
        format: String,
        path: String,
        reason: String,
    },

    #[error("Invalid TOML in {path}: {source}")]
    TomlError {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to serialize TOML: {0}")]
    TomlSerializeError(#[from] toml::ser::Error),

    // ─────────────────────────────────────────────────────────────
    // Namelist 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Namelist '{group}': key '{key}' expects {expected}, got {found}")]
    NamelistTypeMismatch {
        group: String,
        key: String,
        expected: String,
        found: String,
    },

    #[error("Namelist '{group}' has no key '{key}'")]
    UnknownNamelistKey { group: String, key: String },

    // ─────────────────────────────────────────────────────────────
    // 基组 / 赝势错误
    // ─────────────────────────────────────────────────────────────
    #[error("Unsupported angular momentum {l} in basis of {element} (allowed 0..=5)")]
    UnsupportedAngularMomentum { element: String, l: u32 },

    #[error("Contracted shell of {element} mixes angular momenta {found:?}")]
    MixedAngularMomentum { element: String, found: Vec<u32> },

    #[error("Unknown chemical element: {0}")]
    UnknownElement(String),

    #[error("No basis set given for element {0}")]
    MissingBasis(String),

    #[error("No pseudopotential given for element {0}")]
    MissingPseudo(String),

    // ─────────────────────────────────────────────────────────────
    // 参数错误
    // ─────────────────────────────────────────────────────────────
    #[error("Bad box: {0}")]
    BadBox(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid exclusion pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    // ─────────────────────────────────────────────────────────────
    // 作业执行错误
    // ─────────────────────────────────────────────────────────────
    #[error("Calculation '{stage}' did not produce all expected output files: {}", missing.join(", "))]
    MissingOutputFiles { stage: String, missing: Vec<String> },

    #[error("External command '{command}' not found in PATH")]
    CommandNotFound { command: String },

    #[error("External command failed: {command}\n{stderr}")]
    CommandFailed { command: String, stderr: String },

    // ─────────────────────────────────────────────────────────────
    // 工作流错误
    // ─────────────────────────────────────────────────────────────
    #[error("Workflow '{workflow}': cannot move from {from} to {to}")]
    InvalidTransition {
        workflow: String,
        from: String,
        to: String,
    },

    // ─────────────────────────────────────────────────────────────
    // CSV 错误
    // ─────────────────────────────────────────────────────────────
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    // ─────────────────────────────────────────────────────────────
    // 其他
    // ─────────────────────────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}

impl TurboflowError {
    /// 进程退出码：缺少输出文件为 300，其余为 1
    pub fn exit_code(&self) -> i32 {
        match self {
            TurboflowError::MissingOutputFiles { .. } => EXIT_MISSING_OUTPUT_FILES,
            _ => 1,
        }
    }
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, TurboflowError>;
