//! # TOML 配置读取
//!
//! 作业文件、工作流文件与基组文件都是 TOML，统一在此读取。
//! 文件中的相对路径相对于该文件所在目录解析。
//!
//! ## 依赖关系
//! - 被 `calculations/job_file.rs`, `workflows/`, `commands/` 使用
//! - 使用 `serde`, `toml`

use crate::error::{Result, TurboflowError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// 读取并反序列化 TOML 文件
pub fn load_toml<T: DeserializeOwned>(path: &Path) -> Result<T> {
    tracing::debug!(path = %path.display(), "loading TOML");
    let content = fs::read_to_string(path).map_err(|e| TurboflowError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    toml::from_str(&content).map_err(|e| TurboflowError::TomlError {
        path: path.display().to_string(),
        source: e,
    })
}

/// 序列化为 TOML 并写入文件
pub fn save_toml<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let text = toml::to_string_pretty(value)?;
    fs::write(path, text).map_err(|e| TurboflowError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })
}

/// 配置文件所在目录
pub fn base_dir(config: &Path) -> PathBuf {
    config
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// 相对路径按 `base` 解析，绝对路径原样返回
pub fn resolve_path(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Sample {
        name: String,
        value: f64,
    }

    #[test]
    fn test_load_and_save() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("sample.toml");
        let sample = Sample {
            name: "h2".to_string(),
            value: 0.5,
        };
        save_toml(&sample, &path).unwrap();
        let back: Sample = load_toml(&path).unwrap();
        assert_eq!(back, sample);
    }

    #[test]
    fn test_invalid_toml() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("bad.toml");
        fs::write(&path, "name = \n").unwrap();
        assert!(matches!(
            load_toml::<Sample>(&path),
            Err(TurboflowError::TomlError { .. })
        ));
        assert!(matches!(
            load_toml::<Sample>(&tmp.path().join("missing.toml")),
            Err(TurboflowError::FileReadError { .. })
        ));
    }

    #[test]
    fn test_resolve_path() {
        let base = Path::new("/jobs/h2");
        assert_eq!(
            resolve_path(base, Path::new("fort.10")),
            PathBuf::from("/jobs/h2/fort.10")
        );
        assert_eq!(
            resolve_path(base, Path::new("/abs/fort.10")),
            PathBuf::from("/abs/fort.10")
        );
        assert_eq!(base_dir(Path::new("job.toml")), PathBuf::from(""));
    }
}
