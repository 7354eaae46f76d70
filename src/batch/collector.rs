//! # 回收目录收集器
//!
//! 在根目录下递归查找包含指定标志文件的目录（例如含 `pip0.d` 的 VMC 回收目录）。
//!
//! ## 功能
//! - 标志文件判定
//! - 可选 glob 模式，匹配相对于根目录的路径
//! - 结果按路径排序
//!
//! ## 依赖关系
//! - 被 `commands/collect.rs` 调用
//! - 使用 `walkdir` 遍历目录，`glob` 匹配模式

use crate::error::{Result, TurboflowError};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 回收目录收集器
pub struct DirectoryCollector {
    root: PathBuf,
    /// 目录中必须存在的文件
    marker: String,
    pattern: Option<glob::Pattern>,
}

impl DirectoryCollector {
    pub fn new(root: impl Into<PathBuf>, marker: &str) -> Self {
        Self {
            root: root.into(),
            marker: marker.to_string(),
            pattern: None,
        }
    }

    /// 设置相对路径的匹配模式，例如 `*/retrieved`
    pub fn with_pattern(mut self, pattern: &str) -> Result<Self> {
        let compiled = glob::Pattern::new(pattern).map_err(|e| {
            TurboflowError::InvalidArgument(format!("Invalid pattern '{}': {}", pattern, e))
        })?;
        self.pattern = Some(compiled);
        Ok(self)
    }

    /// 收集所有匹配的目录
    pub fn collect(&self) -> Result<Vec<PathBuf>> {
        if !self.root.is_dir() {
            return Err(TurboflowError::DirectoryNotFound {
                path: self.root.display().to_string(),
            });
        }

        let mut dirs: Vec<PathBuf> = WalkDir::new(&self.root)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_dir())
            .filter(|e| e.path().join(&self.marker).is_file())
            .filter(|e| self.matches_pattern(e.path()))
            .map(|e| e.path().to_path_buf())
            .collect();

        dirs.sort();
        tracing::debug!(root = %self.root.display(), marker = %self.marker, found = dirs.len(), "collected");
        Ok(dirs)
    }

    fn matches_pattern(&self, path: &Path) -> bool {
        let pattern = match &self.pattern {
            Some(p) => p,
            None => return true,
        };
        match path.strip_prefix(&self.root) {
            Ok(relative) => pattern.matches_path(relative),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn layout() -> tempfile::TempDir {
        let tmp = tempfile::tempdir().unwrap();
        for dir in ["001_vmc/retrieved", "002_vmc/retrieved", "003_lrdmc/retrieved", "001_vmc/work"] {
            fs::create_dir_all(tmp.path().join(dir)).unwrap();
        }
        fs::write(tmp.path().join("001_vmc/retrieved/pip0.d"), "").unwrap();
        fs::write(tmp.path().join("002_vmc/retrieved/pip0.d"), "").unwrap();
        fs::write(tmp.path().join("001_vmc/work/pip0.d"), "").unwrap();
        fs::write(tmp.path().join("003_lrdmc/retrieved/pip0_fn.d"), "").unwrap();
        tmp
    }

    #[test]
    fn test_collect_by_marker() {
        let tmp = layout();
        let dirs = DirectoryCollector::new(tmp.path(), "pip0.d").collect().unwrap();
        assert_eq!(
            dirs,
            vec![
                tmp.path().join("001_vmc/retrieved"),
                tmp.path().join("001_vmc/work"),
                tmp.path().join("002_vmc/retrieved"),
            ]
        );
    }

    #[test]
    fn test_collect_with_pattern() {
        let tmp = layout();
        let dirs = DirectoryCollector::new(tmp.path(), "pip0.d")
            .with_pattern("*/retrieved")
            .unwrap()
            .collect()
            .unwrap();
        assert_eq!(dirs.len(), 2);
        assert!(DirectoryCollector::new(tmp.path(), "x").with_pattern("[").is_err());
    }

    #[test]
    fn test_missing_root() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(matches!(
            DirectoryCollector::new(tmp.path().join("none"), "pip0.d").collect(),
            Err(TurboflowError::DirectoryNotFound { .. })
        ));
    }
}
