//! # 本地目录文件树
//!
//! 把磁盘上的一个目录包装为 `FileTree`/`WritableTree`。
//!
//! ## 依赖关系
//! - 被 `engine/local.rs`, `engine/mod.rs`, `tree/copy.rs` 使用

use super::{normalize, EntryKind, FileTree, WritableTree};
use crate::error::{Result, TurboflowError};
use std::fs::{self, File};
use std::ffi::OsString;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// 以 `root` 为根的本地目录
#[derive(Debug, Clone)]
pub struct LocalTree {
    root: PathBuf,
}

impl LocalTree {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        LocalTree { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 树内相对路径对应的磁盘路径
    pub fn resolve(&self, path: &str) -> PathBuf {
        let path = normalize(path);
        if path.is_empty() {
            self.root.clone()
        } else {
            self.root.join(path)
        }
    }
}

/// 目录条目名称（有序）；任何一个条目读取失败都返回错误
fn entry_names<I>(entries: I, dir: &Path) -> Result<Vec<String>>
where
    I: IntoIterator<Item = io::Result<OsString>>,
{
    let mut names = entries
        .into_iter()
        .map(|entry| {
            entry
                .map(|name| name.to_string_lossy().to_string())
                .map_err(|e| TurboflowError::FileReadError {
                    path: dir.display().to_string(),
                    source: e,
                })
        })
        .collect::<Result<Vec<String>>>()?;
    names.sort();
    Ok(names)
}

impl FileTree for LocalTree {
    fn kind(&self, path: &str) -> Result<EntryKind> {
        let full = self.resolve(path);
        match fs::metadata(&full) {
            Ok(meta) if meta.is_dir() => Ok(EntryKind::Directory),
            Ok(_) => Ok(EntryKind::File),
            Err(_) => Err(TurboflowError::FileNotFound {
                path: full.display().to_string(),
            }),
        }
    }

    fn children(&self, path: &str) -> Result<Vec<String>> {
        let full = self.resolve(path);
        if !full.is_dir() {
            return Err(TurboflowError::DirectoryNotFound {
                path: full.display().to_string(),
            });
        }

        let entries = fs::read_dir(&full).map_err(|e| TurboflowError::FileReadError {
            path: full.display().to_string(),
            source: e,
        })?;
        entry_names(entries.map(|entry| entry.map(|e| e.file_name())), &full)
    }

    fn open(&self, path: &str) -> Result<Box<dyn Read + '_>> {
        let full = self.resolve(path);
        if !full.is_file() {
            return Err(TurboflowError::FileNotFound {
                path: full.display().to_string(),
            });
        }
        let file = File::open(&full).map_err(|e| TurboflowError::FileReadError {
            path: full.display().to_string(),
            source: e,
        })?;
        Ok(Box::new(file))
    }
}

impl WritableTree for LocalTree {
    fn put(&mut self, path: &str, reader: &mut dyn Read) -> Result<()> {
        let full = self.resolve(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).map_err(|e| TurboflowError::FileWriteError {
                path: parent.display().to_string(),
                source: e,
            })?;
        }

        let mut file = File::create(&full).map_err(|e| TurboflowError::FileWriteError {
            path: full.display().to_string(),
            source: e,
        })?;
        std::io::copy(reader, &mut file).map_err(|e| TurboflowError::FileWriteError {
            path: full.display().to_string(),
            source: e,
        })?;
        Ok(())
    }

    fn mkdir(&mut self, path: &str) -> Result<()> {
        let full = self.resolve(path);
        fs::create_dir_all(&full).map_err(|e| TurboflowError::FileWriteError {
            path: full.display().to_string(),
            source: e,
        })
    }
}
