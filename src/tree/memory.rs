//! # 内存文件树
//!
//! 以相对路径为键保存文件内容。目录由路径前缀隐式表示，
//! 空目录单独记录。
//!
//! ## 依赖关系
//! - 被 `calculations/vmc.rs`（scratch 目录副本）与测试使用

use super::{normalize, EntryKind, FileTree, WritableTree};
use crate::error::{Result, TurboflowError};
use std::collections::{BTreeMap, BTreeSet};
use std::io::{Cursor, Read};

/// 内存中的文件夹数据
#[derive(Debug, Clone, Default)]
pub struct MemoryTree {
    files: BTreeMap<String, Vec<u8>>,
    /// 显式创建的目录（保证空目录不丢失）
    dirs: BTreeSet<String>,
}

impl MemoryTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// 直接写入文件内容
    pub fn insert(&mut self, path: &str, content: impl Into<Vec<u8>>) {
        self.files.insert(normalize(path), content.into());
    }

    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.files.get(&normalize(path)).map(|v| v.as_slice())
    }

    /// 所有文件的相对路径（有序）
    pub fn paths(&self) -> Vec<&str> {
        self.files.keys().map(|k| k.as_str()).collect()
    }

    /// 显式记录一个目录
    pub fn insert_dir(&mut self, path: &str) {
        let path = normalize(path);
        if !path.is_empty() {
            self.dirs.insert(path);
        }
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// 既没有文件也没有目录
    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.dirs.is_empty()
    }

    /// 显式记录与由文件路径隐含的全部目录
    fn all_dirs(&self) -> BTreeSet<&str> {
        let mut dirs: BTreeSet<&str> = self.dirs.iter().map(|d| d.as_str()).collect();
        for path in self.files.keys().chain(self.dirs.iter()) {
            for (i, c) in path.char_indices() {
                if c == '/' {
                    dirs.insert(&path[..i]);
                }
            }
        }
        dirs
    }

    fn is_dir(&self, path: &str) -> bool {
        if path.is_empty() {
            return true;
        }
        let prefix = format!("{}/", path);
        self.dirs.contains(path)
            || self
                .files
                .keys()
                .chain(self.dirs.iter())
                .any(|k| k.starts_with(&prefix))
    }
}

/// 文件内容与目录结构相同即相等，不区分目录是显式记录还是隐含
impl PartialEq for MemoryTree {
    fn eq(&self, other: &Self) -> bool {
        self.files == other.files && self.all_dirs() == other.all_dirs()
    }
}

impl Eq for MemoryTree {}

impl FileTree for MemoryTree {
    fn kind(&self, path: &str) -> Result<EntryKind> {
        let path = normalize(path);
        if self.files.contains_key(&path) {
            Ok(EntryKind::File)
        } else if self.is_dir(&path) {
            Ok(EntryKind::Directory)
        } else {
            Err(TurboflowError::FileNotFound { path })
        }
    }

    fn children(&self, path: &str) -> Result<Vec<String>> {
        let path = normalize(path);
        if !self.is_dir(&path) {
            return Err(TurboflowError::DirectoryNotFound { path });
        }
        let prefix = if path.is_empty() {
            String::new()
        } else {
            format!("{}/", path)
        };

        let names: BTreeSet<String> = self
            .files
            .keys()
            .chain(self.dirs.iter())
            .filter_map(|k| k.strip_prefix(&prefix))
            .filter(|rest| !rest.is_empty())
            .filter_map(|rest| rest.split('/').next())
            .map(|s| s.to_string())
            .collect();
        Ok(names.into_iter().collect())
    }

    fn open(&self, path: &str) -> Result<Box<dyn Read + '_>> {
        let path = normalize(path);
        match self.files.get(&path) {
            Some(data) => Ok(Box::new(Cursor::new(data.as_slice()))),
            None => Err(TurboflowError::FileNotFound { path }),
        }
    }
}

impl WritableTree for MemoryTree {
    fn put(&mut self, path: &str, reader: &mut dyn Read) -> Result<()> {
        let path = normalize(path);
        let mut buf = Vec::new();
        reader
            .read_to_end(&mut buf)
            .map_err(|e| TurboflowError::FileReadError {
                path: path.clone(),
                source: e,
            })?;
        self.files.insert(path, buf);
        Ok(())
    }

    fn mkdir(&mut self, path: &str) -> Result<()> {
        self.insert_dir(path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_and_children() {
        let mut tree = MemoryTree::new();
        tree.insert("a.txt", "A");
        tree.insert("dir/b.txt", "B");
        tree.insert("dir/sub/c.txt", "C");

        assert_eq!(tree.kind("a.txt").unwrap(), EntryKind::File);
        assert_eq!(tree.kind("dir").unwrap(), EntryKind::Directory);
        assert_eq!(tree.kind("./dir/sub").unwrap(), EntryKind::Directory);
        assert!(tree.kind("missing").is_err());
        // "di" 只是前缀，不是目录
        assert!(tree.kind("di").is_err());

        assert_eq!(tree.children(".").unwrap(), vec!["a.txt", "dir"]);
        assert_eq!(tree.children("dir").unwrap(), vec!["b.txt", "sub"]);
        assert!(tree.children("a.txt").is_err());

        let mut s = String::new();
        tree.open("dir/sub/c.txt").unwrap().read_to_string(&mut s).unwrap();
        assert_eq!(s, "C");
    }

    #[test]
    fn test_empty_directory_is_kept() {
        let mut tree = MemoryTree::new();
        tree.insert_dir("scratch/empty");
        assert!(!tree.is_empty());
        assert_eq!(tree.len(), 0);
        assert_eq!(tree.kind("scratch").unwrap(), EntryKind::Directory);
        assert_eq!(tree.kind("scratch/empty").unwrap(), EntryKind::Directory);
        assert_eq!(tree.children("scratch").unwrap(), vec!["empty"]);
        assert!(tree.children("scratch/empty").unwrap().is_empty());
    }
}
