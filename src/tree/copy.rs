//! # 递归复制
//!
//! 把文件树中的一个条目（文件或目录）复制到另一棵树或本地路径，
//! 保持相对结构；名称被排除正则匹配时跳过，且不再向下递归。
//!
//! ## 依赖关系
//! - 被 `engine/`, `calculations/vmc.rs`, `calculations/lrdmc.rs` 使用
//! - 使用 `regex` crate

use super::{join_path, EntryKind, FileTree, LocalTree, WritableTree};
use crate::error::{Result, TurboflowError};
use regex::Regex;
use std::path::Path;

/// 排除模式：从名称开头匹配（不要求匹配到结尾）
#[derive(Debug, Clone)]
pub struct Exclude(Regex);

impl Exclude {
    pub fn new(pattern: &str) -> Result<Self> {
        Regex::new(&format!("^(?:{})", pattern))
            .map(Exclude)
            .map_err(|e| TurboflowError::InvalidPattern {
                pattern: pattern.to_string(),
                source: e,
            })
    }

    pub fn matches(&self, name: &str) -> bool {
        self.0.is_match(name)
    }
}

/// 把 `source/name` 复制到 `dst` 中的 `name`
pub fn copy_between_trees(
    name: &str,
    source: &str,
    src: &dyn FileTree,
    dst: &mut dyn WritableTree,
    exclude: Option<&Exclude>,
) -> Result<()> {
    if exclude.map_or(false, |ex| ex.matches(name)) {
        tracing::debug!(name, "excluded from copy");
        return Ok(());
    }

    let full = join_path(source, name);
    match src.kind(&full)? {
        EntryKind::Directory => {
            dst.mkdir(name)?;
            for child in src.children(&full)? {
                copy_between_trees(&join_path(name, &child), source, src, dst, exclude)?;
            }
        }
        EntryKind::File => {
            let mut reader = src.open(&full)?;
            dst.put(name, &mut *reader)?;
        }
    }
    Ok(())
}

/// 把 `source/name` 复制到本地目录 `dst` 下的 `name`
pub fn copy_to_path(
    name: &str,
    source: &str,
    src: &dyn FileTree,
    dst: &Path,
    exclude: Option<&Exclude>,
) -> Result<()> {
    let mut target = LocalTree::new(dst);
    copy_between_trees(name, source, src, &mut target, exclude)
}

/// 复制 `source` 下的全部条目
pub fn copy_all(
    source: &str,
    src: &dyn FileTree,
    dst: &mut dyn WritableTree,
    exclude: Option<&Exclude>,
) -> Result<()> {
    for child in src.children(source)? {
        copy_between_trees(&child, source, src, dst, exclude)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::MemoryTree;
    use std::fs;

    fn sample() -> MemoryTree {
        let mut tree = MemoryTree::new();
        tree.insert("a.txt", "alpha");
        tree.insert("dir/b.txt", "beta");
        tree.insert("dir/sub/c.txt", vec![0u8, 159, 146, 150]);
        tree
    }

    #[test]
    fn test_copy_between_trees_reproduces_structure() {
        let src = sample();
        let mut dst = MemoryTree::new();
        copy_all(".", &src, &mut dst, None).unwrap();
        assert_eq!(dst, src);
    }

    #[test]
    fn test_exclusion_skips_subtree() {
        let src = sample();
        let mut dst = MemoryTree::new();
        let exclude = Exclude::new("dir").unwrap();
        copy_all(".", &src, &mut dst, Some(&exclude)).unwrap();
        assert_eq!(dst.paths(), vec!["a.txt"]);
    }

    #[test]
    fn test_exclusion_is_anchored_at_start() {
        let src = sample();
        let mut dst = MemoryTree::new();
        // "sub" 只出现在路径中间，不会被只从开头匹配的模式命中
        let exclude = Exclude::new("sub").unwrap();
        copy_all(".", &src, &mut dst, Some(&exclude)).unwrap();
        assert_eq!(dst.len(), 3);

        let mut dst = MemoryTree::new();
        let exclude = Exclude::new(r"dir/sub").unwrap();
        copy_all(".", &src, &mut dst, Some(&exclude)).unwrap();
        assert_eq!(dst.paths(), vec!["a.txt", "dir/b.txt"]);
    }

    #[test]
    fn test_copy_to_path_creates_parents() {
        let src = sample();
        let tmp = tempfile::tempdir().unwrap();
        copy_to_path("dir", ".", &src, tmp.path(), None).unwrap();
        copy_to_path("a.txt", ".", &src, tmp.path(), None).unwrap();

        assert_eq!(fs::read_to_string(tmp.path().join("a.txt")).unwrap(), "alpha");
        assert_eq!(fs::read_to_string(tmp.path().join("dir/b.txt")).unwrap(), "beta");
        assert_eq!(
            fs::read(tmp.path().join("dir/sub/c.txt")).unwrap(),
            vec![0u8, 159, 146, 150]
        );
    }

    #[test]
    fn test_local_to_memory_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        copy_all(".", &sample(), &mut LocalTree::new(tmp.path()), None).unwrap();

        let mut back = MemoryTree::new();
        copy_between_trees("dir", ".", &LocalTree::new(tmp.path()), &mut back, None).unwrap();
        assert_eq!(back.paths(), vec!["dir/b.txt", "dir/sub/c.txt"]);
        assert_eq!(back.get("dir/b.txt").unwrap(), b"beta");
    }

    #[test]
    fn test_empty_directory_round_trip() {
        let mut src = sample();
        src.insert_dir("dir/empty");
        let tmp = tempfile::tempdir().unwrap();
        copy_to_path("dir", ".", &src, tmp.path(), None).unwrap();
        assert!(tmp.path().join("dir/empty").is_dir());

        let mut back = MemoryTree::new();
        copy_between_trees("dir", ".", &LocalTree::new(tmp.path()), &mut back, None).unwrap();
        assert_eq!(back.kind("dir/empty").unwrap(), EntryKind::Directory);
        assert!(back.children("dir/empty").unwrap().is_empty());
    }

    #[test]
    fn test_missing_source_is_fatal() {
        let src = sample();
        let mut dst = MemoryTree::new();
        let err = copy_between_trees("nope", ".", &src, &mut dst, None).unwrap_err();
        assert!(matches!(err, TurboflowError::FileNotFound { .. }));
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(matches!(
            Exclude::new("("),
            Err(TurboflowError::InvalidPattern { .. })
        ));
    }
}
