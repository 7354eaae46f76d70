//! # 文件树抽象
//!
//! 把“检索回来的输出目录”和“内存中的文件夹数据”统一成可递归遍历的文件树，
//! 并提供带正则排除的递归复制。
//!
//! ## 依赖关系
//! - 被 `engine/`, `parsers/`, `calculations/lrdmc.rs` 使用
//! - 子模块: memory, local, copy

pub mod copy;
pub mod local;
pub mod memory;

use crate::error::Result;
use std::io::Read;

pub use copy::{copy_all, copy_between_trees, copy_to_path, Exclude};
pub use local::LocalTree;
pub use memory::MemoryTree;

/// 文件树中条目的类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// 只读文件树
pub trait FileTree {
    /// 条目类型；不存在时返回 `FileNotFound`
    fn kind(&self, path: &str) -> Result<EntryKind>;

    /// 目录的直接子条目名称
    fn children(&self, path: &str) -> Result<Vec<String>>;

    /// 以流的方式打开文件
    fn open(&self, path: &str) -> Result<Box<dyn Read + '_>>;
}

/// 可写文件树
pub trait WritableTree {
    /// 在 `path` 处创建文件（必要时创建父目录），内容取自 `reader`
    fn put(&mut self, path: &str, reader: &mut dyn Read) -> Result<()>;

    /// 创建目录（含父目录），已存在时不报错
    fn mkdir(&mut self, path: &str) -> Result<()>;
}

/// 拼接树内相对路径，`""` 与 `"."` 表示根
pub fn join_path(base: &str, name: &str) -> String {
    let base = normalize(base);
    let name = normalize(name);
    match (base.is_empty(), name.is_empty()) {
        (true, _) => name,
        (false, true) => base,
        (false, false) => format!("{}/{}", base, name),
    }
}

/// 去掉 `./` 前缀与首尾 `/`
pub fn normalize(path: &str) -> String {
    let mut p = path.trim_matches('/');
    while let Some(rest) = p.strip_prefix("./") {
        p = rest.trim_start_matches('/');
    }
    if p == "." {
        String::new()
    } else {
        p.to_string()
    }
}
