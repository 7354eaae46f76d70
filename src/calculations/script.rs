//! # 驱动脚本生成
//!
//! 每个计算的工作目录中都有一个逐行执行的 shell 脚本：
//! 固定的外部命令，加上用 `sed` 改写生成的输入文件中 namelist 键值的行。
//!
//! ## 依赖关系
//! - 被 `calculations/` 下各适配器使用
//! - 使用 `namelist/`

use crate::namelist::NamelistValue;
use std::collections::BTreeMap;

/// 驱动脚本
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DriverScript {
    lines: Vec<String>,
}

impl DriverScript {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一行命令
    pub fn push(&mut self, line: impl Into<String>) -> &mut Self {
        self.lines.push(line.into());
        self
    }

    /// 改写 `file` 中的一组键值
    ///
    /// 生成 `cp file source`，每个键一条 sed 与 `cp dest source`，
    /// 最后 `cp dest file`。没有键时不生成任何行。
    pub fn rewrite_keys(&mut self, file: &str, entries: &[(String, String)]) -> &mut Self {
        if entries.is_empty() {
            return self;
        }
        self.push(format!("cp {} source", file));
        for (key, value) in entries {
            self.push(sed_substitution(key, value));
            self.push("cp dest source");
        }
        self.push(format!("cp dest {}", file))
    }

    /// 用 namelist 更新改写 `file`
    pub fn namelist_update(
        &mut self,
        file: &str,
        updates: &BTreeMap<String, NamelistValue>,
    ) -> &mut Self {
        self.rewrite_keys(file, &namelist_entries(updates))
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// 脚本文本
    pub fn render(&self) -> String {
        let mut text = self.lines.join("\n");
        text.push('\n');
        text
    }
}

/// namelist 更新渲染为 (键, Fortran 字面值)
pub fn namelist_entries(updates: &BTreeMap<String, NamelistValue>) -> Vec<(String, String)> {
    updates
        .iter()
        .map(|(k, v)| (k.clone(), v.to_fortran()))
        .collect()
}

/// 把 `source` 中 `KEY = ...` 行（可被 `!` 注释，大小写不敏感）替换为 `KEY=VALUE`，写入 `dest`
pub fn sed_substitution(key: &str, value: &str) -> String {
    format!(
        "sed 's/^\\s*!\\?{}\\s*=.*$/{}={}/gI' source > dest",
        escape_pattern(key),
        escape_replacement(key),
        escape_replacement(value)
    )
}

/// 转义 BRE 元字符；单引号按 shell 规则拆开
fn escape_pattern(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '.' | '[' | ']' | '*' | '^' | '$' | '\\' | '/' => {
                out.push('\\');
                out.push(c);
            }
            '\'' => out.push_str("'\\''"),
            _ => out.push(c),
        }
    }
    out
}

/// 转义替换文本中的 `\`、`/` 与 `&`
fn escape_replacement(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' | '/' | '&' => {
                out.push('\\');
                out.push(c);
            }
            '\'' => out.push_str("'\\''"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sed_substitution() {
        assert_eq!(
            sed_substitution("ngen", "1000"),
            r"sed 's/^\s*!\?ngen\s*=.*$/ngen=1000/gI' source > dest"
        );
    }

    #[test]
    fn test_sed_escapes_metacharacters() {
        let line = sed_substitution("twobodypar(1)", "'a/b'");
        assert_eq!(
            line,
            r"sed 's/^\s*!\?twobodypar(1)\s*=.*$/twobodypar(1)='\''a\/b'\''/gI' source > dest"
        );
        let line = sed_substitution("x.y", "1&2");
        assert!(line.contains(r"!\?x\.y\s*="));
        assert!(line.contains(r"/x.y=1\&2/"));
    }

    #[test]
    fn test_namelist_update_block() {
        let mut updates = BTreeMap::new();
        updates.insert("nweight".to_string(), NamelistValue::Int(100));
        updates.insert("iopt".to_string(), NamelistValue::Bool(true));

        let mut script = DriverScript::new();
        script.push("turbo-genius.sh -j vmc -g");
        script.namelist_update("vmc.input", &updates);

        let lines = script.lines();
        assert_eq!(lines.len(), 7);
        assert_eq!(lines[1], "cp vmc.input source");
        // BTreeMap 按键排序
        assert!(lines[2].contains("/iopt=.TRUE./gI"));
        assert_eq!(lines[3], "cp dest source");
        assert!(lines[4].contains("/nweight=100/gI"));
        assert_eq!(lines[6], "cp dest vmc.input");
    }

    #[test]
    fn test_empty_update_emits_nothing() {
        let mut script = DriverScript::new();
        script.namelist_update("prep.input", &BTreeMap::new());
        assert!(script.lines().is_empty());
        assert_eq!(script.render(), "\n");
    }
}
