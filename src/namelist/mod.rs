//! # Fortran namelist 写入器
//!
//! 有序的带类型键值列表，按需序列化为 `&group ... /` 文本块。
//!
//! ## 格式说明
//! ```text
//! &system
//!   posunits = 'bohr'
//!   natoms = 1
//!  !twobodypar(1) = 1.0
//! /
//! ```
//! 布尔值写作 `.TRUE.`/`.FALSE.`，字符串加单引号，隐藏项以 `!` 注释掉。
//!
//! ## 依赖关系
//! - 被 `parsers/makefort10_input.rs`, `calculations/script.rs` 使用
//! - 使用 `utils/format.rs`
//! - 子模块: makefort10

pub mod makefort10;

use crate::error::{Result, TurboflowError};
use crate::utils::format::format_real;
use serde::{Deserialize, Serialize};

pub use makefort10::Makefort10Namelists;

/// namelist 字段的声明类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Bool,
    Int,
    Float,
    Str,
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueKind::Bool => write!(f, "bool"),
            ValueKind::Int => write!(f, "int"),
            ValueKind::Float => write!(f, "float"),
            ValueKind::Str => write!(f, "str"),
        }
    }
}

/// namelist 字段值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NamelistValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl NamelistValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            NamelistValue::Bool(_) => ValueKind::Bool,
            NamelistValue::Int(_) => ValueKind::Int,
            NamelistValue::Float(_) => ValueKind::Float,
            NamelistValue::Str(_) => ValueKind::Str,
        }
    }

    /// Fortran 字面量写法
    pub fn to_fortran(&self) -> String {
        match self {
            NamelistValue::Bool(true) => ".TRUE.".to_string(),
            NamelistValue::Bool(false) => ".FALSE.".to_string(),
            NamelistValue::Int(v) => v.to_string(),
            NamelistValue::Float(v) => format_real(*v),
            NamelistValue::Str(s) => format!("'{}'", s),
        }
    }

    /// 按声明类型解析 Fortran 字面量
    fn from_fortran(kind: ValueKind, text: &str) -> Option<Self> {
        let text = text.trim().trim_end_matches(',');
        match kind {
            ValueKind::Bool => match text.to_uppercase().as_str() {
                ".TRUE." | ".T." => Some(NamelistValue::Bool(true)),
                ".FALSE." | ".F." => Some(NamelistValue::Bool(false)),
                _ => None,
            },
            ValueKind::Int => text.parse().ok().map(NamelistValue::Int),
            ValueKind::Float => text
                .replace(['d', 'D'], "e")
                .parse()
                .ok()
                .map(NamelistValue::Float),
            ValueKind::Str => {
                let inner = text
                    .strip_prefix('\'')
                    .and_then(|s| s.strip_suffix('\''))
                    .unwrap_or(text);
                Some(NamelistValue::Str(inner.to_string()))
            }
        }
    }
}

impl From<bool> for NamelistValue {
    fn from(v: bool) -> Self {
        NamelistValue::Bool(v)
    }
}

impl From<i64> for NamelistValue {
    fn from(v: i64) -> Self {
        NamelistValue::Int(v)
    }
}

impl From<i32> for NamelistValue {
    fn from(v: i32) -> Self {
        NamelistValue::Int(v as i64)
    }
}

impl From<usize> for NamelistValue {
    fn from(v: usize) -> Self {
        NamelistValue::Int(v as i64)
    }
}

impl From<f64> for NamelistValue {
    fn from(v: f64) -> Self {
        NamelistValue::Float(v)
    }
}

impl From<&str> for NamelistValue {
    fn from(v: &str) -> Self {
        NamelistValue::Str(v.to_string())
    }
}

impl From<String> for NamelistValue {
    fn from(v: String) -> Self {
        NamelistValue::Str(v)
    }
}

/// 单个字段
#[derive(Debug, Clone, PartialEq)]
pub struct NamelistEntry {
    pub name: String,
    pub kind: ValueKind,
    pub value: NamelistValue,
    pub hidden: bool,
}

/// 一个 namelist 组，字段保持插入顺序
#[derive(Debug, Clone, PartialEq)]
pub struct NamelistGroup {
    name: String,
    entries: Vec<NamelistEntry>,
}

impl NamelistGroup {
    pub fn new(name: impl Into<String>) -> Self {
        NamelistGroup {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entries(&self) -> &[NamelistEntry] {
        &self.entries
    }

    /// 注册字段；默认值类型必须与声明类型一致
    pub fn add(
        &mut self,
        name: &str,
        kind: ValueKind,
        default: impl Into<NamelistValue>,
        hidden: bool,
    ) -> Result<()> {
        let value = default.into();
        self.check_kind(name, kind, &value)?;
        self.entries.push(NamelistEntry {
            name: name.to_string(),
            kind,
            value,
            hidden,
        });
        Ok(())
    }

    /// 覆盖已注册字段的值，并取消隐藏
    pub fn update(&mut self, name: &str, value: impl Into<NamelistValue>) -> Result<()> {
        let value = value.into();
        let idx = self
            .entries
            .iter()
            .position(|e| e.name == name)
            .ok_or_else(|| TurboflowError::UnknownNamelistKey {
                group: self.name.clone(),
                key: name.to_string(),
            })?;

        self.check_kind(name, self.entries[idx].kind, &value)?;
        let entry = &mut self.entries[idx];
        entry.value = value;
        entry.hidden = false;
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&NamelistEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn keys(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    /// 序列化为文本块
    pub fn dump(&self) -> String {
        let mut out = format!("&{}\n", self.name);
        for entry in &self.entries {
            out.push_str(&format!(
                " {}{} = {}\n",
                if entry.hidden { '!' } else { ' ' },
                entry.name,
                entry.value.to_fortran()
            ));
        }
        out.push_str("/\n");
        out
    }

    /// 以 `template` 的字段声明重新读取 `dump()` 的输出
    pub fn parse_dump(template: &NamelistGroup, text: &str) -> Result<NamelistGroup> {
        let parse_error = |reason: String| TurboflowError::ParseError {
            format: "namelist".to_string(),
            path: template.name.clone(),
            reason,
        };

        let mut group = template.clone();
        let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());

        let header = format!("&{}", template.name);
        match lines.next() {
            Some(first) if first.eq_ignore_ascii_case(&header) => {}
            other => {
                return Err(parse_error(format!(
                    "expected '{}', found {:?}",
                    header, other
                )))
            }
        }

        for line in lines {
            if line == "/" {
                return Ok(group);
            }

            let (hidden, body) = match line.strip_prefix('!') {
                Some(rest) => (true, rest.trim_start()),
                None => (false, line),
            };
            let (key, value) = body
                .split_once('=')
                .ok_or_else(|| parse_error(format!("no '=' in line '{}'", line)))?;
            let key = key.trim();

            let entry = group
                .entries
                .iter_mut()
                .find(|e| e.name == key)
                .ok_or_else(|| TurboflowError::UnknownNamelistKey {
                    group: template.name.clone(),
                    key: key.to_string(),
                })?;

            entry.value = NamelistValue::from_fortran(entry.kind, value).ok_or_else(|| {
                parse_error(format!("'{}' is not a valid {}", value.trim(), entry.kind))
            })?;
            entry.hidden = hidden;
        }

        Err(parse_error("missing closing '/'".to_string()))
    }

    fn check_kind(&self, name: &str, expected: ValueKind, value: &NamelistValue) -> Result<()> {
        if value.kind() != expected {
            return Err(TurboflowError::NamelistTypeMismatch {
                group: self.name.clone(),
                key: name.to_string(),
                expected: expected.to_string(),
                found: value.kind().to_string(),
            });
        }
        Ok(())
    }
}
