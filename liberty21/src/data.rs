//!
//! # Liberty Attribute-Tree Data Model
//!

// Std-Lib Imports
use std::path::Path;

// Crates.io Imports
use serde::{Deserialize, Serialize};

/// # Liberty Source Tree
///
/// Ordered collection of top-level groups, as parsed from one Liberty source.
/// A well-formed source holds a single `library` group, but the tree itself
/// imposes no such schema; consumers decide what the group types mean.
#[derive(Default, Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct LibertyTree {
    /// Top-Level Groups
    pub groups: Vec<LibertyGroup>,
}
impl LibertyTree {
    /// Create a new and initially empty [LibertyTree].
    /// Also available via [Default].
    pub fn new() -> LibertyTree {
        LibertyTree::default()
    }
    /// Open a [LibertyTree] from Liberty-format file `fname`
    pub fn open(fname: impl AsRef<Path>) -> LibertyResult<LibertyTree> {
        super::read::parse_file(fname)
    }
    /// Write a [LibertyTree] to Liberty-format file `fname`
    pub fn save(&self, fname: impl AsRef<Path>) -> LibertyResult<()> {
        super::write::save(self, fname)
    }
    /// Write a [LibertyTree] to a Liberty-format [String]
    pub fn to_string(&self) -> LibertyResult<String> {
        super::write::to_string(self)
    }
}

/// # Liberty Group
///
/// The tree's sole structural construct: a type tag (e.g. `library`, `cell`,
/// `pin`, `timing`), zero or more names, and ordered attribute and sub-group
/// collections. Source order is preserved through parse and re-write.
#[derive(Default, Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct LibertyGroup {
    /// Group-Type Tag
    pub group_type: String,
    /// Group Names (the parenthesized list, often a single entry)
    pub names: Vec<String>,
    /// Attributes, in source order
    pub attrs: Vec<LibertyAttr>,
    /// Child Groups, in source order
    pub groups: Vec<LibertyGroup>,
}
impl LibertyGroup {
    /// Create a new and otherwise empty [LibertyGroup] with type-tag `tp`
    pub fn new(tp: impl Into<String>) -> LibertyGroup {
        LibertyGroup {
            group_type: tp.into(),
            ..Default::default()
        }
    }
    /// Get the group's primary (first) name, if any
    pub fn name(&self) -> Option<&str> {
        self.names.first().map(|s| s.as_str())
    }
    /// Iterate over child groups with type-tag `tp`
    pub fn sub_groups<'s>(&'s self, tp: &'s str) -> impl Iterator<Item = &'s LibertyGroup> {
        self.groups.iter().filter(move |g| g.group_type == tp)
    }
    /// Mutably iterate over child groups with type-tag `tp`
    pub fn sub_groups_mut<'s>(
        &'s mut self,
        tp: &'s str,
    ) -> impl Iterator<Item = &'s mut LibertyGroup> {
        self.groups.iter_mut().filter(move |g| g.group_type == tp)
    }
    /// Find the attribute named `name`, if any
    pub fn find_attr(&self, name: &str) -> Option<&LibertyAttr> {
        self.attrs.iter().find(|a| a.name() == name)
    }
    /// Find the attribute named `name`, mutably
    pub fn find_attr_mut(&mut self, name: &str) -> Option<&mut LibertyAttr> {
        self.attrs.iter_mut().find(|a| a.name() == name)
    }
    /// Get the value of simple attribute `name`.
    /// Returns `None` for absent attributes and for complex attributes.
    pub fn simple_value(&self, name: &str) -> Option<&LibertyValue> {
        match self.find_attr(name) {
            Some(LibertyAttr::Simple { value, .. }) => Some(value),
            _ => None,
        }
    }
    /// Get the string content of simple attribute `name`, if it holds one
    pub fn simple_str(&self, name: &str) -> Option<&str> {
        self.simple_value(name).and_then(|v| v.as_str())
    }
    /// Get the value sequence of complex attribute `name`.
    /// Returns `None` for absent attributes and for simple attributes.
    pub fn complex_values(&self, name: &str) -> Option<&[LibertyValue]> {
        match self.find_attr(name) {
            Some(LibertyAttr::Complex { values, .. }) => Some(values),
            _ => None,
        }
    }
    /// Create a new attribute named `name` of kind `kind`.
    /// Errors if the group already holds an attribute of the same name.
    pub fn create_attr(
        &mut self,
        name: impl Into<String>,
        kind: LibertyAttrKind,
    ) -> LibertyResult<&mut LibertyAttr> {
        let name = name.into();
        if self.find_attr(&name).is_some() {
            return Err(LibertyError::AttrExists { name });
        }
        let attr = match kind {
            LibertyAttrKind::Simple => LibertyAttr::Simple {
                name,
                value: LibertyValue::String(String::new()),
            },
            LibertyAttrKind::Complex => LibertyAttr::Complex {
                name,
                values: Vec::new(),
            },
        };
        self.attrs.push(attr);
        Ok(self.attrs.last_mut().unwrap())
    }
    /// Delete the attribute named `name`.
    /// Returns whether an attribute was removed.
    pub fn delete_attr(&mut self, name: &str) -> bool {
        let before = self.attrs.len();
        self.attrs.retain(|a| a.name() != name);
        self.attrs.len() != before
    }
    /// Set simple attribute `name` to `value`, creating the attribute if it
    /// does not exist and overwriting it (of either kind) if it does.
    pub fn set_simple(&mut self, name: impl Into<String>, value: impl Into<LibertyValue>) {
        let name = name.into();
        let value = value.into();
        match self.find_attr_mut(&name) {
            Some(attr) => *attr = LibertyAttr::Simple { name, value },
            None => self.attrs.push(LibertyAttr::Simple { name, value }),
        }
    }
}

/// # Liberty Attribute Kinds
/// Tag used when creating attributes through [LibertyGroup::create_attr]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LibertyAttrKind {
    Simple,
    Complex,
}

/// # Liberty Attribute
///
/// Either a *simple* single-valued attribute (`name : value ;`)
/// or a *complex* multi-valued one (`name (v1, v2, ...) ;`).
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub enum LibertyAttr {
    Simple { name: String, value: LibertyValue },
    Complex { name: String, values: Vec<LibertyValue> },
}
impl LibertyAttr {
    /// Get the attribute's name
    pub fn name(&self) -> &str {
        match self {
            Self::Simple { name, .. } => name,
            Self::Complex { name, .. } => name,
        }
    }
    /// Append `value` to a complex attribute's value sequence.
    /// Errors on simple attributes.
    pub fn push_value(&mut self, value: impl Into<LibertyValue>) -> LibertyResult<()> {
        match self {
            Self::Complex { values, .. } => {
                values.push(value.into());
                Ok(())
            }
            Self::Simple { name, .. } => Err(LibertyError::AttrKind { name: name.clone() }),
        }
    }
}

/// # Liberty Attribute Value
///
/// Scalar values as they appear in source: numbers are kept as [f64] or [i64]
/// by token shape, everything else (identifiers, quoted strings, expressions)
/// as strings. Quoting is a write-time concern, not stored here.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub enum LibertyValue {
    Float(f64),
    Int(i64),
    String(String),
}
impl LibertyValue {
    /// Coerce to [f64]: numeric values directly, strings via parse
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Int(v) => Some(*v as f64),
            Self::String(s) => s.trim().parse().ok(),
        }
    }
    /// Coerce to [i64]: numeric values (floats truncate), strings via parse
    pub fn to_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            Self::Float(v) => Some(*v as i64),
            Self::String(s) => s.trim().parse().ok(),
        }
    }
    /// Get the string content, if `self` holds one
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}
impl From<f64> for LibertyValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}
impl From<i64> for LibertyValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}
impl From<String> for LibertyValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}
impl From<&str> for LibertyValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

use super::read::{LibertyParseErrorType, ParserState};

/// # Liberty Error Enumeration
#[derive(Debug)]
pub enum LibertyError {
    /// Lexer Errors
    Lex {
        next_char: Option<char>,
        line: usize,
        pos: usize,
    },
    /// Parser Errors
    Parse {
        msg: Option<String>,
        tp: LibertyParseErrorType,
        state: ParserState,
    },
    /// Attribute-creation collision
    AttrExists { name: String },
    /// Wrong-kind attribute operation, e.g. appending to a simple attribute
    AttrKind { name: String },
    /// Wrapped errors, generally from other crates
    Boxed(Box<dyn std::error::Error>),
    /// String message-valued errors
    Str(String),
}
impl From<std::io::Error> for LibertyError {
    fn from(e: std::io::Error) -> Self {
        Self::Boxed(Box::new(e))
    }
}
impl From<charlib21utils::Error> for LibertyError {
    fn from(e: charlib21utils::Error) -> Self {
        Self::Boxed(Box::new(e))
    }
}
impl From<String> for LibertyError {
    /// Convert string-based errors by wrapping them
    fn from(e: String) -> Self {
        Self::Str(e)
    }
}
impl From<&str> for LibertyError {
    /// Convert string-based errors by wrapping them
    fn from(e: &str) -> Self {
        Self::Str(e.into())
    }
}
impl std::fmt::Display for LibertyError {
    /// Delegates to the [Debug] implementation
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        std::fmt::Debug::fmt(self, f)
    }
}
impl std::error::Error for LibertyError {}

/// Liberty21 Library-Wide Result Type
pub type LibertyResult<T> = Result<T, LibertyError>;

// Implement the serialization to/from file trait for trees and groups
impl charlib21utils::SerdeFile for LibertyTree {}
impl charlib21utils::SerdeFile for LibertyGroup {}
