//!
//! # Liberty Writing Module
//!

// Standard Lib Imports
use std::io::Write;
use std::ops::{AddAssign, SubAssign};
use std::path::Path;

// Local imports
use super::data::*;

/// Write a [LibertyTree] to file `fname`.
pub fn save(tree: &LibertyTree, fname: impl AsRef<Path>) -> LibertyResult<()> {
    let f = std::fs::File::create(fname)?;
    LibertyWriter::new(f).write_tree(tree)
}
/// Write a [LibertyTree] to a Liberty-format [String].
pub fn to_string(tree: &LibertyTree) -> LibertyResult<String> {
    let mut buf = Vec::new();
    LibertyWriter::new(&mut buf).write_tree(tree)?;
    let rv = std::str::from_utf8(buf.as_slice()).unwrap().to_string();
    Ok(rv)
}

/// # Liberty Writing Helper
///
/// Formatting is deterministic: floats use Rust's shortest round-trip
/// [std::fmt::Display] form, strings are quoted unless they are plain
/// identifiers, and multi-valued complex attributes are written one value
/// per continuation line, the native layout of multi-row `values` tables.
pub struct LibertyWriter<'wr> {
    /// Write Destination
    dest: Box<dyn Write + 'wr>,
    /// Indentation Helper
    indent: Indent,
}
impl<'wr> LibertyWriter<'wr> {
    /// Create a new [LibertyWriter] to destination `dest`.
    /// Destination is boxed internally.
    fn new(dest: impl Write + 'wr) -> Self {
        Self {
            dest: Box::new(dest),
            indent: Indent::new("  "),
        }
    }
    /// Write a [LibertyTree] to the destination
    fn write_tree(&mut self, tree: &LibertyTree) -> LibertyResult<()> {
        for group in tree.groups.iter() {
            self.write_group(group)?;
        }
        self.dest.flush()?;
        Ok(())
    }
    /// Write a [LibertyGroup], attributes before sub-groups, in stored order
    fn write_group(&mut self, group: &LibertyGroup) -> LibertyResult<()> {
        let names = group.names.join(", ");
        self.write_line(format_args!("{} ({}) {{", group.group_type, names))?;
        self.indent += 1;
        for attr in group.attrs.iter() {
            self.write_attr(attr)?;
        }
        for sub in group.groups.iter() {
            self.write_group(sub)?;
        }
        self.indent -= 1;
        self.write_line(format_args!("}}"))?;
        Ok(())
    }
    /// Write a [LibertyAttr] definition
    fn write_attr(&mut self, attr: &LibertyAttr) -> LibertyResult<()> {
        match attr {
            LibertyAttr::Simple { name, value } => {
                self.write_line(format_args!("{} : {};", name, format_value(value)))?;
            }
            LibertyAttr::Complex { name, values } => {
                if values.len() <= 1 {
                    let inner = match values.first() {
                        Some(v) => format_value(v),
                        None => String::new(),
                    };
                    self.write_line(format_args!("{} ({});", name, inner))?;
                } else {
                    // Multi-valued: one value per continuation line
                    self.write_line(format_args!("{} ( \\", name))?;
                    self.indent += 1;
                    for (i, value) in values.iter().enumerate() {
                        let sep = if i + 1 < values.len() { "," } else { "" };
                        self.write_line(format_args!("{}{} \\", format_value(value), sep))?;
                    }
                    self.indent -= 1;
                    self.write_line(format_args!(");"))?;
                }
            }
        }
        Ok(())
    }
    /// Helper function writing a single line at the current indentation level.
    fn write_line(&mut self, args: std::fmt::Arguments) -> std::io::Result<()> {
        writeln!(self.dest, "{}{}", self.indent.state, args)
    }
}

/// Format a single [LibertyValue] for writing
fn format_value(value: &LibertyValue) -> String {
    match value {
        LibertyValue::Float(v) => v.to_string(),
        LibertyValue::Int(v) => v.to_string(),
        LibertyValue::String(s) => {
            if is_ident(s) {
                s.clone()
            } else {
                format!("\"{}\"", s)
            }
        }
    }
}
/// Boolean indication of whether `s` can be written unquoted
fn is_ident(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => (),
        _ => return false,
    }
    s.chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '_' | '[' | ']' | '.'))
}

/// Indentation Helper
struct Indent {
    unit: String,
    level: usize,
    state: String,
}
impl Indent {
    /// Create a new [Indent], initially at level 0
    fn new(unit: impl Into<String>) -> Self {
        Self {
            unit: unit.into(),
            level: 0,
            state: String::new(),
        }
    }
}
impl AddAssign<usize> for Indent {
    fn add_assign(&mut self, rhs: usize) {
        self.level += rhs;
        self.state = self.unit.repeat(self.level);
    }
}
impl SubAssign<usize> for Indent {
    fn sub_assign(&mut self, rhs: usize) {
        if rhs > self.level {
            panic!("Indentation cannot go below 0");
        }
        self.level -= rhs;
        self.state = self.unit.repeat(self.level);
    }
}
