//! Sectioned key-value text documents.
//!
//! The format is line based:
//! - `[Name]` starts a section
//! - `Key=Value` adds an entry to the current section
//! - Lines starting with `;` or `#` are comments
//! - Blank lines are ignored
//!
//! Section names must be unique. Keys keep their insertion order.
//!
//! Values are written with `\\`, `\n` and `\r` escapes, and wrapped in
//! double quotes when they carry leading or trailing whitespace or start
//! with a quote. Reading reverses both.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use crate::scheme::SchemeError;

/// One `[Name]` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    name: String,
    entries: Vec<(String, String)>,
}

impl Section {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            entries: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    /// Set a key, replacing any earlier value.
    pub fn set(&mut self, key: &str, value: impl fmt::Display) {
        let value = value.to_string();
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key.to_string(), value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Value of a key that must be present.
    pub fn require(&self, key: &str) -> Result<&str, SchemeError> {
        self.get(key).ok_or_else(|| SchemeError::MissingKey {
            section: self.name.clone(),
            key: key.to_string(),
        })
    }

    /// Parse a key that must be present.
    pub fn parse<T: FromStr>(&self, key: &str) -> Result<T, SchemeError> {
        let raw = self.require(key)?;
        self.convert(key, raw)
    }

    /// Parse a key, falling back to `default` when it is absent.
    pub fn parse_or<T: FromStr>(&self, key: &str, default: T) -> Result<T, SchemeError> {
        match self.get(key) {
            Some(raw) => self.convert(key, raw),
            None => Ok(default),
        }
    }

    fn convert<T: FromStr>(&self, key: &str, raw: &str) -> Result<T, SchemeError> {
        raw.trim().parse().map_err(|_| SchemeError::InvalidValue {
            section: self.name.clone(),
            key: key.to_string(),
            value: raw.to_string(),
        })
    }
}

/// An ordered set of uniquely named sections.
#[derive(Debug, Clone, Default)]
pub struct Document {
    sections: Vec<Section>,
    index: HashMap<String, usize>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse document text.
    pub fn parse(text: &str) -> Result<Self, SchemeError> {
        let mut doc = Document::new();
        let mut current: Option<usize> = None;

        for (line_num, line) in text.lines().enumerate() {
            let trimmed = line.trim();

            // Skip empty lines and comments
            if trimmed.is_empty() || trimmed.starts_with(';') || trimmed.starts_with('#') {
                continue;
            }

            if let Some(header) = trimmed.strip_prefix('[') {
                let name = header.strip_suffix(']').ok_or_else(|| SchemeError::Syntax {
                    line: line_num + 1,
                    message: "unterminated section header".into(),
                })?;
                let name = name.trim();
                if doc.index.contains_key(name) {
                    return Err(SchemeError::Syntax {
                        line: line_num + 1,
                        message: format!("duplicate section [{}]", name),
                    });
                }
                doc.section_mut(name);
                current = doc.index.get(name).copied();
                continue;
            }

            let (key, value) = trimmed.split_once('=').ok_or_else(|| SchemeError::Syntax {
                line: line_num + 1,
                message: format!("expected Key=Value, found '{}'", trimmed),
            })?;
            let slot = current.ok_or_else(|| SchemeError::Syntax {
                line: line_num + 1,
                message: "entry outside of any section".into(),
            })?;
            doc.sections[slot].set(key.trim(), unescape(value.trim()));
        }

        Ok(doc)
    }

    pub fn section(&self, name: &str) -> Option<&Section> {
        self.index.get(name).map(|&slot| &self.sections[slot])
    }

    /// Section that must be present.
    pub fn require(&self, name: &str) -> Result<&Section, SchemeError> {
        self.section(name).ok_or_else(|| SchemeError::MissingSection(name.to_string()))
    }

    /// Get or append a section.
    pub fn section_mut(&mut self, name: &str) -> &mut Section {
        let slot = match self.index.get(name) {
            Some(&slot) => slot,
            None => {
                self.sections.push(Section::new(name));
                self.index.insert(name.to_string(), self.sections.len() - 1);
                self.sections.len() - 1
            }
        };
        &mut self.sections[slot]
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (n, section) in self.sections.iter().enumerate() {
            if n > 0 {
                writeln!(f)?;
            }
            writeln!(f, "[{}]", section.name)?;
            for (key, value) in &section.entries {
                writeln!(f, "{}={}", key, escape(value))?;
            }
        }
        Ok(())
    }
}

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    if out.trim() != out || out.starts_with('"') {
        format!("\"{}\"", out)
    } else {
        out
    }
}

fn unescape(text: &str) -> String {
    let inner = match text.strip_prefix('"').and_then(|t| t.strip_suffix('"')) {
        Some(inner) => inner,
        None => text,
    };
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
