//! Name templates for dependent records.
//!
//! A template mixes literal text with `{field}` placeholders. A placeholder
//! may list fallbacks, `{component_name|component_number|id}`: the first
//! truthy field wins, and if none is truthy the last one is rendered as is.

use std::fmt;

use crate::models::{is_truthy, render_value, Record};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field(Vec<String>),
}

/// A parsed name template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl NameTemplate {
    /// Parse a template. Errors describe the first malformed placeholder.
    pub fn parse(source: &str) -> Result<Self, String> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = source.chars();

        while let Some(c) = chars.next() {
            match c {
                '{' => {
                    let mut inner = String::new();
                    let mut closed = false;
                    for c in chars.by_ref() {
                        match c {
                            '}' => {
                                closed = true;
                                break;
                            }
                            '{' => return Err(format!("nested '{{' in template '{}'", source)),
                            c => inner.push(c),
                        }
                    }
                    if !closed {
                        return Err(format!("unclosed '{{' in template '{}'", source));
                    }

                    let fields: Vec<String> =
                        inner.split('|').map(|f| f.trim().to_string()).collect();
                    if fields.iter().any(|f| f.is_empty()) {
                        return Err(format!("empty placeholder in template '{}'", source));
                    }

                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Field(fields));
                }
                '}' => return Err(format!("unmatched '}}' in template '{}'", source)),
                c => literal.push(c),
            }
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    /// Render the template against a record.
    pub fn render(&self, record: &Record) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field(fields) => {
                    let chosen = fields
                        .iter()
                        .find(|f| is_truthy(record.get(f.as_str())))
                        .or_else(|| fields.last());
                    if let Some(field) = chosen {
                        out.push_str(&render_value(record.get(field.as_str())));
                    }
                }
            }
        }
        out
    }

    /// Fields referenced by the template, in order of appearance.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().flat_map(|s| match s {
            Segment::Field(fields) => fields.iter().map(String::as_str).collect::<Vec<_>>(),
            Segment::Literal(_) => Vec::new(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl fmt::Display for NameTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
