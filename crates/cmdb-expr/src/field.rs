//! Field and path expressions
//!
//! A mapping value is a quoted constant (`"Node"`), a variable
//! (`${property:owner}`) or a field path (`location#name`) read from the
//! remote record, each `#` following a reference link. Path expressions join
//! several of these with `/` to describe a folder chain.

use std::fmt;

use crate::scan;

/// A classified mapping value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldExpression {
    /// Literal text, quotes removed
    Constant(String),
    /// A whole `${...}` variable
    Variable(String),
    /// Field names to walk through the record, one per `#`-separated hop
    FieldPath(Vec<String>),
}

impl FieldExpression {
    pub fn parse(expr: &str) -> Self {
        if expr.is_empty() {
            return FieldExpression::Constant(String::new());
        }
        if expr.len() >= 2 && expr.starts_with('"') && expr.ends_with('"') {
            return FieldExpression::Constant(expr[1..expr.len() - 1].to_string());
        }
        if scan::is_whole_variable(expr) {
            return FieldExpression::Variable(expr.to_string());
        }
        FieldExpression::FieldPath(
            expr.split('#')
                .filter(|hop| !hop.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    /// The remote field that must be requested to evaluate this expression.
    ///
    /// Only the first hop is known before any record has been fetched.
    pub fn static_field_name(&self) -> Option<&str> {
        match self {
            FieldExpression::FieldPath(hops) => hops.first().map(String::as_str),
            FieldExpression::Constant(_) | FieldExpression::Variable(_) => None,
        }
    }
}

impl fmt::Display for FieldExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldExpression::Constant(text) => write!(f, "\"{text}\""),
            FieldExpression::Variable(text) => f.write_str(text),
            FieldExpression::FieldPath(hops) => f.write_str(&hops.join("#")),
        }
    }
}

/// One `/`-separated component of a path expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSegment {
    /// The segment was written with a leading `/`, kept in the output
    pub rooted: bool,
    pub expr: FieldExpression,
}

/// Split a path expression on its unescaped `/` separators.
///
/// Slashes inside quotes or inside a variable never separate, and `\/`
/// outside quotes stands for a literal slash.
pub fn split_path(path: &str) -> Vec<PathSegment> {
    let mut segments = Vec::new();
    let mut chars = path.chars().peekable();

    while chars.peek().is_some() {
        let rooted = chars.next_if_eq(&'/').is_some();
        let mut text = String::new();
        let mut in_quotes = false;
        let mut depth = 0usize;

        while let Some(c) = chars.next() {
            match c {
                '\\' => match chars.next() {
                    Some('/') if !in_quotes => text.push('/'),
                    Some(next) => {
                        text.push('\\');
                        text.push(next);
                    }
                    None => text.push('\\'),
                },
                '"' if depth == 0 => {
                    in_quotes = !in_quotes;
                    text.push(c);
                }
                '{' if !in_quotes => {
                    depth += 1;
                    text.push(c);
                }
                '}' if !in_quotes => {
                    depth = depth.saturating_sub(1);
                    text.push(c);
                }
                '/' if !in_quotes && depth == 0 => break,
                _ => text.push(c),
            }
        }

        if !text.is_empty() {
            segments.push(PathSegment {
                rooted,
                expr: FieldExpression::parse(&text),
            });
        }
    }
    segments
}

/// Remote field names needed to evaluate a mapping value or path
pub fn static_field_names(expr: &str) -> Vec<String> {
    split_path(expr)
        .iter()
        .filter_map(|segment| segment.expr.static_field_name())
        .map(str::to_string)
        .collect()
}
