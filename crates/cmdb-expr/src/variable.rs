//! Variable resolution
//!
//! `${name[:arg]*}` variables are evaluated against an optional [`Subject`].
//! The name and the arguments are expanded first, so variables compose
//! (`${property:${model:name}}`). The retargeting families (`view`, `model`,
//! `source`, `target`, `sum`, `sumx`) instead receive their sub-expression
//! untouched and evaluate it against another subject.

use chrono::Local;
use chrono::format::{Item, StrftimeItems};
use cmdb_model::{Property, Subject};
use regex::Regex;

use crate::scan;
use crate::{Error, Result};

/// A parsed `${...}` variable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    pub name: String,
    pub args: Vec<String>,
}

impl Variable {
    /// Parse text that is exactly one variable
    pub fn parse(text: &str) -> Result<Self> {
        if !text.starts_with("${") || !text.ends_with('}') {
            return Err(Error::format(
                text,
                "a variable must be enclosed between \"${\" and \"}\"",
            ));
        }
        if !scan::is_whole_variable(text) {
            scan::variable_spans(text)?;
            return Err(Error::format(text, "unbalanced braces"));
        }

        let inner = &text[2..text.len() - 1];
        let mut parts = scan::split_args(inner).into_iter();
        let name = parts.next().unwrap_or_default();
        if name.is_empty() {
            return Err(Error::format(text, "empty variable name"));
        }
        Ok(Self {
            name: name.to_string(),
            args: parts.map(str::to_string).collect(),
        })
    }

    /// Arguments joined back with the separator
    pub fn rest(&self) -> String {
        self.args.join(":")
    }
}

/// Substitute every top-level variable of `text`; null values become ""
pub fn expand(text: &str, subject: Option<Subject<'_>>) -> Result<String> {
    let spans = scan::variable_spans(text)?;
    if spans.is_empty() {
        return Ok(text.to_string());
    }

    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for span in spans {
        out.push_str(&text[last..span.start]);
        if let Some(value) = get_variable(&text[span.clone()], subject)? {
            out.push_str(&value);
        }
        last = span.end;
    }
    out.push_str(&text[last..]);
    Ok(out)
}

/// Evaluate one `${...}` variable
pub fn get_variable(text: &str, subject: Option<Subject<'_>>) -> Result<Option<String>> {
    tracing::trace!(variable = text, "Getting variable");
    let variable = Variable::parse(text)?;
    let name = expand(&variable.name, subject)?;

    let args = if takes_raw_expression(&name) {
        vec![variable.rest()]
    } else {
        variable
            .args
            .iter()
            .map(|arg| expand(arg, subject))
            .collect::<Result<Vec<_>>>()?
    };

    let value = resolve(&name, &args, subject)?;
    tracing::trace!(variable = text, ?value, "Variable resolved");
    Ok(value)
}

fn takes_raw_expression(name: &str) -> bool {
    ["view", "model", "source", "target", "sum", "sumx"]
        .iter()
        .any(|family| family.eq_ignore_ascii_case(name))
}

/// Dispatch an already expanded variable name to its family
pub fn resolve(name: &str, args: &[String], subject: Option<Subject<'_>>) -> Result<Option<String>> {
    let family = name.to_ascii_lowercase();
    let rest = args.join(":");

    match (family.as_str(), args.is_empty()) {
        ("void", true) => Ok(Some(String::new())),
        ("username", true) => Ok(username()),
        ("date", false) => Ok(format_now(&scan::unescape_separators(&rest))),
        ("class", true) => Ok(capability(subject, name, |s| s.class_name())),
        ("id", true) => Ok(capability(subject, name, |s| s.id())),
        ("name", true) => Ok(capability(subject, name, |s| s.name())),
        ("documentation", true) => Ok(capability(subject, name, |s| s.documentation())),
        ("purpose", true) => Ok(capability(subject, name, |s| s.purpose())),
        ("property", false) => {
            let key = scan::unescape_separators(&rest);
            Ok(capability(subject, name, |s| s.property(&key)))
        }
        ("properties", false) => Ok(joined_properties(subject, &rest, false)),
        ("sortedproperties", false) => Ok(joined_properties(subject, &rest, true)),
        ("view", false) => retarget(subject, name, &rest, |s| s.containing_view()),
        ("model", false) => retarget(subject, name, &rest, |s| Some(s.owning_model())),
        ("source", false) => retarget(subject, name, &rest, |s| s.source()),
        ("target", false) => retarget(subject, name, &rest, |s| s.target_end()),
        ("sum", false) => match subject {
            Some(s) => Ok(sum(&sub_variable(&rest), s)?.map(|total| total.to_string())),
            None => Ok(missing_subject(name)),
        },
        ("sumx", false) => match subject {
            Some(s) => Ok(sum_children(&sub_variable(&rest), s)?.map(|total| total.to_string())),
            None => Ok(missing_subject(name)),
        },
        _ => {
            tracing::error!(name, ?args, "Unknown variable");
            Ok(None)
        }
    }
}

fn missing_subject(name: &str) -> Option<String> {
    tracing::debug!(name, "Variable needs an object to evaluate against");
    None
}

fn capability<'a>(
    subject: Option<Subject<'a>>,
    name: &str,
    get: impl FnOnce(&Subject<'a>) -> Option<&'a str>,
) -> Option<String> {
    let Some(subject) = subject else {
        return missing_subject(name);
    };
    let value = get(&subject).map(str::to_string);
    if value.is_none() {
        tracing::debug!(name, class = ?subject.class_name(), "Object has no such value");
    }
    value
}

/// Wrap a bare sub-expression such as `property:cost` into a variable
fn sub_variable(expression: &str) -> String {
    if scan::is_whole_variable(expression) {
        expression.to_string()
    } else {
        format!("${{{expression}}}")
    }
}

fn retarget<'a>(
    subject: Option<Subject<'a>>,
    name: &str,
    expression: &str,
    hop: impl FnOnce(&Subject<'a>) -> Option<Subject<'a>>,
) -> Result<Option<String>> {
    let Some(subject) = subject else {
        return Ok(missing_subject(name));
    };
    match hop(&subject) {
        Some(other) => get_variable(&sub_variable(expression), Some(other)),
        None => {
            tracing::debug!(name, class = ?subject.class_name(), "Object has no such related object");
            Ok(None)
        }
    }
}

fn numeric(value: Option<String>) -> i64 {
    value
        .and_then(|v| v.trim().parse::<i64>().ok())
        .unwrap_or(0)
}

/// Value of `variable` on `subject` plus the sums of all its descendants.
/// `None` once the total leaves the `i64` range.
fn sum(variable: &str, subject: Subject<'_>) -> Result<Option<i64>> {
    let own = numeric(get_variable(variable, Some(subject))?);
    add_children(own, variable, subject)
}

fn sum_children(variable: &str, subject: Subject<'_>) -> Result<Option<i64>> {
    add_children(0, variable, subject)
}

fn add_children(start: i64, variable: &str, subject: Subject<'_>) -> Result<Option<i64>> {
    let mut total = start;
    for child in subject.children().unwrap_or_default() {
        let Some(child_sum) = sum(variable, child)? else {
            return Ok(None);
        };
        let Some(next) = total.checked_add(child_sum) else {
            tracing::warn!(variable, "Sum overflows a 64-bit integer");
            return Ok(None);
        };
        total = next;
    }
    Ok(Some(total))
}

fn username() -> Option<String> {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .ok()
}

fn format_now(format: &str) -> Option<String> {
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        tracing::warn!(date_format = format, "Invalid date format");
        return None;
    }
    Some(Local::now().format(format).to_string())
}

/// `separator:regex`, where the separator may use `\n`, `\t` and `\:`
fn joined_properties(subject: Option<Subject<'_>>, spec: &str, sorted: bool) -> Option<String> {
    let Some(subject) = subject else {
        return missing_subject("properties");
    };
    let Some(split) = scan::first_separator(spec) else {
        tracing::warn!(spec, "Expected \"separator:regex\"");
        return None;
    };
    let separator = spec[..split]
        .replace("\\n", "\n")
        .replace("\\t", "\t")
        .replace("\\:", ":");
    let pattern = &spec[split + 1..];
    let regex = match Regex::new(&format!("^(?:{pattern})$")) {
        Ok(regex) => regex,
        Err(e) => {
            tracing::warn!(pattern, error = %e, "Invalid property regex");
            return None;
        }
    };

    let mut properties: Vec<&Property> = subject.properties()?.iter().collect();
    if sorted {
        properties.sort_by(|a, b| a.key.cmp(&b.key));
    }
    let values: Vec<&str> = properties
        .into_iter()
        .filter(|p| regex.is_match(&p.key))
        .map(|p| p.value.as_str())
        .collect();
    Some(values.join(&separator))
}
