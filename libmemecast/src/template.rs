//! Title and description templates
//!
//! A template is either a fixed string or a list of candidate strings, one
//! of which is chosen uniformly at random per submission. The chosen text
//! then goes through `{placeholder}` substitution against the account's
//! profile variables. Substitution follows Python's `str.format` rules for
//! braces: `{{` and `}}` are literal, anything else inside braces is a
//! variable name that must be defined.

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::TemplateError;

/// A fixed string or an ordered set of candidates
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Template {
    One(String),
    Many(Vec<String>),
}

impl Template {
    /// Pick the template text for this invocation
    ///
    /// A single string is used verbatim; a list yields a uniformly random
    /// member. Selection is independent per call, with no history.
    pub fn choose(&self) -> Result<&str, TemplateError> {
        match self {
            Template::One(s) => Ok(s),
            Template::Many(candidates) => candidates
                .choose(&mut rand::thread_rng())
                .map(String::as_str)
                .ok_or(TemplateError::NoCandidates),
        }
    }
}

/// Substitute `{name}` placeholders from the given variable map
///
/// # Errors
///
/// Returns `TemplateError::UndefinedPlaceholder` if the template references
/// a variable that is not in the map, and `TemplateError::UnbalancedBrace`
/// for stray `{` or `}` characters.
pub fn render(template: &str, vars: &HashMap<String, String>) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' => {
                if chars.peek() == Some(&'{') {
                    chars.next();
                    out.push('{');
                    continue;
                }
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(c) => name.push(c),
                        None => return Err(TemplateError::UnbalancedBrace(template.to_string())),
                    }
                }
                match vars.get(&name) {
                    Some(value) => out.push_str(value),
                    None => return Err(TemplateError::UndefinedPlaceholder(name)),
                }
            }
            '}' => {
                if chars.peek() == Some(&'}') {
                    chars.next();
                    out.push('}');
                } else {
                    return Err(TemplateError::UnbalancedBrace(template.to_string()));
                }
            }
            c => out.push(c),
        }
    }

    Ok(out)
}
