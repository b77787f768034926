//! Literal placeholder substitution for command patterns.

use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

use crate::error::{ModgateError, Result};

pub const TARGET: &str = "target";
pub const REASON: &str = "reason";
pub const DURATION: &str = "duration";

fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{([a-z_]+)\}").expect("placeholder pattern is valid"))
}

/// Values substituted into a pattern, keyed by placeholder name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderParams {
    values: BTreeMap<String, String>,
}

impl RenderParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: &str, value: impl Into<String>) -> Self {
        self.values.insert(key.to_string(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

/// Placeholder names referenced by `pattern`, in order of appearance.
pub fn placeholders(pattern: &str) -> Vec<&str> {
    placeholder_re()
        .captures_iter(pattern)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect()
}

/// Substitute every `{name}` in `pattern` with its value from `params`.
///
/// Substituted values are not rescanned, so a reason that contains
/// `{target}` is emitted as typed. Unused params are ignored.
pub fn render(pattern: &str, params: &RenderParams) -> Result<String> {
    let re = placeholder_re();
    let mut out = String::with_capacity(pattern.len() + 32);
    let mut last = 0;

    for caps in re.captures_iter(pattern) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let value = params
            .get(name.as_str())
            .ok_or_else(|| ModgateError::TemplateRender {
                key: name.as_str().to_string(),
            })?;
        out.push_str(&pattern[last..whole.start()]);
        out.push_str(value);
        last = whole.end();
    }
    out.push_str(&pattern[last..]);
    Ok(out)
}
