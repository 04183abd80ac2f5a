//! Placeholder expansion for authored commands
//!
//! Recipe commands are templated with `{{name}}` placeholders (project name,
//! server user, remote paths) that are resolved from the configuration right
//! before tokenization. Unknown placeholders are left intact so a typo shows
//! up verbatim in the failing command instead of vanishing silently.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}").unwrap());

/// Named values substituted into recipe commands
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vars {
    values: HashMap<String, String>,
}

impl Vars {
    /// Creates an empty variable set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a variable
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    /// Sets a variable, builder style
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    /// Looks up a variable
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&String> {
        self.values.get(name)
    }
}

/// Expands `{{name}}` placeholders in an authored command string
///
/// Placeholders without a matching variable are kept unchanged.
#[must_use]
pub fn expand(input: &str, vars: &Vars) -> String {
    PLACEHOLDER
        .replace_all(input, |caps: &regex::Captures| {
            let name = caps.get(1).map(|m| m.as_str()).unwrap_or("");
            match vars.get(name) {
                Some(value) => value.clone(),
                None => caps
                    .get(0)
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_default(),
            }
        })
        .to_string()
}
