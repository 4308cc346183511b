//! `$name = "value"` variables
//!
//! There is a single table per compilation, shared by every included and imported file.
//! Assigning again overwrites, nothing is ever removed.
use once_cell::sync::Lazy;
use regex::Regex;

/// A variable reference: `$` followed by letters, as long as possible
static VARIABLE_REFERENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$[A-Za-z]+").expect("variable reference regex"));

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("Variable {0} was not previously initialized")]
pub struct UndeclaredVariable(pub String);

#[derive(Default, Debug)]
pub struct VariableTable {
    values: indexmap::IndexMap<String, String>,
}

impl VariableTable {
    /// Store a value, `name` includes the leading `$`
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        tracing::debug!(%name, %value, "set variable");
        self.values.insert(name, value);
    }

    pub fn get(&self, name: &str) -> Result<&str, UndeclaredVariable> {
        self.values
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| UndeclaredVariable(name.to_string()))
    }

    /// Whether the line references any variable at all
    pub fn has_references(line: &str) -> bool {
        VARIABLE_REFERENCE.is_match(line)
    }

    /// Replace every `$name` reference in `line` with its value
    ///
    /// References are matched greedily, so `$AB` never resolves as `$A` followed by `B`.
    /// Substituted values are inserted verbatim and not scanned again.
    pub fn substitute(&self, line: &str) -> Result<String, UndeclaredVariable> {
        let mut out = String::with_capacity(line.len());
        let mut last = 0;

        for reference in VARIABLE_REFERENCE.find_iter(line) {
            out.push_str(&line[last..reference.start()]);
            out.push_str(self.get(reference.as_str())?);
            last = reference.end();
        }

        out.push_str(&line[last..]);
        Ok(out)
    }
}
