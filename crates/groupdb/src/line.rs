//! Line classification
//!
//! Every physical line is exactly one [Line]. Checks happen in this order:
//! 1. blank
//! 2. comment (`# ...`)
//! 3. variable assignment (`$name = "value"`), taken verbatim
//! 4. trailing comments (` # ...`) are cut off, then variables are substituted
//! 5. group declaration (`GROUP_NAME`, `PREFIX$V`)
//! 6. permission toggle (`+perm`, `-perm`, `!perm`)
//! 7. directive (`@name arg ...`)
//!
//! Anything else is [Line::Inert].
use crate::permission::Permission;
use crate::variables::{UndeclaredVariable, VariableTable};
use once_cell::sync::Lazy;
use regex::Regex;

static COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*#").expect("comment regex"));

static TRAILING_COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+#.*$").expect("trailing comment regex"));

static ASSIGNMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^\s*(\$[A-Za-z]+)\s*=\s*"(.*)"\s*(?:#.*)?$"#).expect("assignment regex")
});

/// Starts with a group name character and has no whitespace, the whole line is the name
///
/// `-` may not come first: an upper case `-NAME` is read as a revoke, not a group.
static GROUP_DECLARATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z0-9_.]\S*$").expect("group declaration regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    Blank,
    Comment,
    Assignment { name: String, value: String },
    Group(String),
    Toggle(Permission),
    Directive { name: String, args: Vec<String> },
    Inert,
}

impl Line {
    pub fn classify(raw: &str, variables: &VariableTable) -> Result<Self, UndeclaredVariable> {
        if raw.trim().is_empty() {
            return Ok(Line::Blank);
        }

        if COMMENT.is_match(raw) {
            return Ok(Line::Comment);
        }

        if let Some(captures) = ASSIGNMENT.captures(raw) {
            return Ok(Line::Assignment {
                name: captures[1].to_string(),
                value: captures[2].to_string(),
            });
        }

        let stripped = TRAILING_COMMENT.replace(raw, "");
        let raw = stripped.as_ref();

        let substituted;
        let line = if VariableTable::has_references(raw) {
            substituted = variables.substitute(raw)?;
            substituted.as_str()
        } else {
            raw
        };

        let declaration = line.trim_end();
        if GROUP_DECLARATION.is_match(declaration) {
            return Ok(Line::Group(declaration.to_string()));
        }

        let line = line.trim();

        if let Some(permission) = Permission::parse(line) {
            return Ok(Line::Toggle(permission));
        }

        if let Some(directive) = line.strip_prefix('@') {
            let mut tokens = directive.split(' ');
            let name = tokens.next().unwrap_or_default().to_string();
            let args = tokens.map(ToString::to_string).collect();
            return Ok(Line::Directive { name, args });
        }

        Ok(Line::Inert)
    }
}
