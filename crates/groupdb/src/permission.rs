//! permission tokens and override resolution
//!
//! A token is an action prefix followed by a permission name:
//! - `+name` grants
//! - `-name` marks the permission as revoked
//! - `!name` negates it for good ("sticky")
//!
//! [resolve] is the only place where a group's token list is changed. It guarantees
//! that for each permission name at most one of the three tokens is present.
use serde::Serializer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Grant,
    Revoke,
    Negate,
}

impl Action {
    pub fn from_prefix(prefix: char) -> Option<Self> {
        match prefix {
            '+' => Some(Action::Grant),
            '-' => Some(Action::Revoke),
            '!' => Some(Action::Negate),
            _ => None,
        }
    }

    pub fn prefix(self) -> char {
        match self {
            Action::Grant => '+',
            Action::Revoke => '-',
            Action::Negate => '!',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Permission {
    pub action: Action,
    pub name: String,
}

impl Permission {
    pub fn new(action: Action, name: impl Into<String>) -> Self {
        Self {
            action,
            name: name.into(),
        }
    }

    /// Parse a toggle like `+talk`
    ///
    /// Returns `None` when the first character is not an action prefix.
    /// The name is taken verbatim and may be empty.
    pub fn parse(token: &str) -> Option<Self> {
        let mut chars = token.chars();
        let action = Action::from_prefix(chars.next()?)?;
        Some(Self::new(action, chars.as_str()))
    }

    /// Same permission name, different action
    fn with_action(&self, action: Action) -> Self {
        Self::new(action, self.name.clone())
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.action.prefix(), self.name)
    }
}

impl serde::ser::Serialize for Permission {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

/// Apply an incoming toggle to a group's token list
///
/// - `+x` drops a pending `-x`
/// - `-x` drops a pending `+x`
/// - `!x` drops both
///
/// Afterwards the token is appended unless it is already present or `!x` is.
/// Once negated, a permission ignores every later grant or revoke.
///
/// Returns `true` when the token was appended.
#[tracing::instrument(level = "trace", skip_all, fields(token = %incoming))]
pub fn resolve(tokens: &mut Vec<Permission>, incoming: Permission) -> bool {
    let add = incoming.with_action(Action::Grant);
    let remove = incoming.with_action(Action::Revoke);
    let negate = incoming.with_action(Action::Negate);

    match incoming.action {
        Action::Grant => tokens.retain(|token| token != &remove),
        Action::Revoke => tokens.retain(|token| token != &add),
        Action::Negate => tokens.retain(|token| token != &remove && token != &add),
    }

    if tokens.contains(&negate) || tokens.contains(&incoming) {
        tracing::trace!("dropped");
        return false;
    }

    tokens.push(incoming);
    true
}
