//! Known groups and their permissions
//!
//! Groups live in one of two namespaces:
//! - [Namespace::Groups] are authoritative and end up in the output
//! - [Namespace::Imports] are only visible to `@extend`
//!
//! The namespace of a name is fixed by its first declaration and never changes.
use crate::permission::{self, Permission};
use serde::{ser::SerializeMap, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    Groups,
    Imports,
}

impl std::fmt::Display for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Namespace::Groups => f.write_str("groups"),
            Namespace::Imports => f.write_str("imports"),
        }
    }
}

pub type Group = Vec<Permission>;

#[derive(Default, Debug)]
pub struct GroupRegistry {
    groups: indexmap::IndexMap<String, Group>,
    imports: indexmap::IndexMap<String, Group>,
}

impl GroupRegistry {
    fn namespace(&self, namespace: Namespace) -> &indexmap::IndexMap<String, Group> {
        match namespace {
            Namespace::Groups => &self.groups,
            Namespace::Imports => &self.imports,
        }
    }

    fn namespace_mut(&mut self, namespace: Namespace) -> &mut indexmap::IndexMap<String, Group> {
        match namespace {
            Namespace::Groups => &mut self.groups,
            Namespace::Imports => &mut self.imports,
        }
    }

    /// Namespace a group was first declared in
    pub fn namespace_of(&self, name: &str) -> Option<Namespace> {
        if self.groups.contains_key(name) {
            Some(Namespace::Groups)
        } else if self.imports.contains_key(name) {
            Some(Namespace::Imports)
        } else {
            None
        }
    }

    /// Declare a group (if unknown) and return its name
    ///
    /// A name that already exists in either namespace is left untouched.
    pub fn declare(&mut self, name: &str, namespace: Namespace) -> String {
        match self.namespace_of(name) {
            None => {
                tracing::debug!(group = name, %namespace, "declare group");
                self.namespace_mut(namespace)
                    .insert(name.to_string(), Group::new());
            }
            Some(existing) if existing != namespace => {
                tracing::debug!(group = name, %existing, requested = %namespace, "group namespace already fixed");
            }
            Some(_) => {}
        }

        name.to_string()
    }

    /// Resolve a toggle against a group in the given namespace
    ///
    /// Returns `None` when the group does not exist in that namespace,
    /// otherwise whether the token was recorded.
    pub fn mutate(&mut self, name: &str, token: Permission, namespace: Namespace) -> Option<bool> {
        let group = self.namespace_mut(namespace).get_mut(name)?;
        Some(permission::resolve(group, token))
    }

    pub fn get(&self, name: &str, namespace: Namespace) -> Option<&Group> {
        self.namespace(namespace).get(name)
    }

    /// Look a group up in [Namespace::Groups] first, then [Namespace::Imports]
    pub fn lookup(&self, name: &str) -> Option<&Group> {
        self.groups.get(name).or_else(|| self.imports.get(name))
    }

    /// Authoritative groups in declaration order
    pub fn groups(&self) -> impl Iterator<Item = (&str, &Group)> {
        self.groups.iter().map(|(name, group)| (name.as_str(), group))
    }

    /// Import-only groups in declaration order
    pub fn imports(&self) -> impl Iterator<Item = (&str, &Group)> {
        self.imports.iter().map(|(name, group)| (name.as_str(), group))
    }
}

/// Serializes the authoritative groups as `name => [token, ...]`, imports are omitted
impl serde::ser::Serialize for GroupRegistry {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut ser = serializer.serialize_map(Some(self.groups.len()))?;
        for (name, group) in &self.groups {
            ser.serialize_entry(name, group)?;
        }
        ser.end()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn p(token: &str) -> Permission {
        Permission::parse(token).unwrap()
    }

    #[test]
    fn declare_is_idempotent() {
        let mut registry = GroupRegistry::default();
        assert_eq!(registry.declare("ADMIN", Namespace::Groups), "ADMIN");
        registry.mutate("ADMIN", p("+kick"), Namespace::Groups);
        registry.declare("ADMIN", Namespace::Groups);

        assert_eq!(registry.get("ADMIN", Namespace::Groups), Some(&vec![p("+kick")]));
    }

    #[test]
    fn first_declaration_fixes_namespace() {
        let mut registry = GroupRegistry::default();
        registry.declare("BASE", Namespace::Imports);
        registry.declare("BASE", Namespace::Groups);

        assert_eq!(registry.namespace_of("BASE"), Some(Namespace::Imports));
        assert_eq!(registry.groups().count(), 0);
        assert_eq!(registry.mutate("BASE", p("+x"), Namespace::Groups), None);
        assert_eq!(registry.get("BASE", Namespace::Imports), Some(&vec![]));
    }

    #[test]
    fn mutate_unknown_group() {
        let mut registry = GroupRegistry::default();
        assert_eq!(registry.mutate("NOPE", p("+x"), Namespace::Groups), None);
        assert_eq!(registry.mutate("", p("+x"), Namespace::Imports), None);
    }

    #[test]
    fn lookup_prefers_groups() {
        let mut registry = GroupRegistry::default();
        registry.declare("A", Namespace::Imports);
        registry.mutate("A", p("+x"), Namespace::Imports);

        assert_eq!(registry.lookup("A"), Some(&vec![p("+x")]));
        assert_eq!(registry.lookup("B"), None);
    }

    #[test]
    fn serialize_skips_imports() {
        let mut registry = GroupRegistry::default();
        registry.declare("A", Namespace::Groups);
        registry.mutate("A", p("+x"), Namespace::Groups);
        registry.mutate("A", p("!y"), Namespace::Groups);
        registry.declare("HIDDEN", Namespace::Imports);
        registry.declare("B", Namespace::Groups);

        let json = serde_json::to_string(&registry).unwrap();
        assert_eq!(json, r#"{"A":["+x","!y"],"B":[]}"#);
    }
}
