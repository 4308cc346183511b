//! `@directive arg ...` lines
//!
//! | directive              | effect                                                  |
//! |------------------------|---------------------------------------------------------|
//! | `@include <path>`      | parse `<path>`, its groups are emitted                  |
//! | `@import <path>`       | parse `<path>`, its groups are only usable by `@extend` |
//! | `@extend <GROUP>`      | replay all tokens of `<GROUP>` onto the current group   |
//!
//! Paths are relative to the directory of the file containing the directive.
//! Arguments past the first are ignored.
use crate::compiler::LineError;
use std::path::{Path, PathBuf};

/// What a directive gets to know about the place it was called from
#[derive(derive_new::new, Debug, Clone, Copy)]
pub struct ParseContext<'a> {
    /// Most recently declared group of the current file
    pub current_group: Option<&'a str>,
    /// Directory of the current file
    pub directory: &'a Path,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    Include(PathBuf),
    Import(PathBuf),
    Extend(String),
}

impl Directive {
    pub fn parse(name: &str, args: &[String], context: &ParseContext) -> Result<Self, LineError> {
        let first_arg = |directive: &'static str| {
            args.first()
                .ok_or(LineError::MissingArgument(directive))
                .map(String::as_str)
        };

        match name {
            "include" => Ok(Directive::Include(
                context.directory.join(first_arg("include")?),
            )),
            "import" => Ok(Directive::Import(
                context.directory.join(first_arg("import")?),
            )),
            "extend" => Ok(Directive::Extend(first_arg("extend")?.to_string())),
            _ => Err(LineError::UndefinedDirective(name.to_string())),
        }
    }
}

impl std::fmt::Display for Directive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Directive::Include(path) => write!(f, "@include {}", path.display()),
            Directive::Import(path) => write!(f, "@import {}", path.display()),
            Directive::Extend(group) => write!(f, "@extend {group}"),
        }
    }
}
