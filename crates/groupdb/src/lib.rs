//! # groupdb - group permission database compiler
//!
//! ## Introduction for developers
//!
//! Read this to understand how `groupdb` works internally.
//!
//! ### The input language
//!
//! Input files are line based. There are no blocks and no line continuations.
//!
//! ```text
//! # comments start with a hash
//! $PREFIX = "LOCAL"
//!
//! @import roles/base.conf
//!
//! $PREFIX.ADMIN
//! @extend PLAYER
//! +kick
//! -ban
//! !shutdownserver
//!
//! @include more-groups.conf
//! ```
//!
//! - `$NAME = "value"` assigns a variable. The value is stored verbatim.
//! - `$NAME` anywhere else is replaced by its value before the line is looked at.
//! - an upper case name alone on a line declares a group and makes it the current group
//! - `+perm`, `-perm` and `!perm` toggle a permission of the current group
//! - `@include`, `@import` and `@extend` are directives, see [directive]
//!
//! ### Groups and imports
//!
//! see [registry]
//!
//! Groups declared in the root file or in an `@include`d file are authoritative and
//! written to the output. Groups declared in an `@import`ed file are kept separately and
//! only serve as a source for `@extend`. Whichever namespace a name is declared in first,
//! it stays there.
//!
//! ### Permission resolution
//!
//! see [permission::resolve]
//!
//! Toggles are never simply appended. A grant removes an earlier revoke of the same
//! permission and vice versa. A negation removes both and can not be undone: every
//! later grant or revoke of that permission is dropped. `@extend` replays the tokens of
//! another group through the same rules.
//!
//! ### Compilation
//!
//! see [compiler::Compiler]
//!
//! Each file is read completely, then each line is classified ([line::Line]) and
//! applied. Directives that name another file recurse depth first. Variables and groups
//! are shared across the whole tree of files. The first error aborts everything and
//! points at the offending file and line.
//!
//! ### Output
//!
//! [output] writes one line per authoritative group:
//!
//! ```text
//! LOCAL.ADMIN: +talk +kick -ban !shutdownserver
//! OBSERVER:
//! ```
//!
//! The same data can be written as json or yaml via [serde].
//!
pub mod compiler;
pub mod directive;
pub mod line;
pub mod output;
pub mod permission;
pub mod registry;
pub mod variables;

pub use compiler::{compile, CompileError, Compiler, LineError};
pub use registry::{GroupRegistry, Namespace};
