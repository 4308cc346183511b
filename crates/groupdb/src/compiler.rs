//! Turns a tree of group files into a [GroupRegistry]
//!
//! Files are read completely and then processed line by line. `@include` and `@import`
//! recurse depth first. All files of one compilation share the same [VariableTable] and
//! [GroupRegistry], so anything declared earlier is visible to every file parsed later.
//!
//! The first error aborts the whole compilation.
use crate::directive::{Directive, ParseContext};
use crate::line::Line;
use crate::registry::{GroupRegistry, Namespace};
use crate::variables::{UndeclaredVariable, VariableTable};
use std::path::{Path, PathBuf};

/// Compile the file at `path` and everything it includes or imports
pub fn compile(path: &Path) -> Result<GroupRegistry, CompileError> {
    let mut compiler = Compiler::default();
    compiler.compile_file(path, Namespace::Groups)?;
    Ok(compiler.into_registry())
}

#[derive(Default, Debug)]
pub struct Compiler {
    variables: VariableTable,
    registry: GroupRegistry,

    /// Files currently being parsed, outermost first
    stack: Vec<PathBuf>,
}

impl Compiler {
    pub fn variables(&self) -> &VariableTable {
        &self.variables
    }

    pub fn registry(&self) -> &GroupRegistry {
        &self.registry
    }

    pub fn into_registry(self) -> GroupRegistry {
        self.registry
    }

    /// Read and parse a file
    ///
    /// Groups declared in the file land in `namespace`.
    pub fn compile_file(&mut self, path: &Path, namespace: Namespace) -> Result<(), CompileError> {
        let unreadable = |source| CompileError::Unreadable {
            path: path.to_owned(),
            source,
        };

        let path = path.canonicalize().map_err(unreadable)?;
        tracing::info!(path=%path.display(), %namespace, "parsing file");

        let contents = std::fs::read_to_string(&path).map_err(unreadable)?;
        self.compile_source(&contents, &path, namespace)
    }

    /// Parse `source` as if it was read from `path`
    ///
    /// `path` is used for relative directive paths and error messages, it does not have to exist.
    pub fn compile_source(
        &mut self,
        source: &str,
        path: &Path,
        namespace: Namespace,
    ) -> Result<(), CompileError> {
        self.stack.push(path.to_owned());
        let result = self.parse_lines(source, path, namespace);
        self.stack.pop();
        result
    }

    fn parse_lines(
        &mut self,
        source: &str,
        path: &Path,
        namespace: Namespace,
    ) -> Result<(), CompileError> {
        let directory = path.parent().unwrap_or(Path::new(""));
        let mut current_group: Option<String> = None;

        for (index, raw) in source.lines().enumerate() {
            let at = |kind: LineError| CompileError::Line {
                kind,
                line: index + 1,
                path: path.to_owned(),
            };

            let line = Line::classify(raw, &self.variables).map_err(|e| at(e.into()))?;
            match line {
                Line::Blank | Line::Comment | Line::Inert => {}
                Line::Assignment { name, value } => self.variables.set(name, value),
                Line::Group(name) => {
                    current_group = Some(self.registry.declare(&name, namespace));
                }
                Line::Toggle(permission) => {
                    let group = current_group.as_deref().unwrap_or_default();
                    if self.registry.mutate(group, permission, namespace).is_none() {
                        tracing::warn!(
                            group,
                            %namespace,
                            line = index + 1,
                            path = %path.display(),
                            "permission toggle dropped, group is not declared in this namespace"
                        );
                    }
                }
                Line::Directive { name, args } => {
                    let context = ParseContext::new(current_group.as_deref(), directory);
                    let directive = Directive::parse(&name, &args, &context).map_err(at)?;
                    tracing::debug!(%directive, line = index + 1, "dispatch");

                    match self.dispatch(directive, &context, namespace) {
                        Ok(()) => {}
                        Err(Dispatch::Line(kind)) => return Err(at(kind)),
                        Err(Dispatch::Nested(error)) => return Err(error),
                    }
                }
            }
        }

        Ok(())
    }

    fn dispatch(
        &mut self,
        directive: Directive,
        context: &ParseContext,
        namespace: Namespace,
    ) -> Result<(), Dispatch> {
        match directive {
            Directive::Include(path) => {
                if !path.is_file() {
                    return Err(LineError::MissingInclude(path).into());
                }
                self.enter(&path, Namespace::Groups)
            }
            Directive::Import(path) => {
                if !path.is_file() {
                    return Err(LineError::MissingImport(path).into());
                }
                self.enter(&path, Namespace::Imports)
            }
            Directive::Extend(source) => {
                // replay, not copy: the target's own tokens still take part in resolution
                let tokens = self
                    .registry
                    .lookup(&source)
                    .cloned()
                    .ok_or_else(|| LineError::UnknownExtendSource(source.clone()))?;

                let target = context.current_group.unwrap_or_default();
                if self.registry.get(target, namespace).is_none() {
                    tracing::warn!(
                        group = target,
                        extends = %source,
                        %namespace,
                        tokens = tokens.len(),
                        "extend dropped, group is not declared in this namespace"
                    );
                    return Ok(());
                }

                for token in tokens {
                    self.registry.mutate(target, token, namespace);
                }

                Ok(())
            }
        }
    }

    fn enter(&mut self, path: &Path, namespace: Namespace) -> Result<(), Dispatch> {
        if let Ok(canonical) = path.canonicalize() {
            if self.stack.contains(&canonical) {
                return Err(LineError::IncludeCycle(canonical).into());
            }
        }

        self.compile_file(path, namespace).map_err(|error| match error {
            // report at the directive, the nested file has no line to point at
            CompileError::Unreadable { path, source } => Dispatch::Line(LineError::Unreadable {
                path,
                reason: source.kind(),
            }),
            nested => Dispatch::Nested(nested),
        })
    }
}

/// Outcome of a failed directive
enum Dispatch {
    /// the directive line itself is at fault
    Line(LineError),
    /// a nested file failed, it carries its own location
    Nested(CompileError),
}

impl From<LineError> for Dispatch {
    fn from(value: LineError) -> Self {
        Dispatch::Line(value)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum CompileError {
    #[error("Unable to read file {}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{kind} on line {line} of file: {}", .path.display())]
    Line {
        kind: LineError,
        line: usize,
        path: PathBuf,
    },
}

impl CompileError {
    /// The line-level failure, if any
    pub fn kind(&self) -> Option<&LineError> {
        match self {
            CompileError::Unreadable { .. } => None,
            CompileError::Line { kind, .. } => Some(kind),
        }
    }

    /// 1-based line number, if any
    pub fn line(&self) -> Option<usize> {
        match self {
            CompileError::Unreadable { .. } => None,
            CompileError::Line { line, .. } => Some(*line),
        }
    }

    /// File the error happened in
    pub fn path(&self) -> &Path {
        match self {
            CompileError::Unreadable { path, .. } | CompileError::Line { path, .. } => path,
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LineError {
    #[error(transparent)]
    UndeclaredVariable(#[from] UndeclaredVariable),
    #[error("Undefined directive @{0}")]
    UndefinedDirective(String),
    #[error("Directive @{0} requires an argument")]
    MissingArgument(&'static str),
    #[error("Included file '{}' not found", .0.display())]
    MissingInclude(PathBuf),
    #[error("Imported file '{}' not found", .0.display())]
    MissingImport(PathBuf),
    #[error("Cannot extend unknown group '{0}'")]
    UnknownExtendSource(String),
    #[error("File '{}' is already being parsed (include cycle)", .0.display())]
    IncludeCycle(PathBuf),
    #[error("Unable to read file '{}' ({reason})", .path.display())]
    Unreadable {
        path: PathBuf,
        reason: std::io::ErrorKind,
    },
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn compile_str(source: &str) -> Result<Compiler, CompileError> {
        let mut compiler = Compiler::default();
        compiler.compile_source(source, Path::new("/virtual/root.conf"), Namespace::Groups)?;
        Ok(compiler)
    }

    fn group(compiler: &Compiler, name: &str) -> Vec<String> {
        compiler
            .registry()
            .get(name, Namespace::Groups)
            .expect("group must exist")
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    #[test]
    fn declarations_and_toggles() {
        let compiler = compile_str(
            "# comment\n\
             ADMIN\n\
             +kick\n\
             -ban\n\
             +ban\n\
             \n\
             PLAYER\n\
             +talk\n",
        )
        .unwrap();

        assert_eq!(group(&compiler, "ADMIN"), vec!["+kick", "+ban"]);
        assert_eq!(group(&compiler, "PLAYER"), vec!["+talk"]);
    }

    #[test]
    fn redeclaring_continues_the_group() {
        let compiler = compile_str("A\n+x\nB\n+y\nA\n!x\n").unwrap();
        assert_eq!(group(&compiler, "A"), vec!["!x"]);
        assert_eq!(compiler.registry().groups().count(), 2);
    }

    #[test]
    fn variables_are_substituted() {
        let compiler = compile_str(
            "$V = \"ABC\"\n\
             $PERM = \"talk\"\n\
             PREFIX$V\n\
             +$PERM\n",
        )
        .unwrap();

        assert_eq!(group(&compiler, "PREFIXABC"), vec!["+talk"]);
        assert_eq!(compiler.variables().get("$PERM"), Ok("talk"));
    }

    #[test]
    fn undeclared_variable_reports_line() {
        let err = compile_str("A\n+x\n+$W\n").unwrap_err();
        assert_eq!(err.line(), Some(3));
        assert_eq!(
            err.kind(),
            Some(&LineError::UndeclaredVariable(UndeclaredVariable(
                "$W".into()
            )))
        );
        assert_eq!(
            err.to_string(),
            "Variable $W was not previously initialized on line 3 of file: /virtual/root.conf"
        );
    }

    #[test]
    fn undefined_directive() {
        let err = compile_str("A\n@define X\n").unwrap_err();
        assert_eq!(err.line(), Some(2));
        assert_eq!(
            err.kind(),
            Some(&LineError::UndefinedDirective("define".into()))
        );
    }

    #[test]
    fn extend_replays_tokens() {
        let compiler = compile_str(
            "SRC\n+x\n-y\n\
             DST\n@extend SRC\n\
             NEG\n!x\n@extend SRC\n",
        )
        .unwrap();

        assert_eq!(group(&compiler, "DST"), vec!["+x", "-y"]);
        assert_eq!(group(&compiler, "NEG"), vec!["!x", "-y"]);
    }

    #[test]
    fn extend_unknown_group() {
        let err = compile_str("DST\n@extend NOPE\n").unwrap_err();
        assert_eq!(
            err.kind(),
            Some(&LineError::UnknownExtendSource("NOPE".into()))
        );
    }

    #[test]
    fn extend_itself_is_a_noop() {
        let compiler = compile_str("A\n+x\n-y\n@extend A\n").unwrap();
        assert_eq!(group(&compiler, "A"), vec!["+x", "-y"]);
    }

    #[test]
    fn extend_without_group_is_dropped() {
        let mut compiler = compile_str("SRC\n+x\n").unwrap();
        compiler
            .compile_source("@extend SRC\n", Path::new("/virtual/other.conf"), Namespace::Groups)
            .unwrap();
        compiler
            .compile_source(
                "SRC\n@extend SRC\nOWN\n+y\n",
                Path::new("/virtual/lib.conf"),
                Namespace::Imports,
            )
            .unwrap();

        assert_eq!(group(&compiler, "SRC"), vec!["+x"]);
        assert_eq!(compiler.registry().imports().count(), 1);
        assert_eq!(compiler.registry().groups().count(), 1);
    }

    #[test]
    fn toggle_without_group_is_dropped() {
        let compiler = compile_str("+x\nA\n+y\n").unwrap();
        assert_eq!(group(&compiler, "A"), vec!["+y"]);
        assert_eq!(compiler.registry().groups().count(), 1);
    }

    #[test]
    fn missing_include() {
        let err = compile_str("@include does-not-exist.conf\n").unwrap_err();
        assert_eq!(err.line(), Some(1));
        assert_eq!(
            err.kind(),
            Some(&LineError::MissingInclude(PathBuf::from(
                "/virtual/does-not-exist.conf"
            )))
        );
    }

    #[test]
    fn missing_import() {
        let err = compile_str("\n@import nope.conf\n").unwrap_err();
        assert_eq!(err.line(), Some(2));
        assert_eq!(
            err.kind(),
            Some(&LineError::MissingImport(PathBuf::from("/virtual/nope.conf")))
        );
    }

    #[test]
    fn unreadable_include_reports_directive_line() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("root.conf");
        std::fs::write(&root, "A\n@include bad.conf\n").unwrap();
        std::fs::write(dir.path().join("bad.conf"), [0xFF, 0xFE]).unwrap();

        let err = compile(&root).unwrap_err();
        assert_eq!(err.line(), Some(2));
        assert!(err.path().ends_with("root.conf"));
        assert!(matches!(
            err.kind(),
            Some(LineError::Unreadable {
                reason: std::io::ErrorKind::InvalidData,
                ..
            })
        ));
    }

    #[test]
    fn unreadable_root() {
        let err = compile(Path::new("/does/not/exist.conf")).unwrap_err();
        assert!(matches!(err, CompileError::Unreadable { .. }));
        assert_eq!(err.line(), None);
        assert_eq!(err.path(), Path::new("/does/not/exist.conf"));
    }
}
