//! Writing the group database
//!
//! Only authoritative groups are written, imports never leave the compiler.
use crate::registry::GroupRegistry;
use std::io::Write;
use std::path::Path;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Format {
    /// `NAME: +perm -perm !perm`, one group per line
    #[default]
    GroupDb,
    Json,
    Yaml,
}

/// Render the text group database
///
/// Groups without tokens are still listed (`NAME: `).
pub fn write_groupdb(registry: &GroupRegistry, mut writer: impl Write) -> std::io::Result<()> {
    for (name, group) in registry.groups() {
        write!(writer, "{name}:")?;
        if group.is_empty() {
            write!(writer, " ")?;
        }
        for token in group {
            write!(writer, " {token}")?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

pub fn write(registry: &GroupRegistry, format: Format, mut writer: impl Write) -> anyhow::Result<()> {
    match format {
        Format::GroupDb => write_groupdb(registry, &mut writer)?,
        Format::Json => {
            serde_json::to_writer_pretty(&mut writer, registry)?;
            writeln!(writer)?;
        }
        Format::Yaml => serde_yaml::to_writer(&mut writer, registry)?,
    };

    writer.flush()?;
    Ok(())
}

/// Replace the file at `path` with the rendered database
pub fn write_file(registry: &GroupRegistry, format: Format, path: &Path) -> anyhow::Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => tracing::debug!(path=%path.display(), "removed existing output"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }

    let file = std::fs::File::create(path)?;
    write(registry, format, std::io::BufWriter::new(file))?;

    tracing::info!(path=%path.display(), groups = registry.groups().count(), "output written");
    Ok(())
}

/// Convenience for [write_groupdb] into a string
pub fn render(registry: &GroupRegistry) -> String {
    let mut out = vec![];
    write_groupdb(registry, &mut out).expect("writing to a Vec never fails");
    String::from_utf8(out).expect("group database is always utf-8")
}
