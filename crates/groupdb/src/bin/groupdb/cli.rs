//! groupdb cli interface

use clap::{ArgAction, Parser, ValueEnum};
use std::fmt::Formatter;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None, disable_version_flag = true)]
pub struct Cli {
    /// Root group file to compile
    ///
    /// Files named by @include and @import are resolved relative
    /// to the file containing the directive.
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,

    /// Output file
    ///
    /// Defaults to the input file name with the extension replaced by
    /// .groupdb, placed in the work directory. An existing file is replaced.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    #[arg(short = 'F', long = "output-format", default_value_t)]
    pub format: OutputFormat,

    /// Print version
    #[arg(short = 'v', long = "version", action = ArgAction::Version)]
    pub version: Option<bool>,
}

impl Cli {
    pub fn output_path(&self) -> PathBuf {
        if let Some(output) = &self.output {
            return output.clone();
        }

        let stem = self
            .input
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();

        PathBuf::from(format!("{stem}.groupdb"))
    }
}

#[derive(ValueEnum, Clone, Copy, Default, Debug)]
pub enum OutputFormat {
    #[default]
    Groupdb,
    Json,
    Yaml,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Groupdb => f.write_str("groupdb"),
            OutputFormat::Json => f.write_str("json"),
            OutputFormat::Yaml => f.write_str("yaml"),
        }
    }
}

impl From<OutputFormat> for groupdb::output::Format {
    fn from(value: OutputFormat) -> Self {
        match value {
            OutputFormat::Groupdb => groupdb::output::Format::GroupDb,
            OutputFormat::Json => groupdb::output::Format::Json,
            OutputFormat::Yaml => groupdb::output::Format::Yaml,
        }
    }
}
