mod cli;

use groupdb::output;

fn main() {
    use clap::Parser;
    let cli = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_env("GROUPDB_LOG"))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli) {
        for error in e.chain() {
            eprintln!("{error}")
        }
        std::process::exit(2);
    }
}

pub fn run(cli: cli::Cli) -> anyhow::Result<()> {
    let registry = groupdb::compile(&cli.input)?;

    let output_path = cli.output_path();
    output::write_file(&registry, cli.format.into(), &output_path)?;

    Ok(())
}
