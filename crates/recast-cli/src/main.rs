use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod output;

#[derive(Parser)]
#[command(
    name = "recast",
    version,
    about = "Parse recipes and transform them by diet, cuisine style, and cooking method"
)]
struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    format: output::OutputFormat,

    #[command(flatten)]
    settings: commands::SettingsArgs,

    #[command(subcommand)]
    command: commands::Commands,
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        commands::Commands::Parse(args) => commands::parse::run(args, &cli.settings, cli.format),
        commands::Commands::Transform(args) => {
            commands::transform::run(args, &cli.settings, cli.format)
        }
        commands::Commands::Diff(args) => commands::diff::run(args, &cli.settings, cli.format),
        commands::Commands::Knowledge => commands::knowledge::run(&cli.settings, cli.format),
        commands::Commands::Version => commands::version::run(),
    }
}
