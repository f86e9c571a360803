mod config;
mod logging;
mod statsd;

use clap::{Args, Parser, Subcommand};
use config::{Config, ConfigError};
use stats_gateway::aggregator::ProfileAggregator;
use stats_gateway::errors::GatewayError;
use stats_gateway::matches::MatchWindow;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "riftwatch", version, about = "League of Legends stats gateway")]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand)]
enum CliCommand {
    /// Run the API and admin listeners
    Serve(ServeArgs),
    /// Build one player profile and print it as JSON
    Profile(ProfileArgs),
}

#[derive(Args)]
struct ServeArgs {
    /// YAML config file. Defaults apply when omitted.
    #[arg(long, short)]
    config: Option<PathBuf>,
}

#[derive(Args)]
struct ProfileArgs {
    game_name: String,
    tag_line: String,
    /// Routing region: americas, asia or europe
    #[arg(long)]
    region: Option<String>,
    #[arg(long, default_value_t = 0)]
    start: usize,
    #[arg(long, default_value_t = 10)]
    count: usize,
    #[arg(long, short)]
    config: Option<PathBuf>,
}

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Metrics(#[from] statsd::MetricsError),
    #[error("could not start runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error("could not serialize profile: {0}")]
    Serialization(#[from] serde_json::Error),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "riftwatch failed");
            eprintln!("riftwatch: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config_path = match &cli.command {
        CliCommand::Serve(args) => args.config.as_deref(),
        CliCommand::Profile(args) => args.config.as_deref(),
    };
    let config = Config::load(config_path, |name| std::env::var(name).ok())?;

    let _sentry = logging::init(config.common.logging.as_ref());
    statsd::init(config.common.metrics.as_ref())?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    match cli.command {
        CliCommand::Serve(_) => {
            tracing::info!("Starting riftwatch gateway");
            runtime.block_on(stats_gateway::run(config.gateway))?;
        }
        CliCommand::Profile(args) => {
            let aggregator = ProfileAggregator::from_config(&config.gateway)?;
            let window = MatchWindow::new(args.start, args.count);
            let envelope = runtime.block_on(aggregator.profile(
                &args.game_name,
                &args.tag_line,
                args.region.as_deref(),
                window,
            ))?;
            println!("{}", serde_json::to_string_pretty(&envelope)?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_profile_command() {
        let cli = Cli::parse_from([
            "riftwatch",
            "profile",
            "Hide on bush",
            "KR1",
            "--region",
            "asia",
            "--count",
            "20",
        ]);
        let CliCommand::Profile(args) = cli.command else {
            panic!("expected profile command");
        };
        assert_eq!(args.game_name, "Hide on bush");
        assert_eq!(args.region.as_deref(), Some("asia"));
        assert_eq!(args.start, 0);
        assert_eq!(args.count, 20);
        assert!(args.config.is_none());
    }
}
