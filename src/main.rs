//! ddns6 - keeps a DNS AAAA record pointed at an interface's IPv6 address.

use clap::Parser;
use ddns6::config::{self, Config};
use ddns6::controller::{Controller, Rule};
use ddns6::providers::{DnsSession, HetznerProvider};
use ddns6::resolver::IfaceResolver;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "ddns6")]
#[command(about = "Keeps a DNS AAAA record pointed at an interface's global IPv6 address")]
#[command(version)]
struct Cli {
    /// Interface to watch for a global public IPv6 address
    #[arg(short = 'i', long, value_parser = clap::builder::NonEmptyStringValueParser::new())]
    interface: String,

    /// DNS record name to keep updated
    #[arg(short = 'r', long, value_parser = clap::builder::NonEmptyStringValueParser::new())]
    record: String,

    /// Zone (registered domain) the record belongs to
    #[arg(short = 'z', long, value_parser = clap::builder::NonEmptyStringValueParser::new())]
    zone: String,

    /// Path to the API credential file
    #[arg(short = 's', long, default_value = config::DEFAULT_SECRET_PATH)]
    secret_file: PathBuf,

    /// Seconds between address checks
    #[arg(short = 'c', long, default_value_t = 30)]
    check_interval: u64,

    /// Seconds between forced record refreshes
    #[arg(short = 'u', long, default_value_t = 3600)]
    update_interval: u64,

    /// Abort when address resolution fails mid-run instead of retrying at
    /// the next tick
    #[arg(long)]
    fatal_resolve_errors: bool,
}

impl Cli {
    fn into_config(self) -> (Config, PathBuf) {
        (
            Config {
                interface: self.interface,
                record: self.record,
                zone: self.zone,
                check_interval: Duration::from_secs(self.check_interval),
                update_interval: Duration::from_secs(self.update_interval),
                fatal_resolve_errors: self.fatal_resolve_errors,
            },
            self.secret_file,
        )
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let (config, secret_path) = Cli::parse().into_config();

    tracing::info!("loading secret from {}", secret_path.display());
    let secret = config::load_secret(&secret_path)?;

    let provider = HetznerProvider::new(secret);
    let session = DnsSession::open(Box::new(provider), &config.zone).await?;

    let rule = Rule::new(config.interface.clone(), config.record.clone());
    let resolver = IfaceResolver::new(config.interface.clone());

    let controller = Controller::new(
        rule,
        Box::new(resolver),
        session,
        config.fatal_resolve_errors,
    );

    controller
        .run(config.check_interval, config.update_interval)
        .await?;

    Ok(())
}
