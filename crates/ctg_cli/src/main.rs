use anyhow::Context;
use clap::Parser;
use ctg_core::ApiConfig;
use ctg_fetch::logging::{init_logging, level_from_verbosity};
use ctg_fetch::{handle_command, Aggregator, FetchCommands, RetryPolicy};
use ctg_web::AppState;
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq)]
struct HumanDuration(Duration);

impl FromStr for HumanDuration {
    type Err = String;

    /// Accepts `30`, `30s`, `1m30s`, `2h`, `500ms`. A bare number is seconds.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut total = Duration::ZERO;
        let mut number = String::new();
        let mut chars = s.trim().chars().peekable();
        let mut saw_number = false;

        while let Some(c) = chars.next() {
            if c.is_ascii_digit() {
                number.push(c);
                continue;
            }
            if c.is_whitespace() {
                continue;
            }
            let value: u64 = number
                .parse()
                .map_err(|_| format!("Expected a number before unit '{}'", c))?;
            number.clear();
            saw_number = true;
            let part = match c {
                'm' if chars.peek() == Some(&'s') => {
                    chars.next();
                    Some(Duration::from_millis(value))
                }
                's' => Some(Duration::from_secs(value)),
                'm' => value.checked_mul(60).map(Duration::from_secs),
                'h' => value.checked_mul(3600).map(Duration::from_secs),
                _ => return Err(format!("Invalid duration unit: {}", c)),
            };
            total = part
                .and_then(|part| total.checked_add(part))
                .ok_or_else(too_long)?;
        }

        if !number.is_empty() {
            let value: u64 = number
                .parse()
                .map_err(|_| "Invalid number in duration".to_string())?;
            total = total
                .checked_add(Duration::from_secs(value))
                .ok_or_else(too_long)?;
            saw_number = true;
        }

        if !saw_number {
            return Err("Duration must include a number".to_string());
        }
        Ok(HumanDuration(total))
    }
}

fn too_long() -> String {
    "Duration is too long".to_string()
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Clinical-trial study summaries", long_about = None)]
struct Cli {
    /// Base URL of the studies API (search and detail endpoints)
    #[arg(long, global = true)]
    base_url: Option<String>,
    /// Matches requested per search page
    #[arg(long, global = true, default_value_t = ctg_core::config::DEFAULT_PAGE_SIZE)]
    page_size: usize,
    /// Per-request timeout (e.g. 30s, 1m, 500ms); 0 disables it
    #[arg(long, global = true, default_value = "30s")]
    timeout: HumanDuration,
    /// Detail fetches in flight within one page
    #[arg(long, global = true, default_value_t = 1)]
    concurrency: usize,
    /// Attempts per request for transient failures; 1 disables retrying
    #[arg(long, global = true, default_value_t = 1)]
    retries: u32,
    /// More output; repeat for trace level
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    #[command(flatten)]
    Fetch(FetchCommands),
    /// Serve studies and map points as JSON
    Serve {
        #[arg(long, default_value = "127.0.0.1:3000")]
        addr: SocketAddr,
        /// Largest limit a single request may ask for
        #[arg(long, default_value_t = ctg_web::state::DEFAULT_MAX_LIMIT)]
        max_limit: usize,
    },
}

impl Cli {
    fn api_config(&self) -> ctg_core::Result<ApiConfig> {
        let mut config = ApiConfig::default();
        if let Some(base_url) = &self.base_url {
            config = config.with_base_url(base_url)?;
        }
        let timeout = Some(self.timeout.0).filter(|t| !t.is_zero());
        let config = config
            .with_page_size(self.page_size)
            .with_timeout(timeout)
            .with_detail_concurrency(self.concurrency);
        config.validate()?;
        Ok(config)
    }

    fn aggregator(&self) -> ctg_core::Result<Aggregator> {
        let config = self.api_config()?;
        if self.retries > 1 {
            Aggregator::from_config_with_retry(
                config,
                RetryPolicy::new(self.retries, Duration::from_secs(2)),
            )
        } else {
            Aggregator::from_config(config)
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(level_from_verbosity(cli.verbose, cli.quiet));

    let aggregator = cli.aggregator().context("invalid API configuration")?;
    info!(
        "🔎 Using {} (page size {}, concurrency {})",
        cli.base_url.as_deref().unwrap_or(ctg_core::config::DEFAULT_BASE_URL),
        cli.page_size,
        cli.concurrency
    );

    match cli.command {
        Commands::Fetch(command) => handle_command(command, &aggregator).await?,
        Commands::Serve { addr, max_limit } => {
            let state = AppState::new(Arc::new(aggregator)).with_max_limit(max_limit);
            ctg_web::serve(addr, state)
                .await
                .with_context(|| format!("server on {} failed", addr))?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> Result<Duration, String> {
        s.parse::<HumanDuration>().map(|d| d.0)
    }

    #[test]
    fn test_human_duration() {
        assert_eq!(parse("30"), Ok(Duration::from_secs(30)));
        assert_eq!(parse("30s"), Ok(Duration::from_secs(30)));
        assert_eq!(parse("1m30s"), Ok(Duration::from_secs(90)));
        assert_eq!(parse("2h"), Ok(Duration::from_secs(7200)));
        assert_eq!(parse("500ms"), Ok(Duration::from_millis(500)));
        assert_eq!(parse("1m 5s"), Ok(Duration::from_secs(65)));
        assert!(parse("").is_err());
        assert!(parse("s").is_err());
        assert!(parse("10x").is_err());
    }

    #[test]
    fn test_human_duration_overflow_is_an_error() {
        assert!(parse("18446744073709551615s1s").is_err());
        assert!(parse("18446744073709551615s1").is_err());
        assert!(parse("18446744073709551615m").is_err());
        assert!(parse("18446744073709551615h").is_err());
        assert_eq!(
            parse("18446744073709551615"),
            Ok(Duration::from_secs(u64::MAX))
        );
    }

    #[test]
    fn test_cli_builds_config() {
        let cli = Cli::try_parse_from([
            "ctg",
            "--base-url",
            "http://localhost:9000/api/v2/studies",
            "--page-size",
            "50",
            "--timeout",
            "0",
            "--concurrency",
            "4",
            "studies",
            "--limit",
            "5",
        ])
        .unwrap();
        let config = cli.api_config().unwrap();
        assert_eq!(config.page_size, 50);
        assert_eq!(config.request_timeout, None);
        assert_eq!(config.detail_concurrency, 4);
        assert_eq!(
            config.detail_url("NCT1").unwrap().as_str(),
            "http://localhost:9000/api/v2/studies/NCT1"
        );
        assert!(matches!(cli.command, Commands::Fetch(FetchCommands::Studies(ref a)) if a.limit == 5));
    }

    #[test]
    fn test_cli_rejects_bad_page_size() {
        let cli = Cli::try_parse_from(["ctg", "--page-size", "0", "latest"]).unwrap();
        assert!(cli.api_config().is_err());
    }

    #[test]
    fn test_serve_command() {
        let cli = Cli::try_parse_from(["ctg", "serve", "--addr", "0.0.0.0:8080"]).unwrap();
        match cli.command {
            Commands::Serve { addr, max_limit } => {
                assert_eq!(addr.port(), 8080);
                assert_eq!(max_limit, ctg_web::state::DEFAULT_MAX_LIMIT);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
