use clap::{Args, Subcommand};
use ctg_core::types::parse_date;
use ctg_core::{points, DateRange, Result, SearchFilter, Summary};

use crate::aggregator::Aggregator;

#[derive(Subcommand, Debug, Clone)]
pub enum FetchCommands {
    /// List the most recently updated studies
    Studies(StudiesArgs),
    /// Print the full record of the most recently updated study
    Latest,
}

#[derive(Args, Debug, Clone)]
pub struct StudiesArgs {
    /// Maximum number of studies to return
    #[arg(long, short = 'n', default_value_t = 10)]
    pub limit: usize,
    /// First last-update date to include (YYYY-MM-DD)
    #[arg(long, requires = "end", conflicts_with = "day")]
    pub start: Option<String>,
    /// Last last-update date to include (YYYY-MM-DD)
    #[arg(long, requires = "start", conflicts_with = "day")]
    pub end: Option<String>,
    /// Only studies updated on this day (YYYY-MM-DD)
    #[arg(long)]
    pub day: Option<String>,
    /// Print the geo-located points instead of the studies
    #[arg(long)]
    pub points: bool,
    /// Print JSON instead of one line per study
    #[arg(long)]
    pub json: bool,
}

impl StudiesArgs {
    pub fn filter(&self) -> Result<SearchFilter> {
        let range = match (&self.start, &self.end, &self.day) {
            (Some(start), Some(end), _) => Some(DateRange {
                start: parse_date(start)?,
                end: parse_date(end)?,
            }),
            (_, _, Some(day)) => Some(DateRange::single_day(parse_date(day)?)),
            _ => None,
        };
        Ok(SearchFilter { date_range: range })
    }
}

pub async fn handle_command(command: FetchCommands, aggregator: &Aggregator) -> Result<()> {
    match command {
        FetchCommands::Studies(args) => {
            let filter = args.filter()?;
            let summaries = aggregator.collect(&filter, args.limit).await?;

            if args.points {
                let points = points(&summaries);
                if args.json {
                    println!("{}", serde_json::to_string_pretty(&points)?);
                } else {
                    for point in &points {
                        println!(
                            "{:>9.4} {:>10.4}  {}",
                            point.lat,
                            point.lon,
                            point.title.as_deref().unwrap_or("-")
                        );
                    }
                }
            } else if args.json {
                println!("{}", serde_json::to_string_pretty(&summaries)?);
            } else {
                println!("Found {} studies", summaries.len());
                for summary in &summaries {
                    println!("{}", summary_line(summary));
                }
            }
        }
        FetchCommands::Latest => {
            let document = aggregator.latest().await?;
            println!("{}", serde_json::to_string_pretty(document.as_value())?);
        }
    }
    Ok(())
}

fn summary_line(summary: &Summary) -> String {
    let mut line = format!(
        "{}  {}  {}",
        summary.id,
        summary.last_update.as_deref().unwrap_or("----------"),
        summary.title.as_deref().unwrap_or("(untitled)")
    );
    if summary.has_results {
        line.push_str("  [results]");
    }
    line
}
