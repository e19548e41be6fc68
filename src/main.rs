mod calendar;
mod config;
mod http;
mod llm;
mod media;
mod metrics;
mod models;
mod pipeline;
mod shopify;
#[cfg(test)]
mod testing;
mod titles;
mod topics;
mod widget;

use calendar::CalendarStore;
use clap::builder::RangedU64ValueParser;
use clap::{Parser, Subcommand};
use config::{AppConfig, CalendarLocation};
use llm::OpenAiClient;
use pipeline::{PlanSummary, Planner, PlannerSettings, PublishOutcome, Publisher, PublisherSettings};
use shopify::ShopifyClient;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{Instrument, error, info, info_span};
use tracing_subscriber::{EnvFilter, fmt};
use uuid::Uuid;

/// Plans and publishes AI-written running articles to the Hopsport blog.
#[derive(Parser)]
#[command(name = "hopsport-blog", version)]
struct Cli {
    /// Content calendar file; overrides `CALENDAR_PATH`.
    #[arg(long, global = true)]
    calendar: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a batch of topics with hosted images and append them as pending entries.
    Plan {
        /// Number of topics to request.
        #[arg(
            long,
            default_value_t = pipeline::planner::DEFAULT_BATCH_SIZE,
            value_parser = RangedU64ValueParser::<usize>::new().range(1..)
        )]
        count: usize,
    },
    /// Publish the oldest pending entry.
    Publish {
        /// Compose the article without creating it or touching the calendar.
        #[arg(long)]
        dry_run: bool,
    },
    /// Show pending and published counts.
    Status,
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Command::Plan { .. } => "plan",
            Command::Publish { .. } => "publish",
            Command::Status => "status",
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    init_tracing();
    let cli = Cli::parse();

    let span = info_span!("run", run_id = %Uuid::new_v4(), command = cli.command.name());
    async move {
        if let Command::Status = cli.command {
            let mut location = CalendarLocation::from_env();
            if let Some(path) = cli.calendar {
                location.path = path;
            }
            return report(status(&location));
        }

        let mut config = match AppConfig::from_env() {
            Ok(config) => config,
            Err(err) => {
                error!(target = "blog.config", error = %err, "invalid_configuration");
                return ExitCode::FAILURE;
            }
        };
        if let Some(path) = cli.calendar {
            config.calendar_path = path;
        }
        report(execute(cli.command, &config).await)
    }
    .instrument(span)
    .await
}

/// Only configuration problems change the exit code; everything else is logged.
fn report(result: eyre::Result<()>) -> ExitCode {
    if let Err(err) = result {
        error!(target = "blog.run", error = %err, "run_failed");
    }
    ExitCode::SUCCESS
}

async fn execute(command: Command, config: &AppConfig) -> eyre::Result<()> {
    let generator = OpenAiClient::new(config.openai.clone(), &config.http);
    let commerce = ShopifyClient::new(config);
    let store = CalendarStore::new(&config.calendar_path);

    match command {
        Command::Plan { count } => {
            let settings = PlannerSettings::from_config(config, count);
            let summary = Planner::new(settings, &generator, &commerce, &store)
                .run()
                .await?;
            print_plan(&summary);
        }
        Command::Publish { dry_run } => {
            let settings = PublisherSettings::from_config(config, dry_run);
            match Publisher::new(settings, &generator, &commerce, &store)
                .run()
                .await?
            {
                PublishOutcome::NothingPending => {
                    info!(target = "blog.publisher", "nothing_to_publish")
                }
                PublishOutcome::Published {
                    title,
                    article_id,
                    published_at,
                } => info!(
                    target = "blog.publisher",
                    %title,
                    %article_id,
                    %published_at,
                    "published"
                ),
                PublishOutcome::Previewed(draft) => println!("{}\n\n{}", draft.title, draft.body_html),
            }
        }
        Command::Status => status(&CalendarLocation {
            path: config.calendar_path.clone(),
            blog_key: config.blog_key.clone(),
        })?,
    }
    Ok(())
}

fn print_plan(summary: &PlanSummary) {
    for title in &summary.appended {
        println!("+ {title}");
    }
    for skipped in &summary.skipped {
        println!("- {} ({}: {})", skipped.title, skipped.stage, skipped.reason);
    }
    println!(
        "{} of {} topics added",
        summary.appended.len(),
        summary.proposed
    );
}

fn status(location: &CalendarLocation) -> eyre::Result<()> {
    let store = CalendarStore::new(&location.path);
    if !store.exists() {
        println!("no calendar at {}", location.path.display());
        return Ok(());
    }
    let calendar = store.load()?;
    for key in calendar.blog_keys() {
        let total = calendar.entries(key).len();
        let pending = calendar.pending_count(key);
        println!("{key}: {pending} pending, {} published", total - pending);
    }
    let key = location.blog_key.as_str();
    match calendar
        .next_pending(key)
        .map(|index| &calendar.entries(key)[index])
    {
        Some(next) => println!("next ({key}): {}", next.title),
        None => println!("next ({key}): nothing pending"),
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan_count(args: &[&str]) -> Result<usize, clap::Error> {
        let cli = Cli::try_parse_from(args)?;
        match cli.command {
            Command::Plan { count } => Ok(count),
            _ => panic!("expected plan"),
        }
    }

    #[test]
    fn plan_count_defaults_to_batch_size() {
        assert_eq!(plan_count(&["hopsport-blog", "plan"]).unwrap(), 10);
        assert_eq!(plan_count(&["hopsport-blog", "plan", "--count", "3"]).unwrap(), 3);
    }

    #[test]
    fn plan_count_of_zero_is_rejected() {
        assert!(plan_count(&["hopsport-blog", "plan", "--count", "0"]).is_err());
    }

    #[test]
    fn calendar_flag_is_global() {
        let cli = Cli::try_parse_from(["hopsport-blog", "status", "--calendar", "/tmp/cal.json"])
            .unwrap();
        assert_eq!(cli.calendar, Some(PathBuf::from("/tmp/cal.json")));
        assert!(matches!(cli.command, Command::Status));
    }
}
