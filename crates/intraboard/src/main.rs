//! intraboard - 42 intra API dashboard

mod auth;
mod cache;
mod coalition;
mod report;
mod settings;

use anyhow::{Context, Result};
use cache::DiskCache;
use clap::{Parser, Subcommand};
use intraboard_core::logtime::day_log_from_locations;
use intraboard_core::{ApiClient, ApiConfig, DayLog, DropReport, RateLimiter};
use settings::Settings;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "intraboard",
    version,
    about = "42 intra API dashboard: project completions, logtime and week totals",
    long_about = "Queries the 42 intra API within its rate limit and prints who finished\n\
                  which projects, and how long users spent on campus per day and per week.\n\
                  \n\
                  Examples:\n\
                    intraboard init --client-id <uid> --client-secret <secret>\n\
                    intraboard projects 42cursus-libft,42cursus-get_next_line\n\
                    intraboard cursus 42cursus\n\
                    intraboard logtime jdoe,asmith\n\
                    intraboard weektime jdoe --json\n\
                  \n\
                  Environment Variables:\n\
                    INTRABOARD_CONFIG                # Path to config.json\n\
                    INTRABOARD_CLIENT_ID             # OAuth application uid\n\
                    INTRABOARD_CLIENT_SECRET         # OAuth application secret\n\
                    INTRABOARD_CAMPUS                # Campus id for project queries\n\
                    INTRABOARD_NO_COLOR              # Disable ANSI colors\n\
                    RUST_LOG                         # Log filter (default: warn)"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Path to config.json (default: <config dir>/intraboard/config.json)
    #[arg(long, env = "INTRABOARD_CONFIG")]
    config: Option<PathBuf>,

    /// OAuth application uid
    #[arg(long, env = "INTRABOARD_CLIENT_ID")]
    client_id: Option<String>,

    /// OAuth application secret
    #[arg(long, env = "INTRABOARD_CLIENT_SECRET", hide_env_values = true)]
    client_secret: Option<String>,

    /// Campus id used to filter project completions
    #[arg(long, env = "INTRABOARD_CAMPUS")]
    campus: Option<u32>,

    /// API base URL
    #[arg(long, env = "INTRABOARD_API_URL", hide = true)]
    api_url: Option<String>,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Disable ANSI colors (log-friendly)
    #[arg(long, env = "INTRABOARD_NO_COLOR", global = true)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Show who finished the given projects
    Projects {
        /// Project slugs, comma separated
        #[arg(value_delimiter = ',', required = true)]
        projects: Vec<String>,
    },
    /// Show who finished every project of a cursus
    Cursus {
        /// Cursus slug
        #[arg(default_value = "42cursus")]
        cursus: String,
    },
    /// Show logtime per day
    Logtime {
        /// User logins, comma separated
        #[arg(value_delimiter = ',', required = true)]
        users: Vec<String>,
    },
    /// Show logtime of the current week
    Weektime {
        /// User logins, comma separated
        #[arg(value_delimiter = ',', required = true)]
        users: Vec<String>,
    },
    /// Write the effective settings (including flags) to the config file
    Init,
    /// Remove cached project lists, coalition members and the stored token
    ClearCache,
}

/// Everything a query command needs
struct App {
    client: Arc<ApiClient>,
    cache: DiskCache,
    settings: Settings,
    json: bool,
    no_color: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config_path = match cli.config {
        Some(path) => path,
        None => Settings::default_path()?,
    };
    let settings = Settings::load(&config_path)?.with_overrides(
        cli.client_id,
        cli.client_secret,
        cli.campus,
        cli.api_url,
    );
    let cache = DiskCache::new(DiskCache::default_dir()?)
        .with_ttl(settings.cache_ttl());

    match cli.command {
        Command::Init => {
            settings.save(&config_path)?;
            println!("Settings written to {}", config_path.display());
            return Ok(());
        }
        Command::ClearCache => {
            let removed = cache.clear()?;
            println!("Removed {} cached files from {}", removed, cache.dir().display());
            return Ok(());
        }
        _ => {}
    }

    let client = connect(&settings, &cache).await?;
    let ctx = App {
        client,
        cache,
        settings,
        json: cli.json,
        no_color: cli.no_color,
    };

    match cli.command {
        Command::Projects { projects } => run_projects(&ctx, &projects).await,
        Command::Cursus { cursus } => run_cursus(&ctx, &cursus).await,
        Command::Logtime { users } => run_logtime(&ctx, &users).await,
        Command::Weektime { users } => run_weektime(&ctx, &users).await,
        Command::Init | Command::ClearCache => Ok(()),
    }
}

/// Authenticate and build the shared, rate-limited client
async fn connect(settings: &Settings, cache: &DiskCache) -> Result<Arc<ApiClient>> {
    let credentials = settings.credentials()?;
    let http = reqwest::Client::new();
    let store = auth::TokenStore::in_dir(cache.dir());
    let token = auth::obtain_token(&store, &http, settings.api_url(), &credentials)
        .await
        .context("Failed to obtain access token")?;

    let config = ApiConfig::new(settings.api_url()).with_token(token.access_token);
    let limiter = Arc::new(RateLimiter::from_config(&config.rate_limit));
    let client = ApiClient::new(config, limiter).context("Failed to create API client")?;
    Ok(Arc::new(client))
}

async fn run_projects(ctx: &App, projects: &[String]) -> Result<()> {
    let index = coalition::load_index(
        &ctx.client,
        &ctx.cache,
        &ctx.settings.coalitions,
        ctx.settings.fallback_color,
    )
    .await?;

    let mut reports = Vec::with_capacity(projects.len());
    for slug in projects {
        let entries = ctx
            .client
            .project_users(slug, ctx.settings.campus_id)
            .await
            .with_context(|| format!("Failed to fetch completions of {slug}"))?;
        let report = report::ProjectReport::build(slug, &entries, &index);

        if !ctx.json {
            println!("{}", report::format_project_report(&report, &index, ctx.no_color));
        }
        reports.push(report);
    }

    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    }
    Ok(())
}

async fn run_cursus(ctx: &App, cursus: &str) -> Result<()> {
    let key = format!("projects-{cursus}");
    let slugs = match ctx.cache.load::<Vec<String>>(&key) {
        Some(slugs) => slugs,
        None => {
            let slugs: Vec<String> = ctx
                .client
                .cursus_projects(cursus)
                .await
                .with_context(|| format!("Failed to fetch projects of cursus {cursus}"))?
                .into_iter()
                .map(|project| project.slug)
                .collect();
            if let Err(e) = ctx.cache.store(&key, &slugs) {
                tracing::warn!("Could not cache projects of {}: {:#}", cursus, e);
            }
            slugs
        }
    };

    tracing::info!("Cursus {} has {} projects", cursus, slugs.len());
    run_projects(ctx, &slugs).await
}

/// Fetch and aggregate logtime of every user concurrently
///
/// Users share the client's rate limiter; results keep the input order and
/// the first fetch failure aborts the command.
async fn collect_day_logs(ctx: &App, users: &[String]) -> Result<Vec<(String, DayLog, DropReport)>> {
    let spinner = spinner(users.len(), ctx.json);
    let mut tasks = tokio::task::JoinSet::new();

    for (position, login) in users.iter().cloned().enumerate() {
        let client = Arc::clone(&ctx.client);
        tasks.spawn(async move {
            let records = client.user_locations(&login).await;
            (position, login, records)
        });
    }

    let mut logs = Vec::with_capacity(users.len());
    while let Some(joined) = tasks.join_next().await {
        let (position, login, records) = joined.context("Logtime task panicked")?;
        let records = records.with_context(|| format!("Failed to fetch locations of {login}"))?;
        let (log, drops) = day_log_from_locations(&records, chrono::Utc::now());
        if drops.has_drops() {
            tracing::warn!("{}: dropped {} malformed locations", login, drops.dropped_count());
        }
        spinner.inc(1);
        logs.push((position, login, log, drops));
    }
    spinner.finish_and_clear();

    logs.sort_by_key(|(position, ..)| *position);
    Ok(logs
        .into_iter()
        .map(|(_, login, log, drops)| (login, log, drops))
        .collect())
}

async fn run_logtime(ctx: &App, users: &[String]) -> Result<()> {
    let logs = collect_day_logs(ctx, users).await?;

    if ctx.json {
        let summaries: Vec<_> = logs
            .iter()
            .map(|(login, log, drops)| report::LogtimeSummary::new(login, log, drops))
            .collect();
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    for (login, log, _) in &logs {
        println!("{}", report::format_day_log(login, log, ctx.no_color));
    }
    Ok(())
}

async fn run_weektime(ctx: &App, users: &[String]) -> Result<()> {
    let logs = collect_day_logs(ctx, users).await?;

    if ctx.json {
        let summaries: Vec<_> = logs
            .iter()
            .map(|(login, log, drops)| report::LogtimeSummary::new(login, log, drops))
            .collect();
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    for (login, log, _) in &logs {
        println!("{}", report::format_week_total(login, log.week_total()));
    }
    Ok(())
}

fn spinner(len: usize, hidden: bool) -> indicatif::ProgressBar {
    use indicatif::{ProgressBar, ProgressStyle};

    if hidden || len < 2 {
        return ProgressBar::hidden();
    }

    let bar = ProgressBar::new(len as u64);
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {pos}/{len} {msg}") {
        bar.set_style(style);
    }
    bar.set_message("fetching locations");
    bar.enable_steady_tick(std::time::Duration::from_millis(80));
    bar
}
