use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use procurement_core::client::ApiClient;
use procurement_core::domain::prediction::TimingModelRequest;
use procurement_core::domain::status::ScrapeRequest;
use procurement_core::scraper::ScraperClient;
use procurement_core::search::{SearchFilters, SearchSession};

mod render;

#[derive(Debug, Parser)]
#[command(name = "procurement_cli")]
struct Args {
    /// Print shaped results as JSON instead of text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Check that the prediction backend answers.
    Health,

    /// Search procurement plans and published awards.
    Search {
        #[arg(long)]
        keyword: Option<String>,
        #[arg(long)]
        agency: Option<String>,
        #[arg(long)]
        procurement_method: Option<String>,
        #[arg(long)]
        fiscal_quarter: Option<String>,
        #[arg(long)]
        job_titles: Option<String>,
        /// Repeatable.
        #[arg(long = "fiscal-year")]
        fiscal_years: Vec<String>,
        #[arg(long, default_value_t = 1)]
        plan_page: u32,
        #[arg(long, default_value_t = 1)]
        award_page: u32,
    },

    /// Timing, contract size and competitor analysis for one plan.
    Plan { plan_id: String },

    /// Budget breakdown for one agency.
    Agency { name: String },

    /// Filter dropdown options, optionally scoped to fiscal years.
    Filters {
        #[arg(long = "fiscal-year")]
        fiscal_years: Vec<String>,
    },

    /// Kick off an awards scraper run.
    Scrape {
        #[arg(long, default_value_t = 20)]
        pages: u32,
        #[arg(long)]
        force: bool,
    },

    /// Run the timing model on ad-hoc inputs.
    Predict {
        #[arg(long)]
        agency: String,
        #[arg(long)]
        fiscal_quarter: String,
        #[arg(long)]
        procurement_method: String,
        /// YYYY-MM-DD
        #[arg(long)]
        start_date: String,
        /// YYYY-MM-DD
        #[arg(long)]
        end_date: String,
        #[arg(long, default_value_t = 1)]
        headcount: u32,
        #[arg(long, default_value = "")]
        services_description: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = procurement_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();
    let client = ApiClient::from_settings(&settings)?;

    let res = run(args, &client, &settings).await;
    if let Err(err) = &res {
        sentry_anyhow::capture_anyhow(err);
    }
    res
}

async fn run(
    args: Args,
    client: &ApiClient,
    settings: &procurement_core::config::Settings,
) -> anyhow::Result<()> {
    let json = args.json;
    match args.command {
        Command::Health => {
            let health = client.health().await.context("backend health check failed")?;
            emit(json, &health, render::health)
        }
        Command::Search {
            keyword,
            agency,
            procurement_method,
            fiscal_quarter,
            job_titles,
            fiscal_years,
            plan_page,
            award_page,
        } => {
            let mut session = SearchSession::new(SearchFilters {
                keyword,
                agency,
                procurement_method,
                fiscal_quarter,
                job_titles,
                fiscal_years,
            });
            session.set_plan_page(plan_page);
            session.set_award_page(award_page);

            let result = session.run(client).await;
            emit(json, &result, render::search)
        }
        Command::Plan { plan_id } => {
            let analysis = procurement_core::analysis::analyze_plan(
                client,
                &plan_id,
                settings.history_mode(),
            )
            .await
            .with_context(|| format!("plan analysis failed for {plan_id}"))?;
            emit(json, &analysis, render::plan)
        }
        Command::Agency { name } => {
            let report = client
                .agency_analysis(&name)
                .await
                .with_context(|| format!("agency analysis failed for {name}"))?;
            emit(json, &report, render::agency)
        }
        Command::Filters { fiscal_years } => {
            let options = procurement_core::search::load_filter_options(client, &fiscal_years).await;
            emit(json, &options, render::filters)
        }
        Command::Scrape { pages, force } => {
            let scraper = ScraperClient::from_settings(settings)?;
            let outcome = scraper
                .trigger(&ScrapeRequest {
                    pages,
                    force_run: force,
                })
                .await;
            emit(json, &outcome, render::scrape)
        }
        Command::Predict {
            agency,
            fiscal_quarter,
            procurement_method,
            start_date,
            end_date,
            headcount,
            services_description,
        } => {
            let req = TimingModelRequest {
                agency,
                fiscal_quarter,
                procurement_method,
                start_date,
                end_date,
                headcount,
                services_description,
            };
            let prediction = client
                .predict_timing(&req)
                .await
                .context("timing model prediction failed")?;
            emit(json, &prediction, render::prediction)
        }
    }
}

fn emit<T: Serialize>(json: bool, value: &T, text: fn(&T) -> String) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        print!("{}", text(value));
    }
    Ok(())
}

fn init_sentry(settings: &procurement_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
