use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use procurement_core::analysis::PlanAnalysis;
use procurement_core::client::error::ApiError;
use procurement_core::client::ApiClient;
use procurement_core::domain::agency::AgencyAnalysisResponse;
use procurement_core::domain::procurement::{AwardRecord, Page, ProcurementRecord};
use procurement_core::domain::status::{HealthStatus, ScrapeOutcome, ScrapeRequest};
use procurement_core::scraper::ScraperClient;
use procurement_core::search::{FilterOptions, SearchFilters, SearchSession};
use procurement_core::vendors::HistoryMode;
use procurement_core::view::Panel;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = procurement_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let client = ApiClient::from_settings(&settings)?;
    let scraper = ScraperClient::from_settings(&settings)?;
    let history = settings.history_mode();
    if history != HistoryMode::Reported {
        tracing::warn!(?history, "competitor history columns are simulated");
    }

    tracing::info!(
        backend = client.base_url(),
        scraper = scraper.base_url(),
        cache_ttl_secs = client.cache().ttl().num_seconds(),
        "backend configured"
    );

    let state = AppState {
        client,
        scraper,
        history,
    };

    let app = router(state);

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, "api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/backend/health", get(backend_health))
        .route("/plans/:plan_id/analysis", get(get_plan_analysis))
        .route("/search", post(search))
        .route("/filters", get(get_filters))
        .route("/agencies/:name/analysis", get(get_agency_analysis))
        .route("/scrape", post(trigger_scrape))
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Debug, Clone)]
struct AppState {
    client: ApiClient,
    scraper: ScraperClient,
    history: HistoryMode,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

type HandlerError = (StatusCode, Json<ErrorBody>);

fn status_for(err: &ApiError) -> StatusCode {
    match err {
        ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        ApiError::Http { status, .. } => StatusCode::from_u16(*status)
            .ok()
            .filter(|s| s.is_client_error())
            .unwrap_or(StatusCode::BAD_GATEWAY),
        ApiError::Unreachable { .. } | ApiError::Decode { .. } => StatusCode::BAD_GATEWAY,
    }
}

fn reject(err: ApiError) -> HandlerError {
    let status = status_for(&err);
    if status.is_server_error() {
        let report = anyhow::Error::new(err.clone());
        sentry_anyhow::capture_anyhow(&report);
        tracing::error!(error = %err, "backend call failed");
    }
    (
        status,
        Json(ErrorBody {
            error: err.to_string(),
        }),
    )
}

async fn backend_health(
    State(state): State<AppState>,
) -> Result<Json<HealthStatus>, HandlerError> {
    state.client.health().await.map(Json).map_err(reject)
}

async fn get_plan_analysis(
    State(state): State<AppState>,
    Path(plan_id): Path<String>,
) -> Result<Json<PlanAnalysis>, HandlerError> {
    procurement_core::analysis::analyze_plan(&state.client, &plan_id, state.history)
        .await
        .map(Json)
        .map_err(reject)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
enum SearchSource {
    #[default]
    Both,
    Plans,
    Awards,
}

#[derive(Debug, Deserialize)]
struct SearchBody {
    #[serde(flatten)]
    filters: SearchFilters,
    #[serde(default)]
    plan_page: Option<u32>,
    #[serde(default)]
    award_page: Option<u32>,
    #[serde(default)]
    source: SearchSource,
}

#[derive(Debug, Serialize)]
struct SearchResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    plans: Option<Panel<Page<ProcurementRecord>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    awards: Option<Panel<Page<AwardRecord>>>,
}

async fn search(State(state): State<AppState>, Json(body): Json<SearchBody>) -> Json<SearchResponse> {
    let mut session = SearchSession::new(body.filters);
    session.set_plan_page(body.plan_page.unwrap_or(1));
    session.set_award_page(body.award_page.unwrap_or(1));

    let response = match body.source {
        SearchSource::Both => {
            let result = session.run(&state.client).await;
            SearchResponse {
                plans: Some(result.plans),
                awards: Some(result.awards),
            }
        }
        SearchSource::Plans => SearchResponse {
            plans: Some(session.fetch_plans(&state.client).await),
            awards: None,
        },
        SearchSource::Awards => SearchResponse {
            plans: None,
            awards: Some(session.fetch_awards(&state.client).await),
        },
    };
    Json(response)
}

async fn get_filters(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Json<FilterOptions> {
    let fiscal_years: Vec<String> = params
        .into_iter()
        .filter(|(k, _)| k == "fiscal_years")
        .map(|(_, v)| v)
        .collect();
    Json(procurement_core::search::load_filter_options(&state.client, &fiscal_years).await)
}

async fn get_agency_analysis(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<AgencyAnalysisResponse>, HandlerError> {
    state
        .client
        .agency_analysis(&name)
        .await
        .map(Json)
        .map_err(reject)
}

async fn trigger_scrape(
    State(state): State<AppState>,
    body: Option<Json<ScrapeRequest>>,
) -> Json<ScrapeOutcome> {
    let req = body.map(|Json(r)| r).unwrap_or_default();
    Json(state.scraper.trigger(&req).await)
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
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
