use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use clap::{Args, Parser, Subcommand};
use lead_insight::analysis::ai::{CompletionOptions, HttpCompletionProvider};
use lead_insight::analysis::directory::{HttpClientDirectory, OfflineDirectory};
use lead_insight::analysis::router::analysis_router;
use lead_insight::analysis::scoring::ScoringConfig;
use lead_insight::analysis::{AnalysisResult, AnalysisService};
use lead_insight::config::{AppConfig, TelemetryConfig};
use lead_insight::error::AppError;
use lead_insight::telemetry;
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
struct AppState {
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
}

#[derive(Parser, Debug)]
#[command(
    name = "Lead Insight",
    about = "Score CRM clients into an explainable, ranked contact queue",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Run the deterministic analysis on a raw record read from a JSON file
    Analyze(AnalyzeArgs),
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Args, Debug)]
struct AnalyzeArgs {
    /// Path to a JSON file holding the raw client record
    #[arg(long)]
    file: PathBuf,
    /// Evaluation date for recency arithmetic (YYYY-MM-DD, defaults to today)
    #[arg(long, value_parser = parse_date)]
    now: Option<NaiveDate>,
    /// Emit the full result as JSON instead of the readable summary
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => run_server(args).await,
        Command::Analyze(args) => run_analyze(args).await,
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

fn evaluation_instant(date: Option<NaiveDate>) -> DateTime<Utc> {
    match date {
        Some(date) => Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)),
        None => Utc::now(),
    }
}

fn build_service(config: &AppConfig) -> Result<AnalysisService<HttpClientDirectory>, AppError> {
    let directory = HttpClientDirectory::new(&config.upstream)
        .map_err(lead_insight::analysis::AnalysisError::from)?;
    let mut service = AnalysisService::new(Arc::new(directory), ScoringConfig::default());

    if let Some(ai) = &config.ai {
        let options = CompletionOptions {
            max_tokens: ai.max_tokens,
            temperature: ai.temperature,
        };
        let provider = HttpCompletionProvider::new(ai.clone()).map_err(|err| {
            std::io::Error::new(std::io::ErrorKind::Other, err.to_string())
        })?;
        service = service.with_provider(Arc::new(provider), options);
        info!(model = %ai.model, "AI enrichment enabled");
    } else {
        info!("no AI credential configured; running deterministic-only");
    }

    Ok(service)
}

async fn run_server(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let service = Arc::new(build_service(&config)?);

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let state = AppState {
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
    };

    let app = Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .with_state(state)
        .merge(analysis_router(service))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "lead insight service ready");

    axum::serve(listener, app).await?;
    Ok(())
}

async fn run_analyze(args: AnalyzeArgs) -> Result<(), AppError> {
    let AnalyzeArgs { file, now, json } = args;

    let contents = std::fs::read_to_string(&file)?;
    let raw: serde_json::Value = serde_json::from_str(&contents).map_err(|err| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("{} is not valid JSON: {err}", file.display()),
        )
    })?;

    // Normalizer drop warnings are only visible once the subscriber
    // is installed.
    telemetry::init(&TelemetryConfig {
        log_level: "info".to_string(),
    })?;

    let now = evaluation_instant(now);

    // Offline mode is deterministic-only and never fetches.
    let service = AnalysisService::new(Arc::new(OfflineDirectory), ScoringConfig::default());

    let client_id = raw
        .get("id")
        .and_then(serde_json::Value::as_str)
        .unwrap_or("(sans id)")
        .to_string();
    let result = service.analyze_fetched(&client_id, &raw, now).await;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&result).map_err(|err| std::io::Error::new(
                std::io::ErrorKind::Other,
                err.to_string()
            ))?
        );
    } else {
        render_analysis(&client_id, &result);
    }

    Ok(())
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

fn render_analysis(client_id: &str, result: &AnalysisResult) {
    println!("Analyse du client {client_id}");
    println!(
        "Score: {}/100 | catégorie {:?} | priorité {:?}",
        result.score, result.category, result.priority
    );
    println!("\nRaisonnement\n{}", result.reasoning);

    if result.strengths.is_empty() {
        println!("\nForces: aucune détectée");
    } else {
        println!("\nForces");
        for strength in &result.strengths {
            println!("- {strength}");
        }
    }

    if result.weaknesses.is_empty() {
        println!("\nFaiblesses: aucune détectée");
    } else {
        println!("\nFaiblesses");
        for weakness in &result.weaknesses {
            println!("- {weakness}");
        }
    }

    println!("\nRecommandations");
    println!("- Immédiat: {}", result.recommendations.immediate);
    println!("- Court terme: {}", result.recommendations.short_term);
    println!("- Long terme: {}", result.recommendations.long_term);

    println!("\nRisque: {:?}", result.risk_assessment.level);
    for factor in &result.risk_assessment.factors {
        println!("- {factor}");
    }
    println!("Mitigation: {}", result.risk_assessment.mitigation);

    println!(
        "\nProchaine étape: {} ({}, responsable: {})",
        result.next_steps.action, result.next_steps.timeframe, result.next_steps.responsible
    );
    println!("Critère de succès: {}", result.next_steps.success_metrics);
}
