use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use evaldesk::config::AppConfig;
use evaldesk::error::AppError;
use evaldesk::evaluations::memory::DEMO_EVALUATOR_EMAIL;
use evaldesk::evaluations::{
    evaluation_router, ConfiguredNotifier, EvaluationService, LevelAssignment, MemoryRepository,
    PrincipalClaims, RecordingNotifier, SaveAction,
};
use evaldesk::telemetry;
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
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
    name = "Evaldesk",
    about = "Run the employee performance-evaluation service from the command line",
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
    /// Run one evaluation cycle against the seeded demo store and print the report
    Demo(DemoArgs),
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
struct DemoArgs {
    /// Evaluation date (YYYY-MM-DD, defaults to today)
    #[arg(long, value_parser = parse_date)]
    date: Option<NaiveDate>,
    /// Leave the evaluation in draft instead of finalizing it
    #[arg(long)]
    draft: bool,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => run_server(args).await?,
        Command::Demo(args) => run_demo(args)?,
    }
    Ok(())
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
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

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let state = AppState {
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
    };

    // No external data store is wired in this build; the engine runs on the
    // mutex-guarded fallback store. Activation requests are refused until
    // ACTIVATION_FLOW_URL is set, then recorded by the in-process transport.
    let repository = Arc::new(MemoryRepository::seeded());
    let notifier = Arc::new(ConfiguredNotifier::new(
        config.workflow.activation_flow_url.clone(),
        RecordingNotifier::default(),
    ));
    let service = Arc::new(EvaluationService::new(repository, notifier));

    let app = Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .with_state(state)
        .merge(evaluation_router(service))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "evaluation service ready");

    axum::serve(listener, app).await?;
    Ok(())
}

fn run_demo(args: DemoArgs) -> Result<(), Box<dyn std::error::Error>> {
    let repository = Arc::new(MemoryRepository::seeded());
    let notifier = Arc::new(RecordingNotifier::default());
    let service = EvaluationService::new(repository, notifier);

    let claims = PrincipalClaims::new().with_claim("preferred_username", DEMO_EVALUATOR_EMAIL);
    let evaluator = service.current_evaluator(&claims)?;

    let employees = service.employees_for(&evaluator, None)?;
    let employee = employees
        .iter()
        .find(|candidate| candidate.form_type.is_some())
        .ok_or("seed data has no employee with a form type")?;

    let level = match service.level_assignment(&employee.id)? {
        LevelAssignment::Auto { level } => level,
        LevelAssignment::Manual { levels } => levels
            .into_iter()
            .next()
            .ok_or("seed data has no active levels")?,
    };

    let date = args.date.unwrap_or_else(|| Local::now().date_naive());
    let mut form = service.new_form(&employee.id, &level.id, None, date)?;

    let sample_scores: [u8; 4] = [88, 72, 95, 64];
    let mut slot_index = 0usize;
    for section in &mut form.competencies {
        for slot in &mut section.behaviors {
            slot.score = Some(sample_scores[slot_index % sample_scores.len()]);
            slot_index += 1;
        }
    }
    form.observations = Some("Demo evaluation cycle.".to_string());

    let action = if args.draft {
        SaveAction::Draft
    } else {
        SaveAction::Finalize
    };
    let evaluation_id = service.save(&evaluator, form, action)?;

    let report = service.report(&evaluation_id)?;

    println!("Evaluation report demo");
    println!(
        "{} ({}) | level {} | evaluated {} | state {}",
        report.employee_name,
        report.document_id,
        report.level_name,
        report.evaluated_on,
        report.state.label()
    );

    println!("\nCompetency averages");
    for competency in &report.competencies {
        println!("- {}: {:.2}", competency.name, competency.average);
        for behavior in &competency.behaviors {
            match behavior.score {
                Some(score) => println!("    {} -> {}", behavior.description, score),
                None => println!("    {} -> (unscored)", behavior.description),
            }
        }
    }

    match report.overall_average {
        Some(average) => println!("\nOverall average: {average:.2}"),
        None => println!("\nOverall average: n/a"),
    }

    if report.improvement_opportunities.is_empty() {
        println!("\nImprovement opportunities: none");
    } else {
        println!("\nImprovement opportunities");
        for opportunity in &report.improvement_opportunities {
            println!(
                "- [{}] {}: {}",
                opportunity.competency, opportunity.behavior, opportunity.score
            );
        }
    }

    if let Some(next) = report.next_evaluation_on {
        println!("\nNext evaluation scheduled for {next}");
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
