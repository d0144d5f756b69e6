use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use serving_console::api::{build_router, cors_layer, state::AppState};
use serving_console::client::{
    ExperimentQuery, MonitorApi, MonitorClient, PilotClient, RangeQuery, ServingApi,
    ServingClient,
};
use serving_console::config::AppConfig;
use serving_console::store::{init_query_range, ExperimentStore, InstanceStore};
use serving_console::window::SystemClock;

#[derive(Parser)]
#[command(name = "serving-console")]
#[command(about = "Console for LLM serving instances, load tests and monitoring")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./console.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the console API server
    Serve {
        /// Bind address
        #[arg(long)]
        host: Option<String>,

        /// Port number
        #[arg(long)]
        port: Option<u16>,
    },

    /// List serving instances
    Instances,

    /// List load tests
    Experiments {
        /// Only tests against this instance
        #[arg(long)]
        instance_id: Option<String>,

        #[arg(long, default_value = "1")]
        page: u32,

        #[arg(long, default_value = "10")]
        size: u32,
    },

    /// Print the default dashboard window
    Window {
        /// Selected load test
        #[arg(long)]
        test_id: Option<String>,

        /// Restrict the test lookup to this instance
        #[arg(long, requires = "test_id")]
        instance_id: Option<String>,

        /// Render in UTC instead of the local zone
        #[arg(long)]
        utc: bool,
    },

    /// Run a range query over the default dashboard window
    Query {
        /// PromQL expression
        query: String,

        /// Selected load test
        #[arg(long)]
        test_id: Option<String>,

        /// Restrict the test lookup to this instance
        #[arg(long, requires = "test_id")]
        instance_id: Option<String>,

        /// Query resolution
        #[arg(long, default_value = "15s")]
        step: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;

    let level = cli.log_level.clone().unwrap_or_else(|| config.log_level.clone());
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&level));

    let registry = tracing_subscriber::registry().with(filter);
    if cli.json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting serving-console v{}", env!("CARGO_PKG_VERSION"));

    let serving = Arc::new(ServingClient::new(&config.serving)?);

    match cli.command {
        Commands::Serve { host, port } => {
            let monitor = Arc::new(MonitorClient::new(&config.monitor)?);
            let pilot = Arc::new(PilotClient::new(&config.pilot)?);
            let state = AppState::new(serving, monitor, pilot, Arc::new(SystemClock));

            let app = build_router(state).layer(cors_layer(&config.server.cors_origin));
            let host = host.unwrap_or(config.server.host);
            let port = port.unwrap_or(config.server.port);
            let addr = format!("{}:{}", host, port);
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!("Console API: http://{}", addr);
            axum::serve(listener, app).await?;
        }
        Commands::Instances => {
            let instances = serving.list_instances().await?;
            for instance in &instances {
                println!(
                    "{}\t{}\t{}\t{}",
                    instance.instance_id,
                    instance.display_name(),
                    instance.deploy_status,
                    instance.exported_job()
                );
            }
            tracing::info!("{} instances", instances.len());
        }
        Commands::Experiments {
            instance_id,
            page,
            size,
        } => {
            let query = ExperimentQuery {
                instance_id,
                page,
                size,
                ..ExperimentQuery::default()
            };
            let result = serving.list_experiments(&query).await?;
            println!("{}", serde_json::to_string_pretty(&result.data)?);
            tracing::info!(
                "Page {}/{} ({} total)",
                result.page,
                result.total_page,
                result.total_num
            );
        }
        Commands::Window {
            test_id,
            instance_id,
            utc,
        } => {
            let experiments = load_selection(serving.as_ref(), test_id, instance_id).await?;
            let mut slots = InstanceStore::new();
            let window = if utc {
                init_query_range(&experiments, &SystemClock, &Utc, &mut slots)
            } else {
                init_query_range(&experiments, &SystemClock, &chrono::Local, &mut slots)
            };
            println!("{}\t{}", window.start, window.end);
        }
        Commands::Query {
            query,
            test_id,
            instance_id,
            step,
        } => {
            let experiments = load_selection(serving.as_ref(), test_id, instance_id).await?;
            let mut slots = InstanceStore::new();
            init_query_range(&experiments, &SystemClock, &chrono::Local, &mut slots);
            let chart = slots.chart_query();

            let monitor = MonitorClient::new(&config.monitor)?;
            let data = monitor
                .query_range(&RangeQuery {
                    query,
                    start: chart.start,
                    end: chart.end,
                    step,
                })
                .await?;
            println!("{}", serde_json::to_string_pretty(&data)?);
        }
    }

    Ok(())
}

/// Fetch tests (when one is selected) into a store with that selection.
async fn load_selection(
    serving: &dyn ServingApi,
    test_id: Option<String>,
    instance_id: Option<String>,
) -> Result<ExperimentStore> {
    let mut store = ExperimentStore::new();
    if let Some(test_id) = test_id {
        let query = ExperimentQuery {
            instance_id,
            test_id: Some(test_id.clone()),
            page: 1,
            size: 100,
            ..ExperimentQuery::default()
        };
        let page = serving.list_experiments(&query).await?;
        if page.data.iter().all(|e| e.test_id != test_id) {
            tracing::warn!("Test {} not found, using the default look-back", test_id);
        }
        store.replace(page.data);
        store.select(test_id);
    }
    Ok(store)
}
