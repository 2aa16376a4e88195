//! Folio - GraphQL query layer for site content.
//!
//! # Usage
//!
//! ```bash
//! # Serve a JSON fixture from memory
//! folio --fixture content.json --site-config site.json
//!
//! # Serve from PostgreSQL, importing a fixture first
//! DATABASE_URL=postgres://localhost/folio folio --fixture content.json
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use tokio::signal;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, fmt};
use url::Url;

use folio_core::metrics::init_metrics;
use folio_core::models::SiteConfig;
use folio_core::ports::{NodeStore, Repositories, RequestContext, RequestHook};
use folio_core::services::{ConnectionConfig, ConnectionResolver, NodeResolver};
use folio_graphql::{ServerConfig, build_schema, serve_with_shutdown};
use folio_routing::RewriteRouter;
use folio_storage::{Database, DatabaseConfig, MemoryStore, PgRepositories, SiteContent};

/// Folio CLI.
#[derive(Parser, Debug)]
#[command(name = "folio")]
#[command(about = "Folio - GraphQL query layer for site content")]
#[command(version)]
struct Cli {
    /// PostgreSQL database URL. Without it content is served from memory.
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// JSON content fixture (served from memory, or imported into PostgreSQL).
    #[arg(long, env = "FOLIO_FIXTURE")]
    fixture: Option<PathBuf>,

    /// JSON site configuration (permalinks, content types, taxonomies).
    #[arg(long, env = "FOLIO_SITE_CONFIG")]
    site_config: Option<PathBuf>,

    /// Public home URL; overrides the site configuration.
    #[arg(long, env = "HOME_URL")]
    home_url: Option<Url>,

    /// GraphQL server port.
    #[arg(long, env = "GRAPHQL_PORT", default_value = "4000")]
    graphql_port: u16,

    /// Prometheus metrics port.
    #[arg(long, env = "METRICS_PORT", default_value = "9090")]
    metrics_port: u16,

    /// Enable JSON log output.
    #[arg(long, env = "JSON_LOGS")]
    json_logs: bool,

    /// Run database migrations (and the fixture import, if any) and exit.
    #[arg(long)]
    migrate_only: bool,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,
}

/// Logs the routing context of every URI resolution.
struct TraceRequestHook;

impl RequestHook for TraceRequestHook {
    fn on_parse_request(&self, context: &RequestContext) {
        debug!(
            request = %context.request,
            rule = ?context.matched_rule,
            query_vars = ?context.query_vars,
            "Parse request"
        );
    }
}

/// The store behind both the connections and URI resolution.
struct Stores {
    repositories: Arc<dyn Repositories>,
    nodes: Arc<dyn NodeStore>,
    database: Option<Arc<Database>>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.json_logs);

    // Prometheus metrics exporter (optional - failures don't crash the app)
    let metrics_enabled = match format!("0.0.0.0:{}", cli.metrics_port).parse::<std::net::SocketAddr>() {
        Ok(metrics_addr) => {
            match PrometheusBuilder::new()
                .with_http_listener(metrics_addr)
                .install()
            {
                Ok(()) => {
                    init_metrics();
                    true
                }
                Err(e) => {
                    warn!("Failed to start metrics exporter: {}. Continuing without metrics.", e);
                    false
                }
            }
        }
        Err(e) => {
            warn!("Invalid metrics address: {}. Continuing without metrics.", e);
            false
        }
    };

    // ─────────────────────────────────────────────────────────────────────────
    // STARTUP
    // ─────────────────────────────────────────────────────────────────────────
    info!("Starting Folio");

    let site = Arc::new(load_site_config(cli.site_config.as_deref(), cli.home_url.clone())?);
    info!(
        home = %site.home_url,
        permalinks = site.permalink_structure.as_str(),
        post_types = site.post_types.len(),
        taxonomies = site.taxonomies.len(),
        "Site configuration loaded"
    );

    let content = cli
        .fixture
        .as_deref()
        .map(SiteContent::from_file)
        .transpose()
        .context("Failed to load content fixture")?;

    let stores = match cli.database_url.as_deref() {
        Some(database_url) => {
            debug!(database_url = %mask_password(database_url), "Database endpoint");
            let db = Database::connect(&DatabaseConfig::for_graphql(database_url))
                .await
                .context("Failed to connect to database")?;
            if !db.is_healthy().await {
                bail!("Database is not answering queries");
            }
            db.migrate().await.context("Failed to run migrations")?;

            let custom_roles = match &content {
                Some(content) => {
                    let stats = db.import(content).await.context("Failed to import fixture")?;
                    info!(
                        posts = stats.posts,
                        terms = stats.terms,
                        users = stats.users,
                        comments = stats.comments,
                        "Fixture imported"
                    );
                    content.roles.clone()
                }
                None => Vec::new(),
            };

            if cli.migrate_only {
                info!("--migrate-only flag set, exiting");
                db.close().await;
                return Ok(());
            }

            let db = Arc::new(db);
            let repositories = Arc::new(PgRepositories::new(db.clone(), site.clone(), custom_roles));
            Stores {
                repositories: repositories.clone(),
                nodes: repositories,
                database: Some(db),
            }
        }
        None => {
            if cli.migrate_only {
                bail!("--migrate-only requires --database-url");
            }
            if content.is_none() {
                warn!("No fixture given, serving an empty site");
            }
            let store = Arc::new(MemoryStore::new(site.clone(), content.unwrap_or_default()));
            Stores {
                repositories: store.clone(),
                nodes: store,
                database: None,
            }
        }
    };

    let router = RewriteRouter::new(&site).context("Failed to build rewrite rules")?;
    debug!(rules = router.rules().len(), "Rewrite rules ready");

    let resolver = NodeResolver::new(site.clone(), stores.nodes, Arc::new(router))
        .with_hook(Arc::new(TraceRequestHook));
    let connections = ConnectionResolver::new(ConnectionConfig::default());
    let schema = build_schema(stores.repositories, resolver, connections);

    // ─────────────────────────────────────────────────────────────────────────
    // READY
    // ─────────────────────────────────────────────────────────────────────────
    let graphql_config = ServerConfig {
        host: "0.0.0.0".to_string(),
        port: cli.graphql_port,
        enable_playground: true,
    };

    info!("Folio ready");
    info!("   GraphQL:  http://localhost:{}/graphql", cli.graphql_port);
    if metrics_enabled {
        info!("   Metrics:  http://localhost:{}/metrics", cli.metrics_port);
    } else {
        info!("   Metrics:  disabled");
    }
    info!("   Press Ctrl+C to stop");

    serve_with_shutdown(schema, graphql_config, shutdown_signal())
        .await
        .context("GraphQL server error")?;

    // ─────────────────────────────────────────────────────────────────────────
    // SHUTDOWN
    // ─────────────────────────────────────────────────────────────────────────
    if let Some(db) = stores.database {
        db.close().await;
    }
    info!("Shutdown complete");
    Ok(())
}

/// Site configuration from a JSON file, or the stock one.
fn load_site_config(path: Option<&Path>, home_url: Option<Url>) -> Result<SiteConfig> {
    let site = match path {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read site configuration {}", path.display()))?;
            let site: SiteConfig = serde_json::from_str(&json)
                .with_context(|| format!("Invalid site configuration {}", path.display()))?;
            site.ensure_builtins()
        }
        None => SiteConfig::default(),
    };

    Ok(match home_url {
        Some(home_url) => SiteConfig { home_url, ..site },
        None => site,
    })
}

/// Initialize tracing subscriber.
fn init_tracing(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if json {
        fmt().with_env_filter(filter).json().init();
    } else {
        fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .init();
    }
}

/// Mask password in database URL for logging.
fn mask_password(url_str: &str) -> String {
    match Url::parse(url_str) {
        Ok(mut url) => {
            if url.password().is_some() {
                let _ = url.set_password(Some("****"));
            }
            url.to_string()
        }
        Err(_) => url_str.to_string(),
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutting down...");
}
