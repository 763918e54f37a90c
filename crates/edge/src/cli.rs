// crates/edge/src/cli.rs

use crate::{settings, Result};
use adapt::{build_app, PreviewGate};
use axum::Router;
use chrono::Utc;
use clap::{builder::ValueHint, Parser, Subcommand};
use domain::setting::Settings;
use serve::content::HttpContentClient;
use serve::site::Site;
use std::io::Write;
use std::net::SocketAddr;
use std::{path::PathBuf, process::ExitCode, sync::Arc};
use tokio::net::TcpListener;
use tracing::{error, info};

/// Entry point for the `storysite` binary.
#[tokio::main(flavor = "multi_thread")]
#[tracing::instrument(skip_all)]
pub async fn start() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve(args) => do_serve(args).await,
        Commands::StaticParams(args) => do_static_params(args).await,
        Commands::Sitemap(args) => do_sitemap(args).await,
    };

    result.map_or_else(
        |e| {
            error!("storysite failed: {e}");
            eprintln!("storysite: {e}");
            ExitCode::FAILURE
        },
        |_| ExitCode::SUCCESS,
    )
}

#[derive(Parser, Debug)]
#[command(name = "storysite", version, about = "Server-rendered site over a headless CMS")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server
    Serve(ConfigArgs),
    /// Print every `{slug, locale}` to pre-render as JSON
    StaticParams(ConfigArgs),
    /// Print the sitemap XML
    Sitemap(ConfigArgs),
}

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Settings file (or set STORYSITE_CONFIG); defaults to ./storysite.toml when present
    #[arg(
        long,
        value_name = "FILE",
        env = "STORYSITE_CONFIG",
        value_hint = ValueHint::FilePath
    )]
    pub config: Option<PathBuf>,
}

#[tracing::instrument(skip_all)]
async fn do_serve(args: ConfigArgs) -> Result<()> {
    let then = Utc::now();
    let process = StartProcess::<CommandIssued>::parse_settings(args)?;
    info!(
        "Settings parsed in {} milliseconds",
        Utc::now().timestamp_millis() - then.timestamp_millis()
    );

    let then = Utc::now();
    let process = process.assemble_site()?;
    info!(
        "Site assembled in {} milliseconds",
        Utc::now().timestamp_millis() - then.timestamp_millis()
    );

    let then = Utc::now();
    let process = process.register_routes();
    info!(
        "Routes registered in {} milliseconds",
        Utc::now().timestamp_millis() - then.timestamp_millis()
    );

    let then = Utc::now();
    let process = process.bind().await?;
    info!(
        "Listener bound in {} milliseconds",
        Utc::now().timestamp_millis() - then.timestamp_millis()
    );

    process.serve_until_shutdown().await
}

#[tracing::instrument(skip_all)]
async fn do_static_params(args: ConfigArgs) -> Result<()> {
    let site = StartProcess::<CommandIssued>::parse_settings(args)?
        .assemble_site()?
        .state
        .site;

    let params = site.static_params().await?;
    let json = serde_json::to_string_pretty(&params)?;
    writeln!(std::io::stdout().lock(), "{json}")?;
    Ok(())
}

#[tracing::instrument(skip_all)]
async fn do_sitemap(args: ConfigArgs) -> Result<()> {
    let site = StartProcess::<CommandIssued>::parse_settings(args)?
        .assemble_site()?
        .state
        .site;

    let xml = site.sitemap_xml().await?;
    write!(std::io::stdout().lock(), "{xml}")?;
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Start process state machine
// ─────────────────────────────────────────────────────────────────────────────

trait ProcessState {}

struct CommandIssued;

struct SettingsLoaded {
    settings: Settings,
}

struct SiteAssembled {
    settings: Settings,
    site: Arc<Site>,
}

struct RouterCreated {
    settings: Settings,
    router: Router,
}

struct Listening {
    listener: TcpListener,
    router: Router,
}

impl ProcessState for CommandIssued {}
impl ProcessState for SettingsLoaded {}
impl ProcessState for SiteAssembled {}
impl ProcessState for RouterCreated {}
impl ProcessState for Listening {}

struct StartProcess<S: ProcessState> {
    state: S,
}

impl StartProcess<CommandIssued> {
    #[tracing::instrument(skip_all)]
    fn parse_settings(args: ConfigArgs) -> Result<StartProcess<SettingsLoaded>> {
        let settings = settings::load(args.config.as_deref())?;
        Ok(StartProcess {
            state: SettingsLoaded { settings },
        })
    }
}

impl StartProcess<SettingsLoaded> {
    /// Content client, response cache, templates, and translations.
    #[tracing::instrument(skip_all)]
    fn assemble_site(self) -> Result<StartProcess<SiteAssembled>> {
        let settings = self.state.settings;
        let client = HttpContentClient::new(&settings.content)?;
        let cache = client.cache().clone();
        let site = Site::new(&settings, Arc::new(client), cache)?;

        Ok(StartProcess {
            state: SiteAssembled {
                settings,
                site: Arc::new(site),
            },
        })
    }
}

impl StartProcess<SiteAssembled> {
    #[tracing::instrument(skip_all)]
    fn register_routes(self) -> StartProcess<RouterCreated> {
        if self.state.settings.preview.secret.is_none() {
            info!("no preview secret configured, draft mode is disabled");
        }
        let gate = PreviewGate::new(self.state.settings.preview.secret.clone());
        let router = build_app(self.state.site, gate);

        StartProcess {
            state: RouterCreated {
                settings: self.state.settings,
                router,
            },
        }
    }
}

impl StartProcess<RouterCreated> {
    #[tracing::instrument(skip_all)]
    async fn bind(self) -> Result<StartProcess<Listening>> {
        let server = &self.state.settings.server;
        let addr = SocketAddr::new(server.ip, server.port);
        let listener = TcpListener::bind(addr).await?;
        info!("Listening on http://{}", listener.local_addr()?);

        Ok(StartProcess {
            state: Listening {
                listener,
                router: self.state.router,
            },
        })
    }
}

impl StartProcess<Listening> {
    #[tracing::instrument(skip_all)]
    async fn serve_until_shutdown(self) -> Result<()> {
        axum::serve(self.state.listener, self.state.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        info!("server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("unable to listen for ctrl-c: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("unable to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received, draining connections");
}
