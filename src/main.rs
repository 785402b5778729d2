use anyhow::Context;
use biblioteca_kernel::{
    settings::{ServerSettings, Settings},
    InitCtx,
};
use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "biblioteca", version, about = "Books and authors HTTP API")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the HTTP API (default)
    Serve(ServeArgs),
    /// Load and validate the configuration, then exit
    CheckConfig,
}

#[derive(Debug, Default, Args)]
struct ServeArgs {
    /// Address to bind, overriding `server.host`
    #[arg(long)]
    host: Option<String>,
    /// Port to bind, overriding `server.port`
    #[arg(long)]
    port: Option<u16>,
}

impl ServeArgs {
    fn apply(self, server: &mut ServerSettings) {
        if let Some(host) = self.host {
            server.host = host;
        }
        if let Some(port) = self.port {
            server.port = port;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load().with_context(|| "failed to load biblioteca settings")?;
    biblioteca_telemetry::init(&settings.telemetry);

    if let Err(err) = settings.database.connection_string() {
        tracing::error!("{err}");
        std::process::exit(1);
    }

    match cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()))
    {
        Command::CheckConfig => {
            tracing::info!(
                env = ?settings.environment,
                database = %settings.database.name,
                bind = %settings.server.bind_address(),
                "configuration is valid"
            );
            Ok(())
        }
        Command::Serve(args) => {
            args.apply(&mut settings.server);
            serve(settings).await
        }
    }
}

async fn serve(settings: Settings) -> anyhow::Result<()> {
    tracing::info!(
        env = ?settings.environment,
        database = %settings.database.name,
        "biblioteca bootstrap starting"
    );

    let store = biblioteca_db::connect(&settings.database).await?;
    let registry = biblioteca::registry(store.clone())?;

    let ctx = InitCtx {
        settings: &settings,
    };
    registry.init_all(&ctx).await?;
    registry.start_all(&ctx).await?;

    let app = biblioteca_http::build_router(&registry, store.clone());
    let served = biblioteca_http::start_server(app, &settings.server, shutdown_signal()).await;

    registry.stop_all().await?;
    store.close().await;
    tracing::info!("biblioteca stopped");

    served
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("shutdown signal received"),
        Err(err) => {
            tracing::error!(error = %err, "unable to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    }
}
