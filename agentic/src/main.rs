use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use clap::{Parser, Subcommand};
use medisense::{bootstrap, cli, handlers, SERVICE_NAME};
use medisense_config::AppConfig;
use medisense_observability::{init_tracing, observability, TracingConfig};
use tokio::io::BufReader;

#[derive(Parser)]
#[command(name = "medisense", about = "Symptom chatbot backed by a medical knowledge graph and PubMed")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Default)]
enum Command {
    /// Serve the web chat and JSON API (default)
    #[default]
    Serve,
    /// Chat in the terminal
    Cli,
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    let config = AppConfig::from_env()?;

    init_tracing(TracingConfig::for_service(SERVICE_NAME));
    tracing::info!("Starting MediSense");

    let runtime = bootstrap::build(&config).await?;

    let result = match args.command.unwrap_or_default() {
        Command::Serve => serve(&config, &runtime).await,
        Command::Cli => cli::run_chat_loop(
            &runtime.orchestrator,
            BufReader::new(tokio::io::stdin()),
            tokio::io::stdout(),
        )
        .await
        .map_err(anyhow::Error::from),
    };

    runtime.shutdown();
    result
}

async fn serve(config: &AppConfig, runtime: &bootstrap::Runtime) -> anyhow::Result<()> {
    let orchestrator = web::Data::new(runtime.orchestrator.clone());
    let host = config.server.host.clone();
    let port = config.server.port;

    tracing::info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header();

        App::new()
            .app_data(orchestrator.clone())
            .wrap(cors)
            .wrap(observability(SERVICE_NAME))
            .configure(handlers::configure)
    })
    .bind((host.as_str(), port))?
    .run()
    .await?;

    Ok(())
}
