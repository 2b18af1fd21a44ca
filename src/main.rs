use anyhow::{Context, Result};
use chat_proxy_rs::constants::defaults;
use chat_proxy_rs::telemetry::{self, LogFormat};
use chat_proxy_rs::{ChatBackend, ChatClient, HttpUpstream, ProxyGateway, ProxyOptions, server};
use clap::{Args, Parser, Subcommand};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use url::Url;

#[derive(Parser, Debug)]
#[command(name = "chat-proxy")]
#[command(author, version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    serve: ServeArgs,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the gateway (default)
    Serve(ServeArgs),
    /// Send one query through a running gateway and print the answer
    Ask(AskArgs),
}

#[derive(Args, Debug, Clone)]
struct ServeArgs {
    /// Address to listen on
    #[arg(long, env = "PROXY_BIND", default_value = defaults::BIND_ADDR)]
    bind: String,

    /// Route the gateway is mounted on
    #[arg(long, env = "PROXY_PATH", default_value = defaults::PROXY_PATH)]
    path: String,
}

#[derive(Args, Debug)]
struct AskArgs {
    /// The question to send
    query: String,

    /// Gateway endpoint
    #[arg(long, default_value = "http://127.0.0.1:8888/.netlify/functions/ai-proxy")]
    endpoint: Url,

    /// Origin header to present
    #[arg(long, default_value = defaults::LOCAL_ORIGINS[0])]
    origin: String,

    #[arg(long, default_value_t = defaults::CLIENT_TIMEOUT.as_secs())]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    telemetry::init(LogFormat::from_env()).context("failed to initialise logging")?;

    let cli = Cli::parse();
    match cli.command {
        Some(Command::Ask(args)) => ask(args).await,
        Some(Command::Serve(args)) => serve(args).await,
        None => serve(cli.serve).await,
    }
}

async fn serve(args: ServeArgs) -> Result<()> {
    let options = ProxyOptions::from_env().context("invalid proxy configuration")?;
    if options.upstream_target().is_none() {
        warn!("BACKEND_URL or API_KEY unset; authorized requests will get 500");
    }

    let upstream =
        HttpUpstream::new(options.upstream_timeout).context("failed to build HTTP client")?;
    let gateway = ProxyGateway::new(options, Arc::new(upstream))
        .context("invalid proxy configuration")?;

    let listener = TcpListener::bind(&args.bind)
        .await
        .with_context(|| format!("failed to bind {}", args.bind))?;
    info!(addr = %args.bind, path = %args.path, "chat proxy listening");

    server::serve(listener, Arc::new(gateway), &args.path)
        .await
        .context("server error")
}

async fn ask(args: AskArgs) -> Result<()> {
    let client = ChatClient::new(args.endpoint)
        .context("failed to build HTTP client")?
        .with_origin(args.origin)
        .with_timeout(Duration::from_secs(args.timeout_secs));

    match client.ask(&args.query, &CancellationToken::new()).await {
        Ok(answer) => println!("{answer}"),
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(1);
        }
    }
    Ok(())
}
