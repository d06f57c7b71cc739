mod config;
mod error;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use catalog::ServiceKind;
use clap::{Parser, Subcommand, ValueEnum};
use relay::Relay;
use serde::Deserialize;
use serde_json::{Map, Value};
use sessions::EventKind;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::task::JoinSet;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use config::{Config, Overrides};
use error::{Error, Result};

const CONFIG_FILE: &str = "ub-relay.toml";

#[derive(Parser)]
#[command(name = "ub-relay")]
#[command(about = "Relay agent tool calls to a 3D modeling tool and a game-engine editor", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (defaults to ./ub-relay.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Modeling tool endpoint as host:port
    #[arg(long, global = true)]
    modeling: Option<String>,

    /// Engine editor endpoint as host:port
    #[arg(long, global = true)]
    engine: Option<String>,

    /// Expect the extended modeling add-on (default port 8401)
    #[arg(long, global = true)]
    extended: bool,

    /// Log filter, used when RUST_LOG is unset
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect to both services and print their status
    Status,
    /// List the tool catalog
    Tools {
        /// Only tools for this service
        #[arg(short, long)]
        service: Option<ServiceArg>,
        /// Print parameters and descriptions
        #[arg(short, long)]
        verbose: bool,
    },
    /// Dispatch one tool call and print the result envelope
    Call {
        /// Tool name, e.g. mcp_blender_get_scene_info
        tool: String,
        /// Arguments as a JSON object
        #[arg(short, long, default_value = "{}")]
        args: String,
    },
    /// Read JSON tool calls from stdin, one per line, and stream results to stdout
    Serve,
}

#[derive(Clone, Copy, ValueEnum)]
enum ServiceArg {
    Modeling,
    Engine,
}

impl From<ServiceArg> for ServiceKind {
    fn from(arg: ServiceArg) -> Self {
        match arg {
            ServiceArg::Modeling => ServiceKind::Modeling,
            ServiceArg::Engine => ServiceKind::Engine,
        }
    }
}

/// One line of `serve` input.
#[derive(Debug, Deserialize)]
struct ToolRequest {
    tool: String,
    #[serde(default)]
    arguments: Map<String, Value>,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    init_tracing(&config.log.level);

    let relay = Relay::from_config(&config.relay)?;
    debug!(config = ?config.relay, "configuration loaded");

    match cli.command {
        Commands::Status => cmd_status(&relay).await,
        Commands::Tools { service, verbose } => {
            cmd_tools(&relay, service.map(ServiceKind::from), verbose);
            Ok(())
        }
        Commands::Call { tool, args } => cmd_call(&relay, &tool, &args).await,
        Commands::Serve => cmd_serve(relay).await,
    }
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None if Path::new(CONFIG_FILE).exists() => Config::load(CONFIG_FILE)?,
        None => Config::default(),
    };
    config.apply(Overrides {
        modeling: cli.modeling.clone(),
        engine: cli.engine.clone(),
        extended: cli.extended,
        log_level: cli.log_level.clone(),
    })?;
    Ok(config)
}

/// Log to stderr so `serve` keeps stdout for protocol output.
fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn cmd_status(relay: &Relay) -> Result<()> {
    let report = relay.connect_all().await;
    println!("{}", serde_json::to_string_pretty(&report)?);
    relay.shutdown().await;
    Ok(())
}

fn cmd_tools(relay: &Relay, service: Option<ServiceKind>, verbose: bool) {
    let tools: Vec<_> = match service {
        Some(service) => relay.catalog().by_service(service).collect(),
        None => relay.catalog().iter().collect(),
    };

    for tool in tools {
        if verbose {
            println!("{}\n", tool.describe());
        } else {
            let summary = tool.description.split(". ").next().unwrap_or_default();
            println!("{:<36}  {:<8}  {summary}", tool.name, tool.service.as_str());
        }
    }
}

async fn cmd_call(relay: &Relay, tool: &str, args: &str) -> Result<()> {
    let arguments = match serde_json::from_str::<Value>(args)? {
        Value::Object(arguments) => arguments,
        other => return Err(Error::InvalidArguments(format!("expected a JSON object, got {other}"))),
    };

    let envelope = relay.handle_tool_call(tool, &arguments).await;
    println!("{}", serde_json::to_string_pretty(&envelope)?);
    relay.shutdown().await;
    Ok(())
}

async fn cmd_serve(relay: Relay) -> Result<()> {
    let relay = Arc::new(relay);
    let session = relay.open_session();
    let mut events = relay.sessions().take_receiver(session)?;

    let writer = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(event) = events.recv().await {
            let mut line = serde_json::to_vec(&event)?;
            line.push(b'\n');
            stdout.write_all(&line).await?;
            stdout.flush().await?;
        }
        Ok::<(), Error>(())
    });

    info!(session = %session, "serving tool calls on stdin");
    relay.push(
        session,
        EventKind::Notice {
            message: format!("session {session} ready"),
        },
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut calls = JoinSet::new();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<ToolRequest>(line) {
            Ok(request) => {
                let relay = Arc::clone(&relay);
                calls.spawn(async move {
                    relay
                        .handle_tool_call_in_session(session, &request.tool, &request.arguments)
                        .await;
                });
            }
            Err(e) => {
                relay.push(
                    session,
                    EventKind::Notice {
                        message: format!("invalid request: {e}"),
                    },
                );
            }
        }
    }

    while calls.join_next().await.is_some() {}
    relay.shutdown().await;
    writer.await.map_err(|e| Error::Io(std::io::Error::other(e)))?
}
