//! template-docs binary - serves reference pages for Go template sources

use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use quarto_template_docs::{config::DocsConfig, server, source::DEFAULT_EXTENSIONS};

#[derive(Parser, Debug)]
#[command(name = "template-docs")]
#[command(about = "Browsable documentation for Go text/template sources")]
struct Args {
    /// Directory holding the template sources (defaults to current directory)
    #[arg(short, long)]
    dir: Option<PathBuf>,

    /// Template file extension, without the dot (can be specified multiple times).
    /// Defaults to gohtml.
    #[arg(short, long = "ext", value_name = "EXT")]
    extensions: Vec<String>,

    /// Port to listen on
    #[arg(short = 'P', long, default_value = "3000")]
    port: u16,

    /// Host to bind to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quarto_template_docs=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let directory = match args.dir {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    let extensions = if args.extensions.is_empty() {
        DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect()
    } else {
        args.extensions
    };

    info!(directory = %directory.display(), ?extensions, "Starting template-docs");

    let config = DocsConfig {
        host: args.host,
        port: args.port,
        directory,
        extensions,
    };

    server::run_server(config).await?;

    Ok(())
}
