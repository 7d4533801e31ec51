use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use finsuite::api::{AppState, run_http_server};
use finsuite::content::InMemoryContent;
use finsuite::logging::init_logger;

#[derive(Parser, Debug)]
#[command(
    name = "finsuite",
    version,
    about = "Personal finance calculators (SIP, SWP, RD, EMI, inflation, net worth, tax) over HTTP"
)]
struct Cli {
    #[arg(short, long, global = true, help = "Enable debug logging")]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the calculator API
    Serve {
        #[arg(long, default_value = "0.0.0.0")]
        host: IpAddr,
        #[arg(long, default_value_t = 8080)]
        port: u16,
        #[arg(
            long,
            help = "Directory with glossary.json and blog.json; defaults to the bundled content"
        )]
        content_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    match cli.command {
        Command::Serve {
            host,
            port,
            content_dir,
        } => {
            let content = match &content_dir {
                Some(dir) => InMemoryContent::from_dir(dir)
                    .with_context(|| format!("loading content from {}", dir.display()))?,
                None => InMemoryContent::embedded().context("loading bundled content")?,
            };
            match &content_dir {
                Some(dir) => tracing::info!("content loaded from {}", dir.display()),
                None => tracing::info!("bundled content loaded"),
            }

            let addr = SocketAddr::new(host, port);
            run_http_server(addr, AppState::new(Arc::new(content)))
                .await
                .context("server error")?;
        }
    }

    Ok(())
}
