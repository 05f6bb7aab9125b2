use clap::Parser;
use log::info;
use server::config::ServerConfig;
use server::network::Server;
use server::round::GeneratedQuestions;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the JSON server configuration
    #[arg(short, long)]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = ServerConfig::load(&args.config)?;

    info!(
        "Starting trivia server for {} players on port {}",
        config.players, config.port
    );
    let server = Server::bind(config, Box::new(GeneratedQuestions)).await?;

    server
        .run_until(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Received Ctrl+C, finishing game");
            }
        })
        .await?;

    Ok(())
}
