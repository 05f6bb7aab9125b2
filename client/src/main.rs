use clap::Parser;
use client::config::ClientConfig;
use client::input::{spawn_stdin_reader, Command};
use client::network::{Client, SessionOutcome};
use log::info;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the JSON client configuration
    #[arg(short, long)]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    let config = ClientConfig::load(&args.config)?;
    info!(
        "Starting client as {} in {:?} mode",
        config.username, config.client_mode
    );

    let mut lines = spawn_stdin_reader();
    loop {
        println!("Type CONNECT <host>:<port> to join a game, or EXIT");
        let Some(line) = lines.recv().await else {
            break;
        };

        match Command::parse(&line) {
            Command::Connect(addr) => {
                let mut client = match Client::connect(&addr, &config).await {
                    Ok(client) => client,
                    Err(e) => {
                        eprintln!("{}", e);
                        continue;
                    }
                };
                match client.play(&mut lines).await {
                    Ok(SessionOutcome::Exit) => break,
                    Ok(SessionOutcome::Finished | SessionOutcome::Disconnected) => {}
                    Err(e) => eprintln!("Connection lost: {}", e),
                }
            }
            Command::Exit => break,
            Command::Disconnect => println!("Not connected"),
            Command::Text(_) => {}
        }
    }

    Ok(())
}
