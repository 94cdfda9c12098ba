mod cli;
mod config;
mod telemetry;

use anyhow::Result;
use clap::Parser;
use client::{ClientError, RconClient};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::info;

use crate::cli::CliArgs;
use crate::config::ConsoleConfig;

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();
    let config = ConsoleConfig::resolve(&args)?;
    let _log_guard = telemetry::init_tracing(
        config.log_dir.as_deref(),
        &config.log_file,
        &config.log_level,
    );

    info!(addr = %config.server.addr(), "Connecting to RCON server");
    let client = RconClient::connect(config.server).await?;

    if let Some(command) = &args.command {
        let output = client.execute(command).await?;
        if !output.is_empty() {
            println!("{output}");
        }
        client.close().await;
        return Ok(());
    }

    run_console(&client).await?;
    client.close().await;
    Ok(())
}

async fn run_console(client: &RconClient) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout.write_all(b"rcon> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let command = line.trim();
        if command.is_empty() {
            continue;
        }
        if matches!(command, "exit" | "quit") {
            break;
        }

        match client.execute(command).await {
            Ok(output) => {
                if !output.is_empty() {
                    println!("{output}");
                }
            }
            Err(ClientError::InvalidCredentials) => {
                // No point prompting again; the password will stay wrong.
                return Err(ClientError::InvalidCredentials.into());
            }
            Err(e) => {
                eprintln!("Error: {e}");
            }
        }
    }

    Ok(())
}
