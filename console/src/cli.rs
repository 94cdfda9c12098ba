use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/console.toml")]
    pub config: String,

    /// Override server host
    #[arg(long)]
    pub host: Option<String>,

    /// Override server RCON port
    #[arg(long)]
    pub port: Option<u16>,

    /// RCON password; prefer the environment variable so the secret
    /// stays out of argv and shell history
    #[arg(long, env = "RCON_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Run a single command and exit instead of starting the console
    #[arg(long)]
    pub command: Option<String>,

    /// Override log level (trace, debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Override log directory
    #[arg(long)]
    pub log_dir: Option<String>,
}
