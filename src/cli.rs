use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "shadowvault")]
#[command(about = "ShadowVault smart-wallet client", long_about = None)]
pub struct Cli {
    /// Path to the config file
    #[arg(long, default_value = "shadowvault.toml")]
    pub config: String,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a vault and print its address
    Create,
    /// Create a vault, then enable the social-recovery protocol on it
    EnableRecovery,
    /// Print the effective configuration
    Status,
}
