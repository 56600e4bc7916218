use clap::Parser;
use shadowvault::cli::{Cli, Commands};
use shadowvault::config::{self, VaultConfig};
use shadowvault::menu;
use shadowvault::owner::SimulatedBiometric;
use shadowvault::session::VaultSession;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();

    // Hard configuration check before anything interactive renders.
    let config = match VaultConfig::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e);
            if e.to_string().contains(config::API_KEY_ENV) {
                eprintln!("   Set {} and try again.", config::API_KEY_ENV);
            }
            std::process::exit(1);
        }
    };

    match cli.command {
        None => menu::run_vault_menu(&config).await,
        Some(Commands::Create) => {
            if run_create(&config).await.is_none() {
                std::process::exit(1);
            }
        }
        Some(Commands::EnableRecovery) => {
            if run_enable_recovery(&config).await.is_none() {
                std::process::exit(1);
            }
        }
        Some(Commands::Status) => print_status(&config),
    }
}

async fn run_create(config: &VaultConfig) -> Option<VaultSession> {
    let provider = SimulatedBiometric::new();
    let mut session = VaultSession::new();
    println!("Status: {}", session.status_line());

    match session.create_vault(&provider, config).await {
        Ok(()) => {
            println!("Status: {}", session.status_line());
            if let Some(client) = session.client() {
                println!("Vault address: {}", client.address());
            }
            Some(session)
        }
        Err(e) => {
            println!("Status: {}", session.status_line());
            eprintln!("❌ {}", e);
            None
        }
    }
}

async fn run_enable_recovery(config: &VaultConfig) -> Option<()> {
    // A client cannot exist without creation in one-shot mode, so create
    // first and chain into the recovery setup.
    let mut session = run_create(config).await?;

    match session.enable_recovery(config).await {
        Ok(()) => {
            println!("Status: {}", session.status_line());
            Some(())
        }
        Err(e) => {
            println!("Status: {}", session.status_line());
            eprintln!("❌ {}", e);
            None
        }
    }
}

fn print_status(config: &VaultConfig) {
    println!("Chain id:         {}", config.relay.chain_id);
    println!("Relay:            {}", config.relay.base_url);
    println!("Entry point:      {}", config.contracts.entry_point);
    println!("Recovery module:  {}", config.contracts.recovery_module);
    println!("Account salt:     {}", config.contracts.account_salt);
    println!("Guardians:        {}", config.recovery.guardians.len());
}
