//! Interactive terminal session.

use crate::config::VaultConfig;
use crate::owner::{SignerProvider, SimulatedBiometric};
use crate::session::{VaultPhase, VaultSession};
use std::io::{self, Write};

pub async fn run_vault_menu(config: &VaultConfig) {
    println!("\n🔐 --- ShadowVault ---");
    println!("Chain: {}  |  Relay: {}", config.relay.chain_id, config.relay.base_url);

    let provider = SimulatedBiometric::new();
    let mut session = VaultSession::new();

    loop {
        println!("\nStatus: {}", session.status_line());
        if let Some(err) = session.last_error() {
            println!("   Last error: {}", err);
        }

        println!("\nOptions:");
        println!("1. 🧬 Create Vault");
        if session.can_enable_recovery() {
            println!("2. 🛡️  Enable Recovery Protocol");
        }
        println!("3. 🔙 Exit");
        print!("Select: ");
        io::stdout().flush().unwrap();

        let mut choice = String::new();
        if io::stdin().read_line(&mut choice).is_err() {
            break;
        }

        match choice.trim() {
            "1" => create_vault(&mut session, &provider, config).await,
            "2" if session.can_enable_recovery() => enable_recovery(&mut session, config).await,
            "3" => break,
            _ => println!("Invalid option"),
        }
    }
}

async fn create_vault(
    session: &mut VaultSession,
    provider: &dyn SignerProvider,
    config: &VaultConfig,
) {
    if session.is_busy() {
        println!("⏳ An action is already in flight.");
        return;
    }
    if session.phase() != VaultPhase::NoVault {
        println!("A vault already exists for this session.");
        return;
    }

    println!("\n🧬 Provisioning owner and constructing smart account...");
    match session.create_vault(provider, config).await {
        Ok(()) => {
            if let Some(client) = session.client() {
                println!("✅ Vault Active: {}", client.address());
            }
        }
        Err(e) => println!("❌ Initialization Failed: {}", e),
    }
}

async fn enable_recovery(session: &mut VaultSession, config: &VaultConfig) {
    if config.recovery.guardians.is_empty() {
        println!("⚠️  No guardians configured. Add a [recovery] guardians list to the config file.");
        return;
    }

    println!("\n🛡️  Configuring recovery protocol...");
    println!("   Guardians: {}", config.recovery.guardians.len());
    match session.enable_recovery(config).await {
        Ok(()) => println!("✅ {}", session.status_line()),
        Err(e) => println!("❌ Recovery Setup Failed: {}", e),
    }
}
