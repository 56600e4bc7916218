//! Session state machine for the vault UI.
//!
//! Phases move `NoVault → Creating → VaultReady` and, once a vault exists,
//! `VaultReady → ConfiguringRecovery → RecoveryReady`. Failures fall back
//! to the phase the action started from; a recovery failure never drops
//! the client. The `busy` flag is advisory: it gates re-entrant triggering
//! while an action is in flight and is cleared on both outcomes.

use crate::account::SmartAccountClient;
use crate::config::VaultConfig;
use crate::error::VaultError;
use crate::owner::SignerProvider;
use crate::recovery::{self, GuardianConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VaultPhase {
    NoVault,
    Creating,
    VaultReady,
    ConfiguringRecovery,
    RecoveryReady,
}

pub struct VaultSession {
    phase: VaultPhase,
    client: Option<SmartAccountClient>,
    recovery_hash: Option<String>,
    last_error: Option<String>,
    busy: bool,
}

impl VaultSession {
    pub fn new() -> Self {
        VaultSession {
            phase: VaultPhase::NoVault,
            client: None,
            recovery_hash: None,
            last_error: None,
            busy: false,
        }
    }

    pub fn phase(&self) -> VaultPhase {
        self.phase
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn client(&self) -> Option<&SmartAccountClient> {
        self.client.as_ref()
    }

    /// Whether the recovery action is reachable at all. The menu hides the
    /// option entirely while this is false.
    pub fn can_enable_recovery(&self) -> bool {
        self.phase == VaultPhase::VaultReady && self.client.is_some() && !self.busy
    }

    // --- transitions ---

    pub fn begin_create(&mut self) -> Result<(), VaultError> {
        if self.busy {
            return Err(VaultError::Construction(
                "an action is already in flight".to_string(),
            ));
        }
        if self.client.is_some() {
            return Err(VaultError::Construction(
                "a vault already exists for this session".to_string(),
            ));
        }
        self.phase = VaultPhase::Creating;
        self.last_error = None;
        self.busy = true;
        Ok(())
    }

    pub fn finish_create(&mut self, result: Result<SmartAccountClient, VaultError>) {
        match result {
            Ok(client) => {
                self.busy = false;
                tracing::info!(address = %client.address(), "vault created");
                self.client = Some(client);
                self.phase = VaultPhase::VaultReady;
            }
            Err(e) => self.fail_create(e.to_string()),
        }
    }

    fn fail_create(&mut self, message: String) {
        self.busy = false;
        tracing::warn!("vault creation failed: {}", message);
        self.last_error = Some(message);
        self.client = None;
        self.phase = VaultPhase::NoVault;
    }

    pub fn begin_recovery(&mut self) -> Result<(), VaultError> {
        if self.busy {
            return Err(VaultError::Construction(
                "an action is already in flight".to_string(),
            ));
        }
        if self.phase != VaultPhase::VaultReady || self.client.is_none() {
            return Err(VaultError::Construction(
                "recovery requires an active vault".to_string(),
            ));
        }
        self.phase = VaultPhase::ConfiguringRecovery;
        self.last_error = None;
        self.busy = true;
        Ok(())
    }

    pub fn finish_recovery(&mut self, result: Result<String, VaultError>) {
        match result {
            Ok(hash) => {
                self.busy = false;
                tracing::info!(%hash, "recovery protocol live");
                self.recovery_hash = Some(hash);
                self.phase = VaultPhase::RecoveryReady;
            }
            Err(e) => self.fail_recovery(e.to_string()),
        }
    }

    fn fail_recovery(&mut self, message: String) {
        self.busy = false;
        tracing::warn!("recovery setup failed: {}", message);
        self.last_error = Some(message);
        // client state survives a failed setup
        self.phase = VaultPhase::VaultReady;
    }

    // --- action drivers ---

    /// Provision an owner and construct the smart account client. On any
    /// failure the session ends up back in `NoVault` with no partial state.
    pub async fn create_vault(
        &mut self,
        provider: &dyn SignerProvider,
        config: &VaultConfig,
    ) -> Result<(), VaultError> {
        self.begin_create()?;
        let result = match provider.provision().await {
            Ok(owner_key) => SmartAccountClient::connect(owner_key, config).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(client) => {
                self.finish_create(Ok(client));
                Ok(())
            }
            Err(e) => {
                self.fail_create(e.to_string());
                Err(e)
            }
        }
    }

    /// Validate the configured guardian set, encode the two-call batch and
    /// submit it through the existing client.
    pub async fn enable_recovery(&mut self, config: &VaultConfig) -> Result<(), VaultError> {
        self.begin_recovery()?;
        let result = match GuardianConfig::from_strings(&config.recovery.guardians) {
            Ok(guardian_config) => match self.client.as_ref() {
                Some(client) => {
                    recovery::enable_recovery(
                        client,
                        config.contracts.recovery_module,
                        &guardian_config,
                    )
                    .await
                }
                None => Err(VaultError::Construction("no active vault".to_string())),
            },
            Err(e) => Err(e),
        };
        match result {
            Ok(hash) => {
                self.finish_recovery(Ok(hash));
                Ok(())
            }
            Err(e) => {
                self.fail_recovery(e.to_string());
                Err(e)
            }
        }
    }

    // --- rendering ---

    /// Human-readable status line for the current phase.
    pub fn status_line(&self) -> String {
        match self.phase {
            VaultPhase::NoVault => match &self.last_error {
                Some(_) => "Initialization Failed".to_string(),
                None => "Idle".to_string(),
            },
            VaultPhase::Creating => "Initializing...".to_string(),
            VaultPhase::VaultReady => match (&self.last_error, &self.client) {
                (Some(_), _) => "Recovery Setup Failed".to_string(),
                (None, Some(client)) => format!("Vault Active: {}", client.address().short()),
                (None, None) => "Idle".to_string(),
            },
            VaultPhase::ConfiguringRecovery => "Configuring...".to_string(),
            VaultPhase::RecoveryReady => {
                let hash = self.recovery_hash.as_deref().unwrap_or("");
                let prefix: String = hash.chars().take(10).collect();
                format!("Recovery Protocol Live: {}...", prefix)
            }
        }
    }
}

impl Default for VaultSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::SmartAccountClient;
    use crate::crypto::OwnerKey;

    fn offline_client() -> SmartAccountClient {
        SmartAccountClient::offline(OwnerKey::generate(), &VaultConfig::default())
    }

    #[test]
    fn starts_idle_and_not_busy() {
        let session = VaultSession::new();
        assert_eq!(session.phase(), VaultPhase::NoVault);
        assert_eq!(session.status_line(), "Idle");
        assert!(!session.is_busy());
        assert!(!session.can_enable_recovery());
    }

    #[test]
    fn create_happy_path() {
        let mut session = VaultSession::new();
        session.begin_create().unwrap();
        assert!(session.is_busy());
        assert_eq!(session.status_line(), "Initializing...");

        let client = offline_client();
        let expected = client.address().short();
        session.finish_create(Ok(client));

        assert!(!session.is_busy());
        assert_eq!(session.phase(), VaultPhase::VaultReady);
        assert_eq!(session.status_line(), format!("Vault Active: {}", expected));
        assert!(session.can_enable_recovery());
    }

    #[test]
    fn create_failure_leaves_no_partial_state() {
        let mut session = VaultSession::new();
        session.begin_create().unwrap();
        session.finish_create(Err(VaultError::Construction("relay down".to_string())));

        assert!(!session.is_busy());
        assert_eq!(session.phase(), VaultPhase::NoVault);
        assert!(session.client().is_none());
        assert_eq!(session.status_line(), "Initialization Failed");
        assert!(session.last_error().unwrap().contains("relay down"));

        // retry is possible after a failure
        assert!(session.begin_create().is_ok());
        assert_eq!(session.status_line(), "Initializing...");
    }

    #[test]
    fn recovery_unreachable_without_a_vault() {
        let mut session = VaultSession::new();
        assert!(session.begin_recovery().is_err());
        assert!(!session.can_enable_recovery());
    }

    #[test]
    fn busy_gates_reentrant_actions() {
        let mut session = VaultSession::new();
        session.begin_create().unwrap();
        assert!(session.begin_create().is_err());
        assert!(session.begin_recovery().is_err());
    }

    #[test]
    fn recovery_happy_path_renders_truncated_hash() {
        let mut session = VaultSession::new();
        session.begin_create().unwrap();
        session.finish_create(Ok(offline_client()));

        session.begin_recovery().unwrap();
        assert!(session.is_busy());
        assert_eq!(session.status_line(), "Configuring...");

        session.finish_recovery(Ok(
            "0xdeadbeefcafef00ddeadbeefcafef00ddeadbeefcafef00d".to_string()
        ));
        assert!(!session.is_busy());
        assert_eq!(session.phase(), VaultPhase::RecoveryReady);
        assert_eq!(session.status_line(), "Recovery Protocol Live: 0xdeadbeef...");
    }

    #[test]
    fn recovery_failure_keeps_the_client() {
        let mut session = VaultSession::new();
        session.begin_create().unwrap();
        session.finish_create(Ok(offline_client()));
        let address = session.client().unwrap().address();

        session.begin_recovery().unwrap();
        session.finish_recovery(Err(VaultError::Relay("sponsorship refused".to_string())));

        assert!(!session.is_busy());
        assert_eq!(session.phase(), VaultPhase::VaultReady);
        assert_eq!(session.status_line(), "Recovery Setup Failed");
        assert_eq!(session.client().unwrap().address(), address);

        // and the action can be retried
        assert!(session.begin_recovery().is_ok());
    }
}
