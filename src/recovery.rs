//! Social-recovery enablement: guardian-set validation and the two-call
//! batch that turns the module on and seeds it.

use crate::abi;
use crate::account::{Call, SmartAccountClient};
use crate::address::Address;
use crate::error::VaultError;
use std::collections::HashSet;

/// Fixed recovery policy. A threshold of 3-of-5 guardians after a 48 hour
/// delay, matching the module's deployed configuration.
pub const GUARDIAN_SET_SIZE: usize = 5;
pub const RECOVERY_THRESHOLD: u64 = 3;
pub const RECOVERY_DELAY_SECS: u64 = 172_800;

#[derive(Debug, Clone)]
pub struct GuardianConfig {
    pub guardians: Vec<Address>,
    pub threshold: u64,
    pub delay_secs: u64,
}

impl GuardianConfig {
    /// Parse and validate an externally supplied guardian list. Every entry
    /// must be a well-formed address, the set must have exactly
    /// `GUARDIAN_SET_SIZE` distinct members, and the fixed threshold must
    /// fit the set.
    pub fn from_strings(raw: &[String]) -> Result<Self, VaultError> {
        if raw.len() != GUARDIAN_SET_SIZE {
            return Err(VaultError::GuardianSet(format!(
                "expected {} guardians, got {}",
                GUARDIAN_SET_SIZE,
                raw.len()
            )));
        }

        let mut guardians = Vec::with_capacity(GUARDIAN_SET_SIZE);
        for entry in raw {
            guardians.push(entry.parse::<Address>()?);
        }

        let distinct: HashSet<&Address> = guardians.iter().collect();
        if distinct.len() != guardians.len() {
            return Err(VaultError::GuardianSet(
                "duplicate guardian addresses".to_string(),
            ));
        }

        Self::with_policy(guardians, RECOVERY_THRESHOLD, RECOVERY_DELAY_SECS)
    }

    fn with_policy(
        guardians: Vec<Address>,
        threshold: u64,
        delay_secs: u64,
    ) -> Result<Self, VaultError> {
        if threshold == 0 || threshold > guardians.len() as u64 {
            return Err(VaultError::GuardianSet(format!(
                "threshold {} does not fit a set of {}",
                threshold,
                guardians.len()
            )));
        }
        Ok(GuardianConfig {
            guardians,
            threshold,
            delay_secs,
        })
    }
}

/// The two calls, in order: enable the module on the account itself, then
/// initialize the module with the guardian policy. Submitted as one batch
/// so the module can never exist enabled-but-unconfigured.
pub fn build_recovery_batch(
    vault: Address,
    module: Address,
    config: &GuardianConfig,
) -> Vec<Call> {
    vec![
        Call::new(vault, abi::enable_module(&module)),
        Call::new(
            module,
            abi::recovery_setup(&config.guardians, config.threshold, config.delay_secs),
        ),
    ]
}

/// Validate, encode and submit. Returns the user-operation hash.
pub async fn enable_recovery(
    client: &SmartAccountClient,
    module: Address,
    config: &GuardianConfig,
) -> Result<String, VaultError> {
    let batch = build_recovery_batch(client.address(), module, config);
    client.send_calls(&batch).await
}
