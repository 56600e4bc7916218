//! Owner provisioning.
//!
//! The production boundary here is a passkey or custodial signer that can
//! asynchronously hand back something able to sign user operations. The
//! stub below stands in for that: it waits briefly to emulate the user
//! interaction and then fabricates a fresh local key.

use crate::crypto::OwnerKey;
use crate::error::VaultError;
use async_trait::async_trait;
use std::time::Duration;

/// Anything that can asynchronously produce an owner signing identity.
/// Swap in a real passkey/WebAuthn or custodial integration behind this
/// same interface.
#[async_trait]
pub trait SignerProvider: Send + Sync {
    async fn provision(&self) -> Result<OwnerKey, VaultError>;
}

/// Simulated biometric enrollment. Always succeeds.
pub struct SimulatedBiometric {
    delay: Duration,
}

impl SimulatedBiometric {
    pub fn new() -> Self {
        SimulatedBiometric {
            delay: Duration::from_millis(600),
        }
    }

    /// Zero-delay variant for tests.
    pub fn instant() -> Self {
        SimulatedBiometric {
            delay: Duration::ZERO,
        }
    }
}

impl Default for SimulatedBiometric {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SignerProvider for SimulatedBiometric {
    async fn provision(&self) -> Result<OwnerKey, VaultError> {
        tracing::debug!("simulating biometric enrollment");
        tokio::time::sleep(self.delay).await;
        Ok(OwnerKey::generate())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stub_provisions_a_fresh_key_each_time() {
        let provider = SimulatedBiometric::instant();
        let first = provider.provision().await.unwrap();
        let second = provider.provision().await.unwrap();
        assert_ne!(first.address(), second.address());
    }
}
