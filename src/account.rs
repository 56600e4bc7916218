//! Smart account descriptor and the client that submits sponsored batches.

use crate::address::Address;
use crate::config::VaultConfig;
use crate::crypto::{keccak256, OwnerKey};
use crate::error::VaultError;
use crate::relay::RelayClient;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Descriptor for a (possibly not yet deployed) smart account. The address
/// is a pure function of owner and salt, so re-running creation with the
/// same inputs lands on the same account.
#[derive(Debug, Clone)]
pub struct SmartAccount {
    pub owner: Address,
    pub salt: u64,
    pub entry_point: Address,
    pub entry_point_version: String,
    pub account_version: String,
}

impl SmartAccount {
    pub fn new(owner: Address, config: &VaultConfig) -> Self {
        SmartAccount {
            owner,
            salt: config.contracts.account_salt,
            entry_point: config.contracts.entry_point,
            entry_point_version: config.contracts.entry_point_version.clone(),
            account_version: config.contracts.account_version.clone(),
        }
    }

    /// Deterministic account address: last 20 bytes of
    /// keccak256(tag + account version + owner + salt). The factory's real
    /// CREATE2 math lives behind the relay; what matters locally is that
    /// equal (owner, salt) always derives the same address.
    pub fn counterfactual_address(&self) -> Address {
        let mut preimage = Vec::with_capacity(64);
        preimage.extend_from_slice(b"shadowvault-account");
        preimage.extend_from_slice(self.account_version.as_bytes());
        preimage.extend_from_slice(self.owner.as_bytes());
        preimage.extend_from_slice(&self.salt.to_be_bytes());
        let digest = keccak256(&preimage);
        let mut out = [0u8; 20];
        out.copy_from_slice(&digest[12..]);
        Address(out)
    }
}

/// One call inside a batch.
#[derive(Debug, Clone)]
pub struct Call {
    pub target: Address,
    pub value: u128,
    pub data: Vec<u8>,
}

impl Call {
    pub fn new(target: Address, data: Vec<u8>) -> Self {
        Call {
            target,
            value: 0,
            data,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct WireCall {
    target: String,
    value: String,
    data: String,
}

impl From<&Call> for WireCall {
    fn from(call: &Call) -> Self {
        WireCall {
            target: call.target.to_string(),
            value: call.value.to_string(),
            data: format!("0x{}", hex::encode(&call.data)),
        }
    }
}

/// Wire form of a sponsored user operation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserOperation {
    sender: String,
    nonce: u64,
    calls: Vec<WireCall>,
    paymaster_and_data: String,
    signature: String,
}

impl UserOperation {
    fn unsigned(sender: &Address, nonce: u64, calls: &[Call]) -> Self {
        UserOperation {
            sender: sender.to_string(),
            nonce,
            calls: calls.iter().map(WireCall::from).collect(),
            paymaster_and_data: "0x".to_string(),
            signature: "0x".to_string(),
        }
    }

    /// Digest the owner signs: keccak over sender, nonce, chain id and the
    /// batch contents (call data hashed so large payloads stay cheap).
    fn signing_digest(&self, chain_id: u64, calls: &[Call]) -> [u8; 32] {
        let mut preimage = Vec::new();
        preimage.extend_from_slice(self.sender.as_bytes());
        preimage.extend_from_slice(&self.nonce.to_be_bytes());
        preimage.extend_from_slice(&chain_id.to_be_bytes());
        for call in calls {
            preimage.extend_from_slice(call.target.as_bytes());
            preimage.extend_from_slice(&call.value.to_be_bytes());
            preimage.extend_from_slice(&keccak256(&call.data));
        }
        preimage.extend_from_slice(self.paymaster_and_data.as_bytes());
        keccak256(&preimage)
    }
}

/// Handle over a constructed vault: the account descriptor, the in-memory
/// owner key, and the relay connection used to submit sponsored batches.
pub struct SmartAccountClient {
    account: SmartAccount,
    owner_key: OwnerKey,
    relay: RelayClient,
    chain_id: u64,
    nonce: AtomicU64,
}

impl SmartAccountClient {
    /// Build the client and sanity-check the relay endpoint: if the relay
    /// answers for a different chain than configured, nothing is retained.
    pub async fn connect(
        owner_key: OwnerKey,
        config: &VaultConfig,
    ) -> Result<Self, VaultError> {
        let account = SmartAccount::new(owner_key.address(), config);
        let relay = RelayClient::new(config.relay_url())
            .map_err(|e| VaultError::Construction(e.to_string()))?;

        let relay_chain = relay
            .chain_id()
            .await
            .map_err(|e| VaultError::Construction(e.to_string()))?;
        if relay_chain != config.relay.chain_id {
            return Err(VaultError::Construction(format!(
                "relay serves chain {} but config expects {}",
                relay_chain, config.relay.chain_id
            )));
        }

        tracing::info!(address = %account.counterfactual_address(), "smart account client ready");
        Ok(SmartAccountClient {
            account,
            owner_key,
            relay,
            chain_id: relay_chain,
            nonce: AtomicU64::new(0),
        })
    }

    /// Client with no relay round-trip, for exercising session logic.
    #[cfg(test)]
    pub(crate) fn offline(owner_key: OwnerKey, config: &VaultConfig) -> Self {
        let account = SmartAccount::new(owner_key.address(), config);
        let relay = RelayClient::new(config.relay_url()).expect("offline relay client");
        SmartAccountClient {
            account,
            owner_key,
            relay,
            chain_id: config.relay.chain_id,
            nonce: AtomicU64::new(0),
        }
    }

    /// The vault address.
    pub fn address(&self) -> Address {
        self.account.counterfactual_address()
    }

    /// Submit a batch of calls as one atomic sponsored user operation.
    /// Sequence: request sponsorship, sign the completed op, submit.
    /// Returns the user-operation hash.
    pub async fn send_calls(&self, calls: &[Call]) -> Result<String, VaultError> {
        let nonce = self.nonce.fetch_add(1, Ordering::SeqCst);
        let sender = self.address();
        let mut op = UserOperation::unsigned(&sender, nonce, calls);

        op.paymaster_and_data = self
            .relay
            .sponsor_user_operation(&op, &self.account.entry_point)
            .await?;

        let digest = op.signing_digest(self.chain_id, calls);
        op.signature = format!("0x{}", self.owner_key.sign_hex(&digest));

        let hash = self
            .relay
            .send_user_operation(&op, &self.account.entry_point)
            .await?;
        tracing::info!(%hash, nonce, "user operation submitted");
        Ok(hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> VaultConfig {
        VaultConfig::default()
    }

    fn addr(n: u8) -> Address {
        let mut bytes = [0u8; 20];
        bytes[19] = n;
        Address(bytes)
    }

    #[test]
    fn counterfactual_address_is_deterministic_in_owner_and_salt() {
        let config = test_config();
        let account_a = SmartAccount::new(addr(1), &config);
        let account_b = SmartAccount::new(addr(1), &config);
        assert_eq!(
            account_a.counterfactual_address(),
            account_b.counterfactual_address()
        );

        let mut other_salt = SmartAccount::new(addr(1), &config);
        other_salt.salt += 1;
        assert_ne!(
            account_a.counterfactual_address(),
            other_salt.counterfactual_address()
        );

        let other_owner = SmartAccount::new(addr(2), &config);
        assert_ne!(
            account_a.counterfactual_address(),
            other_owner.counterfactual_address()
        );
    }

    #[test]
    fn signing_digest_commits_to_the_batch() {
        let calls = vec![Call::new(addr(3), vec![1, 2, 3])];
        let op = UserOperation::unsigned(&addr(9), 0, &calls);
        let base = op.signing_digest(11155111, &calls);

        let other_calls = vec![Call::new(addr(3), vec![1, 2, 4])];
        let other_op = UserOperation::unsigned(&addr(9), 0, &other_calls);
        assert_ne!(base, other_op.signing_digest(11155111, &other_calls));

        // chain id is part of the digest too
        assert_ne!(base, op.signing_digest(1, &calls));
    }

    #[test]
    fn wire_form_hex_encodes_call_data() {
        let calls = vec![Call::new(addr(3), vec![0xde, 0xad])];
        let op = UserOperation::unsigned(&addr(9), 7, &calls);
        let json = serde_json::to_value(&op).unwrap();
        assert_eq!(json["calls"][0]["data"], "0xdead");
        assert_eq!(json["nonce"], 7);
        assert_eq!(json["paymasterAndData"], "0x");
    }
}
