//! JSON-RPC client for the sponsoring relay (bundler + paymaster front).

use crate::account::UserOperation;
use crate::address::Address;
use crate::error::VaultError;
use reqwest::Client;
use serde_json::json;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Bounded per-request timeout so a hung relay call surfaces as an error
/// instead of wedging the session.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct RelayClient {
    url: String,
    client: Client,
    request_id: AtomicU64,
}

impl RelayClient {
    pub fn new(url: String) -> Result<Self, VaultError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| VaultError::Relay(format!("building HTTP client: {}", e)))?;
        Ok(Self {
            url,
            client,
            request_id: AtomicU64::new(1),
        })
    }

    async fn send_request(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, VaultError> {
        let id = self.request_id.fetch_add(1, Ordering::SeqCst);
        let request = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": id,
        });

        tracing::debug!(method, id, "relay request");
        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| VaultError::Relay(format!("{}: {}", method, e)))?;

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| VaultError::Relay(format!("{}: bad response: {}", method, e)))?;

        if let Some(error) = body.get("error") {
            let message = error["message"].as_str().unwrap_or("Unknown relay error");
            return Err(VaultError::Relay(format!("{}: {}", method, message)));
        }

        Ok(body["result"].clone())
    }

    /// Chain id the relay endpoint serves, from the hex `eth_chainId` reply.
    pub async fn chain_id(&self) -> Result<u64, VaultError> {
        let result = self.send_request("eth_chainId", json!([])).await?;
        let raw = result
            .as_str()
            .ok_or_else(|| VaultError::Relay("eth_chainId: non-string result".to_string()))?;
        u64::from_str_radix(raw.trim_start_matches("0x"), 16)
            .map_err(|e| VaultError::Relay(format!("eth_chainId: {}", e)))
    }

    /// Ask the paymaster side to sponsor the operation. Returns the
    /// paymaster data to splice into the op before signing.
    pub async fn sponsor_user_operation(
        &self,
        op: &UserOperation,
        entry_point: &Address,
    ) -> Result<String, VaultError> {
        let result = self
            .send_request(
                "pm_sponsorUserOperation",
                json!([op, entry_point.to_string()]),
            )
            .await?;
        result["paymasterAndData"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| {
                VaultError::Relay("pm_sponsorUserOperation: sponsorship refused".to_string())
            })
    }

    /// Submit the signed operation to the bundler. Returns the user
    /// operation hash.
    pub async fn send_user_operation(
        &self,
        op: &UserOperation,
        entry_point: &Address,
    ) -> Result<String, VaultError> {
        let result = self
            .send_request("eth_sendUserOperation", json!([op, entry_point.to_string()]))
            .await?;
        result
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| VaultError::Relay("eth_sendUserOperation: no hash returned".to_string()))
    }
}
