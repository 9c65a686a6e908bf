//! Contract integration configuration.

use serde::Deserialize;

/// Aptos contract settings. The address may be overridden by
/// `CONTRACT_ADDRESS`; the signer credential only comes from
/// `CONTRACT_SIGNER_KEY`.
#[derive(Debug, Clone, Deserialize)]
pub struct ContractSettings {
    /// Fullnode REST endpoint used for view calls.
    #[serde(default = "default_node_url")]
    pub node_url: String,
    /// Account address the module is published under.
    #[serde(default)]
    pub address: Option<String>,
    /// Move module name.
    #[serde(default = "default_module")]
    pub module: String,
    /// Oracle address recorded on created markets. Defaults to `address`.
    #[serde(default)]
    pub oracle_address: Option<String>,
    /// Signing relay that accepts entry-function payloads.
    #[serde(default = "default_relay_url")]
    pub relay_url: String,
    /// Request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Relay credential loaded from `CONTRACT_SIGNER_KEY` at runtime.
    #[serde(skip)]
    pub signer_key: Option<String>,
}

fn default_node_url() -> String {
    "https://fullnode.mainnet.aptoslabs.com/v1".into()
}

fn default_module() -> String {
    "prediction_markets".into()
}

fn default_relay_url() -> String {
    "http://127.0.0.1:8090/submit".into()
}

const fn default_timeout_ms() -> u64 {
    30_000
}

impl Default for ContractSettings {
    fn default() -> Self {
        Self {
            node_url: default_node_url(),
            address: None,
            module: default_module(),
            oracle_address: None,
            relay_url: default_relay_url(),
            timeout_ms: default_timeout_ms(),
            signer_key: None,
        }
    }
}
