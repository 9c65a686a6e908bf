//! Market contract factory.

use std::sync::Arc;

use tracing::info;

use crate::adapter::outbound::contract::{AptosContract, DryRunContract};
use crate::error::{ConfigError, Result};
use crate::infrastructure::config::settings::Config;
use crate::port::outbound::contract::MarketContract;

/// Build the contract client.
///
/// Dry-run mode uses an in-memory contract. Otherwise the address and
/// signer key must be configured.
#[allow(clippy::result_large_err)]
pub fn build_contract(config: &Config) -> Result<Arc<dyn MarketContract>> {
    if config.dry_run {
        info!("Dry-run mode, contract writes are simulated");
        return Ok(Arc::new(DryRunContract::new()));
    }
    config.require_contract()?;
    let address = config.contract.address.clone().ok_or(ConfigError::MissingField {
        field: "CONTRACT_ADDRESS",
    })?;
    let signer_key = config.contract.signer_key.clone().ok_or(ConfigError::MissingField {
        field: "CONTRACT_SIGNER_KEY",
    })?;
    info!(address = %address, module = %config.contract.module, "Aptos contract configured");
    Ok(Arc::new(AptosContract::new(&config.contract, address, signer_key)))
}
