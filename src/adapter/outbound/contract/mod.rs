//! Market contract adapters.

pub mod aptos;
pub mod dry_run;
pub mod settings;

pub use aptos::AptosContract;
pub use dry_run::DryRunContract;
pub use settings::ContractSettings;
