pub mod address_service;
pub mod balance_service;
pub mod contract_probe;
pub mod gas_estimator;
pub mod nft_resolver;
pub mod recovery_service;
pub mod relay_call;
pub mod transfer_service;
