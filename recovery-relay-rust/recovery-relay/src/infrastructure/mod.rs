pub mod blockchain;
pub mod config;
pub mod logger;
pub mod token_list;
