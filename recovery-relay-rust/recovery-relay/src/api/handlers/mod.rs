pub mod chains;
pub mod operations;
