pub mod help;
pub mod ping;
