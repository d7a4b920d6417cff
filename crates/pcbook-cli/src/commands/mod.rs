// crates/pcbook-cli/src/commands/mod.rs
//
// Command module declarations for the pcbook CLI.

pub mod create;
pub mod login;
pub mod rate;
pub mod search;
pub mod upload;
