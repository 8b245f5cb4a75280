//! Utilities shared by the coordinator and the CLI

pub mod time;
pub mod verification;
