// src/lib.rs — Library root for docqa

pub mod cli;
pub mod core;
pub mod infra;
pub mod integrations;
pub mod provider;
pub mod util;
