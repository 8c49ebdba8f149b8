// src/core/mod.rs — Document sessions and question answering

pub mod answer;
pub mod safety;
pub mod session;
pub mod types;
