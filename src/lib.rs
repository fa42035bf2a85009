//! nook - hierarchical notes with synchronized full-text search

pub mod bootstrap;
pub mod config;
pub mod domain;
pub mod vault;
