#![doc = "ninox-core: core logic library for ninox."]

//! This crate holds the data model, pipelines and collaborator contracts for
//! the ninox command-line tools. Network, git and terminal clients live in
//! the `ninox` binary crate and plug in through [`contract`].
//!
//! # Pipelines
//! - [`menu_tree`]: list a bucket, group keys per ship and day, and write a
//!   Hugo content tree ([`listing`] does the grouping).
//! - [`commit`]: turn the staged diff into an LLM-written commit message.

pub mod commit;
pub mod config;
pub mod contract;
pub mod error;
pub mod listing;
pub mod menu_tree;
pub mod ships;

pub use config::{Config, DescriptionMap};
pub use error::{CommitError, ConfigError, TreeError};
pub use ships::Ship;
