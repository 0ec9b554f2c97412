//! Infer the version of a project from the state of its git history.
//!
//! The engine is [`reckon`]: it combines a frozen [`Inventory`] with a
//! [`NormalStrategy`] and a [`PreReleaseStrategy`] to produce one [`Version`].
//! [`git::GitRepository`] builds inventories from a working copy; the `cli`,
//! `config` and `workflow` modules back the `reckon` binary.
pub mod cli;
pub mod config;
pub mod error;
pub mod git;
pub mod inventory;
pub mod normal;
pub mod pre_release;
pub mod reckoner;
pub mod version;
pub mod workflow;

pub use error::{ReckonError, Result};
pub use inventory::{CommitId, Inventory};
pub use normal::NormalStrategy;
pub use pre_release::PreReleaseStrategy;
pub use reckoner::{reckon, Reckoner};
pub use version::{Normal, PreRelease, Scope, StageOrder, Version};
