//! Deploys named database objects (views, functions, triggers, ...) from
//! per-object source files. Each file carries a SQL body plus directive
//! comments (`--!require`, `--!schema`, ...) that drive dependency order,
//! conditional gating, hook statements, and identifier quoting.

#[cfg(feature = "cli")]
pub mod cli;
pub mod commands;
pub mod condition;
pub mod config;
pub mod db;
pub mod deploy;
pub mod directives;
pub mod error;
pub mod graph;
pub mod logging;
pub mod registry;
pub mod render;
pub mod report;
pub mod scanner;

pub use config::DeployConfig;
pub use db::{Database, PgDatabase};
pub use deploy::{Deployer, Direction};
pub use directives::parse_object_file;
pub use error::{DeployError, Result};
pub use graph::RequiresGraph;
pub use registry::{ObjectKey, ObjectRecord, Registry, Status};
pub use render::SqlDialect;
pub use report::{CollectingReporter, DeployEvent, Reporter, SilentReporter};
pub use scanner::{scan_into_registry, scan_objects};
