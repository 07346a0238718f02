//! Typed client library for a Pulp content service
//!
//! - Immutable records for repositories, distributors, tasks and content units
//! - Search criteria evaluated against remote field names
//! - An async [`Client`] trait with an in-memory [`FakeController`] implementation
//! - RPM header parsing for building units from package files

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;
pub use domain::{
    AttachedRepository, Client, Criteria, Distributor, FileUnit, Matcher, ModulemdUnit, PulpError,
    PulpRecord, Repository, RepositoryType, RpmDependency, RpmUnit, Task, TaskState, Unit,
    UploadSource,
};
pub use infrastructure::{FakeClient, FakeController};
