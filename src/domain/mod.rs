//! Domain layer: records, criteria and the client abstraction

pub mod client;
pub mod criteria;
pub mod error;
pub mod record;
pub mod repository;
pub mod task;
pub mod unit;

pub use client::{AttachedRepository, Client, UploadSource};
pub use criteria::{Criteria, Matcher};
pub use error::PulpError;
pub use record::{FrozenList, PulpRecord};
pub use repository::{Distributor, Repository, RepositoryType};
pub use task::{Task, TaskState};
pub use unit::{FileUnit, ModulemdUnit, RpmDependency, RpmUnit, Unit, UnitKey};
