//! Repository domain module

mod distributor;
mod entity;

pub use distributor::Distributor;
pub use entity::{Repository, RepositoryType};
