//! Infrastructure layer: package parsing, checksums, the fake service and logging

pub mod checksum;
pub mod fake;
pub mod logging;
pub mod rpm;

pub use fake::{FakeClient, FakeController};
