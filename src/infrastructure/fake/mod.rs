//! In-memory fake of the remote service, for use in tests

mod client;
mod controller;
mod state;

pub use client::FakeClient;
pub use controller::FakeController;
pub use state::{Publish, Upload};
