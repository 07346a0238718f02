//! Task domain module for remote asynchronous work

mod entity;

pub use entity::{Task, TaskState, ACTION_TAG_PREFIX, REPOSITORY_TAG_PREFIX};
