//! Reading RPM package files

mod header;
mod signature;
mod unit;

#[cfg(test)]
pub(crate) mod testing;

pub use header::{Header, RpmHeaders, TagValue};
pub use signature::{key_id, signing_key};
pub use unit::{unit_from_bytes, unit_from_path};
