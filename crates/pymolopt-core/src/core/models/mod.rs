//! Data models for a local optimization run.
//!
//! Parameters are validated when they enter the system (parsing a name or looking up a form
//! index), so everything downstream can treat them as plain, always-valid values.

pub mod artifact;
pub mod params;
pub mod structure;
