//! # Engine Module
//!
//! The plumbing between a configured optimization step and the external PyMOL process.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Explicit records for the minimization parameters and the
//!   tool installation, built and validated once at the boundary
//! - **Working Area** ([`workspace`]) - The private tmp/extra directories of one step instance
//! - **Invocation** ([`invocation`]) - Composition of the single shell command line
//! - **Execution** ([`executor`]) - The job-execution collaborator that spawns the process
//! - **Progress Monitoring** ([`progress`]) - Phase reporting for user feedback
//! - **Error Handling** ([`error`]) - Engine-level error types

pub mod config;
pub mod error;
pub mod executor;
pub mod invocation;
pub mod progress;
pub mod workspace;
