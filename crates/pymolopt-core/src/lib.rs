//! # pymolopt Core Library
//!
//! Local optimization of atomic structures as a single pipeline step, delegating the actual
//! energy minimization to PyMOL's `optimize` plugin running in batch mode.
//!
//! ## Architectural Philosophy
//!
//! The library mirrors a three-layer split so that every piece can be exercised on its own:
//!
//! - **[`core`]: The Foundation.** Stateless data: minimization parameters with their canonical
//!   names, structure references and lineage-tracked artifacts, the PML script template, and the
//!   on-disk layout of a PyMOL installation.
//!
//! - **[`engine`]: The Plumbing.** Explicit configuration records, the private working area of a
//!   step, shell command composition, and the job-execution collaborator that actually spawns
//!   the external process.
//!
//! - **[`workflows`]: The Public API.** The [`workflows::optimize::LocalOptimizeProtocol`] ties
//!   the layers together: write the script, run the tool, register the optimized structure.

pub mod core;
pub mod engine;
pub mod workflows;
