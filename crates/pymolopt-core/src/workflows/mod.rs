//! # Workflows Module
//!
//! High-level entry points that run a complete pipeline step.
//!
//! - **Local Optimization** ([`optimize`]) - Writes the PML script, runs PyMOL's minimizer in
//!   batch mode and registers the optimized structure with its provenance.

pub mod optimize;
