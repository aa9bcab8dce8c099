//! # Core Module
//!
//! Stateless building blocks shared by the engine and the workflows.
//!
//! - **Data Models** ([`models`]) - Minimization parameters, structure references, artifacts
//! - **Script Rendering** ([`script`]) - The PML command script consumed by PyMOL
//! - **Tool Layout** ([`tool`]) - Where a PyMOL build lives and how it is installed

pub mod models;
pub mod script;
pub mod tool;
