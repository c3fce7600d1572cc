// -- Lint policy ---------------------------------------------------------
// This is the single source of truth for crate-wide lints.

// Broad lint groups
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
// Documentation
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::bare_urls)]
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Import hygiene
#![deny(clippy::wildcard_imports)]
// Complexity limits (thresholds in clippy.toml)
#![deny(clippy::cognitive_complexity)]
#![deny(clippy::too_many_lines)]
#![deny(clippy::excessive_nesting)]
// Function signature hygiene
#![deny(clippy::too_many_arguments)]
#![deny(clippy::fn_params_excessive_bools)]
// Clone / pass-by-value hygiene
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::implicit_clone)]
// String hygiene
#![deny(clippy::inefficient_to_string)]
#![deny(clippy::redundant_closure_for_method_calls)]
#![deny(clippy::manual_string_new)]
#![deny(clippy::str_to_string)]
// Cargo lints (warn, not deny since cargo lints can be noisy)
#![warn(clippy::cargo)]
// Unused / redundant code
#![deny(unused_results)]
#![deny(unused_qualifications)]
// Cast hygiene
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]

//! Protein structure loading and binding-site scene building.
//!
//! bindview fetches a structure by its 4-character PDB id (primary
//! archive first, proxy second), parses the fixed-column PDB text into
//! atoms and secondary-structure segments, synthesizes renderer-ready
//! meshes (backbone tube, secondary-structure ribbons, per-residue
//! markers with binding-site highlighting, a convex surface envelope)
//! and assembles them into a [`scene::Scene`] that supports pointer
//! hit-testing of residues.
//!
//! # Key entry points
//!
//! - [`loader::StructureLoader`] - request/poll load orchestration with a
//!   background fetch thread
//! - [`scene::Scene`] - tagged objects, the per-structure arena and hover
//!   listeners
//! - [`geometry::synthesize`] - meshes from a parsed structure
//! - [`options::Options`] - runtime configuration (sources, geometry,
//!   colors, display, camera, analysis)
//! - [`analysis`] - structure and binding-site analysis providers
//!
//! # Architecture
//!
//! Only the network fetch leaves the caller's thread. The loader tags
//! each request with a sequence number, so a slow response for a
//! superseded request is dropped instead of overwriting the scene.
//! Everything a structure adds to the scene, hover listeners included,
//! lives in one arena that is released as a unit on reload, failure or
//! teardown.

pub mod analysis;
pub mod camera;
pub mod error;
pub mod geometry;
pub mod loader;
pub mod options;
pub mod scene;
pub mod store;
pub mod structure;
pub mod util;
