//! CIM profile ontologies and the profile registry.
//!
//! A CIM profile defines a subset of the CIM schema for a specific exchange,
//! versioned and identified by its version IRIs. Profiles come in three
//! schema flavors (CIM 16 / CIM 17 / CIM 18); [`CimProfile::wrap`] detects
//! the flavor and rejects graphs that are not profiles.
//!
//! The [`ProfileRegistry`] ingests wrapped profiles, compiles each into a
//! property -> datatype lookup table, and serves merged tables for the
//! profile sets referenced by model headers. The parser uses those tables to
//! type literals that carry no explicit `rdf:datatype`.

mod error;
mod primitives;
mod profile;
mod registry;

pub use error::{ProfileError, Result};
pub use primitives::builtin_primitive_table;
pub use profile::CimProfile;
pub use registry::{ProfileRegistry, PropertyInfo, PropertyMap};
