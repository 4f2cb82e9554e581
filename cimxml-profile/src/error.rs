//! Error types for profile wrapping and registration

use cimxml_vocab::cim::CimVersion;

/// Error type for profile operations
#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    /// The graph has no recognized `cim` namespace prefix
    #[error("graph does not appear to be a CIM graph: no proper 'cim' namespace defined")]
    NotACimGraph,

    /// A CGMES 2.4.15 profile without the fixed-text version markers
    #[error("graph does not contain the required '...Version.shortName' and '...Version.entsoeURI*' or '...Version.baseURI*' for a CGMES 2.4.15 profile")]
    MissingCim16VersionInfo,

    /// A CIM 17/18 profile without an ontology subject
    #[error("graph does not contain the required ontology subject for a CIM profile")]
    MissingOntology,

    /// A CIM 17/18 profile without version IRI or keyword
    #[error("ontology does not contain the required versionIRI and keyword for a CIM profile")]
    MissingVersionIriOrKeyword,

    /// Registration of a non-header profile without version IRIs
    #[error("profile ontology must have at least one owl:versionIRI")]
    NoVersionIri,

    /// Registration of a profile whose single version IRI is already taken
    #[error("profile ontology with version IRI {0} is already registered")]
    DuplicateVersionIri(String),

    /// Registration of a profile whose version IRI set is already taken
    #[error("profile ontology with this version IRI set is already registered")]
    DuplicateVersionIriSet,

    /// Registration of a second header profile for the same CIM version
    #[error("header profile for CIM version {0} is already registered")]
    DuplicateHeaderProfile(CimVersion),

    /// A header profile must carry a valid CIM version
    #[error("header profile must have a valid CIM version")]
    HeaderProfileWithoutVersion,

    /// Lookup with an empty version IRI set
    #[error("at least one profile version IRI must be provided")]
    EmptyVersionIriSet,

    /// Header lookup with `NO_CIM`
    #[error("CIM version must be valid")]
    InvalidCimVersion,
}

/// Result type for profile operations
pub type Result<T> = std::result::Result<T, ProfileError>;
