//! Error types for graph and dataset operations

use crate::{Term, Triple};

/// Failures collected while propagating a transaction step to the
/// participating graphs.
#[derive(Debug, thiserror::Error)]
#[error("transaction step failed on {} graph(s)", failures.len())]
pub struct DatasetTransactionError {
    /// One message per failed participant.
    pub failures: Vec<String>,
}

/// Error type for graph and dataset operations
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// Model-header access on a graph with no FullModel/DifferenceModel subject
    #[error("found neither FullModel nor DifferenceModel in the header graph")]
    NoModelSubject,

    /// Full-model accessor used on a dataset that is not a full model
    #[error("dataset is not a FullModel")]
    NotAFullModel,

    /// Difference-model accessor used on a dataset that is not a difference model
    #[error("dataset is not a DifferenceModel")]
    NotADifferenceModel,

    /// Difference application against a predecessor whose model IRI is not
    /// in this model's Supersedes set
    #[error("predecessor model {model} is not in Model.Supersedes")]
    PredecessorNotSuperseded {
        /// The predecessor's model IRI
        model: Term,
    },

    /// Difference application against a predecessor missing precondition triples
    #[error("predecessor body is missing precondition triples: {missing:?}")]
    MissingPreconditions {
        /// The precondition triples absent from the predecessor body
        missing: Vec<Triple>,
    },

    /// A transaction step was invoked outside a transaction
    #[error("dataset is not in a transaction")]
    NotInTransaction,

    /// `begin` while a transaction is already open
    #[error("dataset is already in a transaction")]
    AlreadyInTransaction,

    /// Composite failure from transaction propagation
    #[error(transparent)]
    Transaction(#[from] DatasetTransactionError),
}

/// Result type for graph and dataset operations
pub type Result<T> = std::result::Result<T, GraphError>;
