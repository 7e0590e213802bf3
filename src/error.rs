use std::path::PathBuf;
use thiserror::Error;

use crate::element::{FH, HH, JH, VH};

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// A malformed record in a mesh or skeleton document.
#[derive(Debug, Error)]
#[error("line {line}: {message}")]
pub struct ParseError {
    /// 1-based line of the offending record. For meshes built from in-memory
    /// polygon lists this is the 1-based index of the polygon.
    pub line: usize,
    pub message: String,
}

impl ParseError {
    pub(crate) fn new(line: usize, message: impl Into<String>) -> Self {
        ParseError {
            line,
            message: message.into(),
        }
    }
}

/// An edit was requested on elements that violate the halfedge invariants.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TopologyError {
    // Handles.
    #[error("{0} does not belong to this mesh")]
    InvalidVertex(VH),
    #[error("{0} does not belong to this mesh")]
    InvalidHalfedge(HH),
    #[error("{0} does not belong to this mesh")]
    InvalidFace(FH),
    #[error("{0} does not belong to this skeleton")]
    InvalidJoint(JH),
    // Links.
    #[error("{0} is missing its next, vertex or face link")]
    UnlinkedHalfedge(HH),
    #[error("{0} and its sym do not point back at each other")]
    AsymmetricSym(HH),
    #[error("{0} and its sym do not share the same two vertices")]
    MismatchedSym(HH),
    #[error("following next from {0} does not return to it")]
    OpenLoop(HH),
    #[error("the loop containing {0} crosses more than one face")]
    InconsistentFaceInLoop(HH),
    #[error("{0} has no halfedge")]
    EmptyFace(FH),
    #[error("{0} refers to {1}, which borders a different face")]
    InvalidFaceHalfedgeLink(FH, HH),
    #[error("{0} refers to {1}, which does not point at it")]
    InvalidVertexHalfedgeLink(VH, HH),
    // Edits.
    #[error("{0} has fewer than 3 sides")]
    DegenerateFace(FH),
    #[error("{0} does not alternate between original vertices and edge points")]
    CannotQuadrangulate(FH),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Topology(#[from] TopologyError),
    #[error("cannot read {path}: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Skinning needs at least one joint.
    #[error("skeleton has no joints")]
    EmptySkeleton,
    /// A joint without a parent was added to a skeleton that already has a root.
    #[error("skeleton already has a root joint")]
    DuplicateRoot,
}
