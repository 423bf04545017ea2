//! Error types for the document tree and the rendering runtime.

use crate::dom::NodeId;

/// Errors raised by the document tree's attachment primitives.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    #[error("node {0} does not exist in this document")]
    NodeNotFound(NodeId),
    #[error("node {0} is not an element")]
    NotAnElement(NodeId),
    #[error("invalid tag name: {0:?}")]
    InvalidTagName(String),
    #[error("invalid attribute name: {0:?}")]
    InvalidAttributeName(String),
    #[error("cannot insert node {child} into node {parent}")]
    HierarchyRequest { parent: NodeId, child: NodeId },
}

/// Errors raised while rendering a descriptor tree into a container.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    #[error("render container {0} is not an attachable element")]
    InvalidContainer(NodeId),
    #[error(transparent)]
    Dom(#[from] DomError),
    #[error("container {0} was claimed by a newer render root")]
    Superseded(NodeId),
    #[error("render root is unmounted")]
    Unmounted,
    #[error("state updates kept re-rendering after {0} passes")]
    RenderLoop(usize),
}

pub type DomResult<T> = std::result::Result<T, DomError>;

pub type Result<T> = std::result::Result<T, RenderError>;
