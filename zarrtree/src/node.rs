//! Zarr hierarchy nodes.
//!
//! A node is a path in a [`Hierarchy`] classified as one of:
//! - an [`Array`]: an array metadata document exists at the path,
//! - an explicit [`Group`]: a group metadata document exists at the path,
//! - an implicit [`Group`]: no document exists at the path, but a metadata document exists below it.
//!
//! Classification is a pure function of the store contents and is evaluated on every access.
//! An implicit group disappears once its last descendant is erased.

mod node_path;
mod node_sync;

use derive_more::Display;
use thiserror::Error;
use zarrtree_storage::StorageError;

pub use node_path::{NodePath, NodePathError};
pub(crate) use node_sync::{classify, get_children, get_nodes};

use crate::{
    array::{Array, ArrayCreateError},
    group::{Group, GroupCreateError},
    hierarchy::Hierarchy,
};

/// The kind of a node.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
pub enum NodeKind {
    /// An array.
    #[display("array")]
    Array,
    /// A group with a metadata document.
    #[display("explicit_group")]
    ExplicitGroup,
    /// A group without a metadata document, implied by its descendants.
    #[display("implicit_group")]
    ImplicitGroup,
}

impl NodeKind {
    /// Returns true for explicit and implicit groups.
    #[must_use]
    pub const fn is_group(self) -> bool {
        matches!(self, Self::ExplicitGroup | Self::ImplicitGroup)
    }
}

/// A node error.
#[derive(Clone, Debug, Error)]
pub enum NodeError {
    /// An invalid node path.
    #[error(transparent)]
    NodePathError(#[from] NodePathError),
    /// A storage error.
    #[error(transparent)]
    StorageError(#[from] StorageError),
    /// Nothing in the hierarchy exists at the path.
    #[error("no node exists at {_0}")]
    NotFound(NodePath),
    /// The node is not of the requested kind.
    #[error("node at {path} is an {actual}, expected {expected}")]
    TypeMismatch {
        /// The node path.
        path: NodePath,
        /// The requested kind.
        expected: &'static str,
        /// The kind of the node.
        actual: NodeKind,
    },
    /// An array could not be opened.
    #[error(transparent)]
    ArrayCreateError(#[from] ArrayCreateError),
    /// A group could not be opened.
    #[error(transparent)]
    GroupCreateError(#[from] GroupCreateError),
}

/// A classified node of a hierarchy.
#[derive(Debug, Clone)]
pub struct Node {
    hierarchy: Hierarchy,
    path: NodePath,
    kind: NodeKind,
}

impl Node {
    /// Classify the node at `path` of `hierarchy`.
    ///
    /// # Errors
    /// Returns [`NodeError::NotFound`] if nothing exists at `path`, or a [`StorageError`] on a store failure.
    pub fn open(hierarchy: &Hierarchy, path: &str) -> Result<Self, NodeError> {
        let path = NodePath::new(path)?;
        let kind = classify(&**hierarchy.storage(), hierarchy.layout(), &path)?
            .ok_or_else(|| NodeError::NotFound(path.clone()))?;
        Ok(Self {
            hierarchy: hierarchy.clone(),
            path,
            kind,
        })
    }

    /// The node path.
    #[must_use]
    pub fn path(&self) -> &NodePath {
        &self.path
    }

    /// The node name, empty for the root.
    #[must_use]
    pub fn name(&self) -> &str {
        self.path.name()
    }

    /// The node kind, at the time the node was classified.
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Open the node as an array.
    ///
    /// # Errors
    /// Returns [`NodeError::TypeMismatch`] if the node is a group, or an error if the array cannot be opened.
    pub fn get_array(&self) -> Result<Array, NodeError> {
        if self.kind == NodeKind::Array {
            Ok(Array::open(&self.hierarchy, self.path.as_str())?)
        } else {
            Err(NodeError::TypeMismatch {
                path: self.path.clone(),
                expected: "array",
                actual: self.kind,
            })
        }
    }

    /// Open the node as a group.
    ///
    /// # Errors
    /// Returns [`NodeError::TypeMismatch`] if the node is an array, or an error if the group cannot be opened.
    pub fn get_group(&self) -> Result<Group, NodeError> {
        if self.kind.is_group() {
            Ok(Group::open(&self.hierarchy, self.path.as_str())?)
        } else {
            Err(NodeError::TypeMismatch {
                path: self.path.clone(),
                expected: "group",
                actual: self.kind,
            })
        }
    }
}
