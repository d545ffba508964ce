use derive_more::Display;
use thiserror::Error;
use zarrtree_storage::valid_segment;

/// A Zarr hierarchy node path.
///
/// The root is `/`. Other paths are `/` followed by `/` separated names, with no trailing `/`.
/// Names are non-empty and are never `.` or `..`, so a path cannot leave the hierarchy it addresses.
/// Paths are ordered by their string representation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
#[display("{_0}")]
pub struct NodePath(String);

/// An invalid node path.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("invalid node path {0}")]
pub struct NodePathError(String);

impl NodePath {
    /// Create a new node path from `path`.
    ///
    /// # Errors
    /// Returns [`NodePathError`] if `path` is not valid according to [`NodePath::validate`].
    pub fn new(path: &str) -> Result<Self, NodePathError> {
        if Self::validate(path) {
            Ok(Self(path.to_string()))
        } else {
            Err(NodePathError(path.to_string()))
        }
    }

    /// The root node path `/`.
    #[must_use]
    pub fn root() -> Self {
        Self("/".to_string())
    }

    /// Extracts a string slice of the underlying path.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if this is the root path.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    /// Validates a path.
    #[must_use]
    pub fn validate(path: &str) -> bool {
        if path == "/" {
            return true;
        }
        path.strip_prefix('/')
            .is_some_and(|names| names.split('/').all(valid_segment))
    }

    /// The final name of the path, empty for the root.
    #[must_use]
    pub fn name(&self) -> &str {
        self.0.rsplit_once('/').map_or("", |(_, name)| name)
    }

    /// The number of names in the path, zero for the root.
    #[must_use]
    pub fn depth(&self) -> usize {
        if self.is_root() {
            0
        } else {
            self.0.matches('/').count()
        }
    }

    /// The parent path, [`None`] for the root.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        self.0.rsplit_once('/').map(|(parent, _)| {
            if parent.is_empty() {
                Self::root()
            } else {
                Self(parent.to_string())
            }
        })
    }

    /// The ancestors of the path, from the root to the parent.
    #[must_use]
    pub fn ancestors(&self) -> Vec<Self> {
        let mut ancestors = Vec::with_capacity(self.depth());
        let mut path = self.parent();
        while let Some(parent) = path {
            path = parent.parent();
            ancestors.push(parent);
        }
        ancestors.reverse();
        ancestors
    }

    /// The child path with `name`.
    ///
    /// # Errors
    /// Returns [`NodePathError`] if `name` is empty, `.`, `..` or contains `/`.
    pub fn child(&self, name: &str) -> Result<Self, NodePathError> {
        let path = if self.is_root() {
            format!("/{name}")
        } else {
            format!("{}/{name}", self.0)
        };
        if !valid_segment(name) || name.contains('/') {
            Err(NodePathError(path))
        } else {
            Ok(Self(path))
        }
    }
}

impl TryFrom<&str> for NodePath {
    type Error = NodePathError;

    fn try_from(path: &str) -> Result<Self, Self::Error> {
        Self::new(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_path_validate() {
        assert!(NodePath::new("/").is_ok());
        assert!(NodePath::new("/a").is_ok());
        assert!(NodePath::new("/a/b.c").is_ok());
        assert!(NodePath::new("").is_err());
        assert!(NodePath::new("a").is_err());
        assert!(NodePath::new("/a/").is_err());
        assert!(NodePath::new("//a").is_err());
        assert!(NodePath::new("/a//b").is_err());
        assert!(NodePath::new("/..").is_err());
        assert!(NodePath::new("/../../x/escaped").is_err());
        assert!(NodePath::new("/a/./b").is_err());
        assert!(NodePath::new("/a/..b/.c").is_ok());
        assert_eq!(
            NodePath::new("a/b").unwrap_err().to_string(),
            "invalid node path a/b"
        );
    }

    #[test]
    fn node_path_relations() {
        let path = NodePath::new("/arthur/dent").unwrap();
        assert_eq!(path.name(), "dent");
        assert_eq!(path.depth(), 2);
        assert_eq!(path.parent(), Some(NodePath::new("/arthur").unwrap()));
        assert_eq!(
            path.ancestors(),
            vec![NodePath::root(), NodePath::new("/arthur").unwrap()]
        );
        assert_eq!(NodePath::root().name(), "");
        assert_eq!(NodePath::root().depth(), 0);
        assert_eq!(NodePath::root().parent(), None);
        assert!(NodePath::root().ancestors().is_empty());
        assert_eq!(NodePath::root().child("a").unwrap().as_str(), "/a");
        assert_eq!(path.child("b").unwrap().as_str(), "/arthur/dent/b");
        assert!(path.child("").is_err());
        assert!(path.child("b/c").is_err());
        assert!(path.child("..").is_err());
        assert!(path.child(".").is_err());
    }

    #[test]
    fn node_path_order() {
        let mut paths = vec![
            NodePath::new("/marvin/android").unwrap(),
            NodePath::new("/arthur").unwrap(),
            NodePath::root(),
            NodePath::new("/marvin").unwrap(),
        ];
        paths.sort();
        let paths: Vec<&str> = paths.iter().map(NodePath::as_str).collect();
        assert_eq!(paths, ["/", "/arthur", "/marvin", "/marvin/android"]);
    }
}
