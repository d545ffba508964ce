//! Zarr versions.
//!
//! - [Zarr Version 3 Specification](https://zarr-specs.readthedocs.io/en/latest/v3/core/index.html)
//! - [Zarr Version 2 Specification](https://zarr-specs.readthedocs.io/en/latest/v2/v2.0.html)

use thiserror::Error;

/// Zarr versions.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ZarrVersions {
    /// Zarr Version 2.
    V2,
    /// Zarr Version 3.
    V3,
}

impl ZarrVersions {
    /// The integer format version.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        match self {
            Self::V2 => 2,
            Self::V3 => 3,
        }
    }
}

impl std::fmt::Display for ZarrVersions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Zarr V{}", self.as_u64())
    }
}

/// An unsupported Zarr format version.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("unsupported zarr format version {0}, expected 2 or 3")]
pub struct UnsupportedZarrVersionError(pub String);

impl TryFrom<u64> for ZarrVersions {
    type Error = UnsupportedZarrVersionError;

    fn try_from(version: u64) -> Result<Self, Self::Error> {
        match version {
            2 => Ok(Self::V2),
            3 => Ok(Self::V3),
            _ => Err(UnsupportedZarrVersionError(version.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zarr_versions_from_integer() {
        assert_eq!(ZarrVersions::try_from(2).unwrap(), ZarrVersions::V2);
        assert_eq!(ZarrVersions::try_from(3).unwrap(), ZarrVersions::V3);
        let err = ZarrVersions::try_from(4).unwrap_err();
        assert_eq!(
            err.to_string(),
            "unsupported zarr format version 4, expected 2 or 3"
        );
        assert_eq!(ZarrVersions::V3.to_string(), "Zarr V3");
    }
}
