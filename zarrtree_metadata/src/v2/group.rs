use monostate::MustBe;
use serde::{Deserialize, Serialize};

/// A V2 group document, stored at `{path}/.zgroup`. Attributes are stored separately in `.zattrs`.
///
/// ```json
/// {
///     "zarr_format": 2
/// }
/// ```
#[derive(Serialize, Deserialize, Clone, Eq, PartialEq, Debug, Default)]
pub struct GroupMetadataV2 {
    zarr_format: MustBe!(2u64),
}
