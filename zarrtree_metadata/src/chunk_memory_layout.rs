use serde::{Deserialize, Serialize};

/// The order of elements within a chunk.
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Hash, Default, Serialize, Deserialize, derive_more::Display,
)]
pub enum ChunkMemoryLayout {
    /// Row-major order. The last dimension varies fastest.
    #[default]
    #[serde(rename = "C")]
    #[display("C")]
    C,
    /// Column-major order. The first dimension varies fastest.
    #[serde(rename = "F")]
    #[display("F")]
    F,
}
