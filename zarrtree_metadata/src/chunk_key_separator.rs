use serde::{Deserialize, Serialize};

/// The separator between the components of a chunk key.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize, derive_more::Display)]
pub enum ChunkKeySeparator {
    /// The slash '/' character.
    #[serde(rename = "/")]
    #[display("/")]
    Slash,
    /// The dot '.' character.
    #[serde(rename = ".")]
    #[display(".")]
    Dot,
}

impl From<ChunkKeySeparator> for char {
    fn from(separator: ChunkKeySeparator) -> Self {
        match separator {
            ChunkKeySeparator::Slash => '/',
            ChunkKeySeparator::Dot => '.',
        }
    }
}

impl TryFrom<char> for ChunkKeySeparator {
    type Error = char;

    fn try_from(separator: char) -> Result<Self, Self::Error> {
        match separator {
            '/' => Ok(Self::Slash),
            '.' => Ok(Self::Dot),
            _ => Err(separator),
        }
    }
}
