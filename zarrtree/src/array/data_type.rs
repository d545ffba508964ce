//! Array element data types.
//!
//! A data type string is an optional endianness marker followed by a type code.
//!
//! | Marker | Endianness             |
//! |--------|------------------------|
//! | `<`    | [`Endianness::Little`] |
//! | `>`    | [`Endianness::Big`]    |
//! | `\|`   | [`Endianness::Native`] |
//! | (none) | [`Endianness::Native`] |
//!
//! Supported codes are `bool` (alias `b1`), `i1`, `i2`, `i4`, `i8`, `u1`, `u2`, `u4`, `u8`, `f2`, `f4` and `f8`.

use derive_more::Display;
use thiserror::Error;

/// The byte order of multi-byte elements.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Display)]
pub enum Endianness {
    /// Little endian.
    #[display("little")]
    Little,
    /// Big endian.
    #[display("big")]
    Big,
    /// The byte order of the host.
    #[display("native")]
    Native,
}

impl Endianness {
    /// Returns true if this byte order is big endian once resolved against the host.
    #[must_use]
    pub const fn is_big(self) -> bool {
        match self {
            Self::Little => false,
            Self::Big => true,
            Self::Native => cfg!(target_endian = "big"),
        }
    }
}

/// A data type.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
pub enum DataType {
    /// `bool` Boolean.
    #[display("bool")]
    Bool,
    /// `i1` Integer in `[-2^7, 2^7-1]`.
    #[display("i1")]
    Int8,
    /// `i2` Integer in `[-2^15, 2^15-1]`.
    #[display("i2")]
    Int16,
    /// `i4` Integer in `[-2^31, 2^31-1]`.
    #[display("i4")]
    Int32,
    /// `i8` Integer in `[-2^63, 2^63-1]`.
    #[display("i8")]
    Int64,
    /// `u1` Integer in `[0, 2^8-1]`.
    #[display("u1")]
    UInt8,
    /// `u2` Integer in `[0, 2^16-1]`.
    #[display("u2")]
    UInt16,
    /// `u4` Integer in `[0, 2^32-1]`.
    #[display("u4")]
    UInt32,
    /// `u8` Integer in `[0, 2^64-1]`.
    #[display("u8")]
    UInt64,
    /// `f2` IEEE 754 half-precision floating point.
    #[display("f2")]
    Float16,
    /// `f4` IEEE 754 single-precision floating point.
    #[display("f4")]
    Float32,
    /// `f8` IEEE 754 double-precision floating point.
    #[display("f8")]
    Float64,
}

/// An unknown data type.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("unknown data type {0}")]
pub struct UnknownDataTypeError(pub String);

impl DataType {
    /// All supported data types.
    pub const ALL: [Self; 12] = [
        Self::Bool,
        Self::Int8,
        Self::Int16,
        Self::Int32,
        Self::Int64,
        Self::UInt8,
        Self::UInt16,
        Self::UInt32,
        Self::UInt64,
        Self::Float16,
        Self::Float32,
        Self::Float64,
    ];

    /// The size of an element in bytes.
    #[must_use]
    pub const fn size(&self) -> usize {
        match self {
            Self::Bool | Self::Int8 | Self::UInt8 => 1,
            Self::Int16 | Self::UInt16 | Self::Float16 => 2,
            Self::Int32 | Self::UInt32 | Self::Float32 => 4,
            Self::Int64 | Self::UInt64 | Self::Float64 => 8,
        }
    }

    /// Create a data type from a type code without an endianness marker.
    ///
    /// # Errors
    /// Returns [`UnknownDataTypeError`] if `code` is not a supported type code.
    pub fn from_code(code: &str) -> Result<Self, UnknownDataTypeError> {
        match code {
            "bool" | "b1" => Ok(Self::Bool),
            "i1" => Ok(Self::Int8),
            "i2" => Ok(Self::Int16),
            "i4" => Ok(Self::Int32),
            "i8" => Ok(Self::Int64),
            "u1" => Ok(Self::UInt8),
            "u2" => Ok(Self::UInt16),
            "u4" => Ok(Self::UInt32),
            "u8" => Ok(Self::UInt64),
            "f2" => Ok(Self::Float16),
            "f4" => Ok(Self::Float32),
            "f8" => Ok(Self::Float64),
            _ => Err(UnknownDataTypeError(code.to_string())),
        }
    }

    /// Parse a data type string such as `<f8`, `|b1` or `bool` into a data type and endianness.
    ///
    /// # Errors
    /// Returns [`UnknownDataTypeError`] if the type code is not supported.
    pub fn parse(data_type: &str) -> Result<(Self, Endianness), UnknownDataTypeError> {
        let (endianness, code) = match data_type.as_bytes().first() {
            Some(b'<') => (Endianness::Little, &data_type[1..]),
            Some(b'>') => (Endianness::Big, &data_type[1..]),
            Some(b'|') => (Endianness::Native, &data_type[1..]),
            _ => (Endianness::Native, data_type),
        };
        Self::from_code(code)
            .map(|data_type_parsed| (data_type_parsed, endianness))
            .map_err(|_| UnknownDataTypeError(data_type.to_string()))
    }
}
