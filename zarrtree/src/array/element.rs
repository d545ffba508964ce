use half::f16;
use zarrtree_metadata::FillValueMetadata;

use super::{ArrayData, ChunkedArray, DataType, Endianness};

/// A trait representing an array element type.
///
/// Each [`DataType`] has exactly one element type:
///
/// | Data type | Element   |
/// |-----------|-----------|
/// | `bool`    | [`bool`]  |
/// | `i1`..`i8`| [`i8`]..[`i64`] |
/// | `u1`..`u8`| [`u8`]..[`u64`] |
/// | `f2`      | [`half::f16`] |
/// | `f4`      | [`f32`]   |
/// | `f8`      | [`f64`]   |
pub trait Element: Copy + Default + PartialEq + core::fmt::Debug + Send + Sync + 'static {
    /// The data type of this element.
    const DATA_TYPE: DataType;

    /// Encode the element into `out` with `endianness`. `out` has the size of the data type.
    fn write_bytes(self, endianness: Endianness, out: &mut [u8]);

    /// Decode an element from `bytes` with `endianness`. `bytes` has the size of the data type.
    fn read_bytes(bytes: &[u8], endianness: Endianness) -> Self;

    /// Convert fill value metadata to an element.
    ///
    /// A `null` fill value is the zero value of the element.
    /// Returns [`None`] if the fill value is not representable.
    fn from_fill_value(fill_value: &FillValueMetadata) -> Option<Self>;

    /// Convert fill value metadata to an element.
    fn into_fill_value(self) -> FillValueMetadata;

    /// Wrap a typed chunked array.
    fn into_array_data(array: ChunkedArray<Self>) -> ArrayData;

    /// Return the typed chunked array if `data` holds elements of this type.
    fn from_array_data(data: &ArrayData) -> Option<&ChunkedArray<Self>>;
}

macro_rules! impl_element_number {
    ($type:ty, $data_type:ident, $from_fill_value:expr, $into_fill_value:expr) => {
        impl Element for $type {
            const DATA_TYPE: DataType = DataType::$data_type;

            fn write_bytes(self, endianness: Endianness, out: &mut [u8]) {
                let bytes = if endianness.is_big() {
                    self.to_be_bytes()
                } else {
                    self.to_le_bytes()
                };
                out.copy_from_slice(&bytes);
            }

            fn read_bytes(bytes: &[u8], endianness: Endianness) -> Self {
                let mut array = [0u8; core::mem::size_of::<$type>()];
                array.copy_from_slice(bytes);
                if endianness.is_big() {
                    <$type>::from_be_bytes(array)
                } else {
                    <$type>::from_le_bytes(array)
                }
            }

            fn from_fill_value(fill_value: &FillValueMetadata) -> Option<Self> {
                let value = fill_value.as_value();
                if value.is_null() {
                    Some(Self::default())
                } else {
                    $from_fill_value(value)
                }
            }

            fn into_fill_value(self) -> FillValueMetadata {
                $into_fill_value(self)
            }

            fn into_array_data(array: ChunkedArray<Self>) -> ArrayData {
                ArrayData::$data_type(array)
            }

            fn from_array_data(data: &ArrayData) -> Option<&ChunkedArray<Self>> {
                if let ArrayData::$data_type(array) = data {
                    Some(array)
                } else {
                    None
                }
            }
        }
    };
}

macro_rules! impl_element_int {
    ($type:ty, $data_type:ident) => {
        impl_element_number!(
            $type,
            $data_type,
            |value: &serde_json::Value| {
                if let Some(int) = value.as_i64() {
                    <$type>::try_from(int).ok()
                } else {
                    value.as_u64().and_then(|int| <$type>::try_from(int).ok())
                }
            },
            |element: $type| FillValueMetadata::new(serde_json::Value::from(element))
        );
    };
}

fn float_from_fill_value(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(number) => number.as_f64(),
        serde_json::Value::String(string) => match string.as_str() {
            "NaN" => Some(f64::NAN),
            "Infinity" => Some(f64::INFINITY),
            "-Infinity" => Some(f64::NEG_INFINITY),
            _ => None,
        },
        _ => None,
    }
}

impl_element_int!(i8, Int8);
impl_element_int!(i16, Int16);
impl_element_int!(i32, Int32);
impl_element_int!(i64, Int64);
impl_element_int!(u8, UInt8);
impl_element_int!(u16, UInt16);
impl_element_int!(u32, UInt32);
impl_element_int!(u64, UInt64);

#[allow(clippy::cast_possible_truncation)]
fn f32_from_fill_value(value: &serde_json::Value) -> Option<f32> {
    float_from_fill_value(value).map(|float| float as f32)
}

impl_element_number!(f16, Float16, |value| float_from_fill_value(value)
    .map(f16::from_f64), |element: f16| FillValueMetadata::from(
    element.to_f64()
));
impl_element_number!(f32, Float32, f32_from_fill_value, |element: f32| {
    FillValueMetadata::from(f64::from(element))
});
impl_element_number!(f64, Float64, float_from_fill_value, FillValueMetadata::from);

impl Element for bool {
    const DATA_TYPE: DataType = DataType::Bool;

    fn write_bytes(self, _endianness: Endianness, out: &mut [u8]) {
        out[0] = u8::from(self);
    }

    fn read_bytes(bytes: &[u8], _endianness: Endianness) -> Self {
        bytes[0] != 0
    }

    fn from_fill_value(fill_value: &FillValueMetadata) -> Option<Self> {
        match fill_value.as_value() {
            serde_json::Value::Null => Some(false),
            serde_json::Value::Bool(value) => Some(*value),
            serde_json::Value::Number(number) => match number.as_u64() {
                Some(0) => Some(false),
                Some(1) => Some(true),
                _ => None,
            },
            _ => None,
        }
    }

    fn into_fill_value(self) -> FillValueMetadata {
        FillValueMetadata::from(self)
    }

    fn into_array_data(array: ChunkedArray<Self>) -> ArrayData {
        ArrayData::Bool(array)
    }

    fn from_array_data(data: &ArrayData) -> Option<&ChunkedArray<Self>> {
        if let ArrayData::Bool(array) = data {
            Some(array)
        } else {
            None
        }
    }
}
