use serde::{Deserialize, Deserializer};

/// An array shape. Dimensions are neither validated nor required to be non-zero here.
pub type ArrayShape = Vec<u64>;

#[derive(Deserialize)]
#[serde(untagged)]
enum Dimension {
    Integer(u64),
    String(String),
}

/// Deserialize a shape from a JSON array of integers, some of which may be string encoded (e.g. `["4", 4]`).
pub(crate) fn deserialize_shape<'de, D>(deserializer: D) -> Result<ArrayShape, D::Error>
where
    D: Deserializer<'de>,
{
    let dimensions = Vec::<Dimension>::deserialize(deserializer)?;
    dimensions
        .into_iter()
        .map(|dimension| match dimension {
            Dimension::Integer(value) => Ok(value),
            Dimension::String(value) => value.trim().parse::<u64>().map_err(|_| {
                serde::de::Error::custom(format!("invalid shape dimension {value:?}"))
            }),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Shaped {
        #[serde(deserialize_with = "super::deserialize_shape")]
        shape: super::ArrayShape,
    }

    #[test]
    fn shape_integers_and_strings() {
        let shaped: Shaped = serde_json::from_str(r#"{"shape": [4, "4", " 10"]}"#).unwrap();
        assert_eq!(shaped.shape, vec![4, 4, 10]);
        let shaped: Shaped = serde_json::from_str(r#"{"shape": []}"#).unwrap();
        assert!(shaped.shape.is_empty());
    }

    #[test]
    fn shape_invalid() {
        assert!(serde_json::from_str::<Shaped>(r#"{"shape": ["four"]}"#).is_err());
        assert!(serde_json::from_str::<Shaped>(r#"{"shape": [-1]}"#).is_err());
        assert!(serde_json::from_str::<Shaped>(r#"{"shape": 4}"#).is_err());
    }
}
