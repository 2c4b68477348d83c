//! JSON and YAML helpers that map serde failures onto [`DwError`].

use serde::{de::DeserializeOwned, Serialize};

use crate::errors::{DwError, ErrorInfo};

fn serde_error(code: &str, err: impl ToString) -> DwError {
    DwError::Serde(ErrorInfo::new(code, err.to_string()))
}

/// Serializes a value into indented JSON, the layout used for `metadata.txt`.
pub fn to_pretty_json_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, DwError> {
    serde_json::to_vec_pretty(value).map_err(|err| serde_error("json_serialize", err))
}

/// Deserializes a value from JSON bytes.
pub fn from_json_slice<T: DeserializeOwned>(data: &[u8]) -> Result<T, DwError> {
    serde_json::from_slice(data).map_err(|err| serde_error("json_deserialize", err))
}

/// Deserializes a YAML payload into the requested type.
pub fn from_yaml_slice<T: DeserializeOwned>(data: &[u8]) -> Result<T, DwError> {
    serde_yaml::from_slice(data).map_err(|err| serde_error("yaml_deserialize", err))
}

/// Serde adapter for `f64` fields that may hold `inf`.
///
/// JSON has no literal for non-finite numbers, so they are stored as the
/// strings `"inf"`, `"-inf"` and `"nan"`; finite values stay numbers.
pub mod extended_f64 {
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(f64),
        Text(String),
    }

    /// Writes finite values as numbers and the rest as strings.
    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_f64(*value)
        } else {
            serializer.serialize_str(&format!("{value:?}"))
        }
    }

    /// Accepts either a JSON number or a float literal string.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        match Repr::deserialize(deserializer)? {
            Repr::Number(value) => Ok(value),
            Repr::Text(text) => text
                .trim()
                .parse::<f64>()
                .map_err(|err| serde::de::Error::custom(format!("invalid float {text:?}: {err}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Probe {
        #[serde(with = "extended_f64")]
        value: f64,
    }

    #[test]
    fn infinity_survives_json() {
        let bytes = to_pretty_json_bytes(&Probe {
            value: f64::INFINITY,
        })
        .unwrap();
        assert!(String::from_utf8_lossy(&bytes).contains("\"inf\""));
        let back: Probe = from_json_slice(&bytes).unwrap();
        assert_eq!(back.value, f64::INFINITY);
    }

    #[test]
    fn finite_values_stay_numeric() {
        let bytes = to_pretty_json_bytes(&Probe { value: 0.05 }).unwrap();
        let text = String::from_utf8(bytes.clone()).unwrap();
        assert!(text.contains("0.05"));
        assert!(!text.contains("\"0.05\""));
        let back: Probe = from_json_slice(&bytes).unwrap();
        assert_eq!(back, Probe { value: 0.05 });
    }
}
