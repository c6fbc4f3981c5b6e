use autotab_core::{Record, Value};
use serde_json::Map;

use crate::error::{ServiceError, ServiceResult};

/// Parse a JSON array of flat objects into prediction records.
///
/// Cells must be numbers, strings, booleans or null.
pub fn records_from_json(bytes: &[u8]) -> ServiceResult<Vec<Record>> {
    let objects: Vec<Map<String, serde_json::Value>> = serde_json::from_slice(bytes)
        .map_err(|e| ServiceError::InvalidInput(format!("records must be a JSON array of objects: {}", e)))?;
    objects
        .into_iter()
        .enumerate()
        .map(|(i, object)| {
            object
                .into_iter()
                .map(|(name, cell)| {
                    let value: Value = serde_json::from_value(cell).map_err(|_| {
                        ServiceError::InvalidInput(format!(
                            "record {}: field '{}' is not a scalar",
                            i, name
                        ))
                    })?;
                    Ok((name, value))
                })
                .collect::<ServiceResult<Record>>()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_cells() {
        let records =
            records_from_json(br#"[{"age": 31, "city": "oslo", "vip": true, "note": null}, {}]"#).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("age"), Some(&Value::Number(31.0)));
        assert_eq!(records[0].get("city"), Some(&Value::text("oslo")));
        assert_eq!(records[0].get("vip"), Some(&Value::Bool(true)));
        assert_eq!(records[0].get("note"), Some(&Value::Null));
        assert!(records[1].is_empty());
    }

    #[test]
    fn test_rejects_nested_and_non_arrays() {
        assert!(matches!(
            records_from_json(br#"[{"a": [1, 2]}]"#),
            Err(ServiceError::InvalidInput(_))
        ));
        assert!(matches!(
            records_from_json(br#"{"a": 1}"#),
            Err(ServiceError::InvalidInput(_))
        ));
    }
}
