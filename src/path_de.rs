use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::Error;
use crate::ir::ResolvedPackage;

/// Deserialize with JSON-path context in error messages.
pub fn from_value_with_path<T: DeserializeOwned>(value: Value) -> Result<T, Error> {
    serde_path_to_error::deserialize::<_, T>(value).map_err(|err| Error::Decode {
        path: err.path().to_string(),
        source: err.into_inner(),
    })
}

/// Decode one resolver document.
pub fn package_from_value(value: Value) -> Result<ResolvedPackage, Error> {
    from_value_with_path(value)
}
