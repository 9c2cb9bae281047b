//! LwM2M resource data types and conversions
//!
//! Resources carry one of the LwM2M data types. In-memory values are
//! `serde_json::Value`; Opaque payloads are carried as base64 strings and
//! Objlnk values as "OID:IID" strings, with typed casts in both directions.

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use serde_json::Value;

use crate::error::{DmError, Result};
use crate::path::{Iid, Oid};

/// LwM2M resource data types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceType {
    String,
    Integer,
    Float,
    Boolean,
    /// Raw byte payload, carried as a base64 string
    Opaque,
    /// Unix timestamp in seconds
    Time,
    /// Object link, carried as an "OID:IID" string
    Objlnk,
}

/// Extract an integer from a resource value
pub fn value_to_i64(value: &Value) -> Result<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| DmError::TypeConversion(format!("cannot convert {} to i64", n))),
        Value::String(s) => s
            .parse()
            .map_err(|_| DmError::TypeConversion(format!("cannot parse '{}' as i64", s))),
        _ => Err(DmError::TypeConversion(format!(
            "cannot convert {:?} to i64",
            value
        ))),
    }
}

/// Extract a float from a resource value
pub fn value_to_f64(value: &Value) -> Result<f64> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| DmError::TypeConversion(format!("cannot convert {} to f64", n))),
        Value::String(s) => s
            .parse()
            .map_err(|_| DmError::TypeConversion(format!("cannot parse '{}' as f64", s))),
        _ => Err(DmError::TypeConversion(format!(
            "cannot convert {:?} to f64",
            value
        ))),
    }
}

/// Extract a boolean from a resource value
pub fn value_to_bool(value: &Value) -> Result<bool> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::String(s) if s == "true" || s == "false" => Ok(s == "true"),
        _ => Err(DmError::TypeConversion(format!(
            "cannot convert {:?} to bool",
            value
        ))),
    }
}

/// Extract a string from a resource value
pub fn value_to_string(value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        _ => Err(DmError::TypeConversion(format!(
            "cannot convert {:?} to string",
            value
        ))),
    }
}

/// Decode an Opaque resource value (base64 string) into raw bytes
pub fn value_to_bytes(value: &Value) -> Result<Vec<u8>> {
    let s = value
        .as_str()
        .ok_or_else(|| DmError::TypeConversion(format!("opaque value is not a string: {:?}", value)))?;
    BASE64
        .decode(s)
        .map_err(|e| DmError::TypeConversion(format!("base64 decode: {}", e)))
}

/// Encode raw bytes as an Opaque resource value (base64 string)
pub fn bytes_to_value(bytes: &[u8]) -> Value {
    Value::String(BASE64.encode(bytes))
}

/// Decode an Objlnk resource value in "OID:IID" form
pub fn value_to_objlnk(value: &Value) -> Result<(Oid, Iid)> {
    let s = value
        .as_str()
        .ok_or_else(|| DmError::TypeConversion(format!("objlnk value is not a string: {:?}", value)))?;
    let (oid, iid) = s
        .split_once(':')
        .ok_or_else(|| DmError::TypeConversion(format!("objlnk missing separator: '{}'", s)))?;
    let oid = oid
        .parse()
        .map_err(|_| DmError::TypeConversion(format!("objlnk OID not a u16: '{}'", s)))?;
    let iid = iid
        .parse()
        .map_err(|_| DmError::TypeConversion(format!("objlnk IID not a u16: '{}'", s)))?;
    Ok((oid, iid))
}

/// Encode an Objlnk resource value
pub fn objlnk_to_value(oid: Oid, iid: Iid) -> Value {
    Value::String(format!("{}:{}", oid, iid))
}

/// Check a value against the declared resource type; write paths use this
/// to reject payloads that decoded to the wrong shape
pub fn check_type(value: &Value, resource_type: ResourceType) -> Result<()> {
    match resource_type {
        ResourceType::String => value_to_string(value).map(|_| ()),
        ResourceType::Integer | ResourceType::Time => value_to_i64(value).map(|_| ()),
        ResourceType::Float => value_to_f64(value).map(|_| ()),
        ResourceType::Boolean => value_to_bool(value).map(|_| ()),
        ResourceType::Opaque => value_to_bytes(value).map(|_| ()),
        ResourceType::Objlnk => value_to_objlnk(value).map(|_| ()),
    }
}
