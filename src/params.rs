//! Named per-frame configuration values.
//!
//! A [`ParameterSet`] is an immutable snapshot the host hands to the
//! pipeline each frame. Keys are namespaced by effect
//! (`depth_haze.edge_bleed_threshold`, `emphasize.blend_color`, ...).
//! Values are loosely typed; each effect reads its own typed settings out of
//! the set and falls back to defaults for missing keys.
//!
//! ## JSON form
//!
//! ```json
//! {
//!   "depth_haze.enabled": true,
//!   "depth_haze.edge_bleed_threshold": 0.2,
//!   "emphasize.blend_color": [1.0, 0.0, 0.0]
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{PostFxError, PostFxResult};

/// One configuration value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f32),
    Color([f32; 3]),
}

impl ParamValue {
    fn kind(&self) -> &'static str {
        match self {
            ParamValue::Bool(_) => "bool",
            ParamValue::Int(_) => "int",
            ParamValue::Float(_) => "float",
            ParamValue::Color(_) => "color",
        }
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<f32> for ParamValue {
    fn from(v: f32) -> Self {
        ParamValue::Float(v)
    }
}

impl From<[f32; 3]> for ParamValue {
    fn from(v: [f32; 3]) -> Self {
        ParamValue::Color(v)
    }
}

/// Snapshot of named values for one frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterSet {
    values: BTreeMap<String, ParamValue>,
}

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a flat JSON object of `key -> value`.
    pub fn from_json_str(json: &str) -> PostFxResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| PostFxError::configuration(format!("invalid parameter set: {}", e)))
    }

    pub fn to_json_string(&self) -> PostFxResult<String> {
        serde_json::to_string_pretty(self).map_err(PostFxError::configuration)
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.values.get(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Read a float, accepting integers. Missing keys yield `default`.
    pub fn float_or(&self, key: &str, default: f32) -> PostFxResult<f32> {
        match self.values.get(key) {
            None => Ok(default),
            Some(ParamValue::Float(v)) => Ok(*v),
            Some(ParamValue::Int(v)) => Ok(*v as f32),
            Some(other) => Err(type_mismatch(key, "float", other)),
        }
    }

    pub fn int_or(&self, key: &str, default: i64) -> PostFxResult<i64> {
        match self.values.get(key) {
            None => Ok(default),
            Some(ParamValue::Int(v)) => Ok(*v),
            Some(other) => Err(type_mismatch(key, "int", other)),
        }
    }

    pub fn bool_or(&self, key: &str, default: bool) -> PostFxResult<bool> {
        match self.values.get(key) {
            None => Ok(default),
            Some(ParamValue::Bool(v)) => Ok(*v),
            Some(other) => Err(type_mismatch(key, "bool", other)),
        }
    }

    pub fn color_or(&self, key: &str, default: [f32; 3]) -> PostFxResult<[f32; 3]> {
        match self.values.get(key) {
            None => Ok(default),
            Some(ParamValue::Color(v)) => Ok(*v),
            Some(other) => Err(type_mismatch(key, "color", other)),
        }
    }
}

fn type_mismatch(key: &str, expected: &str, found: &ParamValue) -> PostFxError {
    PostFxError::configuration(format!(
        "parameter '{}' must be a {}, found {}",
        key,
        expected,
        found.kind()
    ))
}

/// Join an effect namespace and a setting name into a parameter key.
pub fn param_key(effect: &str, setting: &str) -> String {
    format!("{}.{}", effect, setting)
}

/// Reject NaN and infinite values.
pub fn require_finite(key: &str, value: f32) -> PostFxResult<f32> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(PostFxError::configuration(format!(
            "parameter '{}' must be finite, got {}",
            key, value
        )))
    }
}

/// Reject NaN, infinite and negative values.
pub fn require_non_negative(key: &str, value: f32) -> PostFxResult<f32> {
    let value = require_finite(key, value)?;
    if value < 0.0 {
        return Err(PostFxError::configuration(format!(
            "parameter '{}' must not be negative, got {}",
            key, value
        )));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_for_missing_keys() {
        let params = ParameterSet::new();
        assert_eq!(params.float_or("a.b", 0.5).unwrap(), 0.5);
        assert!(!params.bool_or("a.enabled", false).unwrap());
        assert_eq!(params.color_or("a.c", [1.0, 0.0, 0.0]).unwrap(), [1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_int_promotes_to_float() {
        let params = ParameterSet::new().with("a.strength", 1i64);
        assert_eq!(params.float_or("a.strength", 0.0).unwrap(), 1.0);
    }

    #[test]
    fn test_type_mismatch_is_configuration_error() {
        let params = ParameterSet::new().with("a.enabled", 0.5f32);
        let err = params.bool_or("a.enabled", false).unwrap_err();
        assert!(matches!(err, PostFxError::Configuration(_)));
        assert!(err.to_string().contains("a.enabled"));
    }

    #[test]
    fn test_from_json() {
        let json = r#"{
            "depth_haze.enabled": true,
            "depth_haze.edge_bleed_threshold": 0.25,
            "depth_haze.blur_radius": 2,
            "emphasize.blend_color": [1.0, 0.5, 0.0]
        }"#;
        let params = ParameterSet::from_json_str(json).unwrap();

        assert_eq!(params.len(), 4);
        assert!(params.bool_or("depth_haze.enabled", false).unwrap());
        assert_eq!(params.float_or("depth_haze.edge_bleed_threshold", 0.0).unwrap(), 0.25);
        assert_eq!(params.int_or("depth_haze.blur_radius", 4).unwrap(), 2);
        assert_eq!(
            params.color_or("emphasize.blend_color", [0.0; 3]).unwrap(),
            [1.0, 0.5, 0.0]
        );
    }

    #[test]
    fn test_json_roundtrip_keeps_values() {
        let params = ParameterSet::new()
            .with("golden_ratio.opacity", 0.5f32)
            .with("golden_ratio.enabled", true);
        let json = params.to_json_string().unwrap();
        assert_eq!(ParameterSet::from_json_str(&json).unwrap(), params);
    }

    #[test]
    fn test_invalid_json_rejected() {
        let err = ParameterSet::from_json_str("{\"a\": \"text\"}").unwrap_err();
        assert!(matches!(err, PostFxError::Configuration(_)));
    }

    #[test]
    fn test_require_non_negative() {
        assert_eq!(require_non_negative("t", 0.0).unwrap(), 0.0);
        assert!(require_non_negative("t", -0.1).is_err());
        assert!(require_non_negative("t", f32::NAN).is_err());
        assert!(require_finite("t", f32::INFINITY).is_err());
    }
}
