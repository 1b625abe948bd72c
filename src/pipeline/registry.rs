//! Registry of effects and their enable toggles.

use crate::effects::{DepthHaze, Effect, Emphasize, GoldenRatio};
use crate::error::PostFxResult;
use crate::params::{param_key, ParameterSet};

/// Whether an effect runs this frame.
///
/// `toggle_key` is an opaque identifier for the host's input binding; the
/// pipeline never interprets it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EffectToggle {
    pub enabled: bool,
    pub toggle_key: i64,
}

impl EffectToggle {
    /// Read `<effect>.enabled` (default off) and `<effect>.toggle_key`.
    pub fn from_params(effect: &str, params: &ParameterSet) -> PostFxResult<Self> {
        Ok(Self {
            enabled: params.bool_or(&param_key(effect, "enabled"), false)?,
            toggle_key: params.int_or(&param_key(effect, "toggle_key"), 0)?,
        })
    }
}

/// Ordered collection of effects. Effects run in registration order.
#[derive(Default)]
pub struct EffectRegistry {
    effects: Vec<Box<dyn Effect>>,
}

impl EffectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Depth haze, emphasize and golden ratio, in that order.
    ///
    /// The golden ratio effect starts without an overlay texture; replace it
    /// through [`EffectRegistry::replace`] once the asset is loaded.
    pub fn with_default_effects() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(DepthHaze));
        registry.register(Box::new(Emphasize));
        registry.register(Box::new(GoldenRatio::new()));
        registry
    }

    pub fn register(&mut self, effect: Box<dyn Effect>) {
        self.effects.push(effect);
    }

    /// Swap the effect registered under the same name, keeping its position.
    /// Appends when no effect has that name. Returns the replaced effect.
    pub fn replace(&mut self, effect: Box<dyn Effect>) -> Option<Box<dyn Effect>> {
        match self.effects.iter().position(|e| e.name() == effect.name()) {
            Some(index) => Some(std::mem::replace(&mut self.effects[index], effect)),
            None => {
                self.effects.push(effect);
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&dyn Effect> {
        self.effects.iter().find(|e| e.name() == name).map(|e| &**e)
    }

    pub fn names(&self) -> Vec<&str> {
        self.effects.iter().map(|e| e.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Effect> {
        self.effects.iter().map(|e| -> &dyn Effect { &**e })
    }

    /// Toggle state of every effect, for the host's input binding.
    pub fn toggles(&self, params: &ParameterSet) -> Vec<(String, PostFxResult<EffectToggle>)> {
        self.iter()
            .map(|e| (e.name().to_string(), EffectToggle::from_params(e.name(), params)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    #[test]
    fn test_default_registry_order() {
        let registry = EffectRegistry::with_default_effects();
        assert_eq!(registry.names(), ["depth_haze", "emphasize", "golden_ratio"]);
    }

    #[test]
    fn test_toggle_defaults_off() {
        let toggle = EffectToggle::from_params("depth_haze", &ParameterSet::new()).unwrap();
        assert_eq!(toggle, EffectToggle { enabled: false, toggle_key: 0 });
    }

    #[test]
    fn test_toggle_reads_params() {
        let params = ParameterSet::new()
            .with("emphasize.enabled", true)
            .with("emphasize.toggle_key", 114i64);
        let toggle = EffectToggle::from_params("emphasize", &params).unwrap();
        assert!(toggle.enabled);
        assert_eq!(toggle.toggle_key, 114);
    }

    #[test]
    fn test_replace_keeps_position() {
        let mut registry = EffectRegistry::with_default_effects();
        let old = registry.replace(Box::new(GoldenRatio::with_overlay(Array3::zeros((2, 2, 4))).unwrap()));
        assert!(old.is_some());
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.names()[2], "golden_ratio");
        assert!(registry
            .get("golden_ratio")
            .unwrap()
            .build_graph(&ParameterSet::new())
            .is_ok());
    }

    #[test]
    fn test_toggles_lists_every_effect() {
        let registry = EffectRegistry::with_default_effects();
        let params = ParameterSet::new().with("depth_haze.enabled", true);
        let toggles = registry.toggles(&params);
        assert_eq!(toggles.len(), 3);
        assert!(toggles[0].1.as_ref().unwrap().enabled);
        assert!(!toggles[1].1.as_ref().unwrap().enabled);
    }
}
