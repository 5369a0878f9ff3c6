//! # Cascade
//!
//! The single override walk behind every setting. A caller feeds layers in
//! order, most specific first; each layer either inherits (the first hit wins
//! and later inheriting layers are skipped) or forces (always consulted, a hit
//! replaces whatever the walk found so far).
//!
//! Lookup failures never abort the walk. They are recorded on the trace step
//! and the layer counts as "not found".

use crate::models::{CascadeLevel, ResolutionTrace, TraceStep};
use std::fmt::Display;

/// How a layer combines with the layers before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerPolicy {
    /// Consulted only while nothing has been found yet.
    Inherit,
    /// Always consulted; a hit wins over every other layer.
    Force,
}

/// Identifies a layer in the trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layer {
    pub level: CascadeLevel,
    pub entity_name: String,
    pub policy: LayerPolicy,
}

impl Layer {
    pub fn inherit(level: CascadeLevel, entity_name: impl Into<String>) -> Self {
        Self {
            level,
            entity_name: entity_name.into(),
            policy: LayerPolicy::Inherit,
        }
    }

    pub fn force(level: CascadeLevel, entity_name: impl Into<String>) -> Self {
        Self {
            level,
            entity_name: entity_name.into(),
            policy: LayerPolicy::Force,
        }
    }
}

/// The outcome of a finished walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CascadeOutcome {
    pub value: Option<String>,
    /// The step that supplied `value`.
    pub source: Option<TraceStep>,
    pub trace: ResolutionTrace,
}

/// An in-progress walk for one key.
#[derive(Debug)]
pub struct Cascade<'k> {
    key: &'k str,
    trace: ResolutionTrace,
    winner: Option<usize>,
    inherited: bool,
}

impl<'k> Cascade<'k> {
    pub fn new(key: &'k str) -> Self {
        Self {
            key,
            trace: ResolutionTrace::default(),
            winner: None,
            inherited: false,
        }
    }

    /// `true` once an inheriting layer has supplied a value. Further inheriting
    /// layers will be skipped, so callers can stop discovering them.
    pub fn is_settled(&self) -> bool {
        self.inherited
    }

    /// Consults `layer`. `lookup` runs only if the layer's policy requires it.
    pub fn consult<E, F>(&mut self, layer: Layer, lookup: F)
    where
        E: Display,
        F: FnOnce() -> Result<Option<String>, E>,
    {
        if layer.policy == LayerPolicy::Inherit && self.inherited {
            return;
        }

        match lookup() {
            Ok(Some(value)) => {
                log::debug!(
                    "'{}' found at {} '{}'.",
                    self.key,
                    layer.level,
                    layer.entity_name
                );
                if layer.policy == LayerPolicy::Inherit {
                    self.inherited = true;
                }
                self.winner = Some(self.trace.steps.len());
                self.push(layer, true, Some(value), None);
            }
            Ok(None) => self.push(layer, false, None, None),
            Err(e) => self.fail(layer, e),
        }
    }

    /// Records a step whose lookup could not even be attempted.
    pub fn fail<E: Display>(&mut self, layer: Layer, error: E) {
        log::warn!(
            "Lookup of '{}' at {} '{}' failed: {}. Continuing.",
            self.key,
            layer.level,
            layer.entity_name,
            error
        );
        self.push(layer, false, None, Some(error.to_string()));
    }

    pub fn finish(self) -> CascadeOutcome {
        let source = self
            .winner
            .and_then(|i| self.trace.steps.get(i))
            .cloned();
        CascadeOutcome {
            value: source.as_ref().and_then(|s| s.value.clone()),
            source,
            trace: self.trace,
        }
    }

    fn push(&mut self, layer: Layer, found: bool, value: Option<String>, error: Option<String>) {
        self.trace.steps.push(TraceStep {
            level: layer.level,
            entity_name: layer.entity_name,
            found,
            value,
            error,
        });
    }
}
