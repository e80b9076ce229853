//! Configuration schema shared by the interface and the agent client.
//!
//! Every field the console can edit is declared here, with its allowed
//! values. The interface renders from this table and the agent program
//! receives the same record, so neither side inspects the other at runtime.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// A model selection slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelSlot {
    Chat,
    Utility,
    Embeddings,
    Browser,
}

impl ModelSlot {
    /// All slots in display order.
    pub const ALL: [ModelSlot; 4] = [
        ModelSlot::Chat,
        ModelSlot::Utility,
        ModelSlot::Embeddings,
        ModelSlot::Browser,
    ];

    /// Sidebar label.
    pub fn label(self) -> &'static str {
        match self {
            ModelSlot::Chat => "Chat Model",
            ModelSlot::Utility => "Utility Model",
            ModelSlot::Embeddings => "Embeddings Model",
            ModelSlot::Browser => "Browser Model",
        }
    }

    /// Short name used by `/model <slot> ...`.
    pub fn key(self) -> &'static str {
        match self {
            ModelSlot::Chat => "chat",
            ModelSlot::Utility => "utility",
            ModelSlot::Embeddings => "embeddings",
            ModelSlot::Browser => "browser",
        }
    }

    /// Parse a slot from its short name.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.key() == key)
    }

    /// Models selectable for this slot. The first entry is the default.
    pub fn options(self) -> &'static [&'static str] {
        match self {
            ModelSlot::Chat => &["gpt-3.5-turbo", "gpt-4", "claude-2"],
            ModelSlot::Utility => &["gpt-3.5-turbo", "gpt-4", "text-embedding-ada-002"],
            ModelSlot::Embeddings => &["text-embedding-ada-002", "all-MiniLM-L6-v2"],
            ModelSlot::Browser => &["gpt-3.5-turbo", "gpt-4"],
        }
    }

    pub fn default_model(self) -> &'static str {
        self.options()[0]
    }

    /// Whether `model` is one of this slot's options.
    pub fn accepts(self, model: &str) -> bool {
        self.options().contains(&model)
    }
}

impl fmt::Display for ModelSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Sampling temperature in [0.0, 1.0], stepped by 0.1.
///
/// Stored as tenths so repeated nudging never drifts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "f32", into = "f32")]
pub struct Temperature(u8);

impl Temperature {
    pub const MIN: Temperature = Temperature(0);
    pub const MAX: Temperature = Temperature(10);
    pub const DEFAULT: Temperature = Temperature(7);

    /// Build from a float, rounding to the nearest step.
    pub fn new(value: f32) -> Result<Self, ConfigError> {
        if !(0.0..=1.0).contains(&value) {
            return Err(ConfigError::TemperatureOutOfRange(value));
        }
        Ok(Self((value * 10.0).round() as u8))
    }

    pub fn value(self) -> f32 {
        f32::from(self.0) / 10.0
    }

    /// Move by `steps` tenths, clamped to the valid range.
    pub fn nudge(self, steps: i8) -> Self {
        let next = (i16::from(self.0) + i16::from(steps)).clamp(0, i16::from(Self::MAX.0));
        Self(next as u8)
    }

    /// Position within the range, 0.0 to 1.0 (for slider rendering).
    pub fn ratio(self) -> f64 {
        f64::from(self.0) / f64::from(Self::MAX.0)
    }
}

impl Default for Temperature {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<f32> for Temperature {
    type Error = ConfigError;

    fn try_from(value: f32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Temperature> for f32 {
    fn from(t: Temperature) -> f32 {
        t.value()
    }
}

impl fmt::Display for Temperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.value())
    }
}

/// The configuration snapshot handed to the agent for one turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    pub chat_model: String,
    pub utility_model: String,
    pub embeddings_model: String,
    pub browser_model: String,
    pub temperature: Temperature,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            chat_model: ModelSlot::Chat.default_model().into(),
            utility_model: ModelSlot::Utility.default_model().into(),
            embeddings_model: ModelSlot::Embeddings.default_model().into(),
            browser_model: ModelSlot::Browser.default_model().into(),
            temperature: Temperature::DEFAULT,
            max_tokens: None,
        }
    }
}

impl AgentConfig {
    /// Model currently selected for a slot.
    pub fn model(&self, slot: ModelSlot) -> &str {
        match slot {
            ModelSlot::Chat => &self.chat_model,
            ModelSlot::Utility => &self.utility_model,
            ModelSlot::Embeddings => &self.embeddings_model,
            ModelSlot::Browser => &self.browser_model,
        }
    }

    fn model_mut(&mut self, slot: ModelSlot) -> &mut String {
        match slot {
            ModelSlot::Chat => &mut self.chat_model,
            ModelSlot::Utility => &mut self.utility_model,
            ModelSlot::Embeddings => &mut self.embeddings_model,
            ModelSlot::Browser => &mut self.browser_model,
        }
    }

    /// Select a model for a slot. Rejects models outside the slot's options.
    pub fn set_model(&mut self, slot: ModelSlot, model: &str) -> Result<(), ConfigError> {
        if !slot.accepts(model) {
            return Err(ConfigError::UnknownModel {
                slot,
                model: model.to_string(),
            });
        }
        *self.model_mut(slot) = model.to_string();
        Ok(())
    }

    /// Step to the next (or previous) option of a slot, wrapping around.
    pub fn cycle_model(&mut self, slot: ModelSlot, forward: bool) {
        let options = slot.options();
        let current = options
            .iter()
            .position(|m| *m == self.model(slot))
            .unwrap_or(0);
        let next = if forward {
            (current + 1) % options.len()
        } else {
            (current + options.len() - 1) % options.len()
        };
        *self.model_mut(slot) = options[next].to_string();
    }

    /// Set or clear the max-token bound.
    pub fn set_max_tokens(&mut self, max_tokens: Option<u32>) -> Result<(), ConfigError> {
        if max_tokens == Some(0) {
            return Err(ConfigError::InvalidMaxTokens);
        }
        self.max_tokens = max_tokens;
        Ok(())
    }

    /// Check every field against the schema.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for slot in ModelSlot::ALL {
            let model = self.model(slot);
            if !slot.accepts(model) {
                return Err(ConfigError::UnknownModel {
                    slot,
                    model: model.to_string(),
                });
            }
        }
        if self.max_tokens == Some(0) {
            return Err(ConfigError::InvalidMaxTokens);
        }
        Ok(())
    }

    /// One-line-per-field summary for `/config`.
    pub fn describe(&self) -> String {
        let mut lines: Vec<String> = ModelSlot::ALL
            .iter()
            .map(|slot| format!("  {:<17} {}", slot.label(), self.model(*slot)))
            .collect();
        lines.push(format!("  {:<17} {}", "Temperature", self.temperature));
        let max_tokens = self
            .max_tokens
            .map(|n| n.to_string())
            .unwrap_or_else(|| "off".into());
        lines.push(format!("  {:<17} {}", "Max Tokens", max_tokens));
        lines.join("\n")
    }
}
