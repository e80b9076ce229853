//! API key storage.
//!
//! Keys are held by value and handed to the agent factory on every turn.
//! Writing them into the process environment is opt-in and goes through
//! an `EnvSink`, so tests can observe it without touching global state.

use std::collections::HashMap;
use std::fmt;

/// A provider whose key the console collects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    OpenAi,
    Anthropic,
}

impl Provider {
    pub const ALL: [Provider; 2] = [Provider::OpenAi, Provider::Anthropic];

    /// Environment variable the key is exported to.
    pub fn env_var(self) -> &'static str {
        match self {
            Provider::OpenAi => "OPENAI_API_KEY",
            Provider::Anthropic => "ANTHROPIC_API_KEY",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Provider::OpenAi => "OpenAI API Key",
            Provider::Anthropic => "Anthropic API Key",
        }
    }

    /// Short name used by `/key <provider>`.
    pub fn key(self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::Anthropic => "anthropic",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.key() == key)
    }
}

/// Destination for exported environment variables.
pub trait EnvSink {
    fn set_var(&mut self, key: &str, value: &str);
}

/// The real process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnv;

impl EnvSink for ProcessEnv {
    fn set_var(&mut self, key: &str, value: &str) {
        std::env::set_var(key, value);
    }
}

impl EnvSink for HashMap<String, String> {
    fn set_var(&mut self, key: &str, value: &str) {
        self.insert(key.to_string(), value.to_string());
    }
}

/// API keys entered by the user. `Debug` never prints key text.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    openai: Option<String>,
    anthropic: Option<String>,
}

impl Credentials {
    /// Seed keys from `OPENAI_API_KEY` / `ANTHROPIC_API_KEY`.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Seed keys from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut creds = Self::default();
        for provider in Provider::ALL {
            if let Some(value) = lookup(provider.env_var()) {
                creds.set(provider, &value);
            }
        }
        creds
    }

    fn slot_mut(&mut self, provider: Provider) -> &mut Option<String> {
        match provider {
            Provider::OpenAi => &mut self.openai,
            Provider::Anthropic => &mut self.anthropic,
        }
    }

    /// Store a key. An empty value leaves the current key untouched.
    /// Returns true if the key was stored.
    pub fn set(&mut self, provider: Provider, value: &str) -> bool {
        if value.is_empty() {
            return false;
        }
        *self.slot_mut(provider) = Some(value.to_string());
        true
    }

    pub fn get(&self, provider: Provider) -> Option<&str> {
        match provider {
            Provider::OpenAi => self.openai.as_deref(),
            Provider::Anthropic => self.anthropic.as_deref(),
        }
    }

    pub fn is_set(&self, provider: Provider) -> bool {
        self.get(provider).is_some()
    }

    /// Stored keys as (variable, value) pairs.
    pub fn env_pairs(&self) -> Vec<(&'static str, &str)> {
        Provider::ALL
            .into_iter()
            .filter_map(|p| self.get(p).map(|v| (p.env_var(), v)))
            .collect()
    }

    /// Write one provider's key to `sink`, if stored.
    pub fn export_one(&self, provider: Provider, sink: &mut impl EnvSink) {
        if let Some(value) = self.get(provider) {
            sink.set_var(provider.env_var(), value);
        }
    }

    /// Write every stored key to `sink`.
    pub fn export(&self, sink: &mut impl EnvSink) {
        for provider in Provider::ALL {
            self.export_one(provider, sink);
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shown = |v: &Option<String>| if v.is_some() { "<set>" } else { "<unset>" };
        f.debug_struct("Credentials")
            .field("openai", &shown(&self.openai))
            .field("anthropic", &shown(&self.anthropic))
            .finish()
    }
}

/// Bullet mask for a key of the given length.
pub fn mask(value: &str) -> String {
    "\u{2022}".repeat(value.chars().count())
}
