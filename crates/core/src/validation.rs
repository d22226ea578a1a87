//! Non-fail-fast field validation.
//!
//! Validators push into a [`FieldErrors`] map instead of returning early, so a
//! client sees every offending field in one response.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::FaqError;

/// Field key to message map. The first message recorded for a key wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `message` under `key` unless the key already has one.
    pub fn add(&mut self, key: impl Into<String>, message: impl Into<String>) {
        self.0.entry(key.into()).or_insert_with(|| message.into());
    }

    /// Record `message` under `key` when `ok` is false.
    pub fn check(&mut self, ok: bool, key: &str, message: &str) {
        if !ok {
            self.add(key, message);
        }
    }

    /// Fold another map in, keeping messages already recorded.
    pub fn merge_from(&mut self, other: Self) {
        for (key, message) in other.0 {
            self.add(key, message);
        }
    }

    /// Fold another map in, prefixing each of its keys with `prefix.`.
    pub fn merge_prefixed(&mut self, prefix: &str, other: Self) {
        for (key, message) in other.0 {
            self.add(format!("{prefix}.{key}"), message);
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// `Ok(())` when nothing was recorded, otherwise `FaqError::ValidationFailed`.
    ///
    /// # Errors
    ///
    /// Returns `FaqError::ValidationFailed` carrying this map if it is non-empty.
    pub fn into_result(self) -> Result<(), FaqError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(FaqError::ValidationFailed(self))
        }
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (key, message) in &self.0 {
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "{key}: {message}")?;
            first = false;
        }
        Ok(())
    }
}
