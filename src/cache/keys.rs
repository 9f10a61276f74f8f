//! Cache Key Module
//!
//! Deterministic fingerprints for `(namespace, parameters)`.
//!
//! Parameters are kept sorted by name and absent values are dropped, so two
//! parameter sets that agree on their present values always produce the same
//! key, whatever order they were built in.

use std::collections::BTreeMap;
use std::fmt::Display;

use sha2::{Digest, Sha256};

use crate::cache::glob;

/// Separator between `name=value` pairs in the canonical string.
const PAIR_DELIMITER: char = '&';

/// Number of digest bytes kept in a key (32 hex chars).
const DIGEST_BYTES: usize = 16;

// == Cache Params ==
/// Named parameters of a cached computation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheParams {
    values: BTreeMap<String, String>,
}

impl CacheParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a present parameter. A repeated name replaces the earlier value.
    pub fn with(mut self, name: impl Into<String>, value: impl Display) -> Self {
        self.values.insert(name.into(), value.to_string());
        self
    }

    /// Adds a parameter that may be absent. An absent value removes the name,
    /// so it never affects the key or equality.
    pub fn with_opt<V: Display>(self, name: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(value) => self.with(name, value),
            None => {
                let mut params = self;
                params.values.remove(&name.into());
                params
            }
        }
    }

    /// Canonical `name=value&name=value` text over present values, sorted by name.
    ///
    /// `&`, `=` and `%` inside names and values are percent-escaped so that
    /// distinct parameter sets cannot collapse to the same text.
    pub fn canonical(&self) -> String {
        let mut out = String::new();
        for (name, value) in &self.values {
            if !out.is_empty() {
                out.push(PAIR_DELIMITER);
            }
            escape_into(&mut out, name);
            out.push('=');
            escape_into(&mut out, value);
        }
        out
    }
}

fn escape_into(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '%' => out.push_str("%25"),
            '&' => out.push_str("%26"),
            '=' => out.push_str("%3D"),
            other => out.push(other),
        }
    }
}

// == Digest ==
/// Fixed-width hex digest of `text`, stable across runs and processes.
pub fn digest(text: &str) -> String {
    let hash = Sha256::digest(text.as_bytes());
    hex::encode(&hash[..DIGEST_BYTES])
}

// == Key Builders ==
/// `"{namespace}:{digest}"`.
pub fn cache_key(namespace: &str, params: &CacheParams) -> String {
    format!("{}:{}", namespace, digest(&params.canonical()))
}

/// `"{namespace}:{entity}:{digest}"`, addressable by [`entity_pattern`].
///
/// `%` and `:` in the entity are percent-escaped, so an entity segment never
/// spans into the digest position of another entity's keys.
pub fn entity_key(namespace: &str, entity: &str, params: &CacheParams) -> String {
    format!(
        "{}:{}:{}",
        namespace,
        entity_segment(entity),
        digest(&params.canonical())
    )
}

/// Glob matching every [`entity_key`] of `entity` within `namespace`.
pub fn entity_pattern(namespace: &str, entity: &str) -> String {
    format!("{}:{}:*", namespace, glob::escape(&entity_segment(entity)))
}

fn entity_segment(entity: &str) -> String {
    let mut out = String::with_capacity(entity.len());
    for c in entity.chars() {
        match c {
            '%' => out.push_str("%25"),
            ':' => out.push_str("%3A"),
            other => out.push(other),
        }
    }
    out
}
