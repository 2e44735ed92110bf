// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Key-wise summing maps.

use crate::{Module, Stage};
use std::collections::BTreeMap;
use std::fmt::Display;
use std::ops::Add;
use std::time::Duration;

/// Wall time per codec/network module.
pub type ModuleTimingMap = ModuleMap<Module, Duration>;

/// Wall time per coarse pipeline stage.
pub type StageTimingMap = ModuleMap<Stage, Duration>;

/// A map whose values add up key-wise when maps are merged.
///
/// Items can be skipped or abort independently, so the accumulated result
/// must not depend on the order in which per-item maps arrive: `merge` is
/// commutative and associative, a key present on one side only is carried
/// through unchanged, and absent keys are never zero-filled.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ModuleMap<K: Ord, V> {
    entries: BTreeMap<K, V>,
}

impl<K: Ord, V> Default for ModuleMap<K, V> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<K, V> ModuleMap<K, V>
where
    K: Ord + Copy,
    V: Add<Output = V> + Copy,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `value` to the entry for `key`, introducing the key if needed.
    pub fn add(&mut self, key: K, value: V) {
        match self.entries.get_mut(&key) {
            Some(existing) => *existing = *existing + value,
            None => {
                self.entries.insert(key, value);
            }
        }
    }

    /// Folds every entry of `other` into `self`.
    pub fn merge_from(&mut self, other: &Self) {
        for (k, v) in &other.entries {
            self.add(*k, *v);
        }
    }

    /// Returns the key-wise sum of `self` and `other`.
    pub fn merge(&self, other: &Self) -> Self {
        let mut out = self.clone();
        out.merge_from(other);
        out
    }

    /// Returns a copy restricted to `keys`. Keys absent from `self` stay absent.
    pub fn retained(&self, keys: &[K]) -> Self {
        Self {
            entries: self
                .entries
                .iter()
                .filter(|(k, _)| keys.contains(k))
                .map(|(k, v)| (*k, *v))
                .collect(),
        }
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = K> + '_ {
        self.entries.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (K, V)> + '_ {
        self.entries.iter().map(|(k, v)| (*k, *v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for ModuleMap<K, V>
where
    K: Ord + Copy,
    V: Add<Output = V> + Copy,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.add(k, v);
        }
        map
    }
}

impl<K> ModuleMap<K, Duration>
where
    K: Ord + Copy + Display,
{
    /// Total of all entries.
    pub fn total(&self) -> Duration {
        self.entries.values().sum()
    }

    /// Entries as seconds, keyed by display name.
    pub fn as_seconds(&self) -> BTreeMap<String, f64> {
        self.entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.as_secs_f64()))
            .collect()
    }

    /// Returns a human-readable summary, e.g. `"encode 12.40ms, decode 9.10ms"`.
    pub fn summary(&self) -> String {
        if self.entries.is_empty() {
            return "none".to_string();
        }
        self.entries
            .iter()
            .map(|(k, v)| format!("{k} {:.2}ms", v.as_secs_f64() * 1000.0))
            .collect::<Vec<_>>()
            .join(", ")
    }
}
