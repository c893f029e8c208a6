//! Inclusion filters on run metadata.

use crate::config::FilterConfig;
use crate::models::RunMetadata;
use std::collections::HashSet;

/// Keep/skip predicate over [`RunMetadata`].
///
/// Each filter is either unset (no restriction) or a set of accepted
/// values. A null metadata field never matches a set filter.
#[derive(Debug, Clone, Default)]
pub struct RunFilter {
    islets: Option<HashSet<String>>,
    glucose_levels: Option<HashSet<String>>,
    capillaries: Option<HashSet<i64>>,
}

impl RunFilter {
    pub fn new(
        islets: Option<&[String]>,
        glucose_levels: Option<&[String]>,
        capillaries: Option<&[i64]>,
    ) -> Self {
        Self {
            islets: to_set(islets),
            glucose_levels: to_set(glucose_levels),
            capillaries: to_set(capillaries),
        }
    }

    /// Returns true when no filter is set.
    pub fn is_unrestricted(&self) -> bool {
        self.islets.is_none() && self.glucose_levels.is_none() && self.capillaries.is_none()
    }

    pub fn accepts(&self, meta: &RunMetadata) -> bool {
        admits(&self.islets, meta.islet.as_ref())
            && admits(&self.glucose_levels, meta.glucose.as_ref())
            && admits(&self.capillaries, meta.capillaries.as_ref())
    }
}

impl From<&FilterConfig> for RunFilter {
    fn from(config: &FilterConfig) -> Self {
        Self::new(
            config.islets.as_deref(),
            config.glucose_levels.as_deref(),
            config.capillaries.as_deref(),
        )
    }
}

// Empty lists mean "no restriction".
fn to_set<T: Clone + Eq + std::hash::Hash>(values: Option<&[T]>) -> Option<HashSet<T>> {
    values
        .filter(|v| !v.is_empty())
        .map(|v| v.iter().cloned().collect())
}

fn admits<T: Eq + std::hash::Hash>(filter: &Option<HashSet<T>>, value: Option<&T>) -> bool {
    match filter {
        None => true,
        Some(accepted) => value.is_some_and(|v| accepted.contains(v)),
    }
}
