//! Interface filtering for selective monitoring.
//!
//! # Design
//!
//! - **Pure Matchers**: [`KindFilter`] and [`NameRegexFilter`] only answer
//!   "does this interface match?" without include/exclude semantics.
//! - **Filter Chain**: [`FilterChain`] combines matchers:
//!   - Exclude filters: AND logic (must pass ALL excludes)
//!   - Include filters: OR logic (pass ANY include, empty = match all)
//! - **Decorator**: [`FilteredEnumerator`] applies filtering transparently
//!   to any [`InterfaceEnumerator`] implementation.

use std::collections::HashSet;

use regex::Regex;

use super::{EnumerationError, InterfaceEnumerator, InterfaceKind, InterfaceSnapshot};

/// Trait for filtering network interfaces.
///
/// Filters must be `Send + Sync`: the snapshot provider is shared between the
/// watcher task and callers of `add_listener`.
pub trait InterfaceFilter: Send + Sync {
    /// Returns `true` if the interface should be watched.
    fn matches(&self, interface: &InterfaceSnapshot) -> bool;
}

/// Matches interfaces whose kind is in the configured set.
///
/// # Examples
///
/// ```
/// use netcfg_watch::network::filter::{InterfaceFilter, KindFilter};
/// use netcfg_watch::network::{InterfaceKind, InterfaceSnapshot};
///
/// let filter = KindFilter::new([InterfaceKind::Wireless, InterfaceKind::Ethernet]);
///
/// let eth = InterfaceSnapshot::new("eth0", InterfaceKind::Ethernet, []);
/// let lo = InterfaceSnapshot::new("lo", InterfaceKind::Loopback, []);
///
/// assert!(filter.matches(&eth));
/// assert!(!filter.matches(&lo));
/// ```
#[derive(Debug, Clone)]
pub struct KindFilter {
    kinds: HashSet<InterfaceKind>,
}

impl KindFilter {
    /// Creates a kind filter matching any of the specified kinds.
    #[must_use]
    pub fn new(kinds: impl IntoIterator<Item = InterfaceKind>) -> Self {
        Self {
            kinds: kinds.into_iter().collect(),
        }
    }

    /// Returns true if no kinds are configured (matches nothing).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

impl InterfaceFilter for KindFilter {
    fn matches(&self, interface: &InterfaceSnapshot) -> bool {
        self.kinds.contains(&interface.kind)
    }
}

/// Matches interfaces by name pattern.
#[derive(Debug)]
pub struct NameRegexFilter {
    pattern: Regex,
}

impl NameRegexFilter {
    /// Creates a name filter with the given regex pattern.
    ///
    /// # Errors
    ///
    /// Returns an error if the regex pattern is invalid.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
        })
    }

    /// Returns a reference to the regex pattern.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // Regex is not a const type
    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }
}

impl InterfaceFilter for NameRegexFilter {
    fn matches(&self, interface: &InterfaceSnapshot) -> bool {
        self.pattern.is_match(&interface.name)
    }
}

/// Filter chain with include/exclude semantics.
///
/// Evaluation order:
/// 1. **Exclude filters (AND)**: Any match → reject.
/// 2. **Include filters (OR)**: Any match → accept. Empty includes = match all.
///
/// # Examples
///
/// ```
/// use netcfg_watch::network::filter::{FilterChain, InterfaceFilter, NameRegexFilter};
/// use netcfg_watch::network::{InterfaceKind, InterfaceSnapshot};
///
/// let chain = FilterChain::new()
///     .exclude(NameRegexFilter::new("^docker").unwrap())
///     .include(NameRegexFilter::new("^(eth|wlan)").unwrap());
///
/// let eth = InterfaceSnapshot::new("eth0", InterfaceKind::Ethernet, []);
/// let docker = InterfaceSnapshot::new("docker0", InterfaceKind::Virtual, []);
/// let tun = InterfaceSnapshot::new("tun0", InterfaceKind::Virtual, []);
///
/// assert!(chain.matches(&eth));
/// assert!(!chain.matches(&docker));
/// assert!(!chain.matches(&tun));
/// ```
#[derive(Default)]
pub struct FilterChain {
    includes: Vec<Box<dyn InterfaceFilter>>,
    excludes: Vec<Box<dyn InterfaceFilter>>,
}

impl FilterChain {
    /// Creates an empty filter chain (matches all interfaces).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an include filter (OR semantics).
    #[must_use]
    pub fn include<F: InterfaceFilter + 'static>(mut self, filter: F) -> Self {
        self.includes.push(Box::new(filter));
        self
    }

    /// Adds an exclude filter (rejects on ANY match, regardless of includes).
    #[must_use]
    pub fn exclude<F: InterfaceFilter + 'static>(mut self, filter: F) -> Self {
        self.excludes.push(Box::new(filter));
        self
    }

    /// Returns the total number of filters in the chain.
    #[must_use]
    pub fn len(&self) -> usize {
        self.includes.len() + self.excludes.len()
    }

    /// Returns true if no filters are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.includes.is_empty() && self.excludes.is_empty()
    }
}

impl InterfaceFilter for FilterChain {
    fn matches(&self, interface: &InterfaceSnapshot) -> bool {
        if self.excludes.iter().any(|f| f.matches(interface)) {
            return false;
        }

        self.includes.is_empty() || self.includes.iter().any(|f| f.matches(interface))
    }
}

impl std::fmt::Debug for FilterChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterChain")
            .field("include_count", &self.includes.len())
            .field("exclude_count", &self.excludes.len())
            .finish()
    }
}

/// An enumerator decorator that applies a filter to results.
#[derive(Debug)]
pub struct FilteredEnumerator<E, A> {
    inner: E,
    filter: A,
}

impl<E, A> FilteredEnumerator<E, A> {
    /// Creates a new filtered enumerator.
    #[must_use]
    pub const fn new(inner: E, filter: A) -> Self {
        Self { inner, filter }
    }

    /// Returns a reference to the filter.
    pub const fn filter(&self) -> &A {
        &self.filter
    }
}

impl<E: InterfaceEnumerator, A: InterfaceFilter> InterfaceEnumerator for FilteredEnumerator<E, A> {
    fn enumerate(&self) -> Result<Vec<InterfaceSnapshot>, EnumerationError> {
        let interfaces = self.inner.enumerate()?;
        Ok(interfaces
            .into_iter()
            .filter(|interface| self.filter.matches(interface))
            .collect())
    }
}

impl<T: InterfaceFilter + ?Sized> InterfaceFilter for &T {
    fn matches(&self, interface: &InterfaceSnapshot) -> bool {
        (*self).matches(interface)
    }
}

impl InterfaceFilter for Box<dyn InterfaceFilter> {
    fn matches(&self, interface: &InterfaceSnapshot) -> bool {
        self.as_ref().matches(interface)
    }
}

#[cfg(test)]
#[path = "filter_tests.rs"]
mod tests;
