use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::CoreError;
use crate::schema::Restrictions;
use crate::value::Value;

/// A typed bundle of property assertions about one graph object.
///
/// `about` is `None` until the operation builder has looked at the fragment;
/// afterwards an unbound fragment carries `Some("")`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fragment {
    object_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    about: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    properties: BTreeMap<String, Vec<Value>>,
}

impl Fragment {
    pub fn new(object_type: impl Into<String>) -> Self {
        Self {
            object_type: object_type.into(),
            about: None,
            properties: BTreeMap::new(),
        }
    }

    pub fn with_about(mut self, about: impl Into<String>) -> Self {
        self.about = Some(about.into());
        self
    }

    /// Replaces all values of `name` with a single value.
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(name.into(), vec![value.into()]);
        self
    }

    /// Appends a value to `name`, keeping existing values.
    pub fn push_property(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.properties
            .entry(name.into())
            .or_default()
            .push(value.into());
    }

    pub fn remove_property(&mut self, name: &str) -> Option<Vec<Value>> {
        self.properties.remove(name)
    }

    pub fn object_type(&self) -> &str {
        &self.object_type
    }

    /// The identifier of this fragment; empty when unbound.
    pub fn about(&self) -> &str {
        self.about.as_deref().unwrap_or("")
    }

    /// Whether `about` was ever assigned, even to the empty marker.
    pub fn about_is_set(&self) -> bool {
        self.about.is_some()
    }

    pub fn has_identity(&self) -> bool {
        !self.about().is_empty()
    }

    pub fn set_about(&mut self, about: impl Into<String>) {
        self.about = Some(about.into());
    }

    /// Drops the identifier, leaving the explicit empty marker.
    pub fn clear_about(&mut self) {
        self.about = Some(String::new());
    }

    /// Replaces an unset `about` with the explicit empty marker.
    pub(crate) fn mark_about_checked(&mut self) {
        if self.about.is_none() {
            self.about = Some(String::new());
        }
    }

    pub fn properties(&self) -> &BTreeMap<String, Vec<Value>> {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&[Value]> {
        self.properties.get(name).map(Vec::as_slice)
    }

    pub fn property_count(&self) -> usize {
        self.properties.len()
    }

    /// True when the fragment names an object but asserts nothing about it.
    pub fn is_identity_only(&self) -> bool {
        self.properties.is_empty()
    }

    /// A fresh fragment of the same class carrying only this fragment's identifier.
    pub fn same_type_identity(&self) -> Self {
        Self {
            object_type: self.object_type.clone(),
            about: Some(self.about().to_string()),
            properties: BTreeMap::new(),
        }
    }

    pub fn within_restrictions(&self, restrictions: &dyn Restrictions) -> Result<(), CoreError> {
        restrictions.check(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_about_reads_as_empty() {
        let f = Fragment::new("Person");
        assert_eq!(f.about(), "");
        assert!(!f.about_is_set());
        assert!(!f.has_identity());
    }

    #[test]
    fn mark_checked_only_touches_unset() {
        let mut unset = Fragment::new("Person");
        unset.mark_about_checked();
        assert!(unset.about_is_set());
        assert_eq!(unset.about(), "");

        let mut bound = Fragment::new("Person").with_about("u1");
        bound.mark_about_checked();
        assert_eq!(bound.about(), "u1");
    }

    #[test]
    fn property_count_counts_names_not_values() {
        let mut f = Fragment::new("Person").with_property("givenName", "Derek");
        f.push_property("nickname", "DJ");
        f.push_property("nickname", "Captain");
        assert_eq!(f.property_count(), 2);
        assert_eq!(f.property("nickname").map(<[Value]>::len), Some(2));
        assert!(!f.is_identity_only());
    }

    #[test]
    fn same_type_identity_drops_properties() {
        let f = Fragment::new("Person")
            .with_about("u1")
            .with_property("givenName", "Derek");
        let id = f.same_type_identity();
        assert_eq!(id.object_type(), "Person");
        assert_eq!(id.about(), "u1");
        assert!(id.is_identity_only());
    }
}
