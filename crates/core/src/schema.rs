//! Schema-level restrictions a fragment must satisfy before it is sent.

use std::collections::BTreeMap;

use crate::error::CoreError;
use crate::fragment::Fragment;
use crate::value::Value;

/// Pass/fail check supplied by the object model.
pub trait Restrictions {
    fn check(&self, fragment: &Fragment) -> Result<(), CoreError>;
}

/// Accepts every fragment.
#[derive(Debug, Default, Clone, Copy)]
pub struct Unrestricted;

impl Restrictions for Unrestricted {
    fn check(&self, _fragment: &Fragment) -> Result<(), CoreError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct ClassDef {
    /// Allowed property names and their maximum number of values (`None` = unbounded).
    properties: BTreeMap<String, Option<usize>>,
}

impl ClassDef {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn property(mut self, name: impl Into<String>) -> Self {
        self.properties.insert(name.into(), None);
        self
    }

    pub fn property_max(mut self, name: impl Into<String>, max: usize) -> Self {
        self.properties.insert(name.into(), Some(max));
        self
    }
}

/// Registry of known classes keyed by object type.
#[derive(Debug, Clone, Default)]
pub struct ClassSchema {
    classes: BTreeMap<String, ClassDef>,
}

impl ClassSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn class(mut self, object_type: impl Into<String>, def: ClassDef) -> Self {
        self.classes.insert(object_type.into(), def);
        self
    }

    fn check_value(&self, value: &Value) -> Result<(), CoreError> {
        match value {
            Value::Fragment(nested) => self.check(nested),
            Value::List(items) => items.iter().try_for_each(|v| self.check_value(v)),
            _ => Ok(()),
        }
    }
}

impl Restrictions for ClassSchema {
    fn check(&self, fragment: &Fragment) -> Result<(), CoreError> {
        let object_type = fragment.object_type();
        let def = self
            .classes
            .get(object_type)
            .ok_or_else(|| CoreError::restriction(object_type, "unknown class"))?;

        for (name, values) in fragment.properties() {
            let max = def.properties.get(name).ok_or_else(|| {
                CoreError::restriction(object_type, format!("property '{name}' not allowed"))
            })?;
            if let Some(max) = max {
                if values.len() > *max {
                    return Err(CoreError::restriction(
                        object_type,
                        format!("property '{name}' has {} values (max {max})", values.len()),
                    ));
                }
            }
            values.iter().try_for_each(|v| self.check_value(v))?;
        }
        Ok(())
    }
}
