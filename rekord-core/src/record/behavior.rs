// Generated behaviors: representation, comparison, hashing, conversion

use super::{HashPolicy, Instance, Policy};
use crate::data::Value;
use crate::error::{AttributeError, NotComparable, UnhashableError};
use std::cmp::Ordering;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

impl Instance {
    /// `Name(a=1, b='x')` over the repr fields, or `<Name object #id>` when
    /// no repr is generated anywhere in the hierarchy.
    pub fn repr(&self) -> String {
        let name = self.record_type.name();
        match self.record_type.descriptor().repr_policy() {
            Policy::Fields(indices) => {
                let fields = self.record_type.fields();
                let parts: Vec<String> = indices
                    .iter()
                    .map(|&index| match &self.slots[index] {
                        Some(value) => format!("{}={}", fields[index].name, value),
                        None => format!("{}=<unset>", fields[index].name),
                    })
                    .collect();
                format!("{}({})", name, parts.join(", "))
            }
            Policy::Identity => format!("<{} object #{}>", name, self.id),
        }
    }

    fn not_comparable(&self, other: &Instance) -> NotComparable {
        NotComparable {
            left: self.record_type.name().to_string(),
            right: other.record_type.name().to_string(),
        }
    }

    /// Ordering over the compared fields. Only instances of the exact same
    /// record type are ordered; a subtype is not comparable with its base.
    pub fn try_cmp(&self, other: &Instance) -> Result<Ordering, NotComparable> {
        if !self.record_type.same_type(&other.record_type) {
            return Err(self.not_comparable(other));
        }
        let indices = match self.record_type.descriptor().compare_policy() {
            Policy::Fields(indices) => indices,
            Policy::Identity => return Err(self.not_comparable(other)),
        };
        if self.id == other.id {
            return Ok(Ordering::Equal);
        }
        for &index in indices {
            let (a, b) = (&self.slots[index], &other.slots[index]);
            if a == b {
                continue;
            }
            return match (a, b) {
                (Some(a), Some(b)) => a.partial_cmp(b).ok_or_else(|| self.not_comparable(other)),
                _ => Err(self.not_comparable(other)),
            };
        }
        Ok(Ordering::Equal)
    }

    pub fn try_hash(&self) -> Result<u64, UnhashableError> {
        let mut hasher = DefaultHasher::new();
        match self.record_type.descriptor().hash_policy() {
            HashPolicy::Fields(indices) => {
                // hashed like a tuple of the selected values
                6u8.hash(&mut hasher);
                indices.len().hash(&mut hasher);
                for &index in indices {
                    match &self.slots[index] {
                        Some(value) => value.hash_into(&mut hasher)?,
                        None => u8::MAX.hash(&mut hasher),
                    }
                }
            }
            HashPolicy::Unhashable => {
                return Err(UnhashableError {
                    type_name: self.record_type.name().to_string(),
                })
            }
            HashPolicy::Identity => self.id.hash(&mut hasher),
        }
        Ok(hasher.finish())
    }

    /// Field names mapped to values, recursing into nested records and
    /// containers.
    pub fn as_map(&self) -> Result<Value, AttributeError> {
        let mut pairs = Vec::with_capacity(self.slots.len());
        for (field, value) in self.values() {
            let value = value.ok_or_else(|| self.unset(&field.name))?;
            pairs.push((Value::str(field.name.clone()), convert(value, Shape::Map)?));
        }
        Ok(Value::Map(pairs))
    }

    /// Field values as a tuple, recursing like [`Instance::as_map`]
    pub fn as_tuple(&self) -> Result<Value, AttributeError> {
        let mut items = Vec::with_capacity(self.slots.len());
        for (field, value) in self.values() {
            let value = value.ok_or_else(|| self.unset(&field.name))?;
            items.push(convert(value, Shape::Tuple)?);
        }
        Ok(Value::Tuple(items))
    }

    fn unset(&self, name: &str) -> AttributeError {
        AttributeError::Unset {
            record: self.record_type.name().to_string(),
            name: name.to_string(),
        }
    }
}

#[derive(Clone, Copy)]
enum Shape {
    Map,
    Tuple,
}

fn convert(value: &Value, shape: Shape) -> Result<Value, AttributeError> {
    let all = |items: &[Value]| -> Result<Vec<Value>, AttributeError> {
        items.iter().map(|item| convert(item, shape)).collect()
    };
    Ok(match value {
        Value::Record(instance) => match shape {
            Shape::Map => instance.as_map()?,
            Shape::Tuple => instance.as_tuple()?,
        },
        Value::Tuple(items) => Value::Tuple(all(items)?),
        Value::List(items) => Value::List(all(items)?),
        Value::Set(items) => Value::Set(all(items)?),
        Value::Map(pairs) => Value::Map(
            pairs
                .iter()
                .map(|(k, v)| Ok((convert(k, shape)?, convert(v, shape)?)))
                .collect::<Result<_, AttributeError>>()?,
        ),
        other => other.clone(),
    })
}

impl PartialEq for Instance {
    /// Instances of different record types are never equal, whatever their
    /// field values.
    fn eq(&self, other: &Instance) -> bool {
        if self.id == other.id {
            return true;
        }
        if !self.record_type.same_type(&other.record_type) {
            return false;
        }
        match self.record_type.descriptor().compare_policy() {
            Policy::Fields(indices) => indices
                .iter()
                .all(|&index| self.slots[index] == other.slots[index]),
            Policy::Identity => false,
        }
    }
}

impl PartialOrd for Instance {
    fn partial_cmp(&self, other: &Instance) -> Option<Ordering> {
        self.try_cmp(other).ok()
    }
}

impl fmt::Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.repr())
    }
}
