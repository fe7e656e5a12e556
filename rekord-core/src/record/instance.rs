// Record instances: construction and attribute access

use super::RecordType;
use crate::data::Value;
use crate::error::{AttributeError, ConstructionError, FrozenInstanceError, Mutation, MutationError};
use crate::field::Field;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::trace;

static NEXT_INSTANCE_ID: AtomicU64 = AtomicU64::new(1);

/// A constructor parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub type_tag: String,
    pub default: ParamDefault,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParamDefault {
    Required,
    Value(Value),
    /// Optional, filled by the named factory inside the constructor
    Factory(String),
}

/// Arguments for a constructor call
#[derive(Debug, Clone, Default)]
pub struct Arguments {
    positional: Vec<Value>,
    named: Vec<(String, Value)>,
}

impl Arguments {
    pub fn new() -> Self {
        Arguments::default()
    }

    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.named.push((name.into(), value.into()));
        self
    }

    pub fn len(&self) -> usize {
        self.positional.len() + self.named.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Vec<Value>> for Arguments {
    fn from(positional: Vec<Value>) -> Self {
        Arguments {
            positional,
            named: Vec::new(),
        }
    }
}

/// An instance of a record type
#[derive(Debug)]
pub struct Instance {
    pub(crate) record_type: RecordType,
    pub(crate) id: u64,
    pub(crate) slots: Vec<Option<Value>>,
}

impl RecordType {
    /// Run the generated constructor
    pub fn construct(&self, args: Arguments) -> Result<Instance, ConstructionError> {
        let fields = self.fields();
        let record = self.name();
        let mut slots: Vec<Option<Value>> = vec![None; fields.len()];

        if self.options().init {
            let params = self.init_indices();
            if args.positional.len() > params.len() {
                return Err(ConstructionError::TooManyArguments {
                    record: record.to_string(),
                    expected: params.len(),
                    given: args.positional.len(),
                });
            }
            for (value, &index) in args.positional.into_iter().zip(params.iter()) {
                slots[index] = Some(value);
            }
            for (name, value) in args.named {
                let index = params
                    .iter()
                    .copied()
                    .find(|&index| fields[index].name == name)
                    .ok_or_else(|| ConstructionError::UnexpectedKeyword {
                        record: record.to_string(),
                        name: name.clone(),
                    })?;
                if slots[index].is_some() {
                    return Err(ConstructionError::MultipleValues {
                        record: record.to_string(),
                        name,
                    });
                }
                slots[index] = Some(value);
            }

            let missing: Vec<String> = params
                .iter()
                .filter(|&&index| slots[index].is_none() && !fields[index].has_default())
                .map(|&index| fields[index].name.clone())
                .collect();
            if !missing.is_empty() {
                return Err(ConstructionError::MissingArguments {
                    record: record.to_string(),
                    names: missing,
                });
            }
        } else if !args.positional.is_empty() {
            return Err(ConstructionError::TooManyArguments {
                record: record.to_string(),
                expected: 0,
                given: args.positional.len(),
            });
        } else if let Some((name, _)) = args.named.into_iter().next() {
            return Err(ConstructionError::UnexpectedKeyword {
                record: record.to_string(),
                name,
            });
        }

        // every slot still empty takes its default; factories run per instance
        for (slot, field) in slots.iter_mut().zip(fields.iter()) {
            if slot.is_none() {
                *slot = field.default.produce();
            }
        }

        let mut instance = Instance {
            record_type: self.clone(),
            id: NEXT_INSTANCE_ID.fetch_add(1, Ordering::Relaxed),
            slots,
        };

        if let Some(hook) = &self.descriptor().post_init {
            (hook.0)(&mut InitContext {
                instance: &mut instance,
            })?;
        }

        trace!(record, id = instance.id, "constructed instance");
        Ok(instance)
    }
}

impl Instance {
    pub fn record_type(&self) -> &RecordType {
        &self.record_type
    }

    /// Identity of this instance, unique within the process
    pub fn id(&self) -> u64 {
        self.id
    }

    fn slot_index(&self, name: &str) -> Result<usize, AttributeError> {
        self.record_type
            .descriptor()
            .field_index(name)
            .ok_or_else(|| AttributeError::Unknown {
                record: self.record_type.name().to_string(),
                name: name.to_string(),
            })
    }

    /// Field value, falling back to class variables
    pub fn get(&self, name: &str) -> Result<&Value, AttributeError> {
        match self.record_type.descriptor().field_index(name) {
            Some(index) => self.slots[index].as_ref().ok_or_else(|| AttributeError::Unset {
                record: self.record_type.name().to_string(),
                name: name.to_string(),
            }),
            None => self.record_type.class_attribute(name).ok_or_else(|| {
                AttributeError::Unknown {
                    record: self.record_type.name().to_string(),
                    name: name.to_string(),
                }
            }),
        }
    }

    /// Fields paired with their current values, in field order
    pub fn values(&self) -> impl Iterator<Item = (&Field, Option<&Value>)> {
        self.record_type
            .fields()
            .iter()
            .zip(self.slots.iter().map(Option::as_ref))
    }

    fn guard(&self, name: &str, mutation: Mutation) -> Result<(), FrozenInstanceError> {
        if self.record_type.options().frozen {
            return Err(FrozenInstanceError {
                record: self.record_type.name().to_string(),
                field: name.to_string(),
                mutation,
            });
        }
        Ok(())
    }

    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<(), MutationError> {
        self.guard(name, Mutation::Assign)?;
        let index = self.slot_index(name)?;
        self.slots[index] = Some(value.into());
        Ok(())
    }

    pub fn delete(&mut self, name: &str) -> Result<(), MutationError> {
        self.guard(name, Mutation::Delete)?;
        let index = self.slot_index(name)?;
        match self.slots[index].take() {
            Some(_) => Ok(()),
            None => Err(AttributeError::Unset {
                record: self.record_type.name().to_string(),
                name: name.to_string(),
            }
            .into()),
        }
    }

    /// A new instance with some init fields changed, built through the
    /// generated constructor.
    pub fn replace(&self, changes: Vec<(String, Value)>) -> Result<Instance, ConstructionError> {
        let descriptor = self.record_type.descriptor();
        let params = self.record_type.init_indices();
        for (name, _) in &changes {
            match descriptor.field_index(name) {
                Some(index) if params.contains(&index) => {}
                Some(_) => {
                    return Err(ConstructionError::NotInitField {
                        record: descriptor.name().to_string(),
                        name: name.clone(),
                    })
                }
                None => {
                    return Err(ConstructionError::UnexpectedKeyword {
                        record: descriptor.name().to_string(),
                        name: name.clone(),
                    })
                }
            }
        }

        let mut args = Arguments::new();
        for &index in &params {
            let name = &descriptor.fields()[index].name;
            if changes.iter().any(|(changed, _)| changed == name) {
                continue;
            }
            args = args.kwarg(name.clone(), self.get(name)?.clone());
        }
        for (name, value) in changes {
            args = args.kwarg(name, value);
        }
        self.record_type.construct(args)
    }
}

/// Access to an instance while its post-init hook runs.
///
/// Assignments here bypass the frozen guard.
pub struct InitContext<'a> {
    instance: &'a mut Instance,
}

impl InitContext<'_> {
    pub fn record_type(&self) -> &RecordType {
        &self.instance.record_type
    }

    pub fn get(&self, name: &str) -> Result<&Value, AttributeError> {
        self.instance.get(name)
    }

    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<(), AttributeError> {
        let index = self.instance.slot_index(name)?;
        self.instance.slots[index] = Some(value.into());
        Ok(())
    }
}
