// Field declarations and their resolved form

use crate::data::Value;
use crate::error::ConfigurationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Zero-argument producer of a fresh default value per instance
#[derive(Clone)]
pub struct Factory {
    name: String,
    produce: Arc<dyn Fn() -> Value + Send + Sync>,
}

impl Factory {
    pub fn new<F>(name: impl Into<String>, produce: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        Factory {
            name: name.into(),
            produce: Arc::new(produce),
        }
    }

    pub fn list() -> Self {
        Factory::new("list", || Value::List(Vec::new()))
    }

    pub fn map() -> Self {
        Factory::new("dict", || Value::Map(Vec::new()))
    }

    pub fn set() -> Self {
        Factory::new("set", || Value::Set(Vec::new()))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call(&self) -> Value {
        (self.produce)()
    }
}

impl fmt::Debug for Factory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Factory({})", self.name)
    }
}

/// Whether a declaration is an instance field or a class-scoped attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Instance,
    ClassVar,
}

/// How a field obtains a value when no argument is supplied
#[derive(Debug, Clone)]
pub enum DefaultSpec {
    Missing,
    Value(Value),
    Factory(Factory),
}

impl DefaultSpec {
    pub fn is_missing(&self) -> bool {
        matches!(self, DefaultSpec::Missing)
    }

    /// A fresh default: a copy of the literal or a new factory product
    pub fn produce(&self) -> Option<Value> {
        match self {
            DefaultSpec::Missing => None,
            DefaultSpec::Value(value) => Some(value.clone()),
            DefaultSpec::Factory(factory) => Some(factory.call()),
        }
    }
}

/// A field as declared, before validation
#[derive(Debug, Clone)]
pub struct FieldDecl {
    pub name: String,
    pub type_tag: String,
    pub kind: FieldKind,
    pub default: Option<Value>,
    pub default_factory: Option<Factory>,
    pub init: bool,
    pub repr: bool,
    pub compare: bool,
    /// `None` follows `compare`
    pub hash: Option<bool>,
}

impl FieldDecl {
    pub fn new(name: impl Into<String>, type_tag: impl Into<String>) -> Self {
        FieldDecl {
            name: name.into(),
            type_tag: type_tag.into(),
            kind: FieldKind::Instance,
            default: None,
            default_factory: None,
            init: true,
            repr: true,
            compare: true,
            hash: None,
        }
    }

    pub fn class_var(name: impl Into<String>, type_tag: impl Into<String>) -> Self {
        FieldDecl {
            kind: FieldKind::ClassVar,
            ..FieldDecl::new(name, type_tag)
        }
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn with_factory(mut self, factory: Factory) -> Self {
        self.default_factory = Some(factory);
        self
    }

    pub fn with_init(mut self, init: bool) -> Self {
        self.init = init;
        self
    }

    pub fn with_repr(mut self, repr: bool) -> Self {
        self.repr = repr;
        self
    }

    pub fn with_compare(mut self, compare: bool) -> Self {
        self.compare = compare;
        self
    }

    pub fn with_hash(mut self, hash: bool) -> Self {
        self.hash = Some(hash);
        self
    }

    /// Validate the declaration on its own, independent of its record
    pub fn resolve(self) -> Result<Declared, ConfigurationError> {
        validate_identifier(&self.name)?;

        let default = match (self.default, self.default_factory) {
            (Some(_), Some(_)) => return Err(ConfigurationError::DefaultAndFactory(self.name)),
            (Some(value), None) => {
                if let Some(kind) = value.mutable_container_kind() {
                    return Err(ConfigurationError::MutableDefault {
                        field: self.name,
                        kind,
                    });
                }
                DefaultSpec::Value(value)
            }
            (None, Some(factory)) => DefaultSpec::Factory(factory),
            (None, None) => DefaultSpec::Missing,
        };

        match self.kind {
            FieldKind::ClassVar => match default {
                DefaultSpec::Factory(_) => Err(ConfigurationError::ClassVarFactory(self.name)),
                DefaultSpec::Value(value) => Ok(Declared::ClassVar(ClassAttr {
                    name: self.name,
                    type_tag: self.type_tag,
                    value: Some(value),
                })),
                DefaultSpec::Missing => Ok(Declared::ClassVar(ClassAttr {
                    name: self.name,
                    type_tag: self.type_tag,
                    value: None,
                })),
            },
            FieldKind::Instance => Ok(Declared::Field(Field {
                name: self.name,
                type_tag: self.type_tag,
                default,
                init: self.init,
                repr: self.repr,
                compare: self.compare,
                hash: self.hash,
            })),
        }
    }
}

/// A validated declaration
#[derive(Debug, Clone)]
pub enum Declared {
    Field(Field),
    ClassVar(ClassAttr),
}

impl Declared {
    pub fn name(&self) -> &str {
        match self {
            Declared::Field(field) => &field.name,
            Declared::ClassVar(attr) => &attr.name,
        }
    }
}

/// A resolved instance field
#[derive(Debug, Clone)]
pub struct Field {
    pub name: String,
    pub type_tag: String,
    pub default: DefaultSpec,
    pub init: bool,
    pub repr: bool,
    pub compare: bool,
    pub hash: Option<bool>,
}

impl Field {
    pub fn has_default(&self) -> bool {
        !self.default.is_missing()
    }

    /// Whether the field takes part in a generated hash
    pub fn hashed(&self) -> bool {
        self.hash.unwrap_or(self.compare)
    }
}

/// A class-scoped attribute, outside all generated behavior
#[derive(Debug, Clone)]
pub struct ClassAttr {
    pub name: String,
    pub type_tag: String,
    pub value: Option<Value>,
}

pub(crate) fn validate_identifier(name: &str) -> Result<(), ConfigurationError> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(ConfigurationError::InvalidName(name.to_string()))
    }
}
