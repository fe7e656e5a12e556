// Record descriptors and the types built from them

mod behavior;
mod builder;
mod instance;

pub use builder::RecordBuilder;
pub use instance::{Arguments, InitContext, Instance, ParamDefault, Parameter};

use crate::data::Value;
use crate::error::MutationError;
use crate::field::{ClassAttr, DefaultSpec, Field};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Which behaviors to generate for a record type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordOptions {
    pub init: bool,
    pub repr: bool,
    pub compare: bool,
    /// `None` derives hashing from `compare` and `frozen`
    pub hash: Option<bool>,
    pub frozen: bool,
}

impl Default for RecordOptions {
    fn default() -> Self {
        RecordOptions {
            init: true,
            repr: true,
            compare: true,
            hash: None,
            frozen: false,
        }
    }
}

/// The resolved hashing decision for a record type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HashAction {
    /// Hash the tuple of hashed fields
    Generate,
    /// Instances are unhashable
    Disable,
    /// Keep whatever the ancestors provide, identity hashing by default
    Inherit,
}

impl fmt::Display for HashAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HashAction::Generate => write!(f, "generate"),
            HashAction::Disable => write!(f, "disable"),
            HashAction::Inherit => write!(f, "inherit"),
        }
    }
}

/// Field selection of a generated behavior, or the ambient identity-based one.
/// Indices point into the record's merged field list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Policy {
    Fields(Vec<usize>),
    Identity,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HashPolicy {
    Fields(Vec<usize>),
    Unhashable,
    Identity,
}

/// Hook run once all fields are assigned
#[derive(Clone)]
pub struct PostInit(
    pub(crate) Arc<dyn Fn(&mut InitContext<'_>) -> Result<(), MutationError> + Send + Sync>,
);

impl fmt::Debug for PostInit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PostInit")
    }
}

/// The resolved, immutable view of a record type
#[derive(Debug)]
pub struct RecordDescriptor {
    pub(crate) name: String,
    pub(crate) ancestors: Vec<RecordType>,
    pub(crate) own_fields: Vec<Field>,
    pub(crate) fields: Vec<Field>,
    pub(crate) class_vars: Vec<ClassAttr>,
    pub(crate) options: RecordOptions,
    pub(crate) hash_action: HashAction,
    pub(crate) repr_policy: Policy,
    pub(crate) compare_policy: Policy,
    pub(crate) hash_policy: HashPolicy,
    pub(crate) post_init: Option<PostInit>,
}

impl RecordDescriptor {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Linearized ancestors, most derived first
    pub fn ancestors(&self) -> &[RecordType] {
        &self.ancestors
    }

    /// Merged fields: inherited ones first, overrides in place
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Instance fields declared by this record itself
    pub fn own_fields(&self) -> &[Field] {
        &self.own_fields
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|field| field.name == name)
    }

    pub fn class_vars(&self) -> &[ClassAttr] {
        &self.class_vars
    }

    pub fn options(&self) -> &RecordOptions {
        &self.options
    }

    pub fn hash_action(&self) -> HashAction {
        self.hash_action
    }

    pub fn repr_policy(&self) -> &Policy {
        &self.repr_policy
    }

    pub fn compare_policy(&self) -> &Policy {
        &self.compare_policy
    }

    pub fn hash_policy(&self) -> &HashPolicy {
        &self.hash_policy
    }

    pub fn has_post_init(&self) -> bool {
        self.post_init.is_some()
    }
}

/// Shared handle to a built record type.
///
/// Two handles denote the same type only if they come from the same build.
#[derive(Clone)]
pub struct RecordType(Arc<RecordDescriptor>);

impl RecordType {
    pub(crate) fn from_descriptor(descriptor: RecordDescriptor) -> Self {
        RecordType(Arc::new(descriptor))
    }

    pub fn descriptor(&self) -> &RecordDescriptor {
        &self.0
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn fields(&self) -> &[Field] {
        &self.0.fields
    }

    pub fn options(&self) -> &RecordOptions {
        &self.0.options
    }

    pub fn same_type(&self, other: &RecordType) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn is_subtype_of(&self, other: &RecordType) -> bool {
        self.same_type(other) || self.0.ancestors.iter().any(|a| a.same_type(other))
    }

    pub fn is_hashable(&self) -> bool {
        self.0.hash_policy != HashPolicy::Unhashable
    }

    /// A class variable, looked up through the ancestors
    pub fn class_attribute(&self, name: &str) -> Option<&Value> {
        std::iter::once(self)
            .chain(self.0.ancestors.iter())
            .flat_map(|ty| ty.0.class_vars.iter())
            .find(|attr| attr.name == name)
            .and_then(|attr| attr.value.as_ref())
    }

    /// Indices of the fields accepted as constructor parameters
    pub(crate) fn init_indices(&self) -> Vec<usize> {
        if !self.0.options.init {
            return Vec::new();
        }
        self.0
            .fields
            .iter()
            .enumerate()
            .filter(|(_, field)| field.init)
            .map(|(index, _)| index)
            .collect()
    }

    /// Parameters of the generated constructor, in order
    pub fn signature(&self) -> Vec<Parameter> {
        self.init_indices()
            .into_iter()
            .map(|index| {
                let field = &self.0.fields[index];
                Parameter {
                    name: field.name.clone(),
                    type_tag: field.type_tag.clone(),
                    default: match &field.default {
                        DefaultSpec::Missing => ParamDefault::Required,
                        DefaultSpec::Value(value) => ParamDefault::Value(value.clone()),
                        DefaultSpec::Factory(factory) => {
                            ParamDefault::Factory(factory.name().to_string())
                        }
                    },
                }
            })
            .collect()
    }
}

impl fmt::Debug for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RecordType").field(&self.0.name).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{Factory, FieldDecl};

    #[test]
    fn test_options_defaults() {
        let options = RecordOptions::default();
        assert!(options.init && options.repr && options.compare);
        assert_eq!(options.hash, None);
        assert!(!options.frozen);

        let parsed: RecordOptions = serde_json::from_str(r#"{"frozen": true}"#).unwrap();
        assert_eq!(
            parsed,
            RecordOptions {
                frozen: true,
                ..RecordOptions::default()
            }
        );
    }

    #[test]
    fn test_signature_hides_factory_defaults() {
        let ty = RecordBuilder::new("Bag")
            .field(FieldDecl::new("name", "str"))
            .field(FieldDecl::new("items", "list").with_factory(Factory::list()))
            .field(FieldDecl::new("count", "int").with_default(0))
            .field(FieldDecl::new("cache", "dict").with_factory(Factory::map()).with_init(false))
            .build()
            .unwrap();

        let signature = ty.signature();
        let names: Vec<&str> = signature.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["name", "items", "count"]);
        assert_eq!(signature[0].default, ParamDefault::Required);
        assert_eq!(signature[1].default, ParamDefault::Factory("list".to_string()));
        assert_eq!(signature[2].default, ParamDefault::Value(Value::Int(0)));
    }

    #[test]
    fn test_class_attribute_lookup() {
        let base = RecordBuilder::new("Base")
            .field(FieldDecl::class_var("kind", "str").with_default("base"))
            .build()
            .unwrap();
        let derived = RecordBuilder::new("Derived").extends(&base).build().unwrap();

        assert_eq!(derived.class_attribute("kind"), Some(&Value::str("base")));
        assert_eq!(derived.class_attribute("missing"), None);
        assert!(derived.fields().is_empty());
        assert!(derived.is_subtype_of(&base));
        assert!(!base.is_subtype_of(&derived));
    }
}
