// Record descriptor builder

use super::{
    HashAction, HashPolicy, InitContext, Policy, PostInit, RecordDescriptor, RecordOptions,
    RecordType,
};
use crate::error::{ConfigurationError, MutationError};
use crate::field::{validate_identifier, ClassAttr, Declared, Field, FieldDecl};
use std::sync::Arc;
use tracing::debug;

/// Collects declarations for one record type and resolves them into a
/// [`RecordType`].
#[derive(Debug)]
pub struct RecordBuilder {
    name: String,
    ancestors: Vec<RecordType>,
    decls: Vec<FieldDecl>,
    options: RecordOptions,
    post_init: Option<PostInit>,
}

impl RecordBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        RecordBuilder {
            name: name.into(),
            ancestors: Vec::new(),
            decls: Vec::new(),
            options: RecordOptions::default(),
            post_init: None,
        }
    }

    /// Single inheritance: the base followed by its own ancestors
    pub fn extends(mut self, base: &RecordType) -> Self {
        self.ancestors = std::iter::once(base.clone())
            .chain(base.descriptor().ancestors().iter().cloned())
            .collect();
        self
    }

    /// An already linearized ancestor list, most derived first
    pub fn with_ancestors(mut self, ancestors: Vec<RecordType>) -> Self {
        self.ancestors = ancestors;
        self
    }

    pub fn field(mut self, decl: FieldDecl) -> Self {
        self.decls.push(decl);
        self
    }

    pub fn fields(mut self, decls: impl IntoIterator<Item = FieldDecl>) -> Self {
        self.decls.extend(decls);
        self
    }

    pub fn options(mut self, options: RecordOptions) -> Self {
        self.options = options;
        self
    }

    pub fn init(mut self, init: bool) -> Self {
        self.options.init = init;
        self
    }

    pub fn repr(mut self, repr: bool) -> Self {
        self.options.repr = repr;
        self
    }

    pub fn compare(mut self, compare: bool) -> Self {
        self.options.compare = compare;
        self
    }

    pub fn hash(mut self, hash: bool) -> Self {
        self.options.hash = Some(hash);
        self
    }

    pub fn frozen(mut self, frozen: bool) -> Self {
        self.options.frozen = frozen;
        self
    }

    pub fn post_init<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut InitContext<'_>) -> Result<(), MutationError> + Send + Sync + 'static,
    {
        self.post_init = Some(PostInit(Arc::new(hook)));
        self
    }

    pub fn build(self) -> Result<RecordType, ConfigurationError> {
        validate_identifier(&self.name)?;

        let mut own_fields: Vec<Field> = Vec::new();
        let mut class_vars: Vec<ClassAttr> = Vec::new();
        let mut seen: Vec<String> = Vec::new();
        for decl in self.decls {
            let declared = decl.resolve()?;
            if seen.iter().any(|name| name == declared.name()) {
                return Err(ConfigurationError::DuplicateField {
                    record: self.name,
                    field: declared.name().to_string(),
                });
            }
            seen.push(declared.name().to_string());
            match declared {
                Declared::Field(field) => own_fields.push(field),
                Declared::ClassVar(attr) => class_vars.push(attr),
            }
        }

        if let Some(ancestor) = self
            .ancestors
            .iter()
            .find(|ancestor| ancestor.options().frozen != self.options.frozen)
        {
            return Err(ConfigurationError::FrozenInheritance {
                record: self.name,
                ancestor: ancestor.name().to_string(),
                frozen: self.options.frozen,
            });
        }

        // most base first, each later declaration overwriting in place
        let mut fields: Vec<Field> = Vec::new();
        for ancestor in self.ancestors.iter().rev() {
            for field in ancestor.descriptor().own_fields() {
                merge_field(&mut fields, field.clone());
            }
        }
        if let Some(attr) = class_vars
            .iter()
            .find(|attr| fields.iter().any(|field| field.name == attr.name))
        {
            return Err(ConfigurationError::ClassVarShadowsField {
                record: self.name,
                field: attr.name.clone(),
            });
        }
        for field in &own_fields {
            merge_field(&mut fields, field.clone());
        }

        check_default_order(&self.name, &fields, self.options.init)?;

        let options = self.options;
        let repr_policy = if options.repr {
            Policy::Fields(select(&fields, |field| field.repr))
        } else {
            inherited_policy(&self.ancestors, &fields, |o| o.repr, |d| &d.repr_policy)
        };
        let compare_policy = if options.compare {
            Policy::Fields(select(&fields, |field| field.compare))
        } else {
            inherited_policy(&self.ancestors, &fields, |o| o.compare, |d| {
                &d.compare_policy
            })
        };

        let hash_action = match (options.hash, options.compare, options.frozen) {
            (Some(true), _, _) => HashAction::Generate,
            (Some(false), _, _) => HashAction::Disable,
            (None, true, true) => HashAction::Generate,
            (None, true, false) => HashAction::Disable,
            (None, false, _) => HashAction::Inherit,
        };
        let hash_policy = match hash_action {
            HashAction::Generate => HashPolicy::Fields(select(&fields, Field::hashed)),
            HashAction::Disable => HashPolicy::Unhashable,
            HashAction::Inherit => inherited_hash(&self.ancestors, &fields),
        };

        debug!(
            record = %self.name,
            fields = fields.len(),
            class_vars = class_vars.len(),
            ancestors = self.ancestors.len(),
            hash = %hash_action,
            frozen = options.frozen,
            "built record descriptor"
        );

        // a record without its own hook runs the nearest ancestor's
        let post_init = self.post_init.or_else(|| {
            self.ancestors
                .iter()
                .find_map(|ancestor| ancestor.descriptor().post_init.clone())
        });

        Ok(RecordType::from_descriptor(RecordDescriptor {
            name: self.name,
            ancestors: self.ancestors,
            own_fields,
            fields,
            class_vars,
            options,
            hash_action,
            repr_policy,
            compare_policy,
            hash_policy,
            post_init,
        }))
    }
}

fn merge_field(fields: &mut Vec<Field>, field: Field) {
    match fields.iter_mut().find(|existing| existing.name == field.name) {
        Some(existing) => *existing = field,
        None => fields.push(field),
    }
}

/// Among constructor parameters, a required one may not follow a defaulted one
fn check_default_order(
    record: &str,
    fields: &[Field],
    init: bool,
) -> Result<(), ConfigurationError> {
    if !init {
        return Ok(());
    }
    let mut last_default: Option<&str> = None;
    for field in fields.iter().filter(|field| field.init) {
        if field.has_default() {
            last_default = Some(&field.name);
        } else if let Some(after) = last_default {
            return Err(ConfigurationError::NonDefaultAfterDefault {
                record: record.to_string(),
                field: field.name.clone(),
                after: after.to_string(),
            });
        }
    }
    Ok(())
}

fn select(fields: &[Field], include: impl Fn(&Field) -> bool) -> Vec<usize> {
    fields
        .iter()
        .enumerate()
        .filter(|(_, field)| include(field))
        .map(|(index, _)| index)
        .collect()
}

/// Translate indices into an ancestor's fields to indices into `to`
fn remap(indices: &[usize], from: &[Field], to: &[Field]) -> Vec<usize> {
    indices
        .iter()
        .filter_map(|&index| {
            let name = &from[index].name;
            to.iter().position(|field| &field.name == name)
        })
        .collect()
}

/// The behavior of the nearest ancestor that generates one
fn inherited_policy(
    ancestors: &[RecordType],
    fields: &[Field],
    generates: impl Fn(&RecordOptions) -> bool,
    policy: impl Fn(&RecordDescriptor) -> &Policy,
) -> Policy {
    match ancestors.iter().find(|ancestor| generates(ancestor.options())) {
        Some(ancestor) => match policy(ancestor.descriptor()) {
            Policy::Fields(indices) => Policy::Fields(remap(indices, ancestor.fields(), fields)),
            Policy::Identity => Policy::Identity,
        },
        None => Policy::Identity,
    }
}

fn inherited_hash(ancestors: &[RecordType], fields: &[Field]) -> HashPolicy {
    let decided = ancestors
        .iter()
        .find(|ancestor| ancestor.descriptor().hash_action() != HashAction::Inherit);
    match decided {
        Some(ancestor) => match ancestor.descriptor().hash_policy() {
            HashPolicy::Fields(indices) => {
                HashPolicy::Fields(remap(indices, ancestor.fields(), fields))
            }
            HashPolicy::Unhashable => HashPolicy::Unhashable,
            HashPolicy::Identity => HashPolicy::Identity,
        },
        None => HashPolicy::Identity,
    }
}
