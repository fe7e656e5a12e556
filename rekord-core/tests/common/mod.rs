// Test utilities and generators for rekord property-based testing

#![allow(dead_code)]

use proptest::prelude::*;
use rekord_core::data::Value;
use rekord_core::field::FieldDecl;
use rekord_core::record::{Arguments, RecordBuilder, RecordType};

/// Generate hashable, orderable scalar values
pub fn arb_scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::None),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Int),
        (-1.0e9..1.0e9f64).prop_map(Value::Float),
        "[a-zA-Z0-9 ']{0,12}".prop_map(Value::Str),
    ]
}

/// Generate ints only, so field tuples are always orderable
pub fn arb_int() -> impl Strategy<Value = Value> {
    (-1000i64..1000).prop_map(Value::Int)
}

/// Flags of one generated field
#[derive(Debug, Clone)]
pub struct FieldShape {
    pub name: String,
    pub default: Option<Value>,
    pub init: bool,
    pub repr: bool,
    pub compare: bool,
}

impl FieldShape {
    pub fn decl(&self) -> FieldDecl {
        let mut decl = FieldDecl::new(self.name.clone(), "any")
            .with_init(self.init)
            .with_repr(self.repr)
            .with_compare(self.compare);
        if let Some(default) = &self.default {
            decl = decl.with_default(default.clone());
        }
        decl
    }
}

/// Generate a well-formed field list: required fields first, then defaulted
/// ones, some of which are left out of the constructor
pub fn arb_fields() -> impl Strategy<Value = Vec<FieldShape>> {
    (
        prop::collection::vec((any::<bool>(), any::<bool>()), 0..4),
        prop::collection::vec(
            (arb_int(), any::<bool>(), any::<bool>(), any::<bool>()),
            0..4,
        ),
    )
        .prop_map(|(required, defaulted)| {
            let mut fields = Vec::new();
            for (repr, compare) in required {
                fields.push(FieldShape {
                    name: format!("f{}", fields.len()),
                    default: None,
                    init: true,
                    repr,
                    compare,
                });
            }
            for (default, init, repr, compare) in defaulted {
                fields.push(FieldShape {
                    name: format!("f{}", fields.len()),
                    default: Some(default),
                    init,
                    repr,
                    compare,
                });
            }
            fields
        })
}

/// Generate fields together with an argument for every required one
pub fn arb_fields_and_args() -> impl Strategy<Value = (Vec<FieldShape>, Vec<Value>)> {
    arb_fields().prop_flat_map(|fields| {
        let required = fields.iter().filter(|f| f.default.is_none()).count();
        (Just(fields), prop::collection::vec(arb_int(), required))
    })
}

pub fn build(name: &str, fields: &[FieldShape]) -> RecordType {
    RecordBuilder::new(name)
        .fields(fields.iter().map(FieldShape::decl))
        .build()
        .expect("generated fields are well-formed")
}

pub fn positional(values: &[Value]) -> Arguments {
    Arguments::from(values.to_vec())
}
