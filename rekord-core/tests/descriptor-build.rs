// Descriptor building: inheritance merge, ordering rules, rejected defaults

mod common;

use common::*;
use proptest::prelude::*;
use rekord_core::data::Value;
use rekord_core::error::ConfigurationError;
use rekord_core::field::{DefaultSpec, Factory, FieldDecl};
use rekord_core::record::{HashAction, HashPolicy, ParamDefault, RecordBuilder};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// The constructor takes exactly the init fields, in declaration order
    #[test]
    fn test_signature_is_init_subset(fields in arb_fields()) {
        let ty = build("Generated", &fields);
        let expected: Vec<String> = fields
            .iter()
            .filter(|f| f.init)
            .map(|f| f.name.clone())
            .collect();
        let actual: Vec<String> = ty.signature().into_iter().map(|p| p.name).collect();
        prop_assert_eq!(actual, expected);
    }

    /// A required init field placed after a defaulted one is always rejected
    #[test]
    fn test_required_after_default_rejected(
        fields in arb_fields(),
        default in arb_int()
    ) {
        let mut decls: Vec<FieldDecl> = fields.iter().map(FieldShape::decl).collect();
        decls.push(FieldDecl::new("with_default", "int").with_default(default));
        decls.push(FieldDecl::new("required", "int"));
        let result = RecordBuilder::new("Bad").fields(decls).build();
        let is_ordering_error = matches!(
            result,
            Err(ConfigurationError::NonDefaultAfterDefault { ref field, .. }) if field == "required"
        );
        prop_assert!(is_ordering_error);
    }

    /// The hash decision follows the compare/frozen/hash matrix
    #[test]
    fn test_hash_matrix(
        compare in any::<bool>(),
        frozen in any::<bool>(),
        hash in proptest::option::of(any::<bool>())
    ) {
        let mut builder = RecordBuilder::new("T")
            .field(FieldDecl::new("a", "int"))
            .compare(compare)
            .frozen(frozen);
        if let Some(hash) = hash {
            builder = builder.hash(hash);
        }
        let ty = builder.build().unwrap();
        let expected = match (hash, compare, frozen) {
            (Some(true), _, _) | (None, true, true) => HashAction::Generate,
            (Some(false), _, _) | (None, true, false) => HashAction::Disable,
            (None, false, _) => HashAction::Inherit,
        };
        prop_assert_eq!(ty.descriptor().hash_action(), expected);
        prop_assert_eq!(ty.is_hashable(), expected != HashAction::Disable);
    }
}

#[test]
fn test_inheritance_merge_keeps_base_position() {
    let base = RecordBuilder::new("Base")
        .field(FieldDecl::new("x", "Any").with_default(15.0))
        .field(FieldDecl::new("y", "int").with_default(0))
        .build()
        .unwrap();
    let c = RecordBuilder::new("C")
        .extends(&base)
        .field(FieldDecl::new("z", "int").with_default(10))
        .field(FieldDecl::new("x", "int").with_default(15))
        .build()
        .unwrap();

    let names: Vec<&str> = c.fields().iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["x", "y", "z"]);
    assert_eq!(c.fields()[0].type_tag, "int");
    match &c.fields()[0].default {
        DefaultSpec::Value(Value::Int(15)) => {}
        other => panic!("expected int default 15, got {:?}", other),
    }

    let p = c.construct(Default::default()).unwrap();
    assert_eq!(p.repr(), "C(x=15, y=0, z=10)");
    // the base keeps its own view
    assert_eq!(base.fields().len(), 2);
}

#[test]
fn test_default_and_factory_rejected() {
    let err = RecordBuilder::new("Both")
        .field(
            FieldDecl::new("xs", "list")
                .with_default(Value::Tuple(vec![]))
                .with_factory(Factory::list()),
        )
        .build()
        .unwrap_err();
    assert_eq!(err, ConfigurationError::DefaultAndFactory("xs".to_string()));
}

#[test]
fn test_literal_containers_rejected() {
    for (default, kind) in [
        (Value::List(vec![Value::Int(1)]), "list"),
        (Value::Map(vec![]), "dict"),
        (Value::set_of(vec![Value::Int(1)]), "set"),
    ] {
        let err = RecordBuilder::new("Shared")
            .field(FieldDecl::new("items", "any").with_default(default))
            .build()
            .unwrap_err();
        assert!(
            matches!(err, ConfigurationError::MutableDefault { kind: k, .. } if k == kind),
            "unexpected error {:?}",
            err
        );
    }

    // the factory is the supported spelling
    let ty = RecordBuilder::new("Shared")
        .field(FieldDecl::new("items", "list").with_factory(Factory::list()))
        .build()
        .unwrap();
    assert_eq!(
        ty.signature()[0].default,
        ParamDefault::Factory("list".to_string())
    );
}

#[test]
fn test_unhashable_when_compared_but_mutable() {
    let ty = RecordBuilder::new("Mutable")
        .field(FieldDecl::new("a", "int"))
        .build()
        .unwrap();
    assert_eq!(ty.descriptor().hash_policy(), &HashPolicy::Unhashable);
    let m = ty.construct(vec![Value::Int(1)].into()).unwrap();
    assert_eq!(m.try_hash().unwrap_err().type_name, "Mutable");
}

#[test]
fn test_hash_field_falls_back_to_compare() {
    let ty = RecordBuilder::new("Pair")
        .field(FieldDecl::new("a", "int"))
        .field(FieldDecl::new("b", "int").with_compare(false))
        .field(FieldDecl::new("c", "int").with_compare(false).with_hash(true))
        .frozen(true)
        .build()
        .unwrap();
    assert_eq!(
        ty.descriptor().hash_policy(),
        &HashPolicy::Fields(vec![0, 2])
    );
}
