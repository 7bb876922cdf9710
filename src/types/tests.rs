//! Unit tests for the type algebra, the conversion table and the comparison
//! engine.

use super::{
    compare::{compare, identical, ordinal, ComparisonFlags, ComparisonMode, ConversionWarning, Mismatch},
    conversion::{self, Conversion, ForbiddenReason, WarningKind},
    type_set::TypeSet,
    types::{ElementaryKind, Type, TypeId, TypeOperator},
};

fn leaf(set: &mut TypeSet, name: &str, ty: TypeId) -> TypeId {
    set.intern(Type::Leaf {
        name: name.to_string(),
        ty,
    })
}

fn defined(set: &mut TypeSet, name: &str, ty: TypeId) -> TypeId {
    set.intern(Type::Defined {
        name: name.to_string(),
        ty,
    })
}

fn implicit(set: &TypeSet, from: TypeId, to: TypeId) -> super::compare::ComparisonResult {
    compare(set, from, to, ComparisonMode::ImplicitConversion, ComparisonFlags::default())
}

#[test]
fn test_structural_interning() {
    let mut set = TypeSet::new();
    let i32_a = set.elementary(ElementaryKind::I32);
    let string_a = set.elementary(ElementaryKind::String);
    let first = set.sum(vec![i32_a, string_a]);

    let i32_b = set.elementary(ElementaryKind::I32);
    let string_b = set.elementary(ElementaryKind::String);
    let second = set.intern(Type::Operator {
        op: TypeOperator::Sum,
        operands: vec![i32_b, string_b],
    });

    assert_eq!(i32_a, i32_b);
    assert_eq!(first, second);
    assert_ne!(set.constant(ElementaryKind::I32), i32_a);
}

#[test]
fn test_interning_flattens_same_operator() {
    let mut set = TypeSet::new();
    let a = set.elementary(ElementaryKind::I8);
    let b = set.elementary(ElementaryKind::U8);
    let c = set.elementary(ElementaryKind::F32);

    let left = set.product(vec![a, b]);
    let nested = set.product(vec![left, c]);
    let flat = set.product(vec![a, b, c]);

    assert_eq!(nested, flat);
    assert_eq!(set.operands(flat, TypeOperator::Product).len(), 3);
}

#[test]
fn test_identical_is_reflexive() {
    let mut set = TypeSet::new();
    let u64_t = set.elementary(ElementaryKind::U64);
    let f64_t = set.elementary(ElementaryKind::F64);
    let product = set.product(vec![u64_t, f64_t]);
    let field = leaf(&mut set, "a", product);
    let foo = defined(&mut set, "foo", field);
    let array = set.array(foo, vec![Some(3), None]);
    let function = set.function(array, u64_t);

    for (id, _) in set.iter() {
        assert!(
            compare(&set, id, id, ComparisonMode::Identical, ComparisonFlags::default()).success,
            "{} is not identical to itself",
            set.to_string(id)
        );
    }
    assert!(identical(&set, function, function));
}

#[test]
fn test_identical_ignores_constness_only() {
    let mut set = TypeSet::new();
    let u8_t = set.elementary(ElementaryKind::U8);
    let u8_c = set.constant(ElementaryKind::U8);
    let u16_t = set.elementary(ElementaryKind::U16);

    assert!(identical(&set, u8_t, u8_c));
    assert!(!identical(&set, u8_t, u16_t));
}

#[test]
fn test_to_string() {
    let mut set = TypeSet::new();
    let u64_t = set.elementary(ElementaryKind::U64);
    let f64_t = set.elementary(ElementaryKind::F64);
    let i32_t = set.elementary(ElementaryKind::I32);
    let bool_t = set.elementary(ElementaryKind::Bool);
    let string_t = set.elementary(ElementaryKind::String);
    let i8_t = set.elementary(ElementaryKind::I8);

    let product = set.product(vec![u64_t, f64_t]);
    assert_eq!(set.to_string(product), "u64,f64");

    let sum = set.sum(vec![i32_t, string_t]);
    assert_eq!(set.to_string(sum), "i32|string");

    let a = leaf(&mut set, "a", i32_t);
    let b = leaf(&mut set, "b", bool_t);
    let s = leaf(&mut set, "s", string_t);
    let fields = set.product(vec![a, b]);
    let contents = set.sum(vec![fields, s]);
    let foo = defined(&mut set, "foo", contents);
    assert_eq!(set.to_string(foo), "foo");
    assert_eq!(set.to_string_with_contents(foo), "foo {i32,bool|string}");

    let grouped = set.product(vec![sum, bool_t]);
    assert_eq!(set.to_string(grouped), "(i32|string),bool");

    let fixed = set.array(u64_t, vec![Some(3)]);
    let open = set.array(i8_t, vec![None]);
    assert_eq!(set.to_string(fixed), "u64[3]");
    assert_eq!(set.to_string(open), "i8[]");

    let function = set.function(product, string_t);
    assert_eq!(set.to_string(function), "u64,f64->string");
}

#[test]
fn test_conversion_table() {
    use ElementaryKind::*;

    assert_eq!(conversion::implicit(U8, U64, false), Conversion::Allowed);
    assert_eq!(
        conversion::implicit(U64, U8, false),
        Conversion::AllowedWithWarning(vec![WarningKind::Narrowing])
    );
    assert_eq!(
        conversion::implicit(I16, U16, false),
        Conversion::AllowedWithWarning(vec![WarningKind::SignedToUnsigned])
    );
    assert_eq!(
        conversion::implicit(I64, U16, false),
        Conversion::AllowedWithWarning(vec![WarningKind::SignedToUnsigned, WarningKind::Narrowing])
    );
    assert_eq!(
        conversion::implicit(U32, U8, true),
        Conversion::Forbidden(ForbiddenReason::LargerConstant)
    );
    assert_eq!(conversion::implicit(U16, I16, true), Conversion::Allowed);
    assert_eq!(conversion::implicit(Bool, U64, false), Conversion::Allowed);
    assert_eq!(conversion::implicit(I32, Bool, false), Conversion::Allowed);
    assert_eq!(conversion::implicit(U32, F64, false), Conversion::Allowed);
    assert_eq!(
        conversion::implicit(F64, I32, false),
        Conversion::Forbidden(ForbiddenReason::Incompatible)
    );
    assert_eq!(
        conversion::implicit(String, U8, false),
        Conversion::Forbidden(ForbiddenReason::Incompatible)
    );
    assert_eq!(
        conversion::implicit(Nil, U8, false),
        Conversion::Forbidden(ForbiddenReason::Incompatible)
    );

    assert_eq!(conversion::explicit(F64, U8, false), Conversion::Allowed);
    assert_eq!(conversion::explicit(Bool, F32, false), Conversion::Allowed);
    assert_eq!(conversion::explicit(U32, String, true), Conversion::Allowed);
    assert_eq!(
        conversion::explicit(U64, String, false),
        Conversion::Forbidden(ForbiddenReason::Incompatible)
    );
    assert_eq!(
        conversion::explicit(String, U64, true),
        Conversion::Forbidden(ForbiddenReason::Incompatible)
    );
}

#[test]
fn test_implicit_warnings() {
    let mut set = TypeSet::new();
    let u64_t = set.elementary(ElementaryKind::U64);
    let u8_t = set.elementary(ElementaryKind::U8);
    let i16_t = set.elementary(ElementaryKind::I16);
    let u16_t = set.elementary(ElementaryKind::U16);
    let i64_t = set.elementary(ElementaryKind::I64);

    let result = implicit(&set, u64_t, u8_t);
    assert!(result.success);
    assert_eq!(
        result.warnings,
        vec![ConversionWarning::Narrowing {
            from: "u64".to_string(),
            to: "u8".to_string()
        }]
    );
    assert_eq!(
        result.warnings[0].to_string(),
        "Implicit conversion from \"u64\" to \"u8\" during assignment."
    );

    let result = implicit(&set, i16_t, u16_t);
    assert_eq!(result.warnings.len(), 1);
    assert_eq!(
        result.warnings[0].to_string(),
        "Implicit signed to unsigned conversion from \"i16\" to \"u16\" during assignment."
    );

    let result = implicit(&set, i64_t, u16_t);
    assert_eq!(result.warnings.len(), 2);
    assert!(matches!(result.warnings[0], ConversionWarning::SignedToUnsigned { .. }));
    assert!(matches!(result.warnings[1], ConversionWarning::Narrowing { .. }));
}

#[test]
fn test_larger_constant_is_an_error() {
    let mut set = TypeSet::new();
    let constant = set.constant(ElementaryKind::U32);
    let u8_t = set.elementary(ElementaryKind::U8);

    let result = implicit(&set, constant, u8_t);
    assert!(!result.success);
    assert!(result.warnings.is_empty());
    assert_eq!(
        result.reason_suffix(),
        " Unable to convert from \"u32\" to \"u8\". Attempting to assign larger constant to smaller variable."
    );
}

#[test]
fn test_implicit_into_sum_records_matched_operand() {
    let mut set = TypeSet::new();
    let string_t = set.elementary(ElementaryKind::String);
    let i32_t = set.elementary(ElementaryKind::I32);
    let sum = set.sum(vec![string_t, i32_t]);
    let constant = set.constant(ElementaryKind::U8);

    let result = implicit(&set, constant, sum);
    assert!(result.success);
    assert_eq!(result.matched_type, Some(i32_t));

    let string_c = set.constant(ElementaryKind::String);
    let result = implicit(&set, string_c, sum);
    assert_eq!(result.matched_type, Some(string_t));
}

#[test]
fn test_sum_to_sum_requires_every_operand() {
    let mut set = TypeSet::new();
    let string_t = set.elementary(ElementaryKind::String);
    let i32_t = set.elementary(ElementaryKind::I32);
    let bool_t = set.elementary(ElementaryKind::Bool);
    let f64_t = set.elementary(ElementaryKind::F64);

    let narrow = set.sum(vec![string_t, i32_t]);
    let wide = set.sum(vec![i32_t, string_t, bool_t]);
    let other = set.sum(vec![string_t, f64_t]);

    assert!(implicit(&set, narrow, wide).success);
    assert!(implicit(&set, narrow, other).success);
    assert!(!implicit(&set, wide, other).success);
}

#[test]
fn test_pattern_matching_wildcards() {
    let mut set = TypeSet::new();
    let i32_t = set.elementary(ElementaryKind::I32);
    let bool_t = set.elementary(ElementaryKind::Bool);
    let string_t = set.elementary(ElementaryKind::String);
    let a = leaf(&mut set, "a", i32_t);
    let b = leaf(&mut set, "b", bool_t);
    let fields = set.product(vec![a, b]);

    let wildcard = set.intern(Type::Wildcard);
    let two = set.product(vec![wildcard, wildcard]);
    let three = set.product(vec![wildcard, wildcard, wildcard]);
    let mixed = set.product(vec![wildcard, bool_t]);
    let wrong = set.product(vec![wildcard, string_t]);

    let pattern = |set: &TypeSet, pattern: TypeId, operand: TypeId| {
        compare(set, pattern, operand, ComparisonMode::PatternMatching, ComparisonFlags::default()).success
    };

    assert!(pattern(&set, two, fields));
    assert!(pattern(&set, mixed, fields));
    assert!(!pattern(&set, wrong, fields));
    assert!(!pattern(&set, three, fields));
    assert!(!pattern(&set, wildcard, fields));
    assert!(pattern(&set, wildcard, string_t));
    assert!(!pattern(&set, two, string_t));
}

#[test]
fn test_pattern_matching_is_exact_without_function_call() {
    let mut set = TypeSet::new();
    let i32_t = set.elementary(ElementaryKind::I32);
    let u8_t = set.elementary(ElementaryKind::U8);
    let field = leaf(&mut set, "a", i32_t);

    let exact = compare(&set, i32_t, field, ComparisonMode::PatternMatching, ComparisonFlags::default());
    let converted = compare(&set, u8_t, field, ComparisonMode::PatternMatching, ComparisonFlags::default());
    let in_call = compare(&set, u8_t, field, ComparisonMode::PatternMatching, ComparisonFlags::function_call());

    assert!(exact.success);
    assert!(!converted.success);
    assert!(in_call.success);
}

#[test]
fn test_function_call_rejects_cross_category_conversion() {
    let mut set = TypeSet::new();
    let u64_t = set.elementary(ElementaryKind::U64);
    let string_t = set.elementary(ElementaryKind::String);
    let a = leaf(&mut set, "a", u64_t);
    let b = leaf(&mut set, "b", string_t);
    let sum = set.sum(vec![a, b]);
    let bool_c = set.constant(ElementaryKind::Bool);

    let result = compare(&set, bool_c, sum, ComparisonMode::PatternMatching, ComparisonFlags::function_call());
    assert!(!result.success);
    assert_eq!(
        result.mismatch,
        Some(Mismatch::AfterImplicitConversion {
            from: "bool".to_string(),
            to: "string".to_string()
        })
    );
    assert_eq!(
        result.reason_suffix(),
        " Unable to convert from \"bool\" to \"string\". An implicit conversion already happened."
    );
}

#[test]
fn test_array_comparison() {
    let mut set = TypeSet::new();
    let u8_c = set.constant(ElementaryKind::U8);
    let u64_t = set.elementary(ElementaryKind::U64);
    let string_t = set.elementary(ElementaryKind::String);

    let literal = set.array(u8_c, vec![Some(3)]);
    let fixed = set.array(u64_t, vec![Some(3)]);
    let smaller = set.array(u64_t, vec![Some(2)]);
    let open = set.array(u64_t, vec![None]);
    let strings = set.array(string_t, vec![Some(3)]);

    assert!(implicit(&set, literal, fixed).success);
    assert!(implicit(&set, literal, open).success);

    let result = implicit(&set, literal, smaller);
    assert!(!result.success);
    assert_eq!(result.mismatch, Some(Mismatch::ArrayMismatch));
    assert_eq!(result.reason_suffix(), " Array mismatch at type comparison.");

    let generic = compare(&set, literal, smaller, ComparisonMode::Generic, ComparisonFlags::default());
    assert!(generic.success);

    let result = implicit(&set, strings, fixed);
    assert_eq!(
        result.reason_suffix(),
        " Unable to convert from \"string\" to \"u64\"."
    );

    let identical_mode = compare(&set, open, fixed, ComparisonMode::Identical, ComparisonFlags::default());
    assert!(!identical_mode.success);
}

#[test]
fn test_shape_mismatch_has_no_reason() {
    let mut set = TypeSet::new();
    let string_t = set.elementary(ElementaryKind::String);
    let u32_t = set.elementary(ElementaryKind::U32);
    let nil = set.elementary(ElementaryKind::Nil);
    let args = set.product(vec![string_t, u32_t]);

    let result = implicit(&set, args, nil);
    assert!(!result.success);
    assert_eq!(result.mismatch, None);
    assert_eq!(result.reason_suffix(), "");
}

#[test]
fn test_defined_types_are_transparent_when_converting() {
    let mut set = TypeSet::new();
    let int_t = set.elementary(ElementaryKind::Int);
    let x = leaf(&mut set, "x", int_t);
    let y = leaf(&mut set, "y", int_t);
    let fields = set.product(vec![x, y]);
    let vector = defined(&mut set, "vector", fields);

    let u8_c = set.constant(ElementaryKind::U8);
    let args = set.product(vec![u8_c, u8_c]);

    assert!(implicit(&set, args, vector).success);
    assert!(!compare(&set, args, vector, ComparisonMode::Identical, ComparisonFlags::default()).success);
}

#[test]
fn test_explicit_conversion_mode() {
    let mut set = TypeSet::new();
    let f64_t = set.elementary(ElementaryKind::F64);
    let u8_t = set.elementary(ElementaryKind::U8);
    let string_t = set.elementary(ElementaryKind::String);
    let u64_t = set.elementary(ElementaryKind::U64);

    let explicit = |set: &TypeSet, from, to| {
        compare(set, from, to, ComparisonMode::ExplicitConversion, ComparisonFlags::default())
    };

    assert!(explicit(&set, f64_t, u8_t).success);
    let result = explicit(&set, u64_t, string_t);
    assert!(!result.success);
    assert_eq!(
        result.mismatch.map(|mismatch| mismatch.to_string()),
        Some("Unable to convert from \"u64\" to \"string\".".to_string())
    );
}

#[test]
fn test_linearize_respects_dependencies() {
    let mut set = TypeSet::new();
    let u8_t = set.elementary(ElementaryKind::U8);
    let string_t = set.elementary(ElementaryKind::String);
    let a = leaf(&mut set, "a", u8_t);
    let b = leaf(&mut set, "b", string_t);
    let fields = set.product(vec![a, b]);
    let foo = defined(&mut set, "foo", fields);
    let array = set.array(foo, vec![Some(2)]);

    let order = set.linearize();
    let position = |id: TypeId| order.iter().position(|other| *other == id).unwrap();

    assert!(!order.contains(&u8_t));
    assert!(position(a) < position(fields));
    assert!(position(b) < position(fields));
    assert!(position(fields) < position(foo));
    assert!(position(foo) < position(array));
}

#[test]
fn test_import_reinterns_into_another_set() {
    let mut source = TypeSet::new();
    let i32_t = source.elementary(ElementaryKind::I32);
    let string_t = source.elementary(ElementaryKind::String);
    let sum = source.sum(vec![i32_t, string_t]);
    let foo = defined(&mut source, "foo", sum);

    let mut destination = TypeSet::new();
    destination.elementary(ElementaryKind::Bool);
    let imported = destination.import(&source, foo);

    assert_eq!(destination.to_string_with_contents(imported), "foo {i32|string}");
    assert_eq!(destination.import(&source, foo), imported);
}

#[test]
fn test_ordinal() {
    assert_eq!(ordinal(1), "1st");
    assert_eq!(ordinal(2), "2nd");
    assert_eq!(ordinal(3), "3rd");
    assert_eq!(ordinal(4), "4th");
    assert_eq!(ordinal(11), "11th");
    assert_eq!(ordinal(12), "12th");
    assert_eq!(ordinal(22), "22nd");
}

#[test]
fn test_substitute_generic_placeholder() {
    let mut set = TypeSet::new();
    let wildcard = set.intern(Type::Wildcard);
    let placeholder = defined(&mut set, "T", wildcard);
    let i32 = set.elementary(ElementaryKind::I32);
    let vector = defined(&mut set, "vector", i32);

    let self_arg = leaf(&mut set, "self", placeholder);
    let other_arg = leaf(&mut set, "other", placeholder);
    let args = set.product(vec![self_arg, other_arg]);
    let signature = set.function(args, placeholder);

    let substituted = set.substitute(signature, placeholder, vector);
    assert_eq!(set.to_string(substituted), "vector,vector->vector");

    let erased = set.erase_leaves(substituted);
    let expected_args = set.product(vec![vector, vector]);
    let expected = set.function(expected_args, vector);
    assert_eq!(erased, expected);
}

#[test]
fn test_erase_leaves_keeps_defined_types_opaque() {
    let mut set = TypeSet::new();
    let u8 = set.elementary(ElementaryKind::U8);
    let field = leaf(&mut set, "x", u8);
    let point = defined(&mut set, "point", field);
    let named_point = leaf(&mut set, "p", point);

    assert_eq!(set.erase_leaves(named_point), point);
    assert_eq!(set.erase_leaves(u8), u8);
}

#[test]
fn test_pattern_matching_names_defined_types() {
    let mut set = TypeSet::new();
    let i32_t = set.elementary(ElementaryKind::I32);
    let x = leaf(&mut set, "x", i32_t);
    let bar = defined(&mut set, "bar", x);
    let a = leaf(&mut set, "a", bar);
    let b = leaf(&mut set, "b", i32_t);
    let sum = set.sum(vec![a, b]);
    let five = set.constant(ElementaryKind::U8);

    let pattern = |set: &TypeSet, pattern: TypeId, operand: TypeId| {
        compare(set, pattern, operand, ComparisonMode::PatternMatching, ComparisonFlags::default()).success
    };
    assert!(pattern(&set, bar, a));
    assert!(!pattern(&set, i32_t, a));
    assert!(!pattern(&set, bar, b));

    let call = compare(&set, five, sum, ComparisonMode::PatternMatching, ComparisonFlags::function_call());
    assert!(call.success);
    assert_eq!(call.matched_type, Some(b));

    let implicit = compare(&set, i32_t, bar, ComparisonMode::ImplicitConversion, ComparisonFlags::default());
    assert!(implicit.success);
}
