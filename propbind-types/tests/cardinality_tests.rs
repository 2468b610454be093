use propbind_types::Cardinality;
use proptest::prelude::*;

// ── satisfies ────────────────────────────────────────────────────

#[test]
fn equal_cardinalities_match() {
    assert!(Cardinality::SINGLE.satisfies(Cardinality::SINGLE));
    assert!(Cardinality::Limited(3).satisfies(Cardinality::Limited(3)));
    assert!(Cardinality::Unlimited.satisfies(Cardinality::Unlimited));
}

#[test]
fn larger_field_satisfies_smaller_finite_request() {
    assert!(Cardinality::Limited(5).satisfies(Cardinality::Limited(3)));
    assert!(Cardinality::Unlimited.satisfies(Cardinality::Limited(3)));
    assert!(Cardinality::Unlimited.satisfies(Cardinality::SINGLE));
}

#[test]
fn single_field_never_satisfies_multiple_request() {
    assert!(!Cardinality::SINGLE.satisfies(Cardinality::Unlimited));
    assert!(!Cardinality::SINGLE.satisfies(Cardinality::Limited(2)));
}

#[test]
fn finite_field_never_satisfies_unlimited_request() {
    assert!(!Cardinality::Limited(50).satisfies(Cardinality::Unlimited));
}

#[test]
fn is_multiple() {
    assert!(!Cardinality::SINGLE.is_multiple());
    assert!(Cardinality::Limited(2).is_multiple());
    assert!(Cardinality::Unlimited.is_multiple());
}

// ── Serde ────────────────────────────────────────────────────────

#[test]
fn serializes_as_storage_integer() {
    assert_eq!(serde_json::to_string(&Cardinality::Limited(4)).unwrap(), "4");
    assert_eq!(serde_json::to_string(&Cardinality::Unlimited).unwrap(), "-1");
    assert_eq!(
        serde_json::from_str::<Cardinality>("-1").unwrap(),
        Cardinality::Unlimited
    );
}

#[test]
fn zero_and_negative_are_rejected() {
    assert!(serde_json::from_str::<Cardinality>("0").is_err());
    assert!(serde_json::from_str::<Cardinality>("-3").is_err());
}

#[test]
fn display() {
    assert_eq!(Cardinality::Limited(2).to_string(), "2");
    assert_eq!(Cardinality::Unlimited.to_string(), "unlimited");
}

proptest! {
    #[test]
    fn single_never_satisfies_more_than_one(n in 2u32..1000) {
        prop_assert!(!Cardinality::SINGLE.satisfies(Cardinality::Limited(n)));
    }

    #[test]
    fn larger_limited_satisfies_smaller(field in 2u32..1000, request in 1u32..1000) {
        prop_assume!(field >= request);
        prop_assert!(Cardinality::Limited(field).satisfies(Cardinality::Limited(request)));
    }
}
