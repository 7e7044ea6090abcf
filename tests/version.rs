// ABOUTME: Integration tests for engine version ordering semantics.
// ABOUTME: Property tests verify the ordering is total and consistent.

use proptest::prelude::*;
use relevo::types::EngineVersion;

#[test]
fn dotted_versions_compare_numerically() {
    // String comparison would order these the wrong way around.
    assert!(EngineVersion::parse("15.8") < EngineVersion::parse("15.10"));
    assert!(EngineVersion::parse("9.6") < EngineVersion::parse("10.0"));
    assert!(EngineVersion::parse("15.8") > EngineVersion::parse("15.1"));
}

#[test]
fn trailing_zero_components_do_not_matter() {
    assert_eq!(EngineVersion::parse("15"), EngineVersion::parse("15.0"));
    assert_eq!(EngineVersion::parse("15"), EngineVersion::parse("15.0.0"));
    assert!(EngineVersion::parse("15") < EngineVersion::parse("15.0.1"));
}

#[test]
fn garbled_versions_sort_after_everything_numeric() {
    let garbled = EngineVersion::parse("abc");
    assert!(garbled > EngineVersion::parse("999.999"));
    assert!(garbled > EngineVersion::parse("0"));
}

proptest! {
    #[test]
    fn ordering_is_antisymmetric(a in "[0-9]{1,3}(\\.[0-9]{1,3}){0,3}", b in "[0-9]{1,3}(\\.[0-9]{1,3}){0,3}") {
        let left = EngineVersion::parse(&a);
        let right = EngineVersion::parse(&b);
        prop_assert_eq!(left.cmp(&right), right.cmp(&left).reverse());
    }

    #[test]
    fn ordering_is_transitive(
        a in "[0-9]{1,3}(\\.[0-9]{1,3}){0,3}",
        b in "[0-9]{1,3}(\\.[0-9]{1,3}){0,3}",
        c in "[0-9]{1,3}(\\.[0-9]{1,3}){0,3}",
    ) {
        use std::cmp::Ordering::Less;
        let (x, y, z) = (
            EngineVersion::parse(&a),
            EngineVersion::parse(&b),
            EngineVersion::parse(&c),
        );
        if x.cmp(&y) == Less && y.cmp(&z) == Less {
            prop_assert_eq!(x.cmp(&z), Less);
        }
    }

    #[test]
    fn every_version_equals_itself(a in "[0-9]{1,3}(\\.[0-9]{1,3}){0,3}") {
        let version = EngineVersion::parse(&a);
        prop_assert_eq!(version.clone(), version);
    }

    #[test]
    fn numeric_never_sorts_above_non_numeric(a in "[0-9]{1,3}(\\.[0-9]{1,3}){0,3}", b in "[a-z]{1,8}") {
        let numeric = EngineVersion::parse(&a);
        let garbled = EngineVersion::parse(&b);
        prop_assert!(numeric < garbled);
    }
}
