//! Universal properties from the engine's testable-properties list
//! (integer round-trip, precedence, short-circuit-less `and`, idempotence
//! of compilation, bounds safety, equality symmetry).

use test_support::GuardedBuffer;

#[test]
fn integers_round_trip_through_to_number_and_string_equality() {
    for k in [-1_000_000, -12345, -1, 0, 1, 42, 999_999, 1_000_000] {
        let expr = format!("{k} == .x");
        let program = vfilter::compile(&expr).unwrap();
        let json = format!(r#"{{"x": {k}}}"#);
        assert!(vfilter::run(&program, json.as_bytes()), "k = {k}");
    }
}

#[test]
fn precedence_matches_explicit_parenthesisation() {
    for a in [-10, -3, 0, 3, 10] {
        for b in [-10, -3, 0, 3, 10] {
            for c in [-10, -3, 0, 3, 10] {
                let left_expr = format!("{a} + {b} * {c} == {a} + ({b}*{c})");
                let left = vfilter::compile(&left_expr).unwrap();
                assert!(vfilter::run(&left, b"{}"), "a={a} b={b} c={c}");

                if b >= 0 && c >= 0 {
                    let pow_expr = format!("{a} ** {b} ** {c} == {a} ** ({b} ** {c})");
                    let pow = vfilter::compile(&pow_expr).unwrap();
                    assert!(vfilter::run(&pow, b"{}"), "pow a={a} b={b} c={c}");
                }
            }
        }
    }
}

#[test]
fn and_with_a_missing_selector_is_false_without_short_circuiting() {
    let program = vfilter::compile(".missing and 1 == 1").unwrap();
    assert!(!vfilter::run(&program, b"{}"));
}

#[test]
fn compiling_the_same_source_twice_yields_equal_behaviour() {
    let expr = "(5+2)*3 and .year > 1980 and 'foo' == 'foo'";
    let a = vfilter::compile(expr).unwrap();
    let b = vfilter::compile(expr).unwrap();
    let json = br#"{"year": 1984, "name": "The Matrix"}"#;
    assert_eq!(vfilter::run(&a, json), vfilter::run(&b, json));
}

#[test]
fn equality_is_symmetric_across_value_kinds() {
    let pairs = [
        ("1 == .x", ".x == 1", r#"{"x": 1}"#),
        ("'a' == .x", ".x == 'a'", r#"{"x": "a"}"#),
        (".x == null", "null == .x", r#"{"x": null}"#),
        ("1 == .x", ".x == 1", r#"{"x": 2}"#),
    ];
    for (lhs, rhs, json) in pairs {
        let a = vfilter::run(&vfilter::compile(lhs).unwrap(), json.as_bytes());
        let b = vfilter::run(&vfilter::compile(rhs).unwrap(), json.as_bytes());
        assert_eq!(a, b, "{lhs} vs {rhs} on {json}");
    }
}

#[test]
fn evaluation_never_reads_past_a_truncated_buffer() {
    let cases: &[&[u8]] = &[
        br#"{"year": 1984, "name": "The Matrix"}"#,
        br#"{"tags": ["a", "b", "c"]"#,
        br#"{"flag": tr"#,
        br#"{"x""#,
    ];
    let program = vfilter::compile(".year > 1980 or .tags in [\"a\"] or .flag or .x").unwrap();
    for case in cases {
        let guarded = GuardedBuffer::new(case);
        // Must not crash. The guard page right after the buffer's end
        // turns any out-of-bounds read into a fault.
        vfilter::run(&program, guarded.as_slice());
    }
}
