//! Property tests for output normalization.

use proptest::prelude::*;
use recommender::normalize::{Metadata, normalize_metadata};
use serde_json::{Value, json};

fn arb_support() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        prop_oneof![Just(0), Just(1), Just(2)].prop_map(Value::from),
        prop_oneof![
            Just("Yes"),
            Just("no"),
            Just(" TRUE "),
            Just("y"),
            Just("1"),
            Just("false"),
            Just("")
        ]
        .prop_map(Value::from),
    ]
}

fn arb_duration() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        (0u32..240).prop_map(Value::from),
        (-50.0f64..240.0).prop_map(Value::from),
        (0.0f64..240.0).prop_map(|d| Value::from(format!("{d:.1}"))),
        "[a-z]{0,4}".prop_map(Value::from),
    ]
}

fn arb_test_type() -> impl Strategy<Value = Value> {
    let label = "[A-Za-z&' ]{0,12}";
    prop_oneof![
        Just(Value::Null),
        proptest::collection::vec(label, 0..4).prop_map(|labels| {
            Value::from(format!("[{}]", labels
                .iter()
                .map(|l| format!("'{l}'"))
                .collect::<Vec<_>>()
                .join(", ")))
        }),
        proptest::collection::vec(label, 0..4).prop_map(Value::from),
        label.prop_map(Value::from),
    ]
}

fn arb_metadata() -> impl Strategy<Value = Metadata> {
    (
        "[a-z]{1,10}",
        " ?[A-Za-z ]{1,16}",
        "[A-Za-z .]{0,40}",
        arb_duration(),
        arb_test_type(),
        arb_support(),
        arb_support(),
    )
        .prop_map(
            |(slug, name, description, duration, test_type, remote, adaptive)| {
                json!({
                    "url": format!("https://example.com/{slug}"),
                    "name": name,
                    "description": description,
                    "duration": duration,
                    "test_type": test_type,
                    "remote_support": remote,
                    "adaptive_support": adaptive,
                })
                .as_object()
                .cloned()
                .unwrap()
            },
        )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Normalizing a record that is already canonical changes nothing.
    #[test]
    fn prop_normalize_is_idempotent(metadata in arb_metadata()) {
        prop_assume!(!metadata["name"].as_str().unwrap_or_default().trim().is_empty());

        let once = normalize_metadata(&metadata).unwrap();
        let twice = normalize_metadata(&once.to_metadata()).unwrap();

        prop_assert_eq!(once, twice);
    }

    /// Support flags only ever come out as the two canonical literals.
    #[test]
    fn prop_support_flags_are_canonical(metadata in arb_metadata()) {
        prop_assume!(!metadata["name"].as_str().unwrap_or_default().trim().is_empty());

        let record = normalize_metadata(&metadata).unwrap();

        prop_assert!(record.remote_support == "Yes" || record.remote_support == "No");
        prop_assert!(record.adaptive_support == "Yes" || record.adaptive_support == "No");
    }

    /// Labels are trimmed, non-empty and free of list delimiters.
    #[test]
    fn prop_test_type_labels_are_clean(metadata in arb_metadata()) {
        prop_assume!(!metadata["name"].as_str().unwrap_or_default().trim().is_empty());

        let record = normalize_metadata(&metadata).unwrap();

        for label in &record.test_type {
            prop_assert!(!label.is_empty());
            prop_assert_eq!(label.trim(), label.as_str());
            if metadata["test_type"].is_string() {
                prop_assert!(!label.contains(['[', ']', '\'']));
            }
        }
    }
}
