use serde_json::json;

use sheet_reconcile::execution::{reconcile_bytes, reconcile_from_paths, ReconcileMode, ReconcileOptions, ReconcileRequest};
use sheet_reconcile::ReconcileError;

fn fixed_shape() -> ReconcileOptions {
    ReconcileOptions {
        mode: ReconcileMode::fixed_shape(),
        ..Default::default()
    }
}

#[test]
fn csv_fixed_shape_from_paths_happy_path() {
    let done = reconcile_from_paths("tests/fixtures/stores.csv", "tests/fixtures/stores.json", &fixed_shape()).unwrap();

    assert_eq!(done.collection_key, "stores");
    assert_eq!(done.records, 2);
    assert_eq!(done.blank_rows, 1);
    assert_eq!(
        done.document,
        json!({
            "version": "2024.1",
            "stores": [
                {
                    "template": "classic",
                    "name": "Acme",
                    "address": "123 Main St",
                    "logo": "acme.png",
                    "email": "hello@acme.test"
                },
                {
                    "template": "modern",
                    "name": "Globex",
                    "address": "9 Elm Ave",
                    "logo": "globex.png",
                    "email": "info@globex.test"
                }
            ],
            "owner": "ops"
        })
    );

    // Top-level order is preserved in the serialized output.
    let text = String::from_utf8(done.bytes).unwrap();
    let v = text.find("\"version\"").unwrap();
    let s = text.find("\"stores\"").unwrap();
    let o = text.find("\"owner\"").unwrap();
    assert!(v < s && s < o);
}

#[test]
fn csv_strict_mode_fails_on_missing_email() {
    let err = reconcile_from_paths(
        "tests/fixtures/stores_missing_email.csv",
        "tests/fixtures/stores.json",
        &fixed_shape(),
    )
    .unwrap_err();

    assert!(matches!(err, ReconcileError::MissingColumns { .. }));
    assert!(err.to_string().contains("email"));
}

#[test]
fn csv_lenient_mode_succeeds_without_email() {
    let req = ReconcileRequest {
        spreadsheet_path: "tests/fixtures/stores_missing_email.csv".into(),
        reference_path: "tests/fixtures/stores.json".into(),
        options: ReconcileOptions::default(),
    };
    let done = req.run().unwrap();

    assert_eq!(done.warning.unwrap().missing, vec!["email".to_string()]);
    assert_eq!(
        done.document["stores"],
        json!([{"template": "classic", "name": "Acme", "address": "123 Main St", "logo": "acme.png"}])
    );
    assert!(done.document["stores"][0].get("email").is_none());
}

#[test]
fn csv_extra_columns_are_carried_through_in_both_modes() {
    let reference = br#"{"stores": [{"name": "x"}]}"#;
    let sheet = b"name,phone\nAcme,555-1234\n";

    let strict = reconcile_bytes(sheet, reference, &fixed_shape()).unwrap();
    let lenient = reconcile_bytes(sheet, reference, &ReconcileOptions::default()).unwrap();

    let expected = json!({"stores": [{"name": "Acme", "phone": "555-1234"}]});
    assert_eq!(strict.document, expected);
    assert_eq!(lenient.document, expected);
}

#[test]
fn csv_blank_header_is_empty_header_error() {
    let reference = br#"{"data": [{"name": "x"}]}"#;
    let err = reconcile_bytes(b" , ,\nAcme,1\n", reference, &ReconcileOptions::default()).unwrap_err();
    assert!(matches!(err, ReconcileError::EmptyHeader { .. }));

    let err = reconcile_bytes(b"", reference, &ReconcileOptions::default()).unwrap_err();
    assert!(matches!(err, ReconcileError::EmptyHeader { .. }));

    let err = reconcile_bytes(b"\nname\nAcme\n", reference, &ReconcileOptions::default()).unwrap_err();
    assert!(matches!(err, ReconcileError::EmptyHeader { .. }));
}

#[test]
fn csv_fixed_shape_accepts_scalar_store_fields_in_reference() {
    let done = reconcile_bytes(
        b"name,logo\nAcme,5\n",
        br#"{"stores": [{"name": "A", "logo": 7}]}"#,
        &fixed_shape(),
    )
    .unwrap();
    assert_eq!(done.document, json!({"stores": [{"name": "Acme", "logo": "5"}]}));

    let err = reconcile_bytes(b"name\nAcme\n", br#"{"stores": ["just a string"]}"#, &fixed_shape()).unwrap_err();
    assert!(matches!(err, ReconcileError::SchemaInference { .. }));
}

#[test]
fn reference_errors_are_reported_before_the_spreadsheet_is_read() {
    let sheet = b"name\nAcme\n";

    let err = reconcile_bytes(sheet, br#"{"stores": []}"#, &fixed_shape()).unwrap_err();
    assert!(matches!(err, ReconcileError::EmptyReferenceCollection { .. }));

    let err = reconcile_bytes(sheet, br#"{"tags": ["a"]}"#, &ReconcileOptions::default()).unwrap_err();
    assert!(matches!(err, ReconcileError::SchemaInference { .. }));

    let err = reconcile_bytes(sheet, b"{not json", &ReconcileOptions::default()).unwrap_err();
    assert!(matches!(err, ReconcileError::Json(_)));
}

#[test]
fn pretty_output_is_indented() {
    let opts = ReconcileOptions {
        pretty: true,
        ..Default::default()
    };
    let done = reconcile_bytes(b"name\nAcme\n", br#"{"data": [{"name": ""}]}"#, &opts).unwrap();
    let text = String::from_utf8(done.bytes).unwrap();
    assert!(text.contains("\n  \"data\": ["));
}
