use openfec_lib::openfec_query::{Query, Record, SqlValue};
use openfec_lib::{fetch_page, fetch_seek_page, models, Db, FetchOptions, PageParams};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};

fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .expect("CLI crate should be inside workspace")
        .to_path_buf()
}

fn load_schema(name: &str) -> Value {
    let path = workspace_root().join("schema").join(name);
    let text = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("read schema {}: {}", path.display(), e));
    serde_json::from_str(&text).expect("schema is valid JSON")
}

fn seeded_db() -> Db {
    let mut db = Db::open_in_memory().expect("open db");
    db.init().expect("init db");
    let records: Vec<Record> = (1..=5_i64)
        .map(|i| {
            Record::new()
                .with("sub_id", i)
                .with("committee_id", "C00401224")
                .with("contributor_name", format!("DONOR {}", i))
                .with(
                    "contribution_receipt_date",
                    if i == 3 { SqlValue::Null } else { SqlValue::from(format!("2024-01-0{}", i)) },
                )
                .with("contribution_receipt_amount", (i * 100) as f64)
        })
        .collect();
    db.insert_records(&models::schedule_a(), &records)
        .expect("seed receipts");
    db
}

fn seek_page_json(params: &PageParams) -> Value {
    let db = seeded_db();
    let model = models::schedule_a();
    let index = model.primary_key().expect("sched_a has a key").clone();
    let page = fetch_seek_page(&db, Query::new(&model), params, &index, &FetchOptions::default())
        .expect("seek page");
    serde_json::to_value(&page).expect("page serializes")
}

fn assert_valid(schema: &Value, data: &Value, what: &str) {
    let validator = jsonschema::draft202012::new(schema).expect("schema compiles");
    if let Err(e) = validator.validate(data) {
        panic!("{} failed validation: {e}", what);
    }
}

// ---------------------------------------------------------------------------
// Positive validation: serialized pages conform to their schemas
// ---------------------------------------------------------------------------

#[test]
fn test_seek_page_conforms_to_schema() {
    let schema = load_schema("seek_page.schema.json");
    let params = PageParams::new()
        .with_per_page(2)
        .with_sort("contribution_receipt_date");
    let data = seek_page_json(&params);
    assert_eq!(
        data["pagination"]["last_indexes"]["last_contribution_receipt_date"],
        "2024-01-02"
    );
    assert_valid(&schema, &data, "seek page");
}

#[test]
fn test_seek_page_ending_on_null_conforms_to_schema() {
    let schema = load_schema("seek_page.schema.json");
    let params = PageParams::new()
        .with_per_page(5)
        .with_sort("contribution_receipt_date");
    let data = seek_page_json(&params);
    assert_eq!(data["pagination"]["last_indexes"]["sort_null_only"], true);
    assert_valid(&schema, &data, "null-terminated seek page");
}

#[test]
fn test_empty_seek_page_conforms_to_schema() {
    let schema = load_schema("seek_page.schema.json");
    let params = PageParams::new().with_per_page(2).with_last_index(99);
    let data = seek_page_json(&params);
    assert!(data["pagination"]["last_indexes"].is_null());
    assert_valid(&schema, &data, "empty seek page");
}

#[test]
fn test_offset_page_conforms_to_schema() {
    let schema = load_schema("offset_page.schema.json");
    let db = seeded_db();
    let model = models::schedule_a();
    let params = PageParams::new()
        .with_per_page(2)
        .with_page(2)
        .with_sort("-contribution_receipt_amount");
    let page = fetch_page(&db, Query::new(&model), &params, &model, &FetchOptions::default())
        .expect("offset page");
    let data = serde_json::to_value(&page).expect("page serializes");
    assert_eq!(data["pagination"]["pages"], 3);
    assert_valid(&schema, &data, "offset page");
}

// ---------------------------------------------------------------------------
// Negative validation: schemas reject invalid data
// ---------------------------------------------------------------------------

#[test]
fn test_seek_schema_rejects_missing_last_index() {
    let schema = load_schema("seek_page.schema.json");
    let data = json!({
        "results": [],
        "pagination": {
            "per_page": 2,
            "count": 0,
            "pages": 0,
            "last_indexes": { "last_contribution_receipt_date": "2024-01-02" }
        }
    });
    let validator = jsonschema::draft202012::new(&schema).expect("schema compiles");
    assert!(validator.validate(&data).is_err());
}

#[test]
fn test_seek_schema_rejects_unknown_cursor_key() {
    let schema = load_schema("seek_page.schema.json");
    let data = json!({
        "results": [],
        "pagination": {
            "per_page": 2,
            "count": 0,
            "pages": 0,
            "last_indexes": { "last_index": 4, "cursor": "abc" }
        }
    });
    let validator = jsonschema::draft202012::new(&schema).expect("schema compiles");
    assert!(validator.validate(&data).is_err());
}

#[test]
fn test_offset_schema_rejects_page_zero() {
    let schema = load_schema("offset_page.schema.json");
    let data = json!({
        "results": [{ "sub_id": 1 }],
        "pagination": { "page": 0, "per_page": 1, "count": 1, "pages": 1 }
    });
    let validator = jsonschema::draft202012::new(&schema).expect("schema compiles");
    assert!(validator.validate(&data).is_err());
}

#[test]
fn test_offset_schema_rejects_nested_record_values() {
    let schema = load_schema("offset_page.schema.json");
    let data = json!({
        "results": [{ "sub_id": 1, "committee": { "name": "ACTBLUE" } }],
        "pagination": { "page": 1, "per_page": 1, "count": 1, "pages": 1 }
    });
    let validator = jsonschema::draft202012::new(&schema).expect("schema compiles");
    assert!(validator.validate(&data).is_err());
}
