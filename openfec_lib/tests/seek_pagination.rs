//! Seek pagination against an in-memory SQLite mirror.

use chrono::NaiveDate;
use openfec_lib::openfec_query::sorting::SortOptions;
use openfec_lib::openfec_query::{Column, Query, Record, SqlValue};
use openfec_lib::relations::related_committee;
use openfec_lib::{fetch_seek_page, models, ApiError, Db, FetchOptions, PageParams, SeekPage};

fn setup_db() -> Db {
    let db = Db::open_in_memory().expect("open db");
    db.init().expect("init db");
    db
}

fn receipt(sub_id: i64, amount: Option<f64>, date: Option<NaiveDate>) -> Record {
    Record::new()
        .with("sub_id", sub_id)
        .with("committee_id", "C00401224")
        .with("contribution_receipt_amount", amount)
        .with("contribution_receipt_date", date)
}

fn sub_id() -> Column {
    models::schedule_a().primary_key().unwrap().clone()
}

fn ids(page: &SeekPage) -> Vec<i64> {
    page.results
        .iter()
        .map(|r| r.value_of("sub_id").as_i64().unwrap())
        .collect()
}

fn next_params(base: &PageParams, page: &SeekPage) -> PageParams {
    let last = page
        .pagination
        .last_indexes
        .as_ref()
        .expect("page has a cursor");
    base.clone().apply_last_indexes(last)
}

/// Follows cursors from `base` until a page comes back without one.
fn collect_pages(db: &Db, base: &PageParams, options: &FetchOptions) -> Vec<Vec<i64>> {
    let model = models::schedule_a();
    let mut params = base.clone();
    let mut pages = Vec::new();
    loop {
        let page = fetch_seek_page(db, Query::new(&model), &params, &sub_id(), options).unwrap();
        let Some(last) = page.pagination.last_indexes.clone() else {
            break;
        };
        pages.push(ids(&page));
        params = base.clone().apply_last_indexes(&last);
    }
    pages
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_ascending_index_pages_survive_inserts() {
    let mut db = setup_db();
    let model = models::schedule_a();
    let seed: Vec<Record> = [10, 20, 30, 40, 50]
        .iter()
        .map(|id| receipt(*id, Some(1.0), None))
        .collect();
    db.insert_records(&model, &seed).unwrap();

    let params = PageParams::new().with_per_page(2);
    let options = FetchOptions::default();
    let first = fetch_seek_page(&db, Query::new(&model), &params, &sub_id(), &options).unwrap();
    assert_eq!(ids(&first), vec![10, 20]);
    assert_eq!(first.pagination.count, 5);
    assert_eq!(first.pagination.pages, 3);

    // Rows landing before the cursor must not shift later pages.
    db.insert_record(&model, &receipt(5, Some(1.0), None)).unwrap();
    db.insert_record(&model, &receipt(15, Some(1.0), None)).unwrap();

    let params = next_params(&params, &first);
    let second = fetch_seek_page(&db, Query::new(&model), &params, &sub_id(), &options).unwrap();
    assert_eq!(ids(&second), vec![30, 40]);

    let params = next_params(&params, &second);
    let third = fetch_seek_page(&db, Query::new(&model), &params, &sub_id(), &options).unwrap();
    assert_eq!(ids(&third), vec![50]);

    let params = next_params(&params, &third);
    let done = fetch_seek_page(&db, Query::new(&model), &params, &sub_id(), &options).unwrap();
    assert!(done.results.is_empty());
    assert!(done.pagination.last_indexes.is_none());
}

#[test]
fn test_ascending_nulls_come_last_then_null_only_continuation() {
    let mut db = setup_db();
    let model = models::schedule_a();
    let amounts = [Some(50.0), None, Some(10.0), None, Some(30.0), Some(10.0)];
    let seed: Vec<Record> = amounts
        .iter()
        .enumerate()
        .map(|(i, amount)| receipt(i as i64 + 1, *amount, None))
        .collect();
    db.insert_records(&model, &seed).unwrap();

    let base = PageParams::new()
        .with_per_page(2)
        .with_sort("contribution_receipt_amount");
    let options = FetchOptions::default();

    let first = fetch_seek_page(&db, Query::new(&model), &base, &sub_id(), &options).unwrap();
    assert_eq!(ids(&first), vec![3, 6]);
    let cursor = first.pagination.last_indexes.clone().unwrap();
    assert_eq!(
        cursor.to_query_pairs(),
        vec![
            ("last_index".to_string(), "6".to_string()),
            ("last_contribution_receipt_amount".to_string(), "10".to_string()),
        ]
    );

    let params = next_params(&base, &first);
    let second = fetch_seek_page(&db, Query::new(&model), &params, &sub_id(), &options).unwrap();
    assert_eq!(ids(&second), vec![5, 1]);
    assert!(!second.pagination.last_indexes.as_ref().unwrap().sort_null_only);

    let params = next_params(&base, &second);
    let third = fetch_seek_page(&db, Query::new(&model), &params, &sub_id(), &options).unwrap();
    assert_eq!(ids(&third), vec![2, 4]);
    let cursor = third.pagination.last_indexes.clone().unwrap();
    assert!(cursor.sort_null_only);
    assert_eq!(cursor.sort_value, None);
    assert_eq!(cursor.last_index, SqlValue::Integer(4));

    let params = next_params(&base, &third);
    assert!(params.sort_null_only);
    let done = fetch_seek_page(&db, Query::new(&model), &params, &sub_id(), &options).unwrap();
    assert!(done.results.is_empty());
    assert_eq!(done.pagination.count, 6);
}

#[test]
fn test_null_only_continuation_pages_within_nulls() {
    let mut db = setup_db();
    let model = models::schedule_a();
    let seed: Vec<Record> = (1..=5)
        .map(|i| receipt(i, if i == 1 { Some(5.0) } else { None }, None))
        .collect();
    db.insert_records(&model, &seed).unwrap();

    let base = PageParams::new()
        .with_per_page(2)
        .with_sort("contribution_receipt_amount");
    let options = FetchOptions::default();

    let first = fetch_seek_page(&db, Query::new(&model), &base, &sub_id(), &options).unwrap();
    assert_eq!(ids(&first), vec![1, 2]);
    assert!(first.pagination.last_indexes.as_ref().unwrap().sort_null_only);

    let params = next_params(&base, &first);
    let second = fetch_seek_page(&db, Query::new(&model), &params, &sub_id(), &options).unwrap();
    assert_eq!(ids(&second), vec![3, 4]);

    let params = next_params(&base, &second);
    let third = fetch_seek_page(&db, Query::new(&model), &params, &sub_id(), &options).unwrap();
    assert_eq!(ids(&third), vec![5]);
}

#[test]
fn test_descending_date_sort() {
    let mut db = setup_db();
    let model = models::schedule_a();
    db.insert_records(
        &model,
        &[
            receipt(1, Some(1.0), Some(date(2024, 1, 3))),
            receipt(2, Some(1.0), Some(date(2024, 1, 1))),
            receipt(3, Some(1.0), None),
            receipt(4, Some(1.0), Some(date(2024, 1, 2))),
        ],
    )
    .unwrap();

    let base = PageParams::new()
        .with_per_page(2)
        .with_sort("-contribution_receipt_date");
    let options = FetchOptions::default();

    let first = fetch_seek_page(&db, Query::new(&model), &base, &sub_id(), &options).unwrap();
    assert_eq!(ids(&first), vec![1, 4]);
    assert_eq!(
        first.pagination.last_indexes.as_ref().unwrap().sort_value,
        Some((
            "contribution_receipt_date".to_string(),
            SqlValue::Date(date(2024, 1, 2))
        ))
    );

    // Null dates sort as the minimum date, so they close a descending listing.
    let params = next_params(&base, &first);
    let second = fetch_seek_page(&db, Query::new(&model), &params, &sub_id(), &options).unwrap();
    assert_eq!(ids(&second), vec![2, 3]);
    assert!(second.pagination.last_indexes.as_ref().unwrap().sort_null_only);

    let params = next_params(&base, &second);
    let err = fetch_seek_page(&db, Query::new(&model), &params, &sub_id(), &options).unwrap_err();
    assert!(matches!(err, ApiError::Unsupported(_)));
    assert_eq!(err.status_code(), 422);
}

#[test]
fn test_descending_index_without_sort() {
    let mut db = setup_db();
    let model = models::schedule_a();
    let seed: Vec<Record> = (1..=4).map(|i| receipt(i, None, None)).collect();
    db.insert_records(&model, &seed).unwrap();

    let params = PageParams::new().with_per_page(3).with_sort("-sub_id");
    let options = FetchOptions::default();
    let first = fetch_seek_page(&db, Query::new(&model), &params, &sub_id(), &options).unwrap();
    assert_eq!(ids(&first), vec![4, 3, 2]);

    let params = next_params(&params, &first);
    let second = fetch_seek_page(&db, Query::new(&model), &params, &sub_id(), &options).unwrap();
    assert_eq!(ids(&second), vec![1]);
}

#[test]
fn test_hide_null_drops_null_sort_values() {
    let mut db = setup_db();
    let model = models::schedule_a();
    db.insert_records(
        &model,
        &[
            receipt(1, None, None),
            receipt(2, Some(20.0), None),
            receipt(3, Some(10.0), None),
        ],
    )
    .unwrap();

    let params = PageParams::new()
        .with_per_page(10)
        .with_sort("contribution_receipt_amount")
        .with_hide_null(true);
    let page = fetch_seek_page(
        &db,
        Query::new(&model),
        &params,
        &sub_id(),
        &FetchOptions::default(),
    )
    .unwrap();
    assert_eq!(ids(&page), vec![3, 2]);
    assert_eq!(page.pagination.count, 2);
}

#[test]
fn test_filters_on_the_base_query_are_kept() {
    let mut db = setup_db();
    let model = models::schedule_a();
    let mut seed: Vec<Record> = (1..=3).map(|i| receipt(i, Some(1.0), None)).collect();
    seed.push(
        Record::new()
            .with("sub_id", 4_i64)
            .with("committee_id", "C00000001"),
    );
    db.insert_records(&model, &seed).unwrap();

    let committee = model.column("committee_id").unwrap();
    let query = Query::new(&model).filter(committee.eq("C00401224"));
    let params = PageParams::new().with_per_page(10);
    let page =
        fetch_seek_page(&db, query, &params, &sub_id(), &FetchOptions::default()).unwrap();
    assert_eq!(ids(&page), vec![1, 2, 3]);
    assert_eq!(page.pagination.count, 3);
}

#[test]
fn test_invalid_sort_field_is_422() {
    let db = setup_db();
    let model = models::schedule_a();
    let params = PageParams::new().with_per_page(10).with_sort("-nope");
    let err = fetch_seek_page(
        &db,
        Query::new(&model),
        &params,
        &sub_id(),
        &FetchOptions::default(),
    )
    .unwrap_err();
    assert_eq!(err.status_code(), 422);
    assert_eq!(err.to_string(), "Field \"-nope\" cannot be used to sort results");
}

#[test]
fn test_cap_is_enforced_before_querying() {
    let db = setup_db();
    let model = models::schedule_a();
    for params in [PageParams::new(), PageParams::new().with_per_page(101)] {
        let err = fetch_seek_page(
            &db,
            Query::new(&model),
            &params,
            &sub_id(),
            &FetchOptions::default(),
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Parameter \"per_page\" must be between 1 and 100"
        );
    }

    let page = fetch_seek_page(
        &db,
        Query::new(&model),
        &PageParams::new().with_per_page(500),
        &sub_id(),
        &FetchOptions::default().with_cap(Some(1000)),
    )
    .unwrap();
    assert!(page.results.is_empty());
}

#[test]
fn test_text_sort_with_nulls_visits_every_row() {
    let mut db = setup_db();
    let model = models::schedule_a();
    let names = [Some("ADAMS"), None, Some("BAKER"), None];
    let seed: Vec<Record> = names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            receipt(i as i64 + 1, Some(1.0), None).with("contributor_name", *name)
        })
        .collect();
    db.insert_records(&model, &seed).unwrap();
    let options = FetchOptions::default();

    let base = PageParams::new()
        .with_per_page(2)
        .with_sort("contributor_name");
    assert_eq!(collect_pages(&db, &base, &options), vec![vec![1, 3], vec![2, 4]]);

    // Descending keeps nulls last as well; continuing within them is refused.
    let base = PageParams::new()
        .with_per_page(2)
        .with_sort("-contributor_name");
    let first = fetch_seek_page(&db, Query::new(&model), &base, &sub_id(), &options).unwrap();
    assert_eq!(ids(&first), vec![3, 1]);
    let params = next_params(&base, &first);
    let second = fetch_seek_page(&db, Query::new(&model), &params, &sub_id(), &options).unwrap();
    assert_eq!(ids(&second), vec![4, 2]);
    let params = next_params(&base, &second);
    let err = fetch_seek_page(&db, Query::new(&model), &params, &sub_id(), &options).unwrap_err();
    assert!(matches!(err, ApiError::Unsupported(_)));
}

#[test]
fn test_text_sort_first_page_ending_on_null_continues_within_nulls() {
    let mut db = setup_db();
    let model = models::schedule_a();
    let names = [None, Some("ADAMS"), None, None];
    let seed: Vec<Record> = names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            receipt(i as i64 + 1, Some(1.0), None).with("contributor_name", *name)
        })
        .collect();
    db.insert_records(&model, &seed).unwrap();

    let base = PageParams::new()
        .with_per_page(2)
        .with_sort("contributor_name");
    let pages = collect_pages(&db, &base, &FetchOptions::default());
    assert_eq!(pages, vec![vec![2, 1], vec![3, 4]]);
}

#[test]
fn test_join_column_sort_across_pages() {
    let mut db = setup_db();
    let model = models::schedule_a();
    db.conn()
        .execute_batch(
            "INSERT INTO committee_detail (committee_id, name) VALUES ('C00000001', 'ALPHA');
             INSERT INTO committee_detail (committee_id, name) VALUES ('C00000002', 'BETA');",
        )
        .unwrap();
    let seed: Vec<Record> = (1..=4_i64)
        .map(|i| {
            receipt(i, Some(1.0), None).with(
                "committee_id",
                if i % 2 == 0 { "C00000001" } else { "C00000002" },
            )
        })
        .collect();
    db.insert_records(&model, &seed).unwrap();

    let registry = models::registry();
    let committees = models::committee_detail();
    let join = related_committee().build(&registry, &model).unwrap();
    let options = FetchOptions::default().with_sort(SortOptions::default().with_join_column(
        "committee_name",
        committees.column("name").unwrap().clone(),
        join,
    ));
    let base = PageParams::new()
        .with_per_page(2)
        .with_sort("committee_name");

    let first = fetch_seek_page(&db, Query::new(&model), &base, &sub_id(), &options).unwrap();
    assert_eq!(ids(&first), vec![2, 4]);
    assert_eq!(first.results[0].value_of("committee_name"), SqlValue::from("ALPHA"));
    let cursor = first.pagination.last_indexes.clone().unwrap();
    assert!(!cursor.sort_null_only);
    assert_eq!(
        cursor.to_query_pairs()[1],
        ("last_committee_name".to_string(), "ALPHA".to_string())
    );

    assert_eq!(collect_pages(&db, &base, &options), vec![vec![2, 4], vec![1, 3]]);
}

#[test]
fn test_alias_sort_across_pages() {
    let mut db = setup_db();
    let model = models::schedule_a();
    let amounts = [30.0, 10.0, 40.0, 20.0];
    let seed: Vec<Record> = amounts
        .iter()
        .enumerate()
        .map(|(i, amount)| receipt(i as i64 + 1, Some(*amount), None))
        .collect();
    db.insert_records(&model, &seed).unwrap();

    let amount = model.column("contribution_receipt_amount").unwrap().clone();
    let options = FetchOptions::default().with_sort(SortOptions::default().with_alias("amount", amount));
    let base = PageParams::new().with_per_page(2).with_sort("-amount");
    assert_eq!(collect_pages(&db, &base, &options), vec![vec![3, 1], vec![4, 2]]);
}
