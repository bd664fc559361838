use fiscus::{Engine, Error, QuerySpec, Record, Router, SqliteStore};
use serde_json::{Value, json};

async fn setup() -> Engine {
    let store = SqliteStore::new_memory().await.unwrap();
    store.init_schema().await.unwrap();
    Engine::new(store).unwrap()
}

fn record(value: Value) -> Record {
    value.as_object().cloned().unwrap()
}

fn spec(value: Value) -> QuerySpec {
    serde_json::from_value(value).unwrap()
}

fn expense(bank_id: i64, amount: f64) -> Record {
    record(json!({
        "date_id": 1, "date": "2024-04-01", "master_id": 1, "bank_id": bank_id,
        "vendor": "acme", "remarks": "card swipe", "amount": amount,
        "tax_allowable_amount": 0,
    }))
}

fn calendar_day(date: &str) -> Record {
    record(json!({
        "date": date,
        "start_of_week": date, "end_of_week": date,
        "start_of_month": date, "end_of_month": date,
        "start_of_quarter": date, "end_of_quarter": date,
        "start_of_year": date, "end_of_year": date,
    }))
}

#[tokio::test]
async fn test_create_then_read_by_filter() {
    let engine = setup().await;
    let banks = engine.entity("BankMaster").unwrap();

    let created = engine
        .create(
            banks,
            vec![
                record(json!({"name": "ABC", "account_no": "123"})),
                record(json!({"name": "XYZ", "account_no": "456"})),
            ],
        )
        .await
        .unwrap();
    assert_eq!(created.len(), 2);
    assert_eq!(created[0]["_id"], json!(1));
    assert!(created[0]["createdAt"].is_string());

    let rows = engine
        .read(banks, spec(json!({"filter": {"name": {"eq": "ABC"}}})))
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["name"], json!("ABC"));
    assert_eq!(rows[0]["account_no"], json!("123"));
}

#[tokio::test]
async fn test_include_attaches_projected_parent() {
    let engine = setup().await;
    let banks = engine.entity("BankMaster").unwrap();
    let expenses = engine.entity("Expenses").unwrap();

    let created = engine
        .create(banks, vec![record(json!({"name": "ABC", "account_no": "1"}))])
        .await
        .unwrap();
    let bank_id = created[0]["_id"].as_i64().unwrap();
    engine
        .create(expenses, vec![expense(bank_id, 10.0), expense(bank_id, 20.0)])
        .await
        .unwrap();

    let rows = engine
        .read(
            expenses,
            spec(json!({"include": [{"model": "bankRecord", "attributes": ["name"]}]})),
        )
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);
    for row in &rows {
        let bank = row["bankRecord"].as_object().unwrap();
        assert_eq!(bank.get("name"), Some(&json!("ABC")));
        assert_eq!(bank.len(), 1, "projection keeps only `name`");
    }
}

#[tokio::test]
async fn test_has_many_include_groups_children_per_parent() {
    let engine = setup().await;
    let banks = engine.entity("BankMaster").unwrap();
    let expenses = engine.entity("Expenses").unwrap();

    engine
        .create(
            banks,
            vec![record(json!({"name": "A"})), record(json!({"name": "B"}))],
        )
        .await
        .unwrap();
    engine
        .create(
            expenses,
            vec![expense(1, 10.0), expense(1, 20.0), expense(2, 30.0)],
        )
        .await
        .unwrap();

    let rows = engine
        .read(
            banks,
            spec(json!({
                "include": [{"model": "expenses", "filter": {"amount": {"gte": 15}}}],
                "order": [["name", "asc"]],
            })),
        )
        .await
        .unwrap();
    let first = rows[0]["expenses"].as_array().unwrap();
    let second = rows[1]["expenses"].as_array().unwrap();
    assert_eq!(first.len(), 1, "include filter scoped the attached rows");
    assert_eq!(first[0]["amount"], json!(20.0));
    assert_eq!(second.len(), 1);
    assert_eq!(second[0]["amount"], json!(30.0));
}

#[tokio::test]
async fn test_nested_include_two_levels() {
    let engine = setup().await;
    let banks = engine.entity("BankMaster").unwrap();
    let categories = engine.entity("ExpenseCategoryMaster").unwrap();
    let masters = engine.entity("ExpenseMaster").unwrap();
    let expenses = engine.entity("Expenses").unwrap();

    engine
        .create(banks, vec![record(json!({"name": "A"}))])
        .await
        .unwrap();
    engine
        .create(categories, vec![record(json!({"category": "food"}))])
        .await
        .unwrap();
    engine
        .create(masters, vec![record(json!({"name": "groceries", "category_id": 1}))])
        .await
        .unwrap();
    engine
        .create(expenses, vec![expense(1, 42.0)])
        .await
        .unwrap();

    let rows = engine
        .read(
            expenses,
            spec(json!({
                "include": [{"model": "masterRecord", "include": ["expenseCategory"]}],
            })),
        )
        .await
        .unwrap();
    let master = rows[0]["masterRecord"].as_object().unwrap();
    assert_eq!(master["name"], json!("groceries"));
    let category = master["expenseCategory"].as_object().unwrap();
    assert_eq!(category["category"], json!("food"));
}

#[tokio::test]
async fn test_order_descending_by_amount() {
    let engine = setup().await;
    let expenses = engine.entity("Expenses").unwrap();
    engine
        .create(
            expenses,
            vec![expense(1, 10.0), expense(1, 30.0), expense(1, 20.0)],
        )
        .await
        .unwrap();

    let rows = engine
        .read(expenses, spec(json!({"order": [["amount", "desc"]]})))
        .await
        .unwrap();
    let amounts: Vec<f64> = rows
        .iter()
        .map(|r| r["amount"].as_f64().unwrap())
        .collect();
    assert_eq!(amounts, vec![30.0, 20.0, 10.0]);
}

#[tokio::test]
async fn test_order_through_relation_chain() {
    let engine = setup().await;
    let banks = engine.entity("BankMaster").unwrap();
    let expenses = engine.entity("Expenses").unwrap();
    engine
        .create(
            banks,
            vec![record(json!({"name": "zeta"})), record(json!({"name": "alpha"}))],
        )
        .await
        .unwrap();
    engine
        .create(expenses, vec![expense(1, 10.0), expense(2, 20.0)])
        .await
        .unwrap();

    let rows = engine
        .read(
            expenses,
            spec(json!({"order": [["bankRecord", "name", "asc"]]})),
        )
        .await
        .unwrap();
    assert_eq!(rows[0]["bank_id"], json!(2), "alpha's expense sorts first");
    assert_eq!(rows[1]["bank_id"], json!(1));
}

#[tokio::test]
async fn test_order_through_has_many_keeps_one_row_per_parent() {
    let engine = setup().await;
    let banks = engine.entity("BankMaster").unwrap();
    let expenses = engine.entity("Expenses").unwrap();
    engine
        .create(
            banks,
            vec![record(json!({"name": "A"})), record(json!({"name": "B"}))],
        )
        .await
        .unwrap();
    engine
        .create(
            expenses,
            vec![expense(1, 10.0), expense(1, 30.0), expense(2, 20.0)],
        )
        .await
        .unwrap();

    let rows = engine
        .read(
            banks,
            spec(json!({"order": [["expenses", "amount", "desc"]]})),
        )
        .await
        .unwrap();
    assert_eq!(rows.len(), 2, "one row per bank despite the has-many join");
    assert_eq!(rows[0]["name"], json!("A"), "highest child amount sorts first");
    assert_eq!(rows[1]["name"], json!("B"));
}

#[tokio::test]
async fn test_unknown_order_path_surfaces_as_unknown_column() {
    let engine = setup().await;
    let expenses = engine.entity("Expenses").unwrap();
    engine.create(expenses, vec![expense(1, 10.0)]).await.unwrap();

    // No alias prefix matches, so the whole path is treated as a literal
    // root column and refused by the store.
    let err = engine
        .read(expenses, spec(json!({"order": [["warehouse", "rack", "asc"]]})))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Persistence(_)), "got {err:?}");
    assert!(err.to_string().contains("warehouse.rack"));
}

#[tokio::test]
async fn test_delete_with_threshold_filter() {
    let engine = setup().await;
    let expenses = engine.entity("Expenses").unwrap();
    engine
        .create(
            expenses,
            vec![expense(1, 50.0), expense(1, 150.0), expense(1, 200.0)],
        )
        .await
        .unwrap();

    let filter = record(json!({"amount": {"gte": 100}}));
    let deleted = engine.delete(expenses, Some(&filter)).await.unwrap();
    assert_eq!(deleted, 2);

    let remaining = engine.read(expenses, QuerySpec::default()).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0]["amount"], json!(50.0));
}

#[tokio::test]
async fn test_update_bulk_refreshes_updated_at() {
    let engine = setup().await;
    let expenses = engine.entity("Expenses").unwrap();
    engine
        .create(expenses, vec![expense(1, 10.0), expense(1, 20.0)])
        .await
        .unwrap();

    let filter = record(json!({"amount": {"lt": 15}}));
    let count = engine
        .update(expenses, record(json!({"vendor": "globex"})), Some(&filter))
        .await
        .unwrap();
    assert_eq!(count, 1);

    let rows = engine
        .read(expenses, spec(json!({"order": [["amount", "asc"]]})))
        .await
        .unwrap();
    assert_eq!(rows[0]["vendor"], json!("globex"));
    assert_eq!(rows[1]["vendor"], json!("acme"));
}

#[tokio::test]
async fn test_filter_operators_or_between_null() {
    let engine = setup().await;
    let expenses = engine.entity("Expenses").unwrap();
    engine
        .create(
            expenses,
            vec![expense(1, 5.0), expense(1, 50.0), expense(1, 500.0)],
        )
        .await
        .unwrap();

    let rows = engine
        .read(
            expenses,
            spec(json!({"filter": {"amount": {"or": [{"lt": 10}, {"gt": 100}]}}})),
        )
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);

    let rows = engine
        .read(
            expenses,
            spec(json!({"filter": {"amount": {"between": [10, 100]}}})),
        )
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["amount"], json!(50.0));

    // emi_id was never set on these rows.
    let rows = engine
        .read(expenses, spec(json!({"filter": {"emi_id": {"is": null}}})))
        .await
        .unwrap();
    assert_eq!(rows.len(), 3);
    let rows = engine
        .read(expenses, spec(json!({"filter": {"emi_id": {"not": null}}})))
        .await
        .unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn test_pagination_limit_offset() {
    let engine = setup().await;
    let expenses = engine.entity("Expenses").unwrap();
    let batch = (1..=5).map(|i| expense(1, i as f64)).collect();
    engine.create(expenses, batch).await.unwrap();

    let rows = engine
        .read(
            expenses,
            spec(json!({"order": [["amount", "asc"]], "limit": 2, "offset": 2})),
        )
        .await
        .unwrap();
    let amounts: Vec<f64> = rows
        .iter()
        .map(|r| r["amount"].as_f64().unwrap())
        .collect();
    assert_eq!(amounts, vec![3.0, 4.0]);
}

#[tokio::test]
async fn test_root_attribute_projection() {
    let engine = setup().await;
    let banks = engine.entity("BankMaster").unwrap();
    engine
        .create(banks, vec![record(json!({"name": "ABC", "account_no": "123"}))])
        .await
        .unwrap();

    let rows = engine
        .read(banks, spec(json!({"attributes": ["name"]})))
        .await
        .unwrap();
    assert_eq!(rows[0].len(), 1);
    assert_eq!(rows[0]["name"], json!("ABC"));
}

#[tokio::test]
async fn test_malformed_between_surfaces_as_persistence_error() {
    let engine = setup().await;
    let expenses = engine.entity("Expenses").unwrap();
    let err = engine
        .read(
            expenses,
            spec(json!({"filter": {"amount": {"between": [10]}}})),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Persistence(_)), "got {err:?}");
    assert_eq!(err.kind(), "PersistenceError");
}

#[tokio::test]
async fn test_get_date_id_through_router() {
    let engine = setup().await;
    let router = Router::standard().unwrap();
    let calendar = engine.entity("CalendarMaster").unwrap();
    engine
        .create(
            calendar,
            vec![calendar_day("2024-04-01"), calendar_day("2024-04-02")],
        )
        .await
        .unwrap();

    let found = router
        .dispatch(
            &engine,
            "masters/calendar",
            "get-date-id",
            json!({"dateToFind": "2024-04-02"}),
        )
        .await
        .unwrap();
    assert_eq!(found["dateId"], json!(2));

    let err = router
        .dispatch(
            &engine,
            "masters/calendar",
            "get-date-id",
            json!({"dateToFind": "1999-01-01"}),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Persistence(_)), "got {err:?}");
}

#[tokio::test]
async fn test_router_edit_and_delete_envelope_values() {
    let engine = setup().await;
    let router = Router::standard().unwrap();
    router
        .dispatch(
            &engine,
            "transactions/expenses",
            "add",
            json!({"docsToAdd": [expense(1, 10.0), expense(1, 200.0)]}),
        )
        .await
        .unwrap();

    let edited = router
        .dispatch(
            &engine,
            "transactions/expenses",
            "edit",
            json!({
                "docToUpdate": {"remarks": "reviewed"},
                "options": {"filter": {"amount": {"gte": 100}}},
            }),
        )
        .await
        .unwrap();
    assert_eq!(edited, json!({"updatedRecords": 1}));

    let deleted = router
        .dispatch(
            &engine,
            "transactions/expenses",
            "delete",
            json!({"options": {"filter": {"amount": {"lt": 100}}}}),
        )
        .await
        .unwrap();
    assert_eq!(deleted, json!({"deletedRecords": 1}));

    let err = router
        .dispatch(&engine, "transactions/expenses", "edit", json!({}))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::BadRequest(_)), "got {err:?}");
}

#[tokio::test]
async fn test_file_backed_store_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fiscus.db");
    let store = SqliteStore::new_file(path.to_str().unwrap()).await.unwrap();
    store.init_schema().await.unwrap();
    let engine = Engine::new(store).unwrap();

    let banks = engine.entity("BankMaster").unwrap();
    engine
        .create(banks, vec![record(json!({"name": "persisted"}))])
        .await
        .unwrap();
    let rows = engine.read(banks, QuerySpec::default()).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["name"], json!("persisted"));
}
