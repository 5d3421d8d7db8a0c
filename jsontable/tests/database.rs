use jsontable::{Database, DatabaseConfig, JsonTableError, Record, TableOptions};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tempfile::TempDir;

fn record(value: Value) -> Record {
    value.as_object().cloned().unwrap()
}

fn tasks_options() -> TableOptions {
    TableOptions::new()
        .primary_key("id")
        .auto_increment(true)
        .created_at(true)
}

fn tasks_columns() -> Value {
    json!({ "id": "number", "title": "string", "completed": "boolean" })
}

fn open_todo(tmp: &TempDir) -> Database {
    Database::open("todo", tmp.path()).unwrap()
}

#[test]
fn test_open_creates_document() {
    let tmp = TempDir::new().unwrap();
    let db = Database::open_with_config(&DatabaseConfig::new("todo", tmp.path())).unwrap();
    assert_eq!(db.path(), tmp.path().join("todo.json").as_path());
    assert!(db.path().exists());
    assert!(db.get_table_names().is_empty());
}

#[test]
fn test_scenarios_a_to_d() {
    let tmp = TempDir::new().unwrap();
    let mut db = open_todo(&tmp);

    // A: create and insert with stamping
    db.create_table("tasks", &tasks_columns(), &tasks_options())
        .unwrap();
    let row = db
        .insert("tasks", &record(json!({ "title": "Finish", "completed": false })))
        .unwrap();
    assert_eq!(row["id"], json!(1));
    assert_eq!(row["completed"], json!(false));
    assert!(row["createdAt"].is_string());
    assert_eq!(db.get_all("tasks").unwrap().data.len(), 1);

    // B: wrong type is rejected and nothing changes
    let err = db
        .insert("tasks", &record(json!({ "title": "x", "completed": "no" })))
        .unwrap_err();
    assert!(matches!(err, JsonTableError::Validation(_)));
    assert_eq!(db.get_all("tasks").unwrap().data.len(), 1);

    // C: duplicate create leaves the table alone
    let err = db
        .create_table("tasks", &tasks_columns(), &tasks_options())
        .unwrap_err();
    assert!(matches!(err, JsonTableError::AlreadyExists { .. }));
    assert_eq!(db.get_all("tasks").unwrap().data[0], row);

    // D: drop
    db.drop_table("tasks").unwrap();
    assert!(matches!(
        db.get_all("tasks").unwrap_err(),
        JsonTableError::NotFound { .. }
    ));
    assert!(!db.get_table_names().contains(&"tasks".to_string()));
}

#[test]
fn test_scenario_e_bad_primary_key() {
    let tmp = TempDir::new().unwrap();
    let mut db = open_todo(&tmp);

    let err = db
        .create_table(
            "t",
            &json!({ "id": "number", "name": "string" }),
            &TableOptions::new().primary_key("missing"),
        )
        .unwrap_err();
    assert!(matches!(err, JsonTableError::Schema(_)));
    assert!(!db.get_table_names().contains(&"t".to_string()));

    let reopened = open_todo(&tmp);
    assert!(!reopened.has_table("t"));
}

#[test]
fn test_reload_round_trip() {
    let tmp = TempDir::new().unwrap();
    let mut db = open_todo(&tmp);
    db.create_table("tasks", &tasks_columns(), &tasks_options())
        .unwrap();
    db.create_table(
        "tags",
        &json!({ "name": "string" }),
        &TableOptions::new().primary_key("name").updated_at(true),
    )
    .unwrap();
    db.insert("tasks", &record(json!({ "title": "a", "completed": true })))
        .unwrap();
    db.insert("tags", &record(json!({ "name": "home" })))
        .unwrap();

    let reopened = open_todo(&tmp);
    assert_eq!(reopened.get_table_names(), db.get_table_names());
    for name in db.get_table_names() {
        assert_eq!(reopened.get_all(&name).unwrap(), db.get_all(&name).unwrap());
    }
}

#[test]
fn test_auto_increment_monotonic() {
    let tmp = TempDir::new().unwrap();
    let mut db = open_todo(&tmp);
    db.create_table("tasks", &tasks_columns(), &tasks_options())
        .unwrap();

    for i in 1..=5 {
        let row = db
            .insert(
                "tasks",
                &record(json!({ "title": format!("task {i}"), "completed": false })),
            )
            .unwrap();
        assert_eq!(row["id"], json!(i));
    }

    let table = db.get_all("tasks").unwrap();
    assert_eq!(table.metadata.last_id, 5);
    let ids: Vec<_> = table.data.iter().map(|r| r["id"].clone()).collect();
    assert_eq!(ids, vec![json!(1), json!(2), json!(3), json!(4), json!(5)]);

    // Counter survives a reload
    let mut reopened = open_todo(&tmp);
    let row = reopened
        .insert("tasks", &record(json!({ "title": "six", "completed": false })))
        .unwrap();
    assert_eq!(row["id"], json!(6));
}

#[test]
fn test_schema_unchanged_by_inserts() {
    let tmp = TempDir::new().unwrap();
    let mut db = open_todo(&tmp);
    db.create_table("tasks", &tasks_columns(), &tasks_options())
        .unwrap();
    let columns = db.get_all("tasks").unwrap().columns.clone();

    db.insert(
        "tasks",
        &record(json!({ "title": "a", "completed": false, "extra": "kept" })),
    )
    .unwrap();
    let _ = db.insert("tasks", &record(json!({ "title": 3, "completed": false })));

    let table = db.get_all("tasks").unwrap();
    assert_eq!(table.columns, columns);
    assert_eq!(table.data[0]["extra"], json!("kept"));
}

#[test]
fn test_failed_insert_leaves_file_unchanged() {
    let tmp = TempDir::new().unwrap();
    let mut db = open_todo(&tmp);
    db.create_table("tasks", &tasks_columns(), &tasks_options())
        .unwrap();
    db.insert("tasks", &record(json!({ "title": "a", "completed": false })))
        .unwrap();
    let before = std::fs::read(db.path()).unwrap();

    db.insert("tasks", &record(json!({ "title": "b", "completed": "no" })))
        .unwrap_err();
    db.insert("ghost", &record(json!({}))).unwrap_err();
    db.drop_table("ghost").unwrap_err();
    db.create_table("tasks", &json!({}), &TableOptions::new())
        .unwrap_err();

    assert_eq!(std::fs::read(db.path()).unwrap(), before);
    let reopened = open_todo(&tmp);
    assert_eq!(reopened.get_all("tasks").unwrap().data.len(), 1);
}

#[test]
fn test_persisted_layout() {
    let tmp = TempDir::new().unwrap();
    let mut db = open_todo(&tmp);
    db.create_table("tasks", &tasks_columns(), &tasks_options())
        .unwrap();
    db.insert("tasks", &record(json!({ "title": "a", "completed": false })))
        .unwrap();

    let text = std::fs::read_to_string(tmp.path().join("todo.json")).unwrap();
    let saved: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(saved["$format"], json!(1));

    let tasks = &saved["tasks"];
    assert_eq!(tasks["metadata"]["lastId"], json!(1));
    assert_eq!(tasks["metadata"]["primaryKey"], json!("id"));
    assert_eq!(tasks["metadata"]["autoIncrement"], json!(true));
    assert!(tasks["metadata"]["createdAt"].is_string());
    assert_eq!(
        tasks["columns"],
        json!({
            "id": "number",
            "title": "string",
            "completed": "boolean",
            "createdAt": "date"
        })
    );
    assert_eq!(tasks["data"][0]["title"], json!("a"));
}

#[test]
fn test_reads_legacy_unversioned_file() {
    let tmp = TempDir::new().unwrap();
    let legacy = json!({
        "tasks": {
            "metadata": {
                "lastId": 1,
                "primaryKey": "id",
                "autoIncrement": true,
                "createdAt": "2024-05-01T10:00:00.000Z"
            },
            "columns": { "id": "number", "title": "String" },
            "data": [{ "id": 1, "title": "old" }]
        }
    });
    std::fs::write(
        tmp.path().join("todo.json"),
        serde_json::to_string_pretty(&legacy).unwrap(),
    )
    .unwrap();

    let mut db = open_todo(&tmp);
    let row = db.insert("tasks", &record(json!({ "title": "new" }))).unwrap();
    assert_eq!(row["id"], json!(2));

    let saved: Value =
        serde_json::from_str(&std::fs::read_to_string(db.path()).unwrap()).unwrap();
    assert_eq!(saved["$format"], json!(1));
    assert_eq!(saved["tasks"]["columns"]["title"], json!("string"));
}

#[test]
fn test_rejects_future_format() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("todo.json"), r#"{ "$format": 9 }"#).unwrap();

    let err = Database::open("todo", tmp.path()).err().unwrap();
    assert!(matches!(err, JsonTableError::UnsupportedFormat(_)));
}

#[test]
fn test_reads_do_not_see_external_changes() {
    let tmp = TempDir::new().unwrap();
    let mut db = open_todo(&tmp);
    db.create_table("tasks", &tasks_columns(), &tasks_options())
        .unwrap();

    let mut other = open_todo(&tmp);
    other
        .create_table("notes", &json!({ "id": "number" }), &TableOptions::new())
        .unwrap();

    assert_eq!(db.get_table_names(), vec!["tasks".to_string()]);
    assert!(open_todo(&tmp).has_table("notes"));
}
