use chrono::{Local, SecondsFormat, TimeZone, Utc};
use ormbase::prelude::*;

struct Account;

ormbase::model! {
    Account {
        "id" => ColumnOptions::new().primary_key().auto_increment(),
        "name" => ColumnOptions::new(),
        "createdAt" => ColumnOptions::new().column_type(ColumnType::Date),
    }
}

fn local_midnight_iso(y: i32, m: u32, d: u32) -> String {
    Local
        .with_ymd_and_hms(y, m, d, 0, 0, 0)
        .earliest()
        .unwrap()
        .with_timezone(&Utc)
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn ann() -> Record {
    record! { "id" => 1, "name" => "Ann", "createdAt" => "2024-01-01T10:00:00" }
}

#[test]
fn import_normalizes_dates_and_export_omits_auto_increment() {
    let mut account = ModelInstance::new::<Account>();
    account.import_current(&ann());

    let created = account.get("createdAt").unwrap();
    assert_eq!(created.string_value(), local_midnight_iso(2024, 1, 1));

    let exported = account.export();
    assert_eq!(exported.keys().collect::<Vec<_>>(), vec!["name", "createdAt"]);
    assert_eq!(exported.get("name"), Some(&Value::from("Ann")));
    assert_eq!(
        exported.get("createdAt"),
        Some(&Value::Text(local_midnight_iso(2024, 1, 1)))
    );
}

#[test]
fn changed_name_is_reported_against_snapshot() {
    let mut account = ModelInstance::new::<Account>();
    account.import_current(&ann());
    account.import_original(&ann());
    assert!(!account.has_changed());

    account.set("name", "Anna").unwrap();
    assert!(account.has_changed());

    let changes = account.changes();
    assert_eq!(changes.len(), 1);
    assert_eq!(
        changes.get("name"),
        Some(&Change {
            current: "Anna".to_string(),
            previous: "Ann".to_string(),
        })
    );
}

#[test]
fn fresh_instance_never_reports_changes() {
    let mut account = ModelInstance::new::<Account>();
    account.import_current(&ann());
    account.set("name", "Someone else").unwrap();
    assert!(!account.has_changed());
    assert!(account.changes().is_empty());
}

#[test]
fn auto_increment_export_on_request() {
    let account = ModelInstance::load::<Account>(&ann());
    let exported = account.export_with(ExportOptions::new().include_auto_increment());
    assert_eq!(
        exported.keys().collect::<Vec<_>>(),
        vec!["id", "name", "createdAt"]
    );
    assert_eq!(exported.get("id"), Some(&Value::from("1")));
}

#[test]
fn only_auto_increment_keys() {
    let account = ModelInstance::load::<Account>(&ann());
    let keys = account
        .primary_keys_and_values(KeyOptions::new().only_auto_increment().as_string())
        .unwrap();
    assert_eq!(keys.get("id"), Some(&Value::from("1")));
    assert_eq!(keys.len(), 1);
}

#[test]
fn boolean_single_byte_buffers() {
    let opts = ColumnOptions::new().column_type(ColumnType::Boolean);
    assert_eq!(
        ormbase::coerce(&opts, Some(Value::Bytes(vec![0]))),
        Some(Value::Bool(false))
    );
    assert_eq!(
        ormbase::coerce(&opts, Some(Value::Bytes(vec![1]))),
        Some(Value::Bool(true))
    );
}

#[test]
fn zero_date_coerces_to_null() {
    let opts = ColumnOptions::new().column_type(ColumnType::Date);
    assert_eq!(
        ormbase::coerce(&opts, Some(Value::from(ormbase::ZERO_DATE))),
        Some(Value::Null)
    );

    let mut account = ModelInstance::new::<Account>();
    account.import_current(&record! { "createdAt" => "0000-00-00" });
    assert_eq!(account.get("createdAt"), Some(&Value::Null));
}
