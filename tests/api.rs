use json_table::{Condition, Error, JsonTable, Predicate, UpdateOutcome};
use serde_json::{json, Value};
use std::path::PathBuf;
use tempfile::TempDir;

fn temp_path(name: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(format!("{name}.json"));
    (dir, path)
}

fn ge(key: &str, v: Value) -> Predicate {
    Predicate::compare(key, ">=", v).unwrap()
}

// ---- add --------------------------------------------------------------------

#[test]
fn add_appends_in_order() {
    let (_dir, path) = temp_path("add");
    let mut t = JsonTable::open(&path).unwrap();
    assert_eq!(t.add(json!({"n": 1})).unwrap(), 0);
    assert_eq!(t.add(json!({"n": 2})).unwrap(), 1);
    t.append(json!({"n": 3})).unwrap();

    let ns: Vec<_> = t.iter().map(|r| r["n"].clone()).collect();
    assert_eq!(ns, vec![json!(1), json!(2), json!(3)]);
    assert_eq!(t.len(), 3);
}

#[test]
fn add_same_record_twice_keeps_both() {
    let (_dir, path) = temp_path("add_twice");
    let mut t = JsonTable::open(&path).unwrap();
    t.add(json!({"x": 1})).unwrap();
    t.add(json!({"x": 1})).unwrap();
    assert_eq!(t.get(Condition::All).unwrap().len(), 2);
}

#[test]
fn add_rejects_non_objects() {
    let (_dir, path) = temp_path("add_bad");
    let mut t = JsonTable::open(&path).unwrap();
    for bad in [json!([1, 2]), json!("text"), json!(3), json!(null)] {
        assert!(matches!(t.add(bad), Err(Error::InvalidRecord(_))));
    }
    assert!(t.is_empty());
}

#[test]
fn extend_bulk_insert() {
    let (_dir, path) = temp_path("extend");
    let mut t = JsonTable::open(&path).unwrap();
    t.extend((0..50).map(|i| json!({"i": i}))).unwrap();
    assert_eq!(t.len(), 50);
    assert_eq!(t.records()[49]["i"], json!(49));
}

#[test]
fn extend_is_all_or_nothing() {
    let (_dir, path) = temp_path("extend_bad");
    let mut t = JsonTable::open(&path).unwrap();
    t.add(json!({"keep": true})).unwrap();
    let err = t.extend(vec![json!({"a": 1}), json!(7)]).unwrap_err();
    assert!(matches!(err, Error::InvalidRecord(_)));
    assert_eq!(t.len(), 1);
}

// ---- get --------------------------------------------------------------------

#[test]
fn get_all_returns_everything() {
    let (_dir, path) = temp_path("get_all");
    let mut t = JsonTable::open(&path).unwrap();
    t.add(json!({"a": 1})).unwrap();
    t.add(json!({"b": 2})).unwrap();
    let all = t.get(Condition::All).unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(t.records().len(), 2);
}

#[test]
fn get_with_predicate_scans() {
    let (_dir, path) = temp_path("get_pred");
    let mut t = JsonTable::open(&path).unwrap();
    t.extend(vec![
        json!({"name": "a", "age": 10}),
        json!({"name": "b", "age": 20}),
        json!({"name": "c"}),
        json!({"name": "d", "age": 30}),
    ])
    .unwrap();

    let hits = t.get(ge("age", json!(18))).unwrap();
    let names: Vec<_> = hits.iter().map(|r| r["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["b", "d"]);
}

#[test]
fn get_with_several_predicates_is_any_of() {
    let (_dir, path) = temp_path("get_any");
    let mut t = JsonTable::open(&path).unwrap();
    t.extend(vec![
        json!({"kind": "cat"}),
        json!({"kind": "dog"}),
        json!({"kind": "eel"}),
    ])
    .unwrap();

    let cat = Predicate::compare("kind", "==", json!("cat")).unwrap();
    let eel = Predicate::compare("kind", "==", json!("eel")).unwrap();
    let hits = t.get(vec![cat, eel]).unwrap();
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[1]["kind"], json!("eel"));
}

#[test]
fn get_indexed_without_index_fails() {
    let (_dir, path) = temp_path("get_noindex");
    let t = JsonTable::open(&path).unwrap();
    assert_eq!(
        t.get(("id", json!(1))).unwrap_err(),
        Error::IndexNotFound { field: "id".into() }
    );
}

#[test]
fn get_one_first_or_none() {
    let (_dir, path) = temp_path("get_one");
    let mut t = JsonTable::open(&path).unwrap();
    t.extend(vec![json!({"v": 1}), json!({"v": 2})]).unwrap();

    let first = t.get_one(ge("v", json!(0))).unwrap().unwrap();
    assert_eq!(first["v"], json!(1));
    assert!(t.get_one(ge("v", json!(5))).unwrap().is_none());
}

// ---- update -----------------------------------------------------------------

#[test]
fn update_merges_into_first_match_only() {
    let (_dir, path) = temp_path("update_first");
    let mut t = JsonTable::open(&path).unwrap();
    t.extend(vec![json!({"v": 1}), json!({"v": 2})]).unwrap();

    let out = t.update(json!({"seen": true, "v": 9}), ge("v", json!(0))).unwrap();
    assert_eq!(out, UpdateOutcome::Updated(1));
    assert_eq!(t.records()[0], json!({"v": 9, "seen": true}).as_object().unwrap().clone());
    assert!(t.records()[1].get("seen").is_none());
}

#[test]
fn update_many_merges_into_every_match() {
    let (_dir, path) = temp_path("update_many");
    let mut t = JsonTable::open(&path).unwrap();
    t.extend(vec![json!({"v": 1}), json!({"v": 2}), json!({"v": -1})])
        .unwrap();

    let out = t.update_many(json!({"pos": true}), ge("v", json!(0))).unwrap();
    assert_eq!(out, UpdateOutcome::Updated(2));
    assert_eq!(t.get(ge("pos", json!(true))).unwrap().len(), 2);
}

#[test]
fn update_without_match_inserts() {
    let (_dir, path) = temp_path("update_upsert");
    let mut t = JsonTable::open(&path).unwrap();
    t.add(json!({"v": 1})).unwrap();

    let out = t.update(json!({"v": 100}), ge("v", json!(50))).unwrap();
    assert_eq!(out, UpdateOutcome::Inserted(1));
    assert_eq!(t.len(), 2);
}

#[test]
fn update_all_touches_every_record_and_never_inserts() {
    let (_dir, path) = temp_path("update_all");
    let mut t = JsonTable::open(&path).unwrap();
    assert_eq!(
        t.update(json!({"x": 1}), Condition::All).unwrap(),
        UpdateOutcome::Updated(0)
    );
    assert!(t.is_empty());

    t.extend(vec![json!({}), json!({"x": 0})]).unwrap();
    assert_eq!(
        t.update(json!({"x": 1}), Condition::All).unwrap(),
        UpdateOutcome::Updated(2)
    );
    assert!(t.iter().all(|r| r["x"] == json!(1)));
}

#[test]
fn update_rejects_non_object_fields() {
    let (_dir, path) = temp_path("update_bad");
    let mut t = JsonTable::open(&path).unwrap();
    assert!(matches!(
        t.update(json!(5), Condition::All),
        Err(Error::InvalidRecord(_))
    ));
}

// ---- delete -----------------------------------------------------------------

#[test]
fn delete_all_empties_table() {
    let (_dir, path) = temp_path("delete_all");
    let mut t = JsonTable::open(&path).unwrap();
    t.extend(vec![json!({"a": 1}), json!({"a": 2})]).unwrap();
    t.delete_all();
    assert!(t.get(Condition::All).unwrap().is_empty());

    t.sync().unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "[]");
}

#[test]
fn delete_with_predicate_removes_matches() {
    let (_dir, path) = temp_path("delete_pred");
    let mut t = JsonTable::open(&path).unwrap();
    t.extend((0..10).map(|i| json!({"i": i}))).unwrap();

    let removed = t.delete(ge("i", json!(5))).unwrap();
    assert_eq!(removed, 5);
    assert_eq!(t.len(), 5);
    assert_eq!(t.delete(ge("i", json!(100))).unwrap(), 0);
}

// ---- rendering --------------------------------------------------------------

#[test]
fn compact_and_pretty_rendering() {
    let (_dir, path) = temp_path("render");
    let mut t = JsonTable::open(&path).unwrap();
    t.add(json!({"b": 1, "a": 2})).unwrap();

    assert_eq!(t.to_compact_string().unwrap(), r#"[{"b":1,"a":2}]"#);
    assert_eq!(
        t.to_string(),
        "[\n  {\n    \"a\": 2,\n    \"b\": 1\n  }\n]"
    );
}

#[test]
fn iterate_by_reference() {
    let (_dir, path) = temp_path("iter");
    let mut t = JsonTable::open(&path).unwrap();
    t.extend(vec![json!({"i": 0}), json!({"i": 1})]).unwrap();
    let mut seen = 0;
    for (pos, record) in (&t).into_iter().enumerate() {
        assert_eq!(record["i"], json!(pos));
        seen += 1;
    }
    assert_eq!(seen, 2);
}

#[test]
fn debug_impls_dont_panic() {
    let (_dir, path) = temp_path("debug");
    let t = JsonTable::open_with_indexes(&path, ["id"]).unwrap();
    let dbg = format!("{t:?}");
    assert!(dbg.contains("JsonTable"));
    assert!(dbg.contains("id"));

    let builder = JsonTable::builder(&path).index("id");
    assert!(format!("{builder:?}").contains("JsonTableBuilder"));
}

#[test]
fn path_accessor() {
    let (_dir, path) = temp_path("path_acc");
    let t = JsonTable::open(&path).unwrap();
    assert_eq!(t.path(), path.as_path());
}
