use json_table::{Comparator, JsonTable, Predicate};
use serde_json::json;

fn main() -> Result<(), json_table::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let path = std::env::temp_dir().join("json_table_example_session.json");
    let _ = std::fs::remove_file(&path);

    // synced on Ok
    JsonTable::session(&path, |t| -> Result<(), json_table::Error> {
        t.add(json!({"name": "Hanna", "team": "red"}))?;
        t.add(json!({"name": "Otto", "team": "blue"}))?;
        Ok(())
    })?;

    // not synced on Err
    let failed = JsonTable::session(&path, |t| -> Result<(), json_table::Error> {
        t.delete_all();
        t.add(json!("not a record"))?;
        Ok(())
    });
    println!("second session: {failed:?}");

    let table = JsonTable::open(&path)?;
    let h_names = Predicate::build("name", Comparator::Match, json!("H.*"), false)?;
    println!("still {} records, H*: {:?}", table.len(), table.get(h_names)?);

    let _ = std::fs::remove_file(&path);
    Ok(())
}
