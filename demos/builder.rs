use json_table::{Condition, JsonTable};
use serde_json::json;

fn main() -> Result<(), json_table::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let path = std::env::temp_dir().join("json_table_example_builder.json");
    let _ = std::fs::remove_file(&path);

    let mut users = JsonTable::builder(&path)
        .index("id")
        .sparse_index("email")
        .pretty(true)
        .build()?;

    users.add(json!({"id": 1, "name": "Ada", "email": "ada@example.com"}))?;
    users.add(json!({"id": 2, "name": "Lin"}))?;

    users.update(json!({"email": "lin@example.com"}), Condition::indexed("id", 2))?;
    println!("{:?}", users.get_one(Condition::indexed("email", "lin@example.com"))?);

    users.sync()?;
    println!("{}", std::fs::read_to_string(&path).unwrap_or_default());

    let _ = std::fs::remove_file(&path);
    Ok(())
}
