use json_table::{Condition, JsonTable, Predicate};
use serde_json::json;

fn main() -> Result<(), json_table::Error> {
    let path = std::env::temp_dir().join("json_table_example_basic.json");
    let _ = std::fs::remove_file(&path);
    let mut fruit = JsonTable::open(&path)?;

    // add / get
    fruit.add(json!({"name": "apples", "count": 3}))?;
    fruit.add(json!({"name": "bananas", "count": 5}))?;
    fruit.extend(vec![
        json!({"name": "grapes", "count": 12}),
        json!({"name": "lemons", "count": 7}),
    ])?;

    let plenty = Predicate::compare("count", ">=", json!(6))?;
    println!("plenty = {:?}", fruit.get(plenty.clone())?);

    // update merges into the first match, or inserts when nothing matches
    let apples = Predicate::compare("name", "==", json!("apples"))?;
    println!("{:?}", fruit.update(json!({"count": 4}), apples)?);
    let kiwis = Predicate::compare("name", "==", json!("kiwis"))?;
    println!("{:?}", fruit.update(json!({"name": "kiwis", "count": 0}), kiwis)?);

    // delete
    println!("removed {}", fruit.delete(plenty)?);

    println!("len    = {}", fruit.len());
    println!("{fruit}");

    // persist and clean up
    fruit.sync()?;
    fruit.delete_all();
    println!("after delete_all: {}", fruit.get(Condition::All)?.len());

    let _ = std::fs::remove_file(&path);
    Ok(())
}
