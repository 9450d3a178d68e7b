use serde_json::Value;
use tabled::{builder::Builder, Table};

/// Format a payload as a table using the tabled crate.
///
/// Objects become a two-column Field/Value table; arrays of objects become
/// one row per entry with headers taken from the first entry.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(_) => print_field_table(value),
        Value::Array(arr) => print_row_table(arr),
        _ => println!("{}", value),
    }
}

fn print_field_table(value: &Value) {
    if let Value::Object(map) = value {
        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        for (key, val) in map {
            match val {
                // Payment echoes carry the reconciled loan and the portfolio
                // summary carries its receivables split; dotted keys keep one
                // level of nesting readable.
                Value::Object(inner) => {
                    for (inner_key, inner_val) in inner {
                        builder.push_record([
                            format!("{}.{}", key, inner_key),
                            format_value(inner_val),
                        ]);
                    }
                }
                _ => {
                    builder.push_record([key.clone(), format_value(val)]);
                }
            }
        }
        let table = Table::from(builder);
        println!("{}", table);
    }
}

fn print_row_table(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    // Headers come from the first entry; every command emits uniform rows
    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<String> = first.keys().cloned().collect();
        let mut builder = Builder::default();
        builder.push_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| {
                        map.get(h.as_str())
                            .map(|v| format_value(v))
                            .unwrap_or_default()
                    })
                    .collect();
                builder.push_record(row);
            }
        }

        let table = Table::from(builder);
        println!("{}", table);
    } else {
        for item in arr {
            println!("{}", format_value(item));
        }
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "-".to_string(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(|v| format_value(v)).collect();
            items.join(", ")
        }
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
