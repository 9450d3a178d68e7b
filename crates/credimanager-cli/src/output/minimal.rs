use serde_json::Value;

/// Print just the key answer value from a payload.
///
/// Arrays (lists, agendas, arrears reports) reduce to their entry count,
/// which makes the overdue check scriptable. Objects are probed for
/// well-known answer fields in priority order, then fall back to the first
/// field.
pub fn print_minimal(value: &Value) {
    if let Value::Array(arr) = value {
        println!("{}", arr.len());
        return;
    }

    let priority_keys = [
        "installment_amount",
        "borrower_score",
        "score",
        "total_outstanding",
        "remaining_balance",
        "dossier",
        "removed",
        "path",
    ];

    if let Value::Object(map) = value {
        // Try priority keys first (skip null values)
        for key in &priority_keys {
            if let Some(val) = map.get(*key) {
                if !val.is_null() {
                    println!("{}", format_minimal(val));
                    return;
                }
            }
        }

        // Fall back to first field
        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_minimal(val));
            return;
        }
    }

    println!("{}", format_minimal(value));
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
