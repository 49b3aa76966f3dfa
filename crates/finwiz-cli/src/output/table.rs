use serde_json::Value;
use tabled::{builder::Builder, Table};

use super::render_scalar;

/// Format a computation envelope as a Field/Value table, followed by any
/// warnings and the methodology.
pub fn print_table(value: &Value) {
    let Value::Object(envelope) = value else {
        println!("{}", render_scalar(value));
        return;
    };

    match envelope.get("result") {
        Some(Value::Object(result)) => println!("{}", field_table(result)),
        _ => println!("{}", field_table(envelope)),
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {}", w);
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn field_table(map: &serde_json::Map<String, Value>) -> Table {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        builder.push_record([key.clone(), render_scalar(val)]);
    }
    builder.build()
}
