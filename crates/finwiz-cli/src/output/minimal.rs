use serde_json::Value;

use super::{render_scalar, result_of};

/// Fields that carry the headline answer, in priority order.
const PRIORITY_KEYS: [&str; 4] = ["value", "macaulay_duration", "first_weight", "price"];

/// Print just the key answer value from the output.
pub fn print_minimal(value: &Value) {
    println!("{}", headline(value));
}

fn headline(value: &Value) -> String {
    let result = result_of(value);

    if let Value::Object(map) = result {
        if let Some(val) = PRIORITY_KEYS
            .iter()
            .filter_map(|key| map.get(*key))
            .find(|val| !val.is_null())
        {
            return render_scalar(val);
        }

        if let Some((key, val)) = map.iter().next() {
            return format!("{}: {}", key, render_scalar(val));
        }
    }

    render_scalar(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_headline_prefers_priority_keys() {
        let v = json!({ "result": { "price": "961.17", "macaulay_duration": "2" } });
        assert_eq!(headline(&v), "2");
    }

    #[test]
    fn test_headline_falls_back_to_first_field() {
        let v = json!({ "result": { "other": "x" } });
        assert_eq!(headline(&v), "other: x");
    }
}
