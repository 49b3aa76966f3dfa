use serde_json::Value;
use std::io;

use super::{render_scalar, result_of};

/// Write the result object as two-column `field,value` CSV to stdout.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());
    if let Err(e) = write_result(&mut wtr, value).and_then(|_| wtr.flush().map_err(Into::into)) {
        eprintln!("CSV write error: {}", e);
    }
}

fn write_result<W: io::Write>(wtr: &mut csv::Writer<W>, value: &Value) -> csv::Result<()> {
    match result_of(value) {
        Value::Object(map) => {
            wtr.write_record(["field", "value"])?;
            for (key, val) in map {
                wtr.write_record([key.as_str(), &render_scalar(val)])?;
            }
        }
        other => wtr.write_record([render_scalar(other)])?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_csv_two_columns() {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        let v = json!({ "result": { "first_weight": "0.25", "requires_short_position": false } });
        write_result(&mut wtr, &v).unwrap();
        let text = String::from_utf8(wtr.into_inner().unwrap()).unwrap();
        assert_eq!(
            text,
            "field,value\nfirst_weight,0.25\nrequires_short_position,false\n"
        );
    }
}
