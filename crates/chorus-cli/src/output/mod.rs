use serde::Serialize;
use serde_json::Value;

use crate::cli::OutputFormat;

pub mod csv;
pub mod table;

/// Render a serializable response to a string in the requested format.
pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Table => {
            let (headers, rows) = tabulate(serde_json::to_value(value)?);
            if rows.is_empty() {
                return Ok(String::from("(no rows)"));
            }
            let header_refs = headers.iter().map(String::as_str).collect::<Vec<_>>();
            Ok(table::render_entity_table(
                &header_refs,
                &rows,
                table::TableOptions::from_env(),
            ))
        }
        OutputFormat::Csv => {
            let (headers, rows) = tabulate(serde_json::to_value(value)?);
            let header_refs = headers.iter().map(String::as_str).collect::<Vec<_>>();
            csv::records_to_csv(&header_refs, &rows)
        }
    }
}

/// Print a serializable response in the requested format.
pub fn output<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<()> {
    let rendered = render(value, format)?;
    println!("{}", rendered.trim_end());
    Ok(())
}

/// Flatten JSON into header and row cells. Arrays of objects become one
/// row per item with sorted keys, objects become key/value pairs.
fn tabulate(value: Value) -> (Vec<String>, Vec<Vec<String>>) {
    match value {
        Value::Array(items) if !items.is_empty() && items.iter().all(Value::is_object) => {
            let mut headers = Vec::<String>::new();
            for map in items.iter().filter_map(Value::as_object) {
                for key in map.keys() {
                    if !headers.contains(key) {
                        headers.push(key.clone());
                    }
                }
            }
            headers.sort();

            let rows = items
                .iter()
                .filter_map(Value::as_object)
                .map(|map| {
                    headers
                        .iter()
                        .map(|header| map.get(header).map_or_else(|| String::from("-"), value_to_cell))
                        .collect()
                })
                .collect();
            (headers, rows)
        }
        Value::Array(items) => (
            vec![String::from("value")],
            items.iter().map(|item| vec![value_to_cell(item)]).collect(),
        ),
        Value::Object(map) => {
            let rows = map
                .into_iter()
                .map(|(key, value)| vec![key, value_to_cell(&value)])
                .collect();
            (vec![String::from("key"), String::from("value")], rows)
        }
        scalar => (vec![String::from("value")], vec![vec![value_to_cell(&scalar)]]),
    }
}

fn value_to_cell(value: &Value) -> String {
    match value {
        Value::Null => String::from("null"),
        Value::Bool(v) => v.to_string(),
        Value::Number(v) => v.to_string(),
        Value::String(v) => v.clone(),
        other => serde_json::to_string(other).unwrap_or_else(|_| String::from("<invalid-json>")),
    }
}

#[cfg(test)]
mod tests {
    use serde::Serialize;

    use super::render;
    use crate::cli::OutputFormat;

    #[derive(Serialize)]
    struct Example {
        table: &'static str,
        record_id: i64,
        old_value: Option<&'static str>,
    }

    fn rows() -> Vec<Example> {
        vec![
            Example {
                table: "song",
                record_id: 3,
                old_value: None,
            },
            Example {
                table: "playlist_song",
                record_id: 12,
                old_value: Some("4"),
            },
        ]
    }

    #[test]
    fn json_render_is_valid_json() {
        let out = render(&rows(), OutputFormat::Json).expect("json render should work");
        let parsed: serde_json::Value = serde_json::from_str(&out).expect("json should parse");
        assert_eq!(parsed[1]["table"], "playlist_song");
        assert!(parsed[0]["old_value"].is_null());
    }

    #[test]
    fn table_render_has_sorted_headers_and_divider() {
        let out = render(&rows(), OutputFormat::Table).expect("table render should work");
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("old_value"));
        assert!(lines[1].chars().all(|c| c == '-'));
        assert!(lines[2].contains("null"));
    }

    #[test]
    fn csv_render_of_rows() {
        let out = render(&rows(), OutputFormat::Csv).expect("csv render should work");
        assert_eq!(
            out,
            "old_value,record_id,table\nnull,3,song\n4,12,playlist_song\n"
        );
    }

    #[test]
    fn empty_table_says_so() {
        let empty: Vec<Example> = Vec::new();
        assert_eq!(render(&empty, OutputFormat::Table).unwrap(), "(no rows)");
    }
}
