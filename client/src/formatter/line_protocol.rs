//! InfluxDB line protocol rendering of [`Serie`] rows.
//!
//! `measurement,tag1=v1,tag2=v2 field1=1.5,field2=3i,field3="x" <timestamp>`
//!
//! The `time` column, when present, becomes the timestamp. Every other
//! non-null column becomes a field.
//!
//! Names, tag keys and tag values must be non-empty and may not contain line
//! breaks; the protocol has no escape for them.

use models::Serie;
use serde_json::Value;

use super::FormatError;

const TIME_COLUMN: &str = "time";

pub fn encode(series: &[Serie]) -> Result<String, FormatError> {
    let mut lines = Vec::new();
    for serie in series {
        let time_index = serie.columns.iter().position(|c| c == TIME_COLUMN);
        let prefix = series_key(serie)?;

        for point in &serie.points {
            if point.len() != serie.columns.len() {
                return Err(unencodable(
                    serie,
                    format!("point has {} values for {} columns", point.len(), serie.columns.len()),
                ));
            }

            let fields: Vec<String> = serie
                .columns
                .iter()
                .zip(point)
                .enumerate()
                .filter(|(i, (_, v))| Some(*i) != time_index && !v.is_null())
                .map(|(_, (column, value))| {
                    check_identifier(serie, "field key", column)?;
                    field_value(value)
                        .map(|v| format!("{}={}", escape_key(column), v))
                        .ok_or_else(|| {
                            unencodable(serie, format!("column '{column}' holds a nested value"))
                        })
                })
                .collect::<Result<_, _>>()?;

            if fields.is_empty() {
                return Err(unencodable(serie, "point has no field values".to_string()));
            }

            let line = match time_index.map(|i| &point[i]) {
                None | Some(Value::Null) => format!("{} {}", prefix, fields.join(",")),
                Some(Value::Number(n)) if n.is_i64() || n.is_u64() => {
                    format!("{} {} {}", prefix, fields.join(","), n)
                }
                Some(other) => {
                    return Err(unencodable(serie, format!("timestamp {other} is not an integer")))
                }
            };
            lines.push(line);
        }
    }
    Ok(lines.join("\n"))
}

fn series_key(serie: &Serie) -> Result<String, FormatError> {
    check_identifier(serie, "measurement", &serie.name)?;
    let mut key = escape_measurement(&serie.name);
    for (k, v) in &serie.tags {
        check_identifier(serie, "tag key", k)?;
        check_identifier(serie, "tag value", v)?;
        key.push_str(&format!(",{}={}", escape_key(k), escape_key(v)));
    }
    Ok(key)
}

fn check_identifier(serie: &Serie, kind: &str, value: &str) -> Result<(), FormatError> {
    if value.is_empty() {
        return Err(unencodable(serie, format!("empty {kind}")));
    }
    if value.contains(['\n', '\r']) {
        return Err(unencodable(serie, format!("{kind} {value:?} contains a line break")));
    }
    Ok(())
}

fn field_value(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) if n.is_i64() || n.is_u64() => Some(format!("{n}i")),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::String(s) => Some(format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn escape_measurement(s: &str) -> String {
    s.replace(' ', "\\ ").replace(',', "\\,")
}

fn escape_key(s: &str) -> String {
    s.replace(' ', "\\ ").replace(',', "\\,").replace('=', "\\=")
}

fn unencodable(serie: &Serie, reason: String) -> FormatError {
    FormatError::Unencodable {
        series: serie.name.clone(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn renders_tags_fields_and_timestamp() {
        let serie = Serie::new("cpu load", ["time", "value", "count", "ok", "note"])
            .with_tag("host", "server 1")
            .with_tag("region", "us,west")
            .with_point(vec![json!(1_434_055_562), json!(0.64), json!(3), json!(true), json!("a \"b\"")]);
        assert_eq!(
            encode(&[serie]).unwrap(),
            r#"cpu\ load,host=server\ 1,region=us\,west value=0.64,count=3i,ok=true,note="a \"b\"" 1434055562"#
        );
    }

    #[test]
    fn omits_missing_timestamp_and_null_fields() {
        let serie = Serie::new("mem", ["used", "free"]).with_point(vec![json!(512), Value::Null]);
        assert_eq!(encode(&[serie]).unwrap(), "mem used=512i");
    }

    #[test]
    fn one_line_per_point() {
        let serie = Serie::new("m", ["time", "v"])
            .with_point(vec![json!(1), json!(1.5)])
            .with_point(vec![json!(2), json!(2.5)]);
        assert_eq!(encode(&[serie]).unwrap(), "m v=1.5 1\nm v=2.5 2");
    }

    #[test]
    fn rejects_ragged_points() {
        let serie = Serie::new("m", ["time", "v"]).with_point(vec![json!(1)]);
        assert!(matches!(encode(&[serie]), Err(FormatError::Unencodable { series, .. }) if series == "m"));
    }

    #[test]
    fn rejects_points_without_fields() {
        let serie = Serie::new("m", ["time"]).with_point(vec![json!(1)]);
        assert!(matches!(encode(&[serie]), Err(FormatError::Unencodable { .. })));
    }

    #[test]
    fn rejects_non_integer_timestamp() {
        let serie = Serie::new("m", ["time", "v"]).with_point(vec![json!("yesterday"), json!(1)]);
        assert!(matches!(encode(&[serie]), Err(FormatError::Unencodable { .. })));
    }

    #[test]
    fn rejects_line_breaks_in_tags_and_names() {
        let injected = Serie::new("cpu", ["time", "value"])
            .with_tag("host", "a\nevil value=666i 1")
            .with_point(vec![json!(10), json!(1)]);
        assert!(matches!(encode(&[injected]), Err(FormatError::Unencodable { .. })));

        let tag_key = Serie::new("cpu", ["value"])
            .with_tag("ho\rst", "a")
            .with_point(vec![json!(1)]);
        assert!(matches!(encode(&[tag_key]), Err(FormatError::Unencodable { .. })));

        let measurement = Serie::new("cpu\nmem", ["value"]).with_point(vec![json!(1)]);
        assert!(matches!(encode(&[measurement]), Err(FormatError::Unencodable { .. })));

        let field = Serie::new("cpu", ["val\nue"]).with_point(vec![json!(1)]);
        assert!(matches!(encode(&[field]), Err(FormatError::Unencodable { .. })));
    }

    #[test]
    fn rejects_empty_names_and_tag_values() {
        let empty_tag = Serie::new("cpu", ["time", "value"])
            .with_tag("host", "")
            .with_point(vec![json!(10), json!(1)]);
        assert!(matches!(
            encode(&[empty_tag]),
            Err(FormatError::Unencodable { reason, .. }) if reason == "empty tag value"
        ));

        let empty_name = Serie::new("", ["value"]).with_point(vec![json!(1)]);
        assert!(matches!(encode(&[empty_name]), Err(FormatError::Unencodable { .. })));
    }

    #[test]
    fn string_fields_may_hold_line_breaks() {
        let serie = Serie::new("log", ["msg"]).with_point(vec![json!("a\nb")]);
        assert_eq!(encode(&[serie]).unwrap(), "log msg=\"a\nb\"");
    }
}
