//! CSV input: every row becomes a mapping of column name to text and goes
//! through the regular decode path.

use modelson_core::{ClassId, Instance, Member};
use serde_json::{Map, Value as Json};

use crate::config::{CsvOptions, DecodeOptions};
use crate::converter::Converter;
use crate::error::{Error, Result};

impl Converter {
    /// Decode CSV text into one instance per row.
    ///
    /// Empty lines are skipped. Rows shorter than the header leave the
    /// missing columns null; longer rows are an error.
    pub fn decode_csv(&self, text: &str, target: ClassId, options: &CsvOptions) -> Result<Vec<Instance>> {
        let lines: Vec<&str> = text
            .split(options.line_separator.as_str())
            .map(|line| line.trim_end_matches('\r'))
            .filter(|line| !line.trim().is_empty())
            .collect();
        let joined = lines.join("\n");

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(joined.as_bytes());
        let mut records = reader.records();

        let headers: Vec<String> = if options.has_headers {
            match records.next() {
                Some(row) => row?.iter().map(|h| h.trim().to_string()).collect(),
                None => return Ok(Vec::new()),
            }
        } else {
            let class = self.class(target)?;
            class
                .members()
                .iter()
                .filter_map(|&member| match member {
                    Member::Field(i) if !class.fields()[i].kind().is_computed() => {
                        Some(class.member_key(member).to_string())
                    }
                    _ => None,
                })
                .collect()
        };

        let decode_options = DecodeOptions {
            accept_unknown: options.accept_unknown,
        };
        let mut instances = Vec::new();
        for row in records {
            let row = row?;
            if row.len() > headers.len() {
                return Err(Error::CsvRow {
                    line: row.position().map_or(0, |p| p.line()),
                    message: format!(
                        "found {} values but only {} columns",
                        row.len(),
                        headers.len()
                    ),
                });
            }
            let mut map = Map::new();
            for (i, header) in headers.iter().enumerate() {
                let cell = row.get(i).map_or(Json::Null, |v| Json::String(v.to_string()));
                map.insert(header.clone(), cell);
            }
            instances.push(self.decode_object(&map, target, decode_options, 1)?);
        }
        Ok(instances)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use modelson_core::{ClassBuilder, Field, SchemaRegistry, Value};

    use super::*;
    use crate::config::ConverterConfig;

    fn make_people() -> (Converter, ClassId) {
        let mut registry = SchemaRegistry::new();
        let person = registry
            .register(
                ClassBuilder::new("Person")
                    .field("name", Field::string())
                    .field("age", Field::integer().accepts_string(true)),
            )
            .unwrap();
        (Converter::new(Arc::new(registry), ConverterConfig::default()), person)
    }

    #[test]
    fn test_header_row() {
        let (conv, person) = make_people();
        let rows = conv
            .decode_csv("name,age\nali,25\n\nsara,31\n", person, &CsvOptions::default())
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].get("name").unwrap(), Value::from("sara"));
        assert_eq!(rows[1].get("age").unwrap(), Value::Int(31));
    }

    #[test]
    fn test_declared_names_without_header() {
        let (conv, person) = make_people();
        let options = CsvOptions {
            line_separator: ";".to_string(),
            has_headers: false,
            ..CsvOptions::default()
        };
        let rows = conv.decode_csv("ali,25;sara", person, &options).unwrap();
        assert_eq!(rows[0].get("age").unwrap(), Value::Int(25));
        assert_eq!(rows[1].get("age").unwrap(), Value::Null);
    }

    #[test]
    fn test_long_row_is_rejected() {
        let (conv, person) = make_people();
        let err = conv
            .decode_csv("name,age\nali,25,extra", person, &CsvOptions::default())
            .unwrap_err();
        assert!(matches!(err, Error::CsvRow { line: 2, .. }));
    }

    #[test]
    fn test_unknown_column() {
        let (conv, person) = make_people();
        let text = "name,nickname\nali,al";
        assert!(conv.decode_csv(text, person, &CsvOptions::default()).is_err());
        let options = CsvOptions {
            accept_unknown: true,
            ..CsvOptions::default()
        };
        let rows = conv.decode_csv(text, person, &options).unwrap();
        assert_eq!(rows[0].extra("nickname"), Some(&Value::from("al")));
    }
}
