use modelson_convert::{Converter, CsvOptions, Decoded};
use modelson_core::{Instance, Member};

use super::{load_schema, make_converter, read_file};
use crate::settings::Settings;
use crate::{OutputFormat, Target};

pub(crate) fn cmd_decode(
    target: &Target,
    csv: bool,
    settings: &Settings,
    output: OutputFormat,
) -> Result<(), String> {
    let schema = load_schema(&target.schema)?;
    let converter = make_converter(&schema, settings, target.accept_unknown)?;
    let class = schema.class_id(&target.class).map_err(|e| e.to_string())?;
    let text = read_file(&target.file)?;

    let decoded = if csv {
        let options = CsvOptions {
            accept_unknown: converter.config().accept_unknown,
            ..CsvOptions::default()
        };
        Decoded::Many(
            converter
                .decode_csv(&text, class, &options)
                .map_err(|e| e.to_string())?,
        )
    } else {
        converter.decode_str(&text, class).map_err(|e| e.to_string())?
    };

    match output {
        OutputFormat::Json => print_json(&converter, &decoded, false),
        OutputFormat::Text => {
            match &decoded {
                Decoded::Null => println!("null"),
                Decoded::One(inst) => print_summary(inst, 0),
                Decoded::Many(items) => {
                    println!("{} objects", items.len());
                    for inst in items {
                        print_summary(inst, 1);
                    }
                }
            }
            Ok(())
        }
    }
}

pub(crate) fn cmd_normalize(target: &Target, settings: &Settings) -> Result<(), String> {
    let schema = load_schema(&target.schema)?;
    let converter = make_converter(&schema, settings, target.accept_unknown)?;
    let class = schema.class_id(&target.class).map_err(|e| e.to_string())?;
    let text = read_file(&target.file)?;
    let decoded = converter.decode_str(&text, class).map_err(|e| e.to_string())?;
    print_json(&converter, &decoded, true)
}

pub(crate) fn cmd_csv(
    target: &Target,
    has_headers: bool,
    separator: &str,
    settings: &Settings,
) -> Result<(), String> {
    let schema = load_schema(&target.schema)?;
    let converter = make_converter(&schema, settings, target.accept_unknown)?;
    let class = schema.class_id(&target.class).map_err(|e| e.to_string())?;
    let text = read_file(&target.file)?;

    let options = CsvOptions {
        line_separator: unescape(separator),
        has_headers,
        accept_unknown: converter.config().accept_unknown,
    };
    let rows = converter
        .decode_csv(&text, class, &options)
        .map_err(|e| e.to_string())?;
    print_json(&converter, &Decoded::Many(rows), true)
}

fn print_json(converter: &Converter, decoded: &Decoded, pretty: bool) -> Result<(), String> {
    let value = converter.encode_decoded(decoded).map_err(|e| e.to_string())?;
    let rendered = if pretty {
        serde_json::to_string_pretty(&value)
    } else {
        serde_json::to_string(&value)
    };
    println!("{}", rendered.map_err(|e| format!("serialization error: {}", e))?);
    Ok(())
}

fn print_summary(inst: &Instance, depth: usize) {
    let indent = "  ".repeat(depth);
    let class = inst.class();
    println!("{}{}", indent, class.name());
    for &member in class.members() {
        let rendered = match member {
            Member::Field(i) => match inst.field_value(i) {
                Ok(value) => value.describe(),
                Err(e) => format!("<{}>", e),
            },
            Member::Child(i) => inst
                .child_value(i)
                .map(|v| v.describe())
                .unwrap_or_else(|| "null".to_string()),
        };
        println!("{}  {}: {}", indent, class.member_key(member), rendered);
    }
    for (key, value) in inst.extras() {
        println!("{}  + {}: {}", indent, key, value.describe());
    }
}

/// `\n`, `\r` and `\t` escapes as typed on a shell command line.
fn unescape(separator: &str) -> String {
    separator
        .replace("\\r", "\r")
        .replace("\\n", "\n")
        .replace("\\t", "\t")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unescape_separators() {
        assert_eq!(unescape("\\r\\n"), "\r\n");
        assert_eq!(unescape(";"), ";");
        assert_eq!(unescape("\n"), "\n");
    }
}
