use std::path::Path;

use serde_json::json;

use super::load_schema;
use crate::OutputFormat;

pub(crate) fn cmd_describe(schema_path: &Path, output: OutputFormat) -> Result<(), String> {
    let schema = load_schema(schema_path)?;
    let registry = &schema.registry;

    match output {
        OutputFormat::Json => {
            let classes: Vec<_> = registry
                .classes()
                .map(|class| {
                    let members: serde_json::Map<_, _> = class
                        .describe()
                        .into_iter()
                        .map(|(key, kind)| (key, json!(kind)))
                        .collect();
                    json!({
                        "name": class.name(),
                        "extends": class.parent().and_then(|p| registry.get(p)).map(|p| p.name()),
                        "members": members,
                    })
                })
                .collect();
            let adapters: Vec<_> = schema
                .adapters
                .iter()
                .map(|adapter| {
                    let subtypes: serde_json::Map<_, _> = adapter
                        .subtypes()
                        .iter()
                        .map(|(value, id)| (value.clone(), json!(class_name(&schema, *id))))
                        .collect();
                    json!({
                        "base": class_name(&schema, adapter.base()),
                        "type_key": adapter.type_key(),
                        "subtypes": subtypes,
                        "accept_subtypes": adapter.accepts_subtypes(),
                    })
                })
                .collect();
            let doc = json!({ "classes": classes, "adapters": adapters });
            let pretty = serde_json::to_string_pretty(&doc)
                .map_err(|e| format!("serialization error: {}", e))?;
            println!("{}", pretty);
        }
        OutputFormat::Text => {
            for class in registry.classes() {
                match class.parent().and_then(|p| registry.get(p)) {
                    Some(parent) => println!("{} extends {}", class.name(), parent.name()),
                    None => println!("{}", class.name()),
                }
                for (key, kind) in class.describe() {
                    println!("  {}: {}", key, kind);
                }
            }
            for adapter in &schema.adapters {
                println!(
                    "adapter {} on '{}'",
                    class_name(&schema, adapter.base()),
                    adapter.type_key()
                );
                for (value, id) in adapter.subtypes() {
                    println!("  {} -> {}", value, class_name(&schema, *id));
                }
            }
        }
    }
    Ok(())
}

fn class_name(schema: &modelson_interchange::LoadedSchema, id: modelson_core::ClassId) -> String {
    schema
        .registry
        .get(id)
        .map(|c| c.name().to_string())
        .unwrap_or_else(|| id.to_string())
}
