//! The `che.eclipse.org/devfile-source` annotation.
//!
//! Its value is a YAML document; the loader owns the `factory.params` entry
//! and keeps whatever else other tools put there.

use serde_yaml_ng::{Mapping, Value};
use tracing::debug;

pub const DEVWORKSPACE_DEVFILE_SOURCE: &str = "che.eclipse.org/devfile-source";

const FACTORY_KEY: &str = "factory";
const PARAMS_KEY: &str = "params";

/// Stamp `factory.params` into an existing annotation value.
///
/// Absent or malformed content is replaced by an empty mapping.
pub fn merge_factory_params(existing: Option<&str>, factory_id: &str) -> String {
    let mut source = match existing.map(serde_yaml_ng::from_str::<Value>) {
        Some(Ok(Value::Mapping(mapping))) => mapping,
        Some(Ok(_)) | Some(Err(_)) => {
            debug!("Replacing malformed devfile source annotation");
            Mapping::new()
        }
        None => Mapping::new(),
    };

    let mut factory = match source.remove(FACTORY_KEY) {
        Some(Value::Mapping(mapping)) => mapping,
        _ => Mapping::new(),
    };
    factory.insert(
        Value::String(PARAMS_KEY.to_string()),
        Value::String(factory_id.to_string()),
    );
    source.insert(
        Value::String(FACTORY_KEY.to_string()),
        Value::Mapping(factory),
    );

    serde_yaml_ng::to_string(&source).unwrap_or_else(|_| {
        // Only strings go in, so the fallback never differs in content.
        format!("{FACTORY_KEY}:\n  {PARAMS_KEY}: '{}'\n", factory_id.replace('\'', "''"))
    })
}

/// Read `factory.params` back. Anything unexpected yields `None`.
pub fn factory_params(source: &str) -> Option<String> {
    let value: Value = serde_yaml_ng::from_str(source).ok()?;
    value
        .get(FACTORY_KEY)?
        .get(PARAMS_KEY)?
        .as_str()
        .map(str::to_string)
}
