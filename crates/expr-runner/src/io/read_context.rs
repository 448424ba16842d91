use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum ContextFileError {
    #[error("read context file failed `{path}`: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("context file parse failed `{path}`: {reason}")]
    Parse { path: String, reason: String },
    #[error("context file `{path}` must hold an object of bindings, found {found}")]
    NotAnObject { path: String, found: &'static str },
}

/// Reads a JSON or YAML object of bindings. The format follows the file
/// extension; other extensions try YAML first, then JSON.
pub fn load_context_file(path: &Path) -> Result<Map<String, Value>, ContextFileError> {
    let text = fs::read_to_string(path).map_err(|source| ContextFileError::ReadFile {
        path: path.display().to_string(),
        source,
    })?;
    let parse_error = |reason: String| ContextFileError::Parse {
        path: path.display().to_string(),
        reason,
    };
    let document: Value = match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => serde_json::from_str(&text).map_err(|error| parse_error(error.to_string()))?,
        Some("yaml") | Some("yml") => serde_yaml::from_str(&text).map_err(|error| parse_error(error.to_string()))?,
        _ => serde_yaml::from_str(&text)
            .or_else(|_| serde_json::from_str(&text))
            .map_err(|error| parse_error(error.to_string()))?,
    };

    match document {
        Value::Object(bindings) => {
            tracing::debug!(path = %path.display(), bindings = bindings.len(), "loaded context file");
            Ok(bindings)
        }
        Value::Null => Ok(Map::new()),
        other => Err(ContextFileError::NotAnObject {
            path: path.display().to_string(),
            found: json_kind(&other),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
#[path = "read_context_test.rs"]
mod tests;
