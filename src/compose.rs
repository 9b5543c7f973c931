//! Compose renderer: resolves the active profile's compose files into a
//! single YAML document suitable for `stack deploy -c -`.

use std::process::Command;

use serde_yaml::Value;

use crate::backend::DOCKER_BIN;
use crate::errors::{Result, SugarError};

/// Render the fully resolved compose document by shelling out to
/// `docker compose [--project-name P] [--env-file E] [-f F]... config`, then
/// post-process it for stack deploy: the top-level `name` key is stripped
/// (swarm stacks reject it) and string-encoded port numbers are coerced to
/// integers (stack deploy is strict about the field type where compose is
/// lenient).
pub fn render(
    compose_files: &[String],
    project_name: Option<&str>,
    env_file: Option<&str>,
) -> Result<String> {
    if compose_files.is_empty() {
        return Err(SugarError::invalid_parameter(
            "Compose file not specified and not found in profile configuration",
        ));
    }

    let mut args: Vec<String> = vec!["compose".to_string()];
    if let Some(project) = project_name {
        args.push("--project-name".to_string());
        args.push(project.to_string());
    }
    if let Some(env) = env_file {
        args.push("--env-file".to_string());
        args.push(env.to_string());
    }
    for file in compose_files {
        args.push("-f".to_string());
        args.push(file.clone());
    }
    args.push("config".to_string());

    let output = Command::new(DOCKER_BIN).args(&args).output().map_err(|e| {
        SugarError::command_error(format!("Failed to run {} compose: {}", DOCKER_BIN, e))
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        return Err(SugarError::command_error(format!(
            "docker compose config failed: {}",
            stderr
        )));
    }

    let rendered = String::from_utf8_lossy(&output.stdout).to_string();
    if rendered.trim().is_empty() {
        return Err(SugarError::invalid_configuration(
            "docker compose config produced an empty document",
        ));
    }

    postprocess(&rendered)
}

/// Parse, rewrite, and re-serialize a rendered compose document. Key order is
/// preserved: serde_yaml mappings are insertion-ordered.
pub fn postprocess(rendered: &str) -> Result<String> {
    let mut doc: Value = serde_yaml::from_str(rendered).map_err(|e| {
        SugarError::invalid_configuration(format!("Failed to parse rendered compose file: {}", e))
    })?;

    if let Value::Mapping(map) = &mut doc {
        map.remove("name");
    }
    coerce_port_fields(&mut doc);

    serde_yaml::to_string(&doc).map_err(|e| {
        SugarError::invalid_configuration(format!("Failed to serialize compose file: {}", e))
    })
}

/// Rewrite `published`/`target` port fields from numeric-looking strings to
/// integers across all services. Non-numeric strings are left untouched, as
/// is the short `"8080:80"` port syntax.
fn coerce_port_fields(doc: &mut Value) {
    let Some(services) = doc.get_mut("services").and_then(Value::as_mapping_mut) else {
        return;
    };
    for (_, service) in services.iter_mut() {
        let Some(ports) = service.get_mut("ports").and_then(Value::as_sequence_mut) else {
            continue;
        };
        for port in ports.iter_mut() {
            let Some(entry) = port.as_mapping_mut() else { continue };
            for field in ["published", "target"] {
                let coerced = match entry.get(field) {
                    Some(Value::String(text)) => text.parse::<u64>().ok(),
                    _ => None,
                };
                if let Some(n) = coerced {
                    entry.insert(Value::String(field.to_string()), Value::Number(n.into()));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn postprocess_strips_top_level_name() {
        let doc = "name: demo\nservices:\n  web:\n    image: nginx\n";
        let out = postprocess(doc).unwrap();
        assert!(!out.contains("name: demo"));
        assert!(out.contains("image: nginx"));
    }

    #[test]
    fn postprocess_coerces_numeric_port_strings() {
        let doc = r#"
services:
  web:
    image: nginx
    ports:
      - published: "8080"
        target: "80"
"#;
        let out = postprocess(doc).unwrap();
        assert!(out.contains("published: 8080"));
        assert!(out.contains("target: 80"));
        assert!(!out.contains("'8080'"));
    }

    #[test]
    fn postprocess_leaves_non_numeric_port_strings() {
        let doc = r#"
services:
  web:
    ports:
      - published: "http"
        target: "80"
"#;
        let out = postprocess(doc).unwrap();
        assert!(out.contains("published: http"));
        assert!(out.contains("target: 80"));
    }

    #[test]
    fn postprocess_ignores_short_port_syntax() {
        let doc = r#"
services:
  web:
    ports:
      - "8080:80"
"#;
        let out = postprocess(doc).unwrap();
        assert!(out.contains("8080:80"));
    }

    #[test]
    fn postprocess_preserves_key_order() {
        let doc = "services:\n  zulu:\n    image: a\n  alpha:\n    image: b\n";
        let out = postprocess(doc).unwrap();
        let zulu = out.find("zulu").unwrap();
        let alpha = out.find("alpha").unwrap();
        assert!(zulu < alpha, "service order must not be re-sorted");
    }

    #[test]
    fn postprocess_rejects_invalid_yaml() {
        let err = postprocess("services: [unclosed").unwrap_err();
        assert!(matches!(err, SugarError::InvalidConfiguration(_)));
    }

    #[test]
    fn render_requires_a_compose_file() {
        let err = render(&[], None, None).unwrap_err();
        assert!(matches!(err, SugarError::InvalidParameter(_)));
    }
}
