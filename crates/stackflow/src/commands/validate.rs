use anyhow::{Context, bail};
use colored::Colorize;
use serde_json::Value;
use stackflow_core::{Descriptor, StackConfig, Template, load_environment};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

pub async fn handle(
    template: &Path,
    env: Option<&Path>,
    parameters: &[String],
) -> anyhow::Result<()> {
    println!("{}", "Validating template...".blue());

    let parsed = Template::load(template)?;

    let mut values = match env {
        Some(path) => load_environment(path)?,
        None => HashMap::new(),
    };
    for raw in parameters {
        let (key, value) = parse_parameter(raw)?;
        values.insert(key, value);
    }

    let declared = parsed.parameter_names();
    for key in values.keys() {
        if !declared.contains(key) {
            warn!("Parameter {} is not declared by the template", key);
        }
    }
    let missing = missing_parameters(parsed.body(), &values);
    if !missing.is_empty() {
        bail!("no value for parameter(s): {}", missing.join(", "));
    }

    let name = template
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("stack");
    let config = StackConfig {
        env_values: values,
        ..StackConfig::from_path(name, template)
    };
    config.validate()?;
    let request = config.build_request()?;
    debug!(stack = %request.name, timeout_mins = request.timeout_mins, "Built stack request");

    println!("{}", "✓ Template is valid".green().bold());
    println!();
    println!("Version: {}", parsed.version().unwrap_or_default().cyan());
    let resources = parsed.resources();
    println!("Resources: {}", resources.len());
    for resource in &resources {
        println!("  - {} ({})", resource.name.cyan(), resource.resource_type);
    }
    if !request.parameters.is_empty() {
        println!("Parameters: {}", request.parameters.len());
        let mut keys: Vec<_> = request.parameters.keys().collect();
        keys.sort();
        for key in keys {
            println!("  - {} = {}", key.cyan(), request.parameters[key]);
        }
    }
    let outputs = parsed.output_names();
    if !outputs.is_empty() {
        println!("Outputs: {}", outputs.join(", "));
    }

    Ok(())
}

/// Splits `key=value`. The value is read as JSON when it parses as JSON
/// (numbers, booleans, lists), otherwise kept as a string.
fn parse_parameter(raw: &str) -> anyhow::Result<(String, Value)> {
    let (key, value) = raw
        .split_once('=')
        .with_context(|| format!("parameter must be KEY=VALUE: {}", raw))?;
    let key = key.trim();
    if key.is_empty() {
        bail!("parameter name is empty: {}", raw);
    }
    let value =
        serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

/// Declared parameters that have neither a default nor a supplied value.
fn missing_parameters(body: &Value, values: &HashMap<String, Value>) -> Vec<String> {
    let Some(declared) = body.get("parameters").and_then(Value::as_object) else {
        return Vec::new();
    };
    declared
        .iter()
        .filter(|(name, def)| def.get("default").is_none() && !values.contains_key(*name))
        .map(|(name, _)| name.clone())
        .collect()
}
