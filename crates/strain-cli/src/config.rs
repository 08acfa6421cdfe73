//! # Config Subcommands
//!
//! Read values out of a strain for later CI steps.
//!
//! - `config-env` prints `KEY=value` for required keys (all must exist) and
//!   for whichever optional keys exist.
//! - `config-value` prints one key's bare value and fails if it is absent
//!   or empty.
//!
//! Strings are printed as-is; other values are printed as JSON.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;
use serde_json::Value;

use strain_build::EnvEmitter;
use strain_core::StrainDocument;

/// Arguments for `strain config-env`.
#[derive(Args, Debug)]
pub struct ConfigEnvArgs {
    /// Strain configuration file.
    #[arg(long, value_name = "PATH", default_value = "config.yml")]
    pub config_file: PathBuf,

    /// Keys that must be present.
    #[arg(long, num_args = 1.., default_values = ["TUTOR_VERSION", "TUTOR_APP_NAME"])]
    pub required_keys: Vec<String>,

    /// Keys exported only when present.
    #[arg(long, num_args = 1.., default_values = ["DOCKER_REGISTRY"])]
    pub optional_keys: Vec<String>,

    /// Also append the assignments to this file (e.g. "$GITHUB_ENV").
    #[arg(long, value_name = "FILE")]
    pub env_file: Option<PathBuf>,
}

/// Arguments for `strain config-value`.
#[derive(Args, Debug)]
pub struct ConfigValueArgs {
    /// Top-level key to print.
    pub key: String,

    /// Strain configuration file.
    #[arg(long, value_name = "PATH", default_value = "config.yml")]
    pub config_file: PathBuf,
}

/// Collect `(key, value)` pairs: every required key, then the optional
/// keys that exist, each in argument order.
///
/// # Errors
///
/// Fails on the first required key the document does not define.
pub fn env_assignments(
    doc: &StrainDocument,
    required: &[String],
    optional: &[String],
) -> Result<Vec<(String, String)>> {
    let mut pairs = Vec::with_capacity(required.len() + optional.len());
    for key in required {
        match doc.get(key) {
            Some(value) => pairs.push((key.clone(), env_value(value))),
            None => bail!("key {key} not found in {}", doc.origin()),
        }
    }
    for key in optional {
        if let Some(value) = doc.get(key) {
            pairs.push((key.clone(), env_value(value)));
        }
    }
    Ok(pairs)
}

/// The printable value of `key`.
///
/// # Errors
///
/// Fails if the key is absent, null, false, zero, or an empty string, list,
/// or mapping.
pub fn config_value(doc: &StrainDocument, key: &str) -> Result<String> {
    match doc.get(key) {
        Some(value) if !is_blank(value) => Ok(env_value(value)),
        _ => bail!("{key} not found in {}", doc.origin()),
    }
}

/// Execute the config-env subcommand. Returns exit code 0.
pub fn run_config_env(args: &ConfigEnvArgs) -> Result<u8> {
    let doc = StrainDocument::load(&args.config_file)?;
    let pairs = env_assignments(&doc, &args.required_keys, &args.optional_keys)?;

    let mut stdout = EnvEmitter::new(std::io::stdout().lock(), "stdout");
    for (key, value) in &pairs {
        stdout.emit(key, value)?;
    }
    if let Some(path) = &args.env_file {
        let mut file = EnvEmitter::append_to(path)?;
        for (key, value) in &pairs {
            file.emit(key, value)?;
        }
    }
    tracing::info!(path = %args.config_file.display(), count = pairs.len(), "exported strain keys");
    Ok(0)
}

/// Execute the config-value subcommand. Returns exit code 0.
pub fn run_config_value(args: &ConfigValueArgs) -> Result<u8> {
    let doc = StrainDocument::load(&args.config_file)?;
    println!("{}", config_value(&doc, &args.key)?);
    Ok(0)
}

fn env_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STRAIN: &str = r#"
TUTOR_VERSION: v18.1.0
TUTOR_APP_NAME: demo
DOCKER_REGISTRY: docker.io/
TUTOR_PLUGINS: [mfe, forum]
ENABLE_HTTPS: false
EMPTY_SETTING: ""
"#;

    fn doc() -> StrainDocument {
        StrainDocument::parse(STRAIN, "config.yml").unwrap()
    }

    fn keys(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn required_then_present_optional_keys() {
        let pairs = env_assignments(
            &doc(),
            &keys(&["TUTOR_VERSION", "TUTOR_APP_NAME"]),
            &keys(&["MISSING", "DOCKER_REGISTRY", "TUTOR_PLUGINS"]),
        )
        .unwrap();
        assert_eq!(
            pairs,
            [
                ("TUTOR_VERSION".to_string(), "v18.1.0".to_string()),
                ("TUTOR_APP_NAME".to_string(), "demo".to_string()),
                ("DOCKER_REGISTRY".to_string(), "docker.io/".to_string()),
                ("TUTOR_PLUGINS".to_string(), r#"["mfe","forum"]"#.to_string()),
            ]
        );
    }

    #[test]
    fn missing_required_key_fails() {
        let err = env_assignments(&doc(), &keys(&["TUTOR_VERSION", "LMS_HOST"]), &[]).unwrap_err();
        assert_eq!(err.to_string(), "key LMS_HOST not found in config.yml");
    }

    #[test]
    fn single_value() {
        assert_eq!(config_value(&doc(), "TUTOR_APP_NAME").unwrap(), "demo");
    }

    #[test]
    fn absent_or_empty_value_fails() {
        for key in ["LMS_HOST", "EMPTY_SETTING", "ENABLE_HTTPS"] {
            let err = config_value(&doc(), key).unwrap_err();
            assert!(err.to_string().starts_with(key), "got: {err}");
        }
    }

    #[test]
    fn runs_against_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yml");
        std::fs::write(&path, STRAIN).unwrap();
        let env_file = dir.path().join("github_env");

        let args = ConfigEnvArgs {
            config_file: path.clone(),
            required_keys: keys(&["TUTOR_VERSION"]),
            optional_keys: keys(&["DOCKER_REGISTRY"]),
            env_file: Some(env_file.clone()),
        };
        assert_eq!(run_config_env(&args).unwrap(), 0);
        assert_eq!(
            std::fs::read_to_string(&env_file).unwrap(),
            "TUTOR_VERSION=v18.1.0\nDOCKER_REGISTRY=docker.io/\n"
        );

        let args = ConfigValueArgs {
            key: "LMS_HOST".to_string(),
            config_file: path,
        };
        assert!(run_config_value(&args).is_err());
    }
}
