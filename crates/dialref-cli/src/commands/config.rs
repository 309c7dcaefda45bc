//! Config command - inspect and edit the JSON configuration.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use console::style;
use serde_json::Value;

use dialref_core::models::config::DialrefConfig;

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Print the effective configuration
    Show,

    /// Write a configuration file with the defaults
    Init(InitArgs),

    /// Print one value
    Get {
        /// Dotted key (e.g., "geocoder.timeout_secs")
        key: String,
    },

    /// Change one value and save
    Set {
        /// Dotted key (e.g., "extraction.diagnosis_vocabulary")
        key: String,
        /// New value; JSON unless the setting is text, which is taken as is
        value: String,
    },

    /// Print where the configuration file lives
    Path,
}

#[derive(Args)]
struct InitArgs {
    /// Where to write the file instead of the configured path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Replace an existing file
    #[arg(long)]
    force: bool,
}

pub fn run(args: ConfigArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let path = config_path
        .map(PathBuf::from)
        .unwrap_or_else(default_config_path);

    match args.command {
        ConfigCommand::Show => show(&path),
        ConfigCommand::Init(init) => init_file(init.output.unwrap_or(path), init.force),
        ConfigCommand::Get { key } => {
            let json = serde_json::to_value(load(&path)?)?;
            println!("{}", serde_json::to_string_pretty(lookup(&json, &key)?)?);
            Ok(())
        }
        ConfigCommand::Set { key, value } => set(&path, &key, &value),
        ConfigCommand::Path => show_path(&path),
    }
}

fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("dialref")
        .join("config.json")
}

fn load(path: &Path) -> anyhow::Result<DialrefConfig> {
    if path.exists() {
        Ok(DialrefConfig::from_file(path)?)
    } else {
        Ok(DialrefConfig::default())
    }
}

fn show(path: &Path) -> anyhow::Result<()> {
    if !path.exists() {
        println!(
            "{} No config file at {}, showing defaults.",
            style("ℹ").blue(),
            path.display()
        );
    }
    let config = load(path)?;
    if let Err(e) = config.validate() {
        println!("{} {}", style("⚠").yellow(), e);
    }
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

fn init_file(path: PathBuf, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    DialrefConfig::default().save(&path)?;

    println!(
        "{} Created configuration file at {}",
        style("✓").green(),
        path.display()
    );
    Ok(())
}

fn set(path: &Path, key: &str, raw: &str) -> anyhow::Result<()> {
    let mut json = serde_json::to_value(load(path)?)?;
    let value = parse_value(lookup(&json, key).ok(), raw);
    assign(&mut json, key, value.clone())?;

    let config: DialrefConfig = serde_json::from_value(json)?;
    config.validate()?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    config.save(path)?;

    println!(
        "{} Set {} = {}",
        style("✓").green(),
        key,
        serde_json::to_string(&value)?
    );
    Ok(())
}

fn show_path(path: &Path) -> anyhow::Result<()> {
    println!("Configuration file: {}", path.display());

    if path.exists() {
        println!("Status: {}", style("exists").green());
    } else {
        println!("Status: {}", style("not created").yellow());
        println!();
        println!("Run 'dialref config init' to create a configuration file.");
    }
    Ok(())
}

/// Interpret a command-line value for a key.
///
/// String settings take the text verbatim, so `202866` stays a CRM number
/// instead of becoming an integer. Anything else is read as JSON, falling
/// back to a string.
fn parse_value(current: Option<&Value>, raw: &str) -> Value {
    match current {
        Some(Value::String(_)) => Value::String(raw.to_string()),
        _ => serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string())),
    }
}

/// Follow a dotted key through nested objects.
fn lookup<'a>(json: &'a Value, key: &str) -> anyhow::Result<&'a Value> {
    key.split('.').try_fold(json, |current, part| {
        current
            .get(part)
            .ok_or_else(|| anyhow::anyhow!("Configuration key not found: {}", key))
    })
}

/// Replace the value at a dotted key. The parent object must exist.
fn assign(json: &mut Value, key: &str, value: Value) -> anyhow::Result<()> {
    let (parent_key, field) = match key.rsplit_once('.') {
        Some((parent, field)) => (Some(parent), field),
        None => (None, key),
    };

    let mut parent = json;
    if let Some(parent_key) = parent_key {
        for part in parent_key.split('.') {
            parent = parent
                .get_mut(part)
                .ok_or_else(|| anyhow::anyhow!("Configuration path not found: {}", key))?;
        }
    }

    match parent.as_object_mut() {
        Some(object) => {
            object.insert(field.to_string(), value);
            Ok(())
        }
        None => anyhow::bail!("Cannot set {}: parent is not an object", key),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lookup_nested_key() {
        let json = serde_json::to_value(DialrefConfig::default()).unwrap();
        assert_eq!(lookup(&json, "geocoder.timeout_secs").unwrap(), &json!(10));
        assert_eq!(lookup(&json, "defaults.hospital").unwrap(), &json!("INCOR"));
        assert!(lookup(&json, "geocoder.missing").is_err());
    }

    #[test]
    fn test_assign_round_trips_through_config() {
        let mut json = serde_json::to_value(DialrefConfig::default()).unwrap();
        assign(&mut json, "clinical.source", json!("manual")).unwrap();
        assign(&mut json, "extraction.diagnosis_vocabulary", json!(["DIABETES MELLITUS"]))
            .unwrap();

        let config: DialrefConfig = serde_json::from_value(json).unwrap();
        assert_eq!(config.clinical.source, dialref_core::ValueSource::Manual);
        assert_eq!(config.extraction.diagnosis_vocabulary, vec!["DIABETES MELLITUS"]);
    }

    #[test]
    fn test_numeric_text_stays_a_string() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        set(&path, "defaults.crm", "202866").unwrap();
        set(&path, "defaults.clearance", "1").unwrap();
        set(&path, "geocoder.timeout_secs", "30").unwrap();

        let config = DialrefConfig::from_file(&path).unwrap();
        assert_eq!(config.defaults.0["crm"], "202866");
        assert_eq!(config.defaults.0["clearance"], "1");
        assert_eq!(config.defaults.0["hospital"], "INCOR");
        assert_eq!(config.geocoder.timeout_secs, 30);
    }

    #[test]
    fn test_parse_value_follows_current_type() {
        assert_eq!(parse_value(Some(&json!("SP")), "10"), json!("10"));
        assert_eq!(parse_value(Some(&json!(10)), "20"), json!(20));
        assert_eq!(parse_value(Some(&json!(true)), "false"), json!(false));
        assert_eq!(parse_value(None, "[\"A\"]"), json!(["A"]));
        assert_eq!(parse_value(None, "plain text"), json!("plain text"));
    }

    #[test]
    fn test_assign_rejects_scalar_parent() {
        let mut json = serde_json::to_value(DialrefConfig::default()).unwrap();
        assert!(assign(&mut json, "geocoder.timeout_secs.value", json!(1)).is_err());
        assert!(assign(&mut json, "nowhere.key", json!(1)).is_err());
    }
}
