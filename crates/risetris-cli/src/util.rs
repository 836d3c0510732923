use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::Context;
use risetris_engine::{Difficulty, GameConfig, RisingMode};
use serde::Serialize;

/// Writes `value` as pretty JSON to `output`, or to stdout if `None`.
pub(crate) fn write_json<T>(value: &T, output: Option<&Path>) -> anyhow::Result<()>
where
    T: Serialize,
{
    match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            write_pretty(BufWriter::new(file), value)
                .with_context(|| format!("Failed to write JSON to {}", path.display()))
        }
        None => write_pretty(io::stdout().lock(), value).context("Failed to write JSON to stdout"),
    }
}

fn write_pretty<W, T>(mut writer: W, value: &T) -> anyhow::Result<()>
where
    W: Write,
    T: Serialize,
{
    serde_json::to_writer_pretty(&mut writer, value)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

/// Options that shape the [`GameConfig`] of a command.
///
/// Overrides are applied in order: the JSON file (or defaults), then the
/// difficulty preset, then the rising mode.
#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct ConfigArg {
    /// Game configuration file (JSON, missing fields use defaults)
    #[arg(long)]
    pub(crate) config: Option<PathBuf>,
    /// Difficulty preset (easy, medium, hard, expert)
    #[arg(long)]
    pub(crate) difficulty: Option<Difficulty>,
    /// Rising-lines mode (off, pressure, survival, manual)
    #[arg(long)]
    pub(crate) rising_mode: Option<RisingMode>,
}

impl ConfigArg {
    pub(crate) fn load(&self) -> anyhow::Result<GameConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let file = File::open(path).with_context(|| {
                    format!("Failed to open config file: {}", path.display())
                })?;
                serde_json::from_reader(BufReader::new(file)).with_context(|| {
                    format!("Failed to parse config JSON file: {}", path.display())
                })?
            }
            None => GameConfig::default(),
        };
        if let Some(difficulty) = self.difficulty {
            config = config.with_difficulty(difficulty);
        }
        if let Some(mode) = self.rising_mode {
            config.rising.mode = mode;
        }
        config.validate().with_context(|| match &self.config {
            Some(path) => format!("Invalid configuration in {}", path.display()),
            None => "Invalid configuration".to_owned(),
        })?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use std::env;

    use super::*;

    #[test]
    fn test_overrides_apply_after_defaults() {
        let arg = ConfigArg {
            config: None,
            difficulty: Some(Difficulty::Hard),
            rising_mode: Some(RisingMode::Survival),
        };
        let config = arg.load().unwrap();
        assert_eq!(config.difficulty(), Some(Difficulty::Hard));
        assert_eq!(config.rising.mode, RisingMode::Survival);
    }

    #[test]
    fn test_partial_config_file() {
        let path = env::temp_dir().join(format!("risetris-partial-{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "grid": { "width": 12 } }"#).unwrap();
        let arg = ConfigArg {
            config: Some(path.clone()),
            ..ConfigArg::default()
        };
        let config = arg.load().unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(config.grid.width, 12);
        assert_eq!(config.grid.height, 20);
    }

    #[test]
    fn test_invalid_config_file_is_rejected() {
        let path = env::temp_dir().join(format!("risetris-invalid-{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "grid": { "width": 0 } }"#).unwrap();
        let arg = ConfigArg {
            config: Some(path.clone()),
            ..ConfigArg::default()
        };
        let err = arg.load().unwrap_err();
        std::fs::remove_file(&path).unwrap();
        assert!(err.to_string().starts_with("Invalid configuration"));
    }

    #[test]
    fn test_write_json_to_file() {
        let path = env::temp_dir().join(format!("risetris-output-{}.json", std::process::id()));
        write_json(&GameConfig::default(), Some(&path)).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert!(text.ends_with("}\n"));
        let config: GameConfig = serde_json::from_str(&text).unwrap();
        assert_eq!(config, GameConfig::default());
    }

    #[test]
    fn test_missing_config_file() {
        let arg = ConfigArg {
            config: Some(PathBuf::from("/nonexistent/risetris.json")),
            ..ConfigArg::default()
        };
        let err = arg.load().unwrap_err();
        assert!(err.to_string().starts_with("Failed to open config file"));
    }
}
