use anyhow::{bail, Context, Result};
use flora_dataset::{LoadOptions, DEFAULT_DATA_PATH, DEFAULT_SPECIES_COLUMN};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "flora.toml";

pub const ENV_DATA: &str = "FLORA_DATA";
pub const ENV_DELIMITER: &str = "FLORA_DELIMITER";
pub const ENV_SPECIES_COLUMN: &str = "FLORA_SPECIES_COLUMN";
pub const ENV_NA_VALUES: &str = "FLORA_NA_VALUES";

/// Contents of `flora.toml`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub data: Option<PathBuf>,
    #[serde(default)]
    pub delimiter: Option<String>,
    #[serde(default)]
    pub species_column: Option<String>,
    #[serde(default)]
    pub na_values: Option<Vec<String>>,
}

/// A parsed config file plus the directory relative paths resolve against.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub path: PathBuf,
    pub config: FileConfig,
}

impl LoadedConfig {
    fn base_dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }
}

/// Values given on the command line.
#[derive(Debug, Default, Clone)]
pub struct DatasetFlags {
    pub data: Option<PathBuf>,
    pub delimiter: Option<String>,
    pub species_column: Option<String>,
    pub na_values: Vec<String>,
}

/// Read `explicit`, or `flora.toml` in `cwd` when it exists.
pub fn load_config_file(explicit: Option<&Path>, cwd: &Path) -> Result<Option<LoadedConfig>> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let candidate = cwd.join(CONFIG_FILE_NAME);
            if !candidate.is_file() {
                return Ok(None);
            }
            candidate
        }
    };

    let raw = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let config: FileConfig = toml::from_str(&raw)
        .with_context(|| format!("Invalid config {}", path.display()))?;
    log::debug!("Using config {}", path.display());
    Ok(Some(LoadedConfig { path, config }))
}

/// Flag > environment > config file > default, field by field.
pub fn resolve_load_options(
    flags: &DatasetFlags,
    env: impl Fn(&str) -> Option<String>,
    file: Option<&LoadedConfig>,
) -> Result<LoadOptions> {
    let file_cfg = file.map(|loaded| &loaded.config);

    let path = match (&flags.data, env(ENV_DATA)) {
        (Some(path), _) => path.clone(),
        (None, Some(path)) if !path.is_empty() => PathBuf::from(path),
        _ => match (file, file_cfg.and_then(|cfg| cfg.data.as_ref())) {
            (Some(loaded), Some(path)) if path.is_relative() => loaded.base_dir().join(path),
            (_, Some(path)) => path.clone(),
            _ => PathBuf::from(DEFAULT_DATA_PATH),
        },
    };

    let delimiter = flags
        .delimiter
        .clone()
        .or_else(|| env(ENV_DELIMITER).filter(|d| !d.is_empty()))
        .or_else(|| file_cfg.and_then(|cfg| cfg.delimiter.clone()))
        .map(|raw| parse_delimiter(&raw))
        .transpose()?;

    let species_column = flags
        .species_column
        .clone()
        .or_else(|| env(ENV_SPECIES_COLUMN).filter(|c| !c.is_empty()))
        .or_else(|| file_cfg.and_then(|cfg| cfg.species_column.clone()))
        .unwrap_or_else(|| DEFAULT_SPECIES_COLUMN.to_string());

    let na_values = if !flags.na_values.is_empty() {
        flags.na_values.clone()
    } else if let Some(raw) = env(ENV_NA_VALUES).filter(|v| !v.is_empty()) {
        raw.split(',').map(|v| v.to_string()).collect()
    } else {
        file_cfg
            .and_then(|cfg| cfg.na_values.clone())
            .unwrap_or_default()
    };

    Ok(LoadOptions {
        path,
        delimiter,
        species_column,
        na_values,
    })
}

/// `tab`, `\t` or a single ASCII character.
pub fn parse_delimiter(raw: &str) -> Result<u8> {
    match raw {
        "tab" | "\\t" | "\t" => Ok(b'\t'),
        _ => {
            let mut chars = raw.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if c.is_ascii() => Ok(c as u8),
                _ => bail!("Delimiter must be a single ASCII character or `tab`, got {raw:?}"),
            }
        }
    }
}
