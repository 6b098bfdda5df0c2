use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::cycles::CycleType;
use crate::error::{Error, Result};
use crate::export::Export;
use crate::models::{Project, TimeEntry};

const CYCLE_ENV: &str = "TIMEGRID_CYCLE";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cycle_type: Option<CycleType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_dir: Option<PathBuf>,
}

pub fn config_path() -> Option<PathBuf> {
    let mut path = dirs::home_dir()?;
    path.push(".timegrid.json");
    Some(path)
}

pub fn read_config() -> Option<Config> {
    read_config_from(&config_path()?)
}

pub fn write_config(config: &Config) -> Result<()> {
    let path = config_path().ok_or(Error::NoHomeDir)?;
    write_config_to(&path, config)
}

/// Cycle type from `TIMEGRID_CYCLE`, then the config file.
pub fn read_cycle_type() -> Option<CycleType> {
    if let Ok(value) = env::var(CYCLE_ENV) {
        if !value.trim().is_empty() {
            return Some(CycleType::from(value.trim()));
        }
    }

    read_config().and_then(|config| config.cycle_type)
}

pub fn write_cycle_type(cycle_type: CycleType) -> Result<()> {
    let mut config = read_config().unwrap_or_default();
    config.cycle_type = Some(cycle_type);
    write_config(&config)
}

pub fn read_export_dir() -> Option<PathBuf> {
    read_config().and_then(|config| config.export_dir)
}

pub fn write_export_dir(dir: PathBuf) -> Result<()> {
    let mut config = read_config().unwrap_or_default();
    config.export_dir = Some(dir);
    write_config(&config)
}

pub fn load_entries(path: &Path) -> Result<Vec<TimeEntry>> {
    load_json(path)
}

pub fn load_projects(path: &Path) -> Result<Vec<Project>> {
    load_json(path)
}

/// Writes a rendered export into `dir` and returns the file path.
///
/// An existing file with the same name is overwritten.
pub fn write_export(dir: &Path, export: &Export) -> Result<PathBuf> {
    fs::create_dir_all(dir).map_err(|err| Error::io(dir, err))?;
    let path = dir.join(&export.filename);
    fs::write(&path, &export.content).map_err(|err| Error::io(&path, err))?;
    Ok(path)
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = fs::read_to_string(path).map_err(|err| Error::io(path, err))?;
    serde_json::from_str(&contents).map_err(|err| Error::json(path, err))
}

fn read_config_from(path: &Path) -> Option<Config> {
    let contents = fs::read_to_string(path).ok()?;
    serde_json::from_str(&contents).ok()
}

fn write_config_to(path: &Path, config: &Config) -> Result<()> {
    let json = serde_json::to_string_pretty(config)?;
    fs::write(path, json).map_err(|err| Error::io(path, err))
}
