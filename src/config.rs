use std::env;
use std::fs;
use std::io::{Error, ErrorKind};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{EpgError, Result};

pub const DEFAULT_ROW_HEIGHT: u32 = 100;
const DEFAULT_CONFIG_FILE: &str = "epg-card.toml";

/// Card configuration as written by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardConfig {
	#[serde(default)]
	pub entities: Vec<String>,
	/// Channel row height in pixels.
	#[serde(default = "default_row_height")]
	pub row_height: u32,
}

fn default_row_height() -> u32 {
	DEFAULT_ROW_HEIGHT
}

impl CardConfig {
	pub fn new(entities: Vec<String>) -> Result<Self> {
		let config = Self {
			entities,
			row_height: DEFAULT_ROW_HEIGHT,
		};
		config.validate()?;
		Ok(config)
	}

	pub fn with_row_height(mut self, row_height: u32) -> Self {
		self.row_height = row_height;
		self
	}

	/// A missing `entities` key decodes to an empty list and fails validation; a non-array
	/// value fails decoding.
	pub fn from_toml_str(raw: &str) -> Result<Self> {
		let config: CardConfig = toml::from_str(raw)?;
		config.validate()?;
		Ok(config)
	}

	pub fn validate(&self) -> Result<()> {
		if self.entities.is_empty() {
			return Err(EpgError::MissingEntities);
		}
		Ok(())
	}
}

pub fn resolve_config_path(cli_path: Option<PathBuf>) -> PathBuf {
	if let Some(path) = cli_path {
		return absolutize(path);
	}

	if let Some(path) = env::var_os("EPG_GRID_CONFIG") {
		let path = PathBuf::from(path);
		if !path.as_os_str().is_empty() {
			return absolutize(path);
		}
	}

	absolutize(PathBuf::from(DEFAULT_CONFIG_FILE))
}

pub fn resolve_states_path(cli_path: Option<PathBuf>) -> std::result::Result<PathBuf, Error> {
	if let Some(path) = cli_path {
		return Ok(absolutize(path));
	}

	if let Some(path) = env::var_os("EPG_GRID_STATES") {
		let path = PathBuf::from(path);
		if !path.as_os_str().is_empty() {
			return Ok(absolutize(path));
		}
	}

	Err(Error::new(
		ErrorKind::NotFound,
		"no entity states selected: pass --states <path> or set EPG_GRID_STATES",
	))
}

fn absolutize(path: PathBuf) -> PathBuf {
	let path = if path.is_absolute() {
		path
	} else if let Ok(cwd) = env::current_dir() {
		cwd.join(path)
	} else {
		path
	};

	if path.exists() {
		fs::canonicalize(&path).unwrap_or(path)
	} else {
		path
	}
}
