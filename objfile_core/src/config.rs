use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::ObjfileError;
use crate::ObjfileResult;
use crate::PredefinedValues;
use crate::TextSeparator;

/// Default cap on values per variable in a packet.
pub const DEFAULT_MAX_VALUES_PER_LIST: usize = 1000;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] =
	["objfile.toml", ".objfile.toml", ".config/objfile.toml"];

/// Settings loaded from `objfile.toml`.
///
/// ```toml
/// [values]
/// predefined = { PI = 3.14159, MAX_PLAYERS = 4 }
///
/// [wire]
/// max_values_per_list = 1000
///
/// [writer]
/// separator = ":"
/// bracketed_values = false
/// indent = "\t"
/// ```
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ObjfileConfig {
	pub values: ValuesConfig,
	pub wire: WireConfig,
	pub writer: WriterConfig,
}

/// Literal parsing settings.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ValuesConfig {
	/// Identifiers that parse to a fixed value, such as `PI`.
	pub predefined: PredefinedValues,
}

/// Packet encoding limits.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct WireConfig {
	pub max_values_per_list: usize,
}

impl Default for WireConfig {
	fn default() -> Self {
		Self {
			max_values_per_list: DEFAULT_MAX_VALUES_PER_LIST,
		}
	}
}

/// Text output settings.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct WriterConfig {
	pub separator: TextSeparator,
	/// Wrap single values in `[[...]]` as well.
	pub bracketed_values: bool,
	pub indent: String,
}

impl Default for WriterConfig {
	fn default() -> Self {
		Self {
			separator: TextSeparator::Equals,
			bracketed_values: true,
			indent: "    ".to_string(),
		}
	}
}

impl ObjfileConfig {
	/// Resolve the config path from known discovery candidates.
	#[must_use]
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config from the first discovered config file at `root`.
	/// Returns `None` if no config file exists.
	pub fn load(root: &Path) -> ObjfileResult<Option<ObjfileConfig>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		let content = std::fs::read_to_string(&config_path)?;
		let config = Self::from_toml(&content)?;
		tracing::debug!(path = %config_path.display(), "loaded config");

		Ok(Some(config))
	}

	/// Load the config at `root`, falling back to defaults.
	pub fn load_or_default(root: &Path) -> ObjfileResult<ObjfileConfig> {
		Ok(Self::load(root)?.unwrap_or_default())
	}

	pub fn from_toml(content: &str) -> ObjfileResult<ObjfileConfig> {
		toml::from_str(content).map_err(|e| ObjfileError::ConfigParse(e.to_string()))
	}
}
