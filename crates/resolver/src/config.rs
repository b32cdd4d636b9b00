//! Resolver configuration.
//!
//! The recognized options are the rule family (bidirectional mappers or
//! direction-restricted converters), the duplicate policy and the ambiguous
//! tie policy. Nothing else is read from the environment.
//!
//! ```toml
//! bidirectional = false
//! duplicates = "replace"
//! ties = "reject"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::order::Specificity;

/// What a second registration for an identical pair does.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
	/// Fail with [`crate::RegistryError::DuplicateRule`]; the existing rule stays.
	#[default]
	Reject,
	/// Swap the incoming rule in place and log a warning.
	Replace,
}

/// What resolution does when two unrelated rules both match a request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TiePolicy {
	/// The first match in iteration order wins. Unrelated peers iterate in
	/// insertion order unless a rule related to only one of them sits between.
	#[default]
	InsertionOrder,
	/// Fail with [`crate::RegistryError::AmbiguousResolution`].
	Reject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResolverConfig {
	/// Mapper family (rules usable in both directions) when true,
	/// converter family (source to destination only) when false.
	pub bidirectional: bool,
	pub duplicates: DuplicatePolicy,
	pub ties: TiePolicy,
}

impl Default for ResolverConfig {
	fn default() -> Self {
		Self::mappers()
	}
}

impl ResolverConfig {
	/// Bidirectional mapper family with default policies.
	pub const fn mappers() -> Self {
		Self {
			bidirectional: true,
			duplicates: DuplicatePolicy::Reject,
			ties: TiePolicy::InsertionOrder,
		}
	}

	/// Direction-restricted converter family with default policies.
	pub const fn converters() -> Self {
		Self {
			bidirectional: false,
			duplicates: DuplicatePolicy::Reject,
			ties: TiePolicy::InsertionOrder,
		}
	}

	pub const fn with_duplicates(mut self, duplicates: DuplicatePolicy) -> Self {
		self.duplicates = duplicates;
		self
	}

	pub const fn with_ties(mut self, ties: TiePolicy) -> Self {
		self.ties = ties;
		self
	}

	/// The ordering relation for this family.
	pub const fn specificity(&self) -> Specificity {
		Specificity::new(self.bidirectional)
	}

	/// Parses a TOML document; missing keys take their defaults.
	pub fn from_toml_str(src: &str) -> Result<Self, ConfigError> {
		Ok(toml::from_str(src)?)
	}

	/// Reads and parses a TOML file.
	pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let src = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
			path: path.to_path_buf(),
			source,
		})?;
		let config = Self::from_toml_str(&src)?;
		tracing::debug!(path = %path.display(), ?config, "resolver config loaded");
		Ok(config)
	}
}

#[derive(Error, Debug)]
pub enum ConfigError {
	#[error("failed to read {}: {source}", .path.display())]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
	#[error("invalid resolver config: {0}")]
	Parse(#[from] toml::de::Error),
}
