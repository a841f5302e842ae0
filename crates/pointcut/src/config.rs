//! Weaving configuration.
//!
//! ```toml
//! receiver_slot = "that"
//! wrap_suffix = "_aop_"
//! ```

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when loading a [`WeaveConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error parsing TOML syntax or shape.
	#[error("TOML parse error: {0}")]
	Toml(#[from] toml::de::Error),

	/// A field is present but unusable.
	#[error("invalid value for {field}: {reason}")]
	Invalid {
		field: &'static str,
		reason: &'static str,
	},
}

/// Tunables shared by a registry and every chain it creates.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WeaveConfig {
	/// Advice parameter name that receives the join point's receiver.
	pub receiver_slot: String,
	/// Infix used to name wrap layers, `<member><suffix><n>`.
	pub wrap_suffix: String,
}

impl Default for WeaveConfig {
	fn default() -> Self {
		Self {
			receiver_slot: "that".to_string(),
			wrap_suffix: "_aop_".to_string(),
		}
	}
}

impl WeaveConfig {
	/// Parses and validates a TOML document. Missing fields keep their defaults.
	pub fn from_toml_str(src: &str) -> Result<Self, ConfigError> {
		let config: Self = toml::from_str(src)?;
		config.validate()?;
		Ok(config)
	}

	fn validate(&self) -> Result<(), ConfigError> {
		let slot = &self.receiver_slot;
		let is_ident = slot
			.chars()
			.next()
			.is_some_and(|c| c.is_alphabetic() || c == '_')
			&& slot.chars().all(|c| c.is_alphanumeric() || c == '_');
		if !is_ident {
			return Err(ConfigError::Invalid {
				field: "receiver_slot",
				reason: "must be a parameter name",
			});
		}
		if self.wrap_suffix.is_empty() {
			return Err(ConfigError::Invalid {
				field: "wrap_suffix",
				reason: "must not be empty",
			});
		}
		Ok(())
	}
}
