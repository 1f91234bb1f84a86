use serde::Deserialize;

/// Timing and distance thresholds that classify a press.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
	/// Hold time before the long-press overlay appears.
	pub overlay_delay_ms: u32,
	/// Hold time after the overlay appears until the long-press fires.
	pub long_press_ms: u32,
	/// Movement beyond this distance turns a press into a drag.
	pub move_threshold_px: f64,
	/// Prefix of the page a long-press opens, followed by the encoded move name.
	pub profile_path: String,
}

impl Default for InteractionConfig {
	fn default() -> Self {
		Self {
			overlay_delay_ms: 350,
			long_press_ms: 1650,
			move_threshold_px: 20.0,
			profile_path: "/move_profile/".into(),
		}
	}
}

impl InteractionConfig {
	pub fn profile_url(&self, name: &str) -> String {
		format!("{}{}", self.profile_path, urlencoding::encode(name))
	}
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
	/// Prepended to every request path. Empty means same origin.
	pub base_url: String,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct MoveMapConfig {
	pub interaction: InteractionConfig,
	pub api: ApiConfig,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn partial_config_keeps_defaults() {
		let config: MoveMapConfig =
			serde_json::from_str(r#"{"interaction":{"long_press_ms":900}}"#).unwrap();
		assert_eq!(config.interaction.long_press_ms, 900);
		assert_eq!(config.interaction.overlay_delay_ms, 350);
		assert_eq!(config.interaction.move_threshold_px, 20.0);
		assert_eq!(config.api.base_url, "");
	}

	#[test]
	fn profile_url_encodes_name() {
		let config = InteractionConfig::default();
		assert_eq!(
			config.profile_url("Kimura / Side"),
			"/move_profile/Kimura%20%2F%20Side"
		);
	}
}
