use serde::Deserialize;

/// Layout tuning knobs for the sheet's sizing behavior.
///
/// The host page may override any subset by defining a `window.SHEET_CONFIG`
/// object before the wasm bundle loads; missing or malformed values fall back
/// to the defaults below.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub(crate) struct SheetConfig {
    /// Viewport width at and above which flex-row height sync is active.
    pub desktop_breakpoint: f64,
    /// Floor for a note box's cached baseline height.
    pub note_min_height: f64,
    /// Two panels whose tops differ by at most this share a visual row.
    pub row_top_tolerance: f64,
    /// Pointer-down within this distance of a section's bottom edge starts a drag.
    pub resize_grip: f64,
    /// Height writes smaller than this are skipped to avoid observer feedback.
    pub sync_epsilon: f64,
    /// Fixed margin added when propagating a note box height to its panel.
    pub panel_gap: f64,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            desktop_breakpoint: 1024.0,
            note_min_height: 160.0,
            row_top_tolerance: 8.0,
            resize_grip: 14.0,
            sync_epsilon: 1.0,
            panel_gap: 12.0,
        }
    }
}

impl SheetConfig {
    /// Read `window.SHEET_CONFIG` once at startup.
    pub fn load() -> Self {
        let Some(window) = web_sys::window() else {
            return Self::default();
        };

        let Some(env) = window.get("SHEET_CONFIG") else {
            return Self::default();
        };

        if env.is_undefined() || !env.is_object() {
            return Self::default();
        }

        let Ok(json) = js_sys::JSON::stringify(&env) else {
            return Self::default();
        };

        Self::from_json(&String::from(json))
    }

    pub(crate) fn from_json(raw: &str) -> Self {
        match serde_json::from_str(raw) {
            Ok(config) => config,
            Err(err) => {
                leptos::logging::warn!("ignoring malformed SHEET_CONFIG: {err}");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = SheetConfig::default();
        assert_eq!(c.desktop_breakpoint, 1024.0);
        assert_eq!(c.note_min_height, 160.0);
        assert_eq!(c.sync_epsilon, 1.0);
    }

    #[test]
    fn test_partial_json_keeps_defaults_for_missing_fields() {
        let c = SheetConfig::from_json(r#"{"desktop_breakpoint": 1280}"#);
        assert_eq!(c.desktop_breakpoint, 1280.0);
        assert_eq!(c.note_min_height, 160.0);
        assert_eq!(c.resize_grip, 14.0);
    }

    #[test]
    fn test_malformed_json_falls_back_to_defaults() {
        assert_eq!(SheetConfig::from_json("{nope"), SheetConfig::default());
        assert_eq!(SheetConfig::from_json(""), SheetConfig::default());
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let c = SheetConfig::from_json(r#"{"panel_gap": 16, "theme": "dark"}"#);
        assert_eq!(c.panel_gap, 16.0);
    }
}
