//! GNOME (and other GSettings desktops) via `org.gnome.desktop.interface color-scheme`.

use super::{ApplyError, ThemeApplier, run_command};
use crate::core::classification::Classification;

const SCHEMA: &str = "org.gnome.desktop.interface";
const KEY: &str = "color-scheme";

pub struct GnomeApplier;

impl GnomeApplier {
    pub fn new() -> Self {
        Self
    }
}

impl Default for GnomeApplier {
    fn default() -> Self {
        Self::new()
    }
}

/// GSettings value for a classification.
pub(crate) fn scheme_for(classification: Classification) -> &'static str {
    match classification {
        Classification::Day => "default",
        Classification::Night => "prefer-dark",
    }
}

/// Describe a raw `gsettings get` value such as `'prefer-dark'`.
pub(crate) fn describe_scheme(raw: &str) -> String {
    let scheme = raw.trim().trim_matches('\'');
    match scheme {
        "default" | "prefer-light" => format!("Daytime ({scheme})"),
        "prefer-dark" => format!("Nighttime ({scheme})"),
        other => format!("Custom ({other})"),
    }
}

impl ThemeApplier for GnomeApplier {
    fn name(&self) -> &'static str {
        "gnome"
    }

    fn apply(&self, classification: Classification) -> Result<(), ApplyError> {
        run_command(
            "gsettings",
            &["set", SCHEMA, KEY, scheme_for(classification)],
        )?;
        Ok(())
    }

    fn describe_current(&self) -> Result<String, ApplyError> {
        let raw = run_command("gsettings", &["get", SCHEMA, KEY])?;
        Ok(describe_scheme(&raw))
    }
}
