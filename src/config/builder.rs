//! Config file creation and in-place editing.
//!
//! The default file is produced by [`ConfigBuilder`] so comments stay aligned
//! when defaults change. Edits (`set-location`, `install`/`uninstall`) rewrite
//! only the affected lines and keep the user's comments and spacing.

use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::Path;

use super::get_config_path;
use super::validation::validate_location;
use crate::common::constants::*;
use crate::common::utils::private_path;
use crate::core::window::Location;

/// Column used for comments when a line has none to align with.
const DEFAULT_COMMENT_COLUMN: usize = 31;

/// Write a commented default `autotheme.toml` to `path`.
pub fn create_default_config(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    let content = ConfigBuilder::new()
        .add_section("Backend")
        .add_setting(
            "backend",
            "\"auto\"",
            "Theme backend: \"auto\", \"gnome\", \"windows\" or \"dry-run\"",
        )
        .add_section("Location")
        .add_setting(
            "latitude",
            &format!("{DEFAULT_LATITUDE:.6}"),
            &format!("Latitude in decimal degrees ({MINIMUM_LATITUDE}-{MAXIMUM_LATITUDE})"),
        )
        .add_setting(
            "longitude",
            &format!("{DEFAULT_LONGITUDE:.6}"),
            "Longitude in decimal degrees (use 'autotheme set-location' to change)",
        )
        .add_section("Schedule")
        .add_setting(
            "poll_interval",
            &DEFAULT_POLL_INTERVAL.to_string(),
            &format!(
                "Seconds between checks ({MINIMUM_POLL_INTERVAL}-{MAXIMUM_POLL_INTERVAL})"
            ),
        )
        .add_setting(
            "default_classification",
            &format!("\"{}\"", DEFAULT_CLASSIFICATION.as_str()),
            "Reported before the first sunrise/sunset lookup",
        )
        .add_section("Preferences")
        .add_setting(
            "start_at_login",
            &DEFAULT_START_AT_LOGIN.to_string(),
            "Kept in sync by 'autotheme install/uninstall'",
        )
        .add_setting(
            "show_notifications",
            &DEFAULT_SHOW_NOTIFICATIONS.to_string(),
            "Desktop notification when the theme switches",
        )
        .add_section("Provider")
        .add_setting(
            "api_url",
            &format!("\"{DEFAULT_API_URL}\""),
            "Sunrise/sunset API endpoint",
        )
        .add_setting(
            "request_timeout",
            &DEFAULT_REQUEST_TIMEOUT.to_string(),
            &format!(
                "HTTP timeout in seconds ({MINIMUM_REQUEST_TIMEOUT}-{MAXIMUM_REQUEST_TIMEOUT})"
            ),
        )
        .build();

    write_atomically(path, &content).context("Failed to write default config file")
}

/// Save new coordinates to the active config file.
///
/// Invalid coordinates fail with [`super::ConfigError::InvalidLocation`] before
/// anything is written.
pub fn update_coordinates(latitude: f64, longitude: f64) -> Result<Location> {
    let location = validate_location(latitude, longitude)?;
    let config_path = get_config_path()?;

    if !config_path.exists() {
        create_default_config(&config_path)?;
    }

    update_coordinates_at(&config_path, location)?;

    log_block_start!("Updated config file: {}", private_path(&config_path));
    log_indented!("Latitude: {:.6}", location.latitude);
    log_indented!("Longitude: {:.6}", location.longitude);

    Ok(location)
}

/// Rewrite the `latitude`/`longitude` lines of the file at `path`.
pub fn update_coordinates_at(path: &Path, location: Location) -> Result<()> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", private_path(path)))?;
    let mut updated = content.clone();

    let lat_line = find_config_line(&content, "latitude");
    let lon_line = find_config_line(&content, "longitude");

    // Keep both comments in the same column
    let target_column = match (&lat_line, &lon_line) {
        (Some(lat), Some(lon)) => {
            let lat_pos = lat.find('#').unwrap_or(lat.len());
            let lon_pos = lon.find('#').unwrap_or(lon.len());
            lat_pos.max(lon_pos)
        }
        (Some(line), None) | (None, Some(line)) => {
            line.find('#').unwrap_or(DEFAULT_COMMENT_COLUMN)
        }
        (None, None) => DEFAULT_COMMENT_COLUMN,
    };

    for (key, line, value) in [
        ("latitude", &lat_line, location.latitude),
        ("longitude", &lon_line, location.longitude),
    ] {
        let formatted = format!("{value:.6}");
        match line {
            Some(line) => {
                let new_line = align_comment_to_column(line, key, &formatted, target_column);
                updated = updated.replacen(line.as_str(), &new_line, 1);
            }
            None => {
                if !updated.ends_with('\n') {
                    updated.push('\n');
                }
                updated.push_str(&format!("{key} = {formatted}\n"));
            }
        }
    }

    write_atomically(path, &updated)
        .with_context(|| format!("Failed to write updated config to {}", private_path(path)))
}

/// Persist the autostart preference in the active config file.
pub fn update_start_at_login(enabled: bool) -> Result<()> {
    let config_path = get_config_path()?;
    if !config_path.exists() {
        create_default_config(&config_path)?;
    }
    update_setting_at(&config_path, "start_at_login", &enabled.to_string())
}

/// Replace the value of `key`, or append it when the file has no such line.
pub fn update_setting_at(path: &Path, key: &str, value: &str) -> Result<()> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", private_path(path)))?;

    let updated = match find_config_line(&content, key) {
        Some(line) => {
            let new_line = preserve_comment_formatting(&line, key, value);
            if new_line == line {
                return Ok(());
            }
            content.replacen(line.as_str(), &new_line, 1)
        }
        None => {
            let mut appended = content;
            if !appended.is_empty() && !appended.ends_with('\n') {
                appended.push('\n');
            }
            appended.push_str(&format!("{key} = {value}\n"));
            appended
        }
    };

    write_atomically(path, &updated)
        .with_context(|| format!("Failed to write updated config to {}", private_path(path)))
}

/// Write through a temp file in the same directory, then rename over `path`.
///
/// The config watcher never observes a half-written file this way.
fn write_atomically(path: &Path, content: &str) -> Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut temp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temp file in {}", private_path(dir)))?;
    temp.write_all(content.as_bytes())?;
    temp.flush()?;
    temp.persist(path)
        .map_err(|e| anyhow::anyhow!("Failed to replace {}: {}", private_path(path), e.error))?;
    Ok(())
}

/// Builder for configuration files with aligned trailing comments.
struct ConfigBuilder {
    entries: Vec<Entry>,
}

enum Entry {
    Section(String),
    Setting { line: String, comment: String },
}

impl ConfigBuilder {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    fn add_section(mut self, title: &str) -> Self {
        self.entries.push(Entry::Section(format!("#[{title}]")));
        self
    }

    fn add_setting(mut self, key: &str, value: &str, comment: &str) -> Self {
        self.entries.push(Entry::Setting {
            line: format!("{key} = {value}"),
            comment: format!("# {comment}"),
        });
        self
    }

    fn build(self) -> String {
        let column = self
            .entries
            .iter()
            .filter_map(|entry| match entry {
                Entry::Setting { line, .. } => Some(line.len()),
                Entry::Section(_) => None,
            })
            .max()
            .unwrap_or(0)
            + 1;

        let mut lines = Vec::new();
        for entry in self.entries {
            match entry {
                Entry::Section(title) => {
                    if !lines.is_empty() {
                        lines.push(String::new());
                    }
                    lines.push(title);
                }
                Entry::Setting { line, comment } => {
                    let padding = " ".repeat(column - line.len());
                    lines.push(format!("{line}{padding}{comment}"));
                }
            }
        }

        let mut out = lines.join("\n");
        out.push('\n');
        out
    }
}

/// Find the uncommented line that assigns `key`.
pub(crate) fn find_config_line(content: &str, key: &str) -> Option<String> {
    content
        .lines()
        .find(|line| {
            let trimmed = line.trim_start();
            trimmed
                .strip_prefix(key)
                .is_some_and(|rest| rest.trim_start().starts_with('='))
        })
        .map(str::to_string)
}

/// Replace a line's value while keeping the exact spacing before its comment.
pub(crate) fn preserve_comment_formatting(
    original_line: &str,
    key: &str,
    new_value: &str,
) -> String {
    let key_value = format!("{key} = {new_value}");

    match original_line.find('#') {
        Some(comment_pos) => {
            let before_comment = &original_line[..comment_pos];
            let spacing = before_comment
                .rfind(|c: char| !c.is_whitespace())
                .map(|last| &before_comment[last + 1..])
                .filter(|s| !s.is_empty())
                .unwrap_or(" ");
            format!("{key_value}{spacing}{}", &original_line[comment_pos..])
        }
        None => key_value,
    }
}

/// Replace a line's value and move its comment to `target_column`.
fn align_comment_to_column(
    original_line: &str,
    key: &str,
    new_value: &str,
    target_column: usize,
) -> String {
    let key_value = format!("{key} = {new_value}");

    match original_line.find('#') {
        Some(comment_pos) => {
            let padding = target_column.saturating_sub(key_value.len()).max(1);
            format!(
                "{key_value}{}{}",
                " ".repeat(padding),
                &original_line[comment_pos..]
            )
        }
        None => key_value,
    }
}
