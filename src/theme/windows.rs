//! Windows light/dark mode through the `Personalize` registry key.
//!
//! Day keeps the taskbar and system surfaces dark while apps go light;
//! night makes both dark. After writing the values, `WM_SETTINGCHANGE` with
//! `"ImmersiveColorSet"` is broadcast so running windows repaint.

use crate::core::classification::Classification;

#[cfg(windows)]
use super::{ApplyError, ThemeApplier};

#[cfg(windows)]
const PERSONALIZE_KEY: &str = r"Software\Microsoft\Windows\CurrentVersion\Themes\Personalize";

/// `(SystemUsesLightTheme, AppsUseLightTheme)` for a classification.
#[cfg_attr(not(windows), allow(dead_code))]
pub(crate) fn registry_values(classification: Classification) -> (u32, u32) {
    match classification {
        Classification::Day => (0, 1),
        Classification::Night => (0, 0),
    }
}

#[cfg_attr(not(windows), allow(dead_code))]
pub(crate) fn describe_values(system_light: u32, apps_light: u32) -> String {
    match (system_light, apps_light) {
        (0, 1) => "Daytime (System Dark, Apps Light)".to_string(),
        (0, 0) => "Nighttime (All Dark)".to_string(),
        (system, apps) => {
            let label = |v: u32| if v == 0 { "Dark" } else { "Light" };
            format!("Custom (System {}, Apps {})", label(system), label(apps))
        }
    }
}

#[cfg(windows)]
pub struct WindowsApplier;

#[cfg(windows)]
impl WindowsApplier {
    pub fn new() -> Self {
        Self
    }

    fn broadcast_theme_change() -> Result<(), ApplyError> {
        use crate::common::constants::BROADCAST_TIMEOUT_MS;
        use windows_sys::Win32::UI::WindowsAndMessaging::{
            HWND_BROADCAST, SMTO_ABORTIFHUNG, SendMessageTimeoutW, WM_SETTINGCHANGE,
        };

        let area: Vec<u16> = "ImmersiveColorSet"
            .encode_utf16()
            .chain(std::iter::once(0))
            .collect();
        let mut result: usize = 0;

        // SAFETY: `area` is a NUL-terminated UTF-16 buffer that outlives the call,
        // and `result` is a valid out pointer.
        let sent = unsafe {
            SendMessageTimeoutW(
                HWND_BROADCAST,
                WM_SETTINGCHANGE,
                0,
                area.as_ptr() as isize,
                SMTO_ABORTIFHUNG,
                BROADCAST_TIMEOUT_MS,
                &mut result,
            )
        };

        if sent == 0 {
            return Err(ApplyError::Broadcast(
                std::io::Error::last_os_error().to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(windows)]
impl Default for WindowsApplier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(windows)]
impl ThemeApplier for WindowsApplier {
    fn name(&self) -> &'static str {
        "windows"
    }

    fn apply(&self, classification: Classification) -> Result<(), ApplyError> {
        use winreg::RegKey;
        use winreg::enums::{HKEY_CURRENT_USER, KEY_SET_VALUE};

        let (system_light, apps_light) = registry_values(classification);
        let key = RegKey::predef(HKEY_CURRENT_USER)
            .open_subkey_with_flags(PERSONALIZE_KEY, KEY_SET_VALUE)
            .map_err(ApplyError::Registry)?;
        key.set_value("SystemUsesLightTheme", &system_light)
            .map_err(ApplyError::Registry)?;
        key.set_value("AppsUseLightTheme", &apps_light)
            .map_err(ApplyError::Registry)?;

        Self::broadcast_theme_change()
    }

    fn describe_current(&self) -> Result<String, ApplyError> {
        use winreg::RegKey;
        use winreg::enums::HKEY_CURRENT_USER;

        let key = RegKey::predef(HKEY_CURRENT_USER)
            .open_subkey(PERSONALIZE_KEY)
            .map_err(ApplyError::Registry)?;
        // Windows treats missing values as light.
        let system_light: u32 = key.get_value("SystemUsesLightTheme").unwrap_or(1);
        let apps_light: u32 = key.get_value("AppsUseLightTheme").unwrap_or(1);
        Ok(describe_values(system_light, apps_light))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_values() {
        assert_eq!(registry_values(Classification::Day), (0, 1));
        assert_eq!(registry_values(Classification::Night), (0, 0));
    }

    #[test]
    fn test_describe_values() {
        assert_eq!(describe_values(0, 1), "Daytime (System Dark, Apps Light)");
        assert_eq!(describe_values(0, 0), "Nighttime (All Dark)");
        assert_eq!(describe_values(1, 1), "Custom (System Light, Apps Light)");
    }
}
