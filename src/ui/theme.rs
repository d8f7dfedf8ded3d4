use eframe::egui::Color32;

use crate::config::ThemeConfig;

pub const DEFAULT_PRIMARY_GREEN: &str = "#059669";
pub const DEFAULT_ACCENT: &str = "#7c3aed";
pub const DEFAULT_CARD_BACKGROUND: &str = "#ffffff";
pub const DEFAULT_DARK_TEXT: &str = "#111827";

/// Resolved colours used by every component.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Theme {
    pub primary_green: Color32,
    pub accent: Color32,
    pub card_background: Color32,
    pub dark_text: Color32,
    pub dark_mode: bool,
}

impl Theme {
    pub fn from_config(config: &ThemeConfig, dark_mode: bool) -> Self {
        Self {
            primary_green: resolve("primary_green", config.primary_green.as_deref(), DEFAULT_PRIMARY_GREEN),
            accent: resolve("accent", config.accent.as_deref(), DEFAULT_ACCENT),
            card_background: resolve(
                "card_background",
                config.card_background.as_deref(),
                DEFAULT_CARD_BACKGROUND,
            ),
            dark_text: resolve("dark_text", config.dark_text.as_deref(), DEFAULT_DARK_TEXT),
            dark_mode,
        }
    }

    /// Primary colour at low opacity, for borders.
    pub fn primary_faint(&self) -> Color32 {
        self.primary_green.gamma_multiply(0.2)
    }

    pub fn bot_bubble(&self) -> Color32 {
        if self.dark_mode {
            Color32::from_rgb(0x33, 0x41, 0x55)
        } else {
            Color32::from_rgb(0xe5, 0xe7, 0xeb)
        }
    }

    pub fn user_bubble(&self) -> Color32 {
        if self.dark_mode {
            Color32::from_rgb(0x14, 0x53, 0x2d)
        } else {
            Color32::from_rgb(0xdc, 0xfc, 0xe7)
        }
    }

    pub fn bubble_text(&self) -> Color32 {
        if self.dark_mode {
            Color32::from_rgb(0xf1, 0xf5, 0xf9)
        } else {
            self.dark_text
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::from_config(&ThemeConfig::default(), false)
    }
}

fn resolve(key: &str, value: Option<&str>, default: &str) -> Color32 {
    let fallback = Color32::from_hex(default).unwrap_or(Color32::GRAY);
    match value {
        None => fallback,
        Some(hex) => Color32::from_hex(hex.trim()).unwrap_or_else(|_| {
            log::warn!("Invalid colour `{hex}` for theme.{key}; using {default}");
            fallback
        }),
    }
}
