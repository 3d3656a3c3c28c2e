//! View preferences passed down to rendering.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Color theme of the hub.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }

    /// Parses `dark` or `light`, case-insensitive.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "dark" => Some(Self::Dark),
            "light" => Some(Self::Light),
            _ => None,
        }
    }
}

impl Display for Theme {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read-only presentation settings handed to every view.
///
/// Selection never reads these; toggling the theme never touches selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewPreferences {
    pub theme: Theme,
}

impl ViewPreferences {
    pub fn new(theme: Theme) -> Self {
        Self { theme }
    }
}

#[cfg(test)]
mod tests {
    use super::Theme;

    #[test]
    fn theme_defaults_to_dark_and_toggles() {
        assert_eq!(Theme::default(), Theme::Dark);
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
    }

    #[test]
    fn theme_parse_is_case_insensitive() {
        assert_eq!(Theme::parse(" LIGHT "), Some(Theme::Light));
        assert_eq!(Theme::parse("dark"), Some(Theme::Dark));
        assert_eq!(Theme::parse("sepia"), None);
    }
}
