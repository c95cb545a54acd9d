//! Microsite themes.
//!
//! The rendering of a theme happens in the front end; the platform only
//! stores which one a property has selected.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Classic,
    Coastal,
    Alpine,
    Garden,
    Minimal,
}

impl Theme {
    pub const ALL: [Theme; 5] = [
        Theme::Classic,
        Theme::Coastal,
        Theme::Alpine,
        Theme::Garden,
        Theme::Minimal,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Classic => "classic",
            Theme::Coastal => "coastal",
            Theme::Alpine => "alpine",
            Theme::Garden => "garden",
            Theme::Minimal => "minimal",
        }
    }

    /// Parse a theme name, ignoring case and surrounding whitespace.
    pub fn parse(name: &str) -> Option<Theme> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
