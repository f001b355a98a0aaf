use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Colour theme of the dashboard.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Default,
    Dark,
    Tree,
}

/// The page a session is currently looking at.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    About,
    Dataset,
    #[default]
    Single,
    Batch,
    History,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Session {
    /// Theme a new session starts with.
    pub theme: Theme,
    /// View a new session starts on.
    pub view: View,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Default => "default",
            Theme::Dark => "dark",
            Theme::Tree => "tree",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "default" => Ok(Theme::Default),
            "dark" => Ok(Theme::Dark),
            "tree" => Ok(Theme::Tree),
            _ => Err(Error::InvalidTheme(s.to_owned())),
        }
    }
}

impl View {
    pub fn as_str(&self) -> &'static str {
        match self {
            View::About => "about",
            View::Dataset => "dataset",
            View::Single => "single",
            View::Batch => "batch",
            View::History => "history",
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for View {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "about" => Ok(View::About),
            "dataset" => Ok(View::Dataset),
            "single" => Ok(View::Single),
            "batch" => Ok(View::Batch),
            "history" => Ok(View::History),
            _ => Err(Error::InvalidView(s.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn theme_parses_case_insensitively() {
        assert_eq!("Dark".parse::<Theme>().unwrap(), Theme::Dark);
        assert_eq!(" tree ".parse::<Theme>().unwrap(), Theme::Tree);
        assert!("neon".parse::<Theme>().is_err());
    }

    proptest! {
        #[test]
        fn view_display_roundtrips(ix in 0usize..5) {
            let view = [View::About, View::Dataset, View::Single, View::Batch, View::History][ix];
            prop_assert_eq!(view.to_string().parse::<View>().unwrap(), view);
        }
    }
}
