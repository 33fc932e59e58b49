//! UI modes that force a specific tool.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// An exclusive UI mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Diagram,
    Youtube,
}

impl Mode {
    /// Resolution order when several modes are active; earlier wins.
    pub const PRIORITY: [Mode; 2] = [Mode::Diagram, Mode::Youtube];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Diagram => "diagram",
            Mode::Youtube => "youtube",
        }
    }

    /// Registry name of the tool this mode forces.
    pub fn tool_name(&self) -> &'static str {
        match self {
            Mode::Diagram => "diagram_generator",
            Mode::Youtube => "youtube",
        }
    }
}

impl std::str::FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "diagram" => Ok(Mode::Diagram),
            "youtube" => Ok(Mode::Youtube),
            _ => Err(format!("Unknown mode: {}", s)),
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Mode flags sent by the client with each message.
///
/// Unknown names (for example `rag`) are carried but never force a tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct ActiveModes(HashMap<String, bool>);

impl ActiveModes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style flag setter.
    pub fn with(mut self, mode: Mode, active: bool) -> Self {
        self.set(mode.as_str(), active);
        self
    }

    pub fn set(&mut self, name: &str, active: bool) {
        self.0.insert(name.to_lowercase(), active);
    }

    pub fn toggle(&mut self, mode: Mode) -> bool {
        let now = !self.is_active(mode);
        self.set(mode.as_str(), now);
        now
    }

    pub fn is_active(&self, mode: Mode) -> bool {
        self.0.get(mode.as_str()).copied().unwrap_or(false)
    }

    /// Names of all flags that are set, sorted.
    pub fn active_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .0
            .iter()
            .filter(|(_, active)| **active)
            .map(|(name, _)| name.as_str())
            .collect();
        names.sort_unstable();
        names
    }
}

impl From<HashMap<String, bool>> for ActiveModes {
    fn from(map: HashMap<String, bool>) -> Self {
        let mut modes = ActiveModes::new();
        for (name, active) in map {
            modes.set(&name, active);
        }
        modes
    }
}

/// The first active mode in priority order, if any.
pub fn resolve_forced_mode(modes: &ActiveModes) -> Option<Mode> {
    Mode::PRIORITY.into_iter().find(|mode| modes.is_active(*mode))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_active_mode() {
        assert_eq!(resolve_forced_mode(&ActiveModes::new()), None);
        let off = ActiveModes::new().with(Mode::Diagram, false);
        assert_eq!(resolve_forced_mode(&off), None);
    }

    #[test]
    fn test_diagram_wins_over_youtube() {
        let modes = ActiveModes::new()
            .with(Mode::Youtube, true)
            .with(Mode::Diagram, true);
        assert_eq!(resolve_forced_mode(&modes), Some(Mode::Diagram));
    }

    #[test]
    fn test_precedence_independent_of_insertion_order() {
        for _ in 0..32 {
            let mut map = HashMap::new();
            map.insert("youtube".to_string(), true);
            map.insert("rag".to_string(), true);
            map.insert("diagram".to_string(), true);
            let modes = ActiveModes::from(map);
            assert_eq!(resolve_forced_mode(&modes), Some(Mode::Diagram));
        }
    }

    #[test]
    fn test_unknown_modes_ignored() {
        let modes: ActiveModes = serde_json::from_str(r#"{"rag": true, "youtube": true}"#).unwrap();
        assert_eq!(resolve_forced_mode(&modes), Some(Mode::Youtube));
    }

    #[test]
    fn test_toggle() {
        let mut modes = ActiveModes::new();
        assert!(modes.toggle(Mode::Diagram));
        assert!(modes.is_active(Mode::Diagram));
        assert!(!modes.toggle(Mode::Diagram));
        assert!(modes.active_names().is_empty());
    }
}
