use std::collections::BTreeSet;

use fwscope_types::{FirewallLog, LogFilters};

/// Quick filter presets
pub struct FilterPresets;

impl FilterPresets {
    /// Blocked traffic only
    pub fn blocked() -> LogFilters {
        LogFilters::new("block", "", "")
    }

    /// Passed traffic only
    pub fn passed() -> LogFilters {
        LogFilters::new("pass", "", "")
    }

    /// Records whose label marks them inbound
    pub fn inbound() -> LogFilters {
        LogFilters::new("", "", "in")
    }

    /// Records whose label marks them outbound
    pub fn outbound() -> LogFilters {
        LogFilters::new("", "", "out")
    }
}

/// Distinct values seen in a batch, for populating filter pickers
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterChoices {
    pub actions: BTreeSet<String>,
    pub interfaces: BTreeSet<String>,

    /// Rule labels; the direction filter matches against these, not `dir`
    pub directions: BTreeSet<String>,
}

impl FilterChoices {
    /// Collect the distinct actions, interfaces and labels
    pub fn from_logs<'a>(logs: impl IntoIterator<Item = &'a FirewallLog>) -> Self {
        let mut choices = Self::default();

        for log in logs {
            if let Some(action) = non_empty(log.action.as_deref()) {
                choices.actions.insert(action.to_string());
            }
            if let Some(interface) = non_empty(log.interface.as_deref()) {
                choices.interfaces.insert(interface.to_string());
            }
            if let Some(label) = non_empty(log.label.as_deref()) {
                choices.directions.insert(label.to_string());
            }
        }

        choices
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty() && self.interfaces.is_empty() && self.directions.is_empty()
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(action: Option<&str>, interface: Option<&str>, label: Option<&str>) -> FirewallLog {
        FirewallLog {
            action: action.map(str::to_string),
            interface: interface.map(str::to_string),
            label: label.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_presets() {
        let log = entry(Some("block"), None, Some("default deny in"));

        assert!(FilterPresets::blocked().matches(&log));
        assert!(!FilterPresets::passed().matches(&log));
        assert!(FilterPresets::inbound().matches(&log));
        assert!(!FilterPresets::outbound().matches(&log));
    }

    #[test]
    fn test_collect_choices() {
        let logs = vec![
            entry(Some("pass"), Some("lan"), Some("let out anything")),
            entry(Some("block"), Some("wan"), Some("allow-in")),
            entry(Some("pass"), Some("wan"), Some("")),
            entry(None, None, None),
        ];
        let choices = FilterChoices::from_logs(&logs);

        assert_eq!(choices.actions.iter().collect::<Vec<_>>(), vec!["block", "pass"]);
        assert_eq!(choices.interfaces.iter().collect::<Vec<_>>(), vec!["lan", "wan"]);
        assert_eq!(
            choices.directions.iter().collect::<Vec<_>>(),
            vec!["allow-in", "let out anything"]
        );
    }

    #[test]
    fn test_every_direction_choice_selects_its_records() {
        let mut logs = vec![
            entry(Some("pass"), None, Some("let out anything")),
            entry(Some("block"), None, Some("allow-in")),
        ];
        logs[0].dir = Some("in".to_string());
        let choices = FilterChoices::from_logs(&logs);

        assert!(!choices.directions.contains("in"));
        for direction in &choices.directions {
            let filters = LogFilters::new("", "", direction);
            assert!(logs.iter().any(|log| filters.matches(log)));
        }
    }

    #[test]
    fn test_collect_empty() {
        assert!(FilterChoices::from_logs(&Vec::new()).is_empty());
    }
}
