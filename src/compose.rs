//! Composition of the final ordered plugin list for one request.

use crate::plugin::{self, Plugin, PluginSpec};

/// Optimization mode: the safe tier alone, or safe plus aggressive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Safe,
    Aggressive,
}

/// Feature toggles layered over the tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Toggles {
    /// Strip fixed pixel dimensions from the root element.
    pub strip_dimensions: bool,
    /// Keep the viewBox even if a later descriptor would drop it.
    pub preserve_viewbox: bool,
}

impl Default for Toggles {
    fn default() -> Self {
        Self {
            strip_dimensions: true,
            preserve_viewbox: true,
        }
    }
}

/// Build the final ordered plugin list. Pure data assembly: never fails, and
/// the result is recomputed per request, never cached.
///
/// Callers get final say: `extra` lands after every built-in entry, so a
/// repeated name re-enables or reconfigures a built-in under the engine's
/// last-occurrence-wins rule.
pub fn compose(mode: Mode, toggles: &Toggles, extra: &[PluginSpec]) -> Vec<PluginSpec> {
    let mut list: Vec<PluginSpec> = plugin::safe_tier()
        .into_iter()
        .map(PluginSpec::enabled)
        .collect();

    if mode == Mode::Aggressive {
        list.extend(plugin::aggressive_tier().into_iter().map(PluginSpec::enabled));
    }

    if !toggles.strip_dimensions {
        // Only one entry is expected from the built-in tiers.
        if let Some(idx) = list
            .iter()
            .position(|s| s.plugin.name() == Plugin::RemoveDimensions.name())
        {
            list.remove(idx);
        }
    }

    if toggles.preserve_viewbox {
        // Appended rather than merged so it wins over any tier entry.
        list.push(PluginSpec::disabled(Plugin::RemoveViewBox));
    }

    list.extend(extra.iter().cloned());
    list
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::RemoveAttrsConfig;

    fn names(list: &[PluginSpec]) -> Vec<&str> {
        list.iter().map(|s| s.plugin.name()).collect()
    }

    #[test]
    fn safe_mode_is_safe_tier_plus_viewbox_pin() {
        let list = compose(Mode::Safe, &Toggles::default(), &[]);
        let names = names(&list);
        assert_eq!(names.first(), Some(&"removeComments"));
        assert_eq!(names.last(), Some(&"removeViewBox"));
        assert!(!list.last().unwrap().active);
        assert!(!names.contains(&"sortAttrs"));
    }

    #[test]
    fn aggressive_mode_appends_aggressive_tier() {
        let list = compose(Mode::Aggressive, &Toggles::default(), &[]);
        let names = names(&list);
        let sort = names.iter().position(|n| *n == "sortAttrs").unwrap();
        let dims = names.iter().position(|n| *n == "removeDimensions").unwrap();
        assert!(dims < sort, "aggressive tier must follow the whole safe tier");
        assert!(names.contains(&"removeAttrs"));
    }

    #[test]
    fn dimension_toggle_removes_single_entry() {
        let toggles = Toggles {
            strip_dimensions: false,
            ..Toggles::default()
        };
        let list = compose(Mode::Safe, &toggles, &[]);
        assert!(!names(&list).contains(&"removeDimensions"));
    }

    #[test]
    fn viewbox_pin_can_be_dropped() {
        let toggles = Toggles {
            preserve_viewbox: false,
            ..Toggles::default()
        };
        let list = compose(Mode::Safe, &toggles, &[]);
        assert!(!names(&list).contains(&"removeViewBox"));
    }

    #[test]
    fn extras_come_last_in_given_order() {
        let extra = vec![
            PluginSpec::disabled(Plugin::RemoveComments),
            PluginSpec::enabled(Plugin::RemoveAttrs(RemoveAttrsConfig {
                patterns: vec!["id".into()],
            })),
        ];
        let list = compose(Mode::Safe, &Toggles::default(), &extra);
        let n = list.len();
        assert_eq!(list[n - 2], extra[0]);
        assert_eq!(list[n - 1], extra[1]);
        // the safe-tier removeComments is still present earlier: duplicates allowed
        assert_eq!(count(&list, "removeComments"), 2);
    }

    fn count(list: &[PluginSpec], name: &str) -> usize {
        list.iter().filter(|s| s.plugin.name() == name).count()
    }
}
