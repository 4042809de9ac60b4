//! Control visibility flag

use serde::{Deserialize, Serialize};

/// Whether the adjustment and start controls are shown and interactive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibilityState {
    pub controls_visible: bool,
}

impl VisibilityState {
    /// Controls start out visible
    pub fn new() -> Self {
        Self { controls_visible: true }
    }

    /// Flip the flag when `value` is `None`, otherwise assign it
    pub fn toggle_or_set(&mut self, value: Option<bool>) {
        self.controls_visible = match value {
            Some(visible) => visible,
            None => !self.controls_visible,
        };
    }
}

impl Default for VisibilityState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::VisibilityState;

    #[test]
    fn toggle_flips() {
        let mut visibility = VisibilityState::new();
        visibility.toggle_or_set(None);
        assert!(!visibility.controls_visible);
        visibility.toggle_or_set(None);
        assert!(visibility.controls_visible);
    }

    #[test]
    fn set_ignores_prior_value() {
        let mut visibility = VisibilityState::new();
        visibility.toggle_or_set(Some(true));
        assert!(visibility.controls_visible);
        visibility.toggle_or_set(Some(false));
        assert!(!visibility.controls_visible);
        visibility.toggle_or_set(Some(false));
        assert!(!visibility.controls_visible);
    }
}
