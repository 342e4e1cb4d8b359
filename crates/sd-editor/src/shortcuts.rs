//! Keyboard shortcut mapping.
//!
//! Maps key + modifier combos to semantic `ShortcutAction`s. The map lives
//! in Rust so the browser bridge and native hosts share one binding table.

/// Actions that keyboard shortcuts can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    /// Move selected layers one step. `dx`/`dy` are -1, 0 or 1.
    Nudge { dx: i8, dy: i8, large: bool },
    Delete,
    SelectAll,
    Deselect,
}

/// Resolves key events into shortcut actions.
///
/// On macOS `meta` is ⌘; elsewhere `ctrl` plays the same role.
pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a key event to an action.
    ///
    /// `key` is the `KeyboardEvent.key` value (e.g. `"ArrowLeft"`, `"a"`).
    /// Returns `None` if the key combo has no binding.
    pub fn resolve(
        key: &str,
        ctrl: bool,
        shift: bool,
        _alt: bool,
        meta: bool,
    ) -> Option<ShortcutAction> {
        let cmd = ctrl || meta;

        if cmd {
            return match key {
                "a" | "A" => Some(ShortcutAction::SelectAll),
                _ => None,
            };
        }

        let nudge = |dx, dy| Some(ShortcutAction::Nudge { dx, dy, large: shift });
        match key {
            "ArrowLeft" => nudge(-1, 0),
            "ArrowRight" => nudge(1, 0),
            "ArrowUp" => nudge(0, -1),
            "ArrowDown" => nudge(0, 1),
            "Delete" | "Backspace" => Some(ShortcutAction::Delete),
            "Escape" => Some(ShortcutAction::Deselect),
            _ => None,
        }
    }
}
