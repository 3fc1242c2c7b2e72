//! Keyboard shortcut mapping.

/// Key press as seen by the timeline view.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeyInput {
    /// DOM-style key name (`"z"`, `"Delete"`, `"Escape"`).
    pub key: String,
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
    /// Focus is inside an input, textarea, select or editable element.
    pub in_text_field: bool,
}

impl KeyInput {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    pub fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn with_meta(mut self) -> Self {
        self.meta = true;
        self
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn in_text_field(mut self) -> Self {
        self.in_text_field = true;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    Undo,
    Redo,
    DeleteSelected,
    ClearSelection,
}

impl Shortcut {
    /// Undo/redo fire even inside text fields; delete and escape do not.
    pub fn from_key(input: &KeyInput) -> Option<Shortcut> {
        let command = input.ctrl || input.meta;
        if command && input.key.eq_ignore_ascii_case("z") {
            return Some(if input.shift {
                Shortcut::Redo
            } else {
                Shortcut::Undo
            });
        }
        if input.in_text_field {
            return None;
        }
        match input.key.as_str() {
            "Delete" => Some(Shortcut::DeleteSelected),
            "Escape" => Some(Shortcut::ClearSelection),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{KeyInput, Shortcut};

    #[test]
    fn command_z_maps_to_undo_and_redo() {
        assert_eq!(
            Shortcut::from_key(&KeyInput::new("z").with_ctrl()),
            Some(Shortcut::Undo)
        );
        assert_eq!(
            Shortcut::from_key(&KeyInput::new("Z").with_meta().with_shift()),
            Some(Shortcut::Redo)
        );
        assert_eq!(
            Shortcut::from_key(&KeyInput::new("z").with_ctrl().in_text_field()),
            Some(Shortcut::Undo)
        );
    }

    #[test]
    fn delete_and_escape_are_ignored_in_text_fields() {
        assert_eq!(
            Shortcut::from_key(&KeyInput::new("Delete")),
            Some(Shortcut::DeleteSelected)
        );
        assert_eq!(
            Shortcut::from_key(&KeyInput::new("Escape")),
            Some(Shortcut::ClearSelection)
        );
        assert_eq!(Shortcut::from_key(&KeyInput::new("Delete").in_text_field()), None);
        assert_eq!(Shortcut::from_key(&KeyInput::new("z")), None);
    }
}
