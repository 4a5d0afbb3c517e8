//! Dropdown select control.
//!
//! A closed button showing the chosen label, which opens into a list of
//! entries. Pointer and keyboard input change the open state and commit
//! selections; each commit reports how soon it should be persisted.

use super::debounce::SaveDelay;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectEntry {
    pub value: String,
    pub label: String,
}

impl SelectEntry {
    pub fn new(value: &str, label: &str) -> Self {
        Self {
            value: value.to_string(),
            label: label.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectKey {
    Enter,
    Escape,
    Space,
    Up,
    Down,
    Char(char),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectEvent {
    /// Pointer pressed on the control itself.
    PointerDown,
    FocusIn,
    Blur,
    /// `modified` is true when Alt, Ctrl or Shift was held.
    Key { key: SelectKey, modified: bool },
    /// Pointer pressed on the entry at this index.
    PointerDownEntry(usize),
}

/// A selection the caller should persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub index: usize,
    pub value: String,
    pub delay: SaveDelay,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectResponse {
    pub commit: Option<Commit>,
    /// The key must not fall through to its default action (scrolling).
    pub prevent_default: bool,
}

#[derive(Debug, Clone)]
pub struct SelectWidget {
    entries: Vec<SelectEntry>,
    selected: Option<usize>,
    open: bool,
    last_event: Option<SelectEvent>,
}

impl SelectWidget {
    pub fn new(entries: Vec<SelectEntry>) -> Self {
        Self {
            entries,
            selected: None,
            open: false,
            last_event: None,
        }
    }

    pub fn entries(&self) -> &[SelectEntry] {
        &self.entries
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Label shown on the closed control.
    pub fn label(&self) -> &str {
        self.selected
            .and_then(|i| self.entries.get(i))
            .map_or("", |e| e.label.as_str())
    }

    /// Select the entry holding `value` without persisting anything.
    /// Returns `false` (and leaves the selection alone) if no entry matches.
    pub fn select_value(&mut self, value: &str) -> bool {
        match self.entries.iter().position(|e| e.value == value) {
            Some(i) => {
                self.selected = Some(i);
                true
            }
            None => false,
        }
    }

    pub fn handle(&mut self, event: SelectEvent) -> SelectResponse {
        let previous = self.last_event.replace(event);
        let mut response = SelectResponse::default();

        match event {
            SelectEvent::PointerDown => self.open = !self.open,
            // Pointer-down already toggled; the focus that follows it must
            // not toggle a second time.
            SelectEvent::FocusIn => {
                if previous != Some(SelectEvent::PointerDown) {
                    self.open = true;
                }
            }
            SelectEvent::Blur => self.open = false,
            SelectEvent::PointerDownEntry(index) => {
                response.commit = self.commit(index, SaveDelay::Immediate);
            }
            SelectEvent::Key { modified: true, .. } => {}
            SelectEvent::Key { key, .. } => match key {
                SelectKey::Enter => self.open = !self.open,
                SelectKey::Escape => self.open = false,
                SelectKey::Space => {
                    response.prevent_default = true;
                    self.open = true;
                }
                SelectKey::Up | SelectKey::Down => {
                    response.prevent_default = true;
                    let target = match (self.selected, key) {
                        (None, _) => Some(0),
                        (Some(i), SelectKey::Up) => i.checked_sub(1),
                        (Some(i), _) => Some(i + 1).filter(|&n| n < self.entries.len()),
                    };
                    if let Some(index) = target {
                        response.commit = self.commit(index, SaveDelay::Typing);
                    }
                }
                SelectKey::Char(c) if c.is_ascii_alphanumeric() => {
                    response.prevent_default = true;
                    if let Some(index) = self.match_first_letter(c) {
                        response.commit = self.commit(index, SaveDelay::Typing);
                    }
                }
                SelectKey::Char(_) => {}
            },
        }

        response
    }

    /// First entry other than the current one whose label starts with `c`.
    fn match_first_letter(&self, c: char) -> Option<usize> {
        let c = c.to_ascii_lowercase();
        self.entries.iter().enumerate().position(|(i, entry)| {
            Some(i) != self.selected
                && entry
                    .label
                    .chars()
                    .next()
                    .is_some_and(|first| first.to_ascii_lowercase() == c)
        })
    }

    fn commit(&mut self, index: usize, delay: SaveDelay) -> Option<Commit> {
        let entry = self.entries.get(index)?;
        self.selected = Some(index);
        Some(Commit {
            index,
            value: entry.value.clone(),
            delay,
        })
    }
}
