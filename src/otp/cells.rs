//! Six single-digit cells that together hold one OTP.
//!
//! Each cell accepts either nothing or one ASCII digit. The array also owns the
//! focus cursor: the renderer reads [`CodeCells::focus`] and applies focus to the
//! matching input, so no UI handle ever leaks into this module.

use std::fmt;

/// Number of cells in a code.
pub const CODE_LENGTH: usize = 6;

/// Index of the cell that currently receives keyboard input.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FocusCursor(usize);

impl FocusCursor {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }

    fn clamped(index: usize) -> Self {
        Self(index.min(CODE_LENGTH - 1))
    }
}

/// Fixed-size code buffer plus focus routing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CodeCells {
    slots: [Option<char>; CODE_LENGTH],
    focus: FocusCursor,
}

impl CodeCells {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies an edit to one cell.
    ///
    /// `value` must be empty or a single decimal digit; anything else, or an
    /// out-of-range index, is ignored. Returns `true` when the edit was applied.
    pub fn set_digit(&mut self, index: usize, value: &str) -> bool {
        if index >= CODE_LENGTH {
            return false;
        }

        let mut chars = value.chars();
        let slot = match (chars.next(), chars.next()) {
            (None, _) => None,
            (Some(c), None) if c.is_ascii_digit() => Some(c),
            _ => return false,
        };

        self.slots[index] = slot;
        if slot.is_some() && index < CODE_LENGTH - 1 {
            self.focus = FocusCursor(index + 1);
        }
        true
    }

    /// Backspace on an already-empty cell walks focus one cell to the left.
    /// The previous cell keeps its content.
    pub fn handle_backspace(&mut self, index: usize) {
        if index >= CODE_LENGTH {
            return;
        }
        if self.slots[index].is_none() && index > 0 {
            self.focus = FocusCursor(index - 1);
        }
    }

    /// Distributes clipboard text across the cells.
    ///
    /// Only the first six characters are considered. If they are not all
    /// digits the paste is dropped without touching any cell. Cells past the
    /// pasted length are cleared. Returns `true` when applied.
    pub fn handle_paste(&mut self, raw: &str) -> bool {
        let pasted: Vec<char> = raw.chars().take(CODE_LENGTH).collect();
        if pasted.is_empty() || !pasted.iter().all(char::is_ascii_digit) {
            return false;
        }

        for (index, slot) in self.slots.iter_mut().enumerate() {
            *slot = pasted.get(index).copied();
        }
        self.focus = FocusCursor::clamped(pasted.len() - 1);
        true
    }

    /// Concatenation of all filled cells; shorter than six means incomplete.
    #[must_use]
    pub fn current_code(&self) -> String {
        self.slots.iter().flatten().collect()
    }

    /// The code, if every cell holds a digit.
    #[must_use]
    pub fn complete_code(&self) -> Option<String> {
        self.is_complete().then(|| self.current_code())
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    pub fn reset(&mut self) {
        self.slots = [None; CODE_LENGTH];
        self.focus = FocusCursor::default();
    }

    /// Moves focus explicitly, e.g. when the user clicks a cell.
    pub fn focus_on(&mut self, index: usize) {
        self.focus = FocusCursor::clamped(index);
    }

    #[must_use]
    pub fn focus(&self) -> FocusCursor {
        self.focus
    }

    #[must_use]
    pub fn slot(&self, index: usize) -> Option<char> {
        self.slots.get(index).copied().flatten()
    }

    #[must_use]
    pub fn slots(&self) -> &[Option<char>; CODE_LENGTH] {
        &self.slots
    }
}

impl fmt::Display for CodeCells {
    /// Renders `[1][2][_]...` with the focused cell wrapped in `<>`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, slot) in self.slots.iter().enumerate() {
            let c = slot.unwrap_or('_');
            if index == self.focus.index() {
                write!(f, "<{c}>")?;
            } else {
                write!(f, "[{c}]")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells_from(code: &str) -> CodeCells {
        let mut cells = CodeCells::new();
        for (index, c) in code.chars().enumerate() {
            assert!(cells.set_digit(index, &c.to_string()));
        }
        cells
    }

    #[test]
    fn digits_entered_in_order_form_the_code() {
        for code in ["000000", "123456", "987654", "102938"] {
            let cells = cells_from(code);
            assert_eq!(cells.current_code(), code);
            assert!(cells.is_complete());
            assert_eq!(cells.complete_code().as_deref(), Some(code));
        }
    }

    #[test]
    fn accepted_digit_advances_focus_until_last_cell() {
        let mut cells = CodeCells::new();
        for index in 0..CODE_LENGTH - 1 {
            assert!(cells.set_digit(index, "7"));
            assert_eq!(cells.focus().index(), index + 1);
        }
        assert!(cells.set_digit(5, "7"));
        assert_eq!(cells.focus().index(), 5);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let mut cells = cells_from("12");
        let before = cells.clone();
        for value in ["a", "12", " ", "-", "٣", "1 "] {
            assert!(!cells.set_digit(2, value), "accepted {value:?}");
        }
        assert!(!cells.set_digit(6, "1"));
        assert_eq!(cells, before);
    }

    #[test]
    fn clearing_a_cell_keeps_focus() {
        let mut cells = cells_from("123");
        cells.focus_on(1);
        assert!(cells.set_digit(1, ""));
        assert_eq!(cells.current_code(), "13");
        assert_eq!(cells.focus().index(), 1);
        assert!(!cells.is_complete());
    }

    #[test]
    fn backspace_on_empty_cell_moves_back_without_deleting() {
        let mut cells = cells_from("12");
        assert_eq!(cells.focus().index(), 2);
        cells.handle_backspace(2);
        assert_eq!(cells.focus().index(), 1);
        assert_eq!(cells.current_code(), "12");
    }

    #[test]
    fn backspace_on_filled_or_first_cell_keeps_focus() {
        let mut cells = cells_from("12");
        cells.focus_on(1);
        cells.handle_backspace(1);
        assert_eq!(cells.focus().index(), 1);

        let mut empty = CodeCells::new();
        empty.handle_backspace(0);
        assert_eq!(empty.focus().index(), 0);
    }

    #[test]
    fn paste_of_non_digits_is_ignored() {
        let mut cells = cells_from("98");
        let before = cells.clone();
        for raw in ["12a456", "abc", "", " 12345", "12-34"] {
            assert!(!cells.handle_paste(raw), "accepted {raw:?}");
        }
        assert_eq!(cells, before);
    }

    #[test]
    fn paste_truncates_to_six_digits() {
        let mut cells = CodeCells::new();
        assert!(cells.handle_paste("1234567"));
        assert_eq!(cells.current_code(), "123456");
        assert_eq!(cells.focus().index(), 5);
    }

    #[test]
    fn paste_only_looks_at_first_six_characters() {
        let mut cells = CodeCells::new();
        assert!(cells.handle_paste("654321xyz"));
        assert_eq!(cells.current_code(), "654321");
    }

    #[test]
    fn short_paste_fills_from_start_and_focuses_last_pasted() {
        let mut cells = CodeCells::new();
        assert!(cells.handle_paste("123"));
        assert_eq!(cells.current_code(), "123");
        assert_eq!(cells.slot(3), None);
        assert_eq!(cells.focus().index(), 2);
    }

    #[test]
    fn short_paste_clears_trailing_cells() {
        let mut cells = cells_from("999999");
        assert!(cells.handle_paste("12"));
        assert_eq!(cells.current_code(), "12");
        assert_eq!(cells.slot(2), None);
        assert_eq!(cells.focus().index(), 1);
    }

    #[test]
    fn reset_clears_cells_and_focus() {
        let mut cells = cells_from("123456");
        cells.reset();
        assert_eq!(cells.current_code(), "");
        assert_eq!(cells.focus().index(), 0);
        assert!(cells.slots().iter().all(Option::is_none));
    }

    #[test]
    fn display_marks_focused_cell() {
        let cells = cells_from("12");
        assert_eq!(cells.to_string(), "[1][2]<_>[_][_][_]");
    }
}
