//! Slider with a paired number field.
//!
//! The slider can only hold in-range values. The number field accepts any
//! typed text; out-of-range numbers are clamped into the slider and the field
//! is flagged invalid until a valid number is entered.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangePair {
    min: i64,
    max: i64,
    value: i64,
    number_text: String,
    invalid: bool,
}

impl RangePair {
    pub fn new(min: i64, max: i64, value: i64) -> Self {
        let value = value.clamp(min, max);
        Self {
            min,
            max,
            value,
            number_text: value.to_string(),
            invalid: false,
        }
    }

    pub fn value(&self) -> i64 {
        self.value
    }

    pub fn bounds(&self) -> (i64, i64) {
        (self.min, self.max)
    }

    pub fn number_text(&self) -> &str {
        &self.number_text
    }

    pub fn is_invalid(&self) -> bool {
        self.invalid
    }

    /// Fraction of the track filled, for drawing.
    pub fn ratio(&self) -> f64 {
        if self.max == self.min {
            return 1.0;
        }
        (self.value - self.min) as f64 / (self.max - self.min) as f64
    }

    /// The slider moved to `value`. Returns the value to persist.
    pub fn set_from_slider(&mut self, value: i64) -> i64 {
        self.value = value.clamp(self.min, self.max);
        self.number_text = self.value.to_string();
        self.invalid = false;
        self.value
    }

    /// Nudge the slider by `delta` steps.
    pub fn step(&mut self, delta: i64) -> i64 {
        self.set_from_slider(self.value.saturating_add(delta))
    }

    /// Focus moved from the slider into the number field; it starts empty.
    pub fn begin_number_entry(&mut self) {
        self.number_text.clear();
    }

    /// The number field now reads `text`. Returns the value to persist, or
    /// `None` while the text isn't a number yet.
    pub fn set_number_text(&mut self, text: &str) -> Option<i64> {
        self.number_text = text.to_string();
        let typed: i64 = text.trim().parse().ok()?;
        let clamped = typed.clamp(self.min, self.max);
        self.invalid = clamped != typed;
        self.value = clamped;
        Some(clamped)
    }

    pub fn push_digit(&mut self, digit: char) -> Option<i64> {
        let mut text = self.number_text.clone();
        text.push(digit);
        self.set_number_text(&text)
    }

    pub fn pop_digit(&mut self) -> Option<i64> {
        let mut text = self.number_text.clone();
        text.pop();
        self.set_number_text(&text)
    }

    /// Leaving the number field shows the slider's value again.
    pub fn end_number_entry(&mut self) {
        self.number_text = self.value.to_string();
    }
}
