//! Bounded numeric inputs
//!
//! The editor's numeric controls share one behavior: programmatic updates
//! clamp into range, and committing free text (the blur of an input box)
//! keeps the last valid value when the text is not an in-range integer.

use std::ops::RangeInclusive;

pub const FONT_SIZE_RANGE: RangeInclusive<u32> = 8..=48;
pub const PADDING_RANGE: RangeInclusive<u32> = 0..=96;
pub const WIDTH_RANGE: RangeInclusive<u32> = 320..=1600;

/// A named integer held inside an inclusive range
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundedField {
    name: &'static str,
    range: RangeInclusive<u32>,
    value: u32,
}

impl BoundedField {
    pub fn new(name: &'static str, range: RangeInclusive<u32>, initial: u32) -> Self {
        let value = initial.clamp(*range.start(), *range.end());
        Self { name, range, value }
    }

    pub fn font_size(initial: u32) -> Self {
        Self::new("font size", FONT_SIZE_RANGE, initial)
    }

    pub fn padding(initial: u32) -> Self {
        Self::new("padding", PADDING_RANGE, initial)
    }

    pub fn width(initial: u32) -> Self {
        Self::new("width", WIDTH_RANGE, initial)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    pub fn range(&self) -> &RangeInclusive<u32> {
        &self.range
    }

    /// Store a value, clamped into range
    pub fn set(&mut self, value: i64) -> u32 {
        let min = i64::from(*self.range.start());
        let max = i64::from(*self.range.end());
        // Clamped into a u32 range, so the cast is lossless
        self.value = value.clamp(min, max) as u32;
        self.value
    }

    /// Commit typed text; returns whether it was accepted
    ///
    /// Non-numeric or out-of-range text reverts to the last valid value.
    pub fn commit(&mut self, text: &str) -> bool {
        match text.trim().parse::<u32>() {
            Ok(value) if self.range.contains(&value) => {
                self.value = value;
                true
            },
            _ => {
                log::warn!(
                    "{}: {:?} is outside {}..={}, keeping {}",
                    self.name,
                    text,
                    self.range.start(),
                    self.range.end(),
                    self.value
                );
                false
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_width_clamps_on_set() {
        let mut width = BoundedField::width(640);
        assert_eq!(width.set(5000), 1600);
        assert_eq!(width.set(-3), 320);
        assert_eq!(width.set(900), 900);
    }

    #[test]
    fn test_width_reverts_on_bad_commit() {
        let mut width = BoundedField::width(640);
        assert!(!width.commit("abc"));
        assert_eq!(width.value(), 640);
        assert!(!width.commit("2000"));
        assert_eq!(width.value(), 640);
        assert!(!width.commit("-1"));
        assert_eq!(width.value(), 640);
        assert!(width.commit(" 1024 "));
        assert_eq!(width.value(), 1024);
    }

    #[test]
    fn test_padding_bounds_are_inclusive() {
        let mut padding = BoundedField::padding(32);
        assert!(padding.commit("0"));
        assert!(padding.commit("96"));
        assert!(!padding.commit("97"));
        assert_eq!(padding.value(), 96);
        assert_eq!(padding.set(200), 96);
    }

    #[test]
    fn test_initial_value_is_clamped() {
        assert_eq!(BoundedField::font_size(2).value(), 8);
        assert_eq!(BoundedField::font_size(99).value(), 48);
    }
}
