//! Character-limit enforcement for generated text.
//!
//! Providers such as speech synthesis accept a bounded amount of input. The
//! truncator cuts text on character boundaries and appends a marker so the
//! listener can tell the narration stops early.

use crate::error::{PrimerError, Result};
use std::borrow::Cow;

/// Marker appended to truncated text.
pub const TRUNCATION_MARKER: &str = "...";

/// A possibly truncated view of some text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Truncation<'a> {
    pub text: Cow<'a, str>,
    pub was_truncated: bool,
}

impl Truncation<'_> {
    /// Number of characters in the view.
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

/// Truncate `text` to at most `max_chars` characters plus the marker.
///
/// A bound of zero is rejected. Text within the bound is borrowed unchanged.
pub fn truncate(text: &str, max_chars: usize) -> Result<Truncation<'_>> {
    if max_chars == 0 {
        return Err(PrimerError::InvalidInput(
            "truncation bound must be at least one character".to_string(),
        ));
    }

    match text.char_indices().nth(max_chars) {
        None => Ok(Truncation {
            text: Cow::Borrowed(text),
            was_truncated: false,
        }),
        Some((cut, _)) => {
            let mut owned = String::with_capacity(cut + TRUNCATION_MARKER.len());
            owned.push_str(&text[..cut]);
            owned.push_str(TRUNCATION_MARKER);
            Ok(Truncation {
                text: Cow::Owned(owned),
                was_truncated: true,
            })
        }
    }
}

/// Largest character count `truncate` can produce for a bound.
pub fn truncated_ceiling(max_chars: usize) -> usize {
    max_chars + TRUNCATION_MARKER.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_unchanged() {
        let result = truncate("hello", 10).unwrap();
        assert_eq!(result.text, "hello");
        assert!(!result.was_truncated);
        assert!(matches!(result.text, Cow::Borrowed(_)));
    }

    #[test]
    fn test_exact_length_unchanged() {
        let result = truncate("hello", 5).unwrap();
        assert_eq!(result.text, "hello");
        assert!(!result.was_truncated);
    }

    #[test]
    fn test_long_text_truncated_with_marker() {
        let text = "a".repeat(4000);
        let result = truncate(&text, 2500).unwrap();
        assert!(result.was_truncated);
        assert_eq!(result.char_count(), 2500 + TRUNCATION_MARKER.len());
        assert!(result.text.ends_with(TRUNCATION_MARKER));
        assert_eq!(result.char_count(), truncated_ceiling(2500));
    }

    #[test]
    fn test_idempotent() {
        for text in ["", "short", "exactly ten", &"x".repeat(50)] {
            let once = truncate(text, 10).unwrap();
            let twice = truncate(&once.text, 10).unwrap();
            assert_eq!(once.text, twice.text);
        }
    }

    #[test]
    fn test_cuts_on_char_boundaries() {
        // Each of these is multiple bytes in UTF-8.
        let text = "रसायनिक अभिक्रियाएँ";
        let result = truncate(text, 4).unwrap();
        assert!(result.was_truncated);
        let kept: String = text.chars().take(4).collect();
        assert_eq!(result.text, format!("{}{}", kept, TRUNCATION_MARKER));
    }

    #[test]
    fn test_zero_bound_rejected() {
        let err = truncate("anything", 0).unwrap_err();
        assert!(matches!(err, PrimerError::InvalidInput(_)));
    }
}
