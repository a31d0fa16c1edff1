//! Input checks run before any gateway call.

use crate::error::{RuneError, RuneResult};

pub const QUESTION_MIN_CHARS: usize = 3;
pub const QUESTION_MAX_CHARS: usize = 500;
pub const NOTES_MAX_CHARS: usize = 2000;

/// Trim a question and check its length.
pub fn validate_question(question: &str) -> RuneResult<String> {
    let trimmed = question.trim();
    if trimmed.is_empty() {
        return Err(RuneError::Validation(
            "please enter a question before drawing".to_string(),
        ));
    }

    let chars = trimmed.chars().count();
    if chars < QUESTION_MIN_CHARS {
        return Err(RuneError::Validation(format!(
            "question must be at least {QUESTION_MIN_CHARS} characters"
        )));
    }
    if chars > QUESTION_MAX_CHARS {
        return Err(RuneError::Validation(format!(
            "question must be at most {QUESTION_MAX_CHARS} characters"
        )));
    }

    Ok(trimmed.to_string())
}

/// Trim notes or a reflection. Blank text clears the field.
pub fn validate_notes(notes: &str) -> RuneResult<Option<String>> {
    let trimmed = notes.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if trimmed.chars().count() > NOTES_MAX_CHARS {
        return Err(RuneError::Validation(format!(
            "notes must be at most {NOTES_MAX_CHARS} characters"
        )));
    }
    Ok(Some(trimmed.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_is_trimmed() {
        assert_eq!(
            validate_question("  Will it rain?  ").unwrap(),
            "Will it rain?"
        );
    }

    #[test]
    fn test_blank_question_rejected() {
        for q in ["", "   ", "\t\n"] {
            assert!(matches!(validate_question(q), Err(RuneError::Validation(_))));
        }
    }

    #[test]
    fn test_question_length_bounds() {
        assert!(validate_question("ab").is_err());
        assert!(validate_question("abc").is_ok());
        assert!(validate_question(&"x".repeat(QUESTION_MAX_CHARS)).is_ok());
        assert!(validate_question(&"x".repeat(QUESTION_MAX_CHARS + 1)).is_err());
    }

    #[test]
    fn test_question_counts_chars_not_bytes() {
        // three runic glyphs are nine bytes
        assert!(validate_question("ᚠᚢᚦ").is_ok());
    }

    #[test]
    fn test_notes_blank_clears() {
        assert_eq!(validate_notes("   ").unwrap(), None);
        assert_eq!(validate_notes(" kept ").unwrap().as_deref(), Some("kept"));
        assert!(validate_notes(&"n".repeat(NOTES_MAX_CHARS + 1)).is_err());
    }
}
