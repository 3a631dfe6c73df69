//! Input normalization

/// Submitted text in the two shapes the guards need
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedInput {
    /// Trimmed, case preserved (form values, dates, identifiers)
    pub literal: String,
    /// Trimmed and upper-cased (option and exit tokens)
    pub folded: String,
}

impl NormalizedInput {
    /// `None` for input that is empty after trimming
    pub fn new(raw: &str) -> Option<Self> {
        let literal = raw.trim();
        if literal.is_empty() {
            return None;
        }
        Some(Self {
            literal: literal.to_string(),
            folded: literal.to_uppercase(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trims_and_folds() {
        let input = NormalizedInput::new("  Jane Doe \n").unwrap();
        assert_eq!(input.literal, "Jane Doe");
        assert_eq!(input.folded, "JANE DOE");
    }

    #[test]
    fn test_whitespace_is_empty() {
        assert_eq!(NormalizedInput::new(""), None);
        assert_eq!(NormalizedInput::new(" \t\r\n "), None);
    }
}
