//! Build error taxonomy.

use thiserror::Error;

/// A failed question build.
///
/// Raised when markup or script source fails to compile. The session
/// controller surfaces these to the host without transitioning state —
/// a failed build never partially applies a Built Question.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// The markup source failed to compile.
    #[error("markup compilation failed: {0}")]
    Markup(String),
    /// The scoring script failed to parse.
    #[error("script compilation failed: {0}")]
    Script(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_error_display_names_the_source() {
        let markup = BuildError::Markup("unclosed widget".into());
        assert_eq!(
            markup.to_string(),
            "markup compilation failed: unclosed widget"
        );
        let script = BuildError::Script("unexpected token '}'".into());
        assert_eq!(
            script.to_string(),
            "script compilation failed: unexpected token '}'"
        );
    }
}
