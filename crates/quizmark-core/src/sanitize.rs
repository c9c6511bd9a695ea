//! HTML sanitization seam.
//!
//! The sanitization policy itself is an external collaborator; the core
//! only fixes the allow-list the widget markup needs and requires
//! idempotence so repeated passes over the same body are harmless.

/// Extra tags and attributes the sanitizer must keep for answer widgets
/// to survive sanitization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SanitizePolicy {
    pub extra_tags: &'static [&'static str],
    pub extra_attributes: &'static [&'static str],
}

/// The allow-list for rendered question bodies: custom editor/plot
/// elements plus the attributes their widgets are driven through.
pub const WIDGET_POLICY: SanitizePolicy = SanitizePolicy {
    extra_tags: &["code-editor", "function-plot", "code-sample"],
    extra_attributes: &[
        "contenteditable",
        "fontsize",
        "data",
        "copy-clipboard-button",
        "target",
        "render",
    ],
};

/// External HTML sanitizer.
///
/// Implementations must be idempotent under repeated application: the
/// displayed body may be sanitized again on every re-render.
pub trait Sanitizer {
    fn sanitize(&self, html: &str, policy: &SanitizePolicy) -> String;
}

/// Identity sanitizer for hosts that sanitize elsewhere (and for tests).
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughSanitizer;

impl Sanitizer for PassthroughSanitizer {
    fn sanitize(&self, html: &str, _policy: &SanitizePolicy) -> String {
        html.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passthrough_is_idempotent() {
        let sanitizer = PassthroughSanitizer;
        let once = sanitizer.sanitize("<p>body</p>", &WIDGET_POLICY);
        let twice = sanitizer.sanitize(&once, &WIDGET_POLICY);
        assert_eq!(once, twice);
    }

    #[test]
    fn widget_policy_covers_editor_elements() {
        assert!(WIDGET_POLICY.extra_tags.contains(&"code-editor"));
        assert!(WIDGET_POLICY.extra_attributes.contains(&"contenteditable"));
    }
}
