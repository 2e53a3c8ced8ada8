//! Rendered manifest validation.

use tracing::error;

use crate::error::{RenderError, UnresolvedLine};

/// Markers that identify a placeholder left behind by the renderer.
const PLACEHOLDER_MARKERS: &[&str] = &["{{gitops.", "{{ gitops."];

/// Rejects rendered text that still holds placeholders.
#[derive(Debug, Default, Clone, Copy)]
pub struct ManifestValidator;

impl ManifestValidator {
    /// Creates a new validator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Checks every line of `rendered` for leftover placeholders.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::UnresolvedPlaceholder`] carrying every
    /// offending line when at least one is found.
    pub fn validate(&self, rendered: &str) -> std::result::Result<(), RenderError> {
        let lines = Self::unresolved_lines(rendered);

        if lines.is_empty() {
            return Ok(());
        }

        for line in &lines {
            error!("Unresolved placeholder at line {}: {}", line.number, line.text);
        }

        Err(RenderError::UnresolvedPlaceholder { lines })
    }

    /// Collects the lines that still contain a placeholder marker.
    #[must_use]
    pub fn unresolved_lines(rendered: &str) -> Vec<UnresolvedLine> {
        rendered
            .split('\n')
            .enumerate()
            .filter(|(_, line)| PLACEHOLDER_MARKERS.iter().any(|m| line.contains(m)))
            .map(|(i, line)| UnresolvedLine {
                number: i + 1,
                text: line.trim_end_matches('\r').to_string(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text_passes() {
        let validator = ManifestValidator::new();
        assert!(validator.validate("image: svc-eastus\nreplicas: 2\n").is_ok());
    }

    #[test]
    fn test_reports_every_offending_line() {
        let validator = ManifestValidator::new();
        let text = "a: 1\nb: {{gitops.missing}}\nc: 3\nd: {{ gitops.config.zone }}\n";

        let Err(RenderError::UnresolvedPlaceholder { lines }) = validator.validate(text) else {
            panic!("expected unresolved placeholders");
        };

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].number, 2);
        assert_eq!(lines[0].text, "b: {{gitops.missing}}");
        assert_eq!(lines[1].number, 4);
    }

    #[test]
    fn test_other_braces_are_ignored() {
        assert!(ManifestValidator::unresolved_lines("x: {{ .Values.name }}\ny: {{other.key}}").is_empty());
    }
}
