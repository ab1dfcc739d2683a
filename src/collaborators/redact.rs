//! PII scrubbing applied to parsed document text before analysis.
//!
//! Heuristic, not exhaustive: emails, phone-shaped digit runs, and
//! national-ID-shaped tokens are replaced with bracket markers so the
//! downstream model never sees them.

use std::sync::LazyLock;

use regex::Regex;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("valid email regex")
});

/// Phone-shaped runs: 8+ digits allowing spaces, dashes and an optional
/// leading +country prefix.
static PHONE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\+?\d[\d\s\-]{6,}\d").expect("valid phone regex")
});

/// National-ID-shaped tokens (e.g. S1234567D).
static NATIONAL_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[STFG]\d{7}[A-Z]\b").expect("valid national id regex"));

/// Replace recognizable personal identifiers with bracket markers.
pub fn scrub_pii(text: &str) -> String {
    let text = EMAIL.replace_all(text, "[REDACTED-EMAIL]");
    let text = NATIONAL_ID.replace_all(&text, "[REDACTED-ID]");
    let text = PHONE.replace_all(&text, "[REDACTED-PHONE]");
    text.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emails_are_scrubbed() {
        let out = scrub_pii("Contact jane.doe@example.org for results.");
        assert!(!out.contains("jane.doe@example.org"));
        assert!(out.contains("[REDACTED-EMAIL]"));
    }

    #[test]
    fn phone_numbers_are_scrubbed() {
        let out = scrub_pii("Call +65 9123 4567 to reschedule.");
        assert!(out.contains("[REDACTED-PHONE]"));
        assert!(!out.contains("9123"));
    }

    #[test]
    fn national_ids_are_scrubbed() {
        let out = scrub_pii("Patient S1234567D, male, 54.");
        assert!(out.contains("[REDACTED-ID]"));
        assert!(!out.contains("S1234567D"));
    }

    #[test]
    fn clinical_values_survive() {
        let out = scrub_pii("HbA1c 6.9%, LDL 4.1 mmol/L");
        assert_eq!(out, "HbA1c 6.9%, LDL 4.1 mmol/L");
    }
}
