//! Form validation for the configuration pages.
//!
//! Every configuration handler runs the same state machine: on POST, all
//! submitted variables are read, field validators run in a fixed order and
//! append (field, message) pairs to a [`FormValidation`], and only an empty
//! error list allows persistence. A non-empty list re-renders the form with
//! the submitted values and status 400. Warnings are collected separately and
//! never block persistence.
//!
//! Validators are pure functions of the submitted values plus read-only
//! external state; they must not mutate anything before all checks pass.

/// Characters permitted in a vehicle ID.
const VEHICLE_ID_CHARS: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Accumulated outcome of one form-processing pass: ordered field-tagged
/// errors and ordered warnings.
#[derive(Debug, Default)]
pub struct FormValidation {
    errors: Vec<(String, String)>,
    warnings: Vec<(String, String)>,
}

impl FormValidation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a validation error against a named field. The message may carry
    /// markup; dynamic parts must already be HTML-escaped by the caller.
    pub fn error(&mut self, field: &str, message: &str) {
        self.errors.push((field.to_string(), message.to_string()));
    }

    /// Record a non-blocking warning. `field` may be empty when the warning
    /// is not tied to one input.
    pub fn warn(&mut self, field: &str, message: &str) {
        self.warnings.push((field.to_string(), message.to_string()));
    }

    pub fn ok(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn errors(&self) -> &[(String, String)] {
        &self.errors
    }

    pub fn warnings(&self) -> &[(String, String)] {
        &self.warnings
    }

    /// Error summary fragment: an ordered list, each item tagged with its
    /// offending field name for client-side highlighting.
    pub fn render_errors(&self) -> String {
        let mut out = String::from("<p class=\"lead\">Error!</p><ul class=\"errorlist\">");
        for (field, message) in &self.errors {
            out.push_str(&format!(
                "<li data-input=\"{}\">{}</li>",
                crate::escape_html(field),
                message
            ));
        }
        out.push_str("</ul>");
        out
    }

    /// Warning summary fragment, rendered after the success alert.
    pub fn render_warnings(&self) -> String {
        let mut out = String::from("<p class=\"lead\">Warning:</p><ul class=\"warnlist\">");
        for (field, message) in &self.warnings {
            if field.is_empty() {
                out.push_str(&format!("<li>{}</li>", message));
            } else {
                out.push_str(&format!(
                    "<li data-input=\"{}\">{}</li>",
                    crate::escape_html(field),
                    message
                ));
            }
        }
        out.push_str("</ul>");
        out
    }
}

/// Checkbox convention: the submitted value `"yes"` means true, anything else
/// (including absence) means false.
pub fn checkbox(value: &str) -> bool {
    value == "yes"
}

fn all_digits(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}

/// Validate a TCP port field. Empty means "leave unset/default"; a non-empty
/// value must be all digits and within 0..=65535. Out-of-range values are an
/// error, never clamped. Produces at most one error entry per field.
pub fn check_port(v: &mut FormValidation, field: &str, value: &str) {
    if value.is_empty() {
        return;
    }
    let in_range = all_digits(value)
        && value.parse::<u32>().map(|p| p <= 65535).unwrap_or(false);
    if !in_range {
        v.error(
            field,
            "Port must be an integer value in the range 0…65535",
        );
    }
}

/// Validate an update interval field. Empty means default; a non-empty value
/// must be an integer of at least 1 second.
pub fn check_interval(v: &mut FormValidation, field: &str, value: &str, what: &str) {
    if value.is_empty() {
        return;
    }
    if value.parse::<i64>().map(|n| n < 1).unwrap_or(true) {
        v.error(
            field,
            &format!("Update interval ({}) must be at least 1 second", what),
        );
    }
}

/// Validate the vehicle ID: non-empty, upper case letters and digits only.
/// A value with any other character anywhere yields one error for the whole
/// field.
pub fn check_vehicle_id(v: &mut FormValidation, field: &str, value: &str) {
    if value.is_empty() {
        v.error(field, "Vehicle ID must not be empty");
    }
    if value.chars().any(|c| !VEHICLE_ID_CHARS.contains(c)) {
        v.error(
            field,
            "Vehicle ID may only contain upper case letters and digits",
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_acceptance_matrix() {
        for ok in ["", "0", "65535", "6867"] {
            let mut v = FormValidation::new();
            check_port(&mut v, "port", ok);
            assert!(v.ok(), "{:?} should be accepted", ok);
        }
        for bad in ["65536", "-1", "abc", "1 2", "99999999999999999999"] {
            let mut v = FormValidation::new();
            check_port(&mut v, "port", bad);
            assert_eq!(v.errors().len(), 1, "{:?} should yield one error", bad);
            assert_eq!(v.errors()[0].0, "port");
        }
    }

    #[test]
    fn test_interval_validation() {
        for ok in ["", "1", "60", "600"] {
            let mut v = FormValidation::new();
            check_interval(&mut v, "updatetime_idle", ok, "idle");
            assert!(v.ok(), "{:?} should be accepted", ok);
        }
        for bad in ["0", "-5", "abc"] {
            let mut v = FormValidation::new();
            check_interval(&mut v, "updatetime_idle", bad, "idle");
            assert_eq!(v.errors().len(), 1);
            assert_eq!(v.errors()[0].0, "updatetime_idle");
        }
    }

    #[test]
    fn test_vehicle_id_charset() {
        let mut v = FormValidation::new();
        check_vehicle_id(&mut v, "vehicleid", "MYCAR01");
        assert!(v.ok());

        // lowercase + space: still exactly one charset error for the field
        let mut v = FormValidation::new();
        check_vehicle_id(&mut v, "vehicleid", "my car");
        assert_eq!(v.errors().len(), 1);
        assert_eq!(v.errors()[0].0, "vehicleid");

        // empty: the emptiness error only
        let mut v = FormValidation::new();
        check_vehicle_id(&mut v, "vehicleid", "");
        assert_eq!(v.errors().len(), 1);
        assert!(v.errors()[0].1.contains("must not be empty"));
    }

    #[test]
    fn test_checkbox_convention() {
        assert!(checkbox("yes"));
        assert!(!checkbox(""));
        assert!(!checkbox("no"));
        assert!(!checkbox("on"));
    }

    #[test]
    fn test_errors_keep_submission_order() {
        let mut v = FormValidation::new();
        check_port(&mut v, "port", "abc");
        check_interval(&mut v, "updatetime_connected", "0", "connected");
        check_interval(&mut v, "updatetime_idle", "-1", "idle");
        let fields: Vec<&str> = v.errors().iter().map(|(f, _)| f.as_str()).collect();
        assert_eq!(fields, vec!["port", "updatetime_connected", "updatetime_idle"]);
    }

    #[test]
    fn test_error_summary_markup() {
        let mut v = FormValidation::new();
        v.error("port", "Port must be an integer value in the range 0…65535");
        let html = v.render_errors();
        assert!(html.starts_with("<p class=\"lead\">Error!</p><ul class=\"errorlist\">"));
        assert!(html.contains("<li data-input=\"port\">"));
        assert!(html.ends_with("</ul>"));
    }

    #[test]
    fn test_warnings_do_not_block() {
        let mut v = FormValidation::new();
        v.warn("", "SSID <code>Guest</code> has no password");
        assert!(v.ok());
        assert!(v.has_warnings());
        assert!(v.render_warnings().contains("<li>SSID <code>Guest</code> has no password</li>"));
    }
}
