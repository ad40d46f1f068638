//! Browser constraint validation, modelled as data.
//!
//! A `Control` describes one form input the way its HTML attributes would
//! (`required`, `minlength`, `maxlength`, `pattern`, `min`, `max`, `step`, type).
//! `check` returns every constraint-violation category the current value trips,
//! in the order the browser's `ValidityState` lists them.

use chrono::NaiveDate;
use regex::Regex;
use serde::Serialize;
use tracing::warn;

use crate::application::validation::{is_valid_email, parse_calendar_date};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlKind {
    Text,
    Email,
    Url,
    Tel,
    Date,
    Number,
    Textarea,
    Select,
    Checkbox,
    Radio,
}

impl ControlKind {
    /// Checkbox and radio controls: validity depends on `checked`, not on text.
    pub fn is_toggle(self) -> bool {
        matches!(self, ControlKind::Checkbox | ControlKind::Radio)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "violation", rename_all = "snake_case")]
pub enum ConstraintViolation {
    ValueMissing,
    PatternMismatch { title: Option<String> },
    TooShort { min_length: usize },
    TooLong { max_length: usize },
    TypeMismatch { kind: ControlKind },
    RangeOverflow { max: String },
    RangeUnderflow { min: String },
    StepMismatch { step: String },
    BadInput,
    CustomError { message: String },
}

#[derive(Debug, Clone)]
pub struct Control {
    pub name: String,
    pub kind: ControlKind,
    pub required: bool,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<Regex>,
    pub title: Option<String>,
    pub min: Option<String>,
    pub max: Option<String>,
    pub step: Option<f64>,
    pub options: Vec<String>,
}

impl Control {
    pub fn new(name: impl Into<String>, kind: ControlKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: false,
            min_length: None,
            max_length: None,
            pattern: None,
            title: None,
            min: None,
            max: None,
            step: None,
            options: Vec::new(),
        }
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn min_length(mut self, len: usize) -> Self {
        self.min_length = Some(len);
        self
    }

    pub fn max_length(mut self, len: usize) -> Self {
        self.max_length = Some(len);
        self
    }

    /// Like the HTML attribute, the pattern must match the whole value.
    /// An invalid pattern is ignored, as browsers do.
    pub fn pattern(mut self, source: &str, title: Option<&str>) -> Self {
        match Regex::new(&format!("^(?:{source})$")) {
            Ok(re) => self.pattern = Some(re),
            Err(e) => warn!("Ignoring invalid pattern on '{}': {e}", self.name),
        }
        self.title = title.map(str::to_string);
        self
    }

    pub fn min(mut self, min: impl Into<String>) -> Self {
        self.min = Some(min.into());
        self
    }

    pub fn max(mut self, max: impl Into<String>) -> Self {
        self.max = Some(max.into());
        self
    }

    pub fn step(mut self, step: f64) -> Self {
        self.step = Some(step);
        self
    }

    pub fn options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }
}

/// Evaluates a control against its value. `custom` is the message set through
/// the custom-validity hook, if any.
pub fn check(
    control: &Control,
    value: &str,
    checked: bool,
    custom: Option<&str>,
) -> Vec<ConstraintViolation> {
    let mut violations = Vec::new();

    if control.kind.is_toggle() {
        if control.required && !checked {
            violations.push(ConstraintViolation::ValueMissing);
        }
        push_custom(&mut violations, custom);
        return violations;
    }

    if value.is_empty() {
        if control.required {
            violations.push(ConstraintViolation::ValueMissing);
        }
        push_custom(&mut violations, custom);
        return violations;
    }

    if let Some(re) = &control.pattern {
        if !re.is_match(value) {
            violations.push(ConstraintViolation::PatternMismatch {
                title: control.title.clone(),
            });
        }
    }

    let len = value.chars().count();
    if let Some(min_length) = control.min_length {
        if len < min_length {
            violations.push(ConstraintViolation::TooShort { min_length });
        }
    }
    if let Some(max_length) = control.max_length {
        if len > max_length {
            violations.push(ConstraintViolation::TooLong { max_length });
        }
    }

    let type_ok = match control.kind {
        ControlKind::Email => is_valid_email(value),
        ControlKind::Url => reqwest::Url::parse(value).is_ok(),
        _ => true,
    };
    if !type_ok {
        violations.push(ConstraintViolation::TypeMismatch { kind: control.kind });
    }

    match control.kind {
        ControlKind::Number => check_number(control, value, &mut violations),
        ControlKind::Date => check_date(control, value, &mut violations),
        ControlKind::Select => {
            if !control.options.is_empty() && !control.options.iter().any(|o| o == value) {
                violations.push(ConstraintViolation::BadInput);
            }
        }
        _ => {}
    }

    push_custom(&mut violations, custom);
    violations
}

fn push_custom(violations: &mut Vec<ConstraintViolation>, custom: Option<&str>) {
    if let Some(message) = custom.filter(|m| !m.is_empty()) {
        violations.push(ConstraintViolation::CustomError {
            message: message.to_string(),
        });
    }
}

fn check_number(control: &Control, value: &str, violations: &mut Vec<ConstraintViolation>) {
    let Ok(number) = value.trim().parse::<f64>() else {
        violations.push(ConstraintViolation::BadInput);
        return;
    };

    let max = control.max.as_deref().and_then(|m| m.parse::<f64>().ok());
    let min = control.min.as_deref().and_then(|m| m.parse::<f64>().ok());
    if let (Some(max), Some(raw)) = (max, &control.max) {
        if number > max {
            violations.push(ConstraintViolation::RangeOverflow { max: raw.clone() });
        }
    }
    if let (Some(min), Some(raw)) = (min, &control.min) {
        if number < min {
            violations.push(ConstraintViolation::RangeUnderflow { min: raw.clone() });
        }
    }
    if let Some(step) = control.step.filter(|s| *s > 0.0) {
        let offset = (number - min.unwrap_or(0.0)) / step;
        if (offset - offset.round()).abs() > 1e-9 {
            violations.push(ConstraintViolation::StepMismatch {
                step: step.to_string(),
            });
        }
    }
}

fn check_date(control: &Control, value: &str, violations: &mut Vec<ConstraintViolation>) {
    let Some(date) = parse_calendar_date(value) else {
        violations.push(ConstraintViolation::BadInput);
        return;
    };

    let bound = |raw: &Option<String>| -> Option<NaiveDate> {
        raw.as_deref().and_then(parse_calendar_date)
    };
    if let Some(max) = bound(&control.max) {
        if date > max {
            violations.push(ConstraintViolation::RangeOverflow {
                max: max.to_string(),
            });
        }
    }
    if let Some(min) = bound(&control.min) {
        if date < min {
            violations.push(ConstraintViolation::RangeUnderflow {
                min: min.to_string(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(name: &str) -> Control {
        Control::new(name, ControlKind::Text)
    }

    #[test]
    fn test_required_empty_is_only_value_missing() {
        let control = text("firstName").required(true).min_length(2).pattern("[A-Z].*", None);
        assert_eq!(
            check(&control, "", false, None),
            vec![ConstraintViolation::ValueMissing]
        );
    }

    #[test]
    fn test_optional_empty_is_valid() {
        let control = text("patronymic").max_length(50);
        assert!(check(&control, "", false, None).is_empty());
    }

    #[test]
    fn test_length_limits_count_characters() {
        let control = text("name").min_length(2).max_length(3);
        assert_eq!(
            check(&control, "Ж", false, None),
            vec![ConstraintViolation::TooShort { min_length: 2 }]
        );
        assert!(check(&control, "Жжж", false, None).is_empty());
        assert_eq!(
            check(&control, "Жжжж", false, None),
            vec![ConstraintViolation::TooLong { max_length: 3 }]
        );
    }

    #[test]
    fn test_pattern_must_match_whole_value() {
        let control = text("code").pattern(r"\d{3}", Some("Три цифры"));
        assert!(check(&control, "123", false, None).is_empty());
        assert_eq!(
            check(&control, "1234", false, None),
            vec![ConstraintViolation::PatternMismatch {
                title: Some("Три цифры".to_string())
            }]
        );
    }

    #[test]
    fn test_invalid_pattern_is_ignored() {
        let control = text("code").pattern("(", None);
        assert!(control.pattern.is_none());
        assert!(check(&control, "anything", false, None).is_empty());
    }

    #[test]
    fn test_type_mismatch_email_and_url() {
        let email = Control::new("email", ControlKind::Email);
        assert_eq!(
            check(&email, "not-an-email", false, None),
            vec![ConstraintViolation::TypeMismatch {
                kind: ControlKind::Email
            }]
        );
        let url = Control::new("site", ControlKind::Url);
        assert!(check(&url, "https://example.com", false, None).is_empty());
        assert_eq!(check(&url, "example dot com", false, None).len(), 1);
    }

    #[test]
    fn test_number_range_and_step() {
        let control = Control::new("years", ControlKind::Number)
            .min("0")
            .max("10")
            .step(2.0);
        assert!(check(&control, "4", false, None).is_empty());
        assert_eq!(
            check(&control, "12", false, None),
            vec![ConstraintViolation::RangeOverflow { max: "10".into() }]
        );
        assert_eq!(
            check(&control, "-2", false, None),
            vec![ConstraintViolation::RangeUnderflow { min: "0".into() }]
        );
        assert_eq!(
            check(&control, "3", false, None),
            vec![ConstraintViolation::StepMismatch { step: "2".into() }]
        );
        assert_eq!(
            check(&control, "four", false, None),
            vec![ConstraintViolation::BadInput]
        );
    }

    #[test]
    fn test_date_bounds_and_bad_input() {
        let control = Control::new("birthDate", ControlKind::Date).min("1906-10-16");
        assert!(check(&control, "1990-01-01", false, None).is_empty());
        assert_eq!(
            check(&control, "1900-01-01", false, None),
            vec![ConstraintViolation::RangeUnderflow {
                min: "1906-10-16".into()
            }]
        );
        assert_eq!(
            check(&control, "2001-02-29", false, None),
            vec![ConstraintViolation::BadInput]
        );
    }

    #[test]
    fn test_select_outside_options() {
        let control = Control::new("maritalStatus", ControlKind::Select)
            .required(true)
            .options(["Kawaler/Panna", "Wdowiec/Wdowa"]);
        assert!(check(&control, "Wdowiec/Wdowa", false, None).is_empty());
        assert_eq!(
            check(&control, "Married", false, None),
            vec![ConstraintViolation::BadInput]
        );
    }

    #[test]
    fn test_checkbox_uses_checked_state() {
        let control = Control::new("consent", ControlKind::Checkbox).required(true);
        assert_eq!(
            check(&control, "on", false, None),
            vec![ConstraintViolation::ValueMissing]
        );
        assert!(check(&control, "on", true, None).is_empty());
    }

    #[test]
    fn test_custom_error_is_reported_last() {
        let control = text("name").max_length(2);
        assert_eq!(
            check(&control, "abc", false, Some("нет")),
            vec![
                ConstraintViolation::TooLong { max_length: 2 },
                ConstraintViolation::CustomError {
                    message: "нет".into()
                },
            ]
        );
        assert!(check(&control, "ab", false, Some("")).is_empty());
    }
}
