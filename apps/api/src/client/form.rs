use std::collections::HashMap;

use chrono::NaiveDate;

use crate::application::messages::{self, constraint_message, violation_message};
use crate::application::rules::{Field, InputKind, FIELD_RULES, MIN_AGE_YEARS};
use crate::application::validation::{birth_date_window, parse_calendar_date, Violation};
use crate::client::constraints::{check, Control, ControlKind};

/// What the page shows for one field: the error container contents, the
/// `aria-invalid` flag and the visual error class.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldState {
    pub errors: Vec<String>,
    pub aria_invalid: bool,
    pub error_class: bool,
}

impl FieldState {
    fn render(&mut self, errors: Vec<String>) {
        let invalid = !errors.is_empty();
        self.errors = errors;
        self.aria_invalid = invalid;
        self.error_class = invalid;
    }
}

/// Result of the submit-time pass over the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitCheck {
    Valid,
    /// Submission is blocked; `focus` names the first invalid control.
    Invalid { focus: String },
}

/// Headless model of the application form: controls, their current values and
/// what the page displays for each of them.
#[derive(Debug, Clone)]
pub struct FormModel {
    controls: Vec<Control>,
    values: HashMap<String, String>,
    checked: HashMap<String, bool>,
    custom: HashMap<String, String>,
    states: HashMap<String, FieldState>,
    today: NaiveDate,
}

impl FormModel {
    pub fn new(controls: Vec<Control>, today: NaiveDate) -> Self {
        Self {
            controls,
            values: HashMap::new(),
            checked: HashMap::new(),
            custom: HashMap::new(),
            states: HashMap::new(),
            today,
        }
    }

    /// The application form, built from the shared field rules so the client
    /// checks the same limits and options the server enforces.
    pub fn application(today: NaiveDate) -> Self {
        let (earliest, _) = birth_date_window(today);
        let controls = FIELD_RULES
            .iter()
            .map(|rule| {
                let kind = match rule.input {
                    InputKind::Text => ControlKind::Text,
                    InputKind::Date => ControlKind::Date,
                    InputKind::Email => ControlKind::Email,
                    InputKind::Tel => ControlKind::Tel,
                    InputKind::Select => ControlKind::Select,
                    InputKind::Textarea => ControlKind::Textarea,
                };
                let mut control = Control::new(rule.name, kind)
                    .required(rule.required)
                    .max_length(rule.max_length)
                    .options(rule.options.iter().copied());
                if let Some(pattern) = rule.pattern {
                    control = control.pattern(pattern, rule.title);
                }
                if rule.field == Field::BirthDate {
                    control = control.min(earliest.to_string());
                }
                control
            })
            .collect();
        Self::new(controls, today)
    }

    pub fn controls(&self) -> &[Control] {
        &self.controls
    }

    pub fn set_value(&mut self, name: &str, value: impl Into<String>) {
        self.values.insert(name.to_string(), value.into());
    }

    pub fn set_checked(&mut self, name: &str, checked: bool) {
        self.checked.insert(name.to_string(), checked);
    }

    pub fn value(&self, name: &str) -> &str {
        self.values.get(name).map(String::as_str).unwrap_or("")
    }

    pub fn state(&self, name: &str) -> FieldState {
        self.states.get(name).cloned().unwrap_or_default()
    }

    /// Custom-validity hook; an empty message clears it.
    pub fn set_custom_validity(&mut self, name: &str, message: &str) {
        if message.is_empty() {
            self.custom.remove(name);
        } else {
            self.custom.insert(name.to_string(), message.to_string());
        }
    }

    fn control(&self, name: &str) -> Option<&Control> {
        self.controls.iter().find(|c| c.name == name)
    }

    /// Runs every check for one control, renders its messages and updates the
    /// accessibility flag. Unknown names are treated as valid.
    pub fn validate_field(&mut self, name: &str) -> bool {
        if name == Field::BirthDate.form_key() {
            let message = birth_date_custom_validity(self.value(name), self.today);
            self.set_custom_validity(name, message.as_deref().unwrap_or(""));
        }

        let Some(control) = self.control(name) else {
            return true;
        };
        let violations = check(
            control,
            self.value(name),
            self.checked.get(name).copied().unwrap_or(false),
            self.custom.get(name).map(String::as_str),
        );
        let errors: Vec<String> = violations.iter().map(constraint_message).collect();
        let valid = errors.is_empty();

        self.states
            .entry(name.to_string())
            .or_default()
            .render(errors);
        valid
    }

    /// Blur: only required controls inside the tracked form are validated.
    /// Returns `None` when the event is ignored.
    pub fn on_blur(&mut self, name: &str, within_form: bool) -> Option<bool> {
        let required = self.control(name)?.required;
        if !within_form || !required {
            return None;
        }
        Some(self.validate_field(name))
    }

    /// Change: toggles and selects always validate; text-like controls only once
    /// they hold something besides whitespace.
    pub fn on_change(&mut self, name: &str) -> Option<bool> {
        let control = self.control(name)?;
        if !control.required {
            return None;
        }
        let always = control.kind.is_toggle() || control.kind == ControlKind::Select;
        if !always && self.value(name).trim().is_empty() {
            return None;
        }
        Some(self.validate_field(name))
    }

    /// Submit: every required control is validated, plus optional controls that
    /// hold a value so their limits are checked before the round-trip.
    pub fn on_submit(&mut self) -> SubmitCheck {
        let names: Vec<String> = self
            .controls
            .iter()
            .filter(|c| c.required || !self.value(&c.name).is_empty())
            .map(|c| c.name.clone())
            .collect();

        let mut first_invalid = None;
        for name in names {
            if !self.validate_field(&name) && first_invalid.is_none() {
                first_invalid = Some(name);
            }
        }

        match first_invalid {
            Some(focus) => SubmitCheck::Invalid { focus },
            None => SubmitCheck::Valid,
        }
    }

    /// Name/value pairs as the browser would submit them. Unchecked toggles are omitted.
    pub fn serialize(&self) -> Vec<(String, String)> {
        self.controls
            .iter()
            .filter_map(|control| {
                if control.kind.is_toggle() {
                    let checked = self.checked.get(&control.name).copied().unwrap_or(false);
                    checked.then(|| {
                        let value = self.values.get(&control.name).cloned();
                        (control.name.clone(), value.unwrap_or_else(|| "on".to_string()))
                    })
                } else {
                    Some((control.name.clone(), self.value(&control.name).to_string()))
                }
            })
            .collect()
    }

    /// Clears values, custom validity and every rendered error.
    pub fn reset(&mut self) {
        self.values.clear();
        self.checked.clear();
        self.custom.clear();
        self.states.clear();
    }
}

/// The one rule the browser cannot express natively: the date must not be in
/// the future and the applicant must be of age. Unparseable values are left to
/// the native checks.
pub fn birth_date_custom_validity(value: &str, today: NaiveDate) -> Option<String> {
    let date = parse_calendar_date(value)?;
    if date > today {
        return Some(messages::BIRTH_DATE_IN_FUTURE.to_string());
    }
    let (_, latest) = birth_date_window(today);
    if date > latest {
        return Some(violation_message(
            Field::BirthDate,
            &Violation::TooYoung {
                min_age: MIN_AGE_YEARS,
            },
        ));
    }
    None
}
