//! Field rules — the single definition of the application form.
//!
//! The server validator reads its limits from here, the client form model builds
//! its controls from here, and `GET /api/v1/applications/schema` serves the same
//! table to the browser. Changing a limit in one place changes it everywhere.

use serde::Serialize;

/// Every field of the application form, in the order errors are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    FirstName,
    LastName,
    Patronymic,
    BirthDate,
    Email,
    Phone,
    MaritalStatus,
    About,
}

impl Field {
    pub const ALL: [Field; 8] = [
        Field::FirstName,
        Field::LastName,
        Field::Patronymic,
        Field::BirthDate,
        Field::Email,
        Field::Phone,
        Field::MaritalStatus,
        Field::About,
    ];

    /// Key used in the submitted form body.
    pub fn form_key(self) -> &'static str {
        match self {
            Field::FirstName => "firstName",
            Field::LastName => "lastName",
            Field::Patronymic => "patronymic",
            Field::BirthDate => "birthDate",
            Field::Email => "email",
            Field::Phone => "phone",
            Field::MaritalStatus => "maritalStatus",
            Field::About => "about",
        }
    }

    pub fn from_form_key(key: &str) -> Option<Field> {
        Field::ALL.into_iter().find(|f| f.form_key() == key)
    }

    /// Human label, as printed next to the input.
    pub fn label(self) -> &'static str {
        match self {
            Field::FirstName => "Имя",
            Field::LastName => "Фамилия",
            Field::Patronymic => "Отчество",
            Field::BirthDate => "Дата рождения",
            Field::Email => "Email",
            Field::Phone => "Телефон",
            Field::MaritalStatus => "Семейное положение",
            Field::About => "О себе",
        }
    }

    pub fn rule(self) -> &'static FieldRule {
        &FIELD_RULES[self as usize]
    }
}

/// How the field is rendered and which native checks the browser applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    Text,
    Date,
    Email,
    Tel,
    Select,
    Textarea,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldRule {
    #[serde(skip)]
    pub field: Field,
    pub name: &'static str,
    pub label: &'static str,
    pub input: InputKind,
    pub required: bool,
    /// Limit in characters, not bytes.
    pub max_length: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<&'static str>,
    #[serde(skip_serializing_if = "no_options")]
    pub options: &'static [&'static str],
}

pub const NAME_MAX_LENGTH: usize = 50;
pub const EMAIL_MAX_LENGTH: usize = 50;
pub const PHONE_MAX_LENGTH: usize = 50;
pub const MARITAL_STATUS_MAX_LENGTH: usize = 30;
pub const ABOUT_MAX_LENGTH: usize = 1000;

pub const MIN_AGE_YEARS: u32 = 18;
pub const MAX_AGE_YEARS: u32 = 120;

pub const MARITAL_STATUSES: &[&str] = &[
    "Kawaler/Panna",
    "Żonaty/Zamężna",
    "Rozwiedziony/Rozwiedziona",
    "Wdowiec/Wdowa",
];

/// Browser-side approximation of the phone rule: a known country code followed
/// by ASCII digits and formatting. The server normalizes and counts digits.
pub const PHONE_PATTERN: &str = r"\+(?:375|7)[0-9\s()\-]{9,}";

const NO_OPTIONS: &[&str] = &[];

fn no_options(options: &&'static [&'static str]) -> bool {
    options.is_empty()
}

/// Indexed by `Field as usize`; keep in declaration order.
pub static FIELD_RULES: [FieldRule; 8] = [
    FieldRule {
        field: Field::FirstName,
        name: "firstName",
        label: "Имя",
        input: InputKind::Text,
        required: true,
        max_length: NAME_MAX_LENGTH,
        pattern: None,
        title: None,
        options: NO_OPTIONS,
    },
    FieldRule {
        field: Field::LastName,
        name: "lastName",
        label: "Фамилия",
        input: InputKind::Text,
        required: true,
        max_length: NAME_MAX_LENGTH,
        pattern: None,
        title: None,
        options: NO_OPTIONS,
    },
    FieldRule {
        field: Field::Patronymic,
        name: "patronymic",
        label: "Отчество",
        input: InputKind::Text,
        required: false,
        max_length: NAME_MAX_LENGTH,
        pattern: None,
        title: None,
        options: NO_OPTIONS,
    },
    FieldRule {
        field: Field::BirthDate,
        name: "birthDate",
        label: "Дата рождения",
        input: InputKind::Date,
        required: true,
        max_length: 10,
        pattern: None,
        title: None,
        options: NO_OPTIONS,
    },
    FieldRule {
        field: Field::Email,
        name: "email",
        label: "Email",
        input: InputKind::Email,
        required: false,
        max_length: EMAIL_MAX_LENGTH,
        pattern: None,
        title: None,
        options: NO_OPTIONS,
    },
    FieldRule {
        field: Field::Phone,
        name: "phone",
        label: "Телефон",
        input: InputKind::Tel,
        required: true,
        max_length: PHONE_MAX_LENGTH,
        pattern: Some(PHONE_PATTERN),
        title: Some("Номер в формате +375XXXXXXXXX или +7XXXXXXXXXX"),
        options: NO_OPTIONS,
    },
    FieldRule {
        field: Field::MaritalStatus,
        name: "maritalStatus",
        label: "Семейное положение",
        input: InputKind::Select,
        required: true,
        max_length: MARITAL_STATUS_MAX_LENGTH,
        pattern: None,
        title: None,
        options: MARITAL_STATUSES,
    },
    FieldRule {
        field: Field::About,
        name: "about",
        label: "О себе",
        input: InputKind::Textarea,
        required: false,
        max_length: ABOUT_MAX_LENGTH,
        pattern: None,
        title: None,
        options: NO_OPTIONS,
    },
];
