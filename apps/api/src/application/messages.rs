//! User-facing text. Detection lives in `validation` and `client::constraints`;
//! this module only turns structured violations into localized strings.

use crate::application::rules::Field;
use crate::application::validation::Violation;
use crate::client::constraints::ConstraintViolation;
use crate::client::constraints::ControlKind;

pub const VALIDATION_ERROR_TYPE: &str = "Ошибка валидации";
pub const SUBMISSION_SAVED: &str = "Заявка успешно сохранена!";
pub const SERVER_ERROR: &str = "Ошибка сервера. Попробуйте позже";
pub const UNEXPECTED_ERROR: &str = "Непредвиденная ошибка";
pub const METHOD_NOT_ALLOWED: &str = "Метод не поддерживается. Используйте POST.";

pub const FORM_SUBMITTED: &str = "Форма успешно отправлена!";
pub const SUBMISSION_FAILED: &str = "Ошибка при отправке формы";
pub const CONNECTION_FAILED: &str = "Ошибка соединения с сервером";

pub const BIRTH_DATE_IN_FUTURE: &str = "Дата рождения не может быть в будущем";

pub fn violation_message(field: Field, violation: &Violation) -> String {
    let label = field.label();
    match violation {
        Violation::Required => format!("Поле \"{label}\" обязательное"),
        Violation::TooLong { max } => {
            format!("Поле \"{label}\" не должно превышать {max} символов")
        }
        Violation::InvalidDate => {
            "Некорректный формат даты рождения. Используйте ГГГГ-ММ-ДД".to_string()
        }
        Violation::TooOld { earliest } => format!(
            "Дата рождения не может быть раньше {}",
            earliest.format("%Y-%m-%d")
        ),
        Violation::TooYoung { min_age } => format!("Вам должно быть не менее {min_age} лет"),
        Violation::InvalidEmail => "Некорректный email адрес".to_string(),
        Violation::PhonePrefix => "Телефон должен начинаться с +375 или +7".to_string(),
        Violation::PhoneDigits {
            country_code,
            digits,
        } => format!("Для {country_code} требуется {digits} цифр после кода"),
        Violation::NotAllowed => format!("Некорректное значение поля \"{label}\""),
    }
}

pub fn constraint_message(violation: &ConstraintViolation) -> String {
    match violation {
        ConstraintViolation::ValueMissing => "Пожалуйста, заполните это поле".to_string(),
        ConstraintViolation::PatternMismatch { title } => title
            .clone()
            .unwrap_or_else(|| "Данные не в правильном формате".to_string()),
        ConstraintViolation::TooShort { min_length } => format!(
            "Значение слишком короткое, минимальное количество символов — {min_length}"
        ),
        ConstraintViolation::TooLong { max_length } => format!(
            "Значение слишком длинное, максимальное количество символов — {max_length}"
        ),
        ConstraintViolation::TypeMismatch { kind } => match kind {
            ControlKind::Email => "Пожалуйста, введите правильный email адрес".to_string(),
            ControlKind::Url => "Пожалуйста, введите правильный URL адрес".to_string(),
            _ => "Неверный формат данных".to_string(),
        },
        ConstraintViolation::RangeOverflow { max } => {
            format!("Значение не может быть больше {max}")
        }
        ConstraintViolation::RangeUnderflow { min } => {
            format!("Значение не может быть меньше {min}")
        }
        ConstraintViolation::StepMismatch { step } => {
            format!("Значение должно быть кратно {step}")
        }
        ConstraintViolation::BadInput => "Неверное значение".to_string(),
        ConstraintViolation::CustomError { message } => {
            if message.is_empty() {
                "Ошибка валидации".to_string()
            } else {
                message.clone()
            }
        }
    }
}
