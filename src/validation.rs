//! Field rules applied by the input layer before anything reaches the stores.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex_lite::Regex;

use crate::auth::MIN_PASSWORD_LEN;
use crate::error::ValidationError;
use crate::models::{EmployeePatch, NewEmployee};

const EMAIL_PATTERN: &str = r"(?i)^[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}$";

/// Match email addresses.
static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(EMAIL_PATTERN).expect("email pattern compiles"));

fn required(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required(field));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    required("Email", email)?;
    if !EMAIL.is_match(email) {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(())
}

fn validate_date(date: &str) -> Result<(), ValidationError> {
    required("Date joined", date)?;
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| ValidationError::InvalidDate)
}

pub fn validate_login(email: &str, password: &str) -> Result<(), ValidationError> {
    validate_email(email)?;
    required("Password", password)
}

pub fn validate_registration(name: &str, email: &str, password: &str) -> Result<(), ValidationError> {
    required("Name", name)?;
    validate_email(email)?;
    required("Password", password)?;
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::TooShort {
            field: "Password",
            min: MIN_PASSWORD_LEN,
        });
    }
    Ok(())
}

pub fn validate_profile(name: &str, email: &str) -> Result<(), ValidationError> {
    required("Name", name)?;
    validate_email(email)
}

pub fn validate_new_employee(employee: &NewEmployee) -> Result<(), ValidationError> {
    required("First name", &employee.first_name)?;
    required("Last name", &employee.last_name)?;
    validate_email(&employee.email)?;
    required("Phone number", &employee.phone)?;
    required("Department", &employee.department)?;
    required("Role", &employee.role)?;
    validate_date(&employee.date_joined)
}

/// Same rules as a new employee, applied only to the fields being changed.
pub fn validate_patch(patch: &EmployeePatch) -> Result<(), ValidationError> {
    let text_fields = [
        ("First name", &patch.first_name),
        ("Last name", &patch.last_name),
        ("Phone number", &patch.phone),
        ("Department", &patch.department),
        ("Role", &patch.role),
    ];
    for (field, value) in text_fields {
        if let Some(value) = value {
            required(field, value)?;
        }
    }
    if let Some(email) = &patch.email {
        validate_email(email)?;
    }
    if let Some(date) = &patch.date_joined {
        validate_date(date)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EmployeeStatus;

    #[test]
    fn test_email_pattern() {
        assert!(validate_email("john.doe@company.com").is_ok());
        assert!(validate_email("JOHN+hr@Company.IO").is_ok());
        assert_eq!(validate_email(""), Err(ValidationError::Required("Email")));
        assert_eq!(validate_email("john@company"), Err(ValidationError::InvalidEmail));
        assert_eq!(validate_email("john company.com"), Err(ValidationError::InvalidEmail));
    }

    #[test]
    fn test_email_regex_compiles_and_is_anchored() {
        assert!(Regex::new(EMAIL_PATTERN).is_ok());
        assert!(EMAIL.is_match("grace@navy.mil"));
        assert!(!EMAIL.is_match("x grace@navy.mil"));
        assert!(!EMAIL.is_match("grace@navy.mil x"));
    }

    #[test]
    fn test_registration_password_length() {
        assert!(validate_registration("Ada", "ada@example.com", "secret").is_ok());
        assert_eq!(
            validate_registration("Ada", "ada@example.com", "12345"),
            Err(ValidationError::TooShort { field: "Password", min: 6 })
        );
        assert_eq!(
            validate_registration("  ", "ada@example.com", "secret"),
            Err(ValidationError::Required("Name"))
        );
    }

    #[test]
    fn test_new_employee_rules() {
        let mut employee = NewEmployee {
            first_name: "Grace".to_string(),
            last_name: "Hopper".to_string(),
            email: "grace@company.com".to_string(),
            phone: "+1 (555) 456-7890".to_string(),
            department: "Engineering".to_string(),
            role: "Staff Engineer".to_string(),
            status: EmployeeStatus::Active,
            date_joined: "2024-05-01".to_string(),
            avatar: None,
        };
        assert!(validate_new_employee(&employee).is_ok());

        employee.date_joined = "05/01/2024".to_string();
        assert_eq!(validate_new_employee(&employee), Err(ValidationError::InvalidDate));

        employee.date_joined = "2024-05-01".to_string();
        employee.role = String::new();
        assert_eq!(validate_new_employee(&employee), Err(ValidationError::Required("Role")));
    }

    #[test]
    fn test_patch_checks_only_present_fields() {
        assert!(validate_patch(&EmployeePatch::default()).is_ok());
        assert!(validate_patch(&EmployeePatch::status(EmployeeStatus::Inactive)).is_ok());

        let patch = EmployeePatch {
            email: Some("broken".to_string()),
            ..EmployeePatch::default()
        };
        assert_eq!(validate_patch(&patch), Err(ValidationError::InvalidEmail));

        let patch = EmployeePatch {
            last_name: Some(" ".to_string()),
            ..EmployeePatch::default()
        };
        assert_eq!(validate_patch(&patch), Err(ValidationError::Required("Last name")));
    }
}
