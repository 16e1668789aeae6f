use serde::{Deserialize, Deserializer, Serialize};

/// Credential record kept in the `registeredUsers` registry.
/// Never handed to callers outside the session store.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password: String,
}

impl Credential {
    /// Exact, case-sensitive match on both email and password.
    pub fn matches(&self, email: &str, password: &str) -> bool {
        self.email == email && self.password == password
    }

    /// Password-stripped public projection.
    pub fn to_admin(&self) -> Admin {
        Admin {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

/// Session identity of the logged-in administrator.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Admin {
    pub id: String,
    pub name: String,
    pub email: String,
}

impl Admin {
    /// Opaque session token persisted under the `token` key.
    pub fn session_token(&self) -> String {
        format!("token-{}", self.id)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EmployeeStatus {
    Active,
    Inactive,
}

impl std::fmt::Display for EmployeeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmployeeStatus::Active => f.write_str("active"),
            EmployeeStatus::Inactive => f.write_str("inactive"),
        }
    }
}

impl std::str::FromStr for EmployeeStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(EmployeeStatus::Active),
            "inactive" => Ok(EmployeeStatus::Inactive),
            other => Err(format!("unknown status `{other}` (expected active or inactive)")),
        }
    }
}

/// Employee record as persisted under the `employees` key.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub department: String,
    pub role: String,
    pub status: EmployeeStatus,
    /// Calendar date, `YYYY-MM-DD`.
    pub date_joined: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl Employee {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Shallow merge: every field present in the patch overwrites the current one.
    pub fn apply(&mut self, patch: &EmployeePatch) {
        if let Some(v) = &patch.first_name {
            self.first_name = v.clone();
        }
        if let Some(v) = &patch.last_name {
            self.last_name = v.clone();
        }
        if let Some(v) = &patch.email {
            self.email = v.clone();
        }
        if let Some(v) = &patch.phone {
            self.phone = v.clone();
        }
        if let Some(v) = &patch.department {
            self.department = v.clone();
        }
        if let Some(v) = &patch.role {
            self.role = v.clone();
        }
        if let Some(v) = patch.status {
            self.status = v;
        }
        if let Some(v) = &patch.date_joined {
            self.date_joined = v.clone();
        }
        if let Some(v) = &patch.avatar {
            self.avatar = v.clone();
        }
    }
}

/// Fields of a new employee; the id is minted by the roster store.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewEmployee {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub department: String,
    pub role: String,
    pub status: EmployeeStatus,
    pub date_joined: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl NewEmployee {
    pub fn into_employee(self, id: String) -> Employee {
        Employee {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            department: self.department,
            role: self.role,
            status: self.status,
            date_joined: self.date_joined,
            avatar: self.avatar,
        }
    }
}

/// Partial update. The id is not patchable.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EmployeePatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub department: Option<String>,
    pub role: Option<String>,
    pub status: Option<EmployeeStatus>,
    pub date_joined: Option<String>,
    /// `Some(None)` (JSON `null`) clears the avatar; an absent field keeps it.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present"
    )]
    pub avatar: Option<Option<String>>,
}

/// Wraps whatever the field holds, `null` included, so that a present field
/// is distinguishable from a missing one.
fn present<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

impl EmployeePatch {
    pub fn status(status: EmployeeStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Employee {
        Employee {
            id: "1".to_string(),
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            email: "john.doe@company.com".to_string(),
            phone: "+1 (555) 123-4567".to_string(),
            department: "Engineering".to_string(),
            role: "Senior Developer".to_string(),
            status: EmployeeStatus::Active,
            date_joined: "2023-01-15".to_string(),
            avatar: None,
        }
    }

    #[test]
    fn test_employee_wire_format_is_camel_case() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["firstName"], "John");
        assert_eq!(json["dateJoined"], "2023-01-15");
        assert_eq!(json["status"], "active");
        // Absent avatar is omitted, not written as null
        assert!(json.get("avatar").is_none());
    }

    #[test]
    fn test_patch_only_touches_given_fields() {
        let mut employee = sample();
        employee.apply(&EmployeePatch::status(EmployeeStatus::Inactive));

        let mut expected = sample();
        expected.status = EmployeeStatus::Inactive;
        assert_eq!(employee, expected);
    }

    #[test]
    fn test_patch_sets_and_clears_avatar() {
        let mut employee = sample();
        let set: EmployeePatch =
            serde_json::from_str(r#"{"avatar": "https://example.com/john.png"}"#).unwrap();
        employee.apply(&set);
        assert_eq!(employee.avatar.as_deref(), Some("https://example.com/john.png"));

        // Missing field keeps the avatar
        let untouched: EmployeePatch = serde_json::from_str(r#"{"role": "Lead"}"#).unwrap();
        assert_eq!(untouched.avatar, None);
        employee.apply(&untouched);
        assert_eq!(employee.avatar.as_deref(), Some("https://example.com/john.png"));

        let clear: EmployeePatch = serde_json::from_str(r#"{"avatar": null}"#).unwrap();
        assert_eq!(clear.avatar, Some(None));
        assert!(!clear.is_empty());
        employee.apply(&clear);
        assert_eq!(employee.avatar, None);
        assert_eq!(serde_json::to_value(&clear).unwrap()["avatar"], serde_json::Value::Null);
    }

    #[test]
    fn test_credential_match_is_exact() {
        let credential = Credential {
            id: "42".to_string(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "secret1".to_string(),
        };
        assert!(credential.matches("ada@example.com", "secret1"));
        assert!(!credential.matches("Ada@example.com", "secret1"));
        assert!(!credential.matches("ada@example.com", "Secret1"));
        assert_eq!(credential.to_admin().session_token(), "token-42");
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("inactive".parse::<EmployeeStatus>(), Ok(EmployeeStatus::Inactive));
        assert!("retired".parse::<EmployeeStatus>().is_err());
    }
}
