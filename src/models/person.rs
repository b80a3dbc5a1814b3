use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::jwt::Subject;

pub const DEFAULT_AVATAR: &str = "/avatar.png";
const PLACEHOLDER_EMAIL_DOMAIN: &str = "@email.com";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PersonRole {
    Admin,
    Professor,
    Student,
    Other(String),
}

impl From<String> for PersonRole {
    fn from(value: String) -> Self {
        match value.to_ascii_uppercase().as_str() {
            "ADMIN" => PersonRole::Admin,
            "PROFESSOR" => PersonRole::Professor,
            "STUDENT" => PersonRole::Student,
            _ => PersonRole::Other(value),
        }
    }
}

impl From<PersonRole> for String {
    fn from(role: PersonRole) -> Self {
        role.to_string()
    }
}

impl fmt::Display for PersonRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersonRole::Admin => f.write_str("ADMIN"),
            PersonRole::Professor => f.write_str("PROFESSOR"),
            PersonRole::Student => f.write_str("STUDENT"),
            PersonRole::Other(other) => f.write_str(other),
        }
    }
}

/// Record returned by `GET /api/person/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: Subject,
    pub name: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub cpf: String,
    #[serde(default)]
    pub birth_date: String,
    #[serde(default)]
    pub profile_url: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub person_code: String,
    pub role: PersonRole,
}

/// What the avatar menu shows for the signed-in person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileSummary {
    pub name: String,
    /// Placeholder until the profile service exposes a real address.
    pub email: String,
    pub image: String,
}

fn placeholder_email(name: &str) -> String {
    let local: String = name
        .to_lowercase()
        .chars()
        .map(|c| if c.is_whitespace() { '.' } else { c })
        .collect();
    local + PLACEHOLDER_EMAIL_DOMAIN
}

impl From<&Person> for ProfileSummary {
    fn from(person: &Person) -> Self {
        let url = person.profile_url.trim();
        Self {
            name: person.name.clone(),
            email: placeholder_email(&person.name),
            image: if url.is_empty() {
                DEFAULT_AVATAR.to_string()
            } else {
                url.to_string()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn person_from_profile_service() {
        let person: Person = serde_json::from_value(json!({
            "id": "7",
            "name": "Ana Souza",
            "phoneNumber": "31999999999",
            "cpf": "000.000.000-00",
            "birthDate": "2001-04-02",
            "profileUrl": "",
            "description": "",
            "personCode": "A7",
            "role": "professor"
        }))
        .unwrap();

        assert_eq!(person.id, Subject::Text("7".into()));
        assert_eq!(person.role, PersonRole::Professor);

        let summary = ProfileSummary::from(&person);
        assert_eq!(summary.image, DEFAULT_AVATAR);
        assert_eq!(summary.name, "Ana Souza");
        assert_eq!(summary.email, "ana.souza@email.com");
    }

    #[test]
    fn placeholder_email_replaces_each_whitespace() {
        assert_eq!(placeholder_email("Maria  da\tSilva"), "maria..da.silva@email.com");
        assert_eq!(placeholder_email("Zé"), "zé@email.com");
    }

    #[test]
    fn unknown_roles_round_trip_verbatim() {
        let role: PersonRole = serde_json::from_value(json!("COORDINATOR")).unwrap();
        assert_eq!(role, PersonRole::Other("COORDINATOR".into()));
        assert_eq!(serde_json::to_value(&role).unwrap(), json!("COORDINATOR"));
    }
}
