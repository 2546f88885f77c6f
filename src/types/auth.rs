//! Account forms and the authenticated user as handed over by the identity provider.

use super::common::DEFAULT_TIMEZONE;
use super::database::{ProfileInsert, ProfileUpdate};
use crate::schema::{ObjectSchema, Shape, StringFormat, StringSchema, object, string, url};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

const PASSWORD_MISMATCH: &str = "Passwords don't match";

fn email_address() -> StringSchema {
    string().format_with(StringFormat::Email, "Please enter a valid email address")
}

fn new_password() -> StringSchema {
    string().min_with(8, "Password must be at least 8 characters")
}

fn passwords_match(data: &Map<String, Value>) -> bool {
    data.get("password") == data.get("confirmPassword")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUp {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub first_name: String,
    pub last_name: String,
}

impl Shape for SignUp {
    fn schema() -> ObjectSchema {
        object()
            .field("email", email_address())
            .field("password", new_password())
            .field("confirmPassword", string())
            .field("firstName", string().min_with(1, "First name is required"))
            .field("lastName", string().min_with(1, "Last name is required"))
            .refine(passwords_match, "confirmPassword", PASSWORD_MISMATCH)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignIn {
    pub email: String,
    pub password: String,
}

impl Shape for SignIn {
    fn schema() -> ObjectSchema {
        object()
            .field("email", email_address())
            .field("password", string().min_with(1, "Password is required"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetPassword {
    pub email: String,
}

impl Shape for ResetPassword {
    fn schema() -> ObjectSchema {
        object().field("email", email_address())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePassword {
    pub password: String,
    pub confirm_password: String,
}

impl Shape for UpdatePassword {
    fn schema() -> ObjectSchema {
        object()
            .field("password", new_password())
            .field("confirmPassword", string())
            .refine(passwords_match, "confirmPassword", PASSWORD_MISMATCH)
    }
}

/// Settings form for the user's own profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileForm {
    pub first_name: String,
    pub last_name: String,
    pub timezone: String,
    #[serde(rename = "avatar_url", default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl Shape for ProfileForm {
    fn schema() -> ObjectSchema {
        object()
            .field("firstName", string().min_with(1, "First name is required"))
            .field("lastName", string().min_with(1, "Last name is required"))
            .with_default("timezone", string(), DEFAULT_TIMEZONE)
            .optional("avatar_url", url())
    }
}

impl ProfileForm {
    #[must_use]
    pub fn into_update(self, now: DateTime<Utc>) -> ProfileUpdate {
        ProfileUpdate {
            first_name: Some(self.first_name),
            last_name: Some(self.last_name),
            timezone: Some(self.timezone),
            avatar_url: self.avatar_url,
            updated_at: now,
        }
    }
}

/// Account record issued by the identity provider after sign-in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_confirmed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_sign_in_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub app_metadata: Map<String, Value>,
    /// Free-form data captured at sign-up (`first_name`, `last_name`, `timezone`)
    #[serde(default)]
    pub user_metadata: Map<String, Value>,
}

impl AuthUser {
    fn metadata_str(&self, key: &str) -> Option<&str> {
        self.user_metadata.get(key).and_then(Value::as_str)
    }

    #[must_use]
    pub fn first_name(&self) -> &str {
        self.metadata_str("first_name").unwrap_or_default()
    }

    #[must_use]
    pub fn last_name(&self) -> &str {
        self.metadata_str("last_name").unwrap_or_default()
    }

    #[must_use]
    pub fn timezone(&self) -> &str {
        self.metadata_str("timezone").unwrap_or(DEFAULT_TIMEZONE)
    }

    /// Profile row to create on first sign-in.
    #[must_use]
    pub fn profile_insert(&self) -> ProfileInsert {
        ProfileInsert {
            user_id: self.id,
            first_name: self.first_name().to_string(),
            last_name: self.last_name().to_string(),
            timezone: self.timezone().to_string(),
            avatar_url: self.metadata_str("avatar_url").map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
    pub token_type: String,
    pub user: AuthUser,
}

impl Session {
    /// Whether the access token has lapsed at `now`. Sessions without an expiry never lapse.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| now.timestamp() >= at)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::schema::IssueCode;
    use serde_json::json;

    fn sign_up(password: &str, confirm: &str) -> Value {
        json!({
            "email": "ada@example.com",
            "password": password,
            "confirmPassword": confirm,
            "firstName": "Ada",
            "lastName": "Lovelace"
        })
    }

    #[test]
    fn test_sign_up_password_mismatch() {
        let errors = SignUp::parse(&sign_up("abcdefgh", "abcdefghx")).unwrap_err();
        assert_eq!(errors.len(), 1);
        let issue = &errors.issues()[0];
        assert_eq!(issue.path.to_string(), "confirmPassword");
        assert_eq!(issue.code, IssueCode::Custom);
        assert_eq!(issue.message, "Passwords don't match");
    }

    #[test]
    fn test_sign_up_matching_passwords() {
        let form = SignUp::parse(&sign_up("abcdefgh", "abcdefgh")).unwrap();
        assert_eq!(form.confirm_password, "abcdefgh");
        assert_eq!(form.first_name, "Ada");
    }

    #[test]
    fn test_sign_up_field_messages() {
        let errors = SignUp::parse(&json!({
            "email": "not-an-email",
            "password": "short",
            "confirmPassword": "short",
            "firstName": "",
            "lastName": ""
        }))
        .unwrap_err();
        let messages = errors.field_messages();
        assert_eq!(messages["email"], vec!["Please enter a valid email address"]);
        assert_eq!(
            messages["password"],
            vec!["Password must be at least 8 characters"]
        );
        assert_eq!(messages["firstName"], vec!["First name is required"]);
        assert_eq!(messages["lastName"], vec!["Last name is required"]);
        // Member failures suppress the mismatch check
        assert!(!messages.contains_key("confirmPassword"));
    }

    #[test]
    fn test_sign_in_and_reset() {
        assert!(SignIn::parse(&json!({ "email": "ada@example.com", "password": "x" })).is_ok());
        let errors = SignIn::parse(&json!({ "email": "ada@example.com", "password": "" }))
            .unwrap_err();
        assert_eq!(errors.issues()[0].message, "Password is required");
        assert!(ResetPassword::parse(&json!({ "email": "ada@" })).is_err());
    }

    #[test]
    fn test_update_password_refinement() {
        let errors = UpdatePassword::parse(&json!({
            "password": "longenough",
            "confirmPassword": "different"
        }))
        .unwrap_err();
        assert_eq!(errors.for_field("confirmPassword").len(), 1);
    }

    #[test]
    fn test_profile_form_defaults_timezone() {
        let form = ProfileForm::parse(&json!({ "firstName": "Ada", "lastName": "L" })).unwrap();
        assert_eq!(form.timezone, DEFAULT_TIMEZONE);
        assert!(
            ProfileForm::parse(&json!({
                "firstName": "Ada",
                "lastName": "L",
                "avatar_url": "not a url"
            }))
            .is_err()
        );
    }

    #[test]
    fn test_auth_user_profile_insert() {
        let user: AuthUser = serde_json::from_value(json!({
            "id": Uuid::new_v4().to_string(),
            "email": "ada@example.com",
            "created_at": "2024-05-01T09:00:00Z",
            "updated_at": "2024-05-01T09:00:00Z",
            "user_metadata": { "first_name": "Ada" }
        }))
        .unwrap();
        let insert = user.profile_insert();
        assert_eq!(insert.first_name, "Ada");
        assert_eq!(insert.last_name, "");
        assert_eq!(insert.timezone, DEFAULT_TIMEZONE);
    }

    #[test]
    fn test_session_expiry() {
        let user: AuthUser = serde_json::from_value(json!({
            "id": Uuid::new_v4().to_string(),
            "email": "ada@example.com",
            "created_at": "2024-05-01T09:00:00Z",
            "updated_at": "2024-05-01T09:00:00Z"
        }))
        .unwrap();
        let now = Utc::now();
        let session = Session {
            access_token: "a".into(),
            refresh_token: "r".into(),
            expires_in: 3600,
            expires_at: Some(now.timestamp() - 1),
            token_type: "bearer".into(),
            user,
        };
        assert!(session.is_expired(now));
        assert!(!Session { expires_at: None, ..session }.is_expired(now));
    }
}
