//! This file defines the logged in user as returned by the ledger API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The account of the logged in user.
///
/// The ledger API does not promise a schema for the account, so the JSON
/// object is kept as is. Having a `User` at all is what marks a session as
/// authenticated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct User(Value);

impl User {
    /// Wrap the account JSON returned by the ledger API.
    ///
    /// Returns `None` for falsy JSON (`null`, `false`, `0`, `""`), which the
    /// ledger API uses to signal that there is no session.
    pub fn from_value(value: Value) -> Option<Self> {
        let is_truthy = match &value {
            Value::Null => false,
            Value::Bool(flag) => *flag,
            Value::Number(number) => number.as_f64().is_some_and(|number| number != 0.0),
            Value::String(text) => !text.is_empty(),
            Value::Array(_) | Value::Object(_) => true,
        };

        is_truthy.then_some(Self(value))
    }

    /// Parse a user from its serialized form, e.g. the `user` entry in local storage.
    ///
    /// Returns `None` if `text` is not valid JSON or is falsy.
    pub fn from_json(text: &str) -> Option<Self> {
        serde_json::from_str(text).ok().and_then(Self::from_value)
    }

    /// Serialize the user for local storage.
    pub fn to_json(&self) -> String {
        self.0.to_string()
    }

    /// The user's display name, if the account has a `name` string.
    pub fn name(&self) -> Option<&str> {
        self.0.get("name").and_then(Value::as_str)
    }
}

#[cfg(test)]
mod user_tests {
    use serde_json::json;

    use super::User;

    #[test]
    fn falsy_json_is_not_a_user() {
        for value in [json!(null), json!(false), json!(0), json!("")] {
            assert_eq!(User::from_value(value.clone()), None, "{value} should not be a user");
        }
    }

    #[test]
    fn object_is_a_user() {
        let user = User::from_value(json!({"id": "123", "name": "Alice"})).unwrap();

        assert_eq!(user.name(), Some("Alice"));
    }

    #[test]
    fn json_survives_storage() {
        let user = User::from_value(json!({"id": "123", "email": "alice@example.com"})).unwrap();

        let got = User::from_json(&user.to_json());

        assert_eq!(got, Some(user));
    }

    #[test]
    fn invalid_json_is_not_a_user() {
        assert_eq!(User::from_json(""), None);
        assert_eq!(User::from_json("undefined"), None);
    }
}
