use crate::model::Id;
use serde::{
    Deserialize, Deserializer, Serialize,
    de::{Error, Unexpected},
};
use std::fmt::{Debug, Formatter};
use thiserror::Error;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct UserMarker;

#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize, Serialize)]
pub struct User {
    pub id: Id<UserMarker>,
    pub username: Username,
    #[serde(skip)]
    pub password: Password,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize)]
pub struct Registration {
    pub username: Username,
    pub password: Password,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: Password,
}

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Serialize)]
#[serde(transparent)]
pub struct Username(String);

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Error)]
#[error("The username is invalid: {0:?}")]
pub struct InvalidUsernameError(String);

impl Username {
    pub fn new(username: String) -> Result<Self, InvalidUsernameError> {
        if !username.is_empty() {
            Ok(Username(username))
        } else {
            Err(InvalidUsernameError(username))
        }
    }

    #[must_use]
    pub fn get(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl<'de> Deserialize<'de> for Username {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let inner = String::deserialize(deserializer)?;
        Username::new(inner).map_err(|err| Error::invalid_value(Unexpected::Str(&err.0), &"Username"))
    }
}

#[derive(Clone, Eq, PartialEq, Default, Hash, Deserialize)]
#[serde(transparent)]
pub struct Password(String);

impl Password {
    #[must_use]
    pub fn new(password: String) -> Self {
        Self(password)
    }

    #[must_use]
    pub fn get(&self) -> &str {
        &self.0
    }
}

impl Debug for Password {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Password").field(&"[redacted]").finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::model::{
        Id,
        user::{Credentials, Password, Registration, User, Username},
    };

    #[test]
    fn username_must_be_non_empty() {
        assert!(Username::new(String::new()).is_err());
        assert!(Username::new("a".into()).is_ok());
        assert!(Username::new("a".repeat(500)).is_ok());
    }

    #[test]
    fn registration_rejects_empty_username() {
        let valid =
            serde_json::from_str::<Registration>(r#"{"username":"alice","password":"pw"}"#)
                .unwrap();
        assert_eq!(valid.username.get(), "alice");
        assert_eq!(valid.password, Password::new("pw".into()));

        assert!(
            serde_json::from_str::<Registration>(r#"{"username":"","password":"pw"}"#).is_err()
        );
        assert!(serde_json::from_str::<Registration>(r#"{"username":"alice"}"#).is_err());
    }

    #[test]
    fn login_credentials_accept_any_username() {
        let empty =
            serde_json::from_str::<Credentials>(r#"{"username":"","password":"pw"}"#).unwrap();
        assert_eq!(empty.username, "");

        assert!(serde_json::from_str::<Credentials>(r#"{"username":"alice"}"#).is_err());
    }

    #[test]
    fn user_serialization_omits_password() {
        let user = User {
            id: Id::new(7),
            username: Username::new("alice".into()).unwrap(),
            password: Password::new("hunter2".into()),
        };

        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json, serde_json::json!({"id": 7, "username": "alice"}));
    }

    #[test]
    fn password_debug_is_redacted() {
        let debug = format!("{:?}", Password::new("hunter2".into()));
        assert!(!debug.contains("hunter2"));
    }
}
