use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

/// Role value marking a soft-deleted row. Such rows are hidden from listings
/// but still readable by id.
pub const DELETED_ROLE: i32 = -1;

/// Row of the `users` table.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub mobile_number: String,
    pub email: String,
    pub password: String,
    pub role: i32,
    #[serde(with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
}

impl User {
    pub fn is_active(&self) -> bool {
        self.role != DELETED_ROLE
    }
}

/// Insert payload. Missing strings bind to `""`, missing role to `0`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct UserCreation {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub mobile_number: String,
    pub email: String,
    pub password: String,
    pub role: i32,
}

/// Partial update. `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct UserUpdate {
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub mobile_number: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<i32>,
}

impl UserUpdate {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Treats `""` and `0` as "not provided".
    pub fn without_zero_values(self) -> Self {
        fn keep(v: Option<String>) -> Option<String> {
            v.filter(|s| !s.is_empty())
        }
        Self {
            username: keep(self.username),
            first_name: keep(self.first_name),
            last_name: keep(self.last_name),
            mobile_number: keep(self.mobile_number),
            email: keep(self.email),
            password: keep(self.password),
            role: self.role.filter(|r| *r != 0),
        }
    }

    /// Column/value pairs for the text columns that are set, in table order.
    pub fn text_columns(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        [
            ("username", &self.username),
            ("first_name", &self.first_name),
            ("last_name", &self.last_name),
            ("mobile_number", &self.mobile_number),
            ("email", &self.email),
            ("password", &self.password),
        ]
        .into_iter()
        .filter_map(|(col, v)| v.as_deref().map(|v| (col, v)))
    }

    pub fn apply_to(&self, user: &mut User) {
        let targets = [
            (&self.username, &mut user.username),
            (&self.first_name, &mut user.first_name),
            (&self.last_name, &mut user.last_name),
            (&self.mobile_number, &mut user.mobile_number),
            (&self.email, &mut user.email),
            (&self.password, &mut user.password),
        ];
        for (src, dst) in targets {
            if let Some(v) = src {
                dst.clone_from(v);
            }
        }
        if let Some(role) = self.role {
            user.role = role;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: 7,
            username: "ann".into(),
            first_name: "Ann".into(),
            last_name: "Lee".into(),
            mobile_number: "555-0100".into(),
            email: "ann@example.com".into(),
            password: "hunter2".into(),
            role: 1,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn creation_defaults_missing_fields() {
        let c: UserCreation = serde_json::from_str(r#"{"username":"ann","role":1}"#).unwrap();
        assert_eq!(c.username, "ann");
        assert_eq!(c.role, 1);
        assert_eq!(c.email, "");
        assert_eq!(c.password, "");
    }

    #[test]
    fn creation_ignores_client_supplied_id() {
        let c: UserCreation = serde_json::from_str(r#"{"id":99,"username":"bob"}"#).unwrap();
        assert_eq!(c.username, "bob");
    }

    #[test]
    fn update_distinguishes_absent_from_empty() {
        let u: UserUpdate = serde_json::from_str(r#"{"first_name":""}"#).unwrap();
        assert_eq!(u.first_name.as_deref(), Some(""));
        assert_eq!(u.last_name, None);
        assert!(u.without_zero_values().is_empty());
    }

    #[test]
    fn update_ignores_server_assigned_fields() {
        let u: UserUpdate =
            serde_json::from_str(r#"{"id":3,"created_at":null,"role":2}"#).unwrap();
        assert_eq!(u, UserUpdate { role: Some(2), ..Default::default() });
    }

    #[test]
    fn zero_role_is_dropped_but_nonzero_kept() {
        let u = UserUpdate { role: Some(0), email: Some("x@y.z".into()), ..Default::default() };
        let kept = u.without_zero_values();
        assert_eq!(kept.role, None);
        assert_eq!(kept.email.as_deref(), Some("x@y.z"));
    }

    #[test]
    fn apply_touches_only_present_fields() {
        let mut user = sample_user();
        UserUpdate { role: Some(2), last_name: Some("".into()), ..Default::default() }
            .apply_to(&mut user);
        assert_eq!(user.role, 2);
        assert_eq!(user.last_name, "");
        assert_eq!(user.first_name, "Ann");
        assert_eq!(user.email, "ann@example.com");
    }

    #[test]
    fn text_columns_lists_set_fields_in_order() {
        let u = UserUpdate {
            email: Some("a@b.c".into()),
            username: Some("ann".into()),
            role: Some(3),
            ..Default::default()
        };
        let cols: Vec<_> = u.text_columns().collect();
        assert_eq!(cols, vec![("username", "ann"), ("email", "a@b.c")]);
    }

    #[test]
    fn user_serializes_null_timestamps() {
        let json = serde_json::to_value(sample_user()).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["password"], "hunter2");
        assert!(json["created_at"].is_null());
    }
}
