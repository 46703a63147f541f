use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::repo::User;

/// Request body for user registration.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub target_calories: Option<Decimal>,
    pub target_proteins: Option<Decimal>,
    pub target_carbs: Option<Decimal>,
    pub target_fats: Option<Decimal>,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for token refresh.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Response returned after login, register or refresh.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: PublicUser,
}

/// Public part of the user returned to the client. The password hash never
/// crosses this boundary.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub avatar_url: Option<String>,
    pub target_calories: Option<Decimal>,
    pub target_proteins: Option<Decimal>,
    pub target_carbs: Option<Decimal>,
    pub target_fats: Option<Decimal>,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            first_name: u.first_name,
            last_name: u.last_name,
            avatar_url: u.avatar_url,
            target_calories: u.target_calories,
            target_proteins: u.target_proteins,
            target_carbs: u.target_carbs,
            target_fats: u.target_fats,
        }
    }
}

/// Patch body for `PATCH /me`. Present fields overwrite, absent fields are
/// retained.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub avatar_url: Option<String>,
    pub target_calories: Option<Decimal>,
    pub target_proteins: Option<Decimal>,
    pub target_carbs: Option<Decimal>,
    pub target_fats: Option<Decimal>,
}

impl UpdateProfileRequest {
    pub fn apply(self, user: &mut User) {
        if let Some(first_name) = self.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = self.last_name {
            user.last_name = last_name;
        }
        if let Some(avatar_url) = self.avatar_url {
            user.avatar_url = Some(avatar_url);
        }
        if let Some(v) = self.target_calories {
            user.target_calories = Some(v);
        }
        if let Some(v) = self.target_proteins {
            user.target_proteins = Some(v);
        }
        if let Some(v) = self.target_carbs {
            user.target_carbs = Some(v);
        }
        if let Some(v) = self.target_fats {
            user.target_fats = Some(v);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    fn sample_user() -> User {
        User {
            id: Uuid::new_v4(),
            email: "jane@example.com".into(),
            password_hash: "hash".into(),
            first_name: "Jane".into(),
            last_name: "Doe".into(),
            avatar_url: None,
            target_calories: Some(Decimal::from(2000)),
            target_proteins: None,
            target_carbs: None,
            target_fats: None,
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn patch_overwrites_present_fields_and_keeps_absent_ones() {
        let mut user = sample_user();
        let patch = UpdateProfileRequest {
            first_name: Some("Janet".into()),
            target_proteins: Some(Decimal::from(120)),
            ..Default::default()
        };
        patch.apply(&mut user);

        assert_eq!(user.first_name, "Janet");
        assert_eq!(user.last_name, "Doe");
        assert_eq!(user.target_calories, Some(Decimal::from(2000)));
        assert_eq!(user.target_proteins, Some(Decimal::from(120)));
    }

    #[test]
    fn password_hash_is_not_serialized() {
        let user = sample_user();
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("hash"));
        assert!(json.contains("jane@example.com"));
    }
}
