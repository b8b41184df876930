//! User identity and role types.
//!
//! `User` mirrors the record returned by the gateway's `/api/users/me`
//! endpoint. The `role` carried here is the authoritative one for UI
//! gating; the role claim inside the token is only a soft pre-check.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Capability tag carried both in the token claim and the fetched identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    SuperAdmin,
    Admin,
    Doctor,
    Nurse,
    MedicalShop,
}

impl Role {
    /// Wire-format name, as the gateway serializes it.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "super_admin",
            Role::Admin => "admin",
            Role::Doctor => "doctor",
            Role::Nurse => "nurse",
            Role::MedicalShop => "medical_shop",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authenticated user record fetched from the API gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub full_name: String,
    pub is_active: bool,
    pub role: Role,
    #[serde(default)]
    pub hospital_id: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_wire_names_round_trip() {
        for role in [
            Role::SuperAdmin,
            Role::Admin,
            Role::Doctor,
            Role::Nurse,
            Role::MedicalShop,
        ] {
            let json = serde_json::to_string(&role).unwrap();
            assert_eq!(json, format!("\"{}\"", role.as_str()));
            let back: Role = serde_json::from_str(&json).unwrap();
            assert_eq!(back, role);
        }
    }

    #[test]
    fn user_parses_without_hospital_id() {
        let json = r#"{
            "id": 7,
            "email": "doc@x.com",
            "full_name": "Doc Martin",
            "is_active": true,
            "role": "doctor"
        }"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.role, Role::Doctor);
        assert_eq!(user.hospital_id, None);
    }
}
