use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::new_id;
use crate::access::MembershipPlan;
use crate::remote::Table;

/// A signed-up member.
///
/// `membership_plan` is owned by the payment collaborator: a webhook
/// updates the row out of band after checkout, so the value seen locally
/// is eventually consistent and must never be written by this crate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub avatar_url: String,
    pub created_at: DateTime<Utc>,
    pub membership_plan: MembershipPlan,
}

impl User {
    pub fn new(email: impl Into<String>, display_name: impl Into<String>) -> Self {
        let display_name = display_name.into();
        let avatar_url = placeholder_avatar(&display_name);
        Self {
            id: new_id(),
            email: email.into(),
            display_name,
            avatar_url,
            created_at: Utc::now(),
            membership_plan: MembershipPlan::Free,
        }
    }
}

impl Table for User {
    const NAME: &'static str = "users";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Generated avatar for users without an uploaded image.
fn placeholder_avatar(display_name: &str) -> String {
    let encoded: String = display_name
        .chars()
        .map(|c| if c == ' ' { '+' } else { c })
        .collect();
    format!("https://ui-avatars.com/api/?name={}&background=111111&color=fafafa&bold=true", encoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_new_defaults_to_free() {
        let user = User::new("kim@example.com", "Kim Aoki");
        assert_eq!(user.membership_plan, MembershipPlan::Free);
        assert_eq!(user.email, "kim@example.com");
    }

    #[test]
    fn test_placeholder_avatar() {
        let user = User::new("kim@example.com", "Kim Aoki");
        assert!(user.avatar_url.contains("name=Kim+Aoki"));
    }

    #[test]
    fn test_user_json_roundtrip() {
        let user = User::new("kim@example.com", "Kim Aoki");
        let json = serde_json::to_string(&user).unwrap();
        assert!(json.contains("\"membership_plan\":\"free\""));
        let parsed: User = serde_json::from_str(&json).unwrap();
        assert_eq!(user, parsed);
    }
}
