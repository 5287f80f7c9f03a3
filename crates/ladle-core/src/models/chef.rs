use serde::{Deserialize, Serialize};
use std::fmt;

use super::new_id;
use crate::access::MembershipPlan;
use crate::remote::Table;

/// A chef profile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chef {
    /// Unique identifier
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub avatar_url: String,
    pub restaurant: String,
    pub country: String,
    pub bio: String,
    pub is_verified: bool,
    pub membership_plan: MembershipPlan,
    /// Denormalized counter maintained by the backend
    pub follower_count: i64,
}

impl Chef {
    pub fn new(email: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            email: email.into(),
            display_name: display_name.into(),
            avatar_url: String::new(),
            restaurant: String::new(),
            country: String::new(),
            bio: String::new(),
            is_verified: false,
            membership_plan: MembershipPlan::Free,
            follower_count: 0,
        }
    }

    pub fn with_restaurant(mut self, restaurant: impl Into<String>, country: impl Into<String>) -> Self {
        self.restaurant = restaurant.into();
        self.country = country.into();
        self
    }

    pub fn with_bio(mut self, bio: impl Into<String>) -> Self {
        self.bio = bio.into();
        self
    }

    pub fn verified(mut self) -> Self {
        self.is_verified = true;
        self
    }
}

impl fmt::Display for Chef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name)?;
        if !self.restaurant.is_empty() {
            write!(f, " — {}", self.restaurant)?;
        }
        if !self.country.is_empty() {
            write!(f, " ({})", self.country)?;
        }
        Ok(())
    }
}

impl Table for Chef {
    const NAME: &'static str = "chefs";

    fn id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chef_new() {
        let chef = Chef::new("anna@example.com", "Anna Sorel");
        assert_eq!(chef.display_name, "Anna Sorel");
        assert_eq!(chef.membership_plan, MembershipPlan::Free);
        assert!(!chef.is_verified);
    }

    #[test]
    fn test_chef_builder_and_display() {
        let chef = Chef::new("anna@example.com", "Anna Sorel")
            .with_restaurant("Le Cormoran", "France")
            .verified();
        assert!(chef.is_verified);
        assert_eq!(format!("{}", chef), "Anna Sorel — Le Cormoran (France)");
    }

    #[test]
    fn test_chef_json_roundtrip() {
        let chef = Chef::new("anna@example.com", "Anna Sorel").with_bio("Saucier turned chef.");
        let json = serde_json::to_string(&chef).unwrap();
        let parsed: Chef = serde_json::from_str(&json).unwrap();
        assert_eq!(chef, parsed);
    }
}
