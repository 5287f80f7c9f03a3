//! Membership entitlements
//!
//! Content is gated by a four-level access tier, and every viewer holds
//! at most a three-level membership plan. The access decision is a rank
//! comparison over a strict total order: a plan may view an item when the
//! highest level it grants is at least the item's required level.
//!
//! These functions are pure and total; there is no error path.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Required tier to view a content item's full detail.
///
/// Variant order defines the rank order (`Free < Pro < Elite < Bocuse`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AccessLevel {
    Free,
    Pro,
    Elite,
    Bocuse,
}

impl AccessLevel {
    /// All levels in rank order.
    pub const ALL: [AccessLevel; 4] = [
        AccessLevel::Free,
        AccessLevel::Pro,
        AccessLevel::Elite,
        AccessLevel::Bocuse,
    ];

    /// Numeric rank (`Free` = 0 .. `Bocuse` = 3).
    pub fn rank(self) -> u8 {
        self as u8
    }

    /// Label shown on paywall prompts for content gated at this level.
    ///
    /// Empty for `Free` (free content shows no badge).
    pub fn plan_label(self) -> &'static str {
        match self {
            AccessLevel::Free => "",
            AccessLevel::Pro => "Pro",
            AccessLevel::Elite => "Elite",
            AccessLevel::Bocuse => "Bocuse d'Or",
        }
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AccessLevel::Free => "free",
            AccessLevel::Pro => "pro",
            AccessLevel::Elite => "elite",
            AccessLevel::Bocuse => "bocuse",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for AccessLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(AccessLevel::Free),
            "pro" => Ok(AccessLevel::Pro),
            "elite" => Ok(AccessLevel::Elite),
            "bocuse" => Ok(AccessLevel::Bocuse),
            other => Err(format!(
                "Unknown access level: '{}'. Valid levels: free, pro, elite, bocuse",
                other
            )),
        }
    }
}

/// Tier a user has purchased.
///
/// There is no purchasable plan for `Bocuse`-gated content; that tier is
/// reachable only if the backend grants it out of band.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MembershipPlan {
    Free,
    Pro,
    Elite,
}

impl MembershipPlan {
    /// The highest access level this plan unlocks.
    pub fn grants(self) -> AccessLevel {
        match self {
            MembershipPlan::Free => AccessLevel::Free,
            MembershipPlan::Pro => AccessLevel::Pro,
            MembershipPlan::Elite => AccessLevel::Elite,
        }
    }

    /// Display label for the plan itself.
    pub fn label(self) -> &'static str {
        match self {
            MembershipPlan::Free => "Free",
            MembershipPlan::Pro => "Pro",
            MembershipPlan::Elite => "Elite",
        }
    }
}

impl fmt::Display for MembershipPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MembershipPlan::Free => "free",
            MembershipPlan::Pro => "pro",
            MembershipPlan::Elite => "elite",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for MembershipPlan {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(MembershipPlan::Free),
            "pro" => Ok(MembershipPlan::Pro),
            "elite" => Ok(MembershipPlan::Elite),
            other => Err(format!(
                "Unknown membership plan: '{}'. Valid plans: free, pro, elite",
                other
            )),
        }
    }
}

/// Decide whether a viewer may see the full content of a gated item.
///
/// `plan` is `None` for anonymous viewers. Free content is accessible to
/// everyone, anonymous included.
pub fn can_access(plan: Option<MembershipPlan>, required: AccessLevel) -> bool {
    let granted = plan.map(MembershipPlan::grants).unwrap_or(AccessLevel::Free);
    granted >= required
}
