//! Pending subscription changes applied locally before persistence.
use serde::{Deserialize, Serialize};

use crate::newsletter::Newsletter;
use crate::user::User;

/// What a toggle applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToggleTarget {
    /// A single newsletter switch.
    Topic(Newsletter),
    /// The "all newsletters" switch.
    All,
}

/// The user's intended new subscription value for a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionToggle {
    pub target: ToggleTarget,
    pub on: bool,
}

impl SubscriptionToggle {
    pub const fn topic(newsletter: Newsletter, on: bool) -> Self {
        Self {
            target: ToggleTarget::Topic(newsletter),
            on,
        }
    }

    pub const fn all(on: bool) -> Self {
        Self {
            target: ToggleTarget::All,
            on,
        }
    }

    /// Derive the updated user record. Pure; no round-trip involved.
    pub fn apply(&self, user: &User) -> User {
        match self.target {
            ToggleTarget::Topic(newsletter) => user.with_newsletter(newsletter, self.on),
            ToggleTarget::All => user.with_all_newsletters(self.on),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::NewsletterSubscriptions;

    #[test]
    fn topic_toggle_applies_single_flag() {
        let user = User::new(1, "u").with_subscriptions(NewsletterSubscriptions::all(false));
        let derived = SubscriptionToggle::topic(Newsletter::Games, true).apply(&user);

        assert_eq!(derived.is_subscribed(Newsletter::Games), Some(true));
        assert_eq!(derived.is_subscribed(Newsletter::Arts), Some(false));
    }

    #[test]
    fn all_toggle_overrides_unknown_flags() {
        let user = User::new(1, "u");
        let derived = SubscriptionToggle::all(true).apply(&user);

        assert_eq!(derived.newsletters, NewsletterSubscriptions::all(true));
        // Input record is untouched.
        assert_eq!(user.is_subscribed(Newsletter::Promo), None);
    }
}
