//! User record and its newsletter subscription flags.
use serde::{Deserialize, Serialize};

use crate::newsletter::Newsletter;

/// Server-assigned user identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

/// Subscription state for every newsletter topic.
///
/// `None` means the server has not reported a value for that topic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsletterSubscriptions {
    #[serde(default)]
    pub arts: Option<bool>,
    #[serde(default)]
    pub games: Option<bool>,
    #[serde(default)]
    pub happening: Option<bool>,
    #[serde(default)]
    pub invent: Option<bool>,
    #[serde(default)]
    pub promo: Option<bool>,
    #[serde(default)]
    pub weekly: Option<bool>,
}

impl NewsletterSubscriptions {
    /// Every topic set to `on`.
    pub const fn all(on: bool) -> Self {
        Self {
            arts: Some(on),
            games: Some(on),
            happening: Some(on),
            invent: Some(on),
            promo: Some(on),
            weekly: Some(on),
        }
    }

    pub const fn get(&self, newsletter: Newsletter) -> Option<bool> {
        match newsletter {
            Newsletter::Arts => self.arts,
            Newsletter::Games => self.games,
            Newsletter::Happening => self.happening,
            Newsletter::Invent => self.invent,
            Newsletter::Promo => self.promo,
            Newsletter::Weekly => self.weekly,
        }
    }

    pub fn set(&mut self, newsletter: Newsletter, on: bool) {
        let slot = match newsletter {
            Newsletter::Arts => &mut self.arts,
            Newsletter::Games => &mut self.games,
            Newsletter::Happening => &mut self.happening,
            Newsletter::Invent => &mut self.invent,
            Newsletter::Promo => &mut self.promo,
            Newsletter::Weekly => &mut self.weekly,
        };
        *slot = Some(on);
    }

    /// Iterate `(topic, state)` pairs in display order.
    pub fn iter(&self) -> impl Iterator<Item = (Newsletter, Option<bool>)> + '_ {
        Newsletter::ALL.into_iter().map(|topic| (topic, self.get(topic)))
    }
}

/// The account record returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    #[serde(default)]
    pub newsletters: NewsletterSubscriptions,
}

impl User {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id: UserId(id),
            name: name.into(),
            newsletters: NewsletterSubscriptions::default(),
        }
    }

    /// Builder-style override of the subscription flags.
    pub fn with_subscriptions(mut self, newsletters: NewsletterSubscriptions) -> Self {
        self.newsletters = newsletters;
        self
    }

    /// Stored subscription state for `newsletter`; this is what a settings
    /// switch renders.
    pub const fn is_subscribed(&self, newsletter: Newsletter) -> Option<bool> {
        self.newsletters.get(newsletter)
    }

    /// Copy of this user with one topic set to `on`.
    pub fn with_newsletter(&self, newsletter: Newsletter, on: bool) -> Self {
        let mut user = self.clone();
        user.newsletters.set(newsletter, on);
        user
    }

    /// Copy of this user with every topic set to `on`.
    pub fn with_all_newsletters(&self, on: bool) -> Self {
        Self {
            newsletters: NewsletterSubscriptions::all(on),
            ..self.clone()
        }
    }
}
