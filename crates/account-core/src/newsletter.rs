//! Newsletter topics a user can subscribe to.
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// One subscribable newsletter.
///
/// The lowercase string form (`"weekly"`, `"arts"`, ...) is used both on the
/// wire and when parsing user input.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Newsletter {
    Arts,
    Games,
    Happening,
    Invent,
    Promo,
    Weekly,
}

impl Newsletter {
    /// Every topic, in display order.
    pub const ALL: [Newsletter; 6] = [
        Newsletter::Arts,
        Newsletter::Games,
        Newsletter::Happening,
        Newsletter::Invent,
        Newsletter::Promo,
        Newsletter::Weekly,
    ];

    /// Human-readable name shown in prompts and settings rows.
    pub const fn displayable_name(self) -> &'static str {
        match self {
            Newsletter::Arts => "Kickstarter Arts",
            Newsletter::Games => "Kickstarter Loves Games",
            Newsletter::Happening => "Happening",
            Newsletter::Invent => "Kickstarter Invent",
            Newsletter::Promo => "Kickstarter News & Events",
            Newsletter::Weekly => "Projects We Love",
        }
    }
}
