//! View-model snapshots for the settings screen, folded from cell events.
use account_core::{Newsletter, User, UserId};
use settings_runtime::Event;

/// Section header above the project list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PopularProjectsHeader {
    pub title: String,
}

impl Default for PopularProjectsHeader {
    fn default() -> Self {
        Self {
            title: "Popular Projects".to_owned(),
        }
    }
}

/// One newsletter switch as rendered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewsletterRow {
    pub topic: Newsletter,
    pub title: &'static str,
    pub is_on: Option<bool>,
    /// Whether this row is the one driven by the cell.
    pub is_controlled: bool,
}

/// Everything a frontend needs to draw the newsletter settings.
#[derive(Clone, Debug)]
pub struct SettingsViewModel {
    pub header: PopularProjectsHeader,
    pub controlled_topic: Option<Newsletter>,
    /// Last switch state emitted by the cell.
    pub switch_is_on: Option<bool>,
    pub user_id: Option<UserId>,
    pub user_name: Option<String>,
    pub rows: Vec<NewsletterRow>,
}

impl SettingsViewModel {
    pub fn new(controlled_topic: Option<Newsletter>) -> Self {
        let mut view_model = Self {
            header: PopularProjectsHeader::default(),
            controlled_topic,
            switch_is_on: None,
            user_id: None,
            user_name: None,
            rows: Vec::new(),
        };
        view_model.rebuild_rows(None);
        view_model
    }

    pub fn set_controlled_topic(&mut self, topic: Newsletter) {
        self.controlled_topic = Some(topic);
        for row in &mut self.rows {
            row.is_controlled = row.topic == topic;
        }
    }

    /// Apply a cell event. Returns true when the rendered state changed.
    pub fn apply(&mut self, event: &Event) -> bool {
        match event {
            Event::SwitchState(state) => {
                let changed = self.switch_is_on != *state;
                self.switch_is_on = *state;
                changed
            }
            Event::CurrentUser(user) => {
                self.user_id = Some(user.id);
                self.user_name = Some(user.name.clone());
                self.rebuild_rows(Some(user));
                true
            }
            Event::OptInPrompt(_) | Event::SaveError(_) => false,
        }
    }

    fn rebuild_rows(&mut self, user: Option<&User>) {
        self.rows = Newsletter::ALL
            .into_iter()
            .map(|topic| NewsletterRow {
                topic,
                title: topic.displayable_name(),
                is_on: user.and_then(|u| u.is_subscribed(topic)),
                is_controlled: self.controlled_topic == Some(topic),
            })
            .collect();
    }

    pub fn row(&self, topic: Newsletter) -> Option<&NewsletterRow> {
        self.rows.iter().find(|row| row.topic == topic)
    }
}
