//! Typed per-conversation state.
//!
//! The session remembers who the user is, which opportunity they are working
//! on and which search terms they have spoken so far. A focused opportunity
//! and accumulated keywords are mutually exclusive.

use serde::{Deserialize, Serialize};

use crate::opportunity::Opportunity;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusedOpportunity {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    user_id: Option<String>,
    focus: Option<FocusedOpportunity>,
    keywords: Option<String>,
}

impl Session {
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn set_user_id(&mut self, user_id: String) {
        self.user_id = Some(user_id);
    }

    pub fn focus(&self) -> Option<&FocusedOpportunity> {
        self.focus.as_ref()
    }

    /// Make `record` the focused opportunity. Ends any keyword search.
    pub fn focus_on(&mut self, record: &Opportunity) {
        self.focus = Some(FocusedOpportunity {
            id: record.id.clone(),
            name: record.name.clone(),
        });
        self.keywords = None;
    }

    pub fn keywords(&self) -> Option<&str> {
        self.keywords.as_deref()
    }

    /// Store accumulated search text. Only meaningful while nothing is focused.
    pub fn remember_keywords(&mut self, text: String) {
        self.focus = None;
        self.keywords = Some(text);
    }

    pub fn clear_keywords(&mut self) {
        self.keywords = None;
    }

    /// Forget everything, including the user id.
    pub fn reset(&mut self) {
        *self = Session::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record() -> Opportunity {
        Opportunity {
            id: "006xx".to_string(),
            name: "West Coast Expansion".to_string(),
            amount: 25000.0,
            close_date: NaiveDate::from_ymd_opt(2018, 3, 8).unwrap(),
            stage: "Prospecting".to_string(),
            next_steps: None,
        }
    }

    #[test]
    fn focusing_clears_keywords() {
        let mut session = Session::default();
        session.remember_keywords("west ".to_string());
        session.focus_on(&record());

        assert_eq!(session.keywords(), None);
        assert_eq!(session.focus().map(|f| f.id.as_str()), Some("006xx"));
    }

    #[test]
    fn remembering_keywords_drops_focus() {
        let mut session = Session::default();
        session.focus_on(&record());
        session.remember_keywords("deal ".to_string());

        assert!(session.focus().is_none());
        assert_eq!(session.keywords(), Some("deal "));
    }

    #[test]
    fn reset_forgets_user() {
        let mut session = Session::default();
        session.set_user_id("005xx".to_string());
        session.focus_on(&record());
        session.reset();

        assert_eq!(session, Session::default());
        assert_eq!(session.user_id(), None);
    }
}
