//! Session records persisted alongside their arrows.

use archery_core::{ArcherProfile, Face, SessionId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A scoring session: what was shot, when and by whom.
///
/// Arrows are stored separately, keyed by `(session id, arrow number)`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub date_shot: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub round_id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_type_id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub face: Option<Face>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archer: Option<ArcherProfile>,
}

/// Session details supplied when starting a new session.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NewSession {
    /// Defaults to now.
    pub date_shot: Option<DateTime<Utc>>,
    pub round_id: Option<u32>,
    pub sub_type_id: Option<u32>,
    pub face: Option<Face>,
    pub archer: Option<ArcherProfile>,
}

impl NewSession {
    pub fn for_round(round_id: u32, sub_type_id: Option<u32>) -> Self {
        Self {
            round_id: Some(round_id),
            sub_type_id,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_archer(mut self, archer: ArcherProfile) -> Self {
        self.archer = Some(archer);
        self
    }

    #[must_use]
    pub fn with_face(mut self, face: Face) -> Self {
        self.face = Some(face);
        self
    }

    pub(crate) fn into_session(self, id: SessionId) -> Session {
        Session {
            id,
            date_shot: self.date_shot.unwrap_or_else(Utc::now),
            round_id: self.round_id,
            sub_type_id: self.sub_type_id,
            face: self.face,
            archer: self.archer,
        }
    }
}
