//! Shared, immutable reference data.
//!
//! Rounds, classification thresholds and scoring config are loaded once and
//! never change while the runtime is up; session data lives in repositories.

use std::sync::Arc;

use archery_content::ReferenceData;
use archery_core::{
    ClassificationTable, RoundCatalog, RoundDefinition, ScoringConfig, SummaryContext,
};

use crate::repository::Session;

/// Reference data handed to every worker.
#[derive(Clone, Debug)]
pub struct OracleBundle {
    pub rounds: Arc<RoundCatalog>,
    pub classifications: Arc<ClassificationTable>,
    pub config: Arc<ScoringConfig>,
}

impl OracleBundle {
    pub fn new(
        rounds: RoundCatalog,
        classifications: ClassificationTable,
        config: ScoringConfig,
    ) -> Self {
        Self {
            rounds: Arc::new(rounds),
            classifications: Arc::new(classifications),
            config: Arc::new(config),
        }
    }

    pub fn round(&self, id: u32) -> Option<&RoundDefinition> {
        self.rounds.get(id)
    }

    /// Summary context for a session whose round, if any, is `round`.
    pub fn summary_context<'a>(
        &'a self,
        session: &Session,
        round: Option<&'a RoundDefinition>,
    ) -> SummaryContext<'a> {
        let mut context = SummaryContext::new(&self.config);
        if let Some(round) = round {
            context = context.with_round(round, session.sub_type_id);
        }
        if let Some(face) = session.face {
            context = context.with_face(face);
        }
        if let Some(archer) = session.archer {
            context = context.with_classifications(archer, &self.classifications);
        }
        context
    }
}

impl From<ReferenceData> for OracleBundle {
    fn from(data: ReferenceData) -> Self {
        Self::new(data.rounds, data.classifications, data.config)
    }
}
