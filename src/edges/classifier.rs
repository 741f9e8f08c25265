//! Team classification.
//!
//! Attaches the in-team, after-warm-up and condition predicates to a joined
//! note pair. A visit is past warm-up when its admission timestamp is later
//! than `study_start + teamwork_window`.

use chrono::{Duration, NaiveDateTime};

use super::models::{EdgeKey, ExperienceEdge, TeamEdge};
use crate::error::{CorpusError, Result};
use crate::notes::NormalizedNote;

#[derive(Debug, Clone, Copy)]
pub struct TeamClassifier {
    warmup_cutoff: NaiveDateTime,
}

impl TeamClassifier {
    /// Fails when `study_start + teamwork_window` is past the calendar range.
    pub fn new(study_start: NaiveDateTime, teamwork_window: Duration) -> Result<Self> {
        let warmup_cutoff = study_start
            .checked_add_signed(teamwork_window)
            .ok_or_else(|| {
                CorpusError::InvalidConfig(format!(
                    "warm-up cutoff overflows: study start {} plus {} days",
                    study_start,
                    teamwork_window.num_days()
                ))
            })?;
        Ok(Self { warmup_cutoff })
    }

    /// Admissions at or before this instant lack enough history to score.
    pub fn warmup_cutoff(&self) -> NaiveDateTime {
        self.warmup_cutoff
    }

    pub fn is_after_warmup(&self, admission_ts: NaiveDateTime) -> bool {
        admission_ts > self.warmup_cutoff
    }

    /// Label a same-day pair. `None` for a self-pair.
    pub fn experience_edge(
        &self,
        left: &NormalizedNote,
        right: &NormalizedNote,
    ) -> Option<ExperienceEdge> {
        let key = EdgeKey::new(&left.author, &right.author)?;
        Some(ExperienceEdge {
            key,
            visit_id: left.visit_id.clone(),
            note_date: left.note_date,
            admission_date: left.admission_date,
            in_team: left.in_team && right.in_team,
            after_warmup: self.is_after_warmup(left.admission_ts),
            condition: left.condition || right.condition,
        })
    }

    /// Label a same-visit pair. `None` for a self-pair.
    pub fn team_edge(&self, left: &NormalizedNote, right: &NormalizedNote) -> Option<TeamEdge> {
        let key = EdgeKey::new(&left.author, &right.author)?;
        Some(TeamEdge {
            key,
            visit_id: left.visit_id.clone(),
            admission_ts: left.admission_ts,
            admission_date: left.admission_date,
            in_team: left.in_team && right.in_team,
            after_warmup: self.is_after_warmup(left.admission_ts),
        })
    }
}
