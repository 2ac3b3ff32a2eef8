//! # Submission Draft
//!
//! The player's final answer: who did it, which evidence proves it, and why.
//! Scoring happens on the backend; this module only assembles the draft and
//! reports every rule it breaks.

use crate::primitives::{MIN_EVIDENCE_COUNT, MIN_EXPLANATION_LENGTH};
use crate::{DetectiveError, Entity, PinnedItem};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// One broken submission rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionIssue {
    NoCulprit,
    NoEvidence,
    ExplanationTooShort { length: usize, min: usize },
    /// Evidence id that is not among the pinned items.
    EvidenceNotPinned(String),
    /// Culprit id that is unknown or not a person.
    CulpritNotPerson(String),
}

impl fmt::Display for SubmissionIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCulprit => write!(f, "select at least one culprit"),
            Self::NoEvidence => write!(f, "select at least {MIN_EVIDENCE_COUNT} piece of evidence"),
            Self::ExplanationTooShort { length, min } => {
                write!(f, "explanation has {length} characters, need at least {min}")
            }
            Self::EvidenceNotPinned(id) => write!(f, "evidence '{id}' is not pinned"),
            Self::CulpritNotPerson(id) => write!(f, "culprit '{id}' is not a known person"),
        }
    }
}

/// Culprits, evidence and explanation being prepared for submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionDraft {
    pub culprit_ids: BTreeSet<String>,
    pub evidence_ids: BTreeSet<String>,
    pub explanation: String,
}

impl SubmissionDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Select or deselect a culprit. Returns whether it is now selected.
    pub fn toggle_culprit(&mut self, entity_id: &str) -> bool {
        toggle(&mut self.culprit_ids, entity_id)
    }

    /// Select or deselect a piece of evidence. Returns whether it is now selected.
    pub fn toggle_evidence(&mut self, item_id: &str) -> bool {
        toggle(&mut self.evidence_ids, item_id)
    }

    /// Select every pinned item as evidence.
    pub fn select_all_evidence(&mut self, pinned: &[PinnedItem]) {
        self.evidence_ids = pinned.iter().map(|p| p.id.clone()).collect();
    }

    pub fn set_explanation(&mut self, explanation: impl Into<String>) {
        self.explanation = explanation.into();
    }

    /// Rules that hold for any draft, independent of game state.
    #[must_use]
    pub fn validate(&self) -> Vec<SubmissionIssue> {
        let mut issues = Vec::new();
        if self.culprit_ids.is_empty() {
            issues.push(SubmissionIssue::NoCulprit);
        }
        if self.evidence_ids.len() < MIN_EVIDENCE_COUNT {
            issues.push(SubmissionIssue::NoEvidence);
        }
        let length = self.explanation.trim().chars().count();
        if length < MIN_EXPLANATION_LENGTH {
            issues.push(SubmissionIssue::ExplanationTooShort {
                length,
                min: MIN_EXPLANATION_LENGTH,
            });
        }
        issues
    }

    /// [`validate`](Self::validate) plus the checks against pinned evidence
    /// and known entities.
    #[must_use]
    pub fn validate_against(&self, pinned: &[PinnedItem], entities: &[Entity]) -> Vec<SubmissionIssue> {
        let mut issues = self.validate();

        for id in &self.evidence_ids {
            if !pinned.iter().any(|p| &p.id == id) {
                issues.push(SubmissionIssue::EvidenceNotPinned(id.clone()));
            }
        }
        for id in &self.culprit_ids {
            let is_person = entities
                .iter()
                .any(|e| &e.entity_id == id && e.is_person());
            if !is_person {
                issues.push(SubmissionIssue::CulpritNotPerson(id.clone()));
            }
        }
        issues
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }

    /// Check the draft against game state, folding every issue into one error.
    pub fn check(&self, pinned: &[PinnedItem], entities: &[Entity]) -> Result<(), DetectiveError> {
        let issues = self.validate_against(pinned, entities);
        if issues.is_empty() {
            return Ok(());
        }
        let message = issues
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        Err(DetectiveError::InvalidSubmission(message))
    }
}

fn toggle(set: &mut BTreeSet<String>, id: &str) -> bool {
    if set.remove(id) {
        false
    } else {
        set.insert(id.to_string());
        true
    }
}
