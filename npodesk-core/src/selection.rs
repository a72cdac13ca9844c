//! Selection set — screening candidates and the user-confirmed subset.
//!
//! Candidates come from the most recent screening; the confirmed subset is
//! the list of EINs the user carries forward into field selection and
//! export. Loading a new candidate list always clears the confirmation —
//! selections from a previous screening must never leak into a new one.

use thiserror::Error;

use crate::domain::Organization;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    /// The EIN is not in the current candidate list.
    #[error("EIN '{0}' is not among the current screening candidates")]
    UnknownEin(String),
}

/// Candidate list plus the ordered confirmed EIN subset.
#[derive(Debug, Clone, Default)]
pub struct SelectionSet {
    candidates: Vec<Organization>,
    confirmed: Vec<String>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn candidates(&self) -> &[Organization] {
        &self.candidates
    }

    pub fn candidate_count(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_candidate(&self, ein: &str) -> bool {
        self.candidates.iter().any(|o| o.ein == ein)
    }

    /// Replace the candidate list with a fresh screening result.
    /// The confirmed subset is emptied unconditionally.
    pub fn load_candidates(&mut self, organizations: Vec<Organization>) {
        self.candidates = organizations;
        self.confirmed.clear();
    }

    /// Flip one candidate's confirmation. Returns whether the EIN is now
    /// confirmed. EINs outside the candidate list are rejected.
    pub fn toggle(&mut self, ein: &str) -> Result<bool, SelectionError> {
        if !self.is_candidate(ein) {
            return Err(SelectionError::UnknownEin(ein.to_string()));
        }
        if let Some(pos) = self.confirmed.iter().position(|e| e == ein) {
            self.confirmed.remove(pos);
            Ok(false)
        } else {
            self.confirmed.push(ein.to_string());
            Ok(true)
        }
    }

    /// Confirm one candidate (idempotent).
    pub fn confirm(&mut self, ein: &str) -> Result<(), SelectionError> {
        if !self.is_candidate(ein) {
            return Err(SelectionError::UnknownEin(ein.to_string()));
        }
        if !self.confirmed.iter().any(|e| e == ein) {
            self.confirmed.push(ein.to_string());
        }
        Ok(())
    }

    /// Confirm every candidate, in candidate order.
    pub fn select_all(&mut self) {
        self.confirmed = self.candidates.iter().map(|o| o.ein.clone()).collect();
    }

    /// Drop all confirmations, keeping the candidate list.
    pub fn clear(&mut self) {
        self.confirmed.clear();
    }

    pub fn is_confirmed(&self, ein: &str) -> bool {
        self.confirmed.iter().any(|e| e == ein)
    }

    /// The authoritative list handed to the export assembler.
    pub fn confirmed(&self) -> &[String] {
        &self.confirmed
    }

    pub fn confirmed_count(&self) -> usize {
        self.confirmed.len()
    }

    /// Drop candidates and confirmations both (wizard restart).
    pub fn reset(&mut self) {
        self.candidates.clear();
        self.confirmed.clear();
    }
}
