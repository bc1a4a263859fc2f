//! Invitation bookkeeping used to expire and re-send vault invitations.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Days an invitation stays valid.
pub const INVITE_VALID_DURATION_DAYS: i64 = 5;
/// Re-sends allowed per invitation.
pub const MAX_REINVITES: u32 = 1;
/// Invitations allowed per username.
pub const MAX_TOTAL_INVITES: u32 = 3;

/// Persisted invitation history for one username.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct InviteRecord {
    /// Directory username.
    pub username: String,
    /// Date the latest invitation was sent.
    pub invite_date: NaiveDate,
    /// Re-sends of the current invitation.
    pub reinvites: u32,
    /// Invitations sent in total.
    pub total_invites: u32,
}

/// Action to take on a pending invitation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReinviteDecision {
    /// Invitation is still valid.
    Keep,
    /// Invitation expired and may be sent again.
    Reinvite,
    /// Invitation expired and the allowance is spent.
    Remove,
}

impl InviteRecord {
    /// Record for a first invitation sent today.
    #[must_use]
    pub fn first(username: impl Into<String>, today: NaiveDate) -> Self {
        Self {
            username: username.into(),
            invite_date: today,
            reinvites: 0,
            total_invites: 1,
        }
    }

    /// Returns whether the invitation is older than its validity window.
    #[must_use]
    pub fn has_expired(&self, today: NaiveDate) -> bool {
        (today - self.invite_date).num_days() > INVITE_VALID_DURATION_DAYS
    }

    /// Returns whether another invitation may be sent.
    #[must_use]
    pub fn is_eligible_for_reinvite(&self) -> bool {
        self.reinvites < MAX_REINVITES && self.total_invites < MAX_TOTAL_INVITES
    }

    /// Decides what to do with the pending invitation today.
    #[must_use]
    pub fn decide(&self, today: NaiveDate) -> ReinviteDecision {
        if !self.has_expired(today) {
            ReinviteDecision::Keep
        } else if self.is_eligible_for_reinvite() {
            ReinviteDecision::Reinvite
        } else {
            ReinviteDecision::Remove
        }
    }

    /// Record after re-sending the invitation today.
    #[must_use]
    pub fn reinvited(&self, today: NaiveDate) -> Self {
        Self {
            username: self.username.clone(),
            invite_date: today,
            reinvites: self.reinvites + 1,
            total_invites: self.total_invites + 1,
        }
    }
}
