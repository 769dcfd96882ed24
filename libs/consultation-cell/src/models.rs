use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsultationStatus {
    Scheduled,
    Ongoing,
    Completed,
    Cancelled,
    NoShow,
}

impl ConsultationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConsultationStatus::Scheduled => "scheduled",
            ConsultationStatus::Ongoing => "ongoing",
            ConsultationStatus::Completed => "completed",
            ConsultationStatus::Cancelled => "cancelled",
            ConsultationStatus::NoShow => "no_show",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ConsultationStatus::Completed
                | ConsultationStatus::Cancelled
                | ConsultationStatus::NoShow
        )
    }

    /// Lifecycle transition matrix. Scheduled sessions can start, be
    /// cancelled or be marked a no-show; ongoing sessions can complete or
    /// be cancelled; terminal states accept nothing.
    pub fn can_transition(&self, to: ConsultationStatus) -> bool {
        use ConsultationStatus::*;
        match (self, to) {
            (Scheduled, Ongoing) | (Scheduled, Cancelled) | (Scheduled, NoShow) => true,
            (Ongoing, Completed) | (Ongoing, Cancelled) => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsultationPaymentStatus {
    Pending,
    Confirmed,
    Failed,
    Refunded,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Consultation {
    pub id: Uuid,
    pub user_id: String,
    pub doctor_id: Uuid,
    pub status: ConsultationStatus,
    pub payment_status: ConsultationPaymentStatus,
    pub scheduled_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub total_cost: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SenderType {
    User,
    Doctor,
}

/// Append-only chat row; never mutated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsultationMessage {
    pub id: Uuid,
    pub consultation_id: Uuid,
    pub sender_id: String,
    pub sender_type: SenderType,
    pub message: String,
    pub message_type: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateConsultationRequest {
    pub doctor_id: Uuid,
    pub scheduled_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: ConsultationStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SendMessageRequest {
    pub message: String,
    pub message_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::ConsultationStatus::*;

    const ALL: [super::ConsultationStatus; 5] = [Scheduled, Ongoing, Completed, Cancelled, NoShow];

    #[test]
    fn scheduled_transitions() {
        assert!(Scheduled.can_transition(Ongoing));
        assert!(Scheduled.can_transition(Cancelled));
        assert!(Scheduled.can_transition(NoShow));
        assert!(!Scheduled.can_transition(Completed));
        assert!(!Scheduled.can_transition(Scheduled));
    }

    #[test]
    fn ongoing_transitions() {
        assert!(Ongoing.can_transition(Completed));
        assert!(Ongoing.can_transition(Cancelled));
        assert!(!Ongoing.can_transition(Scheduled));
        assert!(!Ongoing.can_transition(NoShow));
    }

    #[test]
    fn terminal_states_accept_nothing() {
        for terminal in [Completed, Cancelled, NoShow] {
            assert!(terminal.is_terminal());
            for target in ALL {
                assert!(!terminal.can_transition(target));
            }
        }
    }
}
