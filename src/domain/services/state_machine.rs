use crate::domain::entities::TicketStatus;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Invalid transition from {from} to {to}")]
    InvalidTransition {
        from: TicketStatus,
        to: TicketStatus,
    },
}

/// Outbound transitions per ticket status. Statuses absent from the
/// table have no way out.
const TRANSITIONS: &[(TicketStatus, &[TicketStatus])] = &[
    (
        TicketStatus::Assigned,
        &[TicketStatus::OnTheWay, TicketStatus::OnHold],
    ),
    (
        TicketStatus::OnTheWay,
        &[TicketStatus::InProgress, TicketStatus::OnHold],
    ),
    (
        TicketStatus::InProgress,
        &[TicketStatus::OnHold, TicketStatus::Completed],
    ),
    (TicketStatus::OnHold, &[TicketStatus::InProgress]),
    (TicketStatus::Completed, &[]),
    (TicketStatus::Closed, &[]),
];

pub fn allowed_next(status: TicketStatus) -> &'static [TicketStatus] {
    TRANSITIONS
        .iter()
        .find(|(from, _)| *from == status)
        .map(|(_, next)| *next)
        .unwrap_or(&[])
}

pub fn is_terminal(status: TicketStatus) -> bool {
    allowed_next(status).is_empty()
}

/// Validates if a status change is allowed. Staying in the same status is
/// not a transition and is rejected.
pub fn validate_transition(from: TicketStatus, to: TicketStatus) -> Result<(), TransitionError> {
    if allowed_next(from).contains(&to) {
        Ok(())
    } else {
        Err(TransitionError::InvalidTransition { from, to })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use TicketStatus::*;

    #[test]
    fn test_table_covers_every_status() {
        for status in TicketStatus::ALL {
            assert!(TRANSITIONS.iter().any(|(from, _)| *from == status));
        }
    }

    #[test]
    fn test_allowed_next_matches_dispatch_flow() {
        assert_eq!(allowed_next(Assigned), &[OnTheWay, OnHold]);
        assert_eq!(allowed_next(OnTheWay), &[InProgress, OnHold]);
        assert_eq!(allowed_next(InProgress), &[OnHold, Completed]);
        assert_eq!(allowed_next(OnHold), &[InProgress]);
        assert!(allowed_next(Completed).is_empty());
        assert!(allowed_next(Closed).is_empty());
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(is_terminal(Completed));
        assert!(is_terminal(Closed));
        assert!(!is_terminal(OnHold));
    }

    #[test]
    fn test_validate_transition_rejects_skips_and_self_loops() {
        assert!(validate_transition(Assigned, OnTheWay).is_ok());
        assert!(validate_transition(InProgress, Completed).is_ok());

        assert_eq!(
            validate_transition(Assigned, Completed),
            Err(TransitionError::InvalidTransition {
                from: Assigned,
                to: Completed
            })
        );
        assert!(validate_transition(OnHold, OnHold).is_err());
        assert!(validate_transition(Completed, InProgress).is_err());
        assert!(validate_transition(OnHold, Completed).is_err());
    }
}
