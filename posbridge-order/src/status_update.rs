use posbridge_core::status::{is_outbound_code, CANCELLED_CODE};
use uuid::Uuid;

use crate::orchestrator::SyncError;

/// An outbound status push that passed edge validation. Only constructible through
/// [`ValidatedStatusUpdate::new`], so the sync service never sees an unchecked request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedStatusUpdate {
    order_id: Uuid,
    restaurant_id: String,
    code: i32,
    cancel_reason: Option<String>,
}

impl ValidatedStatusUpdate {
    pub fn new(
        order_id: Uuid,
        restaurant_id: &str,
        status: &str,
        cancel_reason: Option<&str>,
    ) -> Result<Self, SyncError> {
        let restaurant_id = restaurant_id.trim();
        if restaurant_id.is_empty() {
            return Err(SyncError::Validation("restaurant_id is required".to_string()));
        }

        let code: i32 = status
            .trim()
            .parse()
            .map_err(|_| SyncError::Validation(format!("invalid status code: {}", status)))?;

        if !is_outbound_code(code) {
            return Err(SyncError::Validation(format!(
                "status must be one of -1, 0, 1, 2, 3, 4 (got {})",
                code
            )));
        }

        let cancel_reason = cancel_reason
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string);

        if code == CANCELLED_CODE && cancel_reason.is_none() {
            return Err(SyncError::Validation(
                "cancel_reason is required when cancelling an order".to_string(),
            ));
        }

        Ok(Self {
            order_id,
            restaurant_id: restaurant_id.to_string(),
            code,
            cancel_reason,
        })
    }

    pub fn order_id(&self) -> Uuid {
        self.order_id
    }

    pub fn restaurant_id(&self) -> &str {
        &self.restaurant_id
    }

    pub fn code(&self) -> i32 {
        self.code
    }

    pub fn cancel_reason(&self) -> Option<&str> {
        self.cancel_reason.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_requires_reason() {
        let id = Uuid::new_v4();
        assert!(matches!(
            ValidatedStatusUpdate::new(id, "r1", "-1", None),
            Err(SyncError::Validation(_))
        ));
        assert!(matches!(
            ValidatedStatusUpdate::new(id, "r1", "-1", Some("   ")),
            Err(SyncError::Validation(_))
        ));

        let update = ValidatedStatusUpdate::new(id, "r1", "-1", Some(" Customer request ")).unwrap();
        assert_eq!(update.code(), -1);
        assert_eq!(update.cancel_reason(), Some("Customer request"));
    }

    #[test]
    fn test_only_outbound_codes_allowed() {
        let id = Uuid::new_v4();
        for code in ["0", "1", "2", "3", "4", " 4 "] {
            assert!(ValidatedStatusUpdate::new(id, "r1", code, None).is_ok(), "code {}", code);
        }
        for code in ["5", "10", "-2", "", "ready"] {
            assert!(ValidatedStatusUpdate::new(id, "r1", code, None).is_err(), "code {}", code);
        }
    }

    #[test]
    fn test_restaurant_required() {
        assert!(ValidatedStatusUpdate::new(Uuid::new_v4(), " ", "1", None).is_err());
    }
}
