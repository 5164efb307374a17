use serde::{Deserialize, Serialize};

/// Vendor code for a cancelled order. Pushing it requires a cancellation reason.
pub const CANCELLED_CODE: i32 = -1;

/// Codes accepted by the outbound status push.
pub const OUTBOUND_STATUS_CODES: [i32; 6] = [-1, 0, 1, 2, 3, 4];

/// Meaning of a vendor status code. The table is fixed; unknown codes map to nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VendorStatus {
    Cancelled,
    Accepted,
    Dispatched,
    FoodReady,
    Delivered,
}

impl VendorStatus {
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            -1 => Some(Self::Cancelled),
            1 | 2 | 3 => Some(Self::Accepted),
            4 => Some(Self::Dispatched),
            5 => Some(Self::FoodReady),
            10 => Some(Self::Delivered),
            _ => None,
        }
    }

    /// Human readable label used in acknowledgements and logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Cancelled => "Cancelled",
            Self::Accepted => "Accepted",
            Self::Dispatched => "Dispatched",
            Self::FoodReady => "Food Ready",
            Self::Delivered => "Delivered",
        }
    }
}

pub fn is_outbound_code(code: i32) -> bool {
    OUTBOUND_STATUS_CODES.contains(&code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_mapping() {
        assert_eq!(VendorStatus::from_code(-1), Some(VendorStatus::Cancelled));
        for code in [1, 2, 3] {
            assert_eq!(VendorStatus::from_code(code), Some(VendorStatus::Accepted));
        }
        assert_eq!(VendorStatus::from_code(4), Some(VendorStatus::Dispatched));
        assert_eq!(VendorStatus::from_code(5), Some(VendorStatus::FoodReady));
        assert_eq!(VendorStatus::from_code(10), Some(VendorStatus::Delivered));
    }

    #[test]
    fn test_unknown_codes_do_not_map() {
        for code in [-2, 0, 6, 7, 8, 9, 11, 99] {
            assert_eq!(VendorStatus::from_code(code), None, "code {}", code);
        }
    }

    #[test]
    fn test_labels() {
        assert_eq!(VendorStatus::FoodReady.label(), "Food Ready");
        assert_eq!(VendorStatus::Cancelled.label(), "Cancelled");
    }

    #[test]
    fn test_outbound_codes() {
        assert!(is_outbound_code(-1));
        assert!(is_outbound_code(0));
        assert!(is_outbound_code(4));
        assert!(!is_outbound_code(5));
        assert!(!is_outbound_code(10));
    }
}
