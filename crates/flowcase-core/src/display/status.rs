//! Status and confirmation message types for operation feedback.

use std::fmt;

/// Confirmation or failure message for operations without a resource to show.
pub struct OperationStatus {
    pub message: String,
    pub success: bool,
}

impl OperationStatus {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            success: true,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            success: false,
        }
    }
}

impl fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} {}",
            if self.success { "Success:" } else { "Error:" },
            self.message
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_status_display() {
        let success = OperationStatus::success("Test case added to suite TS-1");
        assert_eq!(
            success.to_string(),
            "Success: Test case added to suite TS-1\n"
        );

        let failure = OperationStatus::failure("Flow run FR-9 not found");
        assert!(failure.to_string().starts_with("Error:"));
    }
}
