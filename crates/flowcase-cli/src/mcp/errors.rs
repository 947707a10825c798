//! Error conversion for the MCP server

use flowcase_core::TrackerError;
use rmcp::ErrorData;

/// Convert a tracker error to an MCP error.
///
/// Caller mistakes (bad input, missing records, rejected execution commands)
/// become `invalid_params`; everything else is an internal error.
pub fn to_mcp_error(message: &str, error: &TrackerError) -> ErrorData {
    let text = format!("{message}: {error}");
    match error {
        TrackerError::InvalidInput { .. } | TrackerError::Execution(_) => {
            ErrorData::invalid_params(text, None)
        }
        e if e.is_not_found() => ErrorData::invalid_params(text, None),
        _ => ErrorData::internal_error(text, None),
    }
}

/// Error for a lookup that found nothing.
pub fn not_found(kind: &str, id: u64) -> ErrorData {
    ErrorData::invalid_params(format!("{kind} with ID {id} not found"), None)
}

#[cfg(test)]
mod tests {
    use flowcase_core::ExecutionError;
    use rmcp::model::ErrorCode;

    use super::*;

    #[test]
    fn test_execution_errors_are_invalid_params() {
        let err = to_mcp_error(
            "Failed to record step result",
            &TrackerError::Execution(ExecutionError::NotRunning),
        );
        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
        assert!(err.message.contains("No execution is running"));
    }

    #[test]
    fn test_configuration_errors_are_internal() {
        let err = to_mcp_error(
            "Failed",
            &TrackerError::Configuration {
                message: "boom".to_string(),
            },
        );
        assert_eq!(err.code, ErrorCode::INTERNAL_ERROR);
    }

    #[test]
    fn test_not_found_message() {
        let err = not_found("Flow run", 9);
        assert_eq!(err.message, "Flow run with ID 9 not found");
    }
}
