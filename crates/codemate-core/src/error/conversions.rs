//! From trait implementations for CodemateError conversions

use super::types::CodemateError;

impl From<std::io::Error> for CodemateError {
    fn from(error: std::io::Error) -> Self {
        Self::io(error.to_string())
    }
}

impl From<serde_json::Error> for CodemateError {
    fn from(error: serde_json::Error) -> Self {
        Self::json(error.to_string())
    }
}

impl From<toml::de::Error> for CodemateError {
    fn from(error: toml::de::Error) -> Self {
        Self::config_with_context(error.message().to_string(), "parsing TOML configuration")
    }
}

impl From<reqwest::Error> for CodemateError {
    fn from(error: reqwest::Error) -> Self {
        let status_code = error.status().map(|s| s.as_u16());
        let url = error.url().map(|u| u.to_string());
        Self::Http {
            message: error.to_string(),
            url,
            status_code,
        }
    }
}

impl From<crate::mcp::McpError> for CodemateError {
    fn from(error: crate::mcp::McpError) -> Self {
        Self::transport_with_context(
            error.to_string(),
            format!("MCP error code: {}", error.error_code()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: CodemateError = io.into();
        assert_eq!(err.error_code(), "CODEMATE_IO");
    }

    #[test]
    fn test_mcp_conversion_keeps_code() {
        let err: CodemateError = crate::mcp::McpError::connection("pipe closed").into();
        match err {
            CodemateError::Transport { context, .. } => {
                assert_eq!(context.as_deref(), Some("MCP error code: MCP_CONNECTION"));
            }
            other => panic!("unexpected variant: {:?}", other),
        }
    }

    #[test]
    fn test_user_message_for_not_found() {
        let err = CodemateError::not_found("message abc");
        assert_eq!(err.user_message(), "Could not find message abc");
    }

    #[test]
    fn test_user_messages_by_variant() {
        let cases = [
            (CodemateError::invalid_input("Unknown tool rm_rf"), "CODEMATE_INVALID_INPUT", "Unknown tool rm_rf"),
            (CodemateError::transport("pipe closed"), "CODEMATE_TRANSPORT", "Connection problem: pipe closed"),
            (CodemateError::model("overloaded"), "CODEMATE_MODEL", "Model error: overloaded"),
            (CodemateError::storage("disk full"), "CODEMATE_STORAGE", "Storage error: disk full"),
        ];
        for (err, code, message) in cases {
            assert_eq!(err.error_code(), code);
            assert_eq!(err.user_message(), message);
        }
    }
}
