//! Wire shapes returned by the studio REST API.

use serde::Deserialize;

/// Error envelope: `{code, message, traceId?, details?}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ErrorBodyDto {
    #[serde(default)]
    pub(super) code: Option<String>,
    pub(super) message: String,
    #[serde(default)]
    pub(super) trace_id: Option<String>,
}

impl ErrorBodyDto {
    /// Decode `body`, returning `None` for anything that is not the envelope.
    pub(super) fn parse(body: &[u8]) -> Option<Self> {
        serde_json::from_slice(body)
            .ok()
            .filter(|dto: &Self| !dto.message.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_envelope_with_trace_id() {
        let dto = ErrorBodyDto::parse(
            br#"{"code":"service_unavailable","message":"Model overloaded","traceId":"abc"}"#,
        )
        .expect("envelope");
        assert_eq!(dto.code.as_deref(), Some("service_unavailable"));
        assert_eq!(dto.message, "Model overloaded");
        assert_eq!(dto.trace_id.as_deref(), Some("abc"));
    }

    #[test]
    fn rejects_non_envelopes() {
        assert!(ErrorBodyDto::parse(b"<html>bad gateway</html>").is_none());
        assert!(ErrorBodyDto::parse(br#"{"message":"  "}"#).is_none());
    }
}
