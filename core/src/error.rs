//! Normalized error shape for every failure the client can surface.
//!
//! # Design
//! Callers see exactly one error type, whatever went wrong: a refused
//! connection, a 4xx/5xx body from the backend, or a payload the client could
//! not encode or decode. `status_code` mirrors the HTTP status, with `0`
//! reserved for "no response received". `kind` is derived once at
//! construction so callers can branch without re-matching numbers.
//!
//! Messages are user-facing (pt-BR) because hooks forward them verbatim into
//! toasts. A message supplied by the backend wins over the default text.

use serde::Serialize;

use crate::transport::TransportError;

/// Classification of a normalized failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// No response was received (DNS, refused connection, timeout).
    Connectivity,
    /// 400
    InvalidPayload,
    /// 401. Also triggers session teardown in the client.
    Unauthorized,
    /// 403
    Forbidden,
    /// 404
    NotFound,
    /// 409
    Conflict,
    /// 422
    Validation,
    /// 5xx
    Server,
    /// Any other non-2xx status.
    Http,
    /// Failures that never reached or never came back from the wire in a
    /// recognizable form.
    Unknown,
}

/// The single error shape returned by the client, services and hooks.
///
/// Serializes as `{ "message": ..., "statusCode": ... }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(rename_all = "camelCase")]
#[error("{message}")]
pub struct ApiError {
    #[serde(skip)]
    pub kind: ErrorKind,
    pub message: String,
    pub status_code: u16,
}

/// Status code carried by errors that have no HTTP status of their own.
pub const UNKNOWN_STATUS: u16 = 500;

impl ApiError {
    /// Build the error for a non-2xx response. `body` is inspected for a
    /// backend-provided `message` (string or list of strings).
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = server_message(body).unwrap_or_else(|| default_message(status));
        Self {
            kind: kind_for_status(status),
            message,
            status_code: status,
        }
    }

    pub fn connectivity(detail: impl std::fmt::Display) -> Self {
        tracing::debug!(%detail, "no response from backend");
        Self {
            kind: ErrorKind::Connectivity,
            message: default_message(0),
            status_code: 0,
        }
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Unknown,
            message: message.into(),
            status_code: UNKNOWN_STATUS,
        }
    }

    pub fn serialization(err: serde_json::Error) -> Self {
        Self::unknown(format!("Erro ao preparar a requisição: {err}"))
    }

    pub fn deserialization(err: serde_json::Error) -> Self {
        Self::unknown(format!("Resposta inválida do servidor: {err}"))
    }

    pub fn is_unauthorized(&self) -> bool {
        self.kind == ErrorKind::Unauthorized
    }

    pub fn is_connectivity(&self) -> bool {
        self.kind == ErrorKind::Connectivity
    }
}

impl From<TransportError> for ApiError {
    fn from(err: TransportError) -> Self {
        Self::connectivity(err)
    }
}

pub fn kind_for_status(status: u16) -> ErrorKind {
    match status {
        0 => ErrorKind::Connectivity,
        400 => ErrorKind::InvalidPayload,
        401 => ErrorKind::Unauthorized,
        403 => ErrorKind::Forbidden,
        404 => ErrorKind::NotFound,
        409 => ErrorKind::Conflict,
        422 => ErrorKind::Validation,
        500..=599 => ErrorKind::Server,
        _ => ErrorKind::Http,
    }
}

fn default_message(status: u16) -> String {
    match status {
        0 => "Erro de conexão. Verifique sua internet.".to_string(),
        400 => "Dados inválidos".to_string(),
        401 => "Não autorizado".to_string(),
        403 => "Acesso negado".to_string(),
        404 => "Recurso não encontrado".to_string(),
        409 => "Conflito de dados".to_string(),
        422 => "Dados de validação inválidos".to_string(),
        500 => "Erro interno do servidor".to_string(),
        other => format!("Erro na requisição ({other})"),
    }
}

/// Extract `message` from a JSON error body. Validation pipes on the backend
/// send an array of messages; those are joined.
fn server_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let message = match value.get("message")? {
        serde_json::Value::String(s) => s.trim().to_string(),
        serde_json::Value::Array(items) => items
            .iter()
            .filter_map(|item| item.as_str())
            .collect::<Vec<_>>()
            .join("; "),
        _ => return None,
    };
    (!message.is_empty()).then_some(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_known_statuses_to_kinds() {
        assert_eq!(ApiError::from_status(400, "").kind, ErrorKind::InvalidPayload);
        assert_eq!(ApiError::from_status(401, "").kind, ErrorKind::Unauthorized);
        assert_eq!(ApiError::from_status(403, "").kind, ErrorKind::Forbidden);
        assert_eq!(ApiError::from_status(404, "").kind, ErrorKind::NotFound);
        assert_eq!(ApiError::from_status(409, "").kind, ErrorKind::Conflict);
        assert_eq!(ApiError::from_status(422, "").kind, ErrorKind::Validation);
        assert_eq!(ApiError::from_status(503, "").kind, ErrorKind::Server);
        assert_eq!(ApiError::from_status(418, "").kind, ErrorKind::Http);
    }

    #[test]
    fn default_message_used_when_body_is_not_json() {
        let err = ApiError::from_status(404, "<html>nope</html>");
        assert_eq!(err.message, "Recurso não encontrado");
        assert_eq!(err.status_code, 404);
    }

    #[test]
    fn generic_message_carries_the_code() {
        let err = ApiError::from_status(418, "");
        assert_eq!(err.message, "Erro na requisição (418)");
    }

    #[test]
    fn server_message_wins_over_default() {
        let err = ApiError::from_status(409, r#"{"message":"Horário indisponível","statusCode":409}"#);
        assert_eq!(err.message, "Horário indisponível");
        assert_eq!(err.kind, ErrorKind::Conflict);
    }

    #[test]
    fn message_arrays_are_joined() {
        let err = ApiError::from_status(
            400,
            r#"{"message":["email must be an email","name should not be empty"]}"#,
        );
        assert_eq!(err.message, "email must be an email; name should not be empty");
    }

    #[test]
    fn blank_server_message_falls_back() {
        let err = ApiError::from_status(500, r#"{"message":"   "}"#);
        assert_eq!(err.message, "Erro interno do servidor");
    }

    #[test]
    fn connectivity_uses_status_zero() {
        let err = ApiError::from(TransportError::Timeout);
        assert_eq!(err.status_code, 0);
        assert!(err.is_connectivity());
    }

    #[test]
    fn serializes_to_wire_shape() {
        let err = ApiError::from_status(403, "");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json, serde_json::json!({"message": "Acesso negado", "statusCode": 403}));
    }

    #[test]
    fn display_is_the_message() {
        let err = ApiError::unknown("boom");
        assert_eq!(err.to_string(), "boom");
        assert_eq!(err.status_code, UNKNOWN_STATUS);
    }
}
