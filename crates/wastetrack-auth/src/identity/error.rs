//! Sign-in failure taxonomy.

use serde::Deserialize;
use thiserror::Error;

use wastetrack_core::error::{AppError, ErrorKind};

/// Why the identity service refused a request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthFailure {
    /// Wrong email or password.
    #[error("invalid login credentials")]
    InvalidCredentials,
    /// The account exists but the email was never confirmed.
    #[error("email address not confirmed")]
    EmailNotConfirmed,
    /// Too many attempts in a short window.
    #[error("too many requests")]
    RateLimited,
    /// The refresh token or its session no longer exists.
    #[error("session expired")]
    SessionExpired,
    /// The account was banned or disabled.
    #[error("account disabled")]
    AccountDisabled,
    /// The service could not be reached.
    #[error("identity service unreachable: {0}")]
    Network(String),
    /// Any other refusal.
    #[error("identity service error ({status}): {message}")]
    Unexpected {
        /// HTTP status code.
        status: u16,
        /// Message reported by the service.
        message: String,
    },
}

/// Error body returned by the auth service. Older deployments use
/// `error`/`error_description`, newer ones `error_code`/`msg`.
#[derive(Debug, Default, Deserialize)]
pub struct AuthErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
    #[serde(default)]
    pub error_code: Option<String>,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl AuthErrorBody {
    fn text(&self) -> String {
        self.msg
            .as_ref()
            .or(self.error_description.as_ref())
            .or(self.message.as_ref())
            .or(self.error.as_ref())
            .cloned()
            .unwrap_or_default()
    }
}

impl AuthFailure {
    /// Classify a non-success response.
    pub fn classify(status: u16, body: &AuthErrorBody) -> Self {
        let code = body.error_code.as_deref().unwrap_or_default();
        let text = body.text();
        let lowered = text.to_lowercase();

        if status == 429 || code.starts_with("over_") || lowered.contains("rate limit") {
            Self::RateLimited
        } else if code == "email_not_confirmed" || lowered.contains("email not confirmed") {
            Self::EmailNotConfirmed
        } else if matches!(
            code,
            "refresh_token_not_found" | "refresh_token_already_used" | "session_not_found"
        ) || lowered.contains("invalid refresh token")
        {
            Self::SessionExpired
        } else if code == "user_banned" || lowered.contains("banned") || lowered.contains("disabled")
        {
            Self::AccountDisabled
        } else if code == "invalid_credentials"
            || body.error.as_deref() == Some("invalid_grant")
            || lowered.contains("invalid login credentials")
        {
            Self::InvalidCredentials
        } else {
            Self::Unexpected {
                status,
                message: text,
            }
        }
    }

    /// Localized message shown to the dashboard user.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "Correo o contraseña incorrectos.",
            Self::EmailNotConfirmed => {
                "Debe confirmar su correo electrónico antes de iniciar sesión."
            }
            Self::RateLimited => "Demasiados intentos. Espere unos minutos e inténtelo de nuevo.",
            Self::SessionExpired => "Su sesión ha expirado. Inicie sesión de nuevo.",
            Self::AccountDisabled => "Su cuenta está desactivada. Contacte al administrador.",
            Self::Network(_) => "No se pudo conectar con el servidor de autenticación.",
            Self::Unexpected { .. } => "Error inesperado al autenticar. Inténtelo de nuevo.",
        }
    }

    fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidCredentials
            | Self::EmailNotConfirmed
            | Self::SessionExpired
            | Self::AccountDisabled => ErrorKind::Authentication,
            Self::RateLimited => ErrorKind::RateLimit,
            Self::Network(_) | Self::Unexpected { .. } => ErrorKind::ExternalService,
        }
    }
}

impl From<AuthFailure> for AppError {
    fn from(failure: AuthFailure) -> Self {
        AppError::with_source(failure.kind(), failure.user_message(), failure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(json: serde_json::Value) -> AuthErrorBody {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_classify_current_format() {
        let b = body(serde_json::json!({
            "code": 400,
            "error_code": "invalid_credentials",
            "msg": "Invalid login credentials"
        }));
        assert_eq!(AuthFailure::classify(400, &b), AuthFailure::InvalidCredentials);

        let b = body(serde_json::json!({"error_code": "email_not_confirmed", "msg": "Email not confirmed"}));
        assert_eq!(AuthFailure::classify(400, &b), AuthFailure::EmailNotConfirmed);
    }

    #[test]
    fn test_classify_legacy_format() {
        let b = body(serde_json::json!({
            "error": "invalid_grant",
            "error_description": "Invalid login credentials"
        }));
        assert_eq!(AuthFailure::classify(400, &b), AuthFailure::InvalidCredentials);
    }

    #[test]
    fn test_classify_rate_limit_and_ban() {
        assert_eq!(
            AuthFailure::classify(429, &AuthErrorBody::default()),
            AuthFailure::RateLimited
        );
        let b = body(serde_json::json!({"error_code": "user_banned", "msg": "User is banned"}));
        assert_eq!(AuthFailure::classify(400, &b), AuthFailure::AccountDisabled);
    }

    #[test]
    fn test_classify_rejected_refresh_token() {
        for code in ["refresh_token_not_found", "refresh_token_already_used", "session_not_found"] {
            let b = body(serde_json::json!({"code": 400, "error_code": code, "msg": "Invalid Refresh Token"}));
            assert_eq!(AuthFailure::classify(400, &b), AuthFailure::SessionExpired);
        }

        let b = body(serde_json::json!({"msg": "Invalid Refresh Token: Refresh Token Not Found"}));
        let err: AppError = AuthFailure::classify(400, &b).into();
        assert!(err.is(ErrorKind::Authentication));
    }

    #[test]
    fn test_conversion_keeps_localized_message() {
        let err: AppError = AuthFailure::RateLimited.into();
        assert!(err.is(ErrorKind::RateLimit));
        assert!(err.message.starts_with("Demasiados intentos"));

        let err: AppError = AuthFailure::InvalidCredentials.into();
        assert!(err.is(ErrorKind::Authentication));
    }
}
