use lifecycle::{PowerAction, PowerStateSnapshot, ShutdownAttempt};
use serde::{Deserialize, Serialize};

// === REQUEST STRUCTURES ===

#[derive(Debug, Deserialize)]
pub struct PowerInvokeRequest {
    pub action: PowerAction,
    #[serde(default)]
    pub comment: String,
}

#[derive(Debug, Deserialize)]
pub struct FlagRequest {
    pub value: bool,
}

// === RESPONSE DATA ===

#[derive(Debug, Serialize)]
pub struct InvokeAccepted {
    pub invocation_id: String,
    pub action: PowerAction,
}

#[derive(Debug, Serialize)]
pub struct AbortResult {
    pub aborted: bool,
}

#[derive(Debug, Serialize)]
pub struct PowerStatus {
    pub state: PowerStateSnapshot,
    pub sequence_active: bool,
    pub last_attempt: Option<ShutdownAttempt>,
}

// === RESPONSE STRUCTURE ===

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success_with_data(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}
