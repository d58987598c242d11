use serde::{Deserialize, Serialize};

use crate::core::error::{AppError, Result};

/// Response envelope shared by every marketplace API endpoint.
///
/// `success=false` is an application-level failure even on HTTP 2xx.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

impl<T> ApiResponse<T> {
    pub fn error(message: Option<String>, errors: Option<Vec<String>>) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            message,
            data: None,
            errors,
        }
    }

    /// Turn a rejected envelope into an error, keep an accepted one.
    pub fn check(self, status: u16) -> Result<Self> {
        if self.success {
            Ok(self)
        } else {
            Err(AppError::api(Some(status), self.message, self.errors))
        }
    }

    /// Extract `data` from an accepted envelope; missing data is a malformed reply.
    pub fn into_data(self, status: u16) -> Result<T> {
        let envelope = self.check(status)?;
        envelope.data.ok_or_else(|| {
            AppError::api(
                Some(status),
                Some("Response did not include data".to_string()),
                None,
            )
        })
    }
}

impl ApiResponse<bool> {
    /// Acknowledgment endpoints may answer with `data: null`; `success` then decides.
    pub fn into_ack(self, status: u16) -> Result<bool> {
        let envelope = self.check(status)?;
        Ok(envelope.data.unwrap_or(envelope.success))
    }
}
