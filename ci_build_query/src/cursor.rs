//! Opaque continuation cursors.
//!
//! A token is the lowercase hex encoding of `{"after_id":N}`, where `N` is
//! the id of the last build scanned by the previous page.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// Upper bound on accepted token length; real tokens are a few dozen chars.
const MAX_TOKEN_LEN: usize = 256;

#[derive(Debug, Error)]
pub enum CursorError {
    #[error("cursor token is empty")]
    Empty,

    #[error("cursor token exceeds {max} characters")]
    TooLong { max: usize },

    #[error("cursor token is not hex: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("cursor token payload is malformed: {0}")]
    Payload(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageCursor {
    after_id: i64,
}

impl PageCursor {
    /// Resume strictly after the build with this id.
    pub fn after(id: i64) -> Self {
        Self { after_id: id }
    }

    pub fn after_id(&self) -> i64 {
        self.after_id
    }

    pub fn encode(&self) -> String {
        let payload = serde_json::json!({ "after_id": self.after_id });
        hex::encode(payload.to_string())
    }

    pub fn decode(token: &str) -> Result<Self, CursorError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(CursorError::Empty);
        }
        if token.len() > MAX_TOKEN_LEN {
            return Err(CursorError::TooLong { max: MAX_TOKEN_LEN });
        }
        let bytes = hex::decode(token)?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}
