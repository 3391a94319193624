// Static operation-to-handler mapping.
//
// The facade parses and validates wire input, then hands the service a
// strongly typed `Request`. One match arm per operation; there is no
// dynamic routing table to fall through.

use bytes::Bytes;
use chrono::{DateTime, Utc};

use snap_auth::Subject;
use snap_store::{Screenshot, ScreenshotId, ScreenshotMeta};

use crate::error::ServiceResult;
use crate::service::{IssuedToken, ScreenshotService};

/// A fully validated inbound request
#[derive(Debug, Clone)]
pub enum Request {
    /// Mint a token for an already-authenticated subject
    IssueToken { subject: Subject },
    /// Store a screenshot under the token's subject
    Upload {
        token: String,
        content: Bytes,
        content_type: String,
    },
    /// Fetch a screenshot; the token is optional under the capability-link
    /// read policy
    Fetch {
        token: Option<String>,
        id: ScreenshotId,
    },
    /// Delete a screenshot owned by the token's subject
    Delete { token: String, id: ScreenshotId },
    /// List the token's subject's most recent screenshots
    Recent { token: String, limit: usize },
}

/// The typed response for each request variant
#[derive(Debug, Clone)]
pub enum Response {
    Token(IssuedToken),
    Created { id: ScreenshotId },
    Screenshot(Screenshot),
    Deleted,
    Listing(Vec<ScreenshotMeta>),
}

impl ScreenshotService {
    /// Route a request to its handler.
    pub async fn dispatch(&self, request: Request, now: DateTime<Utc>) -> ServiceResult<Response> {
        match request {
            Request::IssueToken { subject } => {
                Ok(Response::Token(self.issue_token(&subject, now)?))
            }
            Request::Upload {
                token,
                content,
                content_type,
            } => {
                let id = self.upload(&token, content, &content_type, now).await?;
                Ok(Response::Created { id })
            }
            Request::Fetch { token, id } => {
                let screenshot = self.fetch(token.as_deref(), &id, now).await?;
                Ok(Response::Screenshot(screenshot))
            }
            Request::Delete { token, id } => {
                self.remove(&token, &id, now).await?;
                Ok(Response::Deleted)
            }
            Request::Recent { token, limit } => {
                let listing = self.recent(&token, limit, now).await?;
                Ok(Response::Listing(listing))
            }
        }
    }
}
