// Access control decisions.

use serde::{Deserialize, Serialize};

use snap_auth::Subject;

/// Operations a subject can attempt on a stored screenshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Read,
    Delete,
}

/// How reads are authorized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReadPolicy {
    /// Possession of the unguessable id is itself the capability; no token
    /// is required to read.
    CapabilityLink,
    /// Reads require any valid token.
    RequireToken,
}

impl Default for ReadPolicy {
    fn default() -> Self {
        Self::CapabilityLink
    }
}

impl ReadPolicy {
    /// Parse from a configuration string
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "capability-link" => Some(Self::CapabilityLink),
            "require-token" => Some(Self::RequireToken),
            _ => None,
        }
    }
}

/// Why an operation was denied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// The operation requires a validated token and none was presented
    TokenRequired,
    /// The requester is not the owning subject
    NotOwner,
}

/// Outcome of an authorization check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Allow,
    Deny(DenyReason),
}

impl AccessDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Decide whether `subject` may perform `operation` on a screenshot owned by
/// `owner`.
///
/// Pure function with no stored state: it consumes the token validator's
/// output (`subject`, `None` for anonymous callers) and the store's
/// ownership field. Reads follow `policy`; deletion is owner-only always.
pub fn authorize(
    subject: Option<&Subject>,
    operation: Operation,
    owner: &Subject,
    policy: ReadPolicy,
) -> AccessDecision {
    match operation {
        Operation::Read => match policy {
            ReadPolicy::CapabilityLink => AccessDecision::Allow,
            ReadPolicy::RequireToken => {
                if subject.is_some() {
                    AccessDecision::Allow
                } else {
                    AccessDecision::Deny(DenyReason::TokenRequired)
                }
            }
        },
        Operation::Delete => match subject {
            Some(s) if s == owner => AccessDecision::Allow,
            Some(_) => AccessDecision::Deny(DenyReason::NotOwner),
            None => AccessDecision::Deny(DenyReason::TokenRequired),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner() -> Subject {
        Subject::from("alice")
    }

    #[test]
    fn capability_link_allows_anonymous_reads() {
        let decision = authorize(None, Operation::Read, &owner(), ReadPolicy::CapabilityLink);
        assert!(decision.is_allowed());
    }

    #[test]
    fn require_token_denies_anonymous_reads() {
        let decision = authorize(None, Operation::Read, &owner(), ReadPolicy::RequireToken);
        assert_eq!(decision, AccessDecision::Deny(DenyReason::TokenRequired));
    }

    #[test]
    fn require_token_allows_any_authenticated_read() {
        let bob = Subject::from("bob");
        let decision = authorize(
            Some(&bob),
            Operation::Read,
            &owner(),
            ReadPolicy::RequireToken,
        );
        assert!(decision.is_allowed());
    }

    #[test]
    fn delete_is_owner_only() {
        let alice = owner();
        let bob = Subject::from("bob");

        assert!(authorize(
            Some(&alice),
            Operation::Delete,
            &alice,
            ReadPolicy::CapabilityLink
        )
        .is_allowed());

        assert_eq!(
            authorize(
                Some(&bob),
                Operation::Delete,
                &alice,
                ReadPolicy::CapabilityLink
            ),
            AccessDecision::Deny(DenyReason::NotOwner)
        );

        assert_eq!(
            authorize(None, Operation::Delete, &alice, ReadPolicy::CapabilityLink),
            AccessDecision::Deny(DenyReason::TokenRequired)
        );
    }
}
