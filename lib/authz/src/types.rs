//! Wire messages for the policy service `Check` call.

/// Request for a permission check.
#[derive(Clone, PartialEq, Eq, prost::Message)]
pub struct CheckRequest {
    /// Bearer token from the session cookie. Empty for anonymous callers.
    #[prost(string, tag = "1")]
    pub bearer_token: String,
    /// Permissions the handler declared, in declaration order.
    #[prost(string, repeated, tag = "2")]
    pub permissions: Vec<String>,
}

impl CheckRequest {
    /// Creates a new check request.
    #[must_use]
    pub fn new(bearer_token: impl Into<String>, permissions: Vec<String>) -> Self {
        Self {
            bearer_token: bearer_token.into(),
            permissions,
        }
    }
}

/// Reply to a permission check.
#[derive(Clone, PartialEq, Eq, prost::Message)]
pub struct CheckReply {
    /// Whether every requested permission is granted.
    #[prost(bool, tag = "1")]
    pub can_access: bool,
    /// Every permission granted to the token, not only the requested ones.
    #[prost(string, repeated, tag = "2")]
    pub permissions: Vec<String>,
}

impl CheckReply {
    /// A reply granting access with the given permission set.
    #[must_use]
    pub fn granted<I, S>(permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            can_access: true,
            permissions: permissions.into_iter().map(Into::into).collect(),
        }
    }

    /// A reply denying access.
    #[must_use]
    pub fn denied() -> Self {
        Self {
            can_access: false,
            permissions: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost::Message;

    #[test]
    fn request_encodes_token_and_permissions() {
        let request = CheckRequest::new("tok", vec!["read".to_string(), "write".to_string()]);
        let bytes = request.encode_to_vec();
        let decoded = CheckRequest::decode(bytes.as_slice()).expect("decode");
        assert_eq!(decoded.bearer_token, "tok");
        assert_eq!(decoded.permissions, vec!["read", "write"]);
    }

    #[test]
    fn default_reply_denies() {
        let reply = CheckReply::default();
        assert!(!reply.can_access);
        assert!(reply.permissions.is_empty());
    }

    #[test]
    fn granted_reply_carries_permissions() {
        let reply = CheckReply::granted(["read", "write"]);
        assert!(reply.can_access);
        assert_eq!(reply.permissions, vec!["read", "write"]);
    }
}
