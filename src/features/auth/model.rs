use serde::{Deserialize, Serialize};

/// Caller identity resolved from a validated access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    /// Subject claim of the identity provider
    pub sub: String,
}

impl AuthenticatedUser {
    pub fn new(sub: impl Into<String>) -> Self {
        Self { sub: sub.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_carries_only_subject() {
        let user = AuthenticatedUser::new("user-1");
        assert_eq!(
            serde_json::to_value(&user).unwrap(),
            serde_json::json!({ "sub": "user-1" })
        );
    }
}
