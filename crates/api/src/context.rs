/// Identity of the caller, derived from a verified bearer token.
///
/// Inserted into request extensions by the auth middleware; present on
/// every protected route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserContext {
    username: String,
}

impl UserContext {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}
