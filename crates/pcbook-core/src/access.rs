// crates/pcbook-core/src/access.rs
//
// Static access policy: fully-qualified RPC method path -> roles allowed to
// call it. Methods without an entry are open to everyone.

use std::collections::HashMap;

/// Read-only after construction; build it with `allow`.
#[derive(Debug, Clone, Default)]
pub struct AccessPolicy {
    roles: HashMap<String, Vec<String>>,
}

impl AccessPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict `method` to the given roles. Keys are matched verbatim.
    pub fn allow<I, S>(mut self, method: &str, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles
            .insert(method.to_string(), roles.into_iter().map(Into::into).collect());
        self
    }

    /// Roles allowed to call `method`, or `None` when the method is public.
    pub fn allowed_roles(&self, method: &str) -> Option<&[String]> {
        self.roles.get(method).map(Vec::as_slice)
    }

    /// Whether a call to `method` needs a token at all.
    pub fn is_protected(&self, method: &str) -> bool {
        self.roles.contains_key(method)
    }

    /// Every protected method path, e.g. to configure a client.
    pub fn protected_methods(&self) -> impl Iterator<Item = &str> {
        self.roles.keys().map(String::as_str)
    }
}
