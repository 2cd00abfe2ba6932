// Run configuration: everything the importer needs to know about the
// target system and the requested behaviour. Assembled once in `main`
// (flags, environment, interactive prompts) and never mutated afterwards.

use base64::{engine::general_purpose::STANDARD, Engine as _};

/// Username plus the Basic-auth token derived from `username:password`.
/// The plain password is not kept around after the token is built.
#[derive(Clone)]
pub struct Credentials {
    username: String,
    token: String,
}

impl Credentials {
    pub fn new(username: &str, password: &str) -> Self {
        let token = STANDARD.encode(format!("{}:{}", username, password));
        Credentials {
            username: username.to_string(),
            token,
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Value for the `Authorization` header.
    pub fn authorization(&self) -> String {
        format!("Basic {}", self.token)
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Behaviour switches taken from the command line.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunFlags {
    /// Report what would be created without issuing any request.
    pub dry_run: bool,
    /// Print every outgoing payload and every response.
    pub verbose: bool,
    /// Skip the remote existence and dependency checks.
    pub skip_validation: bool,
    /// Create resources even when one with the same name already exists.
    pub force: bool,
}

#[derive(Debug, Clone)]
pub struct RunConfig {
    base_url: String,
    credentials: Credentials,
    flags: RunFlags,
}

impl RunConfig {
    pub fn new(base_url: &str, credentials: Credentials, flags: RunFlags) -> Self {
        RunConfig {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            credentials,
            flags,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn flags(&self) -> RunFlags {
        self.flags
    }

    /// Existence and dependency lookups only run against a real target
    /// and only when the user did not opt out of them.
    pub fn remote_checks(&self) -> bool {
        !self.flags.skip_validation && !self.flags.dry_run
    }
}
