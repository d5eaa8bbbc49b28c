//! Default values shared by the settings tree

/// HTTP server defaults
pub mod server {
    /// Port used when neither config nor `PORT` says otherwise
    pub const DEFAULT_PORT: u16 = 5002;
    pub const DEFAULT_HOST: &str = "0.0.0.0";
    pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
}

/// Dialogue defaults
pub mod dialogue {
    /// Distinct session keys kept before the whole store is wiped
    pub const MAX_SESSIONS: usize = 1000;
}

/// Lead storage defaults
pub mod persistence {
    pub const SQLITE_PATH: &str = "leads.db";
    pub const POOL_SIZE: u32 = 4;
}

/// Mail relay defaults
pub mod mail {
    pub const SMTP_HOST: &str = "smtp.gmail.com";
    /// STARTTLS submission port
    pub const SMTP_PORT: u16 = 587;
    pub const TIMEOUT_SECONDS: u64 = 10;
    pub const QUEUE_CAPACITY: usize = 256;
    pub const SUBJECT: &str = "New property lead";
}

/// Admin dashboard defaults
pub mod admin {
    pub const REALM: &str = "admin";
}
