//! Persistence layer for the realty lead agent
//!
//! Provides:
//! - Lead storage (SQLite via an r2d2 pool, or an in-process list)
//! - Lead notification over an SMTP relay, delivered from a background queue

pub mod error;
pub mod leads;
pub mod notify;

pub use error::{NotifyError, PersistenceError};
pub use leads::{InMemoryLeadStore, LeadStore, SqliteLeadStore};
pub use notify::{LeadNotifier, NoopLeadNotifier, NotificationDispatcher, SmtpLeadNotifier};

use std::sync::Arc;

use realty_agent_config::{MailConfig, PersistenceConfig};

/// Build the lead store selected by configuration
pub fn lead_store_from_config(
    config: &PersistenceConfig,
) -> Result<Arc<dyn LeadStore>, PersistenceError> {
    if config.enabled {
        let store = SqliteLeadStore::open(&config.sqlite_path, config.pool_size)?;
        tracing::info!(path = %config.sqlite_path, "Using SQLite lead store");
        Ok(Arc::new(store))
    } else {
        tracing::info!("Lead persistence disabled, keeping leads in memory");
        Ok(Arc::new(InMemoryLeadStore::new()))
    }
}

/// Build the lead notifier selected by configuration
///
/// A relay that cannot be set up is logged and replaced by the no-op
/// notifier; lead capture never depends on mail.
pub fn lead_notifier_from_config(config: &MailConfig) -> Arc<dyn LeadNotifier> {
    if !config.enabled {
        return Arc::new(NoopLeadNotifier);
    }

    match SmtpLeadNotifier::new(config) {
        Ok(notifier) => {
            tracing::info!(host = %config.smtp_host, port = config.smtp_port, "Lead notifications enabled");
            Arc::new(notifier)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to set up SMTP relay, lead notifications disabled");
            Arc::new(NoopLeadNotifier)
        }
    }
}
