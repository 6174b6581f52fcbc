//! Command implementations.

pub mod admin;
pub mod cart;

use thiserror::Error;

use dacsan_admin::AdminError;
use dacsan_storefront::{ConfigError as StorefrontConfigError, StorageError};

/// Errors a command can end with.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Storefront configuration could not be loaded.
    #[error("Storefront configuration error: {0}")]
    StorefrontConfig(#[from] StorefrontConfigError),

    /// The cart storage directory could not be opened.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// A template failed to render.
    #[error("Render error: {0}")]
    Render(#[from] askama::Error),

    /// An admin command failed.
    #[error(transparent)]
    Admin(#[from] AdminError),

    /// Writing the output failed.
    #[error("Output error: {0}")]
    Io(#[from] std::io::Error),
}

impl CommandError {
    /// Log the failure; admin failures also go through their own reporting.
    pub fn report(&self) {
        match self {
            Self::Admin(e) => e.report(),
            _ => tracing::error!("Command failed: {self}"),
        }
    }
}
