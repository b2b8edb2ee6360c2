//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (buffer sizes, timeouts, connection cap)
//! - Check that the base directory exists
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function over the config and the filesystem metadata
//!   of the base directory
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

use crate::config::schema::ServerConfig;

/// A single semantic problem with a config.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("listener.bind_address {0:?} is not a socket address")]
    BindAddress(String),

    #[error("listener.max_connections must be greater than zero")]
    ZeroConnections,

    #[error("limits.read_buffer_bytes must be greater than zero")]
    ZeroReadBuffer,

    #[error("limits.max_request_bytes ({max}) is smaller than limits.read_buffer_bytes ({buffer})")]
    RequestLimitBelowBuffer { max: usize, buffer: usize },

    #[error("timeouts.read_secs must be greater than zero")]
    ZeroReadTimeout,

    #[error("files.directory {0:?} is not an existing directory")]
    Directory(PathBuf),
}

/// Check a config, collecting every problem found.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }
    if config.listener.max_connections == 0 {
        errors.push(ValidationError::ZeroConnections);
    }

    let limits = &config.limits;
    if limits.read_buffer_bytes == 0 {
        errors.push(ValidationError::ZeroReadBuffer);
    } else if limits.max_request_bytes < limits.read_buffer_bytes {
        errors.push(ValidationError::RequestLimitBelowBuffer {
            max: limits.max_request_bytes,
            buffer: limits.read_buffer_bytes,
        });
    }

    if config.timeouts.read_secs == 0 {
        errors.push(ValidationError::ZeroReadTimeout);
    }

    if !config.files.directory.is_dir() {
        errors.push(ValidationError::Directory(config.files.directory.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(validate_config(&ServerConfig::default()), Ok(()));
    }

    #[test]
    fn collects_every_error() {
        let mut config = ServerConfig::default();
        config.listener.bind_address = "localhost".into();
        config.limits.read_buffer_bytes = 4096;
        config.limits.max_request_bytes = 1024;
        config.timeouts.read_secs = 0;
        config.files.directory = PathBuf::from("/definitely/not/here");

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::BindAddress("localhost".into()),
                ValidationError::RequestLimitBelowBuffer {
                    max: 1024,
                    buffer: 4096
                },
                ValidationError::ZeroReadTimeout,
                ValidationError::Directory(PathBuf::from("/definitely/not/here")),
            ]
        );
    }

    #[test]
    fn file_is_not_a_directory() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let mut config = ServerConfig::default();
        config.files.directory = file.path().to_path_buf();

        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::Directory(file.path().to_path_buf())])
        );
    }
}
