//! Repository factory for dependency injection.
//!
//! Builds the repository instance selected by the `[storage]` configuration.

use std::str::FromStr;
use std::sync::Arc;

use tracing::info;

use super::repositories::LocalRepository;
use super::repository::{FullRepository, RepositoryError, RepositoryResult};
use crate::config::StorageConfig;

/// Repository type configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryType {
    /// In-memory local repository
    Local,
}

impl FromStr for RepositoryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" | "memory" | "in-memory" => Ok(Self::Local),
            _ => Err(format!("Unknown repository type: {}", s)),
        }
    }
}

/// Repository factory for creating repository instances.
///
/// # Example
/// ```
/// use shiftplan::config::StorageConfig;
/// use shiftplan::db::RepositoryFactory;
///
/// let repo = RepositoryFactory::from_config(&StorageConfig::default()).unwrap();
/// # let _ = repo;
/// ```
pub struct RepositoryFactory;

impl RepositoryFactory {
    /// Create an empty in-memory local repository.
    pub fn create_local() -> Arc<dyn FullRepository> {
        Arc::new(LocalRepository::new())
    }

    /// Create the repository described by `config`, loading its fixture when set.
    pub fn from_config(config: &StorageConfig) -> RepositoryResult<Arc<dyn FullRepository>> {
        let repo_type = RepositoryType::from_str(&config.repo_type).map_err(|e| {
            RepositoryError::configuration(format!("Invalid repository type: {}", e))
        })?;

        match repo_type {
            RepositoryType::Local => match &config.fixture_path {
                Some(path) => {
                    info!(fixture = %path.display(), "Loading local repository fixture");
                    Ok(Arc::new(LocalRepository::from_fixture_file(path)?))
                }
                None => Ok(Self::create_local()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_type_parsing() {
        assert_eq!("local".parse::<RepositoryType>(), Ok(RepositoryType::Local));
        assert_eq!("MEMORY".parse::<RepositoryType>(), Ok(RepositoryType::Local));
        assert!("postgres".parse::<RepositoryType>().is_err());
    }

    #[test]
    fn test_unknown_type_is_configuration_error() {
        let config = StorageConfig {
            repo_type: "cassandra".to_string(),
            fixture_path: None,
        };
        let err = RepositoryFactory::from_config(&config).err().unwrap();
        assert!(matches!(err, RepositoryError::ConfigurationError { .. }));
    }

    #[test]
    fn test_missing_fixture_file_fails() {
        let config = StorageConfig {
            repo_type: "local".to_string(),
            fixture_path: Some("/nonexistent/fixture.json".into()),
        };
        assert!(RepositoryFactory::from_config(&config).is_err());
    }
}
