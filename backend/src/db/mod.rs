//! Storage layer for planning data.
//!
//! Storage is reached through the Repository pattern so that the service
//! layer never depends on a concrete backend.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  HTTP handlers (http/)                                   │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Services (services/) - exclusion chain, rotation,       │
//! │  alerts, replacements, import                            │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Repository Traits (repository/) - tenant-scoped ports   │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//!     ┌───────────────▼──────────────────────────────┐
//!     │             Local Repository                  │
//!     │       (in-memory, JSON fixture seeding)       │
//!     └──────────────────────────────────────────────┘
//! ```

pub mod factory;
pub mod repositories;
pub mod repository;

pub use factory::{RepositoryFactory, RepositoryType};
pub use repositories::LocalRepository;
pub use repository::{
    ErrorContext, FullRepository, RepositoryError, RepositoryResult,
};
