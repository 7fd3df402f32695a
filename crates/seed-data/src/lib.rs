//! Sample workers, clients and projects for the staff database.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use seed_data::prelude::*;
//!
//! let catalog = SeedCatalog::sample();
//! let report = Seeder::new(&mut executor).seed(&catalog).await?;
//! ```

pub mod catalog;
pub mod db;

pub mod prelude {
    //! Convenient re-exports for common usage.

    pub use crate::catalog::SeedCatalog;
    pub use crate::db::{SeedError, SeedReport, Seeder};
}
