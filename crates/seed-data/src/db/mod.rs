//! Database integration for seeding sample data.
//!
//! The [`Seeder`] inserts a [`crate::catalog::SeedCatalog`] table by table
//! through `staffdb`'s generic insertion service.

mod seeder;

pub use seeder::{CLIENT_INSERT, PROJECT_INSERT, SeedError, SeedReport, Seeder, WORKER_INSERT};
