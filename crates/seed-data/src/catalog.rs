//! The fixed sample data set.

use staffdb::{Client, Level, Project, Worker};
use time::{Date, macros::date};
use tracing::info;

/// Sample workers all use `<lowercased name>@example.com`.
fn worker(name: &str, birthday: Date, level: Level, salary: i32) -> Worker {
    let email = format!("{}@example.com", name.to_lowercase());
    Worker::new(name, birthday, email, level, salary)
}

/// Immutable sample workers, clients and projects.
///
/// Project `client_id`s refer to clients by their 1-based position in
/// [`SeedCatalog::clients`], which matches the serial ids a fresh `client`
/// table hands out when clients are inserted first and in order.
#[derive(Debug, Clone)]
pub struct SeedCatalog {
    workers: Vec<Worker>,
    clients: Vec<Client>,
    projects: Vec<Project>,
}

impl SeedCatalog {
    /// Builds the sample catalog.
    pub fn sample() -> Self {
        let workers = vec![
            worker("Alice", date!(2001 - 08 - 20), Level::Senior, 100000),
            worker("Bob", date!(1995 - 10 - 11), Level::Middle, 20000),
            worker("Eve", date!(2000 - 01 - 01), Level::Senior, 32000),
            worker("Whiskers", date!(2015 - 06 - 01), Level::Trainee, 10000),
            worker("Purrito", date!(2020 - 03 - 21), Level::Junior, 15000),
            worker("Pawsters", date!(2021 - 01 - 30), Level::Trainee, 950),
            worker("Meowiarty", date!(2021 - 01 - 30), Level::Senior, 29000),
            worker("Purrlock", date!(2011 - 07 - 12), Level::Middle, 22000),
            worker("Clawster", date!(2019 - 04 - 01), Level::Middle, 22000),
            worker("Buttercup", date!(2020 - 09 - 27), Level::Middle, 32000),
            worker("ET", date!(1901 - 01 - 01), Level::Senior, 100000),
        ];

        let clients = vec![
            Client::new("Whiskers and Paw Co."),
            Client::new("Purrfect Solutions"),
            Client::new("Meowster Inc."),
            Client::new("Clawtastic Creations"),
            Client::new("Snack Caterprises"),
        ];

        let projects = vec![
            Project::new("Purrfectly Crafted", 1, date!(2023 - 01 - 01), date!(2023 - 10 - 31)),
            Project::new("Whisker Wonderland", 2, date!(2022 - 05 - 15), date!(2024 - 05 - 15)),
            Project::new("Meowgical Moments", 3, date!(2023 - 02 - 01), date!(2023 - 07 - 31)),
            Project::new(
                "Pawsitively Adorable Designs",
                4,
                date!(2015 - 06 - 01),
                date!(2023 - 10 - 01),
            ),
            Project::new("Cattitude Chronicles", 5, date!(2021 - 08 - 01), date!(2023 - 02 - 01)),
            Project::new("Feline Fine Art", 3, date!(2023 - 06 - 01), date!(2023 - 08 - 31)),
            Project::new("The Whisker Whisperer", 2, date!(2022 - 07 - 01), date!(2023 - 06 - 30)),
            Project::new(
                "Paw Prints & Paintbrushes",
                3,
                date!(2018 - 01 - 01),
                date!(2022 - 02 - 28),
            ),
            Project::new("Meowsterpiece Gallery", 4, date!(2023 - 07 - 01), date!(2023 - 08 - 31)),
            Project::new("Fur-tastic Finds", 4, date!(2023 - 03 - 01), date!(2023 - 09 - 30)),
            Project::new("Cat-astrophic Cuteness", 1, date!(2015 - 07 - 01), date!(2023 - 10 - 31)),
        ];

        let catalog = Self {
            workers,
            clients,
            projects,
        };
        info!("Number of workers: {}", catalog.workers.len());
        info!("Number of clients: {}", catalog.clients.len());
        info!("Number of projects: {}", catalog.projects.len());
        catalog
    }

    pub fn workers(&self) -> &[Worker] {
        &self.workers
    }

    pub fn clients(&self) -> &[Client] {
        &self.clients
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }
}
