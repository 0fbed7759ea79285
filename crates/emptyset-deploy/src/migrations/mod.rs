//! Tagged migration scripts, run in registration order.

mod migration_reserve;

pub use migration_reserve::{
    MigrationReserveArbitrum,
    MigrationReserveOptimism,
};

use crate::deployer::Deployer;
use crate::error::{
    DeployError,
    DeployResult,
};
use async_trait::async_trait;
use tracing::info;

/// One migration script.
#[async_trait]
pub trait Migration: Send + Sync {
    /// Stable identifier, used in logs.
    fn name(&self) -> &'static str;

    /// Tags the script is selectable by from the command line.
    fn tags(&self) -> &'static [&'static str];

    async fn run(&self, deployer: &Deployer) -> DeployResult;
}

/// Holds the registered migrations and dispatches them by tag.
#[derive(Default)]
pub struct MigrationRunner {
    migrations: Vec<Box<dyn Migration>>,
}

impl MigrationRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// A runner with every built-in script registered.
    pub fn standard() -> Self {
        let mut runner = Self::new();
        runner.register(Box::new(MigrationReserveOptimism));
        runner.register(Box::new(MigrationReserveArbitrum));
        runner
    }

    pub fn register(&mut self, migration: Box<dyn Migration>) {
        self.migrations.push(migration);
    }

    pub fn is_empty(&self) -> bool {
        self.migrations.is_empty()
    }

    /// Runs every migration carrying `tag`, failing fast on the first
    /// error. An unknown tag is an error rather than a silent no-op.
    pub async fn run_tag(&self, deployer: &Deployer, tag: &str) -> DeployResult {
        let selected: Vec<_> = self
            .migrations
            .iter()
            .filter(|migration| migration.tags().contains(&tag))
            .collect();
        if selected.is_empty() {
            return Err(DeployError::UnknownTag(tag.to_string()));
        }
        for migration in selected {
            info!(migration = migration.name(), tag, "running migration");
            migration.run(deployer).await?;
        }
        Ok(())
    }

    pub async fn run_all(&self, deployer: &Deployer) -> DeployResult {
        for migration in &self.migrations {
            info!(migration = migration.name(), "running migration");
            migration.run(deployer).await?;
        }
        Ok(())
    }
}
