use std::time::Duration;

use clap::Parser;

/// Everything a run needs, fixed before it starts.
#[derive(Debug, Clone, PartialEq)]
pub struct SeedConfig {
    /// Drop the whole database before uploading.
    pub reset: bool,
    /// Clear and refill collections no matter how many documents they hold.
    pub force: bool,
    /// A collection at or above this count is left alone unless `force` is set.
    pub min_docs: u64,
    pub batch_size: usize,
    /// Pause after each successful batch, also the base of the rate limit backoff.
    pub batch_delay: Duration,
    pub seed: Option<u64>,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            reset: false,
            force: false,
            min_docs: 50,
            batch_size: 10,
            batch_delay: Duration::from_secs(2),
            seed: None,
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Args {
    /// Drop the database before uploading
    #[arg(long)]
    reset: bool,

    /// Delete and re-insert even when collections are already populated
    #[arg(long)]
    force: bool,

    #[arg(long, default_value_t = 50)]
    min_docs: u64,

    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..))]
    batch_size: u64,

    /// Seconds to wait after each successful batch
    #[arg(long, default_value_t = 2.0)]
    batch_delay: f64,

    /// Seed for reproducible data
    #[arg(long)]
    seed: Option<u64>,
}

impl Args {
    pub fn into_config(self) -> SeedConfig {
        SeedConfig {
            reset: self.reset,
            force: self.force,
            min_docs: self.min_docs,
            batch_size: usize::try_from(self.batch_size).unwrap_or(usize::MAX),
            batch_delay: Duration::try_from_secs_f64(self.batch_delay).unwrap_or_default(),
            seed: self.seed,
        }
    }
}
