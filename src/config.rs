//! Configuration builders controlling training, encoding, and corpus ingestion.

use serde::{Deserialize, Serialize};

use crate::error::{EmlangError, Result};

/// Configuration for codebook training.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrainerConfig {
    /// Number of most frequent words that receive a symbolic token.
    pub vocab_size: usize,
    /// Seed for the deterministic symbol assignment.
    pub seed: u64,
    /// Words occurring fewer times than this are never symbolized.
    pub min_frequency: usize,
    /// Enables the training summary through the `log` facade.
    pub show_progress: bool,
}

impl TrainerConfig {
    /// Returns a builder initialised with [`TrainerConfig::default`].
    #[must_use]
    pub fn builder() -> TrainerBuilder {
        TrainerBuilder::default()
    }

    /// Validates the invariants required for training.
    pub fn validate(&self) -> Result<()> {
        if self.min_frequency == 0 {
            return Err(EmlangError::InvalidConfig(
                "min_frequency must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            vocab_size: 500,
            seed: 42,
            min_frequency: 1,
            show_progress: true,
        }
    }
}

/// Builder for [`TrainerConfig`].
#[derive(Debug, Default, Clone)]
pub struct TrainerBuilder {
    cfg: TrainerConfig,
}

impl TrainerBuilder {
    /// Creates a builder with [`TrainerConfig::default`] settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of words to symbolize.
    #[must_use]
    pub fn vocab_size(mut self, value: usize) -> Self {
        self.cfg.vocab_size = value;
        self
    }

    /// Sets a vocabulary size received as a signed integer, e.g. from user input.
    ///
    /// Negative values are rejected with [`EmlangError::InvalidConfig`].
    pub fn signed_vocab_size(self, value: i64) -> Result<Self> {
        let size = usize::try_from(value).map_err(|_| {
            EmlangError::InvalidConfig(format!("vocab_size must be >= 0, got {value}"))
        })?;
        Ok(self.vocab_size(size))
    }

    /// Sets the assignment seed.
    #[must_use]
    pub fn seed(mut self, value: u64) -> Self {
        self.cfg.seed = value;
        self
    }

    /// Sets the minimum word frequency.
    #[must_use]
    pub fn min_frequency(mut self, value: usize) -> Self {
        self.cfg.min_frequency = value;
        self
    }

    /// Enables or disables the training summary log line.
    #[must_use]
    pub fn show_progress(mut self, enabled: bool) -> Self {
        self.cfg.show_progress = enabled;
        self
    }

    /// Finalises the builder, returning a validated [`TrainerConfig`].
    pub fn build(self) -> Result<TrainerConfig> {
        self.cfg.validate()?;
        Ok(self.cfg)
    }
}

/// Configuration for [`crate::encoder::Encoder`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct EncoderConfig {
    /// Probability in `[0, 1]` of a structure marker between two emitted units.
    pub structure: f64,
    /// Seed for marker placement.
    pub seed: u64,
}

impl EncoderConfig {
    /// Creates a validated configuration.
    pub fn new(structure: f64, seed: u64) -> Result<Self> {
        let cfg = Self { structure, seed };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Validates that `structure` is a finite probability.
    pub fn validate(&self) -> Result<()> {
        if !self.structure.is_finite() || !(0.0..=1.0).contains(&self.structure) {
            return Err(EmlangError::InvalidConfig(format!(
                "structure must be within [0, 1], got {}",
                self.structure
            )));
        }
        Ok(())
    }
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            structure: 0.2,
            seed: 42,
        }
    }
}

/// Configuration controlling how text corpora are discovered on disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IngestConfig {
    /// Enables recursive directory traversal.
    pub recursive: bool,
    /// Follows symlinks encountered during traversal.
    pub follow_symlinks: bool,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            recursive: true,
            follow_symlinks: false,
        }
    }
}

impl IngestConfig {
    /// Returns a builder initialised with [`IngestConfig::default`].
    #[must_use]
    pub fn builder() -> IngestBuilder {
        IngestBuilder::default()
    }
}

/// Builder for [`IngestConfig`].
#[derive(Debug, Default, Clone)]
pub struct IngestBuilder {
    cfg: IngestConfig,
}

impl IngestBuilder {
    /// Creates a new builder with [`IngestConfig::default`] settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables recursive directory traversal.
    #[must_use]
    pub fn recursive(mut self, enabled: bool) -> Self {
        self.cfg.recursive = enabled;
        self
    }

    /// Enables or disables following of symlinks when traversing directories.
    #[must_use]
    pub fn follow_symlinks(mut self, enabled: bool) -> Self {
        self.cfg.follow_symlinks = enabled;
        self
    }

    /// Finalises the builder, returning the [`IngestConfig`].
    pub fn build(self) -> IngestConfig {
        self.cfg
    }
}
