//! Builder utilities for configuring Tertulia sessions.
//!
//! Exposes the tuning surface validated before a [`crate::Session`] is
//! loaded: how many top-degree users statistics report and how the force
//! directed layout runs.

use std::{num::NonZeroUsize, sync::Arc};

use crate::error::{ConfigError, Result};

const DEFAULT_TOP_DEGREE_COUNT: usize = 10;
const DEFAULT_LAYOUT_ITERATIONS: usize = 50;
const DEFAULT_LAYOUT_SEED: u64 = 42;

/// Validated parameters for the force-directed layout.
///
/// # Examples
/// ```
/// use tertulia_core::LayoutConfig;
///
/// let config = LayoutConfig::default();
/// assert_eq!(config.iterations().get(), 50);
/// assert_eq!(config.seed(), 42);
/// assert!(config.optimal_distance().is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutConfig {
    iterations: NonZeroUsize,
    seed: u64,
    optimal_distance: Option<f64>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            iterations: NonZeroUsize::new(DEFAULT_LAYOUT_ITERATIONS).unwrap_or(NonZeroUsize::MIN),
            seed: DEFAULT_LAYOUT_SEED,
            optimal_distance: None,
        }
    }
}

impl LayoutConfig {
    /// Number of simulation steps.
    #[must_use]
    pub fn iterations(&self) -> NonZeroUsize {
        self.iterations
    }

    /// Seed for the initial random placement.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Preferred distance between adjacent nodes; `None` derives it from
    /// the node count.
    #[must_use]
    pub fn optimal_distance(&self) -> Option<f64> {
        self.optimal_distance
    }
}

/// Configures and validates [`LayoutConfig`] values.
///
/// # Examples
/// ```
/// use tertulia_core::LayoutBuilder;
///
/// let config = LayoutBuilder::new()
///     .with_iterations(200)
///     .with_seed(7)
///     .with_optimal_distance(0.5)
///     .build()
///     .expect("layout configuration is valid");
/// assert_eq!(config.iterations().get(), 200);
/// assert_eq!(config.optimal_distance(), Some(0.5));
///
/// assert!(LayoutBuilder::new().with_iterations(0).build().is_err());
/// ```
#[derive(Debug, Clone)]
pub struct LayoutBuilder {
    iterations: usize,
    seed: u64,
    optimal_distance: Option<f64>,
}

impl Default for LayoutBuilder {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_LAYOUT_ITERATIONS,
            seed: DEFAULT_LAYOUT_SEED,
            optimal_distance: None,
        }
    }
}

impl LayoutBuilder {
    /// Creates a builder populated with default parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the number of simulation steps.
    #[must_use]
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Overrides the placement seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Fixes the preferred distance between adjacent nodes.
    #[must_use]
    pub fn with_optimal_distance(mut self, distance: f64) -> Self {
        self.optimal_distance = Some(distance);
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    /// Returns [`ConfigError::LayoutIterations`] for zero iterations and
    /// [`ConfigError::OptimalDistance`] for a distance that is not finite
    /// and positive.
    pub fn build(self) -> Result<LayoutConfig> {
        let iterations = NonZeroUsize::new(self.iterations).ok_or(ConfigError::LayoutIterations)?;
        if let Some(distance) = self.optimal_distance
            && !(distance.is_finite() && distance > 0.0)
        {
            return Err(ConfigError::OptimalDistance {
                got: Arc::from(distance.to_string()),
            }
            .into());
        }
        Ok(LayoutConfig {
            iterations,
            seed: self.seed,
            optimal_distance: self.optimal_distance,
        })
    }
}

/// Validated parameters for a [`crate::Session`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionConfig {
    top_degree_count: NonZeroUsize,
    layout: LayoutConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            top_degree_count: NonZeroUsize::new(DEFAULT_TOP_DEGREE_COUNT)
                .unwrap_or(NonZeroUsize::MIN),
            layout: LayoutConfig::default(),
        }
    }
}

impl SessionConfig {
    /// Number of best-connected users reported by statistics.
    #[must_use]
    pub fn top_degree_count(&self) -> NonZeroUsize {
        self.top_degree_count
    }

    /// Layout parameters.
    #[must_use]
    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }
}

/// Configures and validates [`SessionConfig`] values.
///
/// # Examples
/// ```
/// use tertulia_core::{LayoutBuilder, SessionBuilder};
///
/// let layout = LayoutBuilder::new().with_seed(3).build().expect("valid layout");
/// let config = SessionBuilder::new()
///     .with_top_degree_count(5)
///     .with_layout(layout)
///     .build()
///     .expect("session configuration is valid");
/// assert_eq!(config.top_degree_count().get(), 5);
/// assert_eq!(config.layout().seed(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct SessionBuilder {
    top_degree_count: usize,
    layout: LayoutConfig,
}

impl Default for SessionBuilder {
    fn default() -> Self {
        Self {
            top_degree_count: DEFAULT_TOP_DEGREE_COUNT,
            layout: LayoutConfig::default(),
        }
    }
}

impl SessionBuilder {
    /// Creates a builder populated with default parameters.
    ///
    /// # Examples
    /// ```
    /// use tertulia_core::SessionBuilder;
    ///
    /// assert_eq!(SessionBuilder::new().top_degree_count(), 10);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides how many top-degree users statistics report.
    #[must_use]
    pub fn with_top_degree_count(mut self, count: usize) -> Self {
        self.top_degree_count = count;
        self
    }

    /// Returns the configured top-degree count.
    #[must_use]
    pub fn top_degree_count(&self) -> usize {
        self.top_degree_count
    }

    /// Replaces the layout parameters.
    #[must_use]
    pub fn with_layout(mut self, layout: LayoutConfig) -> Self {
        self.layout = layout;
        self
    }

    /// Validates the configuration.
    ///
    /// # Examples
    /// ```
    /// use tertulia_core::{SessionBuilder, TertuliaErrorCode};
    ///
    /// let err = SessionBuilder::new().with_top_degree_count(0).build().unwrap_err();
    /// assert_eq!(err.code(), TertuliaErrorCode::InvalidConfig);
    /// ```
    ///
    /// # Errors
    /// Returns [`ConfigError::TopDegreeCount`] when the count is zero.
    pub fn build(self) -> Result<SessionConfig> {
        let top_degree_count = NonZeroUsize::new(self.top_degree_count).ok_or(
            ConfigError::TopDegreeCount {
                got: self.top_degree_count,
            },
        )?;
        Ok(SessionConfig {
            top_degree_count,
            layout: self.layout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    use crate::error::TertuliaError;

    #[rstest]
    #[case::zero(0.0)]
    #[case::negative(-1.5)]
    #[case::nan(f64::NAN)]
    #[case::infinite(f64::INFINITY)]
    fn optimal_distance_must_be_finite_and_positive(#[case] distance: f64) {
        let err = LayoutBuilder::new()
            .with_optimal_distance(distance)
            .build()
            .expect_err("distance must be rejected");
        assert!(matches!(
            err,
            TertuliaError::InvalidConfig(ConfigError::OptimalDistance { .. })
        ));
    }

    #[test]
    fn zero_iterations_are_rejected() {
        let err = LayoutBuilder::new()
            .with_iterations(0)
            .build()
            .expect_err("zero iterations must be rejected");
        assert_eq!(err, TertuliaError::InvalidConfig(ConfigError::LayoutIterations));
    }

    #[test]
    fn zero_top_degree_count_is_rejected() {
        let err = SessionBuilder::new()
            .with_top_degree_count(0)
            .build()
            .expect_err("zero must be rejected");
        assert_eq!(
            err,
            TertuliaError::InvalidConfig(ConfigError::TopDegreeCount { got: 0 })
        );
    }

    #[test]
    fn defaults_round_trip_through_builders() {
        let layout = LayoutBuilder::new().build().expect("defaults are valid");
        assert_eq!(layout, LayoutConfig::default());
        let session = SessionBuilder::new().build().expect("defaults are valid");
        assert_eq!(session, SessionConfig::default());
    }
}
