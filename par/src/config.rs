//! Layout configuration.
//!
//! Configuration is read from TOML. Every key is optional:
//!
//! ```toml
//! lambda = 500
//! component_spacing = 1000
//! channel_width = 800
//! channel_spacing = 1600
//! backend = "fixed-grid"
//! fixed_cell_size = 2
//!
//! [region]
//! x = 0
//! y = 0
//! width = 100
//! height = 100
//! ```

use std::path::Path;

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};

use crate::engine::Region;

/// Selects the placement and routing backend.
#[derive(Debug, Copy, Clone, Default, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackendKind {
    /// A caller-supplied engine.
    #[default]
    External,
    /// The built-in fixed-size-cell placer, which does not route.
    FixedGrid,
}

/// Configuration for one layout pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PnrConfig {
    /// Device units per grid unit.
    pub lambda: i64,
    /// Spacing, in device units, for components without a `componentSpacing` parameter.
    pub component_spacing: i64,
    /// Default channel width of route requests.
    pub channel_width: i64,
    /// Default channel spacing of route requests.
    pub channel_spacing: i64,
    /// The region, in grid units, the engine may place and route in.
    pub region: Region,
    /// The placement and routing backend.
    pub backend: BackendKind,
    /// The cell pitch, in grid units, used by [`BackendKind::FixedGrid`].
    pub fixed_cell_size: i64,
}

impl Default for PnrConfig {
    fn default() -> Self {
        Self {
            lambda: 500,
            component_spacing: 1000,
            channel_width: 800,
            channel_spacing: 1600,
            region: Region::new(0, 0, 100, 100),
            backend: BackendKind::default(),
            fixed_cell_size: 2,
        }
    }
}

impl PnrConfig {
    /// Parses a configuration from a TOML document.
    pub fn from_toml_str(toml: &str) -> Result<Self> {
        let config: Self = toml::from_str(toml).context("could not parse layout configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read `{}`", path.display()))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("invalid layout configuration in `{}`", path.display()))
    }

    /// Checks that every value is in range.
    pub fn validate(&self) -> Result<()> {
        ensure!(self.lambda > 0, "lambda must be positive, got {}", self.lambda);
        ensure!(
            self.component_spacing >= 0,
            "component_spacing must not be negative"
        );
        ensure!(
            self.channel_width > 0 && self.channel_spacing >= 0,
            "channel_width must be positive and channel_spacing must not be negative"
        );
        ensure!(
            self.region.width > 0 && self.region.height > 0,
            "region must have a positive width and height"
        );
        ensure!(
            self.fixed_cell_size > 0,
            "fixed_cell_size must be positive"
        );
        Ok(())
    }
}
