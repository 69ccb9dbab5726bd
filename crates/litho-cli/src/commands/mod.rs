//! Subcommand implementations.

pub mod build;
pub mod config;
pub mod estimate;

use std::path::Path;

use anyhow::{Context, Result};
use litho_shell::{CylinderSpec, ImageCategory};
use tracing::debug;

/// Settings that may be overridden on the command line.
#[derive(Debug, Default, Clone, Copy)]
pub struct SpecOverrides {
    pub coverage: Option<f64>,
    pub resolution: Option<f64>,
    pub category: Option<ImageCategory>,
}

/// Load a `CylinderSpec` from `config` (or defaults), apply overrides and validate.
pub fn load_spec(config: Option<&Path>, overrides: SpecOverrides) -> Result<CylinderSpec> {
    let mut spec = match config {
        Some(path) => CylinderSpec::from_toml_file(path)
            .with_context(|| format!("Failed to load configuration from {:?}", path))?,
        None => CylinderSpec::default(),
    };

    if let Some(coverage) = overrides.coverage {
        spec.coverage_angle_deg = coverage;
    }
    if let Some(resolution) = overrides.resolution {
        spec.resolution_mm = resolution;
    }
    if let Some(category) = overrides.category {
        spec = spec.with_image_category(category);
    }

    spec.validate()?;
    debug!(
        diameter = spec.outer_diameter_mm,
        height = spec.height_mm,
        coverage = spec.coverage_angle_deg,
        resolution = spec.resolution_mm,
        "Configuration loaded"
    );
    Ok(spec)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_config() {
        let spec = load_spec(None, SpecOverrides::default()).unwrap();
        assert_eq!(spec, CylinderSpec::default());
    }

    #[test]
    fn test_overrides_apply_on_top_of_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spec.toml");
        std::fs::write(&path, "outer_diameter_mm = 60.0\ncoverage_angle_deg = 180.0\n").unwrap();

        let overrides = SpecOverrides {
            coverage: Some(270.0),
            resolution: Some(0.5),
            category: Some(ImageCategory::Portrait),
        };
        let spec = load_spec(Some(&path), overrides).unwrap();
        assert_eq!(spec.outer_diameter_mm, 60.0);
        assert_eq!(spec.coverage_angle_deg, 270.0);
        assert_eq!(spec.resolution_mm, 0.5);
        assert_eq!(spec.gamma, ImageCategory::Portrait.gamma());
    }

    #[test]
    fn test_invalid_override_rejected() {
        let overrides = SpecOverrides {
            coverage: Some(400.0),
            ..Default::default()
        };
        let err = load_spec(None, overrides).unwrap_err();
        assert!(err.downcast_ref::<litho_shell::LithophaneError>().is_some());
    }

    #[test]
    fn test_missing_config_has_context() {
        let err = load_spec(Some(Path::new("/nonexistent/spec.toml")), SpecOverrides::default())
            .unwrap_err();
        assert!(err.to_string().contains("Failed to load configuration"));
    }
}
