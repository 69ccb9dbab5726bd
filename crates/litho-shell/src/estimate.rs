//! Material and print-time quantities of a certified shell.

use serde::Serialize;

use litho_mesh::Mesh;

use crate::error::{LithoResult, LithophaneError};

/// PLA density in g/cm³.
pub const PLA_DENSITY_G_PER_CM3: f64 = 1.24;

/// Layer height assumed when none is given.
pub const DEFAULT_LAYER_HEIGHT_MM: f64 = 0.12;

/// Rough print time per cm³ at fine-detail speeds.
pub const PRINT_HOURS_PER_CM3: f64 = 0.15;

/// Floor for the print time estimate; covers heating, homing and first layer.
pub const MIN_PRINT_HOURS: f64 = 0.5;

/// Print quantities derived from a closed mesh.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PrintEstimate {
    pub volume_mm3: f64,
    pub surface_area_mm2: f64,
    /// Filament weight assuming PLA.
    pub weight_g: f64,
    pub height_mm: f64,
    pub layer_height_mm: f64,
    /// Whole layers that fit in the height.
    pub layer_count: usize,
    /// Very approximate; never below [`MIN_PRINT_HOURS`].
    pub estimated_print_time_hours: f64,
}

impl PrintEstimate {
    /// Estimate from a certified (closed) mesh.
    ///
    /// # Errors
    ///
    /// [`LithophaneError::InvalidConfiguration`] if `layer_height_mm` is not positive.
    ///
    /// # Example
    ///
    /// ```
    /// use litho_mesh::{Mesh, Vertex};
    /// use litho_shell::PrintEstimate;
    ///
    /// // 10 mm cube
    /// let mut mesh = Mesh::new();
    /// for &(x, y, z) in &[
    ///     (0.0, 0.0, 0.0), (10.0, 0.0, 0.0), (10.0, 10.0, 0.0), (0.0, 10.0, 0.0),
    ///     (0.0, 0.0, 10.0), (10.0, 0.0, 10.0), (10.0, 10.0, 10.0), (0.0, 10.0, 10.0),
    /// ] {
    ///     mesh.vertices.push(Vertex::from_coords(x, y, z));
    /// }
    /// mesh.faces = vec![
    ///     [0, 2, 1], [0, 3, 2], [4, 5, 6], [4, 6, 7], [0, 1, 5], [0, 5, 4],
    ///     [2, 3, 7], [2, 7, 6], [0, 4, 7], [0, 7, 3], [1, 2, 6], [1, 6, 5],
    /// ];
    ///
    /// let estimate = PrintEstimate::from_mesh(&mesh, 0.2).unwrap();
    /// assert!((estimate.volume_mm3 - 1000.0).abs() < 1e-9);
    /// assert!((estimate.weight_g - 1.24).abs() < 1e-9);
    /// assert_eq!(estimate.layer_count, 50);
    /// assert!((estimate.estimated_print_time_hours - 0.5).abs() < 1e-9);
    /// ```
    pub fn from_mesh(mesh: &Mesh, layer_height_mm: f64) -> LithoResult<Self> {
        if !(layer_height_mm.is_finite() && layer_height_mm > 0.0) {
            return Err(LithophaneError::invalid_config(
                "layer_height_mm",
                format!("must be positive, got {}", layer_height_mm),
            ));
        }

        let volume_mm3 = mesh.volume();
        let height_mm = mesh
            .bounds()
            .map(|(min, max)| max.z - min.z)
            .unwrap_or(0.0);
        // Snap before floor so 10.0 / 0.2 stays 50 layers.
        let layers = height_mm / layer_height_mm;
        let layer_count = (layers + 1e-9).floor().max(0.0) as usize;
        let volume_cm3 = volume_mm3 / 1000.0;

        Ok(Self {
            volume_mm3,
            surface_area_mm2: mesh.surface_area(),
            weight_g: volume_cm3 * PLA_DENSITY_G_PER_CM3,
            height_mm,
            layer_height_mm,
            layer_count,
            estimated_print_time_hours: (volume_cm3 * PRINT_HOURS_PER_CM3).max(MIN_PRINT_HOURS),
        })
    }
}

impl std::fmt::Display for PrintEstimate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Print Estimate:")?;
        writeln!(f, "  Volume: {:.1} mm³", self.volume_mm3)?;
        writeln!(f, "  Surface area: {:.1} mm²", self.surface_area_mm2)?;
        writeln!(f, "  Weight (PLA): {:.1} g", self.weight_g)?;
        writeln!(
            f,
            "  Layers: {} at {:.2} mm ({:.1} mm tall)",
            self.layer_count, self.layer_height_mm, self.height_mm
        )?;
        write!(f, "  Print time: ~{:.1} h", self.estimated_print_time_hours)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_mesh() {
        let estimate = PrintEstimate::from_mesh(&Mesh::new(), 0.2).unwrap();
        assert_eq!(estimate.layer_count, 0);
        assert_eq!(estimate.weight_g, 0.0);
        assert_eq!(estimate.estimated_print_time_hours, MIN_PRINT_HOURS);
    }

    /// Axis-aligned box from the origin to `(x, y, z)`.
    fn cuboid(x: f64, y: f64, z: f64) -> Mesh {
        let mut mesh = Mesh::new();
        for &(px, py, pz) in &[
            (0.0, 0.0, 0.0),
            (x, 0.0, 0.0),
            (x, y, 0.0),
            (0.0, y, 0.0),
            (0.0, 0.0, z),
            (x, 0.0, z),
            (x, y, z),
            (0.0, y, z),
        ] {
            mesh.vertices.push(litho_mesh::Vertex::from_coords(px, py, pz));
        }
        mesh.faces = vec![
            [0, 2, 1], [0, 3, 2], [4, 5, 6], [4, 6, 7], [0, 1, 5], [0, 5, 4],
            [2, 3, 7], [2, 7, 6], [0, 4, 7], [0, 7, 3], [1, 2, 6], [1, 6, 5],
        ];
        mesh
    }

    #[test]
    fn test_print_time_scales_with_volume() {
        // 40 cm³
        let estimate = PrintEstimate::from_mesh(&cuboid(40.0, 40.0, 25.0), 0.2).unwrap();
        assert!((estimate.volume_mm3 - 40_000.0).abs() < 1e-6);
        assert!((estimate.estimated_print_time_hours - 40.0 * PRINT_HOURS_PER_CM3).abs() < 1e-9);
        assert!(estimate.to_string().contains("Print time: ~6.0 h"));
    }

    #[test]
    fn test_partial_layer_is_dropped() {
        let estimate = PrintEstimate::from_mesh(&cuboid(10.0, 10.0, 10.1), 0.2).unwrap();
        assert_eq!(estimate.layer_count, 50);
    }

    #[test]
    fn test_invalid_layer_height() {
        assert!(PrintEstimate::from_mesh(&Mesh::new(), 0.0).is_err());
        assert!(PrintEstimate::from_mesh(&Mesh::new(), f64::NAN).is_err());
    }
}
