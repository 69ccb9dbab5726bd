//! Continuous resampling of a scalar grid.
//!
//! [`SurfaceInterpolator`] evaluates a field sampled on a rectilinear grid at
//! arbitrary `(row, col)` coordinates. Grids with at least
//! [`MIN_CUBIC_SAMPLES`] samples along both axes use a bicubic Hermite patch
//! per cell; smaller grids fall back to bilinear interpolation. Queries never
//! extrapolate: anything outside the axis ranges is an error, so callers
//! clamp first with [`SurfaceInterpolator::clamp`].
//!
//! # Example
//!
//! ```
//! use litho_shell::{InterpolationMethod, SurfaceInterpolator};
//!
//! let values: Vec<f64> = (0..36).map(|i| i as f64).collect();
//! let interp = SurfaceInterpolator::from_grid(6, 6, values).unwrap();
//! assert_eq!(interp.method(), InterpolationMethod::Cubic);
//!
//! // Linear data is reproduced exactly.
//! let v = interp.sample(2.5, 1.25).unwrap();
//! assert!((v - (2.5 * 6.0 + 1.25)).abs() < 1e-9);
//! ```

use tracing::debug;

use crate::error::{LithoResult, LithophaneError};

/// Axes shorter than this use bilinear interpolation.
///
/// A four-sample axis has a single interior cell and one-sided slopes at
/// both of its ends, which rings visibly on small images.
pub const MIN_CUBIC_SAMPLES: usize = 5;

/// Interpolation scheme chosen for a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterpolationMethod {
    /// Bicubic Hermite, C¹ across cells.
    Cubic,
    /// Bilinear, used for grids too small for cubic.
    Bilinear,
}

impl InterpolationMethod {
    /// Scheme used for a grid of `rows` by `cols` samples.
    pub fn for_grid(rows: usize, cols: usize) -> Self {
        if rows >= MIN_CUBIC_SAMPLES && cols >= MIN_CUBIC_SAMPLES {
            InterpolationMethod::Cubic
        } else {
            InterpolationMethod::Bilinear
        }
    }
}

impl std::fmt::Display for InterpolationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InterpolationMethod::Cubic => write!(f, "cubic"),
            InterpolationMethod::Bilinear => write!(f, "bilinear"),
        }
    }
}

/// Per-node partial derivatives for the Hermite patches.
#[derive(Debug, Clone)]
struct HermiteSlopes {
    d_row: Vec<f64>,
    d_col: Vec<f64>,
    d_row_col: Vec<f64>,
}

/// Point queries over a rectilinear scalar grid.
#[derive(Debug, Clone)]
pub struct SurfaceInterpolator {
    rows: Vec<f64>,
    cols: Vec<f64>,
    values: Vec<f64>,
    slopes: Option<HermiteSlopes>,
}

fn check_axis(name: &str, axis: &[f64]) -> LithoResult<()> {
    if axis.is_empty() {
        return Err(LithophaneError::invalid_axis(format!("{} axis is empty", name)));
    }
    if let Some(i) = axis.iter().position(|v| !v.is_finite()) {
        return Err(LithophaneError::invalid_axis(format!(
            "{} axis value {} is not finite",
            name, i
        )));
    }
    if let Some(i) = axis.windows(2).position(|w| w[1] <= w[0]) {
        return Err(LithophaneError::invalid_axis(format!(
            "{} axis is not strictly increasing at index {}",
            name,
            i + 1
        )));
    }
    Ok(())
}

/// Finite-difference slope at index `i` of a strided sequence.
///
/// Central inside, one-sided at the ends, zero for a single sample.
fn slope(axis: &[f64], value: impl Fn(usize) -> f64, i: usize) -> f64 {
    let n = axis.len();
    if n < 2 {
        return 0.0;
    }
    let (lo, hi) = if i == 0 {
        (0, 1)
    } else if i == n - 1 {
        (n - 2, n - 1)
    } else {
        (i - 1, i + 1)
    };
    (value(hi) - value(lo)) / (axis[hi] - axis[lo])
}

/// Cell index and local parameter in [0, 1] for `x` on `axis`.
///
/// `x` must already be inside the axis range.
fn locate(axis: &[f64], x: f64) -> (usize, f64) {
    if axis.len() < 2 {
        return (0, 0.0);
    }
    let i = axis
        .partition_point(|&a| a <= x)
        .saturating_sub(1)
        .min(axis.len() - 2);
    let t = (x - axis[i]) / (axis[i + 1] - axis[i]);
    (i, t.clamp(0.0, 1.0))
}

/// Hermite basis: (value at start, value at end, slope at start, slope at end).
#[inline]
fn hermite_basis(t: f64) -> [f64; 4] {
    let t2 = t * t;
    let t3 = t2 * t;
    [
        2.0 * t3 - 3.0 * t2 + 1.0,
        -2.0 * t3 + 3.0 * t2,
        t3 - 2.0 * t2 + t,
        t3 - t2,
    ]
}

impl SurfaceInterpolator {
    /// Build an interpolator over explicit axes.
    ///
    /// `values` is row-major with `rows.len()` rows of `cols.len()` samples.
    ///
    /// # Errors
    ///
    /// [`LithophaneError::InvalidAxis`] if an axis is empty, not finite, not
    /// strictly increasing, or its length does not match `values`.
    pub fn new(rows: Vec<f64>, cols: Vec<f64>, values: Vec<f64>) -> LithoResult<Self> {
        check_axis("row", &rows)?;
        check_axis("column", &cols)?;
        if values.len() != rows.len() * cols.len() {
            return Err(LithophaneError::invalid_axis(format!(
                "{} x {} axes do not match {} values",
                rows.len(),
                cols.len(),
                values.len()
            )));
        }

        let method = InterpolationMethod::for_grid(rows.len(), cols.len());
        let slopes = if method == InterpolationMethod::Cubic {
            Some(Self::compute_slopes(&rows, &cols, &values))
        } else {
            debug!(
                rows = rows.len(),
                cols = cols.len(),
                "Grid too small for cubic interpolation, using bilinear"
            );
            None
        };

        Ok(Self {
            rows,
            cols,
            values,
            slopes,
        })
    }

    /// Build an interpolator whose axes are the pixel indices `0..height` and `0..width`.
    pub fn from_grid(width: usize, height: usize, values: Vec<f64>) -> LithoResult<Self> {
        let rows = (0..height).map(|r| r as f64).collect();
        let cols = (0..width).map(|c| c as f64).collect();
        Self::new(rows, cols, values)
    }

    fn compute_slopes(rows: &[f64], cols: &[f64], values: &[f64]) -> HermiteSlopes {
        let width = cols.len();
        let len = values.len();
        let mut d_row = vec![0.0; len];
        let mut d_col = vec![0.0; len];
        let mut d_row_col = vec![0.0; len];

        for r in 0..rows.len() {
            for c in 0..width {
                d_row[r * width + c] = slope(rows, |i| values[i * width + c], r);
                d_col[r * width + c] = slope(cols, |j| values[r * width + j], c);
            }
        }
        for r in 0..rows.len() {
            for c in 0..width {
                d_row_col[r * width + c] = slope(cols, |j| d_row[r * width + j], c);
            }
        }

        HermiteSlopes {
            d_row,
            d_col,
            d_row_col,
        }
    }

    pub fn method(&self) -> InterpolationMethod {
        if self.slopes.is_some() {
            InterpolationMethod::Cubic
        } else {
            InterpolationMethod::Bilinear
        }
    }

    /// Inclusive row domain.
    pub fn row_range(&self) -> (f64, f64) {
        (self.rows[0], self.rows[self.rows.len() - 1])
    }

    /// Inclusive column domain.
    pub fn col_range(&self) -> (f64, f64) {
        (self.cols[0], self.cols[self.cols.len() - 1])
    }

    /// Clamp a query point into the domain.
    pub fn clamp(&self, row: f64, col: f64) -> (f64, f64) {
        let (r0, r1) = self.row_range();
        let (c0, c1) = self.col_range();
        (row.clamp(r0, r1), col.clamp(c0, c1))
    }

    /// Evaluate the surface at `(row, col)`.
    ///
    /// # Errors
    ///
    /// [`LithophaneError::OutOfDomain`] if the point lies outside the axis
    /// ranges or is NaN.
    pub fn sample(&self, row: f64, col: f64) -> LithoResult<f64> {
        let row_range = self.row_range();
        let col_range = self.col_range();
        let inside = (row_range.0..=row_range.1).contains(&row)
            && (col_range.0..=col_range.1).contains(&col);
        if !inside {
            return Err(LithophaneError::OutOfDomain {
                row,
                col,
                row_range,
                col_range,
            });
        }

        let (i, t) = locate(&self.rows, row);
        let (j, s) = locate(&self.cols, col);
        Ok(match &self.slopes {
            Some(slopes) => self.cubic(slopes, i, j, t, s),
            None => self.bilinear(i, j, t, s),
        })
    }

    #[inline]
    fn at(&self, data: &[f64], i: usize, j: usize) -> f64 {
        data[i * self.cols.len() + j]
    }

    fn bilinear(&self, i: usize, j: usize, t: f64, s: f64) -> f64 {
        let i1 = (i + 1).min(self.rows.len() - 1);
        let j1 = (j + 1).min(self.cols.len() - 1);
        let v00 = self.at(&self.values, i, j);
        let v01 = self.at(&self.values, i, j1);
        let v10 = self.at(&self.values, i1, j);
        let v11 = self.at(&self.values, i1, j1);
        let top = v00 + (v01 - v00) * s;
        let bottom = v10 + (v11 - v10) * s;
        top + (bottom - top) * t
    }

    fn cubic(&self, slopes: &HermiteSlopes, i: usize, j: usize, t: f64, s: f64) -> f64 {
        let hr = self.rows[i + 1] - self.rows[i];
        let hc = self.cols[j + 1] - self.cols[j];
        let bt = hermite_basis(t);
        let bs = hermite_basis(s);

        let mut sum = 0.0;
        for (a, ri) in [i, i + 1].into_iter().enumerate() {
            for (b, cj) in [j, j + 1].into_iter().enumerate() {
                let value = self.at(&self.values, ri, cj);
                let d_row = self.at(&slopes.d_row, ri, cj) * hr;
                let d_col = self.at(&slopes.d_col, ri, cj) * hc;
                let d_row_col = self.at(&slopes.d_row_col, ri, cj) * hr * hc;

                sum += bt[a] * bs[b] * value
                    + bt[a + 2] * bs[b] * d_row
                    + bt[a] * bs[b + 2] * d_col
                    + bt[a + 2] * bs[b + 2] * d_row_col;
            }
        }
        sum
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn grid(width: usize, height: usize, f: impl Fn(f64, f64) -> f64) -> SurfaceInterpolator {
        let values = (0..height)
            .flat_map(|r| (0..width).map(move |c| (r, c)))
            .map(|(r, c)| f(r as f64, c as f64))
            .collect();
        SurfaceInterpolator::from_grid(width, height, values).unwrap()
    }

    #[test]
    fn test_method_selection() {
        assert_eq!(grid(5, 5, |_, _| 1.0).method(), InterpolationMethod::Cubic);
        assert_eq!(grid(4, 4, |_, _| 1.0).method(), InterpolationMethod::Bilinear);
        assert_eq!(grid(10, 3, |_, _| 1.0).method(), InterpolationMethod::Bilinear);
        assert_eq!(grid(1, 1, |_, _| 1.0).method(), InterpolationMethod::Bilinear);
    }

    #[test]
    fn test_passes_through_samples() {
        let interp = grid(7, 6, |r, c| (r * 0.7).sin() + (c * 0.3).cos());
        for r in 0..6 {
            for c in 0..7 {
                let expected = (r as f64 * 0.7).sin() + (c as f64 * 0.3).cos();
                assert_relative_eq!(
                    interp.sample(r as f64, c as f64).unwrap(),
                    expected,
                    epsilon = 1e-12
                );
            }
        }
    }

    #[test]
    fn test_bilinear_reproduces_bilinear_function() {
        let interp = grid(3, 3, |r, c| 1.0 + 2.0 * r + 3.0 * c + r * c);
        let (r, c) = (0.4, 1.7);
        assert_relative_eq!(
            interp.sample(r, c).unwrap(),
            1.0 + 2.0 * r + 3.0 * c + r * c,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_cubic_reproduces_linear_on_nonuniform_axes() {
        let rows = vec![0.0, 0.5, 2.0, 2.5, 4.0, 7.0];
        let cols = vec![-1.0, 0.0, 0.25, 3.0, 3.5];
        let f = |r: f64, c: f64| 2.0 * r - 0.5 * c + 4.0;
        let values = rows
            .iter()
            .flat_map(|&r| cols.iter().map(move |&c| f(r, c)))
            .collect();
        let interp = SurfaceInterpolator::new(rows, cols, values).unwrap();
        assert_eq!(interp.method(), InterpolationMethod::Cubic);

        for &(r, c) in &[(0.1, -0.5), (3.3, 1.0), (6.9, 3.4), (7.0, 3.5)] {
            assert_relative_eq!(interp.sample(r, c).unwrap(), f(r, c), epsilon = 1e-9);
        }
    }

    #[test]
    fn test_cubic_is_smooth_across_cells() {
        let interp = grid(8, 8, |r, c| (r * 0.5).sin() * (c * 0.4).cos());
        let h = 1e-6;
        let left = interp.sample(3.0, 3.0 - h).unwrap();
        let mid = interp.sample(3.0, 3.0).unwrap();
        let right = interp.sample(3.0, 3.0 + h).unwrap();
        let slope_left = (mid - left) / h;
        let slope_right = (right - mid) / h;
        assert!((slope_left - slope_right).abs() < 1e-4);
    }

    #[test]
    fn test_out_of_domain() {
        let interp = grid(6, 6, |_, _| 1.0);
        assert!(matches!(
            interp.sample(-0.1, 2.0),
            Err(LithophaneError::OutOfDomain { .. })
        ));
        assert!(matches!(
            interp.sample(2.0, 5.01),
            Err(LithophaneError::OutOfDomain { .. })
        ));
        assert!(interp.sample(f64::NAN, 1.0).is_err());

        let (r, c) = interp.clamp(-3.0, 9.0);
        assert_eq!((r, c), (0.0, 5.0));
        assert!(interp.sample(r, c).is_ok());
    }

    #[test]
    fn test_single_sample_axis() {
        let interp = grid(4, 1, |_, c| c);
        assert_eq!(interp.row_range(), (0.0, 0.0));
        assert_relative_eq!(interp.sample(0.0, 2.5).unwrap(), 2.5);
        assert!(interp.sample(0.5, 1.0).is_err());
    }

    #[test]
    fn test_invalid_axes() {
        let err = SurfaceInterpolator::new(vec![0.0, 1.0, 1.0], vec![0.0], vec![0.0; 3]).unwrap_err();
        assert!(matches!(err, LithophaneError::InvalidAxis { .. }));

        let err = SurfaceInterpolator::new(vec![0.0, 1.0], vec![0.0, 1.0], vec![0.0; 3]).unwrap_err();
        assert!(matches!(err, LithophaneError::InvalidAxis { .. }));

        let err = SurfaceInterpolator::new(vec![], vec![0.0], vec![]).unwrap_err();
        assert!(matches!(err, LithophaneError::InvalidAxis { .. }));
    }
}
