//! Normalized grayscale input.

use crate::error::{LithoResult, LithophaneError};

/// Row-major grid of intensities in `[0, 1]`, row 0 at the top of the image.
///
/// 0 is black (thickest wall), 1 is white (thinnest wall).
#[derive(Debug, Clone, PartialEq)]
pub struct IntensityBuffer {
    width: usize,
    height: usize,
    data: Vec<f64>,
}

impl IntensityBuffer {
    /// Create a buffer from row-major samples.
    ///
    /// # Errors
    ///
    /// - [`LithophaneError::EmptyInput`] if `width` or `height` is zero
    /// - [`LithophaneError::InvalidConfiguration`] if `data.len() != width * height`
    /// - [`LithophaneError::InvalidIntensity`] for a non-finite sample or one outside `[0, 1]`
    ///
    /// # Example
    ///
    /// ```
    /// use litho_shell::IntensityBuffer;
    ///
    /// let buffer = IntensityBuffer::new(2, 2, vec![0.0, 0.25, 0.75, 1.0]).unwrap();
    /// assert_eq!(buffer.get(1, 0), 0.75);
    /// ```
    pub fn new(width: usize, height: usize, data: Vec<f64>) -> LithoResult<Self> {
        if width == 0 || height == 0 {
            return Err(LithophaneError::EmptyInput);
        }
        if data.len() != width * height {
            return Err(LithophaneError::invalid_config(
                "data",
                format!(
                    "expected {} samples for {}x{}, got {}",
                    width * height,
                    width,
                    height,
                    data.len()
                ),
            ));
        }
        if let Some((index, &value)) = data
            .iter()
            .enumerate()
            .find(|&(_, v)| !v.is_finite() || !(0.0..=1.0).contains(v))
        {
            return Err(LithophaneError::InvalidIntensity { index, value });
        }

        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Buffer with every sample set to `value`.
    pub fn uniform(width: usize, height: usize, value: f64) -> LithoResult<Self> {
        Self::new(width, height, vec![value; width * height])
    }

    /// Build a buffer by evaluating `f(row, col)` for each pixel.
    pub fn from_fn(
        width: usize,
        height: usize,
        f: impl Fn(usize, usize) -> f64,
    ) -> LithoResult<Self> {
        let mut data = Vec::with_capacity(width * height);
        for row in 0..height {
            for col in 0..width {
                data.push(f(row, col));
            }
        }
        Self::new(width, height, data)
    }

    /// Normalize 8-bit grayscale pixels (0..=255) into a buffer.
    pub fn from_luma8(width: usize, height: usize, pixels: &[u8]) -> LithoResult<Self> {
        let data = pixels.iter().map(|&p| f64::from(p) / 255.0).collect();
        Self::new(width, height, data)
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Samples in row-major order.
    #[inline]
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Sample at `(row, col)`. Panics when out of bounds, like slice indexing.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.width + col]
    }

    /// Mean intensity.
    pub fn mean(&self) -> f64 {
        self.data.iter().sum::<f64>() / self.data.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_area_is_empty_input() {
        assert!(matches!(
            IntensityBuffer::new(0, 4, vec![]),
            Err(LithophaneError::EmptyInput)
        ));
        assert!(matches!(
            IntensityBuffer::new(4, 0, vec![]),
            Err(LithophaneError::EmptyInput)
        ));
    }

    #[test]
    fn test_length_mismatch() {
        let err = IntensityBuffer::new(3, 2, vec![0.5; 5]).unwrap_err();
        assert!(matches!(err, LithophaneError::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_out_of_range_sample() {
        let err = IntensityBuffer::new(2, 2, vec![0.0, 1.2, 0.5, 0.5]).unwrap_err();
        match err {
            LithophaneError::InvalidIntensity { index, value } => {
                assert_eq!(index, 1);
                assert_eq!(value, 1.2);
            }
            other => panic!("Expected InvalidIntensity, got {:?}", other),
        }

        let err = IntensityBuffer::new(1, 1, vec![f64::NAN]).unwrap_err();
        assert!(matches!(err, LithophaneError::InvalidIntensity { index: 0, .. }));
    }

    #[test]
    fn test_from_fn_is_row_major() {
        let buffer = IntensityBuffer::from_fn(3, 2, |row, col| (row * 3 + col) as f64 / 10.0).unwrap();
        assert_eq!(buffer.get(0, 2), 0.2);
        assert_eq!(buffer.get(1, 0), 0.3);
        assert_eq!(buffer.data().len(), 6);
    }

    #[test]
    fn test_from_luma8() {
        let buffer = IntensityBuffer::from_luma8(2, 1, &[0, 255]).unwrap();
        assert_eq!(buffer.data(), &[0.0, 1.0]);
        assert!((buffer.mean() - 0.5).abs() < 1e-12);
    }
}
