use ndarray::Array2;

/// Single-frame grayscale image with rescaled intensities
///
/// Indexed `[row, column]`, i.e. `[y, x]`. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pixels: Array2<f64>,
}

impl Image {
    /// Wraps an existing array
    pub fn new(pixels: Array2<f64>) -> Self {
        Self { pixels }
    }

    /// Applies a modality rescale (`value * slope + intercept`)
    pub fn rescaled(self, slope: f64, intercept: f64) -> Self {
        if slope == 1.0 && intercept == 0.0 {
            return self;
        }
        Self::new(self.pixels.mapv(|v| v * slope + intercept))
    }

    pub fn rows(&self) -> usize {
        self.pixels.nrows()
    }

    pub fn cols(&self) -> usize {
        self.pixels.ncols()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Geometric center as `(row, column)`, using integer division
    pub fn center(&self) -> (usize, usize) {
        (self.rows() / 2, self.cols() / 2)
    }

    /// Mean intensity over the whole frame (0 for an empty image)
    pub fn mean(&self) -> f64 {
        self.pixels.mean().unwrap_or(0.0)
    }

    pub fn pixels(&self) -> &Array2<f64> {
        &self.pixels
    }
}
