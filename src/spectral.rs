//! Block-wise 2-D discrete cosine transform of stacked channel windows

use crate::error::{Result, SegError};
use ndarray::{s, Array2, Array3};
use rustdct::{DctPlanner, TransformType2And3};
use std::sync::Arc;

/// Reshapes each channel's window into a square block and applies a 2-D
/// DCT-II (separable: rows, then columns).
///
/// Uses rustdct's unnormalized transforms, so a DCT-II followed by a DCT-III
/// scales a signal by `len / 2` per axis; `inverse` compensates for that.
pub struct SpectralTransformer {
    block_side: usize,
    dct: Arc<dyn TransformType2And3<f32>>,
}

impl SpectralTransformer {
    /// Plan transforms for a given window length.
    ///
    /// The window length must be a perfect square; anything else means the
    /// sample rate and window duration disagree with the block layout.
    pub fn new(window_len: usize) -> Result<Self> {
        let block_side = (window_len as f64).sqrt().round() as usize;
        if block_side * block_side != window_len {
            return Err(SegError::ConfigurationMismatch(format!(
                "window length {} is not a perfect square",
                window_len
            )));
        }
        let mut planner = DctPlanner::new();
        let dct = planner.plan_dct2(block_side);
        Ok(Self { block_side, dct })
    }

    pub fn block_side(&self) -> usize {
        self.block_side
    }

    /// `(C, L)` raw tensor -> `(C, S, S)` frequency representation.
    pub fn transform(&self, tensor: &Array2<f32>) -> Result<Array3<f32>> {
        let side = self.block_side;
        let (num_channels, window_len) = tensor.dim();
        if window_len != side * side {
            return Err(SegError::ConfigurationMismatch(format!(
                "tensor window length {} does not match block layout {}x{}",
                window_len, side, side
            )));
        }

        let mut out = Array3::<f32>::zeros((num_channels, side, side));
        let mut buffer = vec![0.0f32; side];
        for channel in 0..num_channels {
            // Row-major reshape of the channel's length-L vector
            let mut block = Array2::from_shape_vec((side, side), tensor.row(channel).to_vec())
                .map_err(|e| SegError::ConfigurationMismatch(e.to_string()))?;

            for mut row in block.rows_mut() {
                for (dst, &src) in buffer.iter_mut().zip(row.iter()) {
                    *dst = src;
                }
                self.dct.process_dct2(&mut buffer);
                for (dst, &src) in row.iter_mut().zip(buffer.iter()) {
                    *dst = src;
                }
            }
            for mut col in block.columns_mut() {
                for (dst, &src) in buffer.iter_mut().zip(col.iter()) {
                    *dst = src;
                }
                self.dct.process_dct2(&mut buffer);
                for (dst, &src) in col.iter_mut().zip(buffer.iter()) {
                    *dst = src;
                }
            }

            out.slice_mut(s![channel, .., ..]).assign(&block);
        }
        Ok(out)
    }

    /// Paired inverse: DCT-III along both axes, rescaled, flattened back to
    /// `(C, L)`. Exact round-tripping is only expected within float
    /// tolerance, not under integer quantization.
    pub fn inverse(&self, spectral: &Array3<f32>) -> Result<Array2<f32>> {
        let side = self.block_side;
        let (num_channels, rows, cols) = spectral.dim();
        if rows != side || cols != side {
            return Err(SegError::ConfigurationMismatch(format!(
                "spectral block is {}x{}, expected {}x{}",
                rows, cols, side, side
            )));
        }

        let scale = (2.0 / side as f32) * (2.0 / side as f32);
        let mut out = Array2::<f32>::zeros((num_channels, side * side));
        let mut buffer = vec![0.0f32; side];
        for channel in 0..num_channels {
            let mut block = spectral.slice(s![channel, .., ..]).to_owned();

            for mut col in block.columns_mut() {
                for (dst, &src) in buffer.iter_mut().zip(col.iter()) {
                    *dst = src;
                }
                self.dct.process_dct3(&mut buffer);
                for (dst, &src) in col.iter_mut().zip(buffer.iter()) {
                    *dst = src;
                }
            }
            for mut row in block.rows_mut() {
                for (dst, &src) in buffer.iter_mut().zip(row.iter()) {
                    *dst = src;
                }
                self.dct.process_dct3(&mut buffer);
                for (dst, &src) in row.iter_mut().zip(buffer.iter()) {
                    *dst = src;
                }
            }

            for (dst, &src) in out.row_mut(channel).iter_mut().zip(block.iter()) {
                *dst = src * scale;
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_square_window_len() {
        assert!(matches!(
            SpectralTransformer::new(200),
            Err(SegError::ConfigurationMismatch(_))
        ));
        assert!(SpectralTransformer::new(256).is_ok());
    }

    #[test]
    fn test_output_shape() {
        let transformer = SpectralTransformer::new(16).unwrap();
        let tensor = Array2::<f32>::ones((3, 16));
        let spectral = transformer.transform(&tensor).unwrap();
        assert_eq!(spectral.dim(), (3, 4, 4));
    }

    #[test]
    fn test_rejects_mismatched_tensor_length() {
        let transformer = SpectralTransformer::new(16).unwrap();
        let tensor = Array2::<f32>::zeros((2, 25));
        assert!(transformer.transform(&tensor).is_err());
    }

    #[test]
    fn test_dc_component_of_constant_block() {
        // A constant signal concentrates everything in the [0, 0] bin
        let transformer = SpectralTransformer::new(16).unwrap();
        let tensor = Array2::<f32>::from_elem((1, 16), 2.0);
        let spectral = transformer.transform(&tensor).unwrap();
        assert!((spectral[[0, 0, 0]] - 2.0 * 16.0).abs() < 1e-3);
        for row in 0..4 {
            for col in 0..4 {
                if (row, col) != (0, 0) {
                    assert!(spectral[[0, row, col]].abs() < 1e-3);
                }
            }
        }
    }
}
