use dsample_core::{gaussian_rate, MAX_KERNEL_RADIUS};
use serde::{Deserialize, Serialize};

use crate::VolumeError;

/// Default neighbourhood radius.
pub const VOLUME_GAUSS_RADIUS: usize = 1;
/// Default sigma, in radius-normalized units; larger values blur more.
pub const VOLUME_GAUSS_SIGMA: f32 = 0.8;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolumeGaussParams {
    pub radius: usize,
    pub sigma: f32,
}

impl Default for VolumeGaussParams {
    fn default() -> Self {
        Self {
            radius: VOLUME_GAUSS_RADIUS,
            sigma: VOLUME_GAUSS_SIGMA,
        }
    }
}

impl VolumeGaussParams {
    pub fn validate(&self) -> Result<(), VolumeError> {
        if self.radius == 0 || self.radius > MAX_KERNEL_RADIUS {
            return Err(VolumeError::InvalidRadius {
                radius: self.radius,
                max: MAX_KERNEL_RADIUS,
            });
        }
        if !self.sigma.is_finite() || self.sigma <= 0.0 {
            return Err(VolumeError::InvalidSigma { sigma: self.sigma });
        }
        Ok(())
    }
}

/// Cubic Gaussian kernel, `exp(-(tx² + ty² + tz²) k)` with
/// `k = 1 / (3π sigma²)` and `t = d / R`.
#[derive(Clone, Debug, PartialEq)]
pub struct VolumeKernel {
    params: VolumeGaussParams,
    rate: f32,
    /// `(2R+1)³` weights, indexed `kx + (ky + kz * D) * D`.
    table: Vec<f32>,
}

impl VolumeKernel {
    pub fn new(params: VolumeGaussParams) -> Result<Self, VolumeError> {
        params.validate()?;
        let mut kernel = Self {
            params,
            rate: gaussian_rate(params.sigma, 3.0),
            table: Vec::new(),
        };
        let d = kernel.diameter();
        let mut table = Vec::new();
        table.try_reserve_exact(d * d * d)?;
        let r = params.radius as isize;
        for dz in -r..=r {
            for dy in -r..=r {
                for dx in -r..=r {
                    table.push(kernel.eval(dx, dy, dz));
                }
            }
        }
        kernel.table = table;
        Ok(kernel)
    }

    #[inline]
    pub fn params(&self) -> VolumeGaussParams {
        self.params
    }

    #[inline]
    pub fn radius(&self) -> usize {
        self.params.radius
    }

    #[inline]
    pub fn rate(&self) -> f32 {
        self.rate
    }

    #[inline]
    pub fn diameter(&self) -> usize {
        2 * self.params.radius + 1
    }

    /// Weight for offset `(dx, dy, dz)`, recomputing `exp`.
    #[inline]
    pub fn eval(&self, dx: isize, dy: isize, dz: isize) -> f32 {
        let r = self.params.radius as f32;
        let tx = dx as f32 / r;
        let ty = dy as f32 / r;
        let tz = dz as f32 / r;
        let dist2 = tx * tx + ty * ty + tz * tz;
        (-dist2 * self.rate).exp()
    }

    /// Precomputed weights of kernel row `(ky, kz)`.
    #[inline]
    pub fn row(&self, ky: usize, kz: usize) -> &[f32] {
        let d = self.diameter();
        let start = (ky + kz * d) * d;
        &self.table[start..start + d]
    }

    #[inline]
    pub fn table(&self) -> &[f32] {
        &self.table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_kernel_has_27_weights() {
        let k = VolumeKernel::new(VolumeGaussParams::default()).expect("kernel");
        assert_eq!(k.table().len(), 27);
        assert_eq!(k.row(1, 1)[1], 1.0);
        assert!(k.table().iter().all(|&w| w > 0.0 && w <= 1.0));
        // corners are the lightest
        let corner = k.row(0, 0)[0];
        assert!(k.table().iter().all(|&w| w >= corner));
    }

    #[test]
    fn table_matches_eval_bitwise() {
        let k = VolumeKernel::new(VolumeGaussParams {
            radius: 2,
            sigma: 0.6,
        })
        .expect("kernel");
        for kz in 0..5 {
            for ky in 0..5 {
                for kx in 0..5 {
                    let e = k.eval(kx as isize - 2, ky as isize - 2, kz as isize - 2);
                    assert_eq!(k.row(ky, kz)[kx].to_bits(), e.to_bits());
                }
            }
        }
    }

    #[test]
    fn rate_uses_volumetric_factor() {
        let k = VolumeKernel::new(VolumeGaussParams::default()).expect("kernel");
        let expected = 1.0 / (3.0 * std::f64::consts::PI * 0.8f32 as f64 * 0.8f32 as f64);
        assert_eq!(k.rate(), expected as f32);
    }

    #[test]
    fn invalid_params_are_rejected() {
        assert!(matches!(
            VolumeKernel::new(VolumeGaussParams {
                radius: 0,
                sigma: 0.8
            }),
            Err(VolumeError::InvalidRadius { radius: 0, .. })
        ));
        assert!(matches!(
            VolumeKernel::new(VolumeGaussParams {
                radius: 1,
                sigma: -0.1
            }),
            Err(VolumeError::InvalidSigma { .. })
        ));
    }
}
