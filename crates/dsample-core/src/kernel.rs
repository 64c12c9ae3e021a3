//! Isotropic Gaussian weights over a square `(2R+1) x (2R+1)` window.
//!
//! Offsets are normalized by the radius (`t = d / R`), so the window always
//! spans `t ∈ [-1, 1]` and `sigma` is expressed in those units.

use serde::{Deserialize, Serialize};

/// Largest window radius any stage may use.
pub const MAX_KERNEL_RADIUS: usize = 12;

/// How the exponent is formed from the squared normalized distance `d²`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KernelFalloff {
    /// `exp(-d² * k)`: larger sigma, wider kernel.
    #[default]
    Scaled,
    /// `exp(-d² / k)`: larger sigma, narrower kernel. Used by the residual stage.
    Inverse,
}

/// Gaussian rate `k = 1 / (factor * π * sigma²)`.
///
/// `factor` is 2 for planar kernels and 3 for volumetric ones. The product is
/// formed in `f64` and rounded once.
#[inline]
pub fn gaussian_rate(sigma: f32, factor: f32) -> f32 {
    let s = sigma as f64;
    (1.0 / (factor as f64 * std::f64::consts::PI * s * s)) as f32
}

/// Gaussian kernel with its weights precomputed once.
///
/// The table is owned by the value, so two kernels never share state and the
/// same kernel can be reused across passes and sessions.
#[derive(Clone, Debug, PartialEq)]
pub struct GaussianKernel {
    radius: usize,
    sigma: f32,
    rate: f32,
    falloff: KernelFalloff,
    table: Vec<f32>,
}

impl GaussianKernel {
    /// Planar kernel with the default `exp(-d² k)` falloff.
    ///
    /// # Panics
    /// If `radius` is zero.
    pub fn new(radius: usize, sigma: f32) -> Self {
        Self::with_falloff(radius, sigma, KernelFalloff::Scaled)
    }

    /// # Panics
    /// If `radius` is zero.
    pub fn with_falloff(radius: usize, sigma: f32, falloff: KernelFalloff) -> Self {
        assert!(radius > 0, "gaussian kernel radius must be positive");
        let rate = gaussian_rate(sigma, 2.0);
        let mut kernel = Self {
            radius,
            sigma,
            rate,
            falloff,
            table: Vec::new(),
        };
        let r = radius as isize;
        let mut table = Vec::with_capacity(kernel.diameter() * kernel.diameter());
        for dy in -r..=r {
            for dx in -r..=r {
                table.push(kernel.eval(dx, dy));
            }
        }
        kernel.table = table;
        kernel
    }

    #[inline]
    pub fn radius(&self) -> usize {
        self.radius
    }

    #[inline]
    pub fn sigma(&self) -> f32 {
        self.sigma
    }

    #[inline]
    pub fn rate(&self) -> f32 {
        self.rate
    }

    #[inline]
    pub fn falloff(&self) -> KernelFalloff {
        self.falloff
    }

    #[inline]
    pub fn diameter(&self) -> usize {
        2 * self.radius + 1
    }

    /// Normalized offset `d / R`.
    #[inline]
    pub fn normalized(&self, d: isize) -> f32 {
        d as f32 / self.radius as f32
    }

    /// Weight for already-normalized offsets.
    #[inline]
    pub fn eval_normalized(&self, tx: f32, ty: f32) -> f32 {
        let dist2 = tx * tx + ty * ty;
        match self.falloff {
            KernelFalloff::Scaled => (-dist2 * self.rate).exp(),
            KernelFalloff::Inverse => (-dist2 / self.rate).exp(),
        }
    }

    /// Weight for offset `(dx, dy)`, recomputing `exp`.
    #[inline]
    pub fn eval(&self, dx: isize, dy: isize) -> f32 {
        self.eval_normalized(self.normalized(dx), self.normalized(dy))
    }

    /// Precomputed weight at kernel indices `(dx + R, dy + R)`.
    #[inline]
    pub fn weight(&self, kx: usize, ky: usize) -> f32 {
        self.table[kx + ky * self.diameter()]
    }

    /// Precomputed weights of kernel row `ky` (`dy = ky - R`).
    #[inline]
    pub fn row(&self, ky: usize) -> &[f32] {
        let d = self.diameter();
        &self.table[ky * d..(ky + 1) * d]
    }

    #[inline]
    pub fn table(&self) -> &[f32] {
        &self.table
    }
}
