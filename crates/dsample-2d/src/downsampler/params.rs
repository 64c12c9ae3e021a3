use dsample_core::MAX_KERNEL_RADIUS;
use serde::{Deserialize, Serialize};

use super::DownsampleError;
use crate::{
    BilateralParams, BILATERAL_RADIUS, GAUSS_RADIUS, GAUSS_SIGMA, RESIDUAL_RADIUS, RESIDUAL_SIGMA,
};

/// Radius and sigma of one Gaussian window.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct KernelParams {
    pub radius: usize,
    pub sigma: f32,
}

impl KernelParams {
    fn validate(&self, stage: &'static str) -> Result<(), DownsampleError> {
        validate_radius(stage, self.radius)?;
        if !self.sigma.is_finite() || self.sigma <= 0.0 {
            return Err(DownsampleError::InvalidSigma {
                stage,
                sigma: self.sigma,
            });
        }
        Ok(())
    }
}

fn validate_radius(stage: &'static str, radius: usize) -> Result<(), DownsampleError> {
    if radius == 0 {
        return Err(DownsampleError::ZeroRadius { stage });
    }
    if radius > MAX_KERNEL_RADIUS {
        return Err(DownsampleError::RadiusTooLarge {
            stage,
            radius,
            max: MAX_KERNEL_RADIUS,
        });
    }
    Ok(())
}

/// What the residual stage writes when a window's residual weights sum to
/// zero (any perfectly flat region).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegeneratePolicy {
    /// Use the plain residual-stage Gaussian average for that pixel.
    #[default]
    GaussFallback,
    /// Abort the pass with [`DownsampleError::DegenerateWeightSum`].
    Error,
}

/// Configuration of a downsampling session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownsampleParams {
    /// Plain Gaussian stage (reference and fast pass).
    pub gauss: KernelParams,
    /// Window radius of the bilateral stage.
    pub bilateral_radius: usize,
    /// Bilateral falloff. Mutable between runs through the session setters.
    pub bilateral: BilateralParams,
    /// Residual-weighted final stage. Its Gaussian uses the inverse falloff
    /// `exp(-d² / k)`.
    pub residual: KernelParams,
    pub degenerate_policy: DegeneratePolicy,
    /// Skip the diagnostic stages (subsample, reference Gaussian, bilateral)
    /// in [`Downsampler::run_all`](crate::Downsampler::run_all).
    pub final_only: bool,
}

impl Default for DownsampleParams {
    fn default() -> Self {
        Self {
            gauss: KernelParams {
                radius: GAUSS_RADIUS,
                sigma: GAUSS_SIGMA,
            },
            bilateral_radius: BILATERAL_RADIUS,
            bilateral: BilateralParams::default(),
            residual: KernelParams {
                radius: RESIDUAL_RADIUS,
                sigma: RESIDUAL_SIGMA,
            },
            degenerate_policy: DegeneratePolicy::default(),
            final_only: false,
        }
    }
}

impl DownsampleParams {
    /// Check radii against [`MAX_KERNEL_RADIUS`] and sigmas for positivity.
    pub fn validate(&self) -> Result<(), DownsampleError> {
        self.gauss.validate("gauss")?;
        self.residual.validate("residual")?;
        validate_radius("bilateral", self.bilateral_radius)?;
        KernelParams {
            radius: self.bilateral_radius,
            sigma: self.bilateral.sigma_pos,
        }
        .validate("bilateral position")?;
        KernelParams {
            radius: self.bilateral_radius,
            sigma: self.bilateral.sigma_val,
        }
        .validate("bilateral value")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let p = DownsampleParams::default();
        p.validate().expect("defaults validate");
        assert_eq!(p.gauss.radius, 5);
        assert_eq!(p.residual.radius, 8);
        assert_eq!(p.bilateral_radius, 8);
    }

    #[test]
    fn oversized_residual_radius_is_rejected() {
        let p = DownsampleParams {
            residual: KernelParams {
                radius: MAX_KERNEL_RADIUS + 1,
                sigma: 1.5,
            },
            ..DownsampleParams::default()
        };
        assert!(matches!(
            p.validate(),
            Err(DownsampleError::RadiusTooLarge {
                stage: "residual",
                radius: 13,
                max: 12
            })
        ));
    }

    #[test]
    fn non_positive_sigma_is_rejected() {
        let mut p = DownsampleParams::default();
        p.bilateral.sigma_val = 0.0;
        assert!(matches!(
            p.validate(),
            Err(DownsampleError::InvalidSigma {
                stage: "bilateral value",
                ..
            })
        ));
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let p: DownsampleParams =
            serde_json::from_str(r#"{ "final_only": true, "degenerate_policy": "error" }"#)
                .expect("parse");
        assert!(p.final_only);
        assert_eq!(p.degenerate_policy, DegeneratePolicy::Error);
        assert_eq!(p.gauss, DownsampleParams::default().gauss);
    }
}
