use std::str::FromStr;

use adjustp::{adjust, Procedure};
use bon::Builder;

use crate::errors::{ClusterMapError, Result};
use crate::render::Colormap;

pub const DEFAULT_SIGMA: f64 = 20.0;
pub const DEFAULT_SPREAD_FACTOR: f64 = 4.0;

/// Smoothing and testing parameters for the density engine
///
/// The kernel width in genome positions is `sigma * spread_factor`.
/// The spread factor dilates the kernel without changing its shape.
#[derive(Debug, Clone, Copy, Builder)]
pub struct DensityConfig {
    /// Base gaussian smoothing width in genome positions
    #[builder(default = DEFAULT_SIGMA)]
    pub sigma: f64,
    /// Multiplier applied to `sigma`
    #[builder(default = DEFAULT_SPREAD_FACTOR)]
    pub spread_factor: f64,
    /// Adjustment applied to the KS p-values across groups
    #[builder(default)]
    pub transform: TransformConfig,
}

impl Default for DensityConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl DensityConfig {
    /// Rejects parameters that produce meaningless kernels
    pub fn validate(&self) -> Result<()> {
        if !self.sigma.is_finite() || self.sigma < 0.0 {
            return Err(ClusterMapError::InvalidSigma(self.sigma));
        }
        if !self.spread_factor.is_finite() || self.spread_factor < 1.0 {
            return Err(ClusterMapError::InvalidSpreadFactor(self.spread_factor));
        }
        Ok(())
    }

    pub fn effective_sigma(&self) -> f64 {
        self.sigma * self.spread_factor
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TransformConfig {
    #[default]
    Identity,
    Fdr,
    Bonferroni,
}
impl TransformConfig {
    pub fn transform(&self, pvalues: &[f64]) -> Vec<f64> {
        if pvalues.is_empty() {
            return Vec::new();
        }
        match self {
            TransformConfig::Identity => pvalues.to_vec(),
            TransformConfig::Fdr => adjust(pvalues, Procedure::BenjaminiHochberg),
            TransformConfig::Bonferroni => adjust(pvalues, Procedure::Bonferroni),
        }
    }
}

impl FromStr for TransformConfig {
    type Err = ClusterMapError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "none" | "identity" => Ok(TransformConfig::Identity),
            "fdr" | "bh" => Ok(TransformConfig::Fdr),
            "bonferroni" => Ok(TransformConfig::Bonferroni),
            _ => Err(ClusterMapError::UnknownTransform(s.to_string())),
        }
    }
}

/// Layout options for the rendered heatmap
///
/// Physical sizes are given in inches and points and converted to pixels
/// through `dpi`.
#[derive(Debug, Clone, Builder)]
pub struct HeatmapStyle {
    #[builder(default)]
    pub colormap: Colormap,
    /// Vertical space given to each group row
    #[builder(default = 0.3)]
    pub height_per_cluster: f64,
    #[builder(default = 10.0)]
    pub label_fontsize: f64,
    #[builder(default = 300)]
    pub dpi: u32,
    #[builder(default = 14.0)]
    pub width: f64,
    #[builder(default = String::from("Gene Cluster Localization Heatmap (with KS Test)"))]
    pub title: String,
}

impl Default for HeatmapStyle {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl HeatmapStyle {
    /// Converts a length in points to pixels at the configured resolution
    pub fn points_to_pixels(&self, points: f64) -> u32 {
        (points * self.dpi as f64 / 72.0).round() as u32
    }

    /// Pixel dimensions of a figure holding `n_rows` groups
    pub fn figure_size(&self, n_rows: usize) -> (u32, u32) {
        let height = self.height_per_cluster * n_rows as f64 + 1.5;
        let dpi = self.dpi as f64;
        ((self.width * dpi).round() as u32, (height * dpi).round() as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_density_config() {
        let config = DensityConfig::default();
        assert_eq!(config.sigma, 20.0);
        assert_eq!(config.spread_factor, 4.0);
        assert_eq!(config.transform, TransformConfig::Identity);
        assert_eq!(config.effective_sigma(), 80.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_sigma_is_valid() {
        let config = DensityConfig::builder().sigma(0.0).build();
        assert!(config.validate().is_ok());
        assert_eq!(config.effective_sigma(), 0.0);
    }

    #[test]
    fn test_negative_sigma_rejected() {
        let config = DensityConfig::builder().sigma(-1.0).build();
        assert!(matches!(
            config.validate(),
            Err(ClusterMapError::InvalidSigma(_))
        ));
    }

    #[test]
    fn test_nan_sigma_rejected() {
        let config = DensityConfig::builder().sigma(f64::NAN).build();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_small_spread_factor_rejected() {
        let config = DensityConfig::builder().spread_factor(0.5).build();
        assert!(matches!(
            config.validate(),
            Err(ClusterMapError::InvalidSpreadFactor(_))
        ));
    }

    #[test]
    fn test_transform_identity() {
        let pvalues = vec![0.01, 0.02, 0.5];
        assert_eq!(TransformConfig::Identity.transform(&pvalues), pvalues);
    }

    #[test]
    fn test_transform_bonferroni() {
        let adjusted = TransformConfig::Bonferroni.transform(&[0.01, 0.02, 0.5]);
        assert_relative_eq!(adjusted[0], 0.03, epsilon = 1e-12);
        assert_relative_eq!(adjusted[1], 0.06, epsilon = 1e-12);
        assert!(adjusted[2] >= 0.5);
    }

    #[test]
    fn test_transform_empty() {
        assert!(TransformConfig::Fdr.transform(&[]).is_empty());
    }

    #[test]
    fn test_transform_from_str() {
        assert_eq!("FDR".parse::<TransformConfig>().unwrap(), TransformConfig::Fdr);
        assert_eq!("none".parse::<TransformConfig>().unwrap(), TransformConfig::Identity);
        assert!("holm".parse::<TransformConfig>().is_err());
    }

    #[test]
    fn test_figure_size() {
        let style = HeatmapStyle::builder().dpi(100).build();
        assert_eq!(style.figure_size(10), (1400, 450));
        assert_eq!(style.points_to_pixels(72.0), 100);
    }
}
