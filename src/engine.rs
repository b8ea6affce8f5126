use log::{debug, info, warn};
use rayon::prelude::*;

use crate::{
    config::DensityConfig,
    errors::Result,
    index::PositionIndex,
    ks::ks_uniform,
    math::{kernel_density, normalize_by_max},
    membership::{Group, GroupMembership},
    results::{DensityResults, GroupProfile, Significance},
};

/// Density and dispersion analysis of gene groups along a genome
///
/// Every group is evaluated independently against a shared position index:
/// 1. Resolve members to genome positions
/// 2. Sum a gaussian kernel at each position and normalize by the maximum
/// 3. Test the scaled positions against a uniform distribution
pub struct DensityEngine<'a> {
    index: &'a PositionIndex,
    config: DensityConfig,
}
impl<'a> DensityEngine<'a> {
    /// Fails on invalid smoothing parameters before any group is processed
    pub fn new(index: &'a PositionIndex, config: DensityConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { index, config })
    }

    /// Evaluate every group, keeping the order of `membership`
    pub fn run(&self, membership: &GroupMembership) -> DensityResults {
        info!(
            "Computing density profiles for {} groups over {} genome positions (effective sigma {})",
            membership.len(),
            self.index.genome_length(),
            self.config.effective_sigma()
        );

        let profiles = membership
            .groups()
            .par_iter()
            .map(|group| self.process_group(group))
            .collect::<Vec<_>>();

        DensityResults::from_vec(
            profiles,
            self.index.genome_length(),
            self.config.transform,
        )
    }

    /// Density profile and KS test for a single group
    pub fn process_group(&self, group: &Group) -> GroupProfile {
        let genome_length = self.index.genome_length();
        let positions = self.index.resolve(&group.members);

        if positions.is_empty() && !group.members.is_empty() {
            warn!(
                "None of the {} members of group {} are in the reference order",
                group.members.len(),
                group.name
            );
        }

        let sigma = self.config.effective_sigma();
        let mut density = kernel_density(&positions, genome_length, sigma);
        // zero-width spikes already peak at exactly 1
        if sigma > 0.0 {
            normalize_by_max(&mut density);
        }

        let scaled = positions
            .iter()
            .map(|&idx| idx as f64 / genome_length as f64)
            .collect::<Vec<_>>();
        let test = ks_uniform(&scaled);

        debug!(
            "Group {}: {} of {} members resolved, D = {:.4}, p = {:.3e}",
            group.name,
            positions.len(),
            group.members.len(),
            test.statistic,
            test.pvalue
        );

        GroupProfile::new(
            group.name.clone(),
            density,
            Significance::new(test.statistic, test.pvalue, positions.len()),
        )
    }
}

/// Builds the position index and evaluates every group in one call
pub fn render_heatmap(
    reference_order: &[String],
    membership: &GroupMembership,
    config: DensityConfig,
) -> Result<DensityResults> {
    let index = PositionIndex::new(reference_order);
    let engine = DensityEngine::new(&index, config)?;
    Ok(engine.run(membership))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TransformConfig;
    use crate::errors::ClusterMapError;
    use approx::assert_abs_diff_eq;
    use rand::seq::SliceRandom;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn genome(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("g{}", i)).collect()
    }

    fn tags(positions: impl IntoIterator<Item = usize>) -> Vec<String> {
        positions.into_iter().map(|i| format!("g{}", i)).collect()
    }

    fn single_group(name: &str, members: Vec<String>) -> GroupMembership {
        let mut membership = GroupMembership::new();
        membership.insert(name, members).unwrap();
        membership
    }

    #[test]
    fn test_single_member_profile() {
        let reference = genome(1000);
        let membership = single_group("A", tags([500]));
        let results = render_heatmap(&reference, &membership, DensityConfig::default()).unwrap();

        let row = results.matrix.row(0);
        assert_eq!(row.len(), 1000);
        assert_abs_diff_eq!(row[500], 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(row[420], (-0.5f64).exp(), epsilon = 0.01);
        assert_abs_diff_eq!(row[580], (-0.5f64).exp(), epsilon = 0.01);
        assert_abs_diff_eq!(row[0], 0.0, epsilon = 1e-6);
        assert!(results.labels[0].starts_with("A (n=1, "));
    }

    #[test]
    fn test_unresolved_group() {
        let reference = genome(100);
        let membership = single_group("B", vec!["not_a_gene".to_string()]);
        let results = render_heatmap(&reference, &membership, DensityConfig::default()).unwrap();

        assert_eq!(results.significance[0].n_resolved, 0);
        assert!(results.matrix.row(0).iter().all(|x| *x == 0.0));
        assert!(results.labels[0].ends_with("(n=0, ns)"));
    }

    #[test]
    fn test_empty_genome() {
        let membership = single_group("C", tags([1, 2]));
        let results = render_heatmap(&[], &membership, DensityConfig::default()).unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results.genome_length(), 0);
        assert!(results.matrix.row(0).is_empty());
        assert_eq!(results.labels[0], "C (n=0, ns)");
    }

    #[test]
    fn test_zero_sigma_spikes() {
        let reference = genome(10);
        let membership = single_group("D", tags([2, 7]));
        let config = DensityConfig::builder().sigma(0.0).build();
        let results = render_heatmap(&reference, &membership, config).unwrap();

        for (p, value) in results.matrix.row(0).into_iter().enumerate() {
            if p == 2 || p == 7 {
                assert_eq!(*value, 1.0);
            } else {
                assert_eq!(*value, 0.0);
            }
        }
    }

    #[test]
    fn test_invalid_config_rejected_before_work() {
        let index = PositionIndex::new(&genome(10));
        let config = DensityConfig::builder().spread_factor(0.0).build();
        assert!(matches!(
            DensityEngine::new(&index, config),
            Err(ClusterMapError::InvalidSpreadFactor(_))
        ));
        let config = DensityConfig::builder().sigma(-5.0).build();
        assert!(matches!(
            render_heatmap(&genome(10), &GroupMembership::new(), config),
            Err(ClusterMapError::InvalidSigma(_))
        ));
    }

    #[test]
    fn test_normalization_invariant() {
        let reference = genome(300);
        let mut membership = GroupMembership::new();
        membership.insert("a", tags([0, 1, 2, 150])).unwrap();
        membership.insert("b", tags([299])).unwrap();
        membership.insert("c", tags(0..300)).unwrap();
        membership.insert("d", vec![]).unwrap();
        let results = render_heatmap(&reference, &membership, DensityConfig::default()).unwrap();

        for (i, row) in results.matrix.outer_iter().enumerate() {
            let max = row.iter().copied().fold(0.0, f64::max);
            if results.significance[i].n_resolved > 0 {
                assert_abs_diff_eq!(max, 1.0, epsilon = 1e-6);
            } else {
                assert_eq!(max, 0.0);
            }
            assert!(row.iter().all(|x| (0.0..=1.0).contains(x)));
        }
    }

    #[test]
    fn test_group_order_preserved() {
        let reference = genome(50);
        let mut membership = GroupMembership::new();
        for name in ["zeta", "alpha", "mu"] {
            membership.insert(name, tags([10])).unwrap();
        }
        let results = render_heatmap(&reference, &membership, DensityConfig::default()).unwrap();
        assert_eq!(results.names, vec!["zeta", "alpha", "mu"]);
        assert!(results.labels[1].starts_with("alpha"));
    }

    #[test]
    fn test_deterministic_and_order_independent() {
        let reference = genome(500);
        let members = tags([3, 50, 51, 52, 250, 400, 499]);
        let mut shuffled = members.clone();
        shuffled.shuffle(&mut ChaCha8Rng::seed_from_u64(42));

        let a = render_heatmap(
            &reference,
            &single_group("x", members),
            DensityConfig::default(),
        )
        .unwrap();
        let b = render_heatmap(
            &reference,
            &single_group("x", shuffled),
            DensityConfig::default(),
        )
        .unwrap();

        assert_eq!(a.labels, b.labels);
        assert_eq!(a.significance, b.significance);
        for (x, y) in a.matrix.iter().zip(b.matrix.iter()) {
            assert_abs_diff_eq!(*x, *y, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_wider_sigma_raises_distant_density() {
        let reference = genome(1000);
        let membership = single_group("A", tags([100]));
        let far = 900;
        let mut previous = 0.0;
        for sigma in [1.0, 5.0, 20.0, 50.0, 100.0] {
            let config = DensityConfig::builder().sigma(sigma).build();
            let results = render_heatmap(&reference, &membership, config).unwrap();
            let value = results.matrix[[0, far]];
            assert!(value >= previous);
            previous = value;
        }
        assert!(previous > 0.0);
    }

    #[test]
    fn test_evenly_spaced_group_not_significant() {
        let reference = genome(1000);
        let membership = single_group("even", tags((0..1000).step_by(100)));
        let results = render_heatmap(&reference, &membership, DensityConfig::default()).unwrap();
        assert!(results.significance[0].pvalue > 0.05);
        assert_eq!(results.labels[0], "even (n=10, ns)");
    }

    #[test]
    fn test_clustered_group_significant() {
        let reference = genome(1000);
        let membership = single_group("clustered", tags(0..50));
        let results = render_heatmap(&reference, &membership, DensityConfig::default()).unwrap();
        assert!(results.significance[0].pvalue < 0.001);
        assert_eq!(results.labels[0], "clustered (n=50, ***)");
    }

    #[test]
    fn test_fdr_adjusted_labels() {
        let reference = genome(1000);
        let mut membership = GroupMembership::new();
        membership.insert("clustered", tags(0..50)).unwrap();
        membership.insert("even", tags((0..1000).step_by(100))).unwrap();
        let config = DensityConfig::builder()
            .transform(TransformConfig::Fdr)
            .build();
        let results = render_heatmap(&reference, &membership, config).unwrap();
        assert_eq!(results.adjusted_pvalues.len(), 2);
        assert!(results.adjusted_pvalues[0] >= results.significance[0].pvalue);
        assert!(results.labels[0].ends_with("***)"));
        assert!(results.labels[1].ends_with("ns)"));
    }
}
