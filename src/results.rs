use derive_new::new;
use ndarray::{Array2, ArrayView1};

use crate::config::TransformConfig;

/// Shorthand for a p-value against the 0.001 / 0.01 / 0.05 thresholds
pub fn significance_marker(pvalue: f64) -> &'static str {
    if pvalue < 0.001 {
        "***"
    } else if pvalue < 0.01 {
        "**"
    } else if pvalue < 0.05 {
        "*"
    } else {
        "ns"
    }
}

/// Row label of the form `<name> (n=<count>, <marker>)`
pub fn format_label(name: &str, n_resolved: usize, pvalue: f64) -> String {
    format!("{} (n={}, {})", name, n_resolved, significance_marker(pvalue))
}

/// Dispersion test outcome for one group
#[derive(Debug, Clone, Copy, PartialEq, new)]
pub struct Significance {
    pub statistic: f64,
    pub pvalue: f64,
    /// Members found in the reference order
    pub n_resolved: usize,
}

/// Density profile and test outcome for one group
#[derive(Debug, Clone, new)]
pub struct GroupProfile {
    pub name: String,
    pub density: Vec<f64>,
    pub significance: Significance,
}

/// Density matrix, labels and per-group statistics in input group order
#[derive(Debug, Clone)]
pub struct DensityResults {
    pub names: Vec<String>,
    pub labels: Vec<String>,
    /// One row per group, one column per genome position
    pub matrix: Array2<f64>,
    pub significance: Vec<Significance>,
    /// P-values after the configured adjustment, used by the labels
    pub adjusted_pvalues: Vec<f64>,
}

impl DensityResults {
    pub fn from_vec(
        profiles: Vec<GroupProfile>,
        genome_length: usize,
        transform: TransformConfig,
    ) -> Self {
        let mut names = Vec::with_capacity(profiles.len());
        let mut matrix = Array2::<f64>::zeros((profiles.len(), genome_length));
        let mut significance = Vec::with_capacity(profiles.len());

        for (i, profile) in profiles.into_iter().enumerate() {
            matrix
                .row_mut(i)
                .assign(&ArrayView1::from(profile.density.as_slice()));
            names.push(profile.name);
            significance.push(profile.significance);
        }

        let pvalues = significance.iter().map(|s| s.pvalue).collect::<Vec<_>>();
        let adjusted_pvalues = transform.transform(&pvalues);

        let labels = names
            .iter()
            .zip(significance.iter())
            .zip(adjusted_pvalues.iter())
            .map(|((name, sig), pvalue)| format_label(name, sig.n_resolved, *pvalue))
            .collect();

        Self {
            names,
            labels,
            matrix,
            significance,
            adjusted_pvalues,
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn genome_length(&self) -> usize {
        self.matrix.ncols()
    }

    pub fn pprint(&self) {
        println!("Group\tN\tKS Statistic\tP-value\tAdjusted P-value\tSignificance");
        for i in 0..self.names.len() {
            println!(
                "{}\t{}\t{}\t{}\t{}\t{}",
                self.names[i],
                self.significance[i].n_resolved,
                self.significance[i].statistic,
                self.significance[i].pvalue,
                self.adjusted_pvalues[i],
                significance_marker(self.adjusted_pvalues[i])
            );
        }
    }
}
