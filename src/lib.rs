//! locus-density: Genomic Localization of Gene Clusters
//!
//! This library measures how keyword-defined groups of genes are distributed
//! along a genome. Each group is turned into a smoothed density profile over
//! the ordered locus tags, and its positions are tested for departure from a
//! uniform spread with a one-sample Kolmogorov-Smirnov test.
//!
//! The main components of this library are:
//! - `run_clustering`: Assign annotated genes to keyword groups
//! - `PositionIndex`: Genome positions of the ordered locus tags
//! - `DensityEngine`: Density profiles and KS tests for every group
//! - `DensityConfig`: Smoothing width and p-value adjustment
//! - `DensityResults`: Density matrix and row labels for rendering
//! - `draw_heatmap`: PNG rendering of the results

mod clustering;
mod config;
mod engine;
mod errors;
mod index;
mod io;
mod ks;
mod math;
mod membership;
mod render;
mod results;

pub use clustering::{run_clustering, AnnotationRow, KeywordGroup, KeywordGroups};
pub use config::{
    DensityConfig, HeatmapStyle, TransformConfig, DEFAULT_SIGMA, DEFAULT_SPREAD_FACTOR,
};
pub use engine::{render_heatmap, DensityEngine};
pub use errors::{ClusterMapError, Result};
pub use index::PositionIndex;
pub use io::{
    read_annotations, read_cluster_table, read_groups, read_keyword_groups, read_reference_order,
    write_cluster_table, write_density_matrix,
};
pub use ks::{ks_uniform, KsTest};
pub use membership::{Group, GroupMembership};
pub use render::{draw_heatmap, Colormap};
pub use results::{format_label, significance_marker, DensityResults, GroupProfile, Significance};
