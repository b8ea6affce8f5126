use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use locus_density::{Colormap, TransformConfig, DEFAULT_SIGMA, DEFAULT_SPREAD_FACTOR};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Print per-group progress
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Assign annotated genes to keyword groups and write one column per group
    Cluster(ClusterArgs),
    /// Compute group density profiles with KS tests and render a heatmap
    Heatmap(HeatmapArgs),
}

#[derive(Args, Debug)]
pub struct ClusterArgs {
    /// Annotation table (e.g. a DAVID gene2term export); first column holds locus tags
    #[arg(short, long)]
    pub annotations: PathBuf,
    /// Keyword groups, one per line: `name<TAB>keyword,keyword,...` [default: built-in vocabulary]
    #[arg(short, long)]
    pub keywords: Option<PathBuf>,
    /// Output cluster table
    #[arg(short, long)]
    pub output: PathBuf,
}

#[derive(Args, Debug)]
pub struct HeatmapArgs {
    /// Cluster table; the first column is the genome order unless --reference is given
    #[arg(short, long)]
    pub input: PathBuf,
    /// Table whose first column is the genome order; every column of --input is then a group
    #[arg(short, long)]
    pub reference: Option<PathBuf>,
    /// Output PNG
    #[arg(short, long, default_value = "gene_cluster_heatmap_KS.png")]
    pub output: PathBuf,
    /// Also write the density matrix and statistics to this table
    #[arg(short, long)]
    pub matrix: Option<PathBuf>,
    /// Base gaussian smoothing width in genome positions
    #[arg(short, long, default_value_t = DEFAULT_SIGMA)]
    pub sigma: f64,
    /// Multiplier applied to sigma
    #[arg(long, default_value_t = DEFAULT_SPREAD_FACTOR)]
    pub spread_factor: f64,
    /// P-value adjustment across groups (none, fdr, bonferroni)
    #[arg(long, default_value = "none")]
    pub adjust: TransformConfig,
    /// Heatmap color scale (plasma, viridis, ylgnbu, greys)
    #[arg(short, long, default_value = "plasma")]
    pub colormap: Colormap,
    /// Vertical inches per group row
    #[arg(long, default_value_t = 0.3)]
    pub height_per_cluster: f64,
    /// Row label font size in points
    #[arg(long, default_value_t = 10.0)]
    pub label_fontsize: f64,
    /// Output resolution
    #[arg(long, default_value_t = 300)]
    pub dpi: u32,
    /// Fail when a locus tag appears more than once in the genome order
    #[arg(long)]
    pub strict_reference: bool,
    /// Number of worker threads [default: all cores]
    #[arg(short, long)]
    pub threads: Option<usize>,
}
