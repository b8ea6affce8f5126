use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClusterMapError>;

#[derive(Error, Debug)]
pub enum ClusterMapError {
    #[error("sigma must be a finite value >= 0 (got {0})")]
    InvalidSigma(f64),
    #[error("spread factor must be a finite value >= 1 (got {0})")]
    InvalidSpreadFactor(f64),
    #[error("locus tag {0} appears more than once in the reference order")]
    DuplicateReference(String),
    #[error("group {0} is defined more than once")]
    DuplicateGroup(String),
    #[error("unknown colormap: {0} (expected one of plasma, viridis, ylgnbu, greys)")]
    UnknownColormap(String),
    #[error("unknown p-value adjustment: {0} (expected one of none, fdr, bonferroni)")]
    UnknownTransform(String),
    #[error("input table {0} has no columns")]
    MissingColumn(String),
    #[error("failed to render heatmap: {0}")]
    Render(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
}
