mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use cli::{Cli, ClusterArgs, Commands, HeatmapArgs};
use locus_density::{
    draw_heatmap, read_annotations, read_cluster_table, read_groups, read_keyword_groups,
    read_reference_order, run_clustering, write_cluster_table, write_density_matrix,
    DensityConfig, DensityEngine, HeatmapStyle, KeywordGroups, PositionIndex,
};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match cli.command {
        Commands::Cluster(args) => cluster(args),
        Commands::Heatmap(args) => heatmap(args),
    }
}

fn cluster(args: ClusterArgs) -> Result<()> {
    let rows = read_annotations(&args.annotations).with_context(|| {
        format!(
            "failed to read annotations from {}",
            args.annotations.display()
        )
    })?;
    let groups = match &args.keywords {
        Some(path) => read_keyword_groups(path)
            .with_context(|| format!("failed to read keyword groups from {}", path.display()))?,
        None => KeywordGroups::default_vocabulary(),
    };

    let membership = run_clustering(&rows, &groups)?;
    write_cluster_table(&args.output, &membership)
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    info!("Gene clusters exported to {}", args.output.display());
    Ok(())
}

fn heatmap(args: HeatmapArgs) -> Result<()> {
    if let Some(threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure the thread pool")?;
    }

    let config = DensityConfig::builder()
        .sigma(args.sigma)
        .spread_factor(args.spread_factor)
        .transform(args.adjust)
        .build();
    config.validate()?;

    let (reference, membership) = match &args.reference {
        Some(reference_path) => {
            let reference = read_reference_order(reference_path).with_context(|| {
                format!("failed to read genome order from {}", reference_path.display())
            })?;
            let membership = read_groups(&args.input)
                .with_context(|| format!("failed to read groups from {}", args.input.display()))?;
            (reference, membership)
        }
        None => read_cluster_table(&args.input)
            .with_context(|| format!("failed to read {}", args.input.display()))?,
    };

    let index = if args.strict_reference {
        PositionIndex::strict(&reference)?
    } else {
        PositionIndex::new(&reference)
    };
    let engine = DensityEngine::new(&index, config)?;
    let results = engine.run(&membership);
    results.pprint();

    if let Some(matrix_path) = &args.matrix {
        write_density_matrix(matrix_path, &results)
            .with_context(|| format!("failed to write {}", matrix_path.display()))?;
        info!("Density matrix written to {}", matrix_path.display());
    }

    let style = HeatmapStyle::builder()
        .colormap(args.colormap)
        .height_per_cluster(args.height_per_cluster)
        .label_fontsize(args.label_fontsize)
        .dpi(args.dpi)
        .build();
    draw_heatmap(&args.output, &results, &style)
        .with_context(|| format!("failed to render {}", args.output.display()))?;
    info!("Heatmap saved to {}", args.output.display());
    Ok(())
}
