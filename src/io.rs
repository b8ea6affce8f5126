//! Tab or comma separated readers and writers around the core analysis
//!
//! Paths ending in `.csv` are comma separated; everything else is read and
//! written with tabs.

use std::path::Path;

use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use log::info;

use crate::{
    clustering::{AnnotationRow, KeywordGroup, KeywordGroups},
    errors::{ClusterMapError, Result},
    membership::GroupMembership,
    results::DensityResults,
};

fn delimiter<P: AsRef<Path>>(path: P) -> u8 {
    match path.as_ref().extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("csv") => b',',
        _ => b'\t',
    }
}

fn reader<P: AsRef<Path>>(path: P, has_headers: bool) -> Result<csv::Reader<std::fs::File>> {
    let reader = ReaderBuilder::new()
        .delimiter(delimiter(&path))
        .has_headers(has_headers)
        .flexible(true)
        .from_path(&path)?;
    Ok(reader)
}

fn writer<P: AsRef<Path>>(path: P) -> Result<csv::Writer<std::fs::File>> {
    let writer = WriterBuilder::new()
        .delimiter(delimiter(&path))
        .flexible(true)
        .from_path(&path)?;
    Ok(writer)
}

fn cell(record: &StringRecord, i: usize) -> Option<&str> {
    record.get(i).map(str::trim).filter(|value| !value.is_empty())
}

/// Reads an annotation table whose first column holds locus tags
///
/// The header row is skipped and rows without a locus tag are ignored.
pub fn read_annotations<P: AsRef<Path>>(path: P) -> Result<Vec<AnnotationRow>> {
    let mut reader = reader(&path, true)?;
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let Some(locus_tag) = cell(&record, 0) else {
            continue;
        };
        let fields = record.iter().skip(1).map(str::to_string).collect();
        rows.push(AnnotationRow::new(locus_tag.to_string(), fields));
    }
    info!(
        "Read {} annotated genes from {}",
        rows.len(),
        path.as_ref().display()
    );
    Ok(rows)
}

/// Reads keyword groups, one per line: `name<TAB>keyword,keyword,...`
///
/// Keywords may also be spread over further columns.
pub fn read_keyword_groups<P: AsRef<Path>>(path: P) -> Result<KeywordGroups> {
    let mut reader = reader(&path, false)?;
    let mut groups = Vec::new();
    for record in reader.records() {
        let record = record?;
        let Some(name) = cell(&record, 0) else {
            continue;
        };
        let keywords = record
            .iter()
            .skip(1)
            .flat_map(|field| field.split(','))
            .map(str::trim)
            .filter(|keyword| !keyword.is_empty())
            .map(str::to_string)
            .collect();
        groups.push(KeywordGroup::new(name.to_string(), keywords));
    }
    Ok(KeywordGroups::new(groups))
}

/// Reads the first column of a table with a header row as the genome order
pub fn read_reference_order<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let mut reader = reader(&path, true)?;
    let mut reference = Vec::new();
    for record in reader.records() {
        let record = record?;
        if let Some(locus) = cell(&record, 0) {
            reference.push(locus.to_string());
        }
    }
    Ok(reference)
}

/// Reads a table of groups, one column each, named by the header row
///
/// Empty cells are skipped, so columns of different lengths are allowed.
pub fn read_groups<P: AsRef<Path>>(path: P) -> Result<GroupMembership> {
    let (names, columns) = read_columns(&path)?;
    let mut membership = GroupMembership::new();
    for (name, members) in names.into_iter().zip(columns) {
        membership.insert(name, members)?;
    }
    Ok(membership)
}

/// Reads a cluster table whose first column is the genome order
///
/// Every further column is a group named by its header.
pub fn read_cluster_table<P: AsRef<Path>>(path: P) -> Result<(Vec<String>, GroupMembership)> {
    let (names, columns) = read_columns(&path)?;
    let mut columns = columns.into_iter();
    let reference = columns.next().unwrap_or_default();

    let mut membership = GroupMembership::new();
    for (name, members) in names.into_iter().skip(1).zip(columns) {
        membership.insert(name, members)?;
    }
    info!(
        "Read {} reference locus tags and {} groups from {}",
        reference.len(),
        membership.len(),
        path.as_ref().display()
    );
    Ok((reference, membership))
}

fn read_columns<P: AsRef<Path>>(path: P) -> Result<(Vec<String>, Vec<Vec<String>>)> {
    let mut reader = reader(&path, true)?;
    let names = reader
        .headers()?
        .iter()
        .map(|name| name.trim().to_string())
        .collect::<Vec<_>>();
    if names.is_empty() || names.iter().all(String::is_empty) {
        return Err(ClusterMapError::MissingColumn(
            path.as_ref().display().to_string(),
        ));
    }

    let mut columns = vec![Vec::new(); names.len()];
    for record in reader.records() {
        let record = record?;
        for (i, column) in columns.iter_mut().enumerate() {
            if let Some(value) = cell(&record, i) {
                column.push(value.to_string());
            }
        }
    }
    Ok((names, columns))
}

/// Writes one column per group, padding shorter columns with empty cells
pub fn write_cluster_table<P: AsRef<Path>>(path: P, membership: &GroupMembership) -> Result<()> {
    let mut writer = writer(&path)?;
    writer.write_record(membership.names())?;

    let depth = membership
        .iter()
        .map(|group| group.members.len())
        .max()
        .unwrap_or(0);
    for i in 0..depth {
        let row = membership
            .iter()
            .map(|group| group.members.get(i).map(String::as_str).unwrap_or(""));
        writer.write_record(row)?;
    }
    writer.flush()?;
    info!(
        "Wrote {} groups to {}",
        membership.len(),
        path.as_ref().display()
    );
    Ok(())
}

/// Writes one row per group: label, statistics, then the density profile
pub fn write_density_matrix<P: AsRef<Path>>(path: P, results: &DensityResults) -> Result<()> {
    let mut writer = writer(&path)?;

    let header = ["group", "label", "n", "statistic", "pvalue", "adjusted_pvalue"]
        .into_iter()
        .map(str::to_string)
        .chain((0..results.genome_length()).map(|p| p.to_string()));
    writer.write_record(header)?;

    for (i, density) in results.matrix.outer_iter().enumerate() {
        let significance = &results.significance[i];
        let row = [
            results.names[i].clone(),
            results.labels[i].clone(),
            significance.n_resolved.to_string(),
            significance.statistic.to_string(),
            significance.pvalue.to_string(),
            results.adjusted_pvalues[i].to_string(),
        ]
        .into_iter()
        .chain(density.iter().map(|x| x.to_string()));
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}
