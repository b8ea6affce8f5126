use std::path::Path;
use std::str::FromStr;

use log::info;
use ndarray::{s, ArrayView1};
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::FontTransform;

use crate::{
    config::HeatmapStyle,
    errors::{ClusterMapError, Result},
    results::DensityResults,
};

const X_AXIS_LABEL: &str = "Genome Position (Ordered Locus Tags)";
const COLORBAR_LABEL: &str = "Relative Gene Density";
const COLORBAR_STEPS: u32 = 256;

/// Color scales for the density heatmap
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Colormap {
    #[default]
    Plasma,
    Viridis,
    YlGnBu,
    Greys,
}

impl Colormap {
    fn stops(&self) -> &'static [(u8, u8, u8)] {
        match self {
            Colormap::Plasma => &[
                (13, 8, 135),
                (126, 3, 168),
                (204, 71, 120),
                (248, 149, 64),
                (240, 249, 33),
            ],
            Colormap::Viridis => &[
                (68, 1, 84),
                (59, 82, 139),
                (33, 145, 140),
                (94, 201, 98),
                (253, 231, 37),
            ],
            Colormap::YlGnBu => &[
                (255, 255, 217),
                (199, 233, 180),
                (65, 182, 196),
                (34, 94, 168),
                (8, 29, 88),
            ],
            Colormap::Greys => &[(255, 255, 255), (0, 0, 0)],
        }
    }

    /// Color for a value in [0, 1], interpolated linearly between stops
    ///
    /// Values outside the interval are clamped; NaN maps to the low end.
    pub fn color(&self, value: f64) -> RGBColor {
        let stops = self.stops();
        let value = if value.is_nan() {
            0.0
        } else {
            value.clamp(0.0, 1.0)
        };
        let scaled = value * (stops.len() - 1) as f64;
        let lower = (scaled.floor() as usize).min(stops.len() - 2);
        let t = scaled - lower as f64;
        let (r0, g0, b0) = stops[lower];
        let (r1, g1, b1) = stops[lower + 1];
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        RGBColor(mix(r0, r1), mix(g0, g1), mix(b0, b1))
    }
}

impl FromStr for Colormap {
    type Err = ClusterMapError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "plasma" => Ok(Colormap::Plasma),
            "viridis" => Ok(Colormap::Viridis),
            "ylgnbu" => Ok(Colormap::YlGnBu),
            "greys" | "grays" => Ok(Colormap::Greys),
            _ => Err(ClusterMapError::UnknownColormap(s.to_string())),
        }
    }
}

fn render_error<E: std::fmt::Display>(e: E) -> ClusterMapError {
    ClusterMapError::Render(e.to_string())
}

/// Largest density among the genome positions covered by pixel column `px`
///
/// Every pixel covers at least one position, so narrow peaks survive when the
/// genome is wider than the image.
fn pixel_density(row: ArrayView1<f64>, px: u32, width: u32) -> f64 {
    let genome_length = row.len() as u64;
    let start = (px as u64 * genome_length / width as u64) as usize;
    let end = ((px as u64 + 1) * genome_length / width as u64) as usize;
    row.slice(s![start..end.max(start + 1)])
        .fold(0.0f64, |acc, &x| acc.max(x))
}

/// Draws the density matrix as a PNG heatmap
///
/// Groups run top to bottom in result order, each labelled on the left.
/// Genome positions run left to right; each pixel column shows the peak of the
/// positions it covers.
pub fn draw_heatmap<P: AsRef<Path>>(
    path: P,
    results: &DensityResults,
    style: &HeatmapStyle,
) -> Result<()> {
    let (width, height) = style.figure_size(results.len());
    let font_px = style.points_to_pixels(style.label_fontsize).max(1);
    let title_px = style.points_to_pixels(style.label_fontsize * 1.2).max(1);
    let pad = font_px as i32 / 2;

    let root = BitMapBackend::new(path.as_ref(), (width, height)).into_drawing_area();
    root.fill(&WHITE).map_err(render_error)?;
    let root = root
        .titled(&style.title, ("sans-serif", title_px).into_font())
        .map_err(render_error)?;

    let (_, area_height) = root.dim_in_pixel();
    let (body, x_axis) = root.split_vertically(area_height.saturating_sub(font_px * 3));

    let longest = results
        .labels
        .iter()
        .map(|label| label.chars().count())
        .max()
        .unwrap_or(0) as u32;
    let label_width = longest * font_px * 6 / 10 + font_px;
    let colorbar_width = (width / 10).max(font_px * 6);
    let (labels_area, rest) = body.split_horizontally(label_width);
    let (rest_width, _) = rest.dim_in_pixel();
    let (heat_area, colorbar_area) =
        rest.split_horizontally(rest_width.saturating_sub(colorbar_width));

    let (heat_width, heat_height) = heat_area.dim_in_pixel();
    let n_rows = results.len();
    let row_top = |i: usize| (i as u64 * heat_height as u64 / n_rows.max(1) as u64) as i32;

    // cells
    let genome_length = results.genome_length();
    if genome_length > 0 && heat_width > 0 {
        for (i, row) in results.matrix.outer_iter().enumerate() {
            let (top, bottom) = (row_top(i), row_top(i + 1));
            for px in 0..heat_width {
                let color = style.colormap.color(pixel_density(row, px, heat_width));
                heat_area
                    .draw(&Rectangle::new(
                        [(px as i32, top), (px as i32 + 1, bottom)],
                        color.filled(),
                    ))
                    .map_err(render_error)?;
            }
        }
    }
    heat_area
        .draw(&Rectangle::new(
            [(0, 0), (heat_width as i32 - 1, heat_height as i32 - 1)],
            BLACK.stroke_width(1),
        ))
        .map_err(render_error)?;

    // row labels
    let label_style = TextStyle::from(("sans-serif", font_px).into_font())
        .pos(Pos::new(HPos::Right, VPos::Center));
    for (i, label) in results.labels.iter().enumerate() {
        let center = (row_top(i) + row_top(i + 1)) / 2;
        labels_area
            .draw(&Text::new(
                label.clone(),
                (label_width as i32 - pad, center),
                label_style.clone(),
            ))
            .map_err(render_error)?;
    }

    // x axis caption
    let (_, x_axis_height) = x_axis.dim_in_pixel();
    let caption_style = TextStyle::from(("sans-serif", font_px).into_font())
        .pos(Pos::new(HPos::Center, VPos::Center));
    x_axis
        .draw(&Text::new(
            X_AXIS_LABEL,
            (
                label_width as i32 + heat_width as i32 / 2,
                x_axis_height as i32 / 2,
            ),
            caption_style,
        ))
        .map_err(render_error)?;

    draw_colorbar(&colorbar_area, style, font_px, heat_height)?;

    root.present().map_err(render_error)?;
    info!(
        "Rendered {} groups x {} positions to {}",
        n_rows,
        genome_length,
        path.as_ref().display()
    );
    Ok(())
}

fn draw_colorbar<DB: DrawingBackend>(
    area: &DrawingArea<DB, plotters::coord::Shift>,
    style: &HeatmapStyle,
    font_px: u32,
    bar_height: u32,
) -> Result<()> {
    let pad = font_px as i32;
    let bar_width = (font_px as i32).max(4);
    let (left, right) = (pad, pad + bar_width);
    let bar_height = bar_height as i32;
    if bar_height <= 1 {
        return Ok(());
    }

    for step in 0..COLORBAR_STEPS {
        let top = bar_height - ((step + 1) as i32 * bar_height) / COLORBAR_STEPS as i32;
        let bottom = bar_height - (step as i32 * bar_height) / COLORBAR_STEPS as i32;
        let value = (step as f64 + 0.5) / COLORBAR_STEPS as f64;
        area.draw(&Rectangle::new(
            [(left, top), (right, bottom)],
            style.colormap.color(value).filled(),
        ))
        .map_err(render_error)?;
    }
    area.draw(&Rectangle::new(
        [(left, 0), (right, bar_height - 1)],
        BLACK.stroke_width(1),
    ))
    .map_err(render_error)?;

    let tick_style = TextStyle::from(("sans-serif", font_px).into_font())
        .pos(Pos::new(HPos::Left, VPos::Center));
    for tick in 0..=5 {
        let value = tick as f64 / 5.0;
        let y = ((1.0 - value) * (bar_height - 1) as f64).round() as i32;
        area.draw(&PathElement::new(
            vec![(right, y), (right + pad / 2, y)],
            BLACK.stroke_width(1),
        ))
        .map_err(render_error)?;
        area.draw(&Text::new(
            format!("{:.1}", value),
            (right + pad, y),
            tick_style.clone(),
        ))
        .map_err(render_error)?;
    }

    let caption_style = TextStyle::from(
        ("sans-serif", font_px)
            .into_font()
            .transform(FontTransform::Rotate90),
    )
    .pos(Pos::new(HPos::Center, VPos::Center));
    area.draw(&Text::new(
        COLORBAR_LABEL,
        (right + pad * 4, bar_height / 2),
        caption_style,
    ))
    .map_err(render_error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DensityConfig;
    use crate::engine::render_heatmap;
    use crate::membership::GroupMembership;
    use ndarray::Array1;

    fn genome(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("g{}", i)).collect()
    }

    fn small_style() -> HeatmapStyle {
        HeatmapStyle::builder().dpi(50).build()
    }

    fn assert_png_written(path: &Path) {
        let metadata = std::fs::metadata(path).unwrap();
        assert!(metadata.len() > 0);
        let bytes = std::fs::read(path).unwrap();
        assert_eq!(&bytes[..4], b"\x89PNG");
    }

    #[test]
    fn test_draw_heatmap() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("heatmap.png");
        let mut membership = GroupMembership::new();
        membership
            .insert("Motility", vec!["g3".into(), "g4".into(), "g150".into()])
            .unwrap();
        membership.insert("Phages", vec!["g199".into()]).unwrap();
        membership.insert("Unresolved", vec!["missing".into()]).unwrap();
        let results = render_heatmap(&genome(200), &membership, DensityConfig::default()).unwrap();

        draw_heatmap(&path, &results, &small_style()).unwrap();
        assert_png_written(&path);
    }

    #[test]
    fn test_draw_heatmap_empty_genome() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty_genome.png");
        let mut membership = GroupMembership::new();
        membership.insert("LPS", vec!["g1".into()]).unwrap();
        membership.insert("Pili", vec![]).unwrap();
        let results = render_heatmap(&[], &membership, DensityConfig::default()).unwrap();
        assert_eq!(results.genome_length(), 0);

        draw_heatmap(&path, &results, &small_style()).unwrap();
        assert_png_written(&path);
    }

    #[test]
    fn test_draw_heatmap_no_groups() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no_groups.png");
        let results =
            render_heatmap(&genome(200), &GroupMembership::new(), DensityConfig::default())
                .unwrap();
        assert!(results.is_empty());

        draw_heatmap(&path, &results, &small_style()).unwrap();
        assert_png_written(&path);
    }

    #[test]
    fn test_pixel_density_keeps_narrow_peaks() {
        let mut row = Array1::<f64>::zeros(1000);
        row[7] = 1.0;
        // 10 positions per pixel; position 7 is never the first one sampled
        assert_eq!(pixel_density(row.view(), 0, 100), 1.0);
        assert_eq!(pixel_density(row.view(), 1, 100), 0.0);
        assert_eq!(pixel_density(row.view(), 99, 100), 0.0);
    }

    #[test]
    fn test_pixel_density_narrow_genome() {
        let row = Array1::from(vec![0.2, 0.9, 0.4]);
        // fewer positions than pixels: each pixel shows a single position
        let values = (0..6)
            .map(|px| pixel_density(row.view(), px, 6))
            .collect::<Vec<_>>();
        assert_eq!(values, vec![0.2, 0.2, 0.9, 0.9, 0.4, 0.4]);
    }

    #[test]
    fn test_colormap_endpoints() {
        assert_eq!(Colormap::Plasma.color(0.0), RGBColor(13, 8, 135));
        assert_eq!(Colormap::Plasma.color(1.0), RGBColor(240, 249, 33));
        assert_eq!(Colormap::Greys.color(0.0), RGBColor(255, 255, 255));
        assert_eq!(Colormap::Greys.color(1.0), RGBColor(0, 0, 0));
    }

    #[test]
    fn test_colormap_interpolates() {
        assert_eq!(Colormap::Greys.color(0.5), RGBColor(128, 128, 128));
        assert_eq!(Colormap::Viridis.color(0.5), RGBColor(33, 145, 140));
    }

    #[test]
    fn test_colormap_clamps() {
        assert_eq!(Colormap::YlGnBu.color(-1.0), Colormap::YlGnBu.color(0.0));
        assert_eq!(Colormap::YlGnBu.color(2.0), Colormap::YlGnBu.color(1.0));
        assert_eq!(Colormap::Plasma.color(f64::NAN), Colormap::Plasma.color(0.0));
    }

    #[test]
    fn test_colormap_from_str() {
        assert_eq!("Plasma".parse::<Colormap>().unwrap(), Colormap::Plasma);
        assert_eq!("YlGnBu".parse::<Colormap>().unwrap(), Colormap::YlGnBu);
        assert!(matches!(
            "jet".parse::<Colormap>(),
            Err(ClusterMapError::UnknownColormap(_))
        ));
    }
}
