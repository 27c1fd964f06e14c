use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
use log::{debug, warn};
use plotters::prelude::LineSeries;
use plotters::prelude::*;
use crate::drivers::controller::{ChartFrame, ChartKind, Renderer};
use crate::drivers::error::DashboardError;
use crate::drivers::spectrum::label_frequency;
#[derive(Clone, Debug)]
pub struct PlotStyle {
    pub width: u32,
    pub height: u32,
    pub background: RGBColor,
}
impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            width: 900,
            height: 400,
            background: RGBColor(10, 10, 10),
        }
    }
}
fn chart_color(kind: ChartKind) -> RGBColor {
    match kind {
        ChartKind::Cardiogram => RGBColor(0, 123, 255),
        ChartKind::Spo2 => RGBColor(255, 0, 0),
        ChartKind::Frequencies => RGBColor(0, 255, 0),
    }
}
fn chart_title(kind: ChartKind) -> &'static str {
    match kind {
        ChartKind::Cardiogram => "Cardiogram",
        ChartKind::Spo2 => "Blood oxygen saturation",
        ChartKind::Frequencies => "Harmonic amplitude",
    }
}
pub fn render_chart_png(frame: &ChartFrame<'_>, style: &PlotStyle) -> Result<Vec<u8>, DashboardError> {
    let points = frame.display_points();
    let kind = frame.kind();
    let mut buffer = vec![0u8; (style.width * style.height * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (style.width, style.height))
            .into_drawing_area();
        root.fill(&style.background)?;
        let color = chart_color(kind);
        let x_min = points.first().map(|p| p[0]).unwrap_or(0.0);
        let x_max = points.last().map(|p| p[0]).unwrap_or(1.0);
        let x_bounds = if x_max - x_min < f64::EPSILON {
            (x_min - 0.5, x_min + 0.5)
        } else {
            (x_min, x_max)
        };
        match kind {
            ChartKind::Cardiogram | ChartKind::Spo2 => {
                let y_min = points.iter().map(|p| p[1]).fold(f64::INFINITY, f64::min);
                let y_max = points.iter().map(|p| p[1]).fold(f64::NEG_INFINITY, f64::max);
                let y_bounds = if !y_min.is_finite() || (y_max - y_min).abs() < f64::EPSILON {
                    let mid = if y_min.is_finite() { y_min } else { 0.0 };
                    (mid - 50.0, mid + 50.0)
                } else {
                    let pad = (y_max - y_min) * 0.1;
                    (y_min - pad, y_max + pad)
                };
                let mut chart = ChartBuilder::on(&root)
                    .margin(10)
                    .caption(chart_title(kind), ("sans-serif", 20).into_font().color(&WHITE))
                    .set_label_area_size(LabelAreaPosition::Left, 60)
                    .set_label_area_size(LabelAreaPosition::Bottom, 40)
                    .build_cartesian_2d(x_bounds.0..x_bounds.1, y_bounds.0..y_bounds.1)?;
                chart
                    .configure_mesh()
                    .light_line_style(&WHITE.mix(0.1))
                    .x_desc("Time [s]")
                    .label_style(("sans-serif", 12).into_font().color(&WHITE))
                    .draw()?;
                chart.draw_series(LineSeries::new(points.iter().map(|p| (p[0], p[1])), &color))?;
            }
            ChartKind::Frequencies => {
                let spacing = if points.len() > 1 {
                    (x_bounds.1 - x_bounds.0) / (points.len() - 1) as f64
                } else {
                    1.0
                };
                let half = spacing * 0.4;
                let mut chart = ChartBuilder::on(&root)
                    .margin(10)
                    .caption(chart_title(kind), ("sans-serif", 20).into_font().color(&WHITE))
                    .set_label_area_size(LabelAreaPosition::Left, 60)
                    .set_label_area_size(LabelAreaPosition::Bottom, 40)
                    .build_cartesian_2d(
                        (x_bounds.0 - spacing / 2.0)..(x_bounds.1 + spacing / 2.0),
                        0f64..1.05f64,
                    )?;
                chart
                    .configure_mesh()
                    .light_line_style(&WHITE.mix(0.1))
                    .x_label_formatter(&|hz| label_frequency(*hz))
                    .y_desc("Normalized amplitude")
                    .label_style(("sans-serif", 12).into_font().color(&WHITE))
                    .draw()?;
                chart.draw_series(points.iter().map(|p| {
                    Rectangle::new([(p[0] - half, 0.0), (p[0] + half, p[1])], color.mix(0.5).filled())
                }))?;
            }
        }
        root.present()?;
    }
    encode_png(&buffer, style.width, style.height)
}
fn encode_png(buffer: &[u8], width: u32, height: u32) -> Result<Vec<u8>, DashboardError> {
    let image = ImageBuffer::<Rgb<u8>, _>::from_raw(width, height, buffer.to_vec())
        .ok_or_else(|| DashboardError::Plot("failed to allocate image buffer".into()))?;
    let mut output = Vec::new();
    let dynamic = DynamicImage::ImageRgb8(image);
    dynamic.write_to(&mut Cursor::new(&mut output), ImageFormat::Png)?;
    Ok(output)
}
/// Headless renderer: every redraw overwrites `<dir>/<chart>.png`.
pub struct PngRenderer {
    dir: PathBuf,
    style: PlotStyle,
    written: u64,
}
impl PngRenderer {
    pub fn new(dir: impl AsRef<Path>, style: PlotStyle) -> Result<Self, DashboardError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            style,
            written: 0,
        })
    }
    pub fn path_for(&self, kind: ChartKind) -> PathBuf {
        self.dir.join(format!("{}.png", kind.id()))
    }
    pub fn written(&self) -> u64 {
        self.written
    }
    fn write(&self, frame: &ChartFrame<'_>) -> Result<PathBuf, DashboardError> {
        let png = render_chart_png(frame, &self.style)?;
        let path = self.path_for(frame.kind());
        fs::write(&path, png)?;
        Ok(path)
    }
}
impl Renderer for PngRenderer {
    fn update(&mut self, frame: ChartFrame<'_>) {
        match self.write(&frame) {
            Ok(path) => {
                self.written += 1;
                debug!("wrote {}", path.display());
            }
            Err(err) => warn!("could not redraw {}: {err}", frame.kind().id()),
        }
    }
}
