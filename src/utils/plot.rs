//! # 收敛曲线绘图
//!
//! 使用 `plotters` 绘制 DFT 网格间距与能量的关系，
//! 输出文件扩展名为 `.svg` 时生成 SVG，否则生成 PNG。
//!
//! ## 依赖关系
//! - 被 `workflows/dft_precise.rs` 调用

use crate::error::{Result, TurboflowError};

use plotters::prelude::*;
use std::path::Path;

const WIDTH: u32 = 1000;
const HEIGHT: u32 = 700;

/// 绘制 (网格间距, 能量) 曲线
pub fn plot_density_convergence(data: &[(f64, f64)], output_path: &Path, title: &str) -> Result<()> {
    if data.is_empty() {
        return Err(TurboflowError::InvalidArgument(
            "no convergence points to plot".to_string(),
        ));
    }

    let use_svg = output_path
        .extension()
        .map(|e| e.eq_ignore_ascii_case("svg"))
        .unwrap_or(false);

    if use_svg {
        let root = SVGBackend::new(output_path, (WIDTH, HEIGHT)).into_drawing_area();
        draw_convergence(&root, data, title)?;
        root.present()
            .map_err(|e| TurboflowError::Other(e.to_string()))?;
    } else {
        let root = BitMapBackend::new(output_path, (WIDTH, HEIGHT)).into_drawing_area();
        draw_convergence(&root, data, title)?;
        root.present()
            .map_err(|e| TurboflowError::Other(e.to_string()))?;
    }
    tracing::info!(path = %output_path.display(), "convergence plot written");
    Ok(())
}

/// 坐标范围，两端各留 5% 余量
fn padded_range(values: impl Iterator<Item = f64> + Clone) -> (f64, f64) {
    let min = values.clone().fold(f64::INFINITY, f64::min);
    let max = values.fold(f64::NEG_INFINITY, f64::max);
    let pad = if max > min { (max - min) * 0.05 } else { min.abs().max(1e-3) * 0.05 };
    (min - pad, max + pad)
}

fn draw_convergence<DB: DrawingBackend>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    data: &[(f64, f64)],
    title: &str,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)
        .map_err(|e| TurboflowError::Other(format!("{:?}", e)))?;

    let (x_min, x_max) = padded_range(data.iter().map(|(x, _)| *x));
    let (y_min, y_max) = padded_range(data.iter().map(|(_, y)| *y));

    let mut chart = ChartBuilder::on(root)
        .caption(title, ("sans-serif", 28).into_font())
        .margin(30)
        .x_label_area_size(50)
        .y_label_area_size(90)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)
        .map_err(|e| TurboflowError::Other(format!("{:?}", e)))?;

    chart
        .configure_mesh()
        .x_desc("Grid spacing (Bohr)")
        .y_desc("Energy (Ha)")
        .x_label_style(("sans-serif", 16))
        .y_label_style(("sans-serif", 16))
        .axis_desc_style(("sans-serif", 18))
        .y_label_formatter(&|y| format!("{:.5}", y))
        .draw()
        .map_err(|e| TurboflowError::Other(format!("{:?}", e)))?;

    let mut points = data.to_vec();
    points.sort_by(|a, b| a.0.total_cmp(&b.0));

    let line_color = RGBColor(0, 102, 204);
    chart
        .draw_series(LineSeries::new(
            points.iter().copied(),
            line_color.stroke_width(2),
        ))
        .map_err(|e| TurboflowError::Other(format!("{:?}", e)))?;

    chart
        .draw_series(
            points
                .iter()
                .map(|&(x, y)| Circle::new((x, y), 5, line_color.filled())),
        )
        .map_err(|e| TurboflowError::Other(format!("{:?}", e)))?;

    Ok(())
}
