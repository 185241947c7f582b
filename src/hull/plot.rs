//! # 凸包相图绘制
//!
//! 使用 `plotters` 库绘制二元/三元体系的凸包相图。
//!
//! ## 功能
//! - 二元体系：生成能 vs 摩尔分数，凸包折线 + 全部条目散点
//! - 三元体系：Gibbs 三角投影，面元棱边 + 全部条目散点
//! - 支持 PNG 和 SVG 输出（按扩展名选择）
//!
//! 其他元素数的体系不支持绘图，由调用方跳过。
//!
//! ## 依赖关系
//! - 被 `commands/analyze.rs` 调用
//! - 使用 `hull/diagram.rs` 的 PhaseDiagram
//! - 使用 `plotters` 渲染图表

use crate::error::{HullError, Result};
use crate::hull::PhaseDiagram;

use plotters::coord::Shift;
use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;
use std::path::Path;

/// 散点条目：投影坐标 + 是否为凸包顶点
struct PlotPoint {
    x: f64,
    y: f64,
    stable: bool,
}

/// 绘制凸包相图（仅二元/三元体系）
pub fn render_hull_plot(
    diagram: &PhaseDiagram,
    output_path: &Path,
    width: u32,
    height: u32,
) -> Result<()> {
    let use_svg = output_path
        .extension()
        .and_then(|e| e.to_str())
        .map(|s| s.eq_ignore_ascii_case("svg"))
        .unwrap_or(false);

    if use_svg {
        let root = SVGBackend::new(output_path, (width, height)).into_drawing_area();
        draw_hull_chart(&root, diagram)?;
        root.present()
            .map_err(|e| HullError::PlotError(e.to_string()))?;
    } else {
        let root = BitMapBackend::new(output_path, (width, height)).into_drawing_area();
        draw_hull_chart(&root, diagram)?;
        root.present()
            .map_err(|e| HullError::PlotError(e.to_string()))?;
    }
    Ok(())
}

/// 按体系元素数分派图表类型
fn draw_hull_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    diagram: &PhaseDiagram,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    match diagram.n_elements() {
        2 => draw_binary_chart(root, diagram),
        3 => draw_ternary_chart(root, diagram),
        n => Err(HullError::PlotError(format!(
            "hull diagrams are only supported for binary/ternary systems (got {} elements)",
            n
        ))),
    }
}

/// 二元体系：生成能 vs 第二元素摩尔分数
fn draw_binary_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    diagram: &PhaseDiagram,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)
        .map_err(|e| HullError::PlotError(format!("{:?}", e)))?;

    let elements = diagram.elements();
    let stable = diagram.stable_indices();

    let mut points = Vec::new();
    for (i, entry) in diagram.entries().iter().enumerate() {
        points.push(PlotPoint {
            x: entry.composition.fraction(&elements[1]),
            y: diagram.formation_energy(entry)?,
            stable: stable.contains(&i),
        });
    }

    // 凸包折线：稳定顶点按摩尔分数排序
    let mut hull_line: Vec<(f64, f64)> = Vec::new();
    for &i in &stable {
        let entry = &diagram.entries()[i];
        hull_line.push((
            entry.composition.fraction(&elements[1]),
            diagram.formation_energy(entry)?,
        ));
    }
    hull_line.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

    let y_min = points.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
    let y_max = points.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);
    let y_margin = ((y_max - y_min).abs() * 0.1).max(0.05);

    let mut chart = ChartBuilder::on(root)
        .caption(
            format!("{}-{} convex hull", elements[0], elements[1]),
            ("sans-serif", 28),
        )
        .margin(20)
        .x_label_area_size(45)
        .y_label_area_size(60)
        .build_cartesian_2d(-0.02f64..1.02f64, (y_min - y_margin)..(y_max + y_margin))
        .map_err(|e| HullError::PlotError(format!("{:?}", e)))?;

    chart
        .configure_mesh()
        .x_desc(format!("x({})", elements[1]))
        .y_desc("Formation energy (eV/atom)")
        .draw()
        .map_err(|e| HullError::PlotError(format!("{:?}", e)))?;

    chart
        .draw_series(LineSeries::new(hull_line.iter().copied(), &BLUE))
        .map_err(|e| HullError::PlotError(format!("{:?}", e)))?;

    draw_entry_points(&mut chart, &points)?;

    Ok(())
}

/// 三元体系：Gibbs 三角投影，面元棱边 + 条目散点
fn draw_ternary_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    diagram: &PhaseDiagram,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)
        .map_err(|e| HullError::PlotError(format!("{:?}", e)))?;

    let elements = diagram.elements();
    let stable = diagram.stable_indices();

    // 三角投影: (a, b, c) -> (b + c/2, c·√3/2)，a/b/c 为三元素分数
    let project = |entry: &crate::models::Entry| {
        let b = entry.composition.fraction(&elements[1]);
        let c = entry.composition.fraction(&elements[2]);
        (b + 0.5 * c, c * 3f64.sqrt() / 2.0)
    };

    let points: Vec<PlotPoint> = diagram
        .entries()
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let (x, y) = project(entry);
            PlotPoint {
                x,
                y,
                stable: stable.contains(&i),
            }
        })
        .collect();

    let mut chart = ChartBuilder::on(root)
        .caption(
            format!(
                "{}-{}-{} phase diagram",
                elements[0], elements[1], elements[2]
            ),
            ("sans-serif", 28),
        )
        .margin(20)
        .build_cartesian_2d(-0.08f64..1.08f64, -0.08f64..0.95f64)
        .map_err(|e| HullError::PlotError(format!("{:?}", e)))?;

    // 单纯形边界
    let corners = [(0.0, 0.0), (1.0, 0.0), (0.5, 3f64.sqrt() / 2.0), (0.0, 0.0)];
    chart
        .draw_series(LineSeries::new(corners.iter().copied(), BLACK.stroke_width(2)))
        .map_err(|e| HullError::PlotError(format!("{:?}", e)))?;

    // 顶点标注元素符号
    let labels = [
        ((0.0 - 0.05, 0.0 - 0.04), elements[0].clone()),
        ((1.0 + 0.01, 0.0 - 0.04), elements[1].clone()),
        ((0.5 - 0.01, 3f64.sqrt() / 2.0 + 0.02), elements[2].clone()),
    ];
    chart
        .draw_series(labels.iter().map(|((x, y), text)| {
            Text::new(text.clone(), (*x, *y), ("sans-serif", 20))
        }))
        .map_err(|e| HullError::PlotError(format!("{:?}", e)))?;

    // 面元棱边
    for facet in diagram.facets() {
        let verts = facet.vertices();
        for i in 0..verts.len() {
            for j in i + 1..verts.len() {
                let p1 = project(&diagram.entries()[verts[i]]);
                let p2 = project(&diagram.entries()[verts[j]]);
                chart
                    .draw_series(LineSeries::new([p1, p2], &BLUE))
                    .map_err(|e| HullError::PlotError(format!("{:?}", e)))?;
            }
        }
    }

    draw_entry_points(&mut chart, &points)?;

    Ok(())
}

/// 条目散点：稳定顶点实心红点，其余灰点
fn draw_entry_points<DB: DrawingBackend>(
    chart: &mut ChartContext<'_, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>,
    points: &[PlotPoint],
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    chart
        .draw_series(
            points
                .iter()
                .filter(|p| !p.stable)
                .map(|p| Circle::new((p.x, p.y), 3, RGBColor(120, 120, 120).filled())),
        )
        .map_err(|e| HullError::PlotError(format!("{:?}", e)))?;

    chart
        .draw_series(
            points
                .iter()
                .filter(|p| p.stable)
                .map(|p| Circle::new((p.x, p.y), 5, RED.filled())),
        )
        .map_err(|e| HullError::PlotError(format!("{:?}", e)))?;

    Ok(())
}
