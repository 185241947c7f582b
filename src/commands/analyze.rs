//! # analyze 子命令实现
//!
//! 凸包稳定性分析主流程：读表 → 校验条目 → 构建相图 → 并行求值 →
//! 终端表格 + 增广 CSV + 可选相图图片。
//!
//! ## 功能
//! - 校验输入表格并构建冻结的条目集合
//! - 构建下凸包相图
//! - 对每个条目并行计算生成能与凸包距离
//! - 生成终端表格和 CSV 输出
//! - 二元/三元体系可选绘制相图
//!
//! ## 依赖关系
//! - 使用 `cli/analyze.rs` 定义的参数
//! - 使用 `parsers/table.rs`, `models/entry.rs`, `hull/`
//! - 使用 `utils/output.rs`, `utils/progress.rs`

use crate::cli::analyze::AnalyzeArgs;
use crate::error::{HullError, Result};
use crate::hull::{PhaseDiagram, plot};
use crate::models::EntrySet;
use crate::parsers::table;
use crate::utils::{output, progress};

use rayon::prelude::*;
use std::path::Path;
use tabled::{Table, Tabled};

/// 稳定判据：凸包距离小于该值视为位于凸包上 (eV/atom)
const STABLE_TOL: f64 = 1e-9;

/// 分析结果行
#[derive(Debug, Clone, Tabled)]
struct ResultRow {
    #[tabled(rename = "Rank")]
    rank: usize,
    #[tabled(rename = "Composition")]
    composition: String,
    #[tabled(rename = "E (eV/atom)")]
    energy: String,
    #[tabled(rename = "E_form (eV/atom)")]
    formation: String,
    #[tabled(rename = "ΔE_hull (eV/atom)")]
    distance: String,
    #[tabled(rename = "Stable")]
    stable: String,
}

/// 执行凸包分析
pub fn execute(args: AnalyzeArgs) -> Result<()> {
    output::print_header("Convex Hull Analysis");

    if let Some(ref plot_path) = args.plot {
        validate_plot_extension(plot_path)?;
    }

    // 读取并校验输入表格
    output::print_info(&format!("Reading '{}'...", args.table.display()));
    let energy_table = table::load_energy_table(&args.table)?;
    if energy_table.rows.is_empty() {
        return Err(HullError::Other(
            "input table contains no data rows".to_string(),
        ));
    }
    output::print_info(&format!("Loaded {} entries", energy_table.rows.len()));

    let table::EnergyTable { headers, rows, raw } = energy_table;

    // 构建条目集合与相图
    let spinner = progress::create_spinner("Building phase diagram");
    let entry_set = EntrySet::build(rows)?;
    let diagram = PhaseDiagram::build(entry_set)?;
    spinner.finish_and_clear();

    output::print_info(&format!(
        "Chemical system: {} ({} elements, {} hull facets)",
        diagram.elements().join("-"),
        diagram.n_elements(),
        diagram.facets().len()
    ));

    // 并行计算每个条目的生成能与凸包距离
    let num_threads = if args.jobs == 0 {
        num_cpus::get()
    } else {
        args.jobs
    };
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build()
        .map_err(|e| HullError::Other(format!("failed to build thread pool: {}", e)))?;

    let entries = diagram.entry_set().entries();
    let pb = progress::create_progress_bar(entries.len() as u64, "Evaluating");
    let results: Result<Vec<(f64, f64)>> = pool.install(|| {
        entries
            .par_iter()
            .map(|entry| {
                let formation = diagram.formation_energy(entry)?;
                let distance = diagram.energy_above_hull(entry)?;
                pb.inc(1);
                Ok((formation, distance))
            })
            .collect()
    });
    pb.finish_and_clear();
    let results = results?;

    let stable_count = results.iter().filter(|(_, d)| *d <= STABLE_TOL).count();
    output::print_info(&format!(
        "{} of {} entries lie on the hull",
        stable_count,
        results.len()
    ));

    // 终端表格：按凸包距离升序取 top-n
    let mut order: Vec<usize> = (0..results.len()).collect();
    order.sort_by(|&a, &b| {
        results[a]
            .1
            .partial_cmp(&results[b].1)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let table_rows: Vec<ResultRow> = order
        .iter()
        .take(args.top_n)
        .enumerate()
        .map(|(rank, &i)| {
            let entry = &entries[i];
            let (formation, distance) = results[i];
            ResultRow {
                rank: rank + 1,
                composition: match &entry.label {
                    Some(label) => format!("{} ({})", entry.composition.formula(), label),
                    None => entry.composition.formula().to_string(),
                },
                energy: format!("{:.6}", entry.energy_per_atom_ev),
                formation: format!("{:.6}", formation),
                distance: format!("{:.6}", distance),
                stable: if distance <= STABLE_TOL { "yes" } else { "" }.to_string(),
            }
        })
        .collect();

    output::print_header(&format!(
        "Top {} Entries by Distance to Hull",
        args.top_n.min(results.len())
    ));
    println!("{}", Table::new(&table_rows));

    // 保存增广 CSV：原始输入列原样回显 + 两个结果列
    table::save_results_csv(&headers, &raw, &results, &args.output)?;
    output::print_success(&format!(
        "Augmented table saved to '{}'",
        args.output.display()
    ));

    // 二元/三元体系绘制相图
    if let Some(ref plot_path) = args.plot {
        let n = diagram.n_elements();
        if n == 2 || n == 3 {
            plot::render_hull_plot(&diagram, plot_path, args.width, args.height)?;
            output::print_success(&format!(
                "Hull diagram saved to '{}'",
                plot_path.display()
            ));
        } else {
            output::print_warning(
                "Plotting supported only for binary/ternary systems. Skipping.",
            );
        }
    }

    Ok(())
}

/// 绘图输出仅支持 PNG 与 SVG（按扩展名选择后端）
fn validate_plot_extension(path: &Path) -> Result<()> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_lowercase())
        .unwrap_or_default();
    if matches!(ext.as_str(), "png" | "svg") {
        Ok(())
    } else {
        Err(HullError::InvalidArgument(format!(
            "unsupported plot format '{}': use .png or .svg",
            path.display()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_plot_extension_png_svg_accepted() {
        assert!(validate_plot_extension(&PathBuf::from("hull.png")).is_ok());
        assert!(validate_plot_extension(&PathBuf::from("hull.svg")).is_ok());
        assert!(validate_plot_extension(&PathBuf::from("hull.PNG")).is_ok());
    }

    #[test]
    fn test_plot_extension_other_rejected() {
        for name in ["hull.bmp", "hull.jpg", "hull.pdf", "hull"] {
            assert!(matches!(
                validate_plot_extension(&PathBuf::from(name)),
                Err(HullError::InvalidArgument(_))
            ));
        }
    }
}
