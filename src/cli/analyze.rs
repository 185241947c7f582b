//! # analyze 子命令 CLI 定义
//!
//! 凸包稳定性分析入口参数。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/analyze.rs`

use clap::Args;
use std::path::PathBuf;

/// analyze 子命令参数
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Input CSV with columns: composition, energy_per_atom_eV, [label]
    pub table: PathBuf,

    /// Output CSV path for the augmented table
    #[arg(short, long, default_value = "hull_results.csv")]
    pub output: PathBuf,

    /// Optional image path for the hull diagram (binary/ternary systems only; .png or .svg)
    #[arg(short, long)]
    pub plot: Option<PathBuf>,

    /// Number of entries to show in the terminal summary table
    #[arg(long, default_value_t = 10)]
    pub top_n: usize,

    /// Number of parallel jobs for distance evaluation (0 = auto)
    #[arg(short, long, default_value_t = 0)]
    pub jobs: usize,

    /// Figure width in pixels (for PNG) or points (for SVG)
    #[arg(long, default_value_t = 1200)]
    pub width: u32,

    /// Figure height in pixels (for PNG) or points (for SVG)
    #[arg(long, default_value_t = 800)]
    pub height: u32,
}
