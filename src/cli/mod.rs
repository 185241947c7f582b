//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `analyze`: 凸包稳定性分析
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: analyze

pub mod analyze;

use clap::{Parser, Subcommand};

/// phasehull - 热力学凸包稳定性分析工具
#[derive(Parser)]
#[command(name = "phasehull")]
#[command(version)]
#[command(about = "Convex-hull thermodynamic stability analysis for composition/energy tables", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// Analyze hull stability of a composition/energy table
    Analyze(analyze::AnalyzeArgs),
}
