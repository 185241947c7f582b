//! # phasehull - 热力学凸包稳定性分析工具
//!
//! 输入成分/能量表格 (CSV)，计算每个条目的生成能与到凸包的距离，
//! 判定哪些成分热力学稳定（位于能量-成分空间的下凸包上）。
//!
//! ## 子命令
//! - `analyze` - 凸包稳定性分析（表格输出 + 可选二元/三元相图）
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   │     ├── parsers/   (表格解析/写出)
//!   │     ├── models/    (成分与条目数据模型)
//!   │     └── hull/      (下凸包构建与稳定性查询)
//!   ├── utils/      (工具函数)
//!   └── error.rs    (错误处理)
//! ```

mod cli;
mod commands;
mod error;
mod hull;
mod models;
mod parsers;
mod utils;

use clap::Parser;
use cli::Cli;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();

    if let Err(e) = commands::run(cli.command) {
        utils::output::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}
