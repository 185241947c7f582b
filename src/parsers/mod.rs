//! # 解析器模块
//!
//! 提供能量表格 (CSV) 的读取与写出。
//!
//! ## 依赖关系
//! - 被 `commands/` 模块使用
//! - 使用 `models/` 数据模型
//! - 子模块: table

pub mod table;
