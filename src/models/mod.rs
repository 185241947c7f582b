//! # 数据模型模块
//!
//! 定义成分、条目等核心数据模型。
//!
//! ## 依赖关系
//! - 被 `parsers/`, `hull/`, `commands/` 使用
//! - 子模块: elements, composition, entry

pub mod composition;
pub mod elements;
pub mod entry;

pub use composition::Composition;
pub use entry::{Entry, EntryRow, EntrySet};
