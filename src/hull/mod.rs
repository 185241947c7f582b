//! # 下凸包模块
//!
//! 在成分单纯形 + 能量空间中构建条目集合的下凸包，并提供
//! 生成能与凸包距离查询。
//!
//! ## 依赖关系
//! - 被 `commands/analyze.rs` 调用
//! - 使用 `models/` 数据模型
//! - 子模块: builder, facet, diagram, plot

pub mod builder;
pub mod diagram;
pub mod facet;
pub mod plot;

pub use diagram::PhaseDiagram;
pub use facet::Facet;
