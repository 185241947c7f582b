//! # 统一错误处理模块
//!
//! 定义 phasehull 的所有错误类型，使用 `thiserror` 派生。
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use thiserror::Error;

/// phasehull 统一错误类型
#[derive(Error, Debug)]
pub enum HullError {
    // ─────────────────────────────────────────────────────────────
    // I/O 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to write file: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ─────────────────────────────────────────────────────────────
    // 输入表格错误
    // ─────────────────────────────────────────────────────────────
    #[error("Input table is missing required column: '{column}'")]
    MissingColumn { column: String },

    #[error("Malformed composition '{formula}' at data row {row}: {reason}")]
    MalformedComposition {
        formula: String,
        row: usize,
        reason: String,
    },

    #[error("Invalid energy value '{value}' at data row {row}: energy_per_atom_eV must be a finite number")]
    InvalidEnergy { value: String, row: usize },

    // ─────────────────────────────────────────────────────────────
    // 化学体系结构性错误
    // ─────────────────────────────────────────────────────────────
    #[error(
        "No pure-element entry for '{element}': every element in the system needs \
         an elemental reference to define the formation-energy scale"
    )]
    MissingElementalReference { element: String },

    #[error(
        "Degenerate chemical system: need {needed} affinely independent compositions \
         to span the simplex, found {found}"
    )]
    DegenerateSystem { needed: usize, found: usize },

    #[error(
        "Composition contains element '{element}' outside the phase diagram's element set; \
         rebuild the diagram with an extended element set"
    )]
    CompositionOutsideSystem { element: String },

    #[error("Hull invariant violated for composition '{composition}': {detail}")]
    HullInvariant { composition: String, detail: String },

    // ─────────────────────────────────────────────────────────────
    // 参数错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // ─────────────────────────────────────────────────────────────
    // CSV 错误
    // ─────────────────────────────────────────────────────────────
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    // ─────────────────────────────────────────────────────────────
    // 其他
    // ─────────────────────────────────────────────────────────────
    #[error("Plotting failed: {0}")]
    PlotError(String),

    #[error("{0}")]
    Other(String),
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, HullError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hull_invariant_message_names_composition() {
        let err = HullError::HullInvariant {
            composition: "NaCl".to_string(),
            detail: "no facet contains the composition".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("NaCl"));
        assert!(msg.contains("no facet contains"));
    }
}
