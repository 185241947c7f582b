//! # 能量表格解析器
//!
//! 读取与写出成分/能量 CSV 表格。
//!
//! ## 输入格式
//! ```text
//! composition,energy_per_atom_eV[,label]
//! Li,0.0
//! Li2O,-2.1,ground-state
//! ```
//!
//! 输出表格原样保留全部输入列与原始字段值（含额外列），在其后追加
//! `formation_energy_per_atom_eV` 与 `distance_to_hull_eV` 两列，
//! 列名固定以保证下游兼容。
//!
//! ## 依赖关系
//! - 被 `commands/analyze.rs` 使用
//! - 使用 `models/entry.rs` 的 EntryRow
//! - 使用 `csv` 库读写 CSV 文件

use crate::error::{HullError, Result};
use crate::models::EntryRow;

use std::io::Read;
use std::path::Path;

/// 必需列名
const COL_COMPOSITION: &str = "composition";
const COL_ENERGY: &str = "energy_per_atom_eV";
/// 可选列名
const COL_LABEL: &str = "label";
/// 输出追加列名（下游兼容，不可改动）
const COL_FORMATION: &str = "formation_energy_per_atom_eV";
const COL_DISTANCE: &str = "distance_to_hull_eV";

/// 读入的能量表格
#[derive(Debug, Clone)]
pub struct EnergyTable {
    /// 输入表头（原始列名，按输入顺序）
    pub headers: Vec<String>,
    /// 解析后的行（按输入顺序，行号 1 起）
    pub rows: Vec<EntryRow>,
    /// 原始字段值（与 rows 一一对应，写出时原样回显）
    pub raw: Vec<Vec<String>>,
}

/// 从文件读取能量表格
pub fn load_energy_table(path: &Path) -> Result<EnergyTable> {
    if !path.exists() {
        return Err(HullError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    let mut reader = csv::Reader::from_path(path)?;
    parse_energy_table(&mut reader)
}

/// 从任意 reader 解析能量表格（测试入口）
pub fn parse_energy_table<R: Read>(reader: &mut csv::Reader<R>) -> Result<EnergyTable> {
    let headers = reader.headers()?.clone();
    let find = |name: &str| headers.iter().position(|h| h.trim() == name);

    let col_comp = find(COL_COMPOSITION).ok_or_else(|| HullError::MissingColumn {
        column: COL_COMPOSITION.to_string(),
    })?;
    let col_energy = find(COL_ENERGY).ok_or_else(|| HullError::MissingColumn {
        column: COL_ENERGY.to_string(),
    })?;
    let col_label = find(COL_LABEL);

    let mut rows = Vec::new();
    let mut raw = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record?;
        let row = i + 1;

        let formula = record.get(col_comp).unwrap_or("").trim().to_string();

        let energy_str = record.get(col_energy).unwrap_or("").trim();
        let energy = energy_str
            .parse::<f64>()
            .map_err(|_| HullError::InvalidEnergy {
                value: energy_str.to_string(),
                row,
            })?;

        let label = col_label
            .and_then(|c| record.get(c))
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string());

        rows.push(EntryRow {
            formula,
            energy_per_atom_ev: energy,
            label,
            row,
        });
        raw.push(record.iter().map(String::from).collect());
    }

    Ok(EnergyTable {
        headers: headers.iter().map(String::from).collect(),
        rows,
        raw,
    })
}

/// 写出增广表格：原始输入列（字段原样回显）+ 生成能 + 凸包距离
pub fn save_results_csv(
    headers: &[String],
    raw_rows: &[Vec<String>],
    results: &[(f64, f64)],
    output_path: &Path,
) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path).map_err(HullError::CsvError)?;

    let mut header: Vec<&str> = headers.iter().map(|s| s.as_str()).collect();
    header.push(COL_FORMATION);
    header.push(COL_DISTANCE);
    wtr.write_record(&header).map_err(HullError::CsvError)?;

    for (fields, (formation, distance)) in raw_rows.iter().zip(results.iter()) {
        let mut record = fields.clone();
        record.push(format!("{:.10}", formation));
        record.push(format!("{:.10}", distance));
        wtr.write_record(&record).map_err(HullError::CsvError)?;
    }

    wtr.flush().map_err(|e| HullError::FileWriteError {
        path: output_path.display().to_string(),
        source: e,
    })?;

    Ok(())
}
