//! # 条目集合数据模型
//!
//! 定义 (成分, 每原子能量) 条目及其校验后的集合。集合在构建后冻结：
//! 元素集、元素参考态在构建时一次性确定，之后只读。
//!
//! ## 校验规则
//! - 能量必须有限（拒绝 NaN/±inf）
//! - 重复成分保留为独立条目，参考态选取按最低能量、先见优先
//! - 体系中每个元素必须存在纯元素条目（元素参考态）
//!
//! ## 依赖关系
//! - 被 `hull/` 和 `commands/` 使用
//! - 使用 `models/composition.rs`

use crate::error::{HullError, Result};
use crate::models::Composition;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// 表格原始行：表格解析器产出，尚未校验
#[derive(Debug, Clone)]
pub struct EntryRow {
    /// 化学式字符串
    pub formula: String,
    /// 每原子能量 (eV)
    pub energy_per_atom_ev: f64,
    /// 可选标签
    pub label: Option<String>,
    /// 数据行号（1 起），用于错误定位
    pub row: usize,
}

/// 校验后的条目，构建后不可变
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// 归一化成分
    pub composition: Composition,
    /// 每原子能量 (eV)
    pub energy_per_atom_ev: f64,
    /// 可选标签
    pub label: Option<String>,
    /// 来源数据行号（1 起）
    pub row: usize,
}

/// 校验后的条目集合
#[derive(Debug, Clone)]
pub struct EntrySet {
    entries: Vec<Entry>,
    /// 体系元素集（字典序）
    elements: Vec<String>,
    /// 元素 -> 参考态条目下标（该元素纯相中能量最低者，先见优先）
    references: BTreeMap<String, usize>,
}

impl EntrySet {
    /// 从原始行构建条目集合并校验
    pub fn build(rows: Vec<EntryRow>) -> Result<Self> {
        let mut entries = Vec::with_capacity(rows.len());
        let mut element_set: BTreeSet<String> = BTreeSet::new();

        for row in rows {
            if !row.energy_per_atom_ev.is_finite() {
                return Err(HullError::InvalidEnergy {
                    value: format!("{}", row.energy_per_atom_ev),
                    row: row.row,
                });
            }

            let composition = Composition::parse(&row.formula).map_err(|e| match e {
                HullError::MalformedComposition {
                    formula, reason, ..
                } => HullError::MalformedComposition {
                    formula,
                    reason,
                    row: row.row,
                },
                other => other,
            })?;
            for el in composition.elements() {
                element_set.insert(el.to_string());
            }

            entries.push(Entry {
                composition,
                energy_per_atom_ev: row.energy_per_atom_ev,
                label: row.label,
                row: row.row,
            });
        }

        let elements: Vec<String> = element_set.into_iter().collect();

        // 选取元素参考态：最低能量，能量相同时先见优先
        let mut references: BTreeMap<String, usize> = BTreeMap::new();
        for (i, entry) in entries.iter().enumerate() {
            if let Some(el) = entry.composition.as_pure_element() {
                match references.get(el) {
                    Some(&j) if entries[j].energy_per_atom_ev <= entry.energy_per_atom_ev => {}
                    _ => {
                        references.insert(el.to_string(), i);
                    }
                }
            }
        }

        for el in &elements {
            if !references.contains_key(el) {
                return Err(HullError::MissingElementalReference {
                    element: el.clone(),
                });
            }
        }

        Ok(EntrySet {
            entries,
            elements,
            references,
        })
    }

    /// 全部条目（保持输入顺序）
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// 体系元素集（字典序）
    pub fn elements(&self) -> &[String] {
        &self.elements
    }

    /// 体系维度 n = |Elements|
    pub fn n_elements(&self) -> usize {
        self.elements.len()
    }

    /// 指定元素的参考态条目下标
    pub fn reference_index(&self, element: &str) -> Option<usize> {
        self.references.get(element).copied()
    }

    /// 指定元素的参考态能量 (eV/atom)
    pub fn reference_energy(&self, element: &str) -> Option<f64> {
        self.reference_index(element)
            .map(|i| self.entries[i].energy_per_atom_ev)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(formula: &str, energy: f64, n: usize) -> EntryRow {
        EntryRow {
            formula: formula.to_string(),
            energy_per_atom_ev: energy,
            label: None,
            row: n,
        }
    }

    #[test]
    fn test_build_binary_system() {
        let set = EntrySet::build(vec![
            row("Li", 0.0, 1),
            row("O", -1.0, 2),
            row("Li2O", -2.5, 3),
        ])
        .unwrap();

        assert_eq!(set.elements(), &["Li".to_string(), "O".to_string()]);
        assert_eq!(set.n_elements(), 2);
        assert_eq!(set.reference_energy("Li"), Some(0.0));
        assert_eq!(set.reference_energy("O"), Some(-1.0));
        assert_eq!(set.entries().len(), 3);
    }

    #[test]
    fn test_non_finite_energy_rejected() {
        let err = EntrySet::build(vec![row("Fe", f64::NAN, 1)]).unwrap_err();
        assert!(matches!(err, HullError::InvalidEnergy { row: 1, .. }));

        let err = EntrySet::build(vec![row("Fe", f64::INFINITY, 1)]).unwrap_err();
        assert!(matches!(err, HullError::InvalidEnergy { .. }));
    }

    #[test]
    fn test_missing_elemental_reference_rejected() {
        let err = EntrySet::build(vec![row("NaCl", -1.0, 1), row("Na", 0.0, 2)]).unwrap_err();
        assert!(matches!(
            err,
            HullError::MissingElementalReference { ref element } if element == "Cl"
        ));
    }

    #[test]
    fn test_reference_picks_lowest_energy() {
        let set = EntrySet::build(vec![
            row("Fe", 0.2, 1),
            row("Fe", 0.0, 2),
            row("Fe4", 0.1, 3),
        ])
        .unwrap();

        assert_eq!(set.reference_index("Fe"), Some(1));
        assert_eq!(set.reference_energy("Fe"), Some(0.0));
    }

    #[test]
    fn test_reference_tie_breaks_first_seen() {
        let set = EntrySet::build(vec![row("Fe", 0.0, 1), row("Fe2", 0.0, 2)]).unwrap();
        assert_eq!(set.reference_index("Fe"), Some(0));
    }

    #[test]
    fn test_duplicate_compositions_retained() {
        let set = EntrySet::build(vec![
            row("Na", 0.0, 1),
            row("Cl", 0.0, 2),
            row("NaCl", -1.0, 3),
            row("NaCl", -0.5, 4),
        ])
        .unwrap();
        assert_eq!(set.entries().len(), 4);
    }

    #[test]
    fn test_malformed_composition_propagates_row() {
        let err = EntrySet::build(vec![row("Fe", 0.0, 1), row("Qq2", 0.0, 2)]).unwrap_err();
        assert!(err.to_string().contains("row 2"));
    }
}
