//! # 相图与稳定性查询
//!
//! `PhaseDiagram` = 冻结的条目集合 + 下凸包面元列表，构建一次后只读。
//! 提供两个纯查询：
//! - `formation_energy`: 相对元素参考态加权和的每原子生成能
//! - `energy_above_hull`: 条目到下凸包的能量距离（稳定性判据，0 为稳定）
//!
//! 查询无副作用，可以任意次数、任意顺序（含并行）调用。
//!
//! ## 依赖关系
//! - 被 `commands/analyze.rs` 和 `hull/plot.rs` 调用
//! - 使用 `hull/builder.rs` 构建面元

use crate::error::{HullError, Result};
use crate::hull::builder;
use crate::hull::facet::{BARY_TOL, Facet};
use crate::models::{Entry, EntrySet};

use std::collections::BTreeSet;

/// 相图：条目集合 + 下凸包面元，构建后不可变
#[derive(Debug, Clone)]
pub struct PhaseDiagram {
    entry_set: EntrySet,
    facets: Vec<Facet>,
}

impl PhaseDiagram {
    /// 从冻结的条目集合构建相图
    pub fn build(entry_set: EntrySet) -> Result<Self> {
        let facets = builder::build_facets(&entry_set)?;
        Ok(PhaseDiagram { entry_set, facets })
    }

    pub fn entry_set(&self) -> &EntrySet {
        &self.entry_set
    }

    pub fn entries(&self) -> &[Entry] {
        self.entry_set.entries()
    }

    pub fn elements(&self) -> &[String] {
        self.entry_set.elements()
    }

    pub fn n_elements(&self) -> usize {
        self.entry_set.n_elements()
    }

    /// 下凸包面元（构建时按确定顺序枚举）
    pub fn facets(&self) -> &[Facet] {
        &self.facets
    }

    /// 凸包顶点条目下标集合（即稳定条目）
    pub fn stable_indices(&self) -> BTreeSet<usize> {
        self.facets
            .iter()
            .flat_map(|f| f.vertices().iter().copied())
            .collect()
    }

    /// 每原子生成能 (eV)：能量减去元素参考态能量的分数加权和
    ///
    /// 每个元素参考态条目的生成能恰为 0。
    pub fn formation_energy(&self, entry: &Entry) -> Result<f64> {
        self.check_in_system(entry)?;

        let mut energy = entry.energy_per_atom_ev;
        for el in self.entry_set.elements() {
            // 参考态在 EntrySet 构建时已校验存在
            if let Some(reference) = self.entry_set.reference_energy(el) {
                energy -= entry.composition.fraction(el) * reference;
            }
        }
        Ok(energy)
    }

    /// 到下凸包的能量距离 (eV/atom)
    ///
    /// 在包含该成分的面元（重心权重全部非负）上插值凸包能量，
    /// 返回条目能量与凸包能量之差。凸包顶点恰为 0，其余条目在
    /// 浮点容差内非负。
    pub fn energy_above_hull(&self, entry: &Entry) -> Result<f64> {
        self.check_in_system(entry)?;

        // 凸包顶点精确为 0
        let fp = entry.composition.fingerprint();
        for facet in &self.facets {
            for &v in facet.vertices() {
                let vertex = &self.entry_set.entries()[v];
                if vertex.energy_per_atom_ev == entry.energy_per_atom_ev
                    && vertex.composition.fingerprint() == fp
                {
                    return Ok(0.0);
                }
            }
        }

        // 定位面元：取最小重心权重最大的面元。面元铺满单纯形，
        // 包含面元存在时该准则必选中其一，且在共享边界上保持确定。
        let elements = self.entry_set.elements();
        let mut best: Option<(f64, usize)> = None;
        for (i, facet) in self.facets.iter().enumerate() {
            if let Some(weights) = facet.barycentric_weights(&entry.composition, elements) {
                let min_weight = weights.min();
                match best {
                    Some((w, _)) if w >= min_weight => {}
                    _ => best = Some((min_weight, i)),
                }
            }
        }

        match best {
            Some((min_weight, i)) if min_weight >= -BARY_TOL => {
                let hull_energy = self.facets[i]
                    .energy_at(&entry.composition, elements)
                    .ok_or_else(|| HullError::HullInvariant {
                        composition: entry.composition.to_string(),
                        detail: "located facet has a singular vertex matrix".to_string(),
                    })?;
                Ok(entry.energy_per_atom_ev - hull_energy)
            }
            _ => Err(HullError::HullInvariant {
                composition: entry.composition.to_string(),
                detail: "no facet contains the composition".to_string(),
            }),
        }
    }

    /// 查询成分的元素必须落在体系元素集内
    fn check_in_system(&self, entry: &Entry) -> Result<()> {
        for el in entry.composition.elements() {
            if !self.entry_set.elements().iter().any(|e| e == el) {
                return Err(HullError::CompositionOutsideSystem {
                    element: el.to_string(),
                });
            }
        }
        Ok(())
    }
}
