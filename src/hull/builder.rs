//! # 下凸包构建器
//!
//! 在 n 维空间（n-1 个独立原子分数 + 能量）中计算条目集合的下凸包面元。
//!
//! ## 算法概述
//! 1. 每个不同成分取最低能量条目作为候选点（能量相同先见优先）
//! 2. 校验候选点仿射张成整个成分单纯形
//! 3. 枚举候选点的 n 元子集：若子集成分仿射无关，且其插值超平面
//!    不高于任何候选点，则该子集构成一个下凸包面元
//! 4. 被严格支配的重复条目不会成为顶点，但保留在条目集合中供距离查询
//!
//! n = 1 时自然退化：面元为单点，仅最低能量条目通过判定。
//!
//! ## 参考
//! - pymatgen.analysis.phase_diagram
//!
//! ## 依赖关系
//! - 被 `hull/diagram.rs` 调用
//! - 使用 `models/entry.rs` 的 EntrySet
//! - 使用 `nalgebra` 求解超平面

use crate::error::{HullError, Result};
use crate::hull::Facet;
use crate::models::EntrySet;

use nalgebra::{DMatrix, DVector};
use std::collections::HashMap;

/// 下凸包面元判定容差 (eV/atom)
pub const LOWER_TOL: f64 = 1e-9;

/// 仿射秩判定容差
const RANK_TOL: f64 = 1e-9;

/// 候选点：某一不同成分的最低能量代表
struct Candidate {
    /// 指向条目集合的下标
    entry_index: usize,
    /// 单纯形坐标：前 n-1 个元素（字典序）的原子分数
    coords: DVector<f64>,
    /// 每原子能量 (eV)
    energy: f64,
}

/// 计算条目集合的全部下凸包面元
///
/// 面元按候选子集的字典序枚举，结果完全确定。
pub fn build_facets(set: &EntrySet) -> Result<Vec<Facet>> {
    let n = set.n_elements();
    if n == 0 {
        return Err(HullError::DegenerateSystem {
            needed: 1,
            found: 0,
        });
    }
    let candidates = collect_candidates(set);
    check_affine_span(&candidates, n)?;

    let m = candidates.len();
    let mut facets = Vec::new();
    let mut combo: Vec<usize> = (0..n).collect();
    loop {
        if let Some(facet) = try_facet(set, &candidates, &combo) {
            facets.push(facet);
        }
        if !advance_combination(&mut combo, m) {
            break;
        }
    }

    Ok(facets)
}

/// 按成分指纹去重，取每个成分的最低能量条目（先见优先）
fn collect_candidates(set: &EntrySet) -> Vec<Candidate> {
    let n = set.n_elements();
    let elements = set.elements();
    let mut seen: HashMap<Vec<(String, i64)>, usize> = HashMap::new();
    let mut candidates: Vec<Candidate> = Vec::new();

    for (i, entry) in set.entries().iter().enumerate() {
        let fp = entry.composition.fingerprint();
        match seen.get(&fp) {
            Some(&pos) => {
                if entry.energy_per_atom_ev < candidates[pos].energy {
                    candidates[pos].entry_index = i;
                    candidates[pos].energy = entry.energy_per_atom_ev;
                }
            }
            None => {
                let coords =
                    DVector::from_fn(n - 1, |k, _| entry.composition.fraction(&elements[k]));
                seen.insert(fp, candidates.len());
                candidates.push(Candidate {
                    entry_index: i,
                    coords,
                    energy: entry.energy_per_atom_ev,
                });
            }
        }
    }

    candidates
}

/// 校验候选点仿射张成单纯形（存在 n 个仿射无关的成分）
fn check_affine_span(candidates: &[Candidate], n: usize) -> Result<()> {
    if candidates.len() < n {
        return Err(HullError::DegenerateSystem {
            needed: n,
            found: candidates.len(),
        });
    }
    if n == 1 {
        return Ok(());
    }

    let base = &candidates[0].coords;
    let diffs = DMatrix::from_fn(candidates.len() - 1, n - 1, |i, j| {
        candidates[i + 1].coords[j] - base[j]
    });
    let rank = diffs.rank(RANK_TOL);
    if rank < n - 1 {
        return Err(HullError::DegenerateSystem {
            needed: n,
            found: rank + 1,
        });
    }

    Ok(())
}

/// 判定候选子集是否构成下凸包面元，是则构造 Facet
///
/// 求解过子集各点的插值超平面 E(x) = a·x + c，要求所有候选点
/// 位于超平面之上（容差内）。子集成分仿射相关时线性系统奇异，跳过。
fn try_facet(set: &EntrySet, candidates: &[Candidate], combo: &[usize]) -> Option<Facet> {
    let n = combo.len();

    // 超平面系数: [coords_i^T 1] [a; c] = E_i
    let mat = DMatrix::from_fn(n, n, |i, j| {
        let cand = &candidates[combo[i]];
        if j < n - 1 { cand.coords[j] } else { 1.0 }
    });
    let rhs = DVector::from_fn(n, |i, _| candidates[combo[i]].energy);
    let plane = mat.lu().solve(&rhs)?;

    // 下凸包判定：超平面不高于任何候选点
    for cand in candidates {
        let plane_energy: f64 =
            (0..n - 1).map(|j| plane[j] * cand.coords[j]).sum::<f64>() + plane[n - 1];
        if cand.energy < plane_energy - LOWER_TOL {
            return None;
        }
    }

    // 顶点按条目下标升序，保证面元表示唯一
    let mut vertices: Vec<usize> = combo.iter().map(|&k| candidates[k].entry_index).collect();
    vertices.sort_unstable();

    let elements = set.elements();
    let entries = set.entries();
    let vertex_fractions = DMatrix::from_fn(elements.len(), n, |i, j| {
        entries[vertices[j]].composition.fraction(&elements[i])
    });
    let vertex_energies: Vec<f64> = vertices
        .iter()
        .map(|&v| entries[v].energy_per_atom_ev)
        .collect();

    Some(Facet::new(vertices, vertex_fractions, vertex_energies))
}

/// 字典序推进组合（k 元子集，全集大小 m）；无后继时返回 false
fn advance_combination(combo: &mut [usize], m: usize) -> bool {
    let k = combo.len();
    let mut i = k;
    while i > 0 {
        i -= 1;
        if combo[i] < m - k + i {
            combo[i] += 1;
            for j in i + 1..k {
                combo[j] = combo[j - 1] + 1;
            }
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EntryRow, EntrySet};

    fn row(formula: &str, energy: f64, n: usize) -> EntryRow {
        EntryRow {
            formula: formula.to_string(),
            energy_per_atom_ev: energy,
            label: None,
            row: n,
        }
    }

    fn build(rows: Vec<EntryRow>) -> (EntrySet, Vec<Facet>) {
        let set = EntrySet::build(rows).unwrap();
        let facets = build_facets(&set).unwrap();
        (set, facets)
    }

    #[test]
    fn test_binary_hull_with_stable_compound() {
        // Na(0), Cl(0), NaCl(-1): NaCl 在凸包上，面元为 Na-NaCl 与 NaCl-Cl
        let (_, facets) = build(vec![
            row("Na", 0.0, 1),
            row("Cl", 0.0, 2),
            row("NaCl", -1.0, 3),
        ]);

        assert_eq!(facets.len(), 2);
        let mut vertex_sets: Vec<Vec<usize>> =
            facets.iter().map(|f| f.vertices().to_vec()).collect();
        vertex_sets.sort();
        assert_eq!(vertex_sets, vec![vec![0, 2], vec![1, 2]]);
    }

    #[test]
    fn test_unstable_compound_excluded_from_vertices() {
        // NaCl(-0.5) 被 NaCl(-1.0) 严格支配，不出现在任何面元中
        let (_, facets) = build(vec![
            row("Na", 0.0, 1),
            row("Cl", 0.0, 2),
            row("NaCl", -1.0, 3),
            row("NaCl", -0.5, 4),
        ]);

        assert_eq!(facets.len(), 2);
        for facet in &facets {
            assert!(!facet.vertices().contains(&3));
        }
    }

    #[test]
    fn test_no_compound_below_segment() {
        // NaCl(+0.5) 在两端点连线上方：凸包仅为 Na-Cl 一段
        let (_, facets) = build(vec![
            row("Na", 0.0, 1),
            row("Cl", 0.0, 2),
            row("NaCl", 0.5, 3),
        ]);

        assert_eq!(facets.len(), 1);
        assert_eq!(facets[0].vertices(), &[0, 1]);
    }

    #[test]
    fn test_single_element_hull() {
        let (_, facets) = build(vec![
            row("Fe", 0.2, 1),
            row("Fe", 0.0, 2),
            row("Fe", 0.1, 3),
        ]);

        assert_eq!(facets.len(), 1);
        assert_eq!(facets[0].vertices(), &[1]);
    }

    #[test]
    fn test_ternary_hull_facets() {
        // 纯元素三点 + 中心化合物：三个含化合物的面元
        let (_, facets) = build(vec![
            row("Na", 0.0, 1),
            row("Cl", 0.0, 2),
            row("O", 0.0, 3),
            row("NaClO", -1.0, 4),
        ]);

        assert_eq!(facets.len(), 3);
        for facet in &facets {
            assert!(facet.vertices().contains(&3));
            assert_eq!(facet.vertices().len(), 3);
        }
    }

    #[test]
    fn test_build_is_deterministic() {
        let rows = || {
            vec![
                row("Na", 0.0, 1),
                row("Cl", 0.1, 2),
                row("NaCl", -0.8, 3),
                row("Na3Cl", -0.2, 4),
            ]
        };
        let (_, facets1) = build(rows());
        let (_, facets2) = build(rows());

        let verts = |fs: &[Facet]| fs.iter().map(|f| f.vertices().to_vec()).collect::<Vec<_>>();
        assert_eq!(verts(&facets1), verts(&facets2));
    }

    #[test]
    fn test_degenerate_span_detected() {
        // 直接校验仿射秩检查：二维体系但只有一个候选成分
        let cands = vec![Candidate {
            entry_index: 0,
            coords: DVector::from_vec(vec![0.5]),
            energy: -1.0,
        }];
        let err = check_affine_span(&cands, 2).unwrap_err();
        assert!(matches!(err, HullError::DegenerateSystem { needed: 2, found: 1 }));
    }

    #[test]
    fn test_advance_combination_covers_all() {
        let mut combo = vec![0, 1];
        let mut seen = vec![combo.clone()];
        while advance_combination(&mut combo, 4) {
            seen.push(combo.clone());
        }
        assert_eq!(
            seen,
            vec![
                vec![0, 1],
                vec![0, 2],
                vec![0, 3],
                vec![1, 2],
                vec![1, 3],
                vec![2, 3]
            ]
        );
    }
}
