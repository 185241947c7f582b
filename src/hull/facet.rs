//! # 凸包面元
//!
//! 一个面元由 n 个顶点条目张成（n 为体系元素数），通过重心坐标
//! 在面元覆盖的成分区域内线性插值顶点能量。
//!
//! ## 重心坐标
//! 设顶点成分（完整分数向量）为列向量 v₁..vₙ，查询成分为 y，
//! 解 [v₁ ... vₙ] w = y。由于各列分数之和均为 1，权重之和自动为 1。
//!
//! ## 依赖关系
//! - 被 `hull/builder.rs` 构建，被 `hull/diagram.rs` 查询
//! - 使用 `nalgebra` 做线性求解

use crate::models::Composition;

use nalgebra::{DMatrix, DVector};

/// 重心坐标判定"落在面元内"的容差
pub const BARY_TOL: f64 = 1e-9;

/// 下凸包面元：顶点条目下标 + 顶点成分矩阵 + 顶点能量
#[derive(Debug, Clone)]
pub struct Facet {
    /// 顶点条目下标（指向 PhaseDiagram 的条目列表，升序）
    vertices: Vec<usize>,
    /// 顶点成分矩阵（n×n，列 j 为顶点 j 在体系元素序下的完整分数向量）
    vertex_fractions: DMatrix<f64>,
    /// 顶点每原子能量 (eV)
    vertex_energies: Vec<f64>,
}

impl Facet {
    pub(crate) fn new(
        vertices: Vec<usize>,
        vertex_fractions: DMatrix<f64>,
        vertex_energies: Vec<f64>,
    ) -> Self {
        Facet {
            vertices,
            vertex_fractions,
            vertex_energies,
        }
    }

    /// 顶点条目下标
    pub fn vertices(&self) -> &[usize] {
        &self.vertices
    }

    /// 查询成分相对本面元顶点的重心权重
    ///
    /// 返回 `None` 表示顶点成分矩阵奇异（构建阶段已排除该情形）。
    pub fn barycentric_weights(
        &self,
        composition: &Composition,
        elements: &[String],
    ) -> Option<DVector<f64>> {
        let y = DVector::from_fn(elements.len(), |i, _| composition.fraction(&elements[i]));
        self.vertex_fractions.clone().lu().solve(&y)
    }

    /// 在查询成分处线性插值顶点能量（凸包能量）
    pub fn energy_at(&self, composition: &Composition, elements: &[String]) -> Option<f64> {
        let weights = self.barycentric_weights(composition, elements)?;
        Some(self.energy_from_weights(&weights))
    }

    /// 由已求得的重心权重插值顶点能量
    fn energy_from_weights(&self, weights: &DVector<f64>) -> f64 {
        weights
            .iter()
            .zip(self.vertex_energies.iter())
            .map(|(w, e)| w * e)
            .sum()
    }
}
