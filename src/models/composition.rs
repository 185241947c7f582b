//! # 化学式解析与成分模型
//!
//! 将化学式字符串（如 `"Li4Fe3O8"`, `"Na0.5Cl0.5"`）解析为归一化的
//! 原子分数向量。解析为纯函数，无副作用。
//!
//! ## 化学式语法
//! ```text
//! formula := (element amount?)+
//! element := 大写字母 + 可选小写字母 (须为合法元素符号)
//! amount  := 非负整数或小数，省略时为 1
//! ```
//!
//! ## 依赖关系
//! - 被 `models/entry.rs` 和 `hull/` 使用
//! - 使用 `models/elements.rs` 校验元素符号

use crate::error::{HullError, Result};
use crate::models::elements;

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// 归一化容差：原子分数之和与 1 的允许偏差
pub const FRACTION_SUM_TOL: f64 = 1e-6;

/// 成分指纹的量化精度（用于判定重复成分）
const FINGERPRINT_SCALE: f64 = 1e8;

/// 化学式 token：元素符号 + 可选数量
static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Z][a-z]?)(\d+\.?\d*|\.\d+)?").unwrap());

/// 归一化成分：元素符号到原子分数的映射，分数之和为 1
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Composition {
    /// 原始化学式（去除首尾空白）
    formula: String,
    /// 归一化原子分数（BTreeMap 保证元素顺序确定）
    fractions: BTreeMap<String, f64>,
}

impl Composition {
    /// 解析化学式字符串
    ///
    /// 错误的行号字段为 0，由调用方（如 `EntrySet::build`）补充。
    pub fn parse(formula: &str) -> Result<Self> {
        let trimmed = formula.trim();

        let malformed = |reason: &str| HullError::MalformedComposition {
            formula: formula.to_string(),
            row: 0,
            reason: reason.to_string(),
        };

        if trimmed.is_empty() {
            return Err(malformed("empty formula"));
        }

        // 逐 token 匹配，匹配必须无缝覆盖整个字符串
        let mut amounts: BTreeMap<String, f64> = BTreeMap::new();
        let mut cursor = 0;
        for caps in TOKEN_RE.captures_iter(trimmed) {
            let whole = caps.get(0).unwrap();
            if whole.start() != cursor {
                return Err(malformed(&format!(
                    "unexpected character at position {}",
                    cursor
                )));
            }
            cursor = whole.end();

            let symbol = caps.get(1).unwrap().as_str();
            if !elements::is_element(symbol) {
                return Err(malformed(&format!("unrecognized element '{}'", symbol)));
            }

            let amount = match caps.get(2) {
                Some(m) => m.as_str().parse::<f64>().map_err(|_| {
                    malformed(&format!("invalid amount '{}' for {}", m.as_str(), symbol))
                })?,
                None => 1.0,
            };
            if !amount.is_finite() || amount < 0.0 {
                return Err(malformed(&format!(
                    "negative or non-finite amount for {}",
                    symbol
                )));
            }

            *amounts.entry(symbol.to_string()).or_insert(0.0) += amount;
        }

        if cursor != trimmed.len() {
            return Err(malformed(&format!(
                "unexpected character at position {}",
                cursor
            )));
        }

        let total: f64 = amounts.values().sum();
        if total <= 0.0 {
            return Err(malformed("zero total atom count"));
        }

        let fractions = amounts
            .into_iter()
            .map(|(el, amt)| (el, amt / total))
            .collect();

        Ok(Composition {
            formula: trimmed.to_string(),
            fractions,
        })
    }

    /// 原始化学式
    pub fn formula(&self) -> &str {
        &self.formula
    }

    /// 指定元素的原子分数（不存在时为 0）
    pub fn fraction(&self, element: &str) -> f64 {
        self.fractions.get(element).copied().unwrap_or(0.0)
    }

    /// 成分中出现的元素（含分数为 0 的元素，按字典序）
    pub fn elements(&self) -> impl Iterator<Item = &str> {
        self.fractions.keys().map(|s| s.as_str())
    }

    /// 若为纯元素成分（某元素分数为 1），返回该元素
    pub fn as_pure_element(&self) -> Option<&str> {
        self.fractions
            .iter()
            .find(|(_, frac)| (**frac - 1.0).abs() <= FRACTION_SUM_TOL)
            .map(|(el, _)| el.as_str())
    }

    /// 成分指纹：量化后的分数向量，用于判定"相同成分"
    ///
    /// 分数为 0 的元素不参与指纹，`"FeO0"` 与 `"Fe"` 视为相同成分。
    pub(crate) fn fingerprint(&self) -> Vec<(String, i64)> {
        self.fractions
            .iter()
            .map(|(el, frac)| (el.clone(), (frac * FINGERPRINT_SCALE).round() as i64))
            .filter(|(_, q)| *q != 0)
            .collect()
    }
}

impl std::fmt::Display for Composition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.formula)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_integer_amounts() {
        let comp = Composition::parse("Li4Fe3O8").unwrap();
        assert!((comp.fraction("Li") - 4.0 / 15.0).abs() < 1e-12);
        assert!((comp.fraction("Fe") - 3.0 / 15.0).abs() < 1e-12);
        assert!((comp.fraction("O") - 8.0 / 15.0).abs() < 1e-12);
    }

    #[test]
    fn test_parse_fractional_amounts() {
        let comp = Composition::parse("Na0.5Cl0.5").unwrap();
        assert!((comp.fraction("Na") - 0.5).abs() < 1e-12);
        assert!((comp.fraction("Cl") - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_amount_defaults_to_one() {
        let comp = Composition::parse("NaCl").unwrap();
        assert!((comp.fraction("Na") - 0.5).abs() < 1e-12);
        assert!((comp.fraction("Cl") - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_fractions_sum_to_one() {
        for formula in ["Li4Fe3O8", "Na0.5Cl0.5", "H2O", "Mg"] {
            let comp = Composition::parse(formula).unwrap();
            let sum: f64 = comp.elements().map(|el| comp.fraction(el)).sum();
            assert!((sum - 1.0).abs() < FRACTION_SUM_TOL, "{}: sum={}", formula, sum);
        }
    }

    #[test]
    fn test_repeated_element_amounts_are_summed() {
        let comp = Composition::parse("FeOFe").unwrap();
        assert!((comp.fraction("Fe") - 2.0 / 3.0).abs() < 1e-12);
        assert!((comp.fraction("O") - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_element_rejected() {
        let err = Composition::parse("Xx2O").unwrap_err();
        assert!(err.to_string().contains("Xx"));
    }

    #[test]
    fn test_empty_formula_rejected() {
        assert!(Composition::parse("").is_err());
        assert!(Composition::parse("   ").is_err());
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(Composition::parse("Fe2-O3").is_err());
        assert!(Composition::parse("fe2").is_err());
        assert!(Composition::parse("2Fe").is_err());
        assert!(Composition::parse("Fe2 O3").is_err());
    }

    #[test]
    fn test_zero_total_atom_count_rejected() {
        let err = Composition::parse("Fe0").unwrap_err();
        assert!(err.to_string().contains("zero total atom count"));
    }

    #[test]
    fn test_pure_element_detection() {
        assert_eq!(Composition::parse("Fe").unwrap().as_pure_element(), Some("Fe"));
        assert_eq!(Composition::parse("Fe4").unwrap().as_pure_element(), Some("Fe"));
        assert_eq!(Composition::parse("FeO").unwrap().as_pure_element(), None);
    }

    #[test]
    fn test_absent_element_fraction_is_zero() {
        let comp = Composition::parse("NaCl").unwrap();
        assert_eq!(comp.fraction("Fe"), 0.0);
    }

    #[test]
    fn test_fingerprint_identifies_duplicates() {
        let a = Composition::parse("NaCl").unwrap();
        let b = Composition::parse("Na2Cl2").unwrap();
        let c = Composition::parse("Na2Cl").unwrap();
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), c.fingerprint());
    }

}
