//! # 元素符号数据库
//!
//! 提供完整周期表元素符号集合，用于校验化学式中的元素符号。
//!
//! ## 数据来源
//! IUPAC 周期表（118 种元素，截至 Og）
//!
//! ## 依赖关系
//! - 被 `models/composition.rs` 调用校验元素符号
//! - 纯静态数据，无外部依赖

use std::collections::HashSet;
use std::sync::LazyLock;

/// 全部元素符号（按原子序数排列）
const SYMBOLS: [&str; 118] = [
    // 第 1-2 周期
    "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne",
    // 第 3 周期
    "Na", "Mg", "Al", "Si", "P", "S", "Cl", "Ar",
    // 第 4 周期
    "K", "Ca", "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn",
    "Ga", "Ge", "As", "Se", "Br", "Kr",
    // 第 5 周期
    "Rb", "Sr", "Y", "Zr", "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd",
    "In", "Sn", "Sb", "Te", "I", "Xe",
    // 第 6 周期（含镧系）
    "Cs", "Ba", "La", "Ce", "Pr", "Nd", "Pm", "Sm", "Eu", "Gd", "Tb", "Dy",
    "Ho", "Er", "Tm", "Yb", "Lu", "Hf", "Ta", "W", "Re", "Os", "Ir", "Pt",
    "Au", "Hg", "Tl", "Pb", "Bi", "Po", "At", "Rn",
    // 第 7 周期（含锕系）
    "Fr", "Ra", "Ac", "Th", "Pa", "U", "Np", "Pu", "Am", "Cm", "Bk", "Cf",
    "Es", "Fm", "Md", "No", "Lr", "Rf", "Db", "Sg", "Bh", "Hs", "Mt", "Ds",
    "Rg", "Cn", "Nh", "Fl", "Mc", "Lv", "Ts", "Og",
];

/// 元素符号集合
static ELEMENT_SYMBOLS: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| SYMBOLS.iter().copied().collect());

/// 判断字符串是否为合法元素符号
pub fn is_element(symbol: &str) -> bool {
    ELEMENT_SYMBOLS.contains(symbol)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_elements_recognized() {
        for el in ["H", "Li", "Fe", "O", "Na", "Cl", "U", "Og"] {
            assert!(is_element(el), "{} should be a valid element", el);
        }
    }

    #[test]
    fn test_invalid_symbols_rejected() {
        assert!(!is_element("Xx"));
        assert!(!is_element("li"));
        assert!(!is_element("FE"));
        assert!(!is_element(""));
        assert!(!is_element("D"));
    }

    #[test]
    fn test_symbol_table_is_complete() {
        assert_eq!(SYMBOLS.len(), 118);
        assert_eq!(ELEMENT_SYMBOLS.len(), 118);
    }
}
