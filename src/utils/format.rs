//! # 数值格式化
//!
//! TurboRVB 输入文件中的实数写法：最短表示，且总带小数点（`1.0`, `-6.5`）。
//!
//! ## 依赖关系
//! - 被 `namelist/`, `parsers/makefort10_input.rs`, `calculations/` 使用

/// 将实数格式化为 Fortran 可读的最短表示
pub fn format_real(x: f64) -> String {
    let s = format!("{}", x);
    if x.is_finite() && !s.contains('.') && !s.contains('e') {
        format!("{}.0", s)
    } else {
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_real() {
        assert_eq!(format_real(1.0), "1.0");
        assert_eq!(format_real(-15.0), "-15.0");
        assert_eq!(format_real(0.105), "0.105");
        assert_eq!(format_real(-7.123456), "-7.123456");
        assert_eq!(format_real(28.34588982900000), "28.345889829");
    }
}
