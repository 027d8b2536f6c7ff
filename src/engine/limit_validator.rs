// ==========================================
// 包装线称重控制 - 控制限校验器
// ==========================================
// 职责: 进入抽样阶段前校验标称重量与上下控制限
// 红线: 上下限必须严格包住标称值（相等视为无效）
// 副作用: 无（纯校验）
// ==========================================

use crate::domain::lot::{LotConfiguration, LotConfigurationInput};
use crate::engine::error::{LimitViolation, ValidationError};

// ==========================================
// LimitValidator - 控制限校验器
// ==========================================
pub struct LimitValidator;

impl LimitValidator {
    /// 校验批次配置
    ///
    /// 检查顺序:
    /// 1) 必填字段: lot, product, nominal_weight, lower_limit, upper_limit,
    ///    material_lot_id, film_lot_id
    /// 2) 数值有效性: 均为有限值，标称重量 > 0
    /// 3) lower_limit >= nominal_weight → LowerTooHigh
    /// 4) upper_limit <= nominal_weight → UpperTooLow
    pub fn validate_limits(input: &LotConfigurationInput) -> Result<(), ValidationError> {
        require_text("lot", &input.lot)?;
        require_text("product", &input.product)?;
        let nominal = require_number("nominal_weight", input.nominal_weight)?;
        let lower = require_number("lower_limit", input.lower_limit)?;
        let upper = require_number("upper_limit", input.upper_limit)?;
        require_text("material_lot_id", &input.material_lot_id)?;
        require_text("film_lot_id", &input.film_lot_id)?;

        if !nominal.is_finite() || nominal <= 0.0 {
            return Err(ValidationError::InvalidValue {
                field: "nominal_weight",
                message: format!("标称重量必须为正数，实际 {}", nominal),
            });
        }
        if !lower.is_finite() {
            return Err(ValidationError::InvalidValue {
                field: "lower_limit",
                message: format!("下限必须为有限数值，实际 {}", lower),
            });
        }
        if !upper.is_finite() {
            return Err(ValidationError::InvalidValue {
                field: "upper_limit",
                message: format!("上限必须为有限数值，实际 {}", upper),
            });
        }

        if lower >= nominal {
            return Err(ValidationError::LimitOrder {
                violation: LimitViolation::LowerTooHigh,
                lower,
                nominal,
                upper,
            });
        }
        if upper <= nominal {
            return Err(ValidationError::LimitOrder {
                violation: LimitViolation::UpperTooLow,
                lower,
                nominal,
                upper,
            });
        }

        Ok(())
    }

    /// 校验并转换为不可变的批次配置
    ///
    /// 文本字段去除首尾空白，空的可选文本视为 None
    pub fn into_configuration(
        input: LotConfigurationInput,
    ) -> Result<LotConfiguration, ValidationError> {
        Self::validate_limits(&input)?;

        // validate_limits 已保证三个数值存在
        let (nominal_weight, lower_limit, upper_limit) =
            match (input.nominal_weight, input.lower_limit, input.upper_limit) {
                (Some(n), Some(l), Some(u)) => (n, l, u),
                _ => return Err(ValidationError::MissingField { field: "nominal_weight" }),
            };

        Ok(LotConfiguration {
            lot: input.lot.trim().to_string(),
            product: input.product.trim().to_string(),
            nominal_weight,
            lower_limit,
            upper_limit,
            supplier: normalize_optional(input.supplier),
            machine_operator: normalize_optional(input.machine_operator),
            sealer_operator: normalize_optional(input.sealer_operator),
            film_name: normalize_optional(input.film_name),
            material_lot_id: input.material_lot_id.trim().to_string(),
            film_lot_id: input.film_lot_id.trim().to_string(),
            machine_parameters: input.machine_parameters,
            sealing_checks: input.sealing_checks,
            evidence_reference: normalize_optional(input.evidence_reference),
        })
    }
}

/// 便捷函数，等价于 LimitValidator::validate_limits
pub fn validate_limits(input: &LotConfigurationInput) -> Result<(), ValidationError> {
    LimitValidator::validate_limits(input)
}

fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::MissingField { field })
    } else {
        Ok(())
    }
}

fn require_number(field: &'static str, value: Option<f64>) -> Result<f64, ValidationError> {
    value.ok_or(ValidationError::MissingField { field })
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_input() -> LotConfigurationInput {
        LotConfigurationInput {
            lot: "L-0415".to_string(),
            product: "Azúcar 1kg".to_string(),
            nominal_weight: Some(500.0),
            lower_limit: Some(480.0),
            upper_limit: Some(520.0),
            material_lot_id: "MP-77".to_string(),
            film_lot_id: "FL-12".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_configuration_passes() {
        assert!(validate_limits(&valid_input()).is_ok());
    }

    #[test]
    fn test_missing_fields_reported_in_order() {
        let mut input = valid_input();
        input.lot = "  ".to_string();
        input.film_lot_id.clear();
        assert_eq!(
            validate_limits(&input),
            Err(ValidationError::MissingField { field: "lot" })
        );

        let mut input = valid_input();
        input.upper_limit = None;
        assert_eq!(
            validate_limits(&input),
            Err(ValidationError::MissingField { field: "upper_limit" })
        );

        let mut input = valid_input();
        input.film_lot_id = String::new();
        assert_eq!(
            validate_limits(&input),
            Err(ValidationError::MissingField { field: "film_lot_id" })
        );
    }

    #[test]
    fn test_lower_equal_to_nominal_rejected() {
        // 场景 E: lower=500, nominal=500
        let mut input = valid_input();
        input.lower_limit = Some(500.0);
        match validate_limits(&input) {
            Err(ValidationError::LimitOrder { violation, .. }) => {
                assert_eq!(violation, LimitViolation::LowerTooHigh)
            }
            other => panic!("Expected LimitOrder, got {:?}", other),
        }
    }

    #[test]
    fn test_upper_not_above_nominal_rejected() {
        for upper in [500.0, 499.0, 10.0] {
            let mut input = valid_input();
            input.upper_limit = Some(upper);
            match validate_limits(&input) {
                Err(ValidationError::LimitOrder { violation, .. }) => {
                    assert_eq!(violation, LimitViolation::UpperTooLow)
                }
                other => panic!("Expected LimitOrder for upper={}, got {:?}", upper, other),
            }
        }
    }

    #[test]
    fn test_any_bracket_violation_is_limit_order() {
        let cases = [
            (500.0, 500.0, 520.0),
            (510.0, 500.0, 520.0),
            (480.0, 500.0, 500.0),
            (480.0, 500.0, 490.0),
            (600.0, 500.0, 400.0),
        ];
        for (lower, nominal, upper) in cases {
            let mut input = valid_input();
            input.lower_limit = Some(lower);
            input.nominal_weight = Some(nominal);
            input.upper_limit = Some(upper);
            assert!(
                matches!(validate_limits(&input), Err(ValidationError::LimitOrder { .. })),
                "lower={} nominal={} upper={}",
                lower,
                nominal,
                upper
            );
        }
    }

    #[test]
    fn test_non_positive_nominal_rejected() {
        let mut input = valid_input();
        input.nominal_weight = Some(0.0);
        input.lower_limit = Some(-5.0);
        assert!(matches!(
            validate_limits(&input),
            Err(ValidationError::InvalidValue { field: "nominal_weight", .. })
        ));
    }

    #[test]
    fn test_into_configuration_normalizes_text() {
        let mut input = valid_input();
        input.lot = "  L-0415 ".to_string();
        input.supplier = Some("   ".to_string());
        input.film_name = Some(" BOPP 20µ ".to_string());

        let config = LimitValidator::into_configuration(input).unwrap();
        assert_eq!(config.lot, "L-0415");
        assert_eq!(config.supplier, None);
        assert_eq!(config.film_name.as_deref(), Some("BOPP 20µ"));
        assert_eq!(config.limits().lower, 480.0);
    }
}
