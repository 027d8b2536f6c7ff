// ==========================================
// 包装线称重控制 - 引擎层错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use std::fmt;
use thiserror::Error;

// ==========================================
// LimitViolation - 控制限顺序违规类型
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitViolation {
    /// 下限 >= 标称值
    LowerTooHigh,
    /// 上限 <= 标称值
    UpperTooLow,
}

impl fmt::Display for LimitViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LimitViolation::LowerTooHigh => write!(f, "下限过高，必须小于标称重量"),
            LimitViolation::UpperTooLow => write!(f, "上限过低，必须大于标称重量"),
        }
    }
}

/// 批次配置校验错误
///
/// 同步抛出，由操作员重新填写后恢复，不会进入持久化
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("必填字段缺失: {field}")]
    MissingField { field: &'static str },

    #[error("字段值无效 (field={field}): {message}")]
    InvalidValue { field: &'static str, message: String },

    #[error("控制限顺序错误: {violation} (lower={lower}, nominal={nominal}, upper={upper})")]
    LimitOrder {
        violation: LimitViolation,
        lower: f64,
        nominal: f64,
        upper: f64,
    },
}

/// 抽样会话错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    #[error("样本序号越界: index={index}, 有效范围 1..={size}")]
    IndexOutOfRange { index: u32, size: usize },

    #[error("样本重量无效 (index={index}): {value}")]
    InvalidWeight { index: u32, value: f64 },
}

/// 提交时仍有未称重样本
///
/// 不是硬错误: 操作员确认后可继续提交，或返回继续称重
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("样本未录完: 缺少 {missing}/{total} 个重量，需操作员确认后才能提交")]
pub struct IncompleteSampleWarning {
    pub missing: usize,
    pub total: usize,
}

/// 样本集为空，不能据此放行或判退
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("样本集为空，无法构建控制记录")]
pub struct EmptySampleSetError;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_order_message_distinguishes_side() {
        let lower = ValidationError::LimitOrder {
            violation: LimitViolation::LowerTooHigh,
            lower: 500.0,
            nominal: 500.0,
            upper: 520.0,
        };
        let upper = ValidationError::LimitOrder {
            violation: LimitViolation::UpperTooLow,
            lower: 480.0,
            nominal: 500.0,
            upper: 500.0,
        };
        assert!(lower.to_string().contains("下限过高"));
        assert!(upper.to_string().contains("上限过低"));
    }
}
