// ==========================================
// 包装线称重控制 - 领域类型定义
// ==========================================
// 职责: 判定结果、最终处置、封口检查项、未测样本策略
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 单样本判定结果 (Conformance)
// ==========================================
// 边界: 上下限均为闭区间
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Conformance {
    Unset,         // 尚未称重
    Conforming,    // 合格
    NonConforming, // 不合格
}

impl fmt::Display for Conformance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Conformance::Unset => write!(f, "UNSET"),
            Conformance::Conforming => write!(f, "CONFORMING"),
            Conformance::NonConforming => write!(f, "NON_CONFORMING"),
        }
    }
}

// ==========================================
// 批次最终处置 (Final Status)
// ==========================================
// 红线: 任一样本不合格即判退
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FinalStatus {
    Approved, // 放行
    Rejected, // 判退
}

impl FinalStatus {
    /// 转换为数据库存储字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            FinalStatus::Approved => "APPROVED",
            FinalStatus::Rejected => "REJECTED",
        }
    }

    /// 从数据库字符串解析
    ///
    /// 未知值返回 None，由仓储层作为数据损坏上报
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "APPROVED" => Some(FinalStatus::Approved),
            "REJECTED" => Some(FinalStatus::Rejected),
            _ => None,
        }
    }
}

impl fmt::Display for FinalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// 封口检查项 (Sealing Check)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SealingCheck {
    LowerSeal,       // 下封口
    UpperSeal,       // 上封口
    VerticalSeal,    // 纵封
    LotPrintLegible, // 批号喷码清晰
}

impl fmt::Display for SealingCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SealingCheck::LowerSeal => write!(f, "LOWER_SEAL"),
            SealingCheck::UpperSeal => write!(f, "UPPER_SEAL"),
            SealingCheck::VerticalSeal => write!(f, "VERTICAL_SEAL"),
            SealingCheck::LotPrintLegible => write!(f, "LOT_PRINT_LEGIBLE"),
        }
    }
}

// ==========================================
// 未测样本处理策略 (Incomplete Sample Policy)
// ==========================================
// 配置项: incomplete_sample_policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IncompleteSamplePolicy {
    /// 未测样本保持为空值，计入不合格数（默认）
    UnmeasuredNonConforming,
    /// 未测样本按 0 克写入（兼容旧口径，0 与"实测为 0"不可区分）
    CoerceZero,
}

impl IncompleteSamplePolicy {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            IncompleteSamplePolicy::UnmeasuredNonConforming => "UNMEASURED_NON_CONFORMING",
            IncompleteSamplePolicy::CoerceZero => "COERCE_ZERO",
        }
    }

    /// 解析配置值，无法识别时返回 None
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "UNMEASURED_NON_CONFORMING" => Some(IncompleteSamplePolicy::UnmeasuredNonConforming),
            "COERCE_ZERO" => Some(IncompleteSamplePolicy::CoerceZero),
            _ => None,
        }
    }
}

impl Default for IncompleteSamplePolicy {
    fn default() -> Self {
        IncompleteSamplePolicy::UnmeasuredNonConforming
    }
}

impl fmt::Display for IncompleteSamplePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_final_status_db_roundtrip() {
        assert_eq!(FinalStatus::from_db_str("APPROVED"), Some(FinalStatus::Approved));
        assert_eq!(FinalStatus::from_db_str("rejected"), Some(FinalStatus::Rejected));
        assert_eq!(FinalStatus::from_db_str("???"), None);
        assert_eq!(FinalStatus::from_db_str(""), None);
    }

    #[test]
    fn test_policy_parse() {
        assert_eq!(
            IncompleteSamplePolicy::parse(" coerce_zero "),
            Some(IncompleteSamplePolicy::CoerceZero)
        );
        assert_eq!(IncompleteSamplePolicy::parse("SOMETHING"), None);
        assert_eq!(
            IncompleteSamplePolicy::default(),
            IncompleteSamplePolicy::UnmeasuredNonConforming
        );
    }

    #[test]
    fn test_conformance_serde_format() {
        let json = serde_json::to_string(&Conformance::NonConforming).unwrap();
        assert_eq!(json, "\"NON_CONFORMING\"");
    }
}
