// ==========================================
// 包装线称重控制 - 样本判定
// ==========================================
// 边界: 上下限闭区间，边界值合格
// 调用频率: 每次录入都会调用（N<=50，无需节流）
// ==========================================

use crate::domain::lot::ControlLimits;
use crate::domain::sample::SampleReading;
use crate::domain::types::Conformance;

/// 判定单个重量读数
///
/// - None → Unset（仍在录入，不算错误）
/// - lower <= w <= upper → Conforming
/// - 其他 → NonConforming
pub fn classify(weight: Option<f64>, lower_limit: f64, upper_limit: f64) -> Conformance {
    match weight {
        None => Conformance::Unset,
        Some(w) if lower_limit <= w && w <= upper_limit => Conformance::Conforming,
        Some(_) => Conformance::NonConforming,
    }
}

/// 按控制限判定样本
pub fn classify_reading(reading: &SampleReading, limits: &ControlLimits) -> Conformance {
    classify(reading.weight, limits.lower, limits.upper)
}
