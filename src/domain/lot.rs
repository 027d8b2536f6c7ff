// ==========================================
// 包装线称重控制 - 批次配置领域模型
// ==========================================
// 生命周期: 操作员在流程开始时填写，控制记录落库后不可变
// 更正方式: 重新发起一次称重控制（不提供修改入口）
// ==========================================

use crate::domain::types::SealingCheck;
use serde::{Deserialize, Serialize};

// ==========================================
// ControlLimits - 控制限
// ==========================================
// 闭区间 [lower, upper]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlLimits {
    pub lower: f64, // 下限 (g)
    pub upper: f64, // 上限 (g)
}

impl ControlLimits {
    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    /// 重量是否落在控制限内（含边界）
    pub fn contains(&self, weight: f64) -> bool {
        self.lower <= weight && weight <= self.upper
    }
}

// ==========================================
// SealingChecks - 封口检查
// ==========================================
// 四项相互独立，默认均为通过；任一不通过即为质量偏差
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SealingChecks {
    pub lower_seal: bool,
    pub upper_seal: bool,
    pub vertical_seal: bool,
    pub lot_print_legible: bool,
}

impl Default for SealingChecks {
    fn default() -> Self {
        Self {
            lower_seal: true,
            upper_seal: true,
            vertical_seal: true,
            lot_print_legible: true,
        }
    }
}

impl SealingChecks {
    /// 未通过的检查项（按固定顺序）
    pub fn failed_checks(&self) -> Vec<SealingCheck> {
        let mut failed = Vec::new();
        if !self.lower_seal {
            failed.push(SealingCheck::LowerSeal);
        }
        if !self.upper_seal {
            failed.push(SealingCheck::UpperSeal);
        }
        if !self.vertical_seal {
            failed.push(SealingCheck::VerticalSeal);
        }
        if !self.lot_print_legible {
            failed.push(SealingCheck::LotPrintLegible);
        }
        failed
    }

    pub fn all_passed(&self) -> bool {
        self.lower_seal && self.upper_seal && self.vertical_seal && self.lot_print_legible
    }
}

// ==========================================
// MachineParameters - 设备技术参数
// ==========================================
// 可选遥测，缺省为 0
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineParameters {
    pub machine_speed: i32,              // 机速 (次/分)
    pub vertical_seal_temp: f64,         // 纵封温度 (°C)
    pub horiz_seal_temp_upper: f64,      // 横封上温度 (°C)
    pub horiz_seal_temp_lower: f64,      // 横封下温度 (°C)
}

// ==========================================
// LotConfigurationInput - 操作员录入的原始表单
// ==========================================
// 数值字段由 UI 层完成文本到数字的转换，未填写为 None
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LotConfigurationInput {
    // ===== 必填 =====
    pub lot: String,
    pub product: String,
    pub nominal_weight: Option<f64>,
    pub lower_limit: Option<f64>,
    pub upper_limit: Option<f64>,
    pub material_lot_id: String,
    pub film_lot_id: String,

    // ===== 目录来源的自由文本（不做外键约束）=====
    pub supplier: Option<String>,
    pub machine_operator: Option<String>,
    pub sealer_operator: Option<String>,
    pub film_name: Option<String>,

    // ===== 技术参数与封口检查 =====
    pub machine_parameters: MachineParameters,
    pub sealing_checks: SealingChecks,

    // ===== 证据 =====
    pub evidence_reference: Option<String>,
}

// ==========================================
// LotConfiguration - 已校验的批次配置
// ==========================================
// 不变式: lower_limit < nominal_weight < upper_limit
// 只能经由 engine::limit_validator 构造
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LotConfiguration {
    pub lot: String,
    pub product: String,
    pub nominal_weight: f64, // 标称重量 (g)
    pub lower_limit: f64,    // 下控制限 (g)
    pub upper_limit: f64,    // 上控制限 (g)

    pub supplier: Option<String>,
    pub machine_operator: Option<String>,
    pub sealer_operator: Option<String>,
    pub film_name: Option<String>,

    pub material_lot_id: String, // 原料批号（追溯）
    pub film_lot_id: String,     // 膜卷批号（追溯）

    pub machine_parameters: MachineParameters,
    pub sealing_checks: SealingChecks,

    pub evidence_reference: Option<String>, // 外部存储文件的不透明引用
}

impl LotConfiguration {
    pub fn limits(&self) -> ControlLimits {
        ControlLimits::new(self.lower_limit, self.upper_limit)
    }

    /// 封口有偏差但没有证据照片
    pub fn lacks_recommended_evidence(&self) -> bool {
        !self.sealing_checks.all_passed() && self.evidence_reference.is_none()
    }
}
