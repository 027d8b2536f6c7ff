// ==========================================
// 包装线称重控制 - API 数据传输对象
// ==========================================
// 报表投影器只消费这些结构，不含业务逻辑
// ==========================================

use crate::domain::control_record::{ControlRecord, LotStatistics};
use crate::domain::lot::{LotConfiguration, MachineParameters};
use crate::domain::types::{Conformance, FinalStatus, SealingCheck};
use crate::engine::classifier::classify_reading;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// 历史列表过滤条件
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ControlFilter {
    /// 批号/产品/责任人 子串（不区分大小写）
    pub text: String,
}

impl ControlFilter {
    pub fn text(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// 提交结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitControlResponse {
    pub control_id: i64,
    pub final_status: FinalStatus,
    pub statistics: LotStatistics,
    /// 封口偏差无证据、带缺失提交等提示
    pub warnings: Vec<String>,
}

/// 明细中的单个样本
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleRow {
    pub index: u32,
    pub weight: Option<f64>,
    pub conformance: Conformance,
}

/// 控制记录明细（统计视图 + 报表）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlDetailView {
    pub control_id: i64,
    pub lot_configuration: LotConfiguration,
    pub samples: Vec<SampleRow>,
    pub statistics: LotStatistics,
    /// 展示用均值（2 位小数）
    pub mean_display: f64,
    pub final_status: FinalStatus,
    pub failed_sealing_checks: Vec<SealingCheck>,
    pub machine_parameters: MachineParameters,
    pub evidence_reference: Option<String>,
    pub created_at: NaiveDateTime,
    pub responsible: String,
}

impl From<ControlRecord> for ControlDetailView {
    fn from(record: ControlRecord) -> Self {
        let limits = record.lot_configuration.limits();
        let samples = record
            .samples
            .iter()
            .map(|s| SampleRow {
                index: s.index,
                weight: s.weight,
                conformance: classify_reading(s, &limits),
            })
            .collect();

        Self {
            control_id: record.control_id,
            samples,
            statistics: record.statistics,
            mean_display: record.statistics.rounded_mean(),
            final_status: record.final_status,
            failed_sealing_checks: record.lot_configuration.sealing_checks.failed_checks(),
            machine_parameters: record.lot_configuration.machine_parameters,
            evidence_reference: record.lot_configuration.evidence_reference.clone(),
            created_at: record.created_at,
            responsible: record.responsible,
            lot_configuration: record.lot_configuration,
        }
    }
}
