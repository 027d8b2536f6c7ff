// ==========================================
// 包装线称重控制 - 控制记录领域模型
// ==========================================
// 红线: 控制记录只增不改（追加式审计）
// 不变式: final_status = Approved 当且仅当所有样本合格
// ==========================================

use crate::domain::lot::LotConfiguration;
use crate::domain::sample::SampleReading;
use crate::domain::types::FinalStatus;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// LotStatistics - 批次汇总统计
// ==========================================
// mean 保留全精度，展示时四舍五入到 2 位小数
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LotStatistics {
    pub total_entered: usize,        // 已称重样本数
    pub mean: f64,                   // 均值 (g)，无样本时为 0
    pub min: f64,                    // 最小值 (g)，无样本时为 0
    pub max: f64,                    // 最大值 (g)，无样本时为 0
    pub conforming_count: usize,     // 合格数
    pub non_conforming_count: usize, // 不合格数
    pub unmeasured_count: usize,     // 未称重数
}

impl LotStatistics {
    /// 展示用均值（2 位小数）
    pub fn rounded_mean(&self) -> f64 {
        (self.mean * 100.0).round() / 100.0
    }

    /// 未称重样本并入不合格数（用于定稿记录）
    pub fn with_unmeasured_as_non_conforming(mut self) -> Self {
        self.non_conforming_count += self.unmeasured_count;
        self
    }
}

// ==========================================
// EvidenceAttachment - 随提交上传的证据文件
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceAttachment {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

// ==========================================
// EvidenceFile - 读取出的证据文件
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceFile {
    pub reference: String,
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

// ==========================================
// ControlSubmission - 待落库的控制记录
// ==========================================
// 由 ControlRecordBuilder 生成，control_id 由存储层分配
#[derive(Debug, Clone, PartialEq)]
pub struct ControlSubmission {
    pub lot_configuration: LotConfiguration,
    pub samples: Vec<SampleReading>,
    pub statistics: LotStatistics,
    pub final_status: FinalStatus,
    pub created_at: NaiveDateTime,
    pub responsible: String,
    pub evidence: Option<EvidenceAttachment>,
}

// ==========================================
// ControlRecord - 已落库的控制记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlRecord {
    pub control_id: i64,
    pub lot_configuration: LotConfiguration,
    pub samples: Vec<SampleReading>,
    pub statistics: LotStatistics,
    pub final_status: FinalStatus,
    pub created_at: NaiveDateTime,
    pub responsible: String,
}

impl ControlRecord {
    pub fn summary(&self) -> ControlSummary {
        ControlSummary {
            control_id: self.control_id,
            lot: self.lot_configuration.lot.clone(),
            product: self.lot_configuration.product.clone(),
            created_at: self.created_at,
            nominal_weight: self.lot_configuration.nominal_weight,
            final_status: self.final_status,
            responsible: self.responsible.clone(),
        }
    }
}

// ==========================================
// ControlSummary - 历史列表摘要
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlSummary {
    pub control_id: i64,
    pub lot: String,
    pub product: String,
    pub created_at: NaiveDateTime,
    pub nominal_weight: f64,
    pub final_status: FinalStatus,
    pub responsible: String,
}

impl ControlSummary {
    /// 批号/产品/责任人 不区分大小写的子串匹配
    ///
    /// 空白过滤条件匹配全部
    pub fn matches_text(&self, text: &str) -> bool {
        let needle = text.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.lot.to_lowercase().contains(&needle)
            || self.product.to_lowercase().contains(&needle)
            || self.responsible.to_lowercase().contains(&needle)
    }
}
