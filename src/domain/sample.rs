// ==========================================
// 包装线称重控制 - 样本领域模型
// ==========================================
// weight = None 表示"尚未称重"，与实测 0 克区分
// ==========================================

use crate::domain::lot::ControlLimits;
use serde::{Deserialize, Serialize};

/// 每批固定抽样数
pub const DEFAULT_SAMPLE_SIZE: usize = 50;

/// 可配置抽样数上限
pub const MAX_SAMPLE_SIZE: usize = 1000;

// ==========================================
// SampleReading - 单个包装的称重读数
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleReading {
    pub index: u32,          // 样本序号 (1..N)
    pub weight: Option<f64>, // 重量 (g)
}

impl SampleReading {
    pub fn empty(index: u32) -> Self {
        Self { index, weight: None }
    }

    pub fn measured(index: u32, weight: f64) -> Self {
        Self {
            index,
            weight: Some(weight),
        }
    }

    pub fn is_measured(&self) -> bool {
        self.weight.is_some()
    }

    /// 派生字段: 已称重且落在控制限内
    pub fn is_conforming(&self, limits: &ControlLimits) -> bool {
        self.weight.map_or(false, |w| limits.contains(w))
    }
}

/// 创建 n 个空样本（序号从 1 开始，n 超过 MAX_SAMPLE_SIZE 时截断为上限）
pub fn empty_sample_set(n: usize) -> Vec<SampleReading> {
    let n = u32::try_from(n.min(MAX_SAMPLE_SIZE)).unwrap_or(0);
    (1..=n).map(SampleReading::empty).collect()
}
