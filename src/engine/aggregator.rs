// ==========================================
// 包装线称重控制 - 批次汇总
// ==========================================
// 职责: 将样本集折叠为汇总统计
// 口径: 均值/最小/最大只统计已称重样本；无样本时均为 0（不产生 NaN）
// 调用: 每次样本变化同步重算，O(N)
// ==========================================

use crate::domain::control_record::LotStatistics;
use crate::domain::lot::ControlLimits;
use crate::domain::sample::SampleReading;
use crate::domain::types::Conformance;
use crate::engine::classifier::classify_reading;
use tracing::instrument;

// ==========================================
// LotAggregator - 批次汇总器
// ==========================================
pub struct LotAggregator;

impl LotAggregator {
    pub fn new() -> Self {
        Self
    }

    /// 汇总样本集
    ///
    /// 未称重样本只计入 unmeasured_count，不计入合格/不合格数
    #[instrument(skip(self, samples), fields(count = samples.len()))]
    pub fn aggregate(&self, samples: &[SampleReading], limits: &ControlLimits) -> LotStatistics {
        let mut stats = LotStatistics::default();
        let mut sum = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;

        for reading in samples {
            match classify_reading(reading, limits) {
                Conformance::Unset => {
                    stats.unmeasured_count += 1;
                    continue;
                }
                Conformance::Conforming => stats.conforming_count += 1,
                Conformance::NonConforming => stats.non_conforming_count += 1,
            }

            if let Some(w) = reading.weight {
                stats.total_entered += 1;
                sum += w;
                min = min.min(w);
                max = max.max(w);
            }
        }

        if stats.total_entered > 0 {
            stats.mean = sum / stats.total_entered as f64;
            stats.min = min;
            stats.max = max;
        }

        stats
    }
}

impl Default for LotAggregator {
    fn default() -> Self {
        Self::new()
    }
}
