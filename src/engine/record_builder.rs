// ==========================================
// 包装线称重控制 - 控制记录构建器
// ==========================================
// 职责: 组装批次配置 + 样本 + 统计 + 处置 为待落库记录
// 前置条件: 批次配置已通过 LimitValidator（此处不重复校验）
// 红线: 不合格数 > 0 即判退
// 副作用: 无（持久化由调用方委托给存储层）
// ==========================================

use crate::domain::control_record::{ControlSubmission, EvidenceAttachment};
use crate::domain::lot::LotConfiguration;
use crate::domain::sample::SampleReading;
use crate::domain::types::{FinalStatus, IncompleteSamplePolicy};
use crate::engine::aggregator::LotAggregator;
use crate::engine::error::{EmptySampleSetError, IncompleteSampleWarning};
use chrono::NaiveDateTime;
use tracing::instrument;

// ==========================================
// ControlRecordBuilder - 控制记录构建器
// ==========================================
pub struct ControlRecordBuilder {
    aggregator: LotAggregator,
    policy: IncompleteSamplePolicy,
}

impl ControlRecordBuilder {
    /// 创建构建器
    ///
    /// # 参数
    /// - policy: 未称重样本的定稿策略
    pub fn new(policy: IncompleteSamplePolicy) -> Self {
        Self {
            aggregator: LotAggregator::new(),
            policy,
        }
    }

    pub fn policy(&self) -> IncompleteSamplePolicy {
        self.policy
    }

    /// 提交前完整性闸门
    ///
    /// # 返回
    /// - Ok(missing): 样本已录完，或操作员已确认带缺失提交
    /// - Err(IncompleteSampleWarning): 有缺失且未确认
    pub fn check_completeness(
        samples: &[SampleReading],
        confirm_incomplete: bool,
    ) -> Result<usize, IncompleteSampleWarning> {
        let missing = samples.iter().filter(|s| !s.is_measured()).count();
        if missing > 0 && !confirm_incomplete {
            return Err(IncompleteSampleWarning {
                missing,
                total: samples.len(),
            });
        }
        Ok(missing)
    }

    /// 按策略定稿样本
    ///
    /// - CoerceZero: 未称重 → 0.0（按实测值写入）
    /// - UnmeasuredNonConforming: 保持为空
    pub fn finalize_samples(&self, samples: &[SampleReading]) -> Vec<SampleReading> {
        samples
            .iter()
            .map(|s| match (self.policy, s.weight) {
                (IncompleteSamplePolicy::CoerceZero, None) => SampleReading::measured(s.index, 0.0),
                _ => *s,
            })
            .collect()
    }

    /// 构建待落库的控制记录
    ///
    /// 统计基于定稿后的样本集计算；UnmeasuredNonConforming 策略下
    /// 未称重样本并入不合格数，因此不完整的批次一定判退
    ///
    /// # 返回
    /// - Err(EmptySampleSetError): 样本集为空（没有任何样本不能放行）
    #[instrument(skip_all, fields(lot = %config.lot, count = samples.len(), policy = %self.policy))]
    pub fn build(
        &self,
        config: &LotConfiguration,
        samples: &[SampleReading],
        responsible: &str,
        created_at: NaiveDateTime,
        evidence: Option<EvidenceAttachment>,
    ) -> Result<ControlSubmission, EmptySampleSetError> {
        if samples.is_empty() {
            return Err(EmptySampleSetError);
        }

        let finalized = self.finalize_samples(samples);
        let statistics = self
            .aggregator
            .aggregate(&finalized, &config.limits())
            .with_unmeasured_as_non_conforming();

        let final_status = if statistics.non_conforming_count > 0 {
            FinalStatus::Rejected
        } else {
            FinalStatus::Approved
        };

        Ok(ControlSubmission {
            lot_configuration: config.clone(),
            samples: finalized,
            statistics,
            final_status,
            created_at,
            responsible: responsible.trim().to_string(),
            evidence,
        })
    }
}

impl Default for ControlRecordBuilder {
    fn default() -> Self {
        Self::new(IncompleteSamplePolicy::default())
    }
}
