// ==========================================
// 包装线称重控制 - 抽样会话
// ==========================================
// 职责: 持有一次称重控制的草稿状态（已校验配置 + N 个样本）
// 生命周期: 会话内有效；放弃即丢弃，不会落库任何中间状态
// 提交失败时会话保持不变，操作员无需重新录入
// ==========================================

use crate::domain::control_record::LotStatistics;
use crate::domain::lot::LotConfiguration;
use crate::domain::sample::{empty_sample_set, SampleReading};
use crate::domain::types::Conformance;
use crate::engine::aggregator::LotAggregator;
use crate::engine::classifier::classify_reading;
use crate::engine::error::SessionError;

// ==========================================
// SamplingSession - 抽样会话
// ==========================================
#[derive(Debug, Clone)]
pub struct SamplingSession {
    config: LotConfiguration,
    samples: Vec<SampleReading>,
}

impl SamplingSession {
    /// 以已校验的配置开启会话，创建 sample_size 个空样本
    pub fn new(config: LotConfiguration, sample_size: usize) -> Self {
        Self {
            config,
            samples: empty_sample_set(sample_size),
        }
    }

    pub fn configuration(&self) -> &LotConfiguration {
        &self.config
    }

    pub fn readings(&self) -> &[SampleReading] {
        &self.samples
    }

    pub fn sample_size(&self) -> usize {
        self.samples.len()
    }

    /// 录入/修改一个样本重量，返回实时判定结果
    ///
    /// # 参数
    /// - index: 样本序号（1 起）
    /// - weight: None 表示清空
    pub fn set_weight(
        &mut self,
        index: u32,
        weight: Option<f64>,
    ) -> Result<Conformance, SessionError> {
        if let Some(w) = weight {
            if !w.is_finite() || w < 0.0 {
                return Err(SessionError::InvalidWeight { index, value: w });
            }
        }

        let limits = self.config.limits();
        let slot = self.slot_mut(index)?;
        slot.weight = weight;
        Ok(classify_reading(slot, &limits))
    }

    /// 清空一个样本
    pub fn clear_weight(&mut self, index: u32) -> Result<(), SessionError> {
        self.slot_mut(index)?.weight = None;
        Ok(())
    }

    /// 查询单个样本的实时判定
    pub fn conformance(&self, index: u32) -> Result<Conformance, SessionError> {
        let pos = self.position(index)?;
        Ok(classify_reading(&self.samples[pos], &self.config.limits()))
    }

    /// 实时汇总（容忍未录完）
    pub fn statistics(&self) -> LotStatistics {
        LotAggregator::new().aggregate(&self.samples, &self.config.limits())
    }

    pub fn missing_count(&self) -> usize {
        self.samples.iter().filter(|s| !s.is_measured()).count()
    }

    pub fn is_complete(&self) -> bool {
        self.missing_count() == 0
    }

    fn position(&self, index: u32) -> Result<usize, SessionError> {
        let size = self.samples.len();
        if index == 0 || index as usize > size {
            return Err(SessionError::IndexOutOfRange { index, size });
        }
        Ok(index as usize - 1)
    }

    fn slot_mut(&mut self, index: u32) -> Result<&mut SampleReading, SessionError> {
        let pos = self.position(index)?;
        Ok(&mut self.samples[pos])
    }
}
