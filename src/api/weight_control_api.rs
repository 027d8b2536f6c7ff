// ==========================================
// 包装线称重控制 - 称重控制 API
// ==========================================
// 职责: 开启抽样会话、提交控制记录、历史查询、证据读取
// 流程: 配置 → 控制限校验(闸门) → 逐个称重(实时判定) → 提交(原子落库)
// 红线: 历史记录只读，无修改/删除入口
// ==========================================

use std::sync::Arc;

use chrono::Utc;

use crate::api::dto::{ControlDetailView, ControlFilter, SubmitControlResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::config::config_manager::WeightControlSettings;
use crate::domain::control_record::{ControlSummary, EvidenceAttachment, EvidenceFile};
use crate::domain::lot::LotConfigurationInput;
use crate::domain::sample::{DEFAULT_SAMPLE_SIZE, MAX_SAMPLE_SIZE};
use crate::domain::types::Conformance;
use crate::engine::limit_validator::LimitValidator;
use crate::engine::record_builder::ControlRecordBuilder;
use crate::engine::sampling_session::SamplingSession;
use crate::repository::control_record_repo::ControlRecordStore;

// ==========================================
// WeightControlApi - 称重控制 API
// ==========================================

/// 称重控制API
///
/// 职责：
/// 1. 控制限校验并开启抽样会话
/// 2. 完整性确认 + 构建记录 + 原子提交
/// 3. 历史列表（本地过滤）与明细查询
/// 4. 证据文件读取
pub struct WeightControlApi {
    store: Arc<dyn ControlRecordStore>,
    builder: ControlRecordBuilder,
    settings: WeightControlSettings,
}

impl WeightControlApi {
    /// 创建新的WeightControlApi实例
    ///
    /// sample_size 超出 1..=MAX_SAMPLE_SIZE 时回退默认值
    pub fn new(store: Arc<dyn ControlRecordStore>, mut settings: WeightControlSettings) -> Self {
        if !(1..=MAX_SAMPLE_SIZE).contains(&settings.sample_size) {
            tracing::warn!(
                sample_size = settings.sample_size,
                max = MAX_SAMPLE_SIZE,
                "抽样数超出范围，使用默认值 {}",
                DEFAULT_SAMPLE_SIZE
            );
            settings.sample_size = DEFAULT_SAMPLE_SIZE;
        }
        Self {
            store,
            builder: ControlRecordBuilder::new(settings.incomplete_sample_policy),
            settings,
        }
    }

    pub fn settings(&self) -> &WeightControlSettings {
        &self.settings
    }

    /// 校验批次配置并开启抽样会话
    ///
    /// # 返回
    /// - Ok(SamplingSession): 含 sample_size 个空样本的会话
    /// - Err(ApiError::MissingField / InvalidValue / LimitOrder): 配置不合法，不能进入抽样
    pub fn start_session(&self, input: &LotConfigurationInput) -> ApiResult<SamplingSession> {
        let config = LimitValidator::into_configuration(input.clone()).map_err(|e| {
            tracing::info!(lot = %input.lot, error = %e, "批次配置校验未通过");
            ApiError::from(e)
        })?;

        tracing::info!(
            lot = %config.lot,
            product = %config.product,
            nominal = config.nominal_weight,
            lower = config.lower_limit,
            upper = config.upper_limit,
            sample_size = self.settings.sample_size,
            "开启抽样会话"
        );
        Ok(SamplingSession::new(config, self.settings.sample_size))
    }

    /// 录入一个样本重量，返回实时判定
    ///
    /// # 参数
    /// - index: 样本序号（1 起）
    /// - weight: None 表示清空
    pub fn record_weight(
        &self,
        session: &mut SamplingSession,
        index: u32,
        weight: Option<f64>,
    ) -> ApiResult<Conformance> {
        Ok(session.set_weight(index, weight)?)
    }

    /// 提交控制记录
    ///
    /// # 参数
    /// - session: 抽样会话（只读借用，失败后可原样重试）
    /// - responsible: 责任人（由认证层提供；空白视为未认证，拒绝提交）
    /// - evidence: 随提交上传的证据文件
    /// - confirm_incomplete: 操作员已确认带缺失样本提交
    ///
    /// # 返回
    /// - Ok(SubmitControlResponse): 存储分配的 control_id 及处置结果
    /// - Err(ApiError::InvalidInput): 责任人为空、证据不合法或样本集为空
    /// - Err(ApiError::IncompleteSamples): 有缺失且未确认
    /// - Err(ApiError::PersistenceError): 落库失败，可重试
    pub async fn submit(
        &self,
        session: &SamplingSession,
        responsible: &str,
        evidence: Option<EvidenceAttachment>,
        confirm_incomplete: bool,
    ) -> ApiResult<SubmitControlResponse> {
        if responsible.trim().is_empty() {
            return Err(ApiError::InvalidInput("责任人不能为空".to_string()));
        }
        if let Some(attachment) = &evidence {
            self.check_evidence(attachment)?;
        }

        let config = session.configuration();
        let missing = ControlRecordBuilder::check_completeness(session.readings(), confirm_incomplete)?;

        let mut warnings = Vec::new();
        if missing > 0 {
            tracing::warn!(
                lot = %config.lot,
                missing,
                total = session.sample_size(),
                policy = %self.builder.policy(),
                "操作员确认带缺失样本提交"
            );
            warnings.push(format!(
                "{}/{} 个样本未称重，按 {} 策略定稿",
                missing,
                session.sample_size(),
                self.builder.policy()
            ));
        }

        // 附带文件优先，配置中的外部引用不再保存
        if let (Some(attachment), Some(external)) = (&evidence, &config.evidence_reference) {
            tracing::warn!(
                lot = %config.lot,
                external = %external,
                file_name = %attachment.file_name,
                "同时提供证据文件与外部引用，以上传文件为准"
            );
            warnings.push(format!(
                "外部证据引用 {} 已被上传文件 {} 取代",
                external, attachment.file_name
            ));
        }

        if config.lacks_recommended_evidence() && evidence.is_none() {
            let failed: Vec<String> = config
                .sealing_checks
                .failed_checks()
                .iter()
                .map(|c| c.to_string())
                .collect();
            tracing::warn!(lot = %config.lot, failed = ?failed, "封口检查有偏差但未附证据");
            warnings.push(format!("封口检查未通过且无证据: {}", failed.join(", ")));
        }

        let submission = self.builder.build(
            config,
            session.readings(),
            responsible,
            Utc::now().naive_utc(),
            evidence,
        )?;

        let control_id = self.store.insert(&submission).await.map_err(|e| {
            tracing::error!(lot = %config.lot, error = %e, "控制记录落库失败");
            ApiError::from(e)
        })?;

        tracing::info!(
            control_id,
            lot = %config.lot,
            final_status = %submission.final_status,
            conforming = submission.statistics.conforming_count,
            non_conforming = submission.statistics.non_conforming_count,
            "控制记录已保存"
        );

        Ok(SubmitControlResponse {
            control_id,
            final_status: submission.final_status,
            statistics: submission.statistics,
            warnings,
        })
    }

    /// 查询历史控制记录（摘要，最新在前）
    ///
    /// # 参数
    /// - filter: 文本过滤，在完整结果集上本地匹配
    pub async fn list_controls(
        &self,
        filter: Option<&ControlFilter>,
    ) -> ApiResult<Vec<ControlSummary>> {
        let summaries = self.store.list_all().await?;
        Ok(match filter {
            Some(f) => summaries
                .into_iter()
                .filter(|s| s.matches_text(&f.text))
                .collect(),
            None => summaries,
        })
    }

    /// 查询控制记录明细
    ///
    /// # 返回
    /// - Err(ApiError::NotFound): control_id 不存在
    pub async fn get_control_detail(&self, control_id: i64) -> ApiResult<ControlDetailView> {
        let record = self
            .store
            .find_by_id(control_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("控制记录(id={})不存在", control_id)))?;
        Ok(ControlDetailView::from(record))
    }

    /// 按引用读取证据文件
    pub async fn get_evidence(&self, reference: &str) -> ApiResult<EvidenceFile> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(ApiError::InvalidInput("证据引用不能为空".to_string()));
        }
        self.store
            .load_evidence(reference)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("证据(reference={})不存在", reference)))
    }

    fn check_evidence(&self, attachment: &EvidenceAttachment) -> ApiResult<()> {
        if attachment.file_name.trim().is_empty() {
            return Err(ApiError::InvalidInput("证据文件名不能为空".to_string()));
        }
        if attachment.bytes.is_empty() {
            return Err(ApiError::InvalidInput("证据文件为空".to_string()));
        }
        if attachment.bytes.len() > self.settings.evidence_max_bytes {
            return Err(ApiError::InvalidInput(format!(
                "证据文件过大: {} 字节，上限 {} 字节",
                attachment.bytes.len(),
                self.settings.evidence_max_bytes
            )));
        }
        Ok(())
    }
}
