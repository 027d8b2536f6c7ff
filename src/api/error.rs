// ==========================================
// 包装线称重控制 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，转换引擎/Repository错误为用户可读的错误消息
// 约定: 所有错误同步返回，由操作员确认后继续；无后台重试
// ==========================================

use crate::engine::error::{
    EmptySampleSetError, IncompleteSampleWarning, SessionError, ValidationError,
};
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 配置校验错误（ValidationError 家族）
    // ==========================================
    #[error("必填字段缺失: {0}")]
    MissingField(String),

    #[error("字段值无效: {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("控制限顺序错误: {0}")]
    LimitOrder(String),

    // ==========================================
    // 提交闸门
    // ==========================================
    /// 可确认的提交条件，不是硬错误
    #[error("样本未录完: 缺少 {missing}/{total}，需确认后提交")]
    IncompleteSamples { missing: usize, total: usize },

    // ==========================================
    // 数据访问错误
    // ==========================================
    /// 可重试；抽样会话保持不变
    #[error("持久化失败: {0}")]
    PersistenceError(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    /// 操作员可直接重试（会话状态仍在）
    pub fn is_retryable(&self) -> bool {
        matches!(self, ApiError::PersistenceError(_))
    }

    /// 需要操作员显式确认后重新提交
    pub fn requires_confirmation(&self) -> bool {
        matches!(self, ApiError::IncompleteSamples { .. })
    }
}

// ==========================================
// 从引擎错误转换
// ==========================================
impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::MissingField { field } => ApiError::MissingField(field.to_string()),
            ValidationError::InvalidValue { field, message } => ApiError::InvalidValue {
                field: field.to_string(),
                message,
            },
            order @ ValidationError::LimitOrder { .. } => ApiError::LimitOrder(order.to_string()),
        }
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        ApiError::InvalidInput(err.to_string())
    }
}

impl From<EmptySampleSetError> for ApiError {
    fn from(err: EmptySampleSetError) -> Self {
        ApiError::InvalidInput(err.to_string())
    }
}

impl From<IncompleteSampleWarning> for ApiError {
    fn from(w: IncompleteSampleWarning) -> Self {
        ApiError::IncompleteSamples {
            missing: w.missing,
            total: w.total,
        }
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::FieldValueError { field, message } => {
                ApiError::InternalError(format!("存储字段{}损坏: {}", field, message))
            }
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
            other => ApiError::PersistenceError(other.to_string()),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
