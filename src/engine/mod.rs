// ==========================================
// 包装线称重控制 - 引擎层
// ==========================================
// 职责: 控制限校验、样本判定、批次汇总、控制记录构建
// 红线: Engine 不拼 SQL，全部为纯计算
// ==========================================

pub mod aggregator;
pub mod classifier;
pub mod error;
pub mod limit_validator;
pub mod record_builder;
pub mod sampling_session;

// 重导出核心引擎
pub use aggregator::LotAggregator;
pub use classifier::{classify, classify_reading};
pub use error::{
    EmptySampleSetError, IncompleteSampleWarning, LimitViolation, SessionError, ValidationError,
};
pub use limit_validator::{validate_limits, LimitValidator};
pub use record_builder::ControlRecordBuilder;
pub use sampling_session::SamplingSession;
