// ==========================================
// 包装线称重控制 - 领域层
// ==========================================
// 职责: 批次配置、样本、控制记录及其派生规则
// 红线: 领域对象不访问数据库
// ==========================================

pub mod control_record;
pub mod lot;
pub mod sample;
pub mod types;

// 重导出核心实体
pub use control_record::{
    ControlRecord, ControlSubmission, ControlSummary, EvidenceAttachment, EvidenceFile,
    LotStatistics,
};
pub use lot::{
    ControlLimits, LotConfiguration, LotConfigurationInput, MachineParameters, SealingChecks,
};
pub use sample::{empty_sample_set, SampleReading, DEFAULT_SAMPLE_SIZE, MAX_SAMPLE_SIZE};
pub use types::{Conformance, FinalStatus, IncompleteSamplePolicy, SealingCheck};
