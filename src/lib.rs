// ==========================================
// 包装线称重控制 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 在线称重抽样判定 + 可审计控制记录
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 业务规则
pub mod engine;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{Conformance, FinalStatus, IncompleteSamplePolicy, SealingCheck};

// 领域实体
pub use domain::{
    ControlRecord, ControlSummary, EvidenceAttachment, EvidenceFile, LotConfiguration,
    LotConfigurationInput, LotStatistics, SampleReading,
};

// 引擎
pub use engine::{
    classify, validate_limits, ControlRecordBuilder, LotAggregator, SamplingSession,
};

// API
pub use api::{ApiError, ApiResult, WeightControlApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "包装线称重控制";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
