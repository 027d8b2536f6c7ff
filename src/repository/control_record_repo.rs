// ==========================================
// 包装线称重控制 - 控制记录 Repository Trait
// ==========================================
// 职责: 定义控制记录的存储接口（追加式，不提供修改/删除）
// 红线: Repository 不含业务规则，只做数据读写
// 实现者: SqliteControlRecordStore（使用 rusqlite）
// ==========================================

use crate::domain::control_record::{
    ControlRecord, ControlSubmission, ControlSummary, EvidenceFile,
};
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;

// ==========================================
// ControlRecordStore Trait
// ==========================================
#[async_trait]
pub trait ControlRecordStore: Send + Sync {
    /// 原子写入一条控制记录（含全部样本与可选证据）
    ///
    /// # 返回
    /// - Ok(control_id): 存储层分配的记录ID
    /// - Err: 数据库错误（整个事务回滚，不留部分记录）
    async fn insert(&self, submission: &ControlSubmission) -> RepositoryResult<i64>;

    /// 按ID读取完整记录
    async fn find_by_id(&self, control_id: i64) -> RepositoryResult<Option<ControlRecord>>;

    /// 读取全部记录摘要（按创建时间倒序）
    async fn list_all(&self) -> RepositoryResult<Vec<ControlSummary>>;

    /// 按引用读取证据文件
    async fn load_evidence(&self, reference: &str) -> RepositoryResult<Option<EvidenceFile>>;
}
