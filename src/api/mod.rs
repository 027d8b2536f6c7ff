// ==========================================
// 包装线称重控制 - API 层
// ==========================================
// 职责: 提供业务 API 接口,供界面层/报表投影器调用
// ==========================================

pub mod dto;
pub mod error;
pub mod weight_control_api;

// 重导出核心类型
pub use dto::{ControlDetailView, ControlFilter, SampleRow, SubmitControlResponse};
pub use error::{ApiError, ApiResult};
pub use weight_control_api::WeightControlApi;
