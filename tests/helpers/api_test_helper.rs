// ==========================================
// API集成测试辅助工具
// ==========================================
// 职责: 提供API层集成测试的通用辅助函数
// ==========================================

#[path = "../test_helpers.rs"]
mod test_helpers;

use std::sync::Arc;
use tempfile::NamedTempFile;

use packaging_weight_control::api::WeightControlApi;
use packaging_weight_control::config::{ConfigManager, WeightControlSettings};
use packaging_weight_control::engine::SamplingSession;
use packaging_weight_control::repository::SqliteControlRecordStore;

// ==========================================
// API测试环境
// ==========================================

pub struct ApiTestEnv {
    pub db_path: String,
    pub api: Arc<WeightControlApi>,
    pub store: Arc<SqliteControlRecordStore>,
    pub config_manager: Arc<ConfigManager>,

    // 临时文件（确保生命周期）
    _temp_file: NamedTempFile,
}

impl ApiTestEnv {
    /// 默认参数（50 个样本，未称重计不合格）
    pub fn new() -> Result<Self, String> {
        Self::with_settings(WeightControlSettings::default())
    }

    pub fn with_settings(settings: WeightControlSettings) -> Result<Self, String> {
        let (temp_file, db_path) = test_helpers::create_test_db()
            .map_err(|e| format!("创建测试数据库失败: {}", e))?;

        let store = Arc::new(
            SqliteControlRecordStore::new(&db_path)
                .map_err(|e| format!("无法创建SqliteControlRecordStore: {}", e))?,
        );
        let config_manager = Arc::new(
            ConfigManager::new(&db_path).map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );
        let api = Arc::new(WeightControlApi::new(store.clone(), settings));

        Ok(Self {
            db_path,
            api,
            store,
            config_manager,
            _temp_file: temp_file,
        })
    }

    pub fn count_rows(&self, table: &str) -> i64 {
        test_helpers::count_rows(&self.db_path, table)
    }
}

/// 按顺序从序号 1 开始录入重量
pub fn fill_session(session: &mut SamplingSession, weights: &[f64]) {
    for (i, w) in weights.iter().enumerate() {
        session
            .set_weight(i as u32 + 1, Some(*w))
            .expect("录入重量失败");
    }
}
