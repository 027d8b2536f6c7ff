// ==========================================
// 包装线称重控制 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::WeightControlApi;
use crate::config::config_manager::ConfigManager;
use crate::db::{ensure_schema, open_sqlite_connection};
use crate::repository::SqliteControlRecordStore;

/// 应用状态
///
/// 包含API实例和共享资源（单个 SQLite 连接）
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 称重控制API
    pub weight_control_api: Arc<WeightControlApi>,

    /// 配置管理器
    pub config_manager: Arc<ConfigManager>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    ///
    /// # 返回
    /// - Ok(AppState): 应用状态实例
    /// - Err(String): 初始化错误
    ///
    /// # 说明
    /// 该方法会：
    /// 1. 打开数据库并建表（幂等）
    /// 2. 读取称重控制配置
    /// 3. 创建Repository与API实例
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = open_sqlite_connection(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        ensure_schema(&conn).map_err(|e| format!("数据库建表失败: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        let config_manager = Arc::new(
            ConfigManager::from_connection(conn.clone())
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );
        let settings = config_manager
            .load_settings()
            .map_err(|e| format!("读取称重控制配置失败: {}", e))?;
        tracing::info!(
            sample_size = settings.sample_size,
            policy = %settings.incomplete_sample_policy,
            evidence_max_bytes = settings.evidence_max_bytes,
            "称重控制配置已加载"
        );

        let store = Arc::new(SqliteControlRecordStore::from_connection(conn));
        let weight_control_api = Arc::new(WeightControlApi::new(store, settings));

        tracing::info!("AppState初始化完成");
        Ok(Self {
            db_path,
            weight_control_api,
            config_manager,
        })
    }
}

/// 获取默认数据库路径
///
/// 优先级: WEIGHT_CONTROL_DB_PATH 环境变量 → 用户数据目录 → 当前目录
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var("WEIGHT_CONTROL_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./weight_control.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("packaging-weight-control");
        // 目录创建失败时退回当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("weight_control.db");
        }
    }

    path.to_string_lossy().to_string()
}
