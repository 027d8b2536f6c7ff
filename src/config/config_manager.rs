// ==========================================
// 包装线称重控制 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写
// 存储: config_kv 表 (key-value + scope)
// 缺失或格式错误的配置值回退默认值并记录告警
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::sample::{DEFAULT_SAMPLE_SIZE, MAX_SAMPLE_SIZE};
use crate::domain::types::IncompleteSamplePolicy;
use rusqlite::{params, Connection};
use serde_json::json;
use std::collections::BTreeMap;
use std::error::Error;
use std::sync::{Arc, Mutex};

/// 证据文件默认大小上限（10 MiB）
pub const DEFAULT_EVIDENCE_MAX_BYTES: usize = 10 * 1024 * 1024;

// ==========================================
// WeightControlSettings - 称重控制运行参数
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeightControlSettings {
    pub sample_size: usize,
    pub incomplete_sample_policy: IncompleteSamplePolicy,
    pub evidence_max_bytes: usize,
}

impl Default for WeightControlSettings {
    fn default() -> Self {
        Self {
            sample_size: DEFAULT_SAMPLE_SIZE,
            incomplete_sample_policy: IncompleteSamplePolicy::default(),
            evidence_max_bytes: DEFAULT_EVIDENCE_MAX_BYTES,
        }
    }
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 读取 global scope 的配置值（公开方法，供其他模块复用）
    pub fn get_global_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        self.get_config_value(key)
    }

    /// 写入 global scope 配置（存在则覆盖）
    pub fn set_global_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let key = key.trim();
        if key.is_empty() {
            return Err("配置键不能为空".into());
        }

        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        tracing::info!(config_key = key, value, "配置已更新");
        Ok(())
    }

    /// 获取所有 global 配置的快照（JSON格式，按键排序）
    pub fn get_config_snapshot(&self) -> Result<String, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;

        let mut config_map: BTreeMap<String, String> = BTreeMap::new();
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;
        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        Ok(serde_json::to_string(&json!(config_map))?)
    }

    // ===== 称重控制参数 =====

    /// 每批抽样数（默认 50；超出 1..=MAX_SAMPLE_SIZE 或非整数回退默认值）
    pub fn sample_size(&self) -> Result<usize, Box<dyn Error>> {
        let raw = match self.get_config_value(config_keys::SAMPLE_SIZE)? {
            Some(v) => v,
            None => return Ok(DEFAULT_SAMPLE_SIZE),
        };
        match raw.trim().parse::<usize>() {
            Ok(n) if (1..=MAX_SAMPLE_SIZE).contains(&n) => Ok(n),
            _ => {
                tracing::warn!(
                    config_key = config_keys::SAMPLE_SIZE,
                    raw_value = %raw,
                    max = MAX_SAMPLE_SIZE,
                    "抽样数配置无效，使用默认值 {}",
                    DEFAULT_SAMPLE_SIZE
                );
                Ok(DEFAULT_SAMPLE_SIZE)
            }
        }
    }

    /// 未称重样本的定稿策略
    pub fn incomplete_sample_policy(&self) -> Result<IncompleteSamplePolicy, Box<dyn Error>> {
        let raw = match self.get_config_value(config_keys::INCOMPLETE_SAMPLE_POLICY)? {
            Some(v) => v,
            None => return Ok(IncompleteSamplePolicy::default()),
        };
        Ok(IncompleteSamplePolicy::parse(&raw).unwrap_or_else(|| {
            tracing::warn!(
                config_key = config_keys::INCOMPLETE_SAMPLE_POLICY,
                raw_value = %raw,
                "未称重样本策略配置无效，使用默认策略"
            );
            IncompleteSamplePolicy::default()
        }))
    }

    /// 证据文件大小上限（字节）
    pub fn evidence_max_bytes(&self) -> Result<usize, Box<dyn Error>> {
        let raw = match self.get_config_value(config_keys::EVIDENCE_MAX_BYTES)? {
            Some(v) => v,
            None => return Ok(DEFAULT_EVIDENCE_MAX_BYTES),
        };
        match raw.trim().parse::<usize>() {
            Ok(n) if n >= 1 => Ok(n),
            _ => {
                tracing::warn!(
                    config_key = config_keys::EVIDENCE_MAX_BYTES,
                    raw_value = %raw,
                    "证据大小上限配置无效，使用默认值"
                );
                Ok(DEFAULT_EVIDENCE_MAX_BYTES)
            }
        }
    }

    /// 一次性读取全部称重控制参数
    pub fn load_settings(&self) -> Result<WeightControlSettings, Box<dyn Error>> {
        Ok(WeightControlSettings {
            sample_size: self.sample_size()?,
            incomplete_sample_policy: self.incomplete_sample_policy()?,
            evidence_max_bytes: self.evidence_max_bytes()?,
        })
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 抽样
    pub const SAMPLE_SIZE: &str = "sample_size";
    pub const INCOMPLETE_SAMPLE_POLICY: &str = "incomplete_sample_policy";

    // 证据
    pub const EVIDENCE_MAX_BYTES: &str = "evidence_max_bytes";
}
