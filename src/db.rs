// ==========================================
// 包装线称重控制 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为
// - 统一 busy_timeout，减少并发写入时的偶发 busy 错误
// - 建表幂等，记录 schema_version
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要"每个连接"单独开启
/// - busy_timeout 需要"每个连接"单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 建表（幂等）
///
/// 表:
/// - config_scope / config_kv: 配置
/// - weight_control: 控制记录主表（嵌入批次配置、统计、处置）
/// - weight_control_sample: 样本明细（weight 可为空 = 未称重）
/// - weight_control_evidence: 证据文件
pub fn ensure_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS config_scope (
            scope_id TEXT PRIMARY KEY,
            scope_type TEXT NOT NULL,
            scope_key TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(scope_type, scope_key)
        );

        INSERT OR IGNORE INTO config_scope (scope_id, scope_type, scope_key)
        VALUES ('global', 'GLOBAL', 'global');

        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id TEXT NOT NULL REFERENCES config_scope(scope_id) ON DELETE CASCADE,
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (scope_id, key)
        );

        CREATE TABLE IF NOT EXISTS weight_control (
            control_id INTEGER PRIMARY KEY AUTOINCREMENT,
            lot TEXT NOT NULL,
            product TEXT NOT NULL,
            nominal_weight REAL NOT NULL,
            lower_limit REAL NOT NULL,
            upper_limit REAL NOT NULL,
            supplier TEXT,
            machine_operator TEXT,
            sealer_operator TEXT,
            film_name TEXT,
            material_lot_id TEXT NOT NULL,
            film_lot_id TEXT NOT NULL,
            machine_speed INTEGER NOT NULL DEFAULT 0,
            vertical_seal_temp REAL NOT NULL DEFAULT 0,
            horiz_seal_temp_upper REAL NOT NULL DEFAULT 0,
            horiz_seal_temp_lower REAL NOT NULL DEFAULT 0,
            lower_seal_ok INTEGER NOT NULL DEFAULT 1,
            upper_seal_ok INTEGER NOT NULL DEFAULT 1,
            vertical_seal_ok INTEGER NOT NULL DEFAULT 1,
            lot_print_legible_ok INTEGER NOT NULL DEFAULT 1,
            evidence_reference TEXT,
            total_entered INTEGER NOT NULL,
            mean_weight REAL NOT NULL,
            min_weight REAL NOT NULL,
            max_weight REAL NOT NULL,
            conforming_count INTEGER NOT NULL,
            non_conforming_count INTEGER NOT NULL,
            unmeasured_count INTEGER NOT NULL DEFAULT 0,
            final_status TEXT NOT NULL,
            responsible TEXT NOT NULL,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS weight_control_sample (
            control_id INTEGER NOT NULL REFERENCES weight_control(control_id),
            sample_index INTEGER NOT NULL,
            weight REAL,
            PRIMARY KEY (control_id, sample_index)
        );

        CREATE TABLE IF NOT EXISTS weight_control_evidence (
            reference TEXT PRIMARY KEY,
            control_id INTEGER NOT NULL REFERENCES weight_control(control_id),
            file_name TEXT NOT NULL,
            content_type TEXT,
            content BLOB NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_weight_control_created_at
            ON weight_control(created_at DESC);
        "#,
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;
    Ok(())
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> = conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        assert_eq!(read_schema_version(&conn).unwrap(), None);

        ensure_schema(&conn).unwrap();
        ensure_schema(&conn).unwrap();
        assert_eq!(read_schema_version(&conn).unwrap(), Some(CURRENT_SCHEMA_VERSION));

        let scopes: i64 = conn
            .query_row("SELECT COUNT(*) FROM config_scope", [], |row| row.get(0))
            .unwrap();
        assert_eq!(scopes, 1);
    }
}
