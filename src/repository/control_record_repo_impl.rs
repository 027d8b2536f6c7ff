// ==========================================
// 包装线称重控制 - 控制记录 Repository 实现
// ==========================================
// 职责: 使用 rusqlite 实现 ControlRecordStore
// 红线: 只有 INSERT / SELECT，历史记录不可修改
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::control_record::{
    ControlRecord, ControlSubmission, ControlSummary, EvidenceFile, LotStatistics,
};
use crate::domain::lot::{LotConfiguration, MachineParameters, SealingChecks};
use crate::domain::sample::SampleReading;
use crate::domain::types::FinalStatus;
use crate::repository::control_record_repo::ControlRecordStore;
use crate::repository::error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};
use std::sync::{Arc, Mutex};

/// created_at 存储格式（UTC，小数秒为零时省略）
const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

// ==========================================
// SqliteControlRecordStore
// ==========================================
pub struct SqliteControlRecordStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteControlRecordStore {
    /// 创建新的 Repository 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径（表结构由 db::ensure_schema 负责）
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 在事务中写入主表，返回 control_id
    fn insert_control_tx(
        tx: &Transaction,
        submission: &ControlSubmission,
        evidence_reference: Option<&str>,
    ) -> RepositoryResult<i64> {
        let cfg = &submission.lot_configuration;
        let stats = &submission.statistics;
        tx.execute(
            r#"
            INSERT INTO weight_control (
                lot, product, nominal_weight, lower_limit, upper_limit,
                supplier, machine_operator, sealer_operator, film_name,
                material_lot_id, film_lot_id,
                machine_speed, vertical_seal_temp, horiz_seal_temp_upper, horiz_seal_temp_lower,
                lower_seal_ok, upper_seal_ok, vertical_seal_ok, lot_print_legible_ok,
                evidence_reference,
                total_entered, mean_weight, min_weight, max_weight,
                conforming_count, non_conforming_count, unmeasured_count,
                final_status, responsible, created_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15,
                ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26, ?27, ?28, ?29, ?30
            )
            "#,
            params![
                cfg.lot,
                cfg.product,
                cfg.nominal_weight,
                cfg.lower_limit,
                cfg.upper_limit,
                cfg.supplier,
                cfg.machine_operator,
                cfg.sealer_operator,
                cfg.film_name,
                cfg.material_lot_id,
                cfg.film_lot_id,
                cfg.machine_parameters.machine_speed,
                cfg.machine_parameters.vertical_seal_temp,
                cfg.machine_parameters.horiz_seal_temp_upper,
                cfg.machine_parameters.horiz_seal_temp_lower,
                cfg.sealing_checks.lower_seal,
                cfg.sealing_checks.upper_seal,
                cfg.sealing_checks.vertical_seal,
                cfg.sealing_checks.lot_print_legible,
                evidence_reference,
                stats.total_entered as i64,
                stats.mean,
                stats.min,
                stats.max,
                stats.conforming_count as i64,
                stats.non_conforming_count as i64,
                stats.unmeasured_count as i64,
                submission.final_status.to_db_str(),
                submission.responsible,
                submission.created_at.format(TS_FORMAT).to_string(),
            ],
        )?;
        Ok(tx.last_insert_rowid())
    }

    /// 在事务中批量写入样本
    fn insert_samples_tx(
        tx: &Transaction,
        control_id: i64,
        samples: &[SampleReading],
    ) -> RepositoryResult<usize> {
        let mut stmt = tx.prepare(
            "INSERT INTO weight_control_sample (control_id, sample_index, weight) VALUES (?1, ?2, ?3)",
        )?;
        let mut count = 0;
        for sample in samples {
            stmt.execute(params![control_id, sample.index, sample.weight])?;
            count += 1;
        }
        Ok(count)
    }

    fn load_samples(conn: &Connection, control_id: i64) -> RepositoryResult<Vec<SampleReading>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT sample_index, weight
            FROM weight_control_sample
            WHERE control_id = ?1
            ORDER BY sample_index ASC
            "#,
        )?;
        let samples = stmt
            .query_map(params![control_id], |row| {
                Ok(SampleReading {
                    index: row.get(0)?,
                    weight: row.get(1)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(samples)
    }
}

#[async_trait]
impl ControlRecordStore for SqliteControlRecordStore {
    async fn insert(&self, submission: &ControlSubmission) -> RepositoryResult<i64> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        // 证据随记录一起写入；附带文件优先于配置中的外部引用
        let evidence_reference = match &submission.evidence {
            Some(attachment) => Some(format!(
                "{}_{}",
                uuid::Uuid::new_v4(),
                sanitize_file_name(&attachment.file_name)
            )),
            None => submission.lot_configuration.evidence_reference.clone(),
        };

        let control_id =
            Self::insert_control_tx(&tx, submission, evidence_reference.as_deref())?;
        let sample_count = Self::insert_samples_tx(&tx, control_id, &submission.samples)?;

        if let (Some(attachment), Some(reference)) = (&submission.evidence, &evidence_reference) {
            tx.execute(
                r#"
                INSERT INTO weight_control_evidence (reference, control_id, file_name, content_type, content)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
                params![
                    reference,
                    control_id,
                    attachment.file_name,
                    attachment.content_type,
                    attachment.bytes,
                ],
            )?;
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        tracing::debug!(control_id, sample_count, "控制记录已写入");
        Ok(control_id)
    }

    async fn find_by_id(&self, control_id: i64) -> RepositoryResult<Option<ControlRecord>> {
        let conn = self.get_conn()?;
        let row = conn
            .query_row(
                r#"
                SELECT
                    control_id, lot, product, nominal_weight, lower_limit, upper_limit,
                    supplier, machine_operator, sealer_operator, film_name,
                    material_lot_id, film_lot_id,
                    machine_speed, vertical_seal_temp, horiz_seal_temp_upper, horiz_seal_temp_lower,
                    lower_seal_ok, upper_seal_ok, vertical_seal_ok, lot_print_legible_ok,
                    evidence_reference,
                    total_entered, mean_weight, min_weight, max_weight,
                    conforming_count, non_conforming_count, unmeasured_count,
                    final_status, responsible, created_at
                FROM weight_control
                WHERE control_id = ?1
                "#,
                params![control_id],
                ControlRow::from_row,
            )
            .optional()?;

        let row = match row {
            Some(r) => r,
            None => return Ok(None),
        };

        let samples = Self::load_samples(&conn, control_id)?;
        Ok(Some(row.into_record(samples)?))
    }

    async fn list_all(&self) -> RepositoryResult<Vec<ControlSummary>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT control_id, lot, product, created_at, nominal_weight, final_status, responsible
            FROM weight_control
            ORDER BY created_at DESC, control_id DESC
            "#,
        )?;

        let raw = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, f64>(4)?,
                    row.get::<_, String>(5)?,
                    row.get::<_, String>(6)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let summaries = raw
            .into_iter()
            .map(
                |(control_id, lot, product, created_at, nominal_weight, status, responsible)| {
                    Ok(ControlSummary {
                        control_id,
                        lot,
                        product,
                        created_at: parse_timestamp(&created_at)?,
                        nominal_weight,
                        final_status: parse_final_status(&status)?,
                        responsible,
                    })
                },
            )
            .collect::<RepositoryResult<Vec<_>>>()?;

        tracing::debug!(count = summaries.len(), "读取控制记录摘要");
        Ok(summaries)
    }

    async fn load_evidence(&self, reference: &str) -> RepositoryResult<Option<EvidenceFile>> {
        let conn = self.get_conn()?;
        let file = conn
            .query_row(
                r#"
                SELECT reference, file_name, content_type, content
                FROM weight_control_evidence
                WHERE reference = ?1
                "#,
                params![reference],
                |row| {
                    Ok(EvidenceFile {
                        reference: row.get(0)?,
                        file_name: row.get(1)?,
                        content_type: row.get(2)?,
                        bytes: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(file)
    }
}

// ==========================================
// 行映射
// ==========================================
struct ControlRow {
    control_id: i64,
    config: LotConfiguration,
    statistics: LotStatistics,
    final_status: String,
    responsible: String,
    created_at: String,
}

impl ControlRow {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            control_id: row.get(0)?,
            config: LotConfiguration {
                lot: row.get(1)?,
                product: row.get(2)?,
                nominal_weight: row.get(3)?,
                lower_limit: row.get(4)?,
                upper_limit: row.get(5)?,
                supplier: row.get(6)?,
                machine_operator: row.get(7)?,
                sealer_operator: row.get(8)?,
                film_name: row.get(9)?,
                material_lot_id: row.get(10)?,
                film_lot_id: row.get(11)?,
                machine_parameters: MachineParameters {
                    machine_speed: row.get(12)?,
                    vertical_seal_temp: row.get(13)?,
                    horiz_seal_temp_upper: row.get(14)?,
                    horiz_seal_temp_lower: row.get(15)?,
                },
                sealing_checks: SealingChecks {
                    lower_seal: row.get(16)?,
                    upper_seal: row.get(17)?,
                    vertical_seal: row.get(18)?,
                    lot_print_legible: row.get(19)?,
                },
                evidence_reference: row.get(20)?,
            },
            statistics: LotStatistics {
                total_entered: row.get::<_, i64>(21)? as usize,
                mean: row.get(22)?,
                min: row.get(23)?,
                max: row.get(24)?,
                conforming_count: row.get::<_, i64>(25)? as usize,
                non_conforming_count: row.get::<_, i64>(26)? as usize,
                unmeasured_count: row.get::<_, i64>(27)? as usize,
            },
            final_status: row.get(28)?,
            responsible: row.get(29)?,
            created_at: row.get(30)?,
        })
    }

    fn into_record(self, samples: Vec<SampleReading>) -> RepositoryResult<ControlRecord> {
        Ok(ControlRecord {
            control_id: self.control_id,
            lot_configuration: self.config,
            samples,
            statistics: self.statistics,
            final_status: parse_final_status(&self.final_status)?,
            created_at: parse_timestamp(&self.created_at)?,
            responsible: self.responsible,
        })
    }
}

fn parse_timestamp(raw: &str) -> RepositoryResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, TS_FORMAT).map_err(|e| RepositoryError::FieldValueError {
        field: "created_at".to_string(),
        message: format!("{} ({})", e, raw),
    })
}

fn parse_final_status(raw: &str) -> RepositoryResult<FinalStatus> {
    FinalStatus::from_db_str(raw).ok_or_else(|| RepositoryError::FieldValueError {
        field: "final_status".to_string(),
        message: format!("未知处置结果: {}", raw),
    })
}

/// 文件名只保留字母数字与 . - _
fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.trim_matches(|c| c == '_' || c == '.').is_empty() {
        "evidence".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("foto sello.jpg"), "foto_sello.jpg");
        assert_eq!(sanitize_file_name("../../etc/passwd"), ".._.._etc_passwd");
        assert_eq!(sanitize_file_name("   "), "evidence");
        assert_eq!(sanitize_file_name("ñ"), "evidence");
    }

    #[test]
    fn test_timestamp_roundtrip() {
        let ts = chrono::NaiveDate::from_ymd_opt(2024, 2, 29)
            .unwrap()
            .and_hms_milli_opt(23, 59, 58, 125)
            .unwrap();
        let raw = ts.format(TS_FORMAT).to_string();
        assert_eq!(parse_timestamp(&raw).unwrap(), ts);

        let whole = chrono::NaiveDate::from_ymd_opt(2024, 2, 29)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        assert_eq!(whole.format(TS_FORMAT).to_string(), "2024-02-29 08:00:00");
        assert_eq!(parse_timestamp("2024-02-29 08:00:00").unwrap(), whole);
    }

    #[test]
    fn test_unknown_final_status_is_field_error() {
        assert_eq!(parse_final_status("APPROVED").unwrap(), FinalStatus::Approved);
        match parse_final_status("MAYBE") {
            Err(RepositoryError::FieldValueError { field, .. }) => assert_eq!(field, "final_status"),
            other => panic!("期望 FieldValueError，实际 {:?}", other),
        }
    }
}
