// ==========================================
// SqliteControlRecordStore 集成测试
// ==========================================
// 测试范围:
// 1. 写入/读取往返（含空重量）
// 2. 摘要排序
// 3. 事务原子性（样本写入失败时不留主表记录）
// 4. 证据随记录写入
// ==========================================


use chrono::NaiveDate;
use packaging_weight_control::domain::control_record::{ControlSubmission, EvidenceAttachment};
use packaging_weight_control::domain::lot::LotConfigurationInput;
use packaging_weight_control::domain::sample::SampleReading;
use packaging_weight_control::domain::types::FinalStatus;
use packaging_weight_control::engine::{ControlRecordBuilder, LimitValidator};
use packaging_weight_control::repository::{
    ControlRecordStore, RepositoryError, SqliteControlRecordStore,
};

fn submission(lot: &str, day: u32, weights: &[Option<f64>]) -> ControlSubmission {
    let config = LimitValidator::into_configuration(LotConfigurationInput {
        lot: lot.to_string(),
        product: "Arroz 1kg".to_string(),
        nominal_weight: Some(1000.0),
        lower_limit: Some(985.0),
        upper_limit: Some(1015.0),
        material_lot_id: "MP-1".to_string(),
        film_lot_id: "FL-1".to_string(),
        ..Default::default()
    })
    .expect("配置应合法");

    let samples: Vec<SampleReading> = weights
        .iter()
        .enumerate()
        .map(|(i, w)| SampleReading {
            index: i as u32 + 1,
            weight: *w,
        })
        .collect();

    let created_at = NaiveDate::from_ymd_opt(2024, 3, day)
        .unwrap()
        .and_hms_opt(9, 30, 0)
        .unwrap();

    ControlRecordBuilder::default()
        .build(&config, &samples, "Rosa", created_at, None)
        .expect("样本集非空")
}

#[tokio::test]
async fn test_insert_and_find_roundtrip() {
    let (_tmp, db_path) = test_helpers::create_test_db().expect("创建测试数据库失败");
    let store = SqliteControlRecordStore::new(&db_path).expect("创建仓储失败");

    let mut weights = vec![Some(1001.0); 48];
    weights.push(None);
    weights.push(Some(990.5));
    let sub = submission("A-1", 1, &weights);

    let id = store.insert(&sub).await.expect("写入失败");
    let record = store
        .find_by_id(id)
        .await
        .expect("读取失败")
        .expect("记录应存在");

    assert_eq!(record.control_id, id);
    assert_eq!(record.lot_configuration, sub.lot_configuration);
    assert_eq!(record.samples, sub.samples);
    assert_eq!(record.statistics, sub.statistics);
    assert_eq!(record.final_status, FinalStatus::Rejected);
    assert_eq!(record.created_at, sub.created_at);
    assert_eq!(record.responsible, "Rosa");
    assert!(record.samples[48].weight.is_none());
}

#[tokio::test]
async fn test_find_missing_returns_none() {
    let (_tmp, db_path) = test_helpers::create_test_db().expect("创建测试数据库失败");
    let store = SqliteControlRecordStore::new(&db_path).expect("创建仓储失败");

    assert!(store.find_by_id(1).await.unwrap().is_none());
    assert!(store.load_evidence("x").await.unwrap().is_none());
    assert!(store.list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_list_all_newest_first() {
    let (_tmp, db_path) = test_helpers::create_test_db().expect("创建测试数据库失败");
    let store = SqliteControlRecordStore::new(&db_path).expect("创建仓储失败");

    let full = vec![Some(1000.0); 50];
    let old = store.insert(&submission("OLD", 1, &full)).await.unwrap();
    let new = store.insert(&submission("NEW", 20, &full)).await.unwrap();
    let mid = store.insert(&submission("MID", 10, &full)).await.unwrap();

    let ids: Vec<i64> = store
        .list_all()
        .await
        .unwrap()
        .iter()
        .map(|s| s.control_id)
        .collect();
    assert_eq!(ids, vec![new, mid, old]);
}

#[tokio::test]
async fn test_failed_sample_insert_rolls_back_whole_record() {
    let (_tmp, db_path) = test_helpers::create_test_db().expect("创建测试数据库失败");
    let store = SqliteControlRecordStore::new(&db_path).expect("创建仓储失败");

    let mut sub = submission("DUP", 1, &vec![Some(1000.0); 50]);
    // 重复序号触发主键冲突
    sub.samples[1].index = 1;

    let err = store.insert(&sub).await.unwrap_err();
    assert!(matches!(err, RepositoryError::UniqueConstraintViolation(_)));

    assert_eq!(test_helpers::count_rows(&db_path, "weight_control"), 0);
    assert_eq!(test_helpers::count_rows(&db_path, "weight_control_sample"), 0);
}

#[tokio::test]
async fn test_evidence_written_atomically() {
    let (_tmp, db_path) = test_helpers::create_test_db().expect("创建测试数据库失败");
    let store = SqliteControlRecordStore::new(&db_path).expect("创建仓储失败");

    let mut sub = submission("EV", 2, &vec![Some(1000.0); 50]);
    sub.evidence = Some(EvidenceAttachment {
        file_name: "sello.png".to_string(),
        content_type: None,
        bytes: vec![1, 2, 3],
    });

    let id = store.insert(&sub).await.unwrap();
    let record = store.find_by_id(id).await.unwrap().unwrap();
    let reference = record
        .lot_configuration
        .evidence_reference
        .expect("应写入证据引用");

    let file = store.load_evidence(&reference).await.unwrap().unwrap();
    assert_eq!(file.reference, reference);
    assert_eq!(file.file_name, "sello.png");
    assert!(file.content_type.is_none());
    assert_eq!(file.bytes, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_unmeasured_samples_persist_as_null() {
    let (_tmp, db_path) = test_helpers::create_test_db().expect("创建测试数据库失败");
    let store = SqliteControlRecordStore::new(&db_path).expect("创建仓储失败");

    let sub = submission("EMPTY", 3, &[None; 5]);

    let id = store.insert(&sub).await.unwrap();
    let record = store.find_by_id(id).await.unwrap().unwrap();
    assert_eq!(record.samples.len(), 5);
    assert!(record.samples.iter().all(|s| s.weight.is_none()));
    assert_eq!(record.statistics.mean, 0.0);
    assert_eq!(record.final_status, FinalStatus::Rejected);
}

#[tokio::test]
async fn test_corrupt_final_status_is_reported() {
    let (_tmp, db_path) = test_helpers::create_test_db().expect("创建测试数据库失败");
    let store = SqliteControlRecordStore::new(&db_path).expect("创建仓储失败");

    let id = store
        .insert(&submission("BAD", 4, &vec![Some(1000.0); 50]))
        .await
        .unwrap();

    // 绕过仓储直接篡改处置结果
    let conn = rusqlite::Connection::open(&db_path).unwrap();
    conn.execute(
        "UPDATE weight_control SET final_status = 'MAYBE' WHERE control_id = ?1",
        [id],
    )
    .unwrap();
    drop(conn);

    match store.find_by_id(id).await {
        Err(RepositoryError::FieldValueError { field, .. }) => assert_eq!(field, "final_status"),
        other => panic!("期望 FieldValueError，实际 {:?}", other.map(|r| r.map(|r| r.final_status))),
    }
    assert!(matches!(
        store.list_all().await,
        Err(RepositoryError::FieldValueError { .. })
    ));
}
