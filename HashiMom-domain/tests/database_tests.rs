use std::env;
use std::fs;

use uuid::Uuid;

use hashimom_data::database::{get_connection_info, get_db_pool, initialize_database_pool, DatabaseError};
use hashimom_data::repository::{Backend, ReferenceRangeRepository, ReferenceRangeRepositoryTrait};
use hashimom_domain::entities::{CreateLabRequest, UpsertProfileRequest};
use hashimom_domain::health::{get_system_health, ComponentStatus, SystemStatus};
use hashimom_domain::services::{HashiMomServices, LabServiceTrait, ProfileServiceTrait};

// The global pool can only be initialized once per process, so everything
// touching it lives in this single test.
#[tokio::test]
async fn test_global_sqlite_pool_lifecycle() {
    let db_path = env::temp_dir().join(format!("hashimom_test_{}.db", Uuid::new_v4()));
    env::set_var("DB_TYPE", "sqlite");
    env::set_var("DB_SQLITE_PATH", &db_path);

    assert!(matches!(get_db_pool(), Err(DatabaseError::PoolNotInitialized)));
    assert!(!Backend::detect().is_database());

    let pool = initialize_database_pool().expect("initialize pool");
    assert!(!pool.is_in_memory());
    assert!(db_path.exists());
    assert!(matches!(initialize_database_pool(), Err(DatabaseError::PoolAlreadyInitialized)));

    let info = get_connection_info().expect("connection info");
    assert!(info.contains("hashimom_test_"), "unexpected info: {}", info);

    // Repositories built after initialization use the pool
    assert!(Backend::detect().is_database());
    let ranges = ReferenceRangeRepository::new();
    ranges.seed_defaults().await.unwrap();

    let services = HashiMomServices::new();
    let user = Uuid::new_v4();
    let today = chrono::NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    services
        .profiles
        .upsert(
            user,
            UpsertProfileRequest {
                due_date: Some(chrono::NaiveDate::from_ymd_opt(2024, 12, 1).unwrap()),
                ..Default::default()
            },
            today,
        )
        .await
        .unwrap();
    services
        .labs
        .create_lab(
            user,
            CreateLabRequest {
                test_name: "TSH".to_string(),
                result: "2.9".to_string(),
                units: Some("mIU/L".to_string()),
                test_date: Some(today),
            },
        )
        .await
        .unwrap();

    // A second set of services sees the same records through the pool
    let other = HashiMomServices::new();
    let entries = other.labs.list_labs(user, today).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].evaluation.ref_high, Some(3.0));

    let health = get_system_health(&ranges).await;
    assert_eq!(health.components["database"].status, ComponentStatus::Healthy);
    assert_eq!(health.components["reference_ranges"].status, ComponentStatus::Healthy);
    assert_eq!(health.status, SystemStatus::Healthy);

    drop(pool);
    let _ = fs::remove_file(&db_path);
}
