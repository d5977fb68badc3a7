//! Domain layer health check functionality
//! Reports whether the database is reachable and the reference ranges are seeded

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use hashimom_data::database;
use hashimom_data::repository::ReferenceRangeRepositoryTrait;
use hashimom_data::seed::REFERENCE_RANGE_SEED;

/// System health status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SystemStatus {
    /// All components are healthy
    Healthy,
    /// Some components are degraded but the system is functional
    Degraded,
    /// System is not functioning properly
    Unhealthy,
}

/// Component health status
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Represents a health component with status and optional details
#[derive(Debug, Clone, Serialize)]
pub struct HealthComponent {
    pub status: ComponentStatus,
    pub details: Option<String>,
}

impl HealthComponent {
    fn new(status: ComponentStatus, details: impl Into<Option<String>>) -> Self {
        Self {
            status,
            details: details.into(),
        }
    }
}

/// Represents the overall health of the system
#[derive(Debug, Clone, Serialize)]
pub struct SystemHealth {
    pub status: SystemStatus,
    /// Map of component names to their health status
    pub components: HashMap<String, HealthComponent>,
}

/// Check the process-wide database pool.
///
/// A missing pool is degraded rather than unhealthy: repositories fall back
/// to in-memory storage.
pub fn check_database_status() -> HealthComponent {
    let pool = match database::get_db_pool() {
        Ok(pool) => pool,
        Err(e) => {
            return HealthComponent::new(
                ComponentStatus::Degraded,
                format!("{}; records are kept in memory", e),
            )
        }
    };

    if let Err(e) = pool.get() {
        return HealthComponent::new(ComponentStatus::Unhealthy, format!("Database connection error: {}", e));
    }

    let info = database::describe_pool(&pool);
    if pool.is_in_memory() {
        HealthComponent::new(ComponentStatus::Degraded, info)
    } else {
        HealthComponent::new(ComponentStatus::Healthy, info)
    }
}

/// Check that every seeded (analyte, trimester) pair has a range
pub async fn check_reference_ranges<R>(ranges: &R) -> HealthComponent
where
    R: ReferenceRangeRepositoryTrait + ?Sized,
{
    let stored = match ranges.list().await {
        Ok(stored) => stored,
        Err(e) => return HealthComponent::new(ComponentStatus::Unhealthy, e.to_string()),
    };

    let present: HashSet<(String, String)> = stored.into_iter().map(|r| (r.analyte, r.trimester)).collect();
    let missing: Vec<String> = REFERENCE_RANGE_SEED
        .iter()
        .filter(|(analyte, trimester, ..)| !present.contains(&(analyte.to_string(), trimester.to_string())))
        .map(|(analyte, trimester, ..)| format!("{} {}", analyte, trimester))
        .collect();

    if missing.is_empty() {
        HealthComponent::new(ComponentStatus::Healthy, format!("{} ranges loaded", present.len()))
    } else if missing.len() == REFERENCE_RANGE_SEED.len() {
        HealthComponent::new(ComponentStatus::Unhealthy, "No reference ranges seeded".to_string())
    } else {
        HealthComponent::new(ComponentStatus::Degraded, format!("Missing ranges: {}", missing.join(", ")))
    }
}

/// Get overall system health
pub async fn get_system_health<R>(ranges: &R) -> SystemHealth
where
    R: ReferenceRangeRepositoryTrait + ?Sized,
{
    let components: HashMap<String, HealthComponent> = vec![
        ("database".to_string(), check_database_status()),
        ("reference_ranges".to_string(), check_reference_ranges(ranges).await),
    ]
    .into_iter()
    .collect();

    let worst = components
        .values()
        .map(|c| c.status)
        .max()
        .unwrap_or(ComponentStatus::Healthy);

    let status = match worst {
        ComponentStatus::Healthy => SystemStatus::Healthy,
        ComponentStatus::Degraded => SystemStatus::Degraded,
        ComponentStatus::Unhealthy => SystemStatus::Unhealthy,
    };

    SystemHealth { status, components }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hashimom_data::models::ReferenceRangeRecord;
    use hashimom_data::repository::{Backend, InMemoryStorage, ReferenceRangeRepository};

    fn repo() -> ReferenceRangeRepository {
        ReferenceRangeRepository::with_backend(Backend::InMemory(InMemoryStorage::new()))
    }

    #[tokio::test]
    async fn test_reference_ranges_component() {
        let ranges = repo();
        assert_eq!(check_reference_ranges(&ranges).await.status, ComponentStatus::Unhealthy);

        ranges
            .upsert(vec![ReferenceRangeRecord {
                analyte: "TSH".to_string(),
                trimester: "T1".to_string(),
                low: 0.1,
                high: 2.5,
                unit: "mIU/L".to_string(),
            }])
            .await
            .unwrap();
        assert_eq!(check_reference_ranges(&ranges).await.status, ComponentStatus::Degraded);

        ranges.seed_defaults().await.unwrap();
        assert_eq!(check_reference_ranges(&ranges).await.status, ComponentStatus::Healthy);
    }

    #[tokio::test]
    async fn test_get_system_health_lists_components() {
        let ranges = repo();
        ranges.seed_defaults().await.unwrap();

        let health = get_system_health(&ranges).await;
        assert!(health.components.contains_key("database"));
        assert!(health.components.contains_key("reference_ranges"));
        // No global pool is initialized in unit tests
        assert_ne!(health.status, SystemStatus::Unhealthy);
    }
}
