//! End-to-end tests of the fleet core over the production file-based store.

use motofleet::store::fs::FileStore;
use motofleet::{
    FleetController, FleetError, FleetRepository, Location, MotorcycleDraft, MotorcycleStatus,
    MotorcycleUpdate,
};
use tempfile::TempDir;

fn draft(plate: &str) -> MotorcycleDraft {
    MotorcycleDraft {
        model: "CG".to_string(),
        plate: plate.to_string(),
        status: MotorcycleStatus::Available,
        location: Location { x: 1.0, y: 2.0 },
        battery_level: 50,
        fuel_level: 50,
        mileage: 0,
        next_maintenance_date: "2025-01-01".to_string(),
        assigned_branch: "X".to_string(),
        technical_info: None,
    }
}

fn repo_at(dir: &TempDir) -> FleetRepository<FileStore> {
    FleetRepository::new(FileStore::new(dir.path().to_path_buf()))
}

#[tokio::test]
async fn create_normalizes_plate_and_rejects_any_cased_duplicate() {
    let dir = TempDir::new().unwrap();
    let repo = repo_at(&dir);

    repo.create(draft("abc1d23")).await.unwrap();
    let records = repo.list().await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].plate, "ABC1D23");

    let err = repo.create(draft("ABC1D23")).await.unwrap_err();
    assert!(matches!(err, FleetError::DuplicatePlate(_)));
    assert_eq!(repo.list().await.len(), 1);
}

#[tokio::test]
async fn rent_then_retire_a_motorcycle() {
    let dir = TempDir::new().unwrap();
    let repo = repo_at(&dir);

    let id = repo.create(draft("abc1d23")).await.unwrap();
    repo.update(
        &id,
        MotorcycleUpdate {
            status: Some(MotorcycleStatus::Rented),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(repo.list().await[0].status, MotorcycleStatus::Rented);

    repo.delete(&id).await.unwrap();
    assert!(repo.list().await.is_empty());
}

#[tokio::test]
async fn collection_survives_a_new_repository_instance() {
    let dir = TempDir::new().unwrap();

    let id = {
        let repo = repo_at(&dir);
        repo.create(draft("abc1d23")).await.unwrap()
    };

    // A fresh repository over the same directory sees the same collection.
    let repo = repo_at(&dir);
    let records = repo.list().await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, id);
}

#[tokio::test]
async fn durable_payload_is_a_json_array_under_the_collection_key() {
    let dir = TempDir::new().unwrap();
    let repo = repo_at(&dir);
    repo.create(draft("abc1d23")).await.unwrap();

    let raw = std::fs::read_to_string(dir.path().join("motorcycles.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let array = value.as_array().unwrap();
    assert_eq!(array.len(), 1);
    assert_eq!(array[0]["plate"], "ABC1D23");
    assert_eq!(array[0]["batteryLevel"], 50);
    assert_eq!(array[0]["status"], "available");
}

#[tokio::test]
async fn corrupt_collection_file_reads_as_an_empty_fleet() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("motorcycles.json"), "definitely not json").unwrap();

    let repo = repo_at(&dir);
    assert!(repo.list().await.is_empty());

    // And the store is usable again after the next write.
    repo.create(draft("abc1d23")).await.unwrap();
    assert_eq!(repo.list().await.len(), 1);
}

#[tokio::test]
async fn delete_leaves_a_backup_file_behind() {
    let dir = TempDir::new().unwrap();
    let repo = repo_at(&dir);
    let id = repo.create(draft("abc1d23")).await.unwrap();
    repo.delete(&id).await.unwrap();

    let backups: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.file_name()
                .to_string_lossy()
                .starts_with("motorcycles_backup_")
        })
        .collect();
    assert_eq!(backups.len(), 1);
}

#[tokio::test]
async fn controller_full_lifecycle_over_the_file_store() {
    let dir = TempDir::new().unwrap();
    let mut ctrl = FleetController::new(repo_at(&dir));

    assert!(ctrl.add(draft("abc1d23")).await);
    assert!(!ctrl.add(draft("abc1d23")).await);
    assert_eq!(ctrl.state().records.len(), 1);

    let id = ctrl.state().records[0].id.clone();
    assert!(
        ctrl.update_by_id(
            &id,
            MotorcycleUpdate {
                status: Some(MotorcycleStatus::Maintenance),
                battery_level: Some(10),
                ..Default::default()
            },
        )
        .await
    );

    let stats = ctrl.statistics();
    assert_eq!(stats.total, 1);
    assert_eq!(stats.maintenance, 1);
    assert_eq!(stats.average_battery, 10.0);

    assert!(ctrl.remove_by_id(&id).await);
    assert!(ctrl.state().records.is_empty());
    assert_eq!(ctrl.state().error, None);
}
