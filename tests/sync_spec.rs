use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use pano_desk::db::Database;
use pano_desk::models::*;
use pano_desk::sync::{LocalSync, SyncBoundary, SyncError};
use pano_desk::viewer::{push_edit, EditorSession, Resolution, SessionMode};
use uuid::Uuid;

fn setup_store() -> Database {
    let db = Database::open_memory().expect("Failed to create database");
    db.migrate().expect("Failed to migrate");
    db
}

fn seed_tour(db: &Database, scene_titles: &[&str]) -> Tour {
    let tour = db
        .create_tour(CreateTourInput {
            client_id: Uuid::new_v4(),
            client_name: "Test Client".to_string(),
            title: "Test Tour".to_string(),
            description: None,
        })
        .expect("Failed to create tour");

    for title in scene_titles {
        db.create_scene(
            tour.id,
            CreateSceneInput {
                title: Some(title.to_string()),
                image: ImageRef::persisted(format!("/images/{}.jpg", title)),
            },
        )
        .expect("Failed to create scene");
    }

    db.get_tour(tour.id)
        .expect("Query failed")
        .expect("Tour missing")
}

/// Boundary that rejects the first hotspot creation, then recovers.
struct FlakyCreate {
    inner: LocalSync,
    tripped: AtomicBool,
}

impl FlakyCreate {
    fn new(inner: LocalSync) -> Self {
        Self {
            inner,
            tripped: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl SyncBoundary for FlakyCreate {
    async fn fetch_tours(&self) -> Result<Vec<Tour>, SyncError> {
        self.inner.fetch_tours().await
    }

    async fn fetch_tour(&self, id: Uuid) -> Result<Tour, SyncError> {
        self.inner.fetch_tour(id).await
    }

    async fn create_hotspot(&self, input: &CreateHotspotInput) -> Result<Hotspot, SyncError> {
        if !self.tripped.swap(true, Ordering::SeqCst) {
            return Err(SyncError::Server("connection reset".to_string()));
        }
        self.inner.create_hotspot(input).await
    }

    async fn update_hotspot(
        &self,
        id: Uuid,
        patch: &UpdateHotspotInput,
    ) -> Result<Hotspot, SyncError> {
        self.inner.update_hotspot(id, patch).await
    }

    async fn delete_hotspot(&self, id: Uuid) -> Result<(), SyncError> {
        self.inner.delete_hotspot(id).await
    }

    async fn replace_scene_image(
        &self,
        scene_id: Uuid,
        image: &ImageRef,
    ) -> Result<(), SyncError> {
        self.inner.replace_scene_image(scene_id, image).await
    }

    async fn approve_tour(&self, id: Uuid) -> Result<Tour, SyncError> {
        self.inner.approve_tour(id).await
    }

    async fn reject_tour(&self, id: Uuid) -> Result<Tour, SyncError> {
        self.inner.reject_tour(id).await
    }
}

mod optimistic_flow {
    use super::*;

    #[tokio::test]
    async fn placed_hotspot_is_confirmed_and_adopts_the_store_id() {
        let db = setup_store();
        let tour = seed_tour(&db, &["Lobby"]);
        let sync = LocalSync::new(db.clone(), TransitionPolicy::Unrestricted);

        let mut session = EditorSession::new(sync.fetch_tour(tour.id).await.expect("Fetch failed"));
        session.set_mode(SessionMode::Editing);

        let edit = session.place_hotspot(30.0, -5.0).expect("Place failed");
        let outcome = push_edit(&sync, &edit).await;
        let resolution = session.resolve(&edit, outcome);

        assert_eq!(resolution, Resolution::Confirmed);
        assert!(!session.has_pending_edits());

        // The session's copy now carries the store-assigned id
        let selected = session.selected_hotspot().expect("Nothing selected");
        let stored = db
            .get_hotspot(selected.id)
            .expect("Query failed")
            .expect("Hotspot missing from store");
        assert_eq!(stored.yaw, 30.0);
        assert_eq!(stored.pitch, -5.0);
    }

    #[tokio::test]
    async fn update_round_trips_through_the_store() {
        let db = setup_store();
        let tour = seed_tour(&db, &["Lobby"]);
        let scene_id = tour.scenes[0].id;
        let hotspot = db
            .create_hotspot(CreateHotspotInput {
                scene_id,
                title: "Reception".to_string(),
                description: None,
                yaw: 0.0,
                pitch: 0.0,
                kind: None,
                target_scene_id: None,
            })
            .expect("Failed to create hotspot");
        let sync = LocalSync::new(db.clone(), TransitionPolicy::Unrestricted);

        let mut session = EditorSession::new(sync.fetch_tour(tour.id).await.expect("Fetch failed"));
        session.set_mode(SessionMode::Editing);

        let edit = session
            .update_hotspot(
                &hotspot.id.to_string(),
                UpdateHotspotInput {
                    title: Some("Front Desk".to_string()),
                    ..Default::default()
                },
            )
            .expect("Update failed");
        let outcome = push_edit(&sync, &edit).await;
        assert_eq!(session.resolve(&edit, outcome), Resolution::Confirmed);

        let stored = db
            .get_hotspot(hotspot.id)
            .expect("Query failed")
            .expect("Hotspot missing");
        assert_eq!(stored.title, "Front Desk");
    }

    #[tokio::test]
    async fn delete_stays_idempotent_across_the_boundary() {
        let db = setup_store();
        let tour = seed_tour(&db, &["Lobby"]);
        let scene_id = tour.scenes[0].id;
        let hotspot = db
            .create_hotspot(CreateHotspotInput {
                scene_id,
                title: "Reception".to_string(),
                description: None,
                yaw: 0.0,
                pitch: 0.0,
                kind: None,
                target_scene_id: None,
            })
            .expect("Failed to create hotspot");
        let sync = LocalSync::new(db, TransitionPolicy::Unrestricted);

        sync.delete_hotspot(hotspot.id).await.expect("Delete failed");
        sync.delete_hotspot(hotspot.id)
            .await
            .expect("Second delete should also succeed");
    }
}

mod failure_handling {
    use super::*;

    #[tokio::test]
    async fn rejected_edit_is_rolled_back_and_surfaced() {
        let db = setup_store();
        let tour = seed_tour(&db, &["Lobby"]);
        let sync = LocalSync::new(db.clone(), TransitionPolicy::Unrestricted);

        let mut session = EditorSession::new(sync.fetch_tour(tour.id).await.expect("Fetch failed"));
        session.set_mode(SessionMode::Editing);

        // The store loses the scene while the session still shows it
        db.delete_scene(tour.scenes[0].id).expect("Delete failed");

        let edit = session.place_hotspot(10.0, 0.0).expect("Place failed");
        assert_eq!(session.tour().scenes[0].hotspots.len(), 1);

        let outcome = push_edit(&sync, &edit).await;
        let resolution = session.resolve(&edit, outcome);

        assert_eq!(resolution, Resolution::RolledBack);
        // Compensating action removed the optimistic hotspot
        assert!(session.tour().scenes[0].hotspots.is_empty());
        assert!(session.selected_hotspot().is_none());
        let failure = session.last_failure().expect("Failure not recorded");
        assert!(failure.message.contains("not found"));
    }

    #[tokio::test]
    async fn retry_reapplies_and_succeeds_once_the_boundary_recovers() {
        let db = setup_store();
        let tour = seed_tour(&db, &["Lobby"]);
        let sync = FlakyCreate::new(LocalSync::new(db.clone(), TransitionPolicy::Unrestricted));

        let mut session = EditorSession::new(sync.fetch_tour(tour.id).await.expect("Fetch failed"));
        session.set_mode(SessionMode::Editing);

        let edit = session.place_hotspot(20.0, 5.0).expect("Place failed");
        let outcome = push_edit(&sync, &edit).await;
        assert_eq!(session.resolve(&edit, outcome), Resolution::RolledBack);
        assert!(session.tour().scenes[0].hotspots.is_empty());

        let retried = session.retry(&edit).expect("Retry failed");
        assert_eq!(session.tour().scenes[0].hotspots.len(), 1);
        assert!(session.last_failure().is_none());

        let outcome = push_edit(&sync, &retried).await;
        assert_eq!(session.resolve(&retried, outcome), Resolution::Confirmed);

        let stored = db.get_tour(tour.id).expect("Query failed").expect("Tour missing");
        assert_eq!(stored.scenes[0].hotspots.len(), 1);
        assert_eq!(stored.scenes[0].hotspots[0].yaw, 20.0);
    }

    #[tokio::test]
    async fn outcomes_from_before_a_reload_are_discarded() {
        let db = setup_store();
        let tour = seed_tour(&db, &["Lobby"]);
        let sync = LocalSync::new(db.clone(), TransitionPolicy::Unrestricted);

        let mut session = EditorSession::new(sync.fetch_tour(tour.id).await.expect("Fetch failed"));
        session.set_mode(SessionMode::Editing);

        let edit = session.place_hotspot(15.0, 0.0).expect("Place failed");
        let outcome = push_edit(&sync, &edit).await;

        // The view reloads before the response lands
        session.load_tour(sync.fetch_tour(tour.id).await.expect("Fetch failed"));
        let scene_hotspots = session.tour().scenes[0].hotspots.clone();

        let resolution = session.resolve(&edit, outcome);
        assert_eq!(resolution, Resolution::Stale);
        // The reloaded snapshot is untouched by the stale outcome
        assert_eq!(session.tour().scenes[0].hotspots, scene_hotspots);
    }
}

mod review_boundary {
    use super::*;

    #[tokio::test]
    async fn approve_and_reject_flow_through() {
        let db = setup_store();
        let tour = seed_tour(&db, &["Lobby"]);
        let sync = LocalSync::new(db, TransitionPolicy::Unrestricted);

        let approved = sync.approve_tour(tour.id).await.expect("Approve failed");
        assert_eq!(approved.status, TourStatus::Approved);

        let rejected = sync.reject_tour(tour.id).await.expect("Reject failed");
        assert_eq!(rejected.status, TourStatus::Rejected);
    }

    #[tokio::test]
    async fn policy_denial_maps_to_bad_request() {
        let db = setup_store();
        let tour = seed_tour(&db, &["Lobby"]);
        let sync = LocalSync::new(db.clone(), TransitionPolicy::ReviewFlow);

        db.set_tour_status(tour.id, TourStatus::Live, &TransitionPolicy::Unrestricted)
            .expect("Transition failed");

        let result = sync.approve_tour(tour.id).await;
        assert!(matches!(result, Err(SyncError::BadRequest(_))));
    }

    #[tokio::test]
    async fn fetch_tours_returns_a_full_snapshot() {
        let db = setup_store();
        seed_tour(&db, &["A", "B"]);
        seed_tour(&db, &["C"]);
        let sync = LocalSync::new(db, TransitionPolicy::Unrestricted);

        let tours = sync.fetch_tours().await.expect("Fetch failed");
        assert_eq!(tours.len(), 2);
        let scene_counts: Vec<_> = tours.iter().map(|t| t.scenes.len()).collect();
        assert!(scene_counts.contains(&2));
        assert!(scene_counts.contains(&1));
    }
}
