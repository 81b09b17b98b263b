use pano_desk::db::Database;
use pano_desk::models::*;
use speculate2::speculate;
use uuid::Uuid;

fn create_test_tour(db: &Database) -> Tour {
    db.create_tour(CreateTourInput {
        client_id: Uuid::new_v4(),
        client_name: "Test Client".to_string(),
        title: "Test Tour".to_string(),
        description: None,
    })
    .expect("Failed to create tour")
}

fn add_scene(db: &Database, tour_id: Uuid, title: &str) -> Scene {
    db.create_scene(
        tour_id,
        CreateSceneInput {
            title: Some(title.to_string()),
            image: ImageRef::persisted(format!("/images/{}.jpg", title)),
        },
    )
    .expect("Failed to create scene")
}

fn add_hotspot(db: &Database, scene_id: Uuid, title: &str) -> Hotspot {
    db.create_hotspot(CreateHotspotInput {
        scene_id,
        title: title.to_string(),
        description: None,
        yaw: 45.0,
        pitch: -10.0,
        kind: None,
        target_scene_id: None,
    })
    .expect("Failed to create hotspot")
}

speculate! {
    before {
        let db = Database::open_memory().expect("Failed to create in-memory database");
        db.migrate().expect("Failed to run migrations");
    }

    describe "tours" {
        describe "create_tour" {
            it "creates a pending tour with no scenes" {
                let tour = db.create_tour(CreateTourInput {
                    client_id: Uuid::new_v4(),
                    client_name: "Grandview Hotel".to_string(),
                    title: "Grandview 360° Tour".to_string(),
                    description: Some("Lobby and suites".to_string()),
                }).expect("Failed to create tour");

                assert_eq!(tour.client_name, "Grandview Hotel");
                assert_eq!(tour.status, TourStatus::Pending);
                assert_eq!(tour.description, Some("Lobby and suites".to_string()));
                assert!(tour.scenes.is_empty());
            }
        }

        describe "get_tour" {
            it "returns None for non-existent tour" {
                let result = db.get_tour(Uuid::new_v4()).expect("Query failed");
                assert!(result.is_none());
            }

            it "returns the tour with scenes in order and their hotspots" {
                let tour = create_test_tour(&db);
                let lobby = add_scene(&db, tour.id, "Lobby");
                let suite = add_scene(&db, tour.id, "Suite");
                add_hotspot(&db, lobby.id, "Reception");

                let found = db.get_tour(tour.id).expect("Query failed").expect("Tour missing");
                assert_eq!(found.scenes.len(), 2);
                assert_eq!(found.scenes[0].id, lobby.id);
                assert_eq!(found.scenes[1].id, suite.id);
                assert_eq!(found.scenes[0].hotspots.len(), 1);
                assert_eq!(found.scenes[0].hotspots[0].title, "Reception");
                assert!(found.scenes[1].hotspots.is_empty());
            }
        }

        describe "get_all_tours" {
            it "returns empty list when no tours exist" {
                let tours = db.get_all_tours().expect("Query failed");
                assert!(tours.is_empty());
            }

            it "returns every tour with its scene chain" {
                let first = create_test_tour(&db);
                add_scene(&db, first.id, "Entrance");
                create_test_tour(&db);

                let tours = db.get_all_tours().expect("Query failed");
                assert_eq!(tours.len(), 2);
                let loaded = tours.iter().find(|t| t.id == first.id).expect("missing tour");
                assert_eq!(loaded.scenes.len(), 1);
            }
        }

        describe "delete_tour" {
            it "deletes the tour and cascades to scenes and hotspots" {
                let tour = create_test_tour(&db);
                let scene = add_scene(&db, tour.id, "Lobby");
                let hotspot = add_hotspot(&db, scene.id, "Front Desk");

                assert!(db.delete_tour(tour.id).expect("Failed to delete"));

                assert!(db.get_tour(tour.id).expect("Query failed").is_none());
                assert!(db.get_hotspot(hotspot.id).expect("Query failed").is_none());
            }

            it "returns false for non-existent tour" {
                assert!(!db.delete_tour(Uuid::new_v4()).expect("Delete failed"));
            }
        }

        describe "set_tour_status" {
            it "applies any transition under the unrestricted policy" {
                let tour = create_test_tour(&db);

                let updated = db.set_tour_status(tour.id, TourStatus::Live, &TransitionPolicy::Unrestricted)
                    .expect("Transition failed")
                    .expect("Tour missing");
                assert_eq!(updated.status, TourStatus::Live);

                let updated = db.set_tour_status(tour.id, TourStatus::Pending, &TransitionPolicy::Unrestricted)
                    .expect("Transition failed")
                    .expect("Tour missing");
                assert_eq!(updated.status, TourStatus::Pending);
            }

            it "follows the review pipeline under the review policy" {
                let tour = create_test_tour(&db);

                let approved = db.set_tour_status(tour.id, TourStatus::Approved, &TransitionPolicy::ReviewFlow)
                    .expect("Transition failed")
                    .expect("Tour missing");
                assert_eq!(approved.status, TourStatus::Approved);

                let live = db.set_tour_status(tour.id, TourStatus::Live, &TransitionPolicy::ReviewFlow)
                    .expect("Transition failed")
                    .expect("Tour missing");
                assert_eq!(live.status, TourStatus::Live);
            }

            it "rejects a disallowed transition under the review policy" {
                let tour = create_test_tour(&db);

                let result = db.set_tour_status(tour.id, TourStatus::Live, &TransitionPolicy::ReviewFlow);
                let err = result.expect_err("Transition should be denied").to_string();
                assert!(err.contains("not permitted"));

                // Status unchanged
                let tour = db.get_tour(tour.id).expect("Query failed").expect("Tour missing");
                assert_eq!(tour.status, TourStatus::Pending);
            }

            it "returns None for non-existent tour" {
                let result = db.set_tour_status(Uuid::new_v4(), TourStatus::Approved, &TransitionPolicy::Unrestricted)
                    .expect("Query failed");
                assert!(result.is_none());
            }
        }
    }

    describe "scenes" {
        describe "create_scene" {
            it "appends scenes in creation order" {
                let tour = create_test_tour(&db);
                add_scene(&db, tour.id, "First");
                add_scene(&db, tour.id, "Second");
                add_scene(&db, tour.id, "Third");

                let tour = db.get_tour(tour.id).expect("Query failed").expect("Tour missing");
                let titles: Vec<_> = tour.scenes.iter().map(|s| s.title.as_str()).collect();
                assert_eq!(titles, vec!["First", "Second", "Third"]);
            }

            it "defaults the title when none is given" {
                let tour = create_test_tour(&db);
                let scene = db.create_scene(tour.id, CreateSceneInput {
                    title: None,
                    image: ImageRef::persisted("/images/office-1.jpg"),
                }).expect("Failed to create scene");

                assert_eq!(scene.title, "Untitled Scene");
            }

            it "fails when the tour does not exist" {
                let result = db.create_scene(Uuid::new_v4(), CreateSceneInput {
                    title: None,
                    image: ImageRef::persisted("/images/office-1.jpg"),
                });
                let err = result.expect_err("Create should fail").to_string();
                assert!(err.contains("Tour not found"));
            }
        }

        describe "replace_scene_image" {
            it "swaps the image and leaves hotspots alone" {
                let tour = create_test_tour(&db);
                let scene = add_scene(&db, tour.id, "Lobby");
                add_hotspot(&db, scene.id, "Front Desk");

                let replaced = db.replace_scene_image(scene.id, &ImageRef::pending("blob:lobby-retake"))
                    .expect("Replace failed");
                assert!(replaced);

                let tour = db.get_tour(tour.id).expect("Query failed").expect("Tour missing");
                assert_eq!(tour.scenes[0].image, ImageRef::pending("blob:lobby-retake"));
                assert_eq!(tour.scenes[0].hotspots.len(), 1);
            }

            it "returns false for non-existent scene" {
                let replaced = db.replace_scene_image(Uuid::new_v4(), &ImageRef::persisted("/images/x.jpg"))
                    .expect("Replace failed");
                assert!(!replaced);
            }
        }

        describe "delete_scene" {
            it "deletes the scene and its hotspots" {
                let tour = create_test_tour(&db);
                let scene = add_scene(&db, tour.id, "Lobby");
                let hotspot = add_hotspot(&db, scene.id, "Front Desk");

                assert!(db.delete_scene(scene.id).expect("Delete failed"));
                assert!(db.get_hotspot(hotspot.id).expect("Query failed").is_none());
            }
        }
    }

    describe "hotspots" {
        describe "create_hotspot" {
            it "defaults to an info hotspot with the exact coordinates" {
                let tour = create_test_tour(&db);
                let scene = add_scene(&db, tour.id, "Lobby");

                let hotspot = db.create_hotspot(CreateHotspotInput {
                    scene_id: scene.id,
                    title: "Reception".to_string(),
                    description: None,
                    yaw: 45.0,
                    pitch: -10.0,
                    kind: None,
                    target_scene_id: None,
                }).expect("Failed to create hotspot");

                assert_eq!(hotspot.kind, HotspotKind::Info);
                assert_eq!(hotspot.yaw, 45.0);
                assert_eq!(hotspot.pitch, -10.0);
                assert_eq!(hotspot.scene_id, scene.id);
            }

            it "clamps out-of-range coordinates" {
                let tour = create_test_tour(&db);
                let scene = add_scene(&db, tour.id, "Lobby");

                let hotspot = db.create_hotspot(CreateHotspotInput {
                    scene_id: scene.id,
                    title: "Skylight".to_string(),
                    description: None,
                    yaw: 190.0,
                    pitch: 120.0,
                    kind: None,
                    target_scene_id: None,
                }).expect("Failed to create hotspot");

                assert_eq!(hotspot.yaw, -170.0);
                assert_eq!(hotspot.pitch, 90.0);
            }

            it "fails when the scene does not exist" {
                let result = db.create_hotspot(CreateHotspotInput {
                    scene_id: Uuid::new_v4(),
                    title: "Orphan".to_string(),
                    description: None,
                    yaw: 0.0,
                    pitch: 0.0,
                    kind: None,
                    target_scene_id: None,
                });
                let err = result.expect_err("Create should fail").to_string();
                assert!(err.contains("Scene not found"));
            }

            it "rejects a navigation target from another tour" {
                let tour = create_test_tour(&db);
                let scene = add_scene(&db, tour.id, "Lobby");
                let other = create_test_tour(&db);
                let foreign = add_scene(&db, other.id, "Elsewhere");

                let result = db.create_hotspot(CreateHotspotInput {
                    scene_id: scene.id,
                    title: "Wormhole".to_string(),
                    description: None,
                    yaw: 0.0,
                    pitch: 0.0,
                    kind: Some(HotspotKind::Scene),
                    target_scene_id: Some(foreign.id),
                });
                let err = result.expect_err("Create should fail").to_string();
                assert!(err.contains("Target scene not found"));
            }
        }

        describe "update_hotspot" {
            it "patches only the provided fields" {
                let tour = create_test_tour(&db);
                let scene = add_scene(&db, tour.id, "Lobby");
                let hotspot = add_hotspot(&db, scene.id, "Reception");

                let updated = db.update_hotspot(hotspot.id, UpdateHotspotInput {
                    title: Some("Front Desk".to_string()),
                    ..Default::default()
                }).expect("Update failed").expect("Hotspot missing");

                assert_eq!(updated.title, "Front Desk");
                assert_eq!(updated.yaw, hotspot.yaw);
                assert_eq!(updated.pitch, hotspot.pitch);
                assert_eq!(updated.scene_id, hotspot.scene_id);
                assert_eq!(updated.kind, hotspot.kind);
            }

            it "returns None for non-existent hotspot" {
                let result = db.update_hotspot(Uuid::new_v4(), UpdateHotspotInput {
                    title: Some("X".to_string()),
                    ..Default::default()
                }).expect("Update failed");
                assert!(result.is_none());
            }
        }

        describe "delete_hotspot" {
            it "removes the hotspot" {
                let tour = create_test_tour(&db);
                let scene = add_scene(&db, tour.id, "Lobby");
                let hotspot = add_hotspot(&db, scene.id, "Reception");

                assert!(db.delete_hotspot(hotspot.id).expect("Delete failed"));
                assert!(db.get_hotspot(hotspot.id).expect("Query failed").is_none());
            }

            it "reports false for an id that is already gone" {
                assert!(!db.delete_hotspot(Uuid::new_v4()).expect("Delete failed"));
            }
        }
    }

    describe "seed_demo" {
        it "creates tours with scene chains" {
            let tours = db.seed_demo().expect("Seed failed");
            assert_eq!(tours.len(), 3);
            for tour in &tours {
                assert!(!tour.scenes.is_empty());
                assert_eq!(tour.status, TourStatus::Pending);
            }
        }
    }
}

#[test]
fn open_creates_database_file() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("nested").join("pano-desk.db");

    let db = Database::open(path.clone()).expect("Failed to open database");
    db.migrate().expect("Failed to migrate");

    assert!(path.exists());
}
