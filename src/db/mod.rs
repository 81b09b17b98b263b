mod schema;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension};
use uuid::Uuid;

use crate::models::*;

/// SQLite-backed tour store.
///
/// This is the backing state of the sync boundary: the single source of
/// truth that editor sessions fetch from and push mutations to. Constructed
/// once per process (or per test) and passed by handle; never a module-level
/// global.
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open(path: PathBuf) -> Result<Self> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Database path has no parent directory"))?;
        std::fs::create_dir_all(parent)?;
        let conn = Connection::open(&path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_default() -> Result<Self> {
        let dirs = directories::ProjectDirs::from("", "", "pano-desk")
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
        let db_path = dirs.data_dir().join("pano-desk.db");
        Self::open(db_path)
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock().expect("database lock poisoned");
        schema::run_migrations(&conn)
    }

    // ============================================================
    // Tour operations
    // ============================================================

    pub fn get_all_tours(&self) -> Result<Vec<Tour>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, client_id, client_name, title, description, status, created_at, updated_at
             FROM tours ORDER BY created_at, title",
        )?;

        let shells = stmt
            .query_map([], tour_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        drop(stmt);

        let mut tours = Vec::with_capacity(shells.len());
        for mut tour in shells {
            tour.scenes = scenes_for_tour(&conn, tour.id)?;
            tours.push(tour);
        }

        Ok(tours)
    }

    pub fn get_tour(&self, id: Uuid) -> Result<Option<Tour>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        load_tour(&conn, id)
    }

    pub fn create_tour(&self, input: CreateTourInput) -> Result<Tour> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let id = Uuid::new_v4();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO tours (id, client_id, client_name, title, description, status, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, 'pending', ?, ?)",
            (
                id.to_string(),
                input.client_id.to_string(),
                &input.client_name,
                &input.title,
                &input.description,
                now.to_rfc3339(),
                now.to_rfc3339(),
            ),
        )?;

        Ok(Tour {
            id,
            client_id: input.client_id,
            client_name: input.client_name,
            title: input.title,
            description: input.description,
            status: TourStatus::Pending,
            scenes: Vec::new(),
            created_at: now,
            updated_at: now,
        })
    }

    pub fn delete_tour(&self, id: Uuid) -> Result<bool> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let rows = conn.execute("DELETE FROM tours WHERE id = ?", [id.to_string()])?;
        Ok(rows > 0)
    }

    /// Apply a reviewer status change, subject to the configured policy.
    /// Returns the updated tour, or `None` when the tour does not exist.
    pub fn set_tour_status(
        &self,
        id: Uuid,
        to: TourStatus,
        policy: &TransitionPolicy,
    ) -> Result<Option<Tour>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let Some(mut tour) = load_tour(&conn, id)? else {
            return Ok(None);
        };

        if !policy.permits(tour.status, to) {
            anyhow::bail!(
                "Status change from {} to {} is not permitted",
                tour.status,
                to
            );
        }

        let now = Utc::now();
        conn.execute(
            "UPDATE tours SET status = ?, updated_at = ? WHERE id = ?",
            (to.as_str(), now.to_rfc3339(), id.to_string()),
        )?;

        tour.status = to;
        tour.updated_at = now;
        Ok(Some(tour))
    }

    // ============================================================
    // Scene operations
    // ============================================================

    pub fn create_scene(&self, tour_id: Uuid, input: CreateSceneInput) -> Result<Scene> {
        let conn = self.conn.lock().expect("database lock poisoned");
        if !tour_exists(&conn, tour_id)? {
            anyhow::bail!("Tour not found");
        }

        let id = Uuid::new_v4();
        let now = Utc::now();
        let title = input
            .title
            .unwrap_or_else(|| "Untitled Scene".to_string());

        // Append at the end of the tour's scene order
        let position: i64 = conn.query_row(
            "SELECT COALESCE(MAX(position) + 1, 0) FROM scenes WHERE tour_id = ?",
            [tour_id.to_string()],
            |row| row.get(0),
        )?;

        conn.execute(
            "INSERT INTO scenes (id, tour_id, title, image_state, image_ref, position, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            (
                id.to_string(),
                tour_id.to_string(),
                &title,
                input.image.state_str(),
                input.image.as_str(),
                position,
                now.to_rfc3339(),
                now.to_rfc3339(),
            ),
        )?;

        Ok(Scene {
            id,
            tour_id,
            title,
            image: input.image,
            hotspots: Vec::new(),
            created_at: now,
            updated_at: now,
        })
    }

    pub fn delete_scene(&self, id: Uuid) -> Result<bool> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let rows = conn.execute("DELETE FROM scenes WHERE id = ?", [id.to_string()])?;
        Ok(rows > 0)
    }

    /// Swap a scene's panoramic image; hotspots are untouched.
    pub fn replace_scene_image(&self, scene_id: Uuid, image: &ImageRef) -> Result<bool> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let now = Utc::now();
        let rows = conn.execute(
            "UPDATE scenes SET image_state = ?, image_ref = ?, updated_at = ? WHERE id = ?",
            (
                image.state_str(),
                image.as_str(),
                now.to_rfc3339(),
                scene_id.to_string(),
            ),
        )?;
        Ok(rows > 0)
    }

    // ============================================================
    // Hotspot operations
    // ============================================================

    pub fn get_hotspot(&self, id: Uuid) -> Result<Option<Hotspot>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, scene_id, title, description, yaw, pitch, kind, target_scene_id, created_at, updated_at
             FROM hotspots WHERE id = ?",
        )?;

        let hotspot = stmt
            .query_row([id.to_string()], hotspot_from_row)
            .optional()?;
        Ok(hotspot)
    }

    pub fn create_hotspot(&self, input: CreateHotspotInput) -> Result<Hotspot> {
        let conn = self.conn.lock().expect("database lock poisoned");

        // The owning scene must exist, and a navigation target must belong
        // to the same tour.
        let owning_tour: Option<String> = conn
            .query_row(
                "SELECT tour_id FROM scenes WHERE id = ?",
                [input.scene_id.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        let Some(owning_tour) = owning_tour else {
            anyhow::bail!("Scene not found");
        };

        if let Some(target) = input.target_scene_id {
            let target_tour: Option<String> = conn
                .query_row(
                    "SELECT tour_id FROM scenes WHERE id = ?",
                    [target.to_string()],
                    |row| row.get(0),
                )
                .optional()?;
            if target_tour.as_deref() != Some(owning_tour.as_str()) {
                anyhow::bail!("Target scene not found in this tour");
            }
        }

        let id = Uuid::new_v4();
        let now = Utc::now();
        let kind = input.kind.unwrap_or(HotspotKind::Info);
        let yaw = wrap_yaw(input.yaw);
        let pitch = clamp_pitch(input.pitch);

        conn.execute(
            "INSERT INTO hotspots (id, scene_id, title, description, yaw, pitch, kind, target_scene_id, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            (
                id.to_string(),
                input.scene_id.to_string(),
                &input.title,
                &input.description,
                yaw,
                pitch,
                kind.as_str(),
                input.target_scene_id.map(|u| u.to_string()),
                now.to_rfc3339(),
                now.to_rfc3339(),
            ),
        )?;

        Ok(Hotspot {
            id,
            scene_id: input.scene_id,
            title: input.title,
            description: input.description,
            yaw,
            pitch,
            kind,
            target_scene_id: input.target_scene_id,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn update_hotspot(&self, id: Uuid, input: UpdateHotspotInput) -> Result<Option<Hotspot>> {
        let Some(existing) = self.get_hotspot(id)? else {
            return Ok(None);
        };

        let conn = self.conn.lock().expect("database lock poisoned");
        let now = Utc::now();
        let title = input.title.unwrap_or(existing.title);
        let description = input.description.or(existing.description);
        let yaw = input.yaw.map(wrap_yaw).unwrap_or(existing.yaw);
        let pitch = input.pitch.map(clamp_pitch).unwrap_or(existing.pitch);

        conn.execute(
            "UPDATE hotspots SET title = ?, description = ?, yaw = ?, pitch = ?, updated_at = ? WHERE id = ?",
            (
                &title,
                &description,
                yaw,
                pitch,
                now.to_rfc3339(),
                id.to_string(),
            ),
        )?;

        Ok(Some(Hotspot {
            id,
            scene_id: existing.scene_id,
            title,
            description,
            yaw,
            pitch,
            kind: existing.kind,
            target_scene_id: existing.target_scene_id,
            created_at: existing.created_at,
            updated_at: now,
        }))
    }

    pub fn delete_hotspot(&self, id: Uuid) -> Result<bool> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let rows = conn.execute("DELETE FROM hotspots WHERE id = ?", [id.to_string()])?;
        Ok(rows > 0)
    }

    // ============================================================
    // Demo data
    // ============================================================

    /// Seed a handful of demo tours with scene chains, for running the
    /// console without real client submissions.
    pub fn seed_demo(&self) -> Result<Vec<Tour>> {
        let demo = [
            ("Grandview Hotel", "Grandview Hotel 360° Tour", 5),
            ("Lakeside Medical Center", "Lakeside Medical 360° Tour", 4),
            ("Northfield Academy", "Northfield Campus 360° Tour", 3),
        ];

        let mut tours = Vec::new();
        let mut image_index = 1;
        for (client_name, title, scene_count) in demo {
            let tour = self.create_tour(CreateTourInput {
                client_id: Uuid::new_v4(),
                client_name: client_name.to_string(),
                title: title.to_string(),
                description: None,
            })?;

            for i in 0..scene_count {
                self.create_scene(
                    tour.id,
                    CreateSceneInput {
                        title: Some(format!("Scene {}", i + 1)),
                        image: ImageRef::persisted(format!("/images/office-{}.jpg", image_index)),
                    },
                )?;
                image_index += 1;
            }

            let seeded = self
                .get_tour(tour.id)?
                .ok_or_else(|| anyhow::anyhow!("Seeded tour disappeared"))?;
            tours.push(seeded);
        }

        Ok(tours)
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
        }
    }
}

// ============================================================
// Row mapping
// ============================================================

fn tour_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Tour> {
    Ok(Tour {
        id: parse_uuid(row.get::<_, String>(0)?),
        client_id: parse_uuid(row.get::<_, String>(1)?),
        client_name: row.get(2)?,
        title: row.get(3)?,
        description: row.get(4)?,
        status: TourStatus::from_str(&row.get::<_, String>(5)?).unwrap_or(TourStatus::Pending),
        scenes: Vec::new(),
        created_at: parse_datetime(row.get::<_, String>(6)?),
        updated_at: parse_datetime(row.get::<_, String>(7)?),
    })
}

fn scene_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Scene> {
    let image_state: String = row.get(3)?;
    let image_ref: String = row.get(4)?;
    Ok(Scene {
        id: parse_uuid(row.get::<_, String>(0)?),
        tour_id: parse_uuid(row.get::<_, String>(1)?),
        title: row.get(2)?,
        image: ImageRef::from_parts(&image_state, image_ref),
        hotspots: Vec::new(),
        created_at: parse_datetime(row.get::<_, String>(5)?),
        updated_at: parse_datetime(row.get::<_, String>(6)?),
    })
}

fn hotspot_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Hotspot> {
    Ok(Hotspot {
        id: parse_uuid(row.get::<_, String>(0)?),
        scene_id: parse_uuid(row.get::<_, String>(1)?),
        title: row.get(2)?,
        description: row.get(3)?,
        yaw: row.get(4)?,
        pitch: row.get(5)?,
        kind: HotspotKind::from_str(&row.get::<_, String>(6)?).unwrap_or(HotspotKind::Info),
        target_scene_id: row.get::<_, Option<String>>(7)?.map(parse_uuid),
        created_at: parse_datetime(row.get::<_, String>(8)?),
        updated_at: parse_datetime(row.get::<_, String>(9)?),
    })
}

fn tour_exists(conn: &Connection, id: Uuid) -> Result<bool> {
    let count: i32 = conn.query_row(
        "SELECT COUNT(*) FROM tours WHERE id = ?",
        [id.to_string()],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

fn load_tour(conn: &Connection, id: Uuid) -> Result<Option<Tour>> {
    let mut stmt = conn.prepare(
        "SELECT id, client_id, client_name, title, description, status, created_at, updated_at
         FROM tours WHERE id = ?",
    )?;

    let tour = stmt
        .query_row([id.to_string()], tour_from_row)
        .optional()?;
    drop(stmt);

    match tour {
        Some(mut tour) => {
            tour.scenes = scenes_for_tour(conn, tour.id)?;
            Ok(Some(tour))
        }
        None => Ok(None),
    }
}

fn scenes_for_tour(conn: &Connection, tour_id: Uuid) -> Result<Vec<Scene>> {
    let mut stmt = conn.prepare(
        "SELECT id, tour_id, title, image_state, image_ref, created_at, updated_at
         FROM scenes WHERE tour_id = ? ORDER BY position",
    )?;

    let mut scenes = stmt
        .query_map([tour_id.to_string()], scene_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    drop(stmt);

    for scene in &mut scenes {
        scene.hotspots = hotspots_for_scene(conn, scene.id)?;
    }

    Ok(scenes)
}

fn hotspots_for_scene(conn: &Connection, scene_id: Uuid) -> Result<Vec<Hotspot>> {
    let mut stmt = conn.prepare(
        "SELECT id, scene_id, title, description, yaw, pitch, kind, target_scene_id, created_at, updated_at
         FROM hotspots WHERE scene_id = ? ORDER BY created_at",
    )?;

    let hotspots = stmt
        .query_map([scene_id.to_string()], hotspot_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(hotspots)
}

fn parse_uuid(s: String) -> Uuid {
    Uuid::parse_str(&s).unwrap_or_else(|_| Uuid::nil())
}

fn parse_datetime(s: String) -> chrono::DateTime<Utc> {
    chrono::DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
