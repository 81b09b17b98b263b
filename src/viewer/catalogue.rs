//! Render-time scene catalogue for the panoramic engine.
//!
//! The engine consumes one document per tour: a map of scene id to scene
//! definition, each carrying the panorama reference and a flat `hotSpots`
//! list. Explicit hotspots are tagged `info`; navigation links between
//! consecutive scenes are synthesized here on every render and tagged
//! `scene`. Derived hotspots never enter the stored model; their string
//! ids carry the `auto-` prefix so the editing layer can refuse them.

use std::collections::BTreeMap;

use serde::Serialize;
use uuid::Uuid;

use crate::models::{Hotspot, HotspotKind, Scene, Tour};

/// Id prefix for derived navigation hotspots.
pub const AUTO_PREFIX: &str = "auto-";

/// Crossfade duration handed to the engine, in milliseconds.
const SCENE_FADE_MS: u32 = 500;

/// A hotspot in the engine's expected shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HotspotView {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: HotspotKind,
    pub title: String,
    pub yaw: f64,
    pub pitch: f64,
    /// Jump target for `scene` hotspots; the engine's field name.
    #[serde(rename = "sceneId", skip_serializing_if = "Option::is_none")]
    pub target_scene_id: Option<Uuid>,
}

impl HotspotView {
    /// Engine shape of a stored, operator-placed hotspot.
    pub fn from_hotspot(hotspot: &Hotspot) -> Self {
        Self {
            id: hotspot.id.to_string(),
            kind: hotspot.kind,
            title: hotspot.title.clone(),
            yaw: hotspot.yaw,
            pitch: hotspot.pitch,
            target_scene_id: match hotspot.kind {
                HotspotKind::Scene => hotspot.target_scene_id,
                HotspotKind::Info => None,
            },
        }
    }

    /// Whether this view is a derived navigation hotspot rather than a
    /// stored one.
    pub fn is_synthetic(&self) -> bool {
        self.id.starts_with(AUTO_PREFIX)
    }
}

/// A scene in the engine's expected shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneView {
    pub title: String,
    #[serde(rename = "type")]
    pub projection: &'static str,
    pub panorama: String,
    #[serde(rename = "hotSpots")]
    pub hot_spots: Vec<HotspotView>,
}

impl SceneView {
    /// Build the display list for one scene: its explicit hotspots followed
    /// by whatever navigation hotspots scene order derives for it.
    pub fn for_scene(scene: &Scene, derived: &[HotspotView]) -> Self {
        let mut hot_spots: Vec<HotspotView> =
            scene.hotspots.iter().map(HotspotView::from_hotspot).collect();
        hot_spots.extend(derived.iter().cloned());

        Self {
            title: scene.title.clone(),
            projection: "equirectangular",
            panorama: scene.image.as_str().to_string(),
            hot_spots,
        }
    }
}

/// Synthesize the navigation hotspots implied by scene order.
///
/// For every scene except the last, exactly one `scene` hotspot pointing to
/// the next scene in sequence, at yaw 0 / pitch 0, with id
/// `auto-<nextSceneId>`. Pure function of the scene sequence: repeated calls
/// yield identical output, and nothing here is ever persisted.
pub fn derive_auto_navigation_hotspots(scenes: &[Scene]) -> BTreeMap<Uuid, Vec<HotspotView>> {
    let mut derived = BTreeMap::new();
    for pair in scenes.windows(2) {
        let (scene, next) = (&pair[0], &pair[1]);
        derived.insert(
            scene.id,
            vec![HotspotView {
                id: format!("{}{}", AUTO_PREFIX, next.id),
                kind: HotspotKind::Scene,
                title: format!("Go to {}", next.title),
                yaw: 0.0,
                pitch: 0.0,
                target_scene_id: Some(next.id),
            }],
        );
    }
    derived
}

/// Engine defaults block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewerDefaults {
    #[serde(rename = "firstScene")]
    pub first_scene: Option<String>,
    #[serde(rename = "autoLoad")]
    pub auto_load: bool,
    #[serde(rename = "sceneFadeDuration")]
    pub scene_fade_duration: u32,
}

/// The complete initialization document handed to the panoramic engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewerInit {
    pub default: ViewerDefaults,
    pub scenes: BTreeMap<String, SceneView>,
}

impl ViewerInit {
    /// Build the engine document for a tour. A tour with no scenes produces
    /// an empty catalogue and no first scene; the viewer shows an empty
    /// state rather than an error.
    pub fn for_tour(tour: &Tour) -> Self {
        let derived = derive_auto_navigation_hotspots(&tour.scenes);

        let scenes = tour
            .scenes
            .iter()
            .map(|scene| {
                let nav = derived.get(&scene.id).map(Vec::as_slice).unwrap_or(&[]);
                (scene.id.to_string(), SceneView::for_scene(scene, nav))
            })
            .collect();

        Self {
            default: ViewerDefaults {
                first_scene: tour.first_scene().map(|s| s.id.to_string()),
                auto_load: true,
                scene_fade_duration: SCENE_FADE_MS,
            },
            scenes,
        }
    }
}
