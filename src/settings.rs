//! Gameplay tuning
//!
//! Every constant of the game lives here so a page (or the native runner)
//! can override it from JSON. Missing fields fall back to the defaults.

use serde::{Deserialize, Serialize};

/// Gameplay settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Blocks ===
    /// Height of every layer
    pub box_height: f32,
    /// Width and depth of the foundation and the first mover
    pub box_size: f32,
    /// Coordinate a new mover starts from on its motion axis
    pub spawn_offset: f32,
    /// A mover that slides past this coordinate has missed
    pub travel_limit: f32,
    /// Slide speed in units per millisecond
    pub slide_speed: f32,

    // === Physics ===
    /// Gravity along y (negative is down)
    pub gravity: f32,
    /// Mass of a full-size debris box; smaller pieces scale by area
    pub overhang_mass: f32,
    /// Debris below this height is removed from the world
    pub debris_floor: f32,
    /// Most debris pieces alive at once (oldest evicted first)
    pub max_debris: usize,
    /// Constraint solver iterations per physics step
    pub solver_iterations: usize,

    // === Autopilot ===
    /// Autopilot bias is drawn uniformly from [-spread, +spread]
    pub autopilot_spread: f32,

    // === Camera ===
    /// Orthographic view width in world units
    pub camera_width: f32,
    /// How far above the settled stack the camera keeps itself
    pub camera_lead: f32,

    // === Frame loop ===
    /// Longest frame time honoured, in milliseconds (tab switches etc.)
    pub max_frame_ms: f32,

    // === Colours ===
    /// Hue of the foundation, in degrees
    pub hue_base: f32,
    /// Hue added per layer, in degrees
    pub hue_step: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            box_height: 1.0,
            box_size: 3.0,
            spawn_offset: -10.0,
            travel_limit: 10.0,
            slide_speed: 0.008,

            gravity: -10.0,
            overhang_mass: 5.0,
            debris_floor: -20.0,
            max_debris: 64,
            solver_iterations: 10,

            autopilot_spread: 0.5,

            camera_width: 10.0,
            camera_lead: 4.0,

            max_frame_ms: 100.0,

            hue_base: 30.0,
            hue_step: 4.0,
        }
    }
}

impl Settings {
    /// Parse settings from JSON, then clamp anything unusable
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let settings: Settings = serde_json::from_str(json)?;
        Ok(settings.sanitized())
    }

    /// Clamp values that would break the game into a playable range
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !(self.box_height > 0.0) {
            self.box_height = defaults.box_height;
        }
        if !(self.box_size > 0.0) {
            self.box_size = defaults.box_size;
        }
        if !(self.slide_speed > 0.0) {
            self.slide_speed = defaults.slide_speed;
        }
        // The mover must start behind the bound it is checked against
        if !(self.travel_limit > self.spawn_offset) {
            self.spawn_offset = defaults.spawn_offset;
            self.travel_limit = defaults.travel_limit;
        }
        if !(self.overhang_mass > 0.0) {
            self.overhang_mass = defaults.overhang_mass;
        }
        self.autopilot_spread = self.autopilot_spread.abs();
        if !self.autopilot_spread.is_finite() {
            self.autopilot_spread = defaults.autopilot_spread;
        }
        if !(self.camera_width > 0.0) {
            self.camera_width = defaults.camera_width;
        }
        if !(self.max_frame_ms > 0.0) {
            self.max_frame_ms = defaults.max_frame_ms;
        }
        self.max_debris = self.max_debris.max(1);
        self.solver_iterations = self.solver_iterations.max(1);
        self
    }

    /// Mass of a debris box with the given footprint
    pub fn overhang_mass_for(&self, width: f32, depth: f32) -> f32 {
        self.overhang_mass * (width / self.box_size) * (depth / self.box_size)
    }

    /// LocalStorage key for setting overrides
    #[cfg(target_arch = "wasm32")]
    const STORAGE_KEY: &'static str = "tower_stack_settings";

    /// Load setting overrides from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Native stub
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }
}
