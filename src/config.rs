//! Engine configuration.
//!
//! Settings load from an INI file with safe defaults for every value, so a
//! missing or partial file still starts the engine. Mount validation
//! happens once, fatally, at game construction; nothing inside the frame
//! loop ever consults the config again.
//!
//! # Configuration File Format
//!
//! ```ini
//! [display]
//! width = 800
//! height = 600
//! element = lienzo
//! parent = #stage
//!
//! [loop]
//! fps = 60
//! max_frames_skipped = 5
//! debug_bounds = false
//! ```

use configparser::ini::Ini;
use log::info;
use std::path::PathBuf;
use thiserror::Error;

/// Default safe values for startup
const DEFAULT_DISPLAY_WIDTH: u32 = 800;
const DEFAULT_DISPLAY_HEIGHT: u32 = 600;
const DEFAULT_ELEMENT_ID: &str = "lienzo";
const DEFAULT_FPS: u32 = 60;
const DEFAULT_MAX_FRAMES_SKIPPED: u32 = 5;
const DEFAULT_CONFIG_PATH: &str = "./config.ini";

/// Fatal construction/configuration failures. Everything past setup is
/// absorbed inside the frame loop instead of surfacing errors.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid parent selector {0:?}: selector strings must start with '#'")]
    InvalidParentSelector(String),
    #[error("failed to load config file: {0}")]
    ConfigLoad(String),
    #[error("failed to save config file: {0}")]
    ConfigSave(String),
    #[error("no usable drawing surface (reported size {0}x{1})")]
    MissingSurface(f32, f32),
}

/// Where the host should mount the display element.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ParentRef {
    /// Host default container.
    #[default]
    Document,
    /// `#id`-style selector resolved by the host.
    Selector(String),
    /// Direct handle to a host container, supplied programmatically.
    Handle(u64),
}

/// Engine configuration resource.
///
/// Missing INI values retain their defaults; [`GameConfig::validate`] runs
/// at game construction and rejects malformed mount settings.
#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    /// Display width in pixels.
    pub display_width: u32,
    /// Display height in pixels.
    pub display_height: u32,
    /// Identifier for the display element the host creates.
    pub element_id: String,
    /// Where to mount the display element.
    pub parent: ParentRef,
    /// Target frames per second for the loop driver.
    pub fps: u32,
    /// Upper bound on catch-up work after a stall, in skipped frames.
    pub max_frames_skipped: u32,
    /// Draw each sprite's bounding box after its own draw call.
    pub debug_bounds: bool,
    /// Path to the configuration file.
    pub config_path: PathBuf,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl GameConfig {
    /// Create a new configuration with safe default values.
    pub fn new() -> Self {
        Self {
            display_width: DEFAULT_DISPLAY_WIDTH,
            display_height: DEFAULT_DISPLAY_HEIGHT,
            element_id: DEFAULT_ELEMENT_ID.to_string(),
            parent: ParentRef::Document,
            fps: DEFAULT_FPS,
            max_frames_skipped: DEFAULT_MAX_FRAMES_SKIPPED,
            debug_bounds: false,
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    /// Create a new configuration with a custom config file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// Mount into a host container by direct handle.
    pub fn with_parent_handle(mut self, handle: u64) -> Self {
        self.parent = ParentRef::Handle(handle);
        self
    }

    /// Mount into the container matched by a `#id` selector. Validation of
    /// the leading `#` happens in [`GameConfig::validate`].
    pub fn with_parent_selector(mut self, selector: impl Into<String>) -> Self {
        self.parent = ParentRef::Selector(selector.into());
        self
    }

    /// Load configuration from the INI file.
    ///
    /// Missing values retain their current (default) values. Returns an
    /// error if the file cannot be read or parsed.
    pub fn load_from_file(&mut self) -> Result<(), EngineError> {
        let mut config = Ini::new();
        config
            .load(&self.config_path)
            .map_err(EngineError::ConfigLoad)?;

        // [display] section
        if let Some(width) = config.getuint("display", "width").ok().flatten() {
            self.display_width = width as u32;
        }
        if let Some(height) = config.getuint("display", "height").ok().flatten() {
            self.display_height = height as u32;
        }
        if let Some(element) = config.get("display", "element") {
            self.element_id = element;
        }
        if let Some(parent) = config.get("display", "parent") {
            self.parent = ParentRef::Selector(parent);
        }

        // [loop] section
        if let Some(fps) = config.getuint("loop", "fps").ok().flatten() {
            self.fps = fps as u32;
        }
        if let Some(skip) = config.getuint("loop", "max_frames_skipped").ok().flatten() {
            self.max_frames_skipped = skip as u32;
        }
        if let Some(debug) = config.getbool("loop", "debug_bounds").ok().flatten() {
            self.debug_bounds = debug;
        }

        info!(
            "Loaded config: {}x{} display, element={}, fps={}, max_frames_skipped={}, debug_bounds={}",
            self.display_width,
            self.display_height,
            self.element_id,
            self.fps,
            self.max_frames_skipped,
            self.debug_bounds
        );

        Ok(())
    }

    /// Save configuration to the INI file. Creates the file if it doesn't
    /// exist.
    pub fn save_to_file(&self) -> Result<(), EngineError> {
        let mut config = Ini::new();

        // [display] section
        config.set("display", "width", Some(self.display_width.to_string()));
        config.set("display", "height", Some(self.display_height.to_string()));
        config.set("display", "element", Some(self.element_id.clone()));
        if let ParentRef::Selector(selector) = &self.parent {
            config.set("display", "parent", Some(selector.clone()));
        }

        // [loop] section
        config.set("loop", "fps", Some(self.fps.to_string()));
        config.set(
            "loop",
            "max_frames_skipped",
            Some(self.max_frames_skipped.to_string()),
        );
        config.set("loop", "debug_bounds", Some(self.debug_bounds.to_string()));

        config
            .write(&self.config_path)
            .map_err(|e| EngineError::ConfigSave(e.to_string()))?;

        info!("Saved config to {:?}", self.config_path);

        Ok(())
    }

    /// Reject malformed mount settings. Selector strings must be `#id`
    /// form; handles and the document default are always valid.
    pub fn validate(&self) -> Result<(), EngineError> {
        if let ParentRef::Selector(selector) = &self.parent
            && !selector.starts_with('#')
        {
            return Err(EngineError::InvalidParentSelector(selector.clone()));
        }
        Ok(())
    }

    /// Display size as floats, for surface comparisons.
    pub fn display_size(&self) -> (f32, f32) {
        (self.display_width as f32, self.display_height as f32)
    }

    /// Frame budget at the configured fps.
    pub fn frame_millis(&self) -> f32 {
        1000.0 / self.fps.max(1) as f32
    }

    /// The catch-up clamp: longest delta one tick is allowed to integrate.
    pub fn max_tick_millis(&self) -> f32 {
        self.frame_millis() * self.max_frames_skipped.max(1) as f32
    }
}
