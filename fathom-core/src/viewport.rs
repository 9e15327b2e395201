use rug::Integer;
use serde::Serialize;
use tracing::debug;

use crate::error::CoreError;

/// Logical grid dimensions derived from screen size and resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSize {
    /// Grid width in cells.
    pub width: u32,
    /// Grid height in cells.
    pub height: u32,
}

impl GridSize {
    /// Total number of cells in the grid.
    pub fn cells(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Camera state over the fractal plane.
///
/// Pan offsets and the zoom denominator are arbitrary-precision integers.
/// The zoom denominator acts as a fixed-point scale for plane coordinates
/// (larger means deeper), so zoom depth is unbounded: the representation
/// never degrades the way a floating-point scale would. Pan offsets are
/// expressed in grid-cell units at the current scale.
///
/// The logical grid the engine evaluates is decoupled from the device
/// screen through `resolution`, a sampling density percentage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Viewport {
    pan_x: Integer,
    pan_y: Integer,
    zoom: Integer,
    resolution: u8,
    screen_width: u32,
    screen_height: u32,
}

impl Viewport {
    /// Initial zoom denominator: the full set is visible on a typical screen.
    pub const DEFAULT_ZOOM: u32 = 200;
    /// Initial sampling density: one grid cell per device pixel.
    pub const DEFAULT_RESOLUTION: u8 = 100;

    /// Default view centred on the plane origin.
    pub fn new(screen_width: u32, screen_height: u32) -> crate::Result<Self> {
        Self::with_state(
            Integer::new(),
            Integer::new(),
            Integer::from(Self::DEFAULT_ZOOM),
            Self::DEFAULT_RESOLUTION,
            screen_width,
            screen_height,
        )
    }

    /// Create a viewport with explicit parameters.
    ///
    /// Deserialization and session restore route through here so that any
    /// externally supplied state is validated before use.
    pub fn with_state(
        pan_x: Integer,
        pan_y: Integer,
        zoom: Integer,
        resolution: u8,
        screen_width: u32,
        screen_height: u32,
    ) -> crate::Result<Self> {
        if screen_width == 0 || screen_height == 0 {
            return Err(CoreError::InvalidViewport {
                reason: format!("screen dimensions must be > 0, got {screen_width}×{screen_height}"),
            });
        }
        if !(1..=100).contains(&resolution) {
            return Err(CoreError::InvalidResolution(resolution));
        }
        if zoom < 1 {
            return Err(CoreError::InvalidViewport {
                reason: format!("zoom denominator must be >= 1, got {zoom}"),
            });
        }
        Ok(Self {
            pan_x,
            pan_y,
            zoom,
            resolution,
            screen_width,
            screen_height,
        })
    }

    /// Horizontal pan offset in grid-cell units at the current scale.
    #[inline]
    pub fn pan_x(&self) -> &Integer {
        &self.pan_x
    }

    /// Vertical pan offset in grid-cell units at the current scale.
    #[inline]
    pub fn pan_y(&self) -> &Integer {
        &self.pan_y
    }

    /// The zoom denominator. Always >= 1.
    #[inline]
    pub fn zoom(&self) -> &Integer {
        &self.zoom
    }

    /// Sampling density as a percentage of screen pixels.
    pub fn resolution(&self) -> u8 {
        self.resolution
    }

    /// Screen size in device pixels.
    pub fn screen(&self) -> (u32, u32) {
        (self.screen_width, self.screen_height)
    }

    /// The logical grid dimensions: `screen × resolution / 100`, at least
    /// one cell per axis.
    pub fn grid(&self) -> GridSize {
        GridSize {
            width: (self.screen_width * u32::from(self.resolution) / 100).max(1),
            height: (self.screen_height * u32::from(self.resolution) / 100).max(1),
        }
    }

    /// Translate the view by a screen-space delta.
    ///
    /// The delta is converted to grid cells through the resolution ratio.
    /// Returns the applied grid-space delta so the caller can shift any
    /// cached color data to match.
    pub fn pan(&mut self, dx: i64, dy: i64) -> (i64, i64) {
        let gdx = dx * i64::from(self.resolution) / 100;
        let gdy = dy * i64::from(self.resolution) / 100;
        self.pan_x += gdx;
        self.pan_y += gdy;
        debug!(gdx, gdy, "viewport panned");
        (gdx, gdy)
    }

    /// Zoom in by an integer factor toward a grid point.
    ///
    /// The zoom denominator and both pan offsets are scaled by `factor`,
    /// then the pan is corrected by `(clicked − center) × (factor − 1)`.
    /// The correction keeps the clicked plane point stationary on the grid
    /// while the rest of the view contracts toward it.
    pub fn zoom_at(&mut self, gx: u32, gy: u32, factor: u32) -> crate::Result<()> {
        if factor < 2 {
            return Err(CoreError::InvalidZoomFactor(factor));
        }
        let grid = self.grid();
        if gx >= grid.width || gy >= grid.height {
            return Err(CoreError::InvalidViewport {
                reason: format!(
                    "zoom point ({gx}, {gy}) outside grid {}×{}",
                    grid.width, grid.height
                ),
            });
        }

        self.zoom *= factor;
        self.pan_x *= factor;
        self.pan_y *= factor;

        let stretch = i64::from(factor - 1);
        let dx = (i64::from(gx) - i64::from(grid.width / 2)) * stretch;
        let dy = (i64::from(gy) - i64::from(grid.height / 2)) * stretch;
        self.pan_x -= dx;
        self.pan_y -= dy;

        debug!(gx, gy, factor, "viewport zoomed");
        Ok(())
    }

    /// Change the sampling density. Does not alter pan or zoom.
    pub fn set_resolution(&mut self, percent: u8) -> crate::Result<()> {
        if !(1..=100).contains(&percent) {
            return Err(CoreError::InvalidResolution(percent));
        }
        self.resolution = percent;
        Ok(())
    }

    /// Change the screen size. Does not alter pan or zoom.
    pub fn resize(&mut self, width: u32, height: u32) -> crate::Result<()> {
        if width == 0 || height == 0 {
            return Err(CoreError::InvalidViewport {
                reason: format!("screen dimensions must be > 0, got {width}×{height}"),
            });
        }
        self.screen_width = width;
        self.screen_height = height;
        Ok(())
    }
}

/// Helper for deserialization. Restored state is re-validated on load so a
/// tampered or stale snapshot cannot violate the viewport invariants.
impl<'de> serde::Deserialize<'de> for Viewport {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(serde::Deserialize)]
        struct Raw {
            pan_x: Integer,
            pan_y: Integer,
            zoom: Integer,
            resolution: u8,
            screen_width: u32,
            screen_height: u32,
        }
        let raw = Raw::deserialize(deserializer)?;
        Viewport::with_state(
            raw.pan_x,
            raw.pan_y,
            raw.zoom,
            raw.resolution,
            raw.screen_width,
            raw.screen_height,
        )
        .map_err(serde::de::Error::custom)
    }
}
