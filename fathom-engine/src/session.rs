use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use fathom_core::{CoreError, Fractal, Mandelbrot, Viewport};

use crate::field::FieldBuffer;
use crate::frontier::Frontier;

/// Tunables for a fractal session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionOptions {
    /// Wall-clock budget for one `tick`.
    pub frame_budget: Duration,
    /// Integer zoom multiplier applied per click. Must be >= 2.
    pub zoom_factor: u32,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            // One 60 Hz frame.
            frame_budget: Duration::from_micros(16_667),
            zoom_factor: 2,
        }
    }
}

/// A read-only view of the color grid.
///
/// Safe to sample mid-drain for progressive display: cells the scheduler
/// has not reached yet read as 0 until the fill pass runs.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub colors: &'a [u8],
    pub width: u32,
    pub height: u32,
}

/// The fractal session: viewport, field buffer, frontier queue, and the
/// evaluator, owned together and mutated from a single logical thread.
///
/// Every viewport mutation reseeds the frontier, implicitly cancelling any
/// in-flight propagation; the reseed clears all cell flags first, so a
/// superseded epoch can never leak partial state into the next one.
/// `step` is the only suspension point: work is yielded back to the caller
/// once the time budget runs out and resumes from the persisted queue on
/// the next call.
#[derive(Debug)]
pub struct Session<F: Fractal = Mandelbrot> {
    viewport: Viewport,
    field: FieldBuffer,
    frontier: Frontier,
    fractal: F,
    options: SessionOptions,
    settled: bool,
    filled_cells: u64,
}

impl Session<Mandelbrot> {
    /// Session with the default deep-zoom Mandelbrot evaluator.
    pub fn new(screen_width: u32, screen_height: u32) -> crate::Result<Self> {
        Self::with_fractal(
            screen_width,
            screen_height,
            SessionOptions::default(),
            Mandelbrot::new(),
        )
    }
}

impl<F: Fractal> Session<F> {
    pub fn with_fractal(
        screen_width: u32,
        screen_height: u32,
        options: SessionOptions,
        fractal: F,
    ) -> crate::Result<Self> {
        if options.zoom_factor < 2 {
            return Err(CoreError::InvalidZoomFactor(options.zoom_factor).into());
        }
        let viewport = Viewport::new(screen_width, screen_height)?;
        let mut field = FieldBuffer::new(viewport.grid());
        let mut frontier = Frontier::new();
        frontier.seed(&mut field);
        Ok(Self {
            viewport,
            field,
            frontier,
            fractal,
            options,
            settled: false,
            filled_cells: 0,
        })
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn field(&self) -> &FieldBuffer {
        &self.field
    }

    pub fn fractal(&self) -> &F {
        &self.fractal
    }

    pub fn options(&self) -> SessionOptions {
        self.options
    }

    /// Cells assigned by the fill pass of the current epoch. 0 while the
    /// epoch is still draining.
    pub fn filled_cells(&self) -> u64 {
        self.filled_cells
    }

    /// True when the queue is drained and the fill pass has run, i.e. the
    /// buffer fully resolves the current viewport.
    pub fn is_settled(&self) -> bool {
        self.settled
    }

    /// The live color grid. Incomplete cells read as 0 mid-drain.
    pub fn frame(&self) -> Frame<'_> {
        Frame {
            colors: self.field.colors(),
            width: self.field.width(),
            height: self.field.height(),
        }
    }

    /// Force-drain, then return the fully resolved grid.
    pub fn drained_frame(&mut self) -> Frame<'_> {
        self.settle();
        self.frame()
    }

    /// Change the screen size, reusing old colors recentred on the new
    /// grid as a stale preview.
    pub fn resize(&mut self, width: u32, height: u32) -> crate::Result<()> {
        self.viewport.resize(width, height)?;
        self.field = self.field.resample_centered(self.viewport.grid());
        self.reseed("resize");
        Ok(())
    }

    /// Change the sampling density, reusing old colors the same way.
    pub fn set_resolution(&mut self, percent: u8) -> crate::Result<()> {
        self.viewport.set_resolution(percent)?;
        self.field = self.field.resample_centered(self.viewport.grid());
        self.reseed("resolution");
        Ok(())
    }

    /// Translate the view by a screen-space delta, carrying surviving
    /// colors along.
    pub fn pan(&mut self, dx: i64, dy: i64) {
        let (gdx, gdy) = self.viewport.pan(dx, dy);
        self.field = self.field.shifted(gdx, gdy);
        self.reseed("pan");
    }

    /// Zoom-in gesture at a screen point.
    ///
    /// The point is mapped to grid space, the viewport zooms toward it, and
    /// the old image becomes a magnified preview while recomputation runs.
    pub fn pan_click(&mut self, screen_x: f64, screen_y: f64) -> crate::Result<()> {
        let grid = self.viewport.grid();
        let (screen_w, screen_h) = self.viewport.screen();
        let gx = ((screen_x * f64::from(grid.width) / f64::from(screen_w)) as u32)
            .min(grid.width - 1);
        let gy = ((screen_y * f64::from(grid.height) / f64::from(screen_h)) as u32)
            .min(grid.height - 1);

        self.viewport.zoom_at(gx, gy, self.options.zoom_factor)?;
        self.field = self.field.resample_zoom(gx, gy, self.options.zoom_factor);
        self.reseed("zoom");
        Ok(())
    }

    fn reseed(&mut self, cause: &str) {
        self.frontier.seed(&mut self.field);
        self.settled = false;
        self.filled_cells = 0;
        debug!(
            cause,
            width = self.field.width(),
            height = self.field.height(),
            seeded = self.frontier.len(),
            "frontier reseeded"
        );
    }

    /// Run propagation until the queue empties or the time budget is
    /// spent. Returns `true` while work remains.
    ///
    /// Re-invocable: a later call resumes from the current queue state
    /// with no re-seeding. When the queue empties the fill pass runs once
    /// and the epoch is settled; further calls are no-ops until the next
    /// viewport mutation.
    pub fn step(&mut self, budget: Duration) -> bool {
        if self.settled {
            return false;
        }
        let start = Instant::now();
        let mut drained = 0u64;
        while !self.frontier.is_empty() && start.elapsed() < budget {
            self.frontier
                .propagate(&mut self.field, &mut self.fractal, &self.viewport);
            drained += 1;
        }

        if self.frontier.is_empty() {
            self.filled_cells = self.field.fill_unreached();
            self.settled = true;
            info!(
                elapsed_ms = start.elapsed().as_millis(),
                drained,
                filled = self.filled_cells,
                evaluations = self.fractal.evaluations(),
                "field settled"
            );
        } else {
            debug!(drained, pending = self.frontier.len(), "budget exhausted");
        }
        !self.settled
    }

    /// One display-rate step using the configured frame budget.
    pub fn tick(&mut self) -> bool {
        self.step(self.options.frame_budget)
    }

    /// Drain to completion, regardless of how long it takes.
    pub fn settle(&mut self) {
        while self.step(Duration::MAX) {}
    }
}
