use std::collections::VecDeque;

use fathom_core::{Fractal, Viewport};

use crate::field::FieldBuffer;

/// FIFO work queue driving flood-fill propagation across the field.
///
/// Evaluation always starts at the visual boundary: seeding enqueues
/// exactly the grid's border cells. Propagation then advances one cell per
/// call, enqueueing any neighbor whose color differs from the dequeued
/// cell's. Large constant-colored regions (typically the set interior) are
/// never entered, which is where the scheme beats evaluating every cell.
///
/// The queued flag means "enqueued at some point this epoch" and stays set
/// after the cell is popped. That makes propagation monotonic (each cell is
/// enqueued at most once per seed), so the queue is bounded by the grid
/// size and draining always terminates.
///
/// Colors are compared as bytes, after the modulo-256 reduction. Two
/// distinct escape counts 256 apart alias to the same byte and will not
/// trigger propagation across a real boundary. Known trade-off, kept:
/// resolving it would mean comparing full iteration counts and losing the
/// one-byte cell representation.
#[derive(Debug, Default)]
pub struct Frontier {
    queue: VecDeque<u32>,
}

impl Frontier {
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Start a new epoch: drop pending work, reset all cell flags, and
    /// enqueue the border cells of the grid (first/last row and column).
    ///
    /// For a `W×H` grid with `W, H >= 2` this queues `2W + 2H − 4` cells.
    pub fn seed(&mut self, field: &mut FieldBuffer) {
        self.queue.clear();
        field.clear_flags();

        let width = field.width();
        let height = field.height();
        for y in 0..height {
            for x in 0..width {
                if x == 0 || x == width - 1 || y == 0 || y == height - 1 {
                    let index = x + y * width;
                    field.mark_queued(index);
                    self.queue.push_back(index);
                }
            }
        }
    }

    /// One propagation step: pop the front cell, resolve its color, and
    /// consider its up-to-8 neighbors. Returns `false` when the queue was
    /// already empty.
    pub fn propagate<F: Fractal>(
        &mut self,
        field: &mut FieldBuffer,
        fractal: &mut F,
        viewport: &Viewport,
    ) -> bool {
        let Some(index) = self.queue.pop_front() else {
            return false;
        };
        let color = color_of(field, fractal, viewport, index);

        let width = field.width();
        let height = field.height();
        let x = index % width;
        let y = index / width;

        if y > 0 {
            self.consider(field, fractal, viewport, index - width, color);
            if x > 0 {
                self.consider(field, fractal, viewport, index - width - 1, color);
            }
            if x + 1 < width {
                self.consider(field, fractal, viewport, index - width + 1, color);
            }
        }
        if y + 1 < height {
            self.consider(field, fractal, viewport, index + width, color);
            if x > 0 {
                self.consider(field, fractal, viewport, index + width - 1, color);
            }
            if x + 1 < width {
                self.consider(field, fractal, viewport, index + width + 1, color);
            }
        }
        if x > 0 {
            self.consider(field, fractal, viewport, index - 1, color);
        }
        if x + 1 < width {
            self.consider(field, fractal, viewport, index + 1, color);
        }

        true
    }

    /// Enqueue a neighbor if it has never been queued this epoch and its
    /// color differs from the dequeued cell's. The comparison itself forces
    /// the neighbor's color to be resolved, so the frontier's one-cell-deep
    /// halo around each region boundary always ends up evaluated.
    fn consider<F: Fractal>(
        &mut self,
        field: &mut FieldBuffer,
        fractal: &mut F,
        viewport: &Viewport,
        index: u32,
        color: u8,
    ) {
        if field.is_queued(index) {
            return;
        }
        if color_of(field, fractal, viewport, index) != color {
            field.mark_queued(index);
            self.queue.push_back(index);
        }
    }
}

/// Memoized color lookup: evaluate only when the cell has no valid color
/// yet, then cache the byte in the field.
fn color_of<F: Fractal>(
    field: &mut FieldBuffer,
    fractal: &mut F,
    viewport: &Viewport,
    index: u32,
) -> u8 {
    if field.is_computed(index) {
        return field.color(index);
    }
    let color = fractal.color_at(index, viewport);
    field.store(index, color);
    color
}
