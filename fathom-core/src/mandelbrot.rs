use std::mem;

use rug::ops::DivRoundingAssign;
use rug::{Assign, Integer};

use crate::fractal::Fractal;
use crate::viewport::Viewport;

/// Iterations granted per doubling of the zoom denominator.
const ITERATIONS_PER_OCTAVE: f64 = 50.0;

/// The orbit is considered escaped once the sum of its scaled components
/// exceeds `ESCAPE_FACTOR × zoom`.
const ESCAPE_FACTOR: u32 = 5;

/// `log2` of a positive big integer.
///
/// Computed from the mantissa/exponent decomposition: with
/// `value = m × 2^e` and `0.5 <= m < 1`, `log2(value) = log2(m) + e`.
/// Stays accurate at depths where converting the integer to `f64`
/// directly would overflow to infinity.
fn log2_magnitude(value: &Integer) -> f64 {
    let (mantissa, exponent) = value.to_f64_exp();
    mantissa.log2() + f64::from(exponent)
}

/// Iteration bound for a given zoom denominator: `floor(log2(zoom) × 50)`.
///
/// Deeper zooms expose finer boundary detail and need more refinement, but
/// the budget must not grow linearly with the zoom magnitude or deep frames
/// would never finish. Logarithmic growth trades some accuracy for latency.
pub fn iteration_limit(zoom: &Integer) -> u64 {
    (log2_magnitude(zoom) * ITERATIONS_PER_OCTAVE).max(0.0) as u64
}

/// The Mandelbrot recurrence `z ← z² + c` over scaled integers.
///
/// All coordinates are fixed-point: an integer `v` represents the plane
/// value `v / zoom`. Each multiplication is therefore followed by a floor
/// division by the zoom denominator to bring the product back into scale.
/// This keeps full precision at arbitrary zoom depth, where `f64` runs out
/// of mantissa after ~50 doublings.
///
/// The escape test compares `x + y` against `5 × zoom`, a cheap proxy for
/// magnitude escape. It is intentionally not the textbook `x² + y² > 4`;
/// the coloring downstream depends on this exact heuristic.
///
/// All temporaries are owned by the struct and reused across cells, so the
/// inner loop performs no allocations once the values have grown to their
/// working size.
#[derive(Debug)]
pub struct Mandelbrot {
    c_x: Integer,
    c_y: Integer,
    z_x: Integer,
    z_y: Integer,
    pow_x: Integer,
    pow_y: Integer,
    next_x: Integer,
    sum: Integer,
    bail: Integer,
    evaluations: u64,
}

impl Mandelbrot {
    pub fn new() -> Self {
        Self {
            c_x: Integer::new(),
            c_y: Integer::new(),
            z_x: Integer::new(),
            z_y: Integer::new(),
            pow_x: Integer::new(),
            pow_y: Integer::new(),
            next_x: Integer::new(),
            sum: Integer::new(),
            bail: Integer::new(),
            evaluations: 0,
        }
    }
}

impl Default for Mandelbrot {
    fn default() -> Self {
        Self::new()
    }
}

impl Fractal for Mandelbrot {
    fn color_at(&mut self, index: u32, viewport: &Viewport) -> u8 {
        self.evaluations += 1;

        let grid = viewport.grid();
        let zoom = viewport.zoom();
        let gx = i64::from(index % grid.width);
        let gy = i64::from(index / grid.width);

        // Map the cell to the plane: offset by half the grid extent and the
        // pan, all in zoom-scaled units.
        self.c_x.assign(gx - i64::from(grid.width / 2));
        self.c_x -= viewport.pan_x();
        self.c_y.assign(gy - i64::from(grid.height / 2));
        self.c_y -= viewport.pan_y();

        self.z_x.assign(0);
        self.z_y.assign(0);
        self.bail.assign(zoom * ESCAPE_FACTOR);

        let limit = iteration_limit(zoom);
        let mut escaped_at = 0u64;

        for i in 0..limit {
            self.pow_x.assign(&self.z_x * &self.z_x);
            self.pow_x.div_floor_assign(zoom);
            self.pow_y.assign(&self.z_y * &self.z_y);
            self.pow_y.div_floor_assign(zoom);

            self.sum.assign(&self.z_x + &self.z_y);
            if self.sum > self.bail {
                escaped_at = i;
                break;
            }

            // x' = x² − y² + c_x, y' = 2xy + c_y, rescaled after each product.
            self.next_x.assign(&self.pow_x - &self.pow_y);
            self.next_x += &self.c_x;

            self.z_y *= &self.z_x;
            self.z_y *= 2u32;
            self.z_y.div_floor_assign(zoom);
            self.z_y += &self.c_y;

            mem::swap(&mut self.z_x, &mut self.next_x);
        }

        // Loop index at escape, 0 when the orbit never escaped the bound.
        (escaped_at % 256) as u8
    }

    fn evaluations(&self) -> u64 {
        self.evaluations
    }
}
