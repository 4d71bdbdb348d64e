use std::cell::OnceCell;

use crate::error::{Result, TessellationError};
use crate::math::{Point3, Vector3, VectorSeries};

use super::Polynomial;

/// Display color attached to every tessellated path sample.
pub const PATH_COLOR: [f32; 3] = [0.9, 0.6, 0.1];

/// Selects one coordinate polynomial of a [`VectorPath`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coordinate {
    X,
    Y,
    Z,
}

/// A sampled path point ready for display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathSample {
    /// Curve parameter of the sample.
    pub t: f64,
    /// Position on the path.
    pub position: Point3,
    /// Display color.
    pub color: [f32; 3],
}

/// A parametric 3D curve whose coordinates are cubic polynomials in `t`.
///
/// The tessellated samples are computed lazily and dropped whenever a
/// coefficient or the sector count changes.
#[derive(Debug, Clone)]
pub struct VectorPath {
    x: Polynomial,
    y: Polynomial,
    z: Polynomial,
    sectors: usize,
    samples: OnceCell<Vec<PathSample>>,
}

impl VectorPath {
    /// Creates a path from its three coordinate polynomials.
    ///
    /// # Errors
    ///
    /// Returns an error if `sectors` is zero.
    pub fn new(x: Polynomial, y: Polynomial, z: Polynomial, sectors: usize) -> Result<Self> {
        check_sectors(sectors)?;
        Ok(Self {
            x,
            y,
            z,
            sectors,
            samples: OnceCell::new(),
        })
    }

    /// Returns the polynomial of one coordinate.
    #[must_use]
    pub fn polynomial(&self, coordinate: Coordinate) -> &Polynomial {
        match coordinate {
            Coordinate::X => &self.x,
            Coordinate::Y => &self.y,
            Coordinate::Z => &self.z,
        }
    }

    /// Replaces the polynomial of one coordinate.
    pub fn set_polynomial(&mut self, coordinate: Coordinate, polynomial: Polynomial) {
        match coordinate {
            Coordinate::X => self.x = polynomial,
            Coordinate::Y => self.y = polynomial,
            Coordinate::Z => self.z = polynomial,
        }
        self.samples.take();
    }

    /// Number of tessellation sectors.
    #[must_use]
    pub fn sectors(&self) -> usize {
        self.sectors
    }

    /// Sets the number of tessellation sectors.
    ///
    /// # Errors
    ///
    /// Returns an error if `sectors` is zero; the previous count is kept.
    pub fn set_sectors(&mut self, sectors: usize) -> Result<()> {
        check_sectors(sectors)?;
        if sectors != self.sectors {
            self.sectors = sectors;
            self.samples.take();
        }
        Ok(())
    }

    /// Position `P(t)`.
    #[must_use]
    pub fn position(&self, t: f64) -> Point3 {
        Point3::new(self.x.evaluate(t), self.y.evaluate(t), self.z.evaluate(t))
    }

    /// First derivative `P'(t)`.
    #[must_use]
    pub fn tangent(&self, t: f64) -> Vector3 {
        Vector3::new(
            self.x.derivative(t),
            self.y.derivative(t),
            self.z.derivative(t),
        )
    }

    /// Second derivative `P''(t)`.
    #[must_use]
    pub fn acceleration(&self, t: f64) -> Vector3 {
        Vector3::new(
            self.x.derivative2(t),
            self.y.derivative2(t),
            self.z.derivative2(t),
        )
    }

    /// Third derivative `P'''(t)`.
    #[must_use]
    pub fn jerk(&self, t: f64) -> Vector3 {
        Vector3::new(
            self.x.derivative3(t),
            self.y.derivative3(t),
            self.z.derivative3(t),
        )
    }

    /// Taylor expansion of the position around `t` up to `order`.
    #[must_use]
    pub fn series(&self, t: f64, order: usize) -> VectorSeries {
        let derivatives: Vec<Vector3> = (0..=order)
            .map(|k| {
                Vector3::new(
                    self.x.derivative_n(t, k),
                    self.y.derivative_n(t, k),
                    self.z.derivative_n(t, k),
                )
            })
            .collect();
        VectorSeries::from_derivatives(&derivatives)
    }

    /// Evenly spaced samples over `t in [0, 1]`, `sectors + 1` of them.
    pub fn samples(&self) -> &[PathSample] {
        self.samples.get_or_init(|| self.tessellate(self.sectors))
    }

    /// Samples the path with an explicit sector count, bypassing the cache.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn tessellate(&self, sectors: usize) -> Vec<PathSample> {
        let sectors = sectors.max(1);
        (0..=sectors)
            .map(|i| {
                let t = i as f64 / sectors as f64;
                PathSample {
                    t,
                    position: self.position(t),
                    color: PATH_COLOR,
                }
            })
            .collect()
    }
}

fn check_sectors(sectors: usize) -> Result<()> {
    if sectors == 0 {
        return Err(TessellationError::InvalidParameters(
            "path sector count must be positive".into(),
        )
        .into());
    }
    Ok(())
}
