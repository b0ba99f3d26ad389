// SPDX-License-Identifier: GPL-3.0-only

//! Type-safe coordinate wrappers to prevent coordinate space confusion.
//!
//! Input arrives in two coordinate spaces:
//! - Global: the compositor's global space across all outputs
//! - SurfaceLocal: relative to a surface's top-left corner
//!
//! Pointer events carry both, touch points arrive global and are converted
//! to surface-local before they reach a client.

use smithay::utils::{Logical, Point};
use std::fmt;

/// A floating-point position in the global coordinate space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlobalPointF64(pub Point<f64, Logical>);

/// A floating-point position relative to a surface's origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceLocalPointF64(pub Point<f64, Logical>);

impl GlobalPointF64 {
    /// Create a new floating-point global point
    pub fn new(x: f64, y: f64) -> Self {
        Self(Point::from((x, y)))
    }

    /// Convert to coordinates relative to a surface placed at `surface_origin`
    pub fn to_surface_local(self, surface_origin: GlobalPointF64) -> SurfaceLocalPointF64 {
        SurfaceLocalPointF64(self.0 - surface_origin.0)
    }
}

impl SurfaceLocalPointF64 {
    pub fn new(x: f64, y: f64) -> Self {
        Self(Point::from((x, y)))
    }

    /// Convert back to global coordinates
    pub fn to_global(self, surface_origin: GlobalPointF64) -> GlobalPointF64 {
        GlobalPointF64(self.0 + surface_origin.0)
    }

    pub fn x(&self) -> f64 {
        self.0.x
    }

    pub fn y(&self) -> f64 {
        self.0.y
    }
}

impl From<(f64, f64)> for GlobalPointF64 {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

impl From<(f64, f64)> for SurfaceLocalPointF64 {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

impl fmt::Display for GlobalPointF64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.0.x, self.0.y)
    }
}

impl fmt::Display for SurfaceLocalPointF64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.0.x, self.0.y)
    }
}
