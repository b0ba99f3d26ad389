// SPDX-License-Identifier: GPL-3.0-only

//! Client and surface identities as seen by the seat.
//!
//! The seat never owns surfaces. Focus is remembered as a [`SurfaceId`] and
//! resolved through a [`SurfaceLookup`] every time it is used, so a surface
//! destroyed between two calls simply stops being found.

use std::collections::HashMap;
use std::fmt;

use crate::utils::coordinates::GlobalPointF64;

/// Identity of a connected client, assigned by the dispatch layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientId(pub u32);

/// Stable identity of a surface, assigned by the compositor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(pub u32);

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "client#{}", self.0)
    }
}

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "surface#{}", self.0)
    }
}

/// What the seat needs to know about a live surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceInfo {
    /// Client owning the surface's protocol resource
    pub client: ClientId,
    /// Top-left corner of the surface in global coordinates
    pub position: GlobalPointF64,
    /// Inactive transient surfaces must not take keyboard focus
    pub transient_inactive: bool,
}

/// Resolves surface ids to their current state
pub trait SurfaceLookup {
    fn surface(&self, id: SurfaceId) -> Option<SurfaceInfo>;

    fn contains(&self, id: SurfaceId) -> bool {
        self.surface(id).is_some()
    }
}

/// A simple owned surface table
#[derive(Debug, Default)]
pub struct SurfaceMap {
    surfaces: HashMap<SurfaceId, SurfaceInfo>,
}

impl SurfaceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a surface, returning the previous state if any
    pub fn insert(&mut self, id: SurfaceId, info: SurfaceInfo) -> Option<SurfaceInfo> {
        self.surfaces.insert(id, info)
    }

    pub fn remove(&mut self, id: SurfaceId) -> Option<SurfaceInfo> {
        self.surfaces.remove(&id)
    }

    /// Mark a surface as (in)active transient. Returns false if the surface is unknown.
    pub fn set_transient_inactive(&mut self, id: SurfaceId, inactive: bool) -> bool {
        match self.surfaces.get_mut(&id) {
            Some(info) => {
                info.transient_inactive = inactive;
                true
            }
            None => false,
        }
    }

    /// Move a surface. Returns false if the surface is unknown.
    pub fn set_position(&mut self, id: SurfaceId, position: GlobalPointF64) -> bool {
        match self.surfaces.get_mut(&id) {
            Some(info) => {
                info.position = position;
                true
            }
            None => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }
}

impl SurfaceLookup for SurfaceMap {
    fn surface(&self, id: SurfaceId) -> Option<SurfaceInfo> {
        self.surfaces.get(&id).copied()
    }
}
