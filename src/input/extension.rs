// SPDX-License-Identifier: GPL-3.0-only

//! Optional richer input protocols layered over the baseline seat.
//!
//! An installed extension sees full events before the seat decomposes them.
//! Returning `true` means the event was delivered and the seat sends nothing.

use super::events::{KeyEvent, TouchEvent};
use crate::seat::surface::SurfaceId;

pub trait KeyExtension {
    /// Offer a key event addressed to the current keyboard focus
    fn post_key_event(&mut self, event: &KeyEvent, focus: SurfaceId) -> bool;

    /// Deliver a key event to `surface` regardless of keyboard focus
    fn post_global_key_event(&mut self, event: &KeyEvent, surface: SurfaceId) -> bool;
}

pub trait TouchExtension {
    /// Offer a whole touch sample addressed to the current pointer focus
    fn post_touch_event(&mut self, event: &TouchEvent, focus: SurfaceId) -> bool;
}
