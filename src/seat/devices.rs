// SPDX-License-Identifier: GPL-3.0-only

//! Interfaces of the collaborators the seat drives.
//!
//! The pointer, keyboard and touch sub-devices own their per-client resources
//! and the wire-level event sending. The seat only tells them who is focused
//! and what happened, in the order the protocol requires. Sub-devices keep no
//! handle back to the seat: anything they need is passed in with the call.

use smithay::backend::input::{Axis, ButtonState};
use smithay::reexports::wayland_server::protocol::wl_seat::Capability;

use super::surface::{ClientId, SurfaceId};
use crate::utils::coordinates::{GlobalPointF64, SurfaceLocalPointF64};

pub trait PointerDevice {
    /// Bind protocol object `id` of `client` to this pointer
    fn add(&mut self, client: ClientId, id: u32);

    fn set_mouse_focus(
        &mut self,
        surface: Option<SurfaceId>,
        local: SurfaceLocalPointF64,
        global: GlobalPointF64,
    );

    fn focus_surface(&self) -> Option<SurfaceId>;

    fn send_button(
        &mut self,
        button: u32,
        state: ButtonState,
        local: SurfaceLocalPointF64,
        global: GlobalPointF64,
    );

    fn send_motion(&mut self, local: SurfaceLocalPointF64, global: GlobalPointF64);

    fn send_axis(&mut self, axis: Axis, delta: i32);
}

pub trait KeyboardDevice {
    fn add(&mut self, client: ClientId, id: u32);

    fn set_focus(&mut self, surface: Option<SurfaceId>);

    fn focus(&self) -> Option<SurfaceId>;

    fn send_key_press(&mut self, native_scan_code: u32);

    fn send_key_release(&mut self, native_scan_code: u32);
}

pub trait TouchDevice {
    fn add(&mut self, client: ClientId, id: u32);

    fn set_focus(&mut self, surface: Option<SurfaceId>);

    fn focus(&self) -> Option<SurfaceId>;

    fn send_down(&mut self, id: i32, position: SurfaceLocalPointF64);

    fn send_motion(&mut self, id: i32, position: SurfaceLocalPointF64);

    fn send_up(&mut self, id: i32);

    /// Terminates a batch of point updates belonging to one input sample
    fn send_frame(&mut self);

    fn send_cancel(&mut self);
}

/// A client's `wl_seat` resource
pub trait SeatResource {
    fn client(&self) -> ClientId;

    /// Protocol version the client bound
    fn version(&self) -> u32;

    fn send_capabilities(&mut self, capabilities: Capability);

    fn send_name(&mut self, name: &str);
}
