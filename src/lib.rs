// SPDX-License-Identifier: GPL-3.0-only

//! A Wayland seat multiplexer.
//!
//! One logical seat (pointer, keyboard and touch) is shared by every
//! connected client. Input from the host platform is routed to whichever
//! client surface holds focus, and high-level host events are broken down
//! into the discrete event sequences the wire protocol expects.

pub mod backend;
pub mod config;
pub mod input;
pub mod seat;
pub mod utils;

pub use input::HostEvent;
pub use seat::{SeatError, SeatMultiplexer};
