// SPDX-License-Identifier: GPL-3.0-only

//! Replay of scripted host input through a recording seat.
//!
//! A script is one command per line, `#` starts a comment:
//!
//! ```text
//! device-added <name> <cap>[,<cap>...]   # keyboard pointer touch tablet-tool tablet-pad gesture switch
//! device-removed <name>
//! surface <id> <client> <x>,<y> [inactive]
//! surface-remove <id>
//! inactive <surface> true|false
//! bind <client> [<version>]
//! get-pointer|get-keyboard|get-touch <client> <id>
//! data-device <client> <id>
//! disconnect <client>
//! focus-keyboard <surface>|none
//! focus-pointer <surface>|none <lx>,<ly> <gx>,<gy>
//! press|release <button> <lx>,<ly> <gx>,<gy>
//! motion <lx>,<ly> <gx>,<gy>
//! motion-on <surface>|none <lx>,<ly> <gx>,<gy>
//! wheel vertical|horizontal <delta>
//! touch-point down|move|up|stay <id> <x>,<y>
//! touch-frame
//! touch-cancel
//! key press|release <scan-code> [<keysym> [<text>]]
//! key-on <surface> press|release <scan-code> [<keysym> [<text>]]
//! touch begin|update|end|cancel [<id>:down|move|up|stay:<x>,<y> ...]
//! ```

use std::str::{FromStr, SplitWhitespace};

use smithay::backend::input::{Axis, ButtonState, DeviceCapability, KeyState};
use tracing::{debug, warn};

use super::recorder::{RecordingDataDeviceManager, WireLog};
use crate::config::SeatConfig;
use crate::input::HostEvent;
use crate::input::events::{KeyEvent, TouchEvent, TouchEventKind, TouchPoint, TouchPointState};
use crate::seat::SeatMultiplexer;
use crate::seat::surface::{ClientId, SurfaceId, SurfaceInfo, SurfaceMap};
use crate::utils::coordinates::{GlobalPointF64, SurfaceLocalPointF64};

/// Protocol version assumed when `bind` gives none
const DEFAULT_SEAT_VERSION: u32 = 7;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReplayError {
    #[error("line {line}: unknown command `{command}`")]
    UnknownCommand { line: usize, command: String },
    #[error("line {line}: missing {argument}")]
    MissingArgument { line: usize, argument: &'static str },
    #[error("line {line}: invalid {argument} `{value}`")]
    InvalidArgument {
        line: usize,
        argument: &'static str,
        value: String,
    },
    #[error("line {line}: unexpected argument `{value}`")]
    TrailingArgument { line: usize, value: String },
    #[error("line {line}: failed to read script: {message}")]
    Read { line: usize, message: String },
}

/// One scripted action
#[derive(Debug, Clone, PartialEq)]
pub enum ReplayCommand {
    /// Input from the host platform
    Host(HostEvent),
    Surface { id: SurfaceId, info: SurfaceInfo },
    SurfaceRemove(SurfaceId),
    SetInactive { surface: SurfaceId, inactive: bool },
    Bind { client: ClientId, version: u32 },
    GetPointer { client: ClientId, id: u32 },
    GetKeyboard { client: ClientId, id: u32 },
    GetTouch { client: ClientId, id: u32 },
    DataDevice { client: ClientId, id: u32 },
    Disconnect(ClientId),
    FocusKeyboard(Option<SurfaceId>),
    FocusPointer {
        surface: Option<SurfaceId>,
        local: SurfaceLocalPointF64,
        global: GlobalPointF64,
    },
}

struct Args<'a> {
    line: usize,
    tokens: SplitWhitespace<'a>,
}

impl<'a> Args<'a> {
    fn next(&mut self, argument: &'static str) -> Result<&'a str, ReplayError> {
        self.tokens.next().ok_or(ReplayError::MissingArgument {
            line: self.line,
            argument,
        })
    }

    fn invalid(&self, argument: &'static str, value: &str) -> ReplayError {
        ReplayError::InvalidArgument {
            line: self.line,
            argument,
            value: value.to_string(),
        }
    }

    fn parse<T: FromStr>(&mut self, argument: &'static str) -> Result<T, ReplayError> {
        let value = self.next(argument)?;
        value.parse().map_err(|_| self.invalid(argument, value))
    }

    fn client(&mut self) -> Result<ClientId, ReplayError> {
        self.parse("client").map(ClientId)
    }

    fn surface(&mut self) -> Result<SurfaceId, ReplayError> {
        self.parse("surface").map(SurfaceId)
    }

    fn surface_or_none(&mut self) -> Result<Option<SurfaceId>, ReplayError> {
        let value = self.next("surface")?;
        if value == "none" {
            return Ok(None);
        }
        value
            .parse()
            .map(|id| Some(SurfaceId(id)))
            .map_err(|_| self.invalid("surface", value))
    }

    fn point(&mut self, argument: &'static str) -> Result<(f64, f64), ReplayError> {
        let value = self.next(argument)?;
        parse_point(value).ok_or_else(|| self.invalid(argument, value))
    }

    /// Decimal or `0x` prefixed hexadecimal
    fn code(&mut self, argument: &'static str) -> Result<u32, ReplayError> {
        let value = self.next(argument)?;
        parse_code(value).ok_or_else(|| self.invalid(argument, value))
    }

    /// `<state> <scan-code> [<keysym> [<text>]]`
    fn key_event(&mut self) -> Result<KeyEvent, ReplayError> {
        let state = self.key_state()?;
        let event = KeyEvent::new(state, self.code("scan code")?);
        let Some(value) = self.tokens.next() else {
            return Ok(event);
        };
        let keysym = parse_code(value).ok_or_else(|| self.invalid("keysym", value))?;
        let text = self.tokens.next().unwrap_or_default();
        Ok(event.with_keysym(keysym, text))
    }

    fn key_state(&mut self) -> Result<KeyState, ReplayError> {
        match self.next("key state")? {
            "press" => Ok(KeyState::Pressed),
            "release" => Ok(KeyState::Released),
            other => Err(self.invalid("key state", other)),
        }
    }

    fn remaining(&mut self) -> Vec<&'a str> {
        self.tokens.by_ref().collect()
    }

    fn finish(mut self) -> Result<(), ReplayError> {
        match self.tokens.next() {
            Some(value) => Err(ReplayError::TrailingArgument {
                line: self.line,
                value: value.to_string(),
            }),
            None => Ok(()),
        }
    }
}

fn parse_code(value: &str) -> Option<u32> {
    match value.strip_prefix("0x") {
        Some(hex) => u32::from_str_radix(hex, 16).ok(),
        None => value.parse().ok(),
    }
}

fn parse_point(value: &str) -> Option<(f64, f64)> {
    let (x, y) = value.split_once(',')?;
    Some((x.parse().ok()?, y.parse().ok()?))
}

fn parse_capability(value: &str) -> Option<DeviceCapability> {
    Some(match value {
        "keyboard" => DeviceCapability::Keyboard,
        "pointer" => DeviceCapability::Pointer,
        "touch" => DeviceCapability::Touch,
        "tablet-tool" => DeviceCapability::TabletTool,
        "tablet-pad" => DeviceCapability::TabletPad,
        "gesture" => DeviceCapability::Gesture,
        "switch" => DeviceCapability::Switch,
        _ => return None,
    })
}

fn parse_point_state(value: &str) -> Option<TouchPointState> {
    Some(match value {
        "down" => TouchPointState::Pressed,
        "move" => TouchPointState::Moved,
        "up" => TouchPointState::Released,
        "stay" => TouchPointState::Stationary,
        _ => return None,
    })
}

/// `<id>:<state>:<x>,<y>`
fn parse_touch_point(value: &str) -> Option<TouchPoint> {
    let mut parts = value.splitn(3, ':');
    let id = parts.next()?.parse().ok()?;
    let state = parse_point_state(parts.next()?)?;
    let (x, y) = parse_point(parts.next()?)?;
    Some(TouchPoint {
        id,
        state,
        position: GlobalPointF64::new(x, y),
    })
}

/// Parse a single script line. Blank lines and comments yield `None`.
pub fn parse_line(line: usize, text: &str) -> Result<Option<ReplayCommand>, ReplayError> {
    let text = text.split('#').next().unwrap_or_default();
    let mut args = Args {
        line,
        tokens: text.split_whitespace(),
    };
    let Some(command) = args.tokens.next() else {
        return Ok(None);
    };

    let parsed = match command {
        "device-added" => {
            let name = args.next("device name")?.to_string();
            let list = args.next("capabilities")?;
            let capabilities = list
                .split(',')
                .map(|cap| parse_capability(cap).ok_or_else(|| args.invalid("capability", cap)))
                .collect::<Result<Vec<_>, _>>()?;
            ReplayCommand::Host(HostEvent::DeviceAdded { name, capabilities })
        }
        "device-removed" => ReplayCommand::Host(HostEvent::DeviceRemoved {
            name: args.next("device name")?.to_string(),
        }),
        "surface" => {
            let id = args.surface()?;
            let client = args.client()?;
            let position = GlobalPointF64::from(args.point("position")?);
            let transient_inactive = match args.tokens.next() {
                None => false,
                Some("inactive") => true,
                Some(other) => return Err(args.invalid("surface flag", other)),
            };
            ReplayCommand::Surface {
                id,
                info: SurfaceInfo {
                    client,
                    position,
                    transient_inactive,
                },
            }
        }
        "surface-remove" => ReplayCommand::SurfaceRemove(args.surface()?),
        "inactive" => ReplayCommand::SetInactive {
            surface: args.surface()?,
            inactive: args.parse("inactive flag")?,
        },
        "bind" => {
            let client = args.client()?;
            let version = match args.tokens.next() {
                Some(value) => value
                    .parse::<u32>()
                    .map_err(|_| args.invalid("version", value))?,
                None => DEFAULT_SEAT_VERSION,
            };
            ReplayCommand::Bind { client, version }
        }
        "get-pointer" => ReplayCommand::GetPointer {
            client: args.client()?,
            id: args.parse("object id")?,
        },
        "get-keyboard" => ReplayCommand::GetKeyboard {
            client: args.client()?,
            id: args.parse("object id")?,
        },
        "get-touch" => ReplayCommand::GetTouch {
            client: args.client()?,
            id: args.parse("object id")?,
        },
        "data-device" => ReplayCommand::DataDevice {
            client: args.client()?,
            id: args.parse("object id")?,
        },
        "disconnect" => ReplayCommand::Disconnect(args.client()?),
        "focus-keyboard" => ReplayCommand::FocusKeyboard(args.surface_or_none()?),
        "focus-pointer" => ReplayCommand::FocusPointer {
            surface: args.surface_or_none()?,
            local: args.point("local position")?.into(),
            global: args.point("global position")?.into(),
        },
        "press" | "release" => {
            let state = if command == "press" {
                ButtonState::Pressed
            } else {
                ButtonState::Released
            };
            ReplayCommand::Host(HostEvent::PointerButton {
                button: args.code("button")?,
                state,
                local: args.point("local position")?.into(),
                global: args.point("global position")?.into(),
            })
        }
        "motion" => ReplayCommand::Host(HostEvent::PointerMotion {
            local: args.point("local position")?.into(),
            global: args.point("global position")?.into(),
        }),
        "motion-on" => ReplayCommand::Host(HostEvent::PointerMotionOnSurface {
            surface: args.surface_or_none()?,
            local: args.point("local position")?.into(),
            global: args.point("global position")?.into(),
        }),
        "wheel" => {
            let axis = match args.next("axis")? {
                "vertical" => Axis::Vertical,
                "horizontal" => Axis::Horizontal,
                other => return Err(args.invalid("axis", other)),
            };
            ReplayCommand::Host(HostEvent::PointerAxis {
                axis,
                delta: args.parse("delta")?,
            })
        }
        "touch-point" => {
            let value = args.next("point state")?;
            let state = parse_point_state(value).ok_or_else(|| args.invalid("point state", value))?;
            ReplayCommand::Host(HostEvent::TouchPoint {
                id: args.parse("point id")?,
                position: args.point("position")?.into(),
                state,
            })
        }
        "touch-frame" => ReplayCommand::Host(HostEvent::TouchFrame),
        "touch-cancel" => ReplayCommand::Host(HostEvent::TouchCancel),
        "key" => ReplayCommand::Host(HostEvent::Key(args.key_event()?)),
        "key-on" => ReplayCommand::Host(HostEvent::KeyOnSurface {
            surface: args.surface()?,
            event: args.key_event()?,
        }),
        "touch" => {
            let kind = match args.next("touch kind")? {
                "begin" => TouchEventKind::Begin,
                "update" => TouchEventKind::Update,
                "end" => TouchEventKind::End,
                "cancel" => TouchEventKind::Cancel,
                other => return Err(args.invalid("touch kind", other)),
            };
            let points = args
                .remaining()
                .into_iter()
                .map(|value| parse_touch_point(value).ok_or_else(|| args.invalid("touch point", value)))
                .collect::<Result<Vec<_>, _>>()?;
            ReplayCommand::Host(HostEvent::Touch(TouchEvent::new(kind, points)))
        }
        other => {
            return Err(ReplayError::UnknownCommand {
                line,
                command: other.to_string(),
            });
        }
    };

    args.finish()?;
    Ok(Some(parsed))
}

/// Parse a whole script, stopping at the first bad line
pub fn parse_script(script: &str) -> Result<Vec<ReplayCommand>, ReplayError> {
    let mut commands = Vec::new();
    for (index, text) in script.lines().enumerate() {
        if let Some(command) = parse_line(index + 1, text)? {
            commands.push(command);
        }
    }
    Ok(commands)
}

/// The compositor side of a replay: a recording seat plus the surfaces it refers to
pub struct ReplayHost {
    pub seat: SeatMultiplexer,
    pub surfaces: SurfaceMap,
    pub log: WireLog,
    data_device_manager: RecordingDataDeviceManager,
}

impl ReplayHost {
    pub fn new(config: &SeatConfig) -> Self {
        let log = WireLog::default();
        Self {
            seat: log.seat(config),
            surfaces: SurfaceMap::new(),
            data_device_manager: log.data_device_manager(),
            log,
        }
    }

    pub fn apply(&mut self, command: ReplayCommand) {
        debug!(?command, "Replaying");
        match command {
            ReplayCommand::Host(event) => self.seat.process_host_event(&self.surfaces, event),
            ReplayCommand::Surface { id, info } => {
                self.surfaces.insert(id, info);
            }
            ReplayCommand::SurfaceRemove(id) => {
                if self.surfaces.remove(id).is_none() {
                    warn!(%id, "Removing unknown surface");
                }
            }
            ReplayCommand::SetInactive { surface, inactive } => {
                if !self.surfaces.set_transient_inactive(surface, inactive) {
                    warn!(%surface, "Cannot mark unknown surface");
                }
            }
            ReplayCommand::Bind { client, version } => {
                let mut resource = self.log.seat_resource(client, version);
                self.seat.bind(&mut resource);
            }
            ReplayCommand::GetPointer { client, id } => self.seat.get_pointer(client, id),
            ReplayCommand::GetKeyboard { client, id } => self.seat.get_keyboard(client, id),
            ReplayCommand::GetTouch { client, id } => self.seat.get_touch(client, id),
            ReplayCommand::DataDevice { client, id } => {
                self.seat
                    .client_requested_data_device(&mut self.data_device_manager, client, id);
            }
            ReplayCommand::Disconnect(client) => self.seat.destroy_resource(client),
            ReplayCommand::FocusKeyboard(surface) => {
                self.seat.set_keyboard_focus(&self.surfaces, surface);
            }
            ReplayCommand::FocusPointer {
                surface,
                local,
                global,
            } => self.seat.set_mouse_focus(surface, local, global),
        }
    }
}
