//! Wire messages sent to the remote executor.
//!
//! Every message is transport-agnostic: the same JSON body is carried as the
//! payload of a channel event or as the body of an HTTP `POST`.  The only
//! exception is raw pointer streaming, whose HTTP body is always an array so
//! the `/raw` endpoint handles single events and batches uniformly.
//!
//! | Message              | Channel event            | HTTP path        | Body                                   |
//! |----------------------|--------------------------|------------------|----------------------------------------|
//! | raw down / move / up | `raw.down` … `raw.up`    | `/raw` (array)   | `type, id, x, y, pointerType, time`    |
//! | raw batch            | `raw.batch`              | `/raw` (array)   | array of the above                     |
//! | relative move        | `move`                   | `/move`          | `type:"move-delta", deltaX, deltaY`    |
//! | scroll               | `scroll`                 | `/scroll`        | `scrollX, scrollY`                     |
//! | click                | `click`                  | `/click`         | `button`                               |
//! | key / char           | `key`                    | `/key`           | `type:"key", key, code, …` / `type:"char", value` |
//! | media                | `media`                  | `/media`         | `action`                               |
//! | presentation         | `presentation`           | `/presentation`  | `action`                               |
//! | app launch           | `app`                    | `/app`           | `app`                                  |
//! | system               | `system`                 | `/system`        | `action`                               |
//! | keyboard shortcut    | `keyboard`               | `/keyboard`      | `key`                                  |
//! | task view            | `taskview`               | `/taskview`      | `{}`                                   |
//! | task view exit       | `taskview_exit`          | `/taskview_exit` | `{}`                                   |
//! | button press (drag)  | `mousedown`              | `/mousedown`     | `{}`                                   |
//! | button release       | `mouseup`                | `/mouseup`       | `{}`                                   |
//!
//! Call [`WireMessage::envelope`] to get everything a transport needs in one
//! value.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::actions::{MediaAction, PresentationAction};
use crate::domain::contact::ContactId;
use crate::domain::input::PointerKind;
use crate::protocol::codec::ProtocolError;

// ── Payloads ──────────────────────────────────────────────────────────────────

/// Mouse button produced by a tap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Phase tag of a raw pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RawPhase {
    Down,
    Move,
    Up,
}

/// One raw pointer position, forwarded untouched to the executor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPointerEvent {
    #[serde(rename = "type")]
    pub phase: RawPhase,
    pub id: ContactId,
    pub x: f64,
    pub y: f64,
    pub pointer_type: PointerKind,
    pub time: u64,
}

/// Relative pointer motion: `{"type":"move-delta","deltaX":..,"deltaY":..}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename = "move-delta", rename_all = "camelCase")]
pub struct MoveDelta {
    pub delta_x: f64,
    pub delta_y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollDelta {
    pub scroll_x: f64,
    pub scroll_y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Click {
    pub button: MouseButton,
}

/// Keyboard input: a named special key or a single printable character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum KeyInput {
    #[serde(rename_all = "camelCase")]
    Key {
        key: String,
        code: String,
        #[serde(default)]
        alt_key: bool,
        #[serde(default)]
        ctrl_key: bool,
        #[serde(default)]
        shift_key: bool,
        #[serde(default)]
        meta_key: bool,
    },
    Char { value: String },
}

impl KeyInput {
    /// A special key without modifiers.
    pub fn plain(key: impl Into<String>, code: impl Into<String>) -> Self {
        KeyInput::Key {
            key: key.into(),
            code: code.into(),
            alt_key: false,
            ctrl_key: false,
            shift_key: false,
            meta_key: false,
        }
    }

    pub fn char(c: char) -> Self {
        KeyInput::Char {
            value: c.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaCommand {
    pub action: MediaAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresentationCommand {
    pub action: PresentationAction,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppLaunch {
    pub app: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemCommand {
    pub action: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyboardShortcut {
    pub key: String,
}

// ── Categories ────────────────────────────────────────────────────────────────

/// Admission-control bucket of a message.
///
/// The HTTP fallback counts in-flight requests per category and refuses new
/// requests of a capped category while too many are outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Raw,
    Move,
    Scroll,
    Click,
    Key,
    Media,
    Presentation,
    App,
    System,
    Keyboard,
    TaskView,
}

impl Category {
    /// Clicks and key presses are never refused; dropping one is far more
    /// visible to the user than dropping a move.
    pub fn is_capped(self) -> bool {
        !matches!(self, Category::Click | Category::Key)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Category::Raw => "raw",
            Category::Move => "move",
            Category::Scroll => "scroll",
            Category::Click => "click",
            Category::Key => "key",
            Category::Media => "media",
            Category::Presentation => "presentation",
            Category::App => "app",
            Category::System => "system",
            Category::Keyboard => "keyboard",
            Category::TaskView => "taskview",
        };
        f.write_str(name)
    }
}

// ── WireMessage ───────────────────────────────────────────────────────────────

/// Every message the remote executor understands.
#[derive(Debug, Clone, PartialEq)]
pub enum WireMessage {
    /// A single raw pointer event (`raw.down`, `raw.move` or `raw.up`).
    Raw(RawPointerEvent),
    /// Several raw pointer events sent together.
    RawBatch(Vec<RawPointerEvent>),
    Move(MoveDelta),
    Scroll(ScrollDelta),
    Click(Click),
    Key(KeyInput),
    Media(MediaCommand),
    Presentation(PresentationCommand),
    App(AppLaunch),
    System(SystemCommand),
    Keyboard(KeyboardShortcut),
    TaskView,
    TaskViewExit,
    /// Press and hold the left button.
    MouseDown,
    MouseUp,
}

/// A message prepared for delivery.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    /// Channel event name.
    pub event: &'static str,
    /// Fallback HTTP path.
    pub path: &'static str,
    /// Payload of the channel event.
    pub channel_body: Value,
    /// JSON body of the fallback `POST`.
    pub http_body: Value,
    pub category: Category,
}

impl WireMessage {
    pub fn channel_event(&self) -> &'static str {
        match self {
            WireMessage::Raw(ev) => match ev.phase {
                RawPhase::Down => "raw.down",
                RawPhase::Move => "raw.move",
                RawPhase::Up => "raw.up",
            },
            WireMessage::RawBatch(_) => "raw.batch",
            WireMessage::Move(_) => "move",
            WireMessage::Scroll(_) => "scroll",
            WireMessage::Click(_) => "click",
            WireMessage::Key(_) => "key",
            WireMessage::Media(_) => "media",
            WireMessage::Presentation(_) => "presentation",
            WireMessage::App(_) => "app",
            WireMessage::System(_) => "system",
            WireMessage::Keyboard(_) => "keyboard",
            WireMessage::TaskView => "taskview",
            WireMessage::TaskViewExit => "taskview_exit",
            WireMessage::MouseDown => "mousedown",
            WireMessage::MouseUp => "mouseup",
        }
    }

    pub fn http_path(&self) -> &'static str {
        match self {
            WireMessage::Raw(_) | WireMessage::RawBatch(_) => "/raw",
            WireMessage::Move(_) => "/move",
            WireMessage::Scroll(_) => "/scroll",
            WireMessage::Click(_) => "/click",
            WireMessage::Key(_) => "/key",
            WireMessage::Media(_) => "/media",
            WireMessage::Presentation(_) => "/presentation",
            WireMessage::App(_) => "/app",
            WireMessage::System(_) => "/system",
            WireMessage::Keyboard(_) => "/keyboard",
            WireMessage::TaskView => "/taskview",
            WireMessage::TaskViewExit => "/taskview_exit",
            WireMessage::MouseDown => "/mousedown",
            WireMessage::MouseUp => "/mouseup",
        }
    }

    pub fn category(&self) -> Category {
        match self {
            WireMessage::Raw(_) | WireMessage::RawBatch(_) => Category::Raw,
            WireMessage::Move(_) => Category::Move,
            WireMessage::Scroll(_) => Category::Scroll,
            WireMessage::Click(_) | WireMessage::MouseDown | WireMessage::MouseUp => {
                Category::Click
            }
            WireMessage::Key(_) => Category::Key,
            WireMessage::Media(_) => Category::Media,
            WireMessage::Presentation(_) => Category::Presentation,
            WireMessage::App(_) => Category::App,
            WireMessage::System(_) => Category::System,
            WireMessage::Keyboard(_) => Category::Keyboard,
            WireMessage::TaskView | WireMessage::TaskViewExit => Category::TaskView,
        }
    }

    /// The JSON body carried by the channel event.
    pub fn body(&self) -> Result<Value, ProtocolError> {
        let value = match self {
            WireMessage::Raw(ev) => serde_json::to_value(ev)?,
            WireMessage::RawBatch(events) => serde_json::to_value(events)?,
            WireMessage::Move(m) => serde_json::to_value(m)?,
            WireMessage::Scroll(s) => serde_json::to_value(s)?,
            WireMessage::Click(c) => serde_json::to_value(c)?,
            WireMessage::Key(k) => serde_json::to_value(k)?,
            WireMessage::Media(m) => serde_json::to_value(m)?,
            WireMessage::Presentation(p) => serde_json::to_value(p)?,
            WireMessage::App(a) => serde_json::to_value(a)?,
            WireMessage::System(s) => serde_json::to_value(s)?,
            WireMessage::Keyboard(k) => serde_json::to_value(k)?,
            WireMessage::TaskView
            | WireMessage::TaskViewExit
            | WireMessage::MouseDown
            | WireMessage::MouseUp => Value::Object(Default::default()),
        };
        Ok(value)
    }

    /// Builds the delivery envelope.  Raw events get an array HTTP body.
    pub fn envelope(&self) -> Result<Envelope, ProtocolError> {
        let channel_body = self.body()?;
        let http_body = match self {
            WireMessage::Raw(_) => Value::Array(vec![channel_body.clone()]),
            _ => channel_body.clone(),
        };
        Ok(Envelope {
            event: self.channel_event(),
            path: self.http_path(),
            channel_body,
            http_body,
            category: self.category(),
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
