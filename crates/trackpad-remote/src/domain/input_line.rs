//! The JSON-lines input protocol consumed by the binary.
//!
//! Every line is one already-acquired UI event, tagged by `kind`:
//!
//! ```json
//! {"kind":"pointer","type":"pointerdown","pointerId":1,"pointerType":"touch","pageX":10,"pageY":20}
//! {"kind":"touch","type":"touchstart","changedTouches":[{"identifier":0,"pageX":5,"pageY":5}]}
//! {"kind":"key","key":"Enter","code":"Enter"}
//! {"kind":"text","value":"hello"}
//! {"kind":"media","action":"play_pause"}
//! {"kind":"configure","setting":"sensitivity","value":8}
//! ```

use serde::{Deserialize, Serialize};
use trackpad_core::domain::actions::{MediaAction, PresentationAction};
use trackpad_core::{GestureSetting, PointerEvent, TouchEvent};

/// One input event for the trackpad session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InputLine {
    /// Pointer-event variant of a contact.
    Pointer(PointerEvent),
    /// Touch-event variant of a contact.
    Touch(TouchEvent),
    /// A special key from the soft keyboard.
    #[serde(rename_all = "camelCase")]
    Key {
        key: String,
        #[serde(default)]
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
    /// A single printable character.
    Char { value: String },
    /// A string; sent one character at a time.
    Text { value: String },
    Media { action: MediaAction },
    Presentation { action: PresentationAction },
    App { app: String },
    System { action: String },
    Keyboard { key: String },
    /// Runtime adjustment of a gesture tunable.
    Configure { setting: GestureSetting, value: f64 },
}

#[cfg(test)]
mod tests {
    use super::*;
    use trackpad_core::domain::input::PointerEventKind;

    #[test]
    fn test_pointer_line_deserializes_with_inner_type_tag() {
        // Arrange
        let line = r#"{"kind":"pointer","type":"pointermove","pointerId":2,
            "pointerType":"touch","pageX":10,"pageY":20.5}"#;

        // Act
        let parsed: InputLine = serde_json::from_str(line).unwrap();

        // Assert
        match parsed {
            InputLine::Pointer(ev) => {
                assert_eq!(ev.kind, PointerEventKind::PointerMove);
                assert_eq!(ev.pointer_id, 2);
                assert_eq!(ev.page_y, 20.5);
                assert!(ev.coalesced.is_empty());
            }
            other => panic!("expected pointer line, got {other:?}"),
        }
    }

    #[test]
    fn test_key_line_defaults_code_and_modifiers() {
        let parsed: InputLine =
            serde_json::from_str(r#"{"kind":"key","key":"Backspace","ctrlKey":true}"#).unwrap();

        assert_eq!(
            parsed,
            InputLine::Key {
                key: "Backspace".into(),
                code: String::new(),
                alt_key: false,
                ctrl_key: true,
                shift_key: false,
                meta_key: false,
            }
        );
    }

    #[test]
    fn test_configure_line_uses_snake_case_setting() {
        let parsed: InputLine = serde_json::from_str(
            r#"{"kind":"configure","setting":"scroll_batch_threshold","value":0.5}"#,
        )
        .unwrap();

        assert_eq!(
            parsed,
            InputLine::Configure {
                setting: GestureSetting::ScrollBatchThreshold,
                value: 0.5
            }
        );
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        assert!(serde_json::from_str::<InputLine>(r#"{"kind":"gamepad"}"#).is_err());
    }

    #[test]
    fn test_media_line_uses_action_token() {
        let parsed: InputLine =
            serde_json::from_str(r#"{"kind":"media","action":"volume_up"}"#).unwrap();
        assert_eq!(
            parsed,
            InputLine::Media {
                action: MediaAction::VolumeUp
            }
        );
    }
}
