//! Wire messages exchanged after the handshake.

use serde::{Deserialize, Serialize};

/// Server to client command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UiCommand {
    /// Replace the inner HTML of `target`.
    Html { target: String, content: String },
    /// Append HTML to `target`.
    Append { target: String, content: String },
    /// Set the value of the form field `target`.
    SetValue { target: String, value: String },
    /// Run a script in the page.
    Exec { script: String },
    /// Ask for the value of the form field `target`.
    GetValue { target: String },
    /// Ask for the page URL.
    GetLocation,
    /// Informational message for the user.
    Notice { message: String },
}

/// Client to server message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// A named UI action, e.g. a button press.
    Event {
        name: String,
        #[serde(default)]
        params: Vec<String>,
    },
    /// Reply to [`UiCommand::GetValue`].
    Value { target: String, value: String },
    /// Reply to [`UiCommand::GetLocation`].
    Location { href: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_wire_format() {
        let cmd = UiCommand::Append {
            target: "output".into(),
            content: "<p>x</p>".into(),
        };
        let json: serde_json::Value = serde_json::to_value(&cmd).unwrap();
        assert_eq!(json["type"], "append");
        assert_eq!(json["target"], "output");

        let json = serde_json::to_string(&UiCommand::GetLocation).unwrap();
        assert_eq!(json, r#"{"type":"get_location"}"#);
    }

    #[test]
    fn test_event_params_default() {
        let msg: ClientMessage = serde_json::from_str(r#"{"type":"event","name":"run"}"#).unwrap();
        assert_eq!(
            msg,
            ClientMessage::Event {
                name: "run".into(),
                params: vec![],
            }
        );
    }

    #[test]
    fn test_value_reply() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"value","target":"input","value":"(+ 1 2)"}"#)
                .unwrap();
        assert!(matches!(msg, ClientMessage::Value { ref value, .. } if value == "(+ 1 2)"));
    }

    #[test]
    fn test_unknown_type_rejected() {
        assert!(serde_json::from_str::<ClientMessage>(r#"{"type":"nope"}"#).is_err());
    }
}
