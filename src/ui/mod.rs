//! UI surface of a connected browser.
//!
//! The server never touches the DOM directly. It sends abstract commands
//! ("set this element's HTML", "append", "run a script") and receives named
//! events back. Page structure is described as a [`Node`] tree and rendered
//! to escaped HTML.

mod channel;
mod node;
mod protocol;

pub use channel::{Event, Ui};
pub use node::{escape, Node};
pub use protocol::{ClientMessage, UiCommand};
