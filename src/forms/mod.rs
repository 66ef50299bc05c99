//! Pages served over a bound connection.

mod repl;

use std::future::Future;

pub use repl::{Action, ReplForm, CONTENT, INPUT, OUTPUT, SHARE_URL};

use crate::session::Binding;
use crate::transport::Transport;
use crate::ui::{Event, Ui};
use crate::Result;

/// An interactive page: draws itself and reacts to named UI events.
///
/// `C` is the evaluation context type of the sessions the page runs against.
pub trait Form<C>: Send + Sync + 'static {
    /// Draw the page on a freshly bound connection.
    fn render<T: Transport>(&self, ui: &mut Ui<T>) -> impl Future<Output = Result<()>> + Send;

    /// Handle one client event for the connection holding `binding`.
    ///
    /// Errors returned here are transport failures and end the connection;
    /// user-facing failures are rendered into the page instead.
    fn handle<T: Transport>(
        &self,
        event: &Event,
        binding: &Binding<C>,
        ui: &mut Ui<T>,
    ) -> impl Future<Output = Result<()>> + Send;
}
