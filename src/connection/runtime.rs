//! Serve loop for a bound connection.

use crate::error::PlaygroundError;
use crate::forms::Form;
use crate::session::{Binding, SessionStore};
use crate::transport::Transport;
use crate::ui::Ui;
use crate::Result;

use super::handshake;

const SUPERSEDED_NOTICE: &str = "This session was opened in another window.";

enum Step {
    Handled,
    Closed,
    Superseded,
}

/// Resolve the session for `transport`, bind to it and serve UI events.
///
/// Returns when the client disconnects or a newer connection takes over the
/// session. A takeover cancels whatever the connection was doing, including
/// an event handler waiting on the client. The session and its evaluation
/// context stay in the registry either way.
pub async fn serve_connection<T, F, C>(
    mut transport: T,
    store: &SessionStore<C>,
    form: &F,
) -> Result<()>
where
    T: Transport,
    F: Form<C>,
    C: Send + 'static,
{
    let resolved = handshake(&mut transport, store).await?;
    let session = resolved.session;
    let binding = session.bind();

    let mut ui = Ui::new(transport);
    form.render(&mut ui).await?;

    loop {
        let step = tokio::select! {
            biased;
            _ = binding.superseded() => Step::Superseded,
            step = serve_event(&mut ui, &binding, form) => step?,
        };

        match step {
            Step::Handled => {}
            Step::Superseded => {
                tracing::info!(session = %session.id, "Connection superseded");
                // The client may already be gone; nothing left to do either way.
                let _ = ui.notice(SUPERSEDED_NOTICE).await;
                return Ok(());
            }
            Step::Closed => {
                tracing::debug!(session = %session.id, "Connection closed");
                return Ok(());
            }
        }
    }
}

async fn serve_event<T, F, C>(ui: &mut Ui<T>, binding: &Binding<C>, form: &F) -> Result<Step>
where
    T: Transport,
    F: Form<C>,
    C: Send + 'static,
{
    let Some(event) = ui.next_event().await? else {
        return Ok(Step::Closed);
    };

    let session = binding.session();
    session.touch();
    tracing::debug!(session = %session.id, event = %event.name, "Dispatching event");
    form.handle(&event, binding, ui).await?;
    Ok(Step::Handled)
}

/// [`serve_connection`], logging instead of returning errors.
pub async fn run_connection<T, F, C>(transport: T, store: &SessionStore<C>, form: &F)
where
    T: Transport,
    F: Form<C>,
    C: Send + 'static,
{
    match serve_connection(transport, store, form).await {
        Ok(()) => {}
        Err(PlaygroundError::ConnectionClosed) => {
            tracing::debug!("Client disconnected mid-exchange");
        }
        Err(e) => tracing::error!("Connection error: {}", e),
    }
}
