//! The playground page.
//!
//! Layout: Run / Share / Clean buttons, a share banner, the input buffer and
//! the output area. `run` evaluates the input against the session's
//! persistent context and appends the echo plus result or error.

use std::str::FromStr;
use std::sync::Arc;

use super::Form;
use crate::error::PlaygroundError;
use crate::lang::Language;
use crate::session::Binding;
use crate::share::{share_url, SnippetStore};
use crate::transport::Transport;
use crate::ui::{Event, Node, Ui};
use crate::Result;

/// Element the whole page is rendered into.
pub const CONTENT: &str = "content";
/// Input buffer.
pub const INPUT: &str = "input";
/// Output area.
pub const OUTPUT: &str = "output";
/// Share link / error banner.
pub const SHARE_URL: &str = "shareurl";

const CLEAR_SHARE_ON_EDIT: &str = r#"document.getElementById("input").addEventListener("input", function () {
  document.getElementById("shareurl").innerHTML = "";
});"#;

const SCROLL_OUTPUT: &str =
    r#"var out = document.getElementById("output"); out.scrollTop = out.scrollHeight;"#;

/// Events the page reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Run,
    Clean,
    Share,
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::Run => "run",
            Action::Clean => "clean",
            Action::Share => "share",
        }
    }
}

impl FromStr for Action {
    type Err = PlaygroundError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "run" => Ok(Action::Run),
            "clean" => Ok(Action::Clean),
            "share" => Ok(Action::Share),
            other => Err(PlaygroundError::Protocol(format!("unknown action: {other}"))),
        }
    }
}

/// Read-eval-print page backed by a [`Language`].
pub struct ReplForm<L> {
    language: Arc<L>,
    snippets: Option<Arc<SnippetStore>>,
}

impl<L: Language> ReplForm<L> {
    /// Create the page. Without a snippet store the Share button is omitted.
    pub fn new(language: Arc<L>, snippets: Option<Arc<SnippetStore>>) -> Self {
        Self { language, snippets }
    }

    pub fn sharing_enabled(&self) -> bool {
        self.snippets.is_some()
    }

    /// Page structure.
    pub fn layout(&self) -> Node {
        let mut buttons = Node::panel()
            .class("row")
            .child(Node::button("Run", Action::Run.name()).class("btn btn-primary col-3"));
        if self.sharing_enabled() {
            buttons = buttons
                .child(Node::button("Share", Action::Share.name()).class("btn btn-info col-3 offset-1"));
        }
        buttons = buttons.child(
            Node::button("Clean", Action::Clean.name()).class("btn btn-secondary col-3 offset-1"),
        );

        let mut content = Node::panel()
            .class("container")
            .child(Node::heading(3, format!("The {} Playground", self.title())))
            .child(buttons);

        if self.sharing_enabled() {
            content = content.child(
                Node::panel()
                    .id(SHARE_URL)
                    .class("row")
                    .style("margin-top", "15px"),
            );
        }

        content
            .child(Node::heading(4, "Input"))
            .child(
                Node::text_area(INPUT)
                    .class("form-control")
                    .data("rows", "20")
                    .data("cols", "80")
                    .attr("spellcheck", "false")
                    .style("height", "300px")
                    .style("width", "100%")
                    .style("margin-top", "10px"),
            )
            .child(Node::heading(4, "Output"))
            .child(
                Node::panel()
                    .id(OUTPUT)
                    .style("height", "300px")
                    .style("width", "100%")
                    .style("background-color", "#EEEEEE")
                    .style("overflow", "auto"),
            )
    }

    fn title(&self) -> String {
        let name = self.language.name();
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    /// Evaluate the input buffer against the session's context.
    ///
    /// Nothing is evaluated once another connection has taken the session
    /// over.
    pub async fn run<T: Transport>(
        &self,
        binding: &Binding<L::Context>,
        ui: &mut Ui<T>,
    ) -> Result<()> {
        let session = binding.session();
        let code = ui.request_value(INPUT).await?;
        if code.is_empty() || binding.is_superseded() {
            return Ok(());
        }

        ui.append_html(OUTPUT, echo_line(&code)).await?;

        let init = Arc::clone(&self.language);
        let language = Arc::clone(&self.language);
        let outcome = binding
            .with_context(
                move || init.new_context(),
                move |context| language.run(&code, context).map(|value| value.to_string()),
            )
            .await;

        let line = match outcome {
            Ok(Some(Ok(value))) => result_line(&value),
            Ok(Some(Err(e))) => {
                tracing::debug!(session = %session.id, "Evaluation failed: {}", e);
                error_line(&e.to_string())
            }
            Ok(None) => {
                tracing::debug!(session = %session.id, "Run dropped after takeover");
                return Ok(());
            }
            Err(e) => {
                tracing::error!(session = %session.id, "{}", e);
                error_line(&e.to_string())
            }
        };
        ui.append_html(OUTPUT, line).await?;
        ui.exec(SCROLL_OUTPUT).await
    }

    /// Empty the output area, the share banner and the input buffer.
    pub async fn clean<T: Transport>(&self, ui: &mut Ui<T>) -> Result<()> {
        ui.set_html(OUTPUT, "").await?;
        if self.sharing_enabled() {
            ui.set_html(SHARE_URL, "").await?;
        }
        ui.set_value(INPUT, "").await
    }

    /// Store the input buffer and show a link that reopens it.
    pub async fn share<T: Transport>(&self, ui: &mut Ui<T>) -> Result<()> {
        let Some(store) = &self.snippets else {
            tracing::debug!("Share requested but sharing is disabled");
            return Ok(());
        };

        let code = ui.request_value(INPUT).await?;
        let page = ui.request_location().await?;

        match store.save(&code).await {
            Ok(token) => {
                let url = share_url(&page, &token);
                let banner = Node::panel()
                    .class("alert alert-success")
                    .attr("role", "alert")
                    .child(Node::new("b").text("URL to share:"))
                    .text(" ")
                    .child(Node::new("a").attr("href", url.clone()).text(url));
                ui.set_html(SHARE_URL, banner.render()).await
            }
            Err(e) => share_error(ui, "Error saving code", &e).await,
        }
    }

    /// Pre-fill the input buffer from a shared snippet named in the page URL.
    async fn load_shared<T: Transport>(&self, store: &SnippetStore, ui: &mut Ui<T>) -> Result<()> {
        let page = ui.request_location().await?;
        match store.load_from_url(&page).await {
            Ok(Some(code)) => ui.set_value(INPUT, code).await,
            Ok(None) => Ok(()),
            Err(e) => share_error(ui, "Error loading code", &e).await,
        }
    }
}

impl<L: Language> Form<L::Context> for ReplForm<L> {
    async fn render<T: Transport>(&self, ui: &mut Ui<T>) -> Result<()> {
        ui.set_html(CONTENT, self.layout().render()).await?;
        if let Some(store) = &self.snippets {
            ui.exec(CLEAR_SHARE_ON_EDIT).await?;
            self.load_shared(store, ui).await?;
        }
        Ok(())
    }

    async fn handle<T: Transport>(
        &self,
        event: &Event,
        binding: &Binding<L::Context>,
        ui: &mut Ui<T>,
    ) -> Result<()> {
        match event.name.parse::<Action>() {
            Ok(Action::Run) => self.run(binding, ui).await,
            Ok(Action::Clean) => self.clean(ui).await,
            Ok(Action::Share) => self.share(ui).await,
            Err(e) => {
                tracing::warn!(session = %binding.session().id, "Unhandled UI event: {}", e);
                Ok(())
            }
        }
    }
}

fn echo_line(code: &str) -> String {
    Node::paragraph()
        .text(" >> ")
        .child(Node::new("b").text(code))
        .render()
}

fn result_line(value: &str) -> String {
    Node::paragraph()
        .class("result")
        .text(format!("-> {value}"))
        .render()
}

fn error_line(message: &str) -> String {
    Node::paragraph()
        .class("error")
        .text(format!("Err: {message}"))
        .render()
}

async fn share_error<T: Transport>(
    ui: &mut Ui<T>,
    context: &str,
    error: &PlaygroundError,
) -> Result<()> {
    tracing::warn!("{}: {}", context, error);
    let banner = Node::panel()
        .class("alert alert-danger")
        .attr("role", "alert")
        .text(format!("{context}: {error}"));
    ui.set_html(SHARE_URL, banner.render()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::Lisp;
    use crate::session::{Session, SessionId};
    use crate::transport::{memory_pair, MemoryTransport};
    use crate::ui::UiCommand;
    use serde_json::json;
    use tempfile::TempDir;

    type LispSession = Session<<Lisp as Language>::Context>;

    fn bound_session() -> (Arc<LispSession>, Binding<<Lisp as Language>::Context>) {
        let session = Arc::new(LispSession::new(SessionId::new()));
        let binding = session.bind();
        (session, binding)
    }

    fn form(snippets: Option<Arc<SnippetStore>>) -> ReplForm<Lisp> {
        ReplForm::new(Arc::new(Lisp), snippets)
    }

    async fn reply(client: &mut MemoryTransport, msg: serde_json::Value) {
        client.send_text(msg.to_string()).await.unwrap();
    }

    async fn input(client: &mut MemoryTransport, code: &str) {
        reply(client, json!({"type": "value", "target": INPUT, "value": code})).await;
    }

    /// Close the server side and collect everything it sent.
    async fn drain(ui: Ui<MemoryTransport>, client: &mut MemoryTransport) -> Vec<UiCommand> {
        drop(ui);
        let mut out = Vec::new();
        while let Some(text) = client.recv_text().await.unwrap() {
            out.push(serde_json::from_str(&text).unwrap());
        }
        out
    }

    fn appended(commands: &[UiCommand]) -> Vec<String> {
        commands
            .iter()
            .filter_map(|c| match c {
                UiCommand::Append { target, content } if target == OUTPUT => Some(content.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_action_parse() {
        assert_eq!("run".parse::<Action>().unwrap(), Action::Run);
        assert_eq!("clean".parse::<Action>().unwrap(), Action::Clean);
        assert_eq!("share".parse::<Action>().unwrap(), Action::Share);
        assert!("explode".parse::<Action>().is_err());
    }

    #[test]
    fn test_layout_share_variant() {
        let with_share = form(Some(Arc::new(SnippetStore::new("unused", "lisp"))))
            .layout()
            .render();
        assert!(with_share.contains(r#"data-event="share""#));
        assert!(with_share.contains(r#"id="shareurl""#));
        assert!(with_share.contains("The Lisp Playground"));

        let without = form(None).layout().render();
        assert!(!without.contains(r#"data-event="share""#));
        assert!(!without.contains(r#"id="shareurl""#));
        assert!(without.contains(r#"id="output""#));
    }

    #[tokio::test]
    async fn test_run_empty_input_is_noop() {
        let (server, mut client) = memory_pair();
        let mut ui = Ui::new(server);
        let (session, binding) = bound_session();

        input(&mut client, "").await;
        form(None).run(&binding, &mut ui).await.unwrap();

        let sent = drain(ui, &mut client).await;
        assert_eq!(
            sent,
            vec![UiCommand::GetValue {
                target: INPUT.into()
            }]
        );
        assert!(!session.has_context().await);
    }

    #[tokio::test]
    async fn test_run_whitespace_input_is_evaluated() {
        let (server, mut client) = memory_pair();
        let mut ui = Ui::new(server);
        let (session, binding) = bound_session();

        input(&mut client, "  \n").await;
        form(None).run(&binding, &mut ui).await.unwrap();

        let lines = appended(&drain(ui, &mut client).await);
        assert_eq!(lines.len(), 2);
        assert!(lines[1].contains("empty program"));
        assert!(session.has_context().await);
    }

    #[tokio::test]
    async fn test_run_after_takeover_leaves_context_alone() {
        let (server, mut client) = memory_pair();
        let mut ui = Ui::new(server);
        let (session, binding) = bound_session();
        let _newer = session.bind();

        input(&mut client, "(def stolen 1)").await;
        form(None).run(&binding, &mut ui).await.unwrap();

        let sent = drain(ui, &mut client).await;
        assert_eq!(
            sent,
            vec![UiCommand::GetValue {
                target: INPUT.into()
            }]
        );
        assert!(!session.has_context().await);
    }

    #[tokio::test]
    async fn test_run_echoes_and_prints_result() {
        let (server, mut client) = memory_pair();
        let mut ui = Ui::new(server);
        let (_session, binding) = bound_session();

        input(&mut client, "(+ 1 2)").await;
        form(None).run(&binding, &mut ui).await.unwrap();

        let sent = drain(ui, &mut client).await;
        assert_eq!(
            appended(&sent),
            vec![
                "<p> &gt;&gt; <b>(+ 1 2)</b></p>".to_string(),
                r#"<p class="result">-&gt; 3</p>"#.to_string(),
            ]
        );
        assert!(matches!(sent.last(), Some(UiCommand::Exec { .. })));
    }

    #[tokio::test]
    async fn test_run_error_keeps_context_usable() {
        let (server, mut client) = memory_pair();
        let mut ui = Ui::new(server);
        let (_session, binding) = bound_session();
        let form = form(None);

        input(&mut client, "(def x 41)").await;
        form.run(&binding, &mut ui).await.unwrap();
        input(&mut client, "(+ x").await;
        form.run(&binding, &mut ui).await.unwrap();
        input(&mut client, "(+ x 1)").await;
        form.run(&binding, &mut ui).await.unwrap();

        let lines = appended(&drain(ui, &mut client).await);
        assert_eq!(lines.len(), 6);
        assert!(lines[3].starts_with(r#"<p class="error">Err: parse error"#));
        assert_eq!(lines[5], r#"<p class="result">-&gt; 42</p>"#);
    }

    #[tokio::test]
    async fn test_run_escapes_user_code() {
        let (server, mut client) = memory_pair();
        let mut ui = Ui::new(server);
        let (_session, binding) = bound_session();

        input(&mut client, "\"<img src=x>\"").await;
        form(None).run(&binding, &mut ui).await.unwrap();

        let lines = appended(&drain(ui, &mut client).await);
        assert!(lines.iter().all(|l| !l.contains("<img")));
    }

    #[tokio::test]
    async fn test_clean_clears_everything() {
        let (server, mut client) = memory_pair();
        let mut ui = Ui::new(server);
        let store = Arc::new(SnippetStore::new("unused", "lisp"));

        form(Some(store)).clean(&mut ui).await.unwrap();

        let sent = drain(ui, &mut client).await;
        assert_eq!(
            sent,
            vec![
                UiCommand::Html {
                    target: OUTPUT.into(),
                    content: String::new()
                },
                UiCommand::Html {
                    target: SHARE_URL.into(),
                    content: String::new()
                },
                UiCommand::SetValue {
                    target: INPUT.into(),
                    value: String::new()
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_share_then_render_restores_input() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(SnippetStore::new(dir.path(), "lisp"));
        let form = form(Some(store));
        let code = "(def answer 42)\n; shared";

        // Share
        let (server, mut client) = memory_pair();
        let mut ui = Ui::new(server);
        input(&mut client, code).await;
        reply(&mut client, json!({"type": "location", "href": "http://play/"})).await;
        form.share(&mut ui).await.unwrap();

        let sent = drain(ui, &mut client).await;
        let banner = sent
            .iter()
            .find_map(|c| match c {
                UiCommand::Html { target, content } if target == SHARE_URL => Some(content.clone()),
                _ => None,
            })
            .unwrap();
        let start = banner.find("http://play/?").unwrap() + "http://play/?".len();
        let token = &banner[start..start + 36];

        // Reopen
        let (server, mut client) = memory_pair();
        let mut ui = Ui::new(server);
        reply(
            &mut client,
            json!({"type": "location", "href": format!("http://play/?{token}")}),
        )
        .await;
        form.render(&mut ui).await.unwrap();

        let sent = drain(ui, &mut client).await;
        assert!(sent.contains(&UiCommand::SetValue {
            target: INPUT.into(),
            value: code.into(),
        }));
    }

    #[tokio::test]
    async fn test_render_reports_malformed_url() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(SnippetStore::new(dir.path(), "lisp"));

        let (server, mut client) = memory_pair();
        let mut ui = Ui::new(server);
        reply(&mut client, json!({"type": "location", "href": "http://play/?a?b"})).await;
        form(Some(store)).render(&mut ui).await.unwrap();

        let sent = drain(ui, &mut client).await;
        let error = sent.iter().any(|c| {
            matches!(c, UiCommand::Html { target, content }
                if target == SHARE_URL && content.contains("malformed URL"))
        });
        assert!(error);
        assert!(!sent
            .iter()
            .any(|c| matches!(c, UiCommand::SetValue { .. })));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_unknown_event_ignored() {
        let (server, mut client) = memory_pair();
        let mut ui = Ui::new(server);
        let (_session, binding) = bound_session();
        let event = Event {
            name: "explode".into(),
            params: vec![],
        };

        form(None).handle(&event, &binding, &mut ui).await.unwrap();
        assert!(drain(ui, &mut client).await.is_empty());
    }
}
