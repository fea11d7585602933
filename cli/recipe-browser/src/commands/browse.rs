use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use bpaf::Bpaf;
use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use recipe_catalog::ClientTrait;
use recipe_view::{Action, Render, View, ViewController};
use tracing::{debug, info, instrument, trace};

use crate::config::Config;
use crate::utils::init::{init_catalog_client, log_to_file};
use crate::utils::render::TerminalRenderer;
use crate::utils::terminal::TerminalSession;

// Browse and search recipes interactively
#[derive(Debug, Bpaf, Clone)]
pub struct Browse {}

impl Browse {
    #[instrument(name = "browse", skip_all)]
    pub async fn handle(self, config: Config) -> Result<()> {
        let client = Arc::new(init_catalog_client(&config)?);

        let _log_guard = log_to_file(&config.log_file)?;
        info!(catalog_url = %config.catalog_url, "starting interactive session");

        let session = TerminalSession::enter()?;
        let size = crossterm::terminal::size().context("could not determine terminal size")?;
        let mut renderer =
            TerminalRenderer::full_screen(io::stdout(), config.image_base_url.as_str(), size);

        let mut controller = ViewController::new(client, config.controller_options());
        controller.initialize();

        let result = run_session(&mut controller, &mut renderer).await;

        controller.cancel_all();
        drop(session);
        info!(ok = result.is_ok(), "interactive session ended");
        result
    }
}

/// What a terminal event means for the session.
#[derive(Debug, PartialEq, Eq)]
enum Input {
    Action(Action),
    Resize(u16, u16),
    Quit,
    Ignore,
}

/// Translate a terminal event, given what is currently displayed.
fn on_event(event: &Event, view: &View<'_>) -> Input {
    let key = match event {
        Event::Key(key) => key,
        Event::Resize(cols, rows) => return Input::Resize(*cols, *rows),
        _ => return Input::Ignore,
    };
    on_key(key, view)
}

fn on_key(key: &KeyEvent, view: &View<'_>) -> Input {
    if key.kind == KeyEventKind::Release {
        return Input::Ignore;
    }
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Esc => Input::Quit,
        KeyCode::Char('c') if ctrl => Input::Quit,
        KeyCode::Char('r') if ctrl => Input::Action(Action::Retry),
        KeyCode::Char(c) if !ctrl && !key.modifiers.contains(KeyModifiers::ALT) => {
            let mut query = view.query.to_string();
            query.push(c);
            Input::Action(Action::QueryChanged(query))
        },
        KeyCode::Backspace if !view.query.is_empty() => {
            let mut query = view.query.to_string();
            query.pop();
            Input::Action(Action::QueryChanged(query))
        },
        KeyCode::Left | KeyCode::PageUp => match view.previous_page() {
            Some(page) => Input::Action(Action::PageChanged(page)),
            None => Input::Ignore,
        },
        KeyCode::Right | KeyCode::PageDown => match view.next_page() {
            Some(page) => Input::Action(Action::PageChanged(page)),
            None => Input::Ignore,
        },
        _ => Input::Ignore,
    }
}

/// Multiplex terminal input and catalog responses until the user quits.
///
/// Redraws after every handled event or completed request.
async fn run_session<C, W>(
    controller: &mut ViewController<C>,
    renderer: &mut TerminalRenderer<W>,
) -> Result<()>
where
    C: ClientTrait + 'static,
    W: Write,
{
    let mut events = EventStream::new();
    renderer.render(&controller.view())?;

    loop {
        tokio::select! {
            Some(outcome) = controller.next_completion(), if controller.has_in_flight() => {
                debug!(?outcome, "request completed");
            },
            event = events.next() => {
                let Some(event) = event else {
                    debug!("terminal event stream closed");
                    break;
                };
                let event = event.context("could not read terminal event")?;
                trace!(?event, "terminal event");

                match on_event(&event, &controller.view()) {
                    Input::Action(action) => {
                        controller.dispatch(action);
                    },
                    Input::Resize(cols, rows) => renderer.resize(cols, rows),
                    Input::Quit => break,
                    Input::Ignore => continue,
                }
            },
        }

        renderer.render(&controller.view())?;
    }

    Ok(())
}
