use crate::engine::EngineCommand;
use crate::render;
use crate::state::AppState;
use anyhow::{Result, anyhow};
use finconsole_core::form::{EditMode, FormError, RawEdit};
use finconsole_core::{ConsoleError, Environment};
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,
    Pages,
    Open(String),
    Show,
    Set { field: String, value: String },
    Mode(Option<EditMode>),
    Raw(String),
    Fill,
    Submit,
    History,
    View(String),
    Env(Option<String>),
    Quit,
}

pub enum Flow {
    Continue(String),
    Quit,
}

/// Parses one input line. Blank lines yield `None`.
pub fn parse(line: &str) -> Result<Option<Command>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    let command = match verb.to_ascii_lowercase().as_str() {
        "help" | "?" => Command::Help,
        "pages" => Command::Pages,
        "open" if !rest.is_empty() => Command::Open(rest.to_string()),
        "open" => return Err(anyhow!("usage: open <key>")),
        "show" => Command::Show,
        "set" => {
            let (field, value) = rest
                .split_once(char::is_whitespace)
                .map(|(f, v)| (f, v.trim()))
                .unwrap_or((rest, ""));
            if field.is_empty() {
                return Err(anyhow!("usage: set <field> <value>"));
            }
            Command::Set {
                field: field.to_string(),
                value: value.to_string(),
            }
        }
        "mode" => match rest.to_ascii_lowercase().as_str() {
            "" => Command::Mode(None),
            "form" => Command::Mode(Some(EditMode::Structured)),
            "json" | "raw" => Command::Mode(Some(EditMode::Raw)),
            other => return Err(anyhow!("unknown mode '{}' (expected form or json)", other)),
        },
        "raw" => Command::Raw(rest.to_string()),
        "fill" => Command::Fill,
        "submit" => Command::Submit,
        "history" => Command::History,
        "view" if !rest.is_empty() => Command::View(rest.to_string()),
        "view" => return Err(anyhow!("usage: view <n|id>")),
        "env" => Command::Env((!rest.is_empty()).then(|| rest.to_string())),
        "quit" | "exit" => Command::Quit,
        other => return Err(anyhow!("unknown command '{}' (try help)", other)),
    };
    Ok(Some(command))
}

pub async fn dispatch(
    state: &mut AppState,
    command: Command,
    engine_tx: &mpsc::Sender<EngineCommand>,
) -> Result<Flow> {
    let out = match command {
        Command::Help => render::HELP.to_string(),
        Command::Pages => render::pages(&state.catalog, &state.session.page().key),
        Command::Open(key) => {
            state.open(&key)?;
            render::page(&state.session)
        }
        Command::Show => render::page(&state.session),
        Command::Set { field, value } => {
            let form = state.session.form_mut();
            if form.mode() == EditMode::Raw {
                return Err(anyhow!("field edits are available in form mode (mode form)"));
            }
            let spec = form
                .fields()
                .iter()
                .find(|f| f.name == field)
                .cloned()
                .ok_or_else(|| ConsoleError::from(FormError::UnknownField(field.clone())))?;
            form.set_field(&field, spec.coerce(&value))?;
            render::page(&state.session)
        }
        Command::Mode(mode) => {
            let form = state.session.form_mut();
            match mode {
                Some(mode) => form.set_mode(mode),
                None => {
                    form.toggle_mode();
                }
            }
            render::page(&state.session)
        }
        Command::Raw(text) => {
            let form = state.session.form_mut();
            form.set_mode(EditMode::Raw);
            match form.edit_raw(text) {
                RawEdit::Synced => "JSON updated".to_string(),
                RawEdit::NotAnObject => "JSON updated (not an object; fields unchanged)".to_string(),
                RawEdit::Invalid => "JSON text stored (not valid JSON yet)".to_string(),
            }
        }
        Command::Fill => {
            if state.session.form().mode() == EditMode::Raw {
                return Err(anyhow!("AI auto-fill is available in form mode (mode form)"));
            }
            if state.is_filling() {
                return Err(ConsoleError::Busy("AI auto-fill").into());
            }
            let pending = state.session.begin_suggestion();
            engine_tx.send(EngineCommand::Suggest(pending)).await?;
            state.mark_filling();
            "AI auto-fill requested...".to_string()
        }
        Command::Submit => {
            if state.is_submitting() {
                return Err(ConsoleError::Busy("submission").into());
            }
            let pending = match state.session.begin_submission() {
                Ok(pending) => pending,
                Err(ConsoleError::Form(FormError::InvalidJson(e))) => {
                    return Ok(Flow::Continue(render::alert(&format!(
                        "Invalid JSON format ({})",
                        e
                    ))));
                }
                Err(e) => return Err(e.into()),
            };
            let line = format!(
                "Executing {} {} on {}...",
                pending.request.method, pending.request.endpoint, pending.request.environment
            );
            engine_tx.send(EngineCommand::Execute(pending)).await?;
            state.mark_submitting();
            line
        }
        Command::History => render::history(&state.session.rows()),
        Command::View(selector) => render::detail(&state.session.detail(&selector)?),
        Command::Env(None) => format!("Environment: {}", state.session.environment()),
        Command::Env(Some(label)) => {
            let env: Environment = label.parse()?;
            state.session.set_environment(env);
            format!("Environment: {}", env)
        }
        Command::Quit => return Ok(Flow::Quit),
    };
    Ok(Flow::Continue(out))
}
