//! `chat` and `mirror`: the commands that actually run brains

use crate::app::App;
use anyhow::{Result, bail};
use mirror_application::{ChatOptions, HistoryRecorder, RunMirrorInput};
use mirror_presentation::{ChatRepl, EventRenderer, RunLabels, RunOutcome, render_run};
use std::io;
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Exit status for a run stopped with Ctrl-C
const EXIT_ABORTED: u8 = 130;

pub async fn chat(app: &App) -> Result<ExitCode> {
    let use_case = Arc::new(app.build_use_case()?);
    let mut repl = ChatRepl::new(use_case, app.config.session.history_window_size)
        .with_history_store(app.history_store())
        .with_output(app.output());

    repl.run().await?;
    Ok(ExitCode::SUCCESS)
}

pub async fn mirror(app: &App, question: &str) -> Result<ExitCode> {
    let use_case = Arc::new(app.build_use_case()?);
    info!("One-shot mirror: {}", question);

    let token = CancellationToken::new();
    let interrupt = tokio::spawn({
        let token = token.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                token.cancel();
            }
        }
    });

    let input = RunMirrorInput::new(question)
        .with_options(ChatOptions::default().with_cancellation(token));
    let labels = RunLabels::from_use_case(&use_case);
    let mut recorder = HistoryRecorder::new(question);
    let mut events = Arc::clone(&use_case).spawn(input);
    let mut renderer = EventRenderer::new(io::stdout(), app.output(), labels);

    let outcome = render_run(&mut events, &mut renderer, Some(&mut recorder)).await?;
    interrupt.abort();

    if let Some(entry) = recorder.finish()
        && let Some(store) = app.history_store()
        && let Err(e) = store.add(entry).await
    {
        warn!("Could not record history: {}", e);
    }

    match outcome {
        RunOutcome::Completed => Ok(ExitCode::SUCCESS),
        RunOutcome::Aborted => Ok(ExitCode::from(EXIT_ABORTED)),
        RunOutcome::Failed(cause) => bail!("Failed to run mirror: {cause}"),
    }
}
