//! Live rendering of mirror events
//!
//! The original answer streams straight to the terminal whenever nothing
//! else competes for the screen. In a mirrored run the challenger is held
//! back until the original has finished (stacked layout), or both answers
//! are held back and printed as two columns (side-by-side layout).

use crate::config::{Layout, OutputConfig};
use crate::output::console::ConsoleFormatter;
use crate::progress::reporter::ProgressReporter;
use colored::Colorize;
use mirror_application::{BrainRole, HistoryRecorder, MirrorError, MirrorEvent, RunMirrorUseCase};
use mirror_domain::{CompletedResponse, SynthesisResult};
use std::io::{self, Write};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// Brain ids taking part in a run
#[derive(Debug, Clone, Default)]
pub struct RunLabels {
    pub original: String,
    pub challenger: Option<String>,
    pub judge: Option<String>,
}

impl RunLabels {
    pub fn new(original: impl Into<String>) -> Self {
        Self {
            original: original.into(),
            ..Default::default()
        }
    }

    pub fn with_challenger(mut self, id: Option<&str>) -> Self {
        self.challenger = id.map(str::to_string);
        self
    }

    pub fn with_judge(mut self, id: Option<&str>) -> Self {
        self.judge = id.map(str::to_string);
        self
    }

    pub fn from_use_case(use_case: &RunMirrorUseCase) -> Self {
        Self::new(use_case.original_id())
            .with_challenger(use_case.challenger_id())
            .with_judge(use_case.judge_id())
    }
}

/// How a rendered run ended
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Completed,
    Aborted,
    Failed(MirrorError),
}

#[derive(Debug, Default)]
struct Lane {
    text: String,
    response: Option<CompletedResponse>,
    latency: Option<Duration>,
    /// Section header written and deltas going straight out
    live: bool,
    /// Section fully written
    printed: bool,
}

impl Lane {
    fn has_output(&self) -> bool {
        !self.text.is_empty() || self.response.is_some()
    }
}

pub struct EventRenderer<W: Write> {
    out: W,
    config: OutputConfig,
    labels: RunLabels,
    progress: ProgressReporter,
    started: Instant,
    mirrored: bool,
    original: Lane,
    challenger: Lane,
    outcome: Option<RunOutcome>,
}

impl<W: Write> EventRenderer<W> {
    pub fn new(out: W, config: OutputConfig, labels: RunLabels) -> Self {
        let progress = if config.show_progress {
            ProgressReporter::new()
        } else {
            ProgressReporter::hidden()
        };
        // Unclassified runs mirror whenever a challenger exists
        let mirrored = labels.challenger.is_some();
        Self {
            out,
            config,
            labels,
            progress,
            started: Instant::now(),
            mirrored,
            original: Lane::default(),
            challenger: Lane::default(),
            outcome: None,
        }
    }

    /// The terminal outcome, once a terminal event was handled
    pub fn outcome(&self) -> Option<&RunOutcome> {
        self.outcome.as_ref()
    }

    /// Text received from the original so far
    pub fn original_text(&self) -> &str {
        self.original
            .response
            .as_ref()
            .map_or(self.original.text.as_str(), |r| r.text.as_str())
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn handle(&mut self, event: &MirrorEvent) -> io::Result<()> {
        match event {
            MirrorEvent::Classifying => {
                self.progress
                    .start("Classifying", "deciding whether to mirror");
            }
            MirrorEvent::Classified { result } => {
                self.progress.clear();
                self.mirrored = result.should_mirror && self.labels.challenger.is_some();
                writeln!(self.out, "{}", ConsoleFormatter::intent_line(result))?;
                self.started = Instant::now();
            }
            MirrorEvent::StreamChunk { role, chunk, .. } => {
                self.on_chunk(*role, &chunk.delta)?;
            }
            MirrorEvent::BackendComplete { role, response, .. } => {
                self.on_complete(*role, response)?;
            }
            MirrorEvent::Synthesizing => {
                let judge = self.judge_id().to_string();
                self.progress.start("Synthesizing", &judge);
            }
            MirrorEvent::SynthesisChunk { .. } => {}
            MirrorEvent::SynthesisComplete { result } => {
                self.progress.clear();
                self.write_synthesis(result)?;
            }
            MirrorEvent::AllComplete => {
                self.flush_pending()?;
                self.outcome = Some(RunOutcome::Completed);
            }
            MirrorEvent::Error { cause } => {
                self.progress.clear();
                self.flush_pending()?;
                if cause.is_cancelled() {
                    writeln!(self.out, "\n{}", "Aborted.".yellow())?;
                    self.outcome = Some(RunOutcome::Aborted);
                } else {
                    self.outcome = Some(RunOutcome::Failed(cause.clone()));
                }
            }
        }
        self.out.flush()
    }

    fn judge_id(&self) -> &str {
        self.labels.judge.as_deref().unwrap_or("judge")
    }

    fn streams_original_live(&self) -> bool {
        self.config.layout == Layout::Stacked || !self.mirrored
    }

    fn lane(&self, side: BrainRole) -> &Lane {
        match side {
            BrainRole::Original => &self.original,
            BrainRole::Challenger => &self.challenger,
        }
    }

    fn lane_mut(&mut self, side: BrainRole) -> &mut Lane {
        match side {
            BrainRole::Original => &mut self.original,
            BrainRole::Challenger => &mut self.challenger,
        }
    }

    fn title(&self, side: BrainRole) -> String {
        match side {
            BrainRole::Original => ConsoleFormatter::brain_heading("ORIGINAL", &self.labels.original),
            BrainRole::Challenger => ConsoleFormatter::brain_heading(
                "CHALLENGER",
                self.labels.challenger.as_deref().unwrap_or("challenger"),
            ),
        }
    }

    fn on_chunk(&mut self, role: BrainRole, delta: &str) -> io::Result<()> {
        if role == BrainRole::Original {
            self.original.text.push_str(delta);
            if self.streams_original_live() {
                if !self.original.live {
                    self.begin_section(BrainRole::Original)?;
                }
                write!(self.out, "{}", delta)?;
            }
            return Ok(());
        }

        self.challenger.text.push_str(delta);
        if self.challenger.live {
            write!(self.out, "{}", delta)?;
            return Ok(());
        }
        self.advance()
    }

    fn on_complete(&mut self, side: BrainRole, response: &CompletedResponse) -> io::Result<()> {
        let latency = self.started.elapsed();
        let lane = self.lane_mut(side);
        lane.response = Some(response.clone());
        lane.latency = Some(latency);
        if lane.text.is_empty() {
            lane.text = response.text.clone();
        }
        if lane.live {
            self.finish_section(side)?;
        }
        self.advance()
    }

    /// Write whatever the layout allows to be written now
    fn advance(&mut self) -> io::Result<()> {
        if self.config.layout == Layout::SideBySide && self.mirrored {
            if !self.original.printed
                && let (Some(original), Some(challenger)) =
                    (&self.original.response, &self.challenger.response)
            {
                let columns = ConsoleFormatter::side_by_side(
                    &self.title(BrainRole::Original),
                    &original.text,
                    &self.title(BrainRole::Challenger),
                    &challenger.text,
                    self.config.width,
                );
                write!(self.out, "\n{}", columns)?;
                self.write_stats(BrainRole::Challenger)?;
                self.write_stats(BrainRole::Original)?;
                self.original.printed = true;
                self.challenger.printed = true;
            }
            return Ok(());
        }

        if self.original.response.is_some() && !self.original.printed {
            if !self.original.live {
                self.begin_section(BrainRole::Original)?;
                let text = self.original.text.clone();
                write!(self.out, "{}", text)?;
            }
            self.finish_section(BrainRole::Original)?;
        }

        if self.original.printed && !self.challenger.printed && self.challenger.has_output() {
            if !self.challenger.live {
                self.begin_section(BrainRole::Challenger)?;
                let text = self.challenger.text.clone();
                write!(self.out, "{}", text)?;
            }
            if self.challenger.response.is_some() {
                self.finish_section(BrainRole::Challenger)?;
            }
        }
        Ok(())
    }

    fn begin_section(&mut self, side: BrainRole) -> io::Result<()> {
        let title = self.title(side);
        let title = match side {
            BrainRole::Original => title.cyan().bold(),
            BrainRole::Challenger => title.magenta().bold(),
        };
        writeln!(self.out, "\n{}", title)?;
        self.lane_mut(side).live = true;
        Ok(())
    }

    fn finish_section(&mut self, side: BrainRole) -> io::Result<()> {
        if !self.lane(side).text.ends_with('\n') {
            writeln!(self.out)?;
        }
        if self.lane(side).response.is_some() {
            self.write_stats(side)?;
        }
        let lane = self.lane_mut(side);
        lane.live = false;
        lane.printed = true;
        Ok(())
    }

    fn write_stats(&mut self, side: BrainRole) -> io::Result<()> {
        let lane = self.lane(side);
        let Some(response) = &lane.response else {
            return Ok(());
        };
        let stats = ConsoleFormatter::response_stats(
            response,
            lane.latency,
            self.config.show_latency,
            self.config.show_token_counts,
        );
        if let Some(stats) = stats {
            let line = match side {
                BrainRole::Original => format!("{} {}", self.labels.original, stats),
                BrainRole::Challenger => format!(
                    "{} {}",
                    self.labels.challenger.as_deref().unwrap_or("challenger"),
                    stats
                ),
            };
            writeln!(self.out, "{}", line.dimmed())?;
        }
        Ok(())
    }

    /// Write partial output still held back when the run ends
    fn flush_pending(&mut self) -> io::Result<()> {
        for side in [BrainRole::Original, BrainRole::Challenger] {
            let lane = self.lane(side);
            if lane.printed || !lane.has_output() {
                continue;
            }
            if !lane.live {
                self.begin_section(side)?;
                let text = self.lane(side).text.clone();
                write!(self.out, "{}", text)?;
            }
            self.finish_section(side)?;
        }
        Ok(())
    }

    fn write_synthesis(&mut self, result: &SynthesisResult) -> io::Result<()> {
        let heading = ConsoleFormatter::synthesis_heading(self.judge_id(), result.agreement_score);
        writeln!(self.out, "\n{}", heading.green().bold())?;
        writeln!(self.out, "{}", result.text.trim_end())?;
        if self.config.show_token_counts {
            let response = CompletedResponse {
                text: String::new(),
                input_tokens: result.input_tokens,
                output_tokens: result.output_tokens,
            };
            if let Some(stats) = ConsoleFormatter::response_stats(&response, None, false, true) {
                let line = format!("{} {}", self.judge_id(), stats);
                writeln!(self.out, "{}", line.dimmed())?;
            }
        }
        Ok(())
    }
}

/// Render every event of a run, feeding the recorder along the way.
///
/// A channel that closes without a terminal event counts as aborted.
pub async fn render_run<W: Write>(
    events: &mut mpsc::Receiver<MirrorEvent>,
    renderer: &mut EventRenderer<W>,
    mut recorder: Option<&mut HistoryRecorder>,
) -> io::Result<RunOutcome> {
    while let Some(event) = events.recv().await {
        if let Some(recorder) = recorder.as_deref_mut() {
            recorder.observe(&event);
        }
        renderer.handle(&event)?;
        if event.is_terminal() {
            break;
        }
    }
    Ok(renderer.outcome().cloned().unwrap_or(RunOutcome::Aborted))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mirror_application::BrainError;
    use mirror_domain::{IntentCategory, IntentResult, StreamChunk};

    fn config(layout: Layout) -> OutputConfig {
        colored::control::set_override(false);
        OutputConfig {
            layout,
            show_token_counts: false,
            show_latency: false,
            show_progress: false,
            width: 80,
        }
    }

    fn labels() -> RunLabels {
        RunLabels::new("orig").with_challenger(Some("chal"))
    }

    fn role_of(id: &str) -> BrainRole {
        if id == "chal" {
            BrainRole::Challenger
        } else {
            BrainRole::Original
        }
    }

    fn chunk(id: &str, delta: &str) -> MirrorEvent {
        MirrorEvent::StreamChunk {
            role: role_of(id),
            brain_id: id.into(),
            chunk: StreamChunk::delta(delta),
        }
    }

    fn complete(id: &str, text: &str) -> MirrorEvent {
        MirrorEvent::BackendComplete {
            role: role_of(id),
            brain_id: id.into(),
            response: CompletedResponse::from_text(text),
        }
    }

    fn render(renderer: &mut EventRenderer<Vec<u8>>, events: &[MirrorEvent]) {
        for event in events {
            renderer.handle(event).unwrap();
        }
    }

    fn output(renderer: EventRenderer<Vec<u8>>) -> String {
        String::from_utf8(renderer.into_inner()).unwrap()
    }

    #[test]
    fn test_stacked_holds_challenger_until_original_done() {
        let mut renderer = EventRenderer::new(Vec::new(), config(Layout::Stacked), labels());
        render(
            &mut renderer,
            &[
                chunk("orig", "Original "),
                chunk("chal", "Challenge "),
                chunk("orig", "answer."),
                complete("orig", "Original answer."),
                chunk("chal", "here."),
                complete("chal", "Challenge here."),
                MirrorEvent::AllComplete,
            ],
        );
        assert_eq!(renderer.outcome(), Some(&RunOutcome::Completed));
        assert_eq!(renderer.original_text(), "Original answer.");

        let text = output(renderer);
        assert_eq!(
            text,
            "\nORIGINAL (orig)\nOriginal answer.\n\nCHALLENGER (chal)\nChallenge here.\n"
        );
    }

    #[test]
    fn test_side_by_side_prints_columns_once_both_done() {
        let mut renderer = EventRenderer::new(Vec::new(), config(Layout::SideBySide), labels());
        render(
            &mut renderer,
            &[chunk("orig", "left "), complete("orig", "left")],
        );
        assert!(output_so_far(&renderer).is_empty());

        render(
            &mut renderer,
            &[complete("chal", "right"), MirrorEvent::AllComplete],
        );
        let text = output(renderer);
        assert!(text.contains("ORIGINAL (orig)"));
        assert!(text.contains("CHALLENGER (chal)"));
        let row = text.lines().last().unwrap();
        assert!(row.starts_with("left"));
        assert!(row.ends_with("right"));
    }

    fn output_so_far(renderer: &EventRenderer<Vec<u8>>) -> &[u8] {
        &renderer.out
    }

    #[test]
    fn test_direct_route_streams_original_only() {
        let mut renderer = EventRenderer::new(Vec::new(), config(Layout::SideBySide), labels());
        render(
            &mut renderer,
            &[
                MirrorEvent::Classifying,
                MirrorEvent::Classified {
                    result: IntentResult::new(IntentCategory::FactualLookup, false, 0.95, "lookup"),
                },
                chunk("orig", "Paris."),
                complete("orig", "Paris."),
                MirrorEvent::AllComplete,
            ],
        );
        let text = output(renderer);
        assert!(text.starts_with("[DIRECT] factual_lookup (95%)"));
        assert!(text.contains("ORIGINAL (orig)\nParis.\n"));
        assert!(!text.contains("CHALLENGER"));
    }

    #[test]
    fn test_synthesis_heading_with_score() {
        let labels = labels().with_judge(Some("judge-brain"));
        let mut renderer = EventRenderer::new(Vec::new(), config(Layout::Stacked), labels);
        render(
            &mut renderer,
            &[
                complete("orig", "a"),
                complete("chal", "b"),
                MirrorEvent::Synthesizing,
                MirrorEvent::SynthesisComplete {
                    result: SynthesisResult {
                        text: "AGREEMENT: 40%\nThey differ.".into(),
                        agreement_score: Some(40),
                        ..Default::default()
                    },
                },
                MirrorEvent::AllComplete,
            ],
        );
        let text = output(renderer);
        assert!(text.contains("SYNTHESIS (judge-brain) — agreement 40%\nAGREEMENT: 40%\nThey differ.\n"));
    }

    #[test]
    fn test_cancelled_run_prints_aborted() {
        let mut renderer = EventRenderer::new(Vec::new(), config(Layout::Stacked), labels());
        render(
            &mut renderer,
            &[
                chunk("orig", "Half an"),
                MirrorEvent::Error {
                    cause: MirrorError::Cancelled,
                },
            ],
        );
        assert_eq!(renderer.outcome(), Some(&RunOutcome::Aborted));
        let text = output(renderer);
        assert!(text.contains("Half an\n"));
        assert!(text.trim_end().ends_with("Aborted."));
    }

    #[test]
    fn test_failure_flushes_partial_output() {
        let mut renderer = EventRenderer::new(Vec::new(), config(Layout::SideBySide), labels());
        let cause = MirrorError::backend("chal", BrainError::Stream("reset".into()));
        render(
            &mut renderer,
            &[
                chunk("orig", "partial"),
                MirrorEvent::Error {
                    cause: cause.clone(),
                },
            ],
        );
        assert_eq!(renderer.outcome(), Some(&RunOutcome::Failed(cause)));
        assert!(output(renderer).contains("ORIGINAL (orig)\npartial\n"));
    }

    #[tokio::test]
    async fn test_render_run_records_history() {
        let (tx, mut rx) = mpsc::channel(8);
        for event in [
            complete("orig", "Original answer."),
            complete("chal", "Challenge."),
            MirrorEvent::AllComplete,
        ] {
            tx.send(event).await.unwrap();
        }
        drop(tx);

        let mut renderer = EventRenderer::new(Vec::new(), config(Layout::Stacked), labels());
        let mut recorder = HistoryRecorder::new("Q?");
        let outcome = render_run(&mut rx, &mut renderer, Some(&mut recorder))
            .await
            .unwrap();

        assert_eq!(outcome, RunOutcome::Completed);
        let entry = recorder.finish().unwrap();
        assert_eq!(entry.original.text, "Original answer.");
        assert_eq!(entry.challenger.unwrap().text, "Challenge.");
    }

    #[test]
    fn test_same_brain_ids_render_by_role() {
        let labels = RunLabels::new("mock").with_challenger(Some("mock"));
        let mut renderer = EventRenderer::new(Vec::new(), config(Layout::Stacked), labels);
        let as_role = |role, delta: &str| MirrorEvent::StreamChunk {
            role,
            brain_id: "mock".into(),
            chunk: StreamChunk::delta(delta),
        };
        let done = |role, text: &str| MirrorEvent::BackendComplete {
            role,
            brain_id: "mock".into(),
            response: CompletedResponse::from_text(text),
        };
        render(
            &mut renderer,
            &[
                as_role(BrainRole::Original, "Keep "),
                as_role(BrainRole::Challenger, "Doubt "),
                as_role(BrainRole::Challenger, "it."),
                done(BrainRole::Challenger, "Doubt it."),
                as_role(BrainRole::Original, "it."),
                done(BrainRole::Original, "Keep it."),
                MirrorEvent::AllComplete,
            ],
        );
        assert_eq!(renderer.original_text(), "Keep it.");
        assert_eq!(
            output(renderer),
            "\nORIGINAL (mock)\nKeep it.\n\nCHALLENGER (mock)\nDoubt it.\n"
        );
    }

    #[tokio::test]
    async fn test_closed_channel_counts_as_aborted() {
        let (tx, mut rx) = mpsc::channel::<MirrorEvent>(1);
        drop(tx);
        let mut renderer = EventRenderer::new(Vec::new(), config(Layout::Stacked), labels());
        let outcome = render_run(&mut rx, &mut renderer, None).await.unwrap();
        assert_eq!(outcome, RunOutcome::Aborted);
    }
}
