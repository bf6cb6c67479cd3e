//! REPL (Read-Eval-Print Loop) for interactive chat

use crate::config::OutputConfig;
use crate::output::render::{EventRenderer, RunLabels, RunOutcome, render_run};
use colored::Colorize;
use mirror_application::{
    ChatOptions, HistoryRecorder, HistoryStore, RunMirrorInput, RunMirrorUseCase,
};
use mirror_domain::Session;
use reedline::{DefaultPrompt, DefaultPromptSegment, FileBackedHistory, Reedline, Signal};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::warn;

const LINE_HISTORY_CAPACITY: usize = 1000;

/// Slash commands understood by the REPL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Help,
    Clear,
    Brains,
    Quit,
    Unknown(String),
}

impl ReplCommand {
    /// Parse a line starting with `/`; `None` for ordinary questions
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if !line.starts_with('/') {
            return None;
        }
        let command = line.split_whitespace().next().unwrap_or(line);
        Some(match command {
            "/help" | "/h" | "/?" => ReplCommand::Help,
            "/clear" => ReplCommand::Clear,
            "/brains" => ReplCommand::Brains,
            "/quit" | "/exit" | "/q" => ReplCommand::Quit,
            other => ReplCommand::Unknown(other.to_string()),
        })
    }
}

/// Interactive chat REPL
pub struct ChatRepl {
    use_case: Arc<RunMirrorUseCase>,
    store: Option<Arc<dyn HistoryStore>>,
    output: OutputConfig,
    session: Session,
}

impl ChatRepl {
    /// Create a new ChatRepl keeping `window` messages of history
    pub fn new(use_case: Arc<RunMirrorUseCase>, window: usize) -> Self {
        Self {
            use_case,
            store: None,
            output: OutputConfig::default(),
            session: Session::new(window),
        }
    }

    /// Record every finished run in `store`
    pub fn with_history_store(mut self, store: Option<Arc<dyn HistoryStore>>) -> Self {
        self.store = store;
        self
    }

    pub fn with_output(mut self, output: OutputConfig) -> Self {
        self.output = output;
        self
    }

    /// Run the interactive REPL
    pub async fn run(&mut self) -> io::Result<()> {
        let mut line_editor = Reedline::create();

        let history_path =
            dirs::data_dir().map(|p| p.join("adversarial-mirror").join("chat_history.txt"));
        if let Some(path) = history_path {
            line_editor = Self::attach_line_history(line_editor, path);
        }

        let prompt = DefaultPrompt::new(
            DefaultPromptSegment::Basic("mirror".to_string()),
            DefaultPromptSegment::Empty,
        );

        self.print_welcome();

        loop {
            match line_editor.read_line(&prompt) {
                Ok(Signal::Success(buffer)) => {
                    let line = buffer.trim();
                    if line.is_empty() {
                        continue;
                    }

                    if let Some(command) = ReplCommand::parse(line) {
                        if self.handle_command(command) {
                            break;
                        }
                        continue;
                    }

                    self.process_question(line).await;
                }
                Ok(Signal::CtrlC) => {
                    println!("^C");
                    continue;
                }
                Ok(Signal::CtrlD) => {
                    println!("Bye!");
                    break;
                }
                Err(err) => {
                    eprintln!("Error: {}", err);
                    break;
                }
            }
        }

        Ok(())
    }

    fn attach_line_history(line_editor: Reedline, path: PathBuf) -> Reedline {
        if let Some(parent) = path.parent()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!("Could not create history directory {}: {}", parent.display(), e);
            return line_editor;
        }
        match FileBackedHistory::with_file(LINE_HISTORY_CAPACITY, path.clone()) {
            Ok(history) => line_editor.with_history(Box::new(history)),
            Err(e) => {
                warn!("Could not open line history {}: {}", path.display(), e);
                line_editor
            }
        }
    }

    fn print_welcome(&self) {
        let params = self.use_case.params();
        println!();
        println!("╭─────────────────────────────────────────────╮");
        println!("│        Adversarial Mirror - Chat Mode       │");
        println!("╰─────────────────────────────────────────────╯");
        println!();
        println!("Original:   {}", self.use_case.original_id());
        match self.use_case.challenger_id() {
            Some(id) => println!("Challenger: {} ({})", id, params.intensity),
            None => println!("Challenger: {}", "disabled".dimmed()),
        }
        if let Some(persona) = params.persona {
            println!("Persona:    {}", persona);
        }
        if let Some(id) = self.use_case.judge_id() {
            println!("Judge:      {}", id);
        }
        println!();
        println!("Type /help for commands, Ctrl+C to abort a run, Ctrl+D to exit");
        println!();
    }

    /// Returns true when the REPL should exit
    fn handle_command(&mut self, command: ReplCommand) -> bool {
        match command {
            ReplCommand::Quit => {
                println!("Bye!");
                true
            }
            ReplCommand::Help => {
                println!();
                println!("Commands:");
                println!("  /help, /h, /?    - Show this help");
                println!("  /clear           - Forget the conversation so far");
                println!("  /brains          - Show the brains taking part");
                println!("  /quit, /exit, /q - Exit chat");
                println!();
                false
            }
            ReplCommand::Clear => {
                self.session.clear();
                println!("Conversation cleared.");
                false
            }
            ReplCommand::Brains => {
                println!();
                println!("  original:   {}", self.use_case.original_id());
                println!(
                    "  challenger: {}",
                    self.use_case.challenger_id().unwrap_or("-")
                );
                println!("  judge:      {}", self.use_case.judge_id().unwrap_or("-"));
                println!();
                false
            }
            ReplCommand::Unknown(cmd) => {
                println!("Unknown command: {}", cmd);
                println!("Type /help for available commands");
                false
            }
        }
    }

    async fn process_question(&mut self, question: &str) {
        let token = CancellationToken::new();
        let input = RunMirrorInput::new(question)
            .with_history(self.session.history())
            .with_options(ChatOptions::default().with_cancellation(token.clone()));

        let interrupt = tokio::spawn({
            let token = token.clone();
            async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    token.cancel();
                }
            }
        });

        let mut events = Arc::clone(&self.use_case).spawn(input);
        let mut renderer = EventRenderer::new(
            io::stdout(),
            self.output.clone(),
            RunLabels::from_use_case(&self.use_case),
        );
        let mut recorder = HistoryRecorder::new(question);

        let outcome = render_run(&mut events, &mut renderer, Some(&mut recorder)).await;
        interrupt.abort();
        println!();

        match outcome {
            Ok(RunOutcome::Failed(cause)) => {
                eprintln!("{} {}", "Error:".red().bold(), cause);
            }
            Ok(RunOutcome::Completed | RunOutcome::Aborted) => {}
            Err(e) => eprintln!("{} {}", "Output error:".red().bold(), e),
        }

        let Some(entry) = recorder.finish() else {
            return;
        };
        self.session.add_user(question);
        self.session.add_assistant(entry.original.text.clone());

        if let Some(store) = &self.store
            && let Err(e) = store.add(entry).await
        {
            warn!("Could not record history: {}", e);
        }
    }
}
