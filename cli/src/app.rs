//! Dependency wiring: configuration plus CLI overrides into a use case

use anyhow::{Context, Result, bail};
use mirror_application::{BrainAdapter, HistoryStore, MirrorParams, RunMirrorUseCase};
use mirror_infrastructure::{
    BrainFactory, FileConfig, FileLayout, JsonHistoryStore, build_classifier,
    mock_brains_from_env,
};
use mirror_presentation::{GlobalArgs, Layout, OutputConfig};
use std::io::IsTerminal;
use std::sync::Arc;
use tracing::{debug, warn};

const DEFAULT_WIDTH: usize = 100;

pub struct App {
    pub config: FileConfig,
    pub args: GlobalArgs,
}

impl App {
    pub fn new(config: FileConfig, args: GlobalArgs) -> Self {
        Self { config, args }
    }

    pub fn use_mock(&self) -> bool {
        self.args.mock || mock_brains_from_env()
    }

    /// Run parameters from `[session]`, overridden by command-line flags
    pub fn params(&self) -> MirrorParams {
        let mut params = self.config.mirror_params();
        if let Some(intensity) = self.args.intensity {
            params = params.with_intensity(intensity.into());
        }
        if self.args.persona.is_some() {
            params = params.with_persona(self.args.persona);
        }
        let auto_classify = params.auto_classify && !self.args.no_classify;
        params.with_auto_classify(auto_classify)
    }

    pub fn build_use_case(&self) -> Result<RunMirrorUseCase> {
        let use_mock = self.use_mock();
        let session = &self.config.session;

        let original_id = self
            .args
            .original
            .as_deref()
            .unwrap_or(&session.original_brain_id);
        let original = BrainFactory::create_by_id(&self.config, original_id, use_mock)
            .with_context(|| format!("Original brain not available: {original_id}"))?;

        let challenger = if self.args.no_mirror {
            debug!("Mirroring disabled");
            None
        } else {
            self.challenger(use_mock)?
        };

        let judge = match &challenger {
            Some(_) if session.judge_enabled && !self.args.no_judge => {
                self.optional_brain(&session.judge_brain_id, "Judge", use_mock)
            }
            _ => None,
        };

        Ok(RunMirrorUseCase::new(original, build_classifier(&self.config, use_mock))
            .with_challenger(challenger)
            .with_judge(judge)
            .with_params(self.params()))
    }

    fn challenger(&self, use_mock: bool) -> Result<Option<Arc<dyn BrainAdapter>>> {
        match &self.args.challenger {
            // An explicit choice must work
            Some(id) => match BrainFactory::create_by_id(&self.config, id, use_mock) {
                Ok(brain) => Ok(Some(brain)),
                Err(e) => bail!("Challenger brain not available: {e}"),
            },
            None => Ok(self.optional_brain(
                &self.config.session.challenger_brain_id,
                "Challenger",
                use_mock,
            )),
        }
    }

    fn optional_brain(&self, id: &str, role: &str, use_mock: bool) -> Option<Arc<dyn BrainAdapter>> {
        match BrainFactory::create_by_id(&self.config, id, use_mock) {
            Ok(brain) => Some(brain),
            Err(e) => {
                warn!("{} disabled: {}", role, e);
                None
            }
        }
    }

    pub fn output(&self) -> OutputConfig {
        let ui = &self.config.ui;
        let layout = match ui.layout {
            FileLayout::SideBySide => Layout::SideBySide,
            FileLayout::Stacked => Layout::Stacked,
        };
        let width = std::env::var("COLUMNS")
            .ok()
            .and_then(|c| c.parse().ok())
            .unwrap_or(DEFAULT_WIDTH);
        OutputConfig {
            layout,
            show_token_counts: ui.show_token_counts,
            show_latency: ui.show_latency,
            show_progress: std::io::stderr().is_terminal(),
            width,
        }
    }

    pub fn history_store(&self) -> Option<Arc<dyn HistoryStore>> {
        let store = JsonHistoryStore::default_location();
        if store.is_none() {
            warn!("No data directory; history will not be recorded");
        }
        store.map(|s| Arc::new(s) as Arc<dyn HistoryStore>)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mirror_domain::{Intensity, Persona};
    use mirror_presentation::IntensityArg;

    fn app(args: GlobalArgs) -> App {
        App::new(FileConfig::default(), GlobalArgs { mock: true, ..args })
    }

    #[test]
    fn test_flags_override_session() {
        let app = app(GlobalArgs {
            intensity: Some(IntensityArg::Aggressive),
            persona: Some(Persona::Regulator),
            no_classify: true,
            ..Default::default()
        });
        let params = app.params();
        assert_eq!(params.intensity, Intensity::Aggressive);
        assert_eq!(params.persona, Some(Persona::Regulator));
        assert!(!params.auto_classify);
    }

    #[test]
    fn test_default_wiring_is_dual_with_judge() {
        let use_case = app(GlobalArgs::default()).build_use_case().unwrap();
        assert_eq!(use_case.original_id(), "claude-sonnet-4-6");
        assert_eq!(use_case.challenger_id(), Some("gpt-4o"));
        assert_eq!(use_case.judge_id(), Some("claude-sonnet-4-6"));
    }

    #[test]
    fn test_no_mirror_drops_challenger_and_judge() {
        let use_case = app(GlobalArgs {
            no_mirror: true,
            ..Default::default()
        })
        .build_use_case()
        .unwrap();
        assert_eq!(use_case.challenger_id(), None);
        assert_eq!(use_case.judge_id(), None);
    }

    #[test]
    fn test_no_judge() {
        let use_case = app(GlobalArgs {
            no_judge: true,
            ..Default::default()
        })
        .build_use_case()
        .unwrap();
        assert_eq!(use_case.judge_id(), None);
    }

    #[test]
    fn test_unknown_brains() {
        let result = app(GlobalArgs {
            original: Some("nope".into()),
            ..Default::default()
        })
        .build_use_case();
        assert!(result.is_err());

        let result = app(GlobalArgs {
            challenger: Some("nope".into()),
            ..Default::default()
        })
        .build_use_case();
        assert!(result.is_err());
    }
}
