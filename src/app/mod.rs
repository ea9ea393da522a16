use std::fs;
use std::io::{self, Read};
use std::path::Path;
use std::sync::Arc;

use log::{info, warn};

use crate::cli::{AnalyzeArgs, Command, GradeArgs, OutputFormat, ParseArgs, QuestionArgs, StatsArgs};
use crate::config::EngineConfig;
use crate::grading::history::{self, EvaluationRecord, HistoryError};
use crate::grading::llm::parser::{parse_evaluation_response, ParseError};
use crate::grading::llm::{GradingError, LlmGrader};
use crate::grading::predictor::question::grade_question;
use crate::grading::report;
use crate::grading::{Assignment, Evaluation, EvaluationEngine, EvaluationReport, FeedbackItem};
use crate::llm::{LlmClient, LlmConfig, LlmProvider};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    History(#[from] HistoryError),
    #[error(transparent)]
    Grading(#[from] GradingError),
    #[error("Could not read evaluation: {0}")]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    User(String),
}

/// Dispatches parsed CLI commands.
pub struct App {
    engine_config: EngineConfig,
    llm_config: LlmConfig,
    client: Option<Arc<dyn LlmClient>>,
}

impl App {
    pub fn new(engine_config: EngineConfig, llm_config: LlmConfig) -> Self {
        Self {
            engine_config,
            llm_config,
            client: None,
        }
    }

    /// Use `client` instead of building one from the LLM config.
    pub fn with_client(mut self, client: Arc<dyn LlmClient>) -> Self {
        self.client = Some(client);
        self
    }

    pub fn run(&self, command: Command) -> Result<(), AppError> {
        let output = self.execute(command)?;
        println!("{}", output);
        Ok(())
    }

    /// Run a command and return what it would print.
    pub fn execute(&self, command: Command) -> Result<String, AppError> {
        match command {
            Command::Analyze(opts) => self.handle_analyze(opts),
            Command::Grade(opts) => self.handle_grade(opts),
            Command::Question(opts) => self.handle_question(opts),
            Command::Parse(opts) => self.handle_parse(opts),
            Command::Stats(opts) => self.handle_stats(opts),
        }
    }

    fn handle_analyze(&self, opts: AnalyzeArgs) -> Result<String, AppError> {
        let evaluation = parse_evaluation_response(&read_input(&opts.evaluation)?)?;
        let assignment = opts
            .assignment
            .as_deref()
            .map(load_assignment)
            .transpose()?;

        self.analyze_and_report(
            &evaluation,
            assignment.as_ref(),
            opts.format,
            opts.full,
            opts.save,
        )
    }

    fn handle_grade(&self, opts: GradeArgs) -> Result<String, AppError> {
        let assignment = load_assignment(&opts.assignment)?;
        if assignment.body().is_none() {
            return Err(AppError::User(
                "Assignment has no content to grade".to_string(),
            ));
        }

        let client = match &self.client {
            Some(client) => client.clone(),
            None => {
                let provider = opts
                    .llm
                    .provider
                    .as_deref()
                    .map(|p| p.parse::<LlmProvider>().map_err(AppError::User))
                    .transpose()?;
                self.llm_config
                    .clone()
                    .with_overrides(provider, opts.llm.model, opts.llm.opencode_backend)
                    .create_client()
            }
        };

        info!(
            "Grading {} word assignment",
            assignment.effective_word_count()
        );
        let evaluation = LlmGrader::new(client)
            .with_max_retries(opts.retries)
            .grade(&assignment)?;
        info!("LLM awarded {}", evaluation.grade);

        self.analyze_and_report(
            &evaluation,
            Some(&assignment),
            opts.format,
            opts.full,
            opts.save,
        )
    }

    fn handle_question(&self, opts: QuestionArgs) -> Result<String, AppError> {
        let assignment = load_assignment(&opts.assignment)?;
        let question = assignment
            .question_data
            .as_ref()
            .ok_or_else(|| AppError::User("Assignment has no questionData".to_string()))?;

        let prediction = grade_question(question);
        Ok(report::format_prediction(
            &prediction,
            convert_format(opts.format),
        ))
    }

    fn handle_parse(&self, opts: ParseArgs) -> Result<String, AppError> {
        let item = FeedbackItem::parse(&opts.raw);
        Ok(serde_json::to_string_pretty(&item)?)
    }

    fn handle_stats(&self, opts: StatsArgs) -> Result<String, AppError> {
        let records = history::load_all(&self.engine_config.history_dir)?;
        if records.is_empty() {
            warn!(
                "No saved evaluations in {}",
                self.engine_config.history_dir.display()
            );
        }
        let stats = history::aggregate_accuracy(&records);
        Ok(report::format_stats(&stats, convert_format(opts.format)))
    }

    fn analyze_and_report(
        &self,
        evaluation: &Evaluation,
        assignment: Option<&Assignment>,
        format: OutputFormat,
        full: bool,
        save: bool,
    ) -> Result<String, AppError> {
        let engine = EvaluationEngine::from_config(&self.engine_config);
        let mut rng = self.engine_config.rng();
        let result = engine.analyze(evaluation, assignment, &mut rng);

        if save {
            self.save(&result, assignment)?;
        }

        Ok(report::format_report(&result, convert_format(format), full))
    }

    fn save(
        &self,
        result: &EvaluationReport,
        assignment: Option<&Assignment>,
    ) -> Result<(), AppError> {
        let record = EvaluationRecord::from_report(result, assignment);
        let path = history::save_record(&record, &self.engine_config.history_dir)?;
        info!("Evaluation saved to: {}", path.display());
        Ok(())
    }
}

/// Read a file, or stdin when the path is `-`.
fn read_input(path: &Path) -> Result<String, AppError> {
    if path == Path::new("-") {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        return Ok(buffer);
    }
    fs::read_to_string(path)
        .map_err(|e| AppError::User(format!("Failed to read {}: {}", path.display(), e)))
}

fn load_assignment(path: &Path) -> Result<Assignment, AppError> {
    Ok(serde_json::from_str(&read_input(path)?)?)
}

fn convert_format(format: OutputFormat) -> report::OutputFormat {
    match format {
        OutputFormat::Pretty => report::OutputFormat::Pretty,
        OutputFormat::Json => report::OutputFormat::Json,
        OutputFormat::Markdown => report::OutputFormat::Markdown,
        OutputFormat::Compact => report::OutputFormat::Compact,
    }
}
