use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Command line interface definition for karakter.
#[derive(Parser, Debug)]
#[command(name = "karakter")]
#[command(about = "Predict grades on the 7-step scale and structure LLM feedback")]
#[command(version)]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbosity: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbosity")]
    pub quiet: bool,

    /// Seed for synthesized feedback (overrides KARAKTER_SEED)
    #[arg(long, global = true)]
    pub seed: Option<u64>,

    /// Do not synthesize or enrich improvement items
    #[arg(long, global = true)]
    pub no_synthesis: bool,

    /// Directory for saved evaluation records (overrides KARAKTER_HISTORY_DIR)
    #[arg(long, global = true, value_name = "DIR")]
    pub history_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Analyze an existing LLM evaluation
    Analyze(AnalyzeArgs),
    /// Grade an assignment with an LLM, then analyze the result
    Grade(GradeArgs),
    /// Auto-grade the structured question of an assignment
    Question(QuestionArgs),
    /// Parse one raw feedback string and print it as JSON
    Parse(ParseArgs),
    /// Show accuracy statistics over saved evaluations
    Stats(StatsArgs),
}

#[derive(Args, Debug, Clone)]
pub struct AnalyzeArgs {
    /// Evaluation JSON file, or - for stdin
    #[arg(short, long, value_name = "FILE")]
    pub evaluation: PathBuf,

    /// Assignment JSON file (subject, content, wordCount, questionData)
    #[arg(short, long, value_name = "FILE")]
    pub assignment: Option<PathBuf>,

    #[arg(short, long, value_enum, default_value = "pretty")]
    pub format: OutputFormat,

    /// Show citations and suggestions in pretty output
    #[arg(long)]
    pub full: bool,

    /// Save a record of this evaluation to the history directory
    #[arg(long)]
    pub save: bool,
}

#[derive(Args, Debug, Clone)]
pub struct GradeArgs {
    /// Assignment JSON file, or - for stdin
    #[arg(short, long, value_name = "FILE")]
    pub assignment: PathBuf,

    #[command(flatten)]
    pub llm: LlmArgs,

    /// Attempts before giving up on an unusable LLM response
    #[arg(long, default_value_t = 3)]
    pub retries: usize,

    #[arg(short, long, value_enum, default_value = "pretty")]
    pub format: OutputFormat,

    /// Show citations and suggestions in pretty output
    #[arg(long)]
    pub full: bool,

    /// Save a record of this evaluation to the history directory
    #[arg(long)]
    pub save: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct LlmArgs {
    /// LLM provider: claude or opencode (overrides KARAKTER_LLM_PROVIDER)
    #[arg(long = "llm-provider")]
    pub provider: Option<String>,

    /// Model name (overrides KARAKTER_LLM_MODEL)
    #[arg(long = "llm-model")]
    pub model: Option<String>,

    /// Backend for opencode, e.g. ollama (overrides KARAKTER_OPENCODE_BACKEND)
    #[arg(long)]
    pub opencode_backend: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct QuestionArgs {
    /// Assignment JSON file with questionData, or - for stdin
    #[arg(short, long, value_name = "FILE")]
    pub assignment: PathBuf,

    #[arg(short, long, value_enum, default_value = "pretty")]
    pub format: OutputFormat,
}

#[derive(Args, Debug, Clone)]
pub struct ParseArgs {
    /// Raw feedback, e.g. 'Sprog: stavefejl [CITAT: "..."] OMSKRIV TIL: "..."'
    pub raw: String,
}

#[derive(Args, Debug, Clone)]
pub struct StatsArgs {
    #[arg(short, long, value_enum, default_value = "pretty")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Pretty,
    Json,
    Markdown,
    Compact,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_analyze_with_globals() {
        let cli = Cli::try_parse_from([
            "karakter",
            "-vv",
            "--seed",
            "5",
            "analyze",
            "--evaluation",
            "eval.json",
            "--format",
            "json",
            "--save",
        ])
        .unwrap();
        assert_eq!(cli.verbosity, 2);
        assert_eq!(cli.seed, Some(5));
        match cli.command {
            Command::Analyze(args) => {
                assert_eq!(args.evaluation, PathBuf::from("eval.json"));
                assert_eq!(args.format, OutputFormat::Json);
                assert!(args.save);
                assert!(args.assignment.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn parses_grade_llm_flags() {
        let cli = Cli::try_parse_from([
            "karakter",
            "grade",
            "-a",
            "opgave.json",
            "--llm-provider",
            "opencode",
            "--llm-model",
            "qwen3",
            "--retries",
            "5",
            "--no-synthesis",
        ])
        .unwrap();
        assert!(cli.no_synthesis);
        match cli.command {
            Command::Grade(args) => {
                assert_eq!(args.llm.provider.as_deref(), Some("opencode"));
                assert_eq!(args.llm.model.as_deref(), Some("qwen3"));
                assert_eq!(args.retries, 5);
                assert_eq!(args.format, OutputFormat::Pretty);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["karakter", "-q", "-v", "stats"]).is_err());
    }
}
