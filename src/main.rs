use clap::{Parser, Subcommand};
use std::collections::HashMap;
use std::path::PathBuf;

const EXIT_SUCCESS: i32 = 0;
const EXIT_VALIDATION: i32 = 1;
const EXIT_NETWORK: i32 = 2;
const EXIT_CONFIG: i32 = 4;

#[derive(Subcommand, Debug)]
enum Commands {
    /// Score a YAML answers file without the interactive questionnaire
    Submit {
        /// Path to a YAML file mapping question ids to answers
        #[arg(short, long)]
        answers: PathBuf,
    },
    /// Print the question catalog (the ids are the answers-file keys)
    Questions,
}

#[derive(Parser, Debug)]
#[command(name = "stemfit")]
#[command(about = "Self-discipline questionnaire with STEM-fit prediction", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/stemfit/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() {
    // Install rustls crypto provider (required for rustls 0.23+)
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    let cli = Cli::parse();

    // Load config
    let config_path = cli.config.map(PathBuf::from);
    let config = match stemfit::config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    if cli.verbose {
        eprintln!("Scoring endpoint: {}", config.endpoint);
    }

    match cli.command {
        None => {
            // Interactive questionnaire
            let feedback_path = stemfit::feedback::get_feedback_path();
            let feedback_flag = match stemfit::feedback::load_feedback_flag(&feedback_path) {
                Ok(flag) => flag,
                Err(e) => {
                    // A corrupt flag file never blocks the questionnaire
                    eprintln!("Warning: {}", e);
                    stemfit::feedback::FeedbackFlag::new()
                }
            };

            let client = match stemfit::scoring::HttpScoringClient::new(&config) {
                Ok(c) => c,
                Err(e) => {
                    eprintln!("Failed to create scoring client: {}", e);
                    std::process::exit(EXIT_NETWORK);
                }
            };

            let app = stemfit::tui::App::new(config, feedback_flag, feedback_path);
            if let Err(e) = stemfit::tui::run_tui(app, client).await {
                eprintln!("TUI error: {}", e);
                std::process::exit(EXIT_NETWORK);
            }
        }
        Some(Commands::Questions) => {
            let use_colors = stemfit::output::should_use_colors();
            println!("{}", stemfit::output::format_questions(use_colors));
        }
        Some(Commands::Submit { answers }) => {
            let code = run_submit(&answers, &config, cli.verbose).await;
            std::process::exit(code);
        }
    }

    std::process::exit(EXIT_SUCCESS);
}

/// Non-interactive path: read answers from a YAML file, validate them all
/// at once, submit, and print the normalized result.
async fn run_submit(
    answers_path: &std::path::Path,
    config: &stemfit::config::Config,
    verbose: bool,
) -> i32 {
    let content = match std::fs::read_to_string(answers_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to read {}: {}", answers_path.display(), e);
            return EXIT_CONFIG;
        }
    };

    let raw_answers: HashMap<String, serde_json::Value> = match serde_saphyr::from_str(&content) {
        Ok(map) => map,
        Err(e) => {
            eprintln!("Invalid YAML in {}: {}", answers_path.display(), e);
            return EXIT_CONFIG;
        }
    };

    // Collect every problem before giving up, not just the first.
    let mut errors = Vec::new();
    let mut answer_map = stemfit::wizard::AnswerMap::new();

    for (key, value) in &raw_answers {
        match stemfit::registry::find(key) {
            Some(question) => {
                let raw = yaml_answer_text(value);
                answer_map.insert(question.id.to_string(), question.coerce(&raw));
            }
            None => errors.push(format!("{}: unknown question id", key)),
        }
    }

    for question in stemfit::registry::questions() {
        match answer_map.get(question.id) {
            Some(answer) => {
                if let Err(reason) = question.check(answer) {
                    errors.push(format!("{}: {}", question.id, reason));
                }
            }
            None => errors.push(format!("{}: missing answer", question.id)),
        }
    }

    if !errors.is_empty() {
        eprintln!("Answer file errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        return EXIT_VALIDATION;
    }

    let request = stemfit::payload::build_request(&answer_map);
    if verbose {
        eprintln!(
            "Request: {}",
            serde_json::Value::Object(request.clone())
        );
    }

    let client = match stemfit::scoring::HttpScoringClient::new(config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to create scoring client: {}", e);
            return EXIT_NETWORK;
        }
    };

    use stemfit::scoring::ScoringClient;
    let raw = match client.submit(request).await {
        Ok(raw) => raw,
        Err(failure) => {
            eprintln!("{}", failure);
            return EXIT_NETWORK;
        }
    };

    let result = stemfit::scoring::normalize(&raw);
    let use_colors = stemfit::output::should_use_colors();
    println!("{}", stemfit::output::format_result(&result, use_colors));

    EXIT_SUCCESS
}

/// Answers files carry strings and numbers; booleans map onto the Yes/No
/// options so unquoted YAML literals still work.
fn yaml_answer_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Bool(true) => "Yes".to_string(),
        serde_json::Value::Bool(false) => "No".to_string(),
        other => other.to_string(),
    }
}
