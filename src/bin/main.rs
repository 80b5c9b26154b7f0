use clap::{Parser, Subcommand};
use edit_suggest::buffer::TextBuffer;
use edit_suggest::config::{self, Settings};
use edit_suggest::edit::EditId;
use edit_suggest::{ReviewSession, classify_intent, extract_edits};
use similar::TextDiff;
use std::path::{Path, PathBuf};

/// Review AI-suggested line edits against a document
#[derive(Parser)]
#[command(name = "edit-suggest")]
#[command(version)]
#[command(about = "Extract, gate and apply AI-suggested line edits")]
struct Cli {
    /// Settings file (default: the user config, if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the edits proposed in an assistant response as JSON
    Extract {
        /// File holding the raw assistant output
        response: PathBuf,
    },
    /// Print the edit permissions inferred from a request as JSON
    Classify {
        /// The user's request text
        request: String,
    },
    /// Accept every permitted suggestion and print the resulting document
    Review {
        /// Document the suggestions target
        #[arg(long)]
        document: PathBuf,

        /// File holding the raw assistant output
        #[arg(long)]
        response: PathBuf,

        /// The user's request text
        #[arg(long, default_value = "")]
        request: String,

        /// Print a unified diff instead of the updated document
        #[arg(long)]
        dry_run: bool,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let settings = load_settings(cli.config.as_deref());

    match cli.command {
        Commands::Extract { response } => {
            let output = read_or_exit(&response);
            let edits = extract_edits(&output, &settings.extraction);
            print_json(&edits);
        }
        Commands::Classify { request } => {
            print_json(&classify_intent(&request));
        }
        Commands::Review {
            document,
            response,
            request,
            dry_run,
        } => {
            let original = read_or_exit(&document);
            let output = read_or_exit(&response);
            let updated = review(settings, &original, &output, &request);

            if dry_run {
                let name = document.display().to_string();
                let diff = TextDiff::from_lines(&original, &updated);
                print!("{}", diff.unified_diff().header(&name, &name));
            } else {
                print!("{}", updated);
            }
        }
    }
}

/// Accept every suggestion batch by batch and return the final text
fn review(settings: Settings, original: &str, output: &str, request: &str) -> String {
    let mut buffer = TextBuffer::new(original);
    let mut session = ReviewSession::new(settings);

    let proposal = session.propose(output, request, &buffer);
    for violation in &proposal.violations {
        eprintln!("Rejected: {}", violation);
    }

    while !session.is_resolved() {
        let ids: Vec<EditId> = session
            .visible_batch()
            .iter()
            .filter(|edit| edit.is_pending())
            .map(|edit| edit.id)
            .collect();
        if ids.is_empty() {
            break;
        }
        for id in ids {
            // An earlier accept may have dropped this edit or advanced the batch
            if !session.get(id).is_some_and(|edit| edit.is_pending()) {
                continue;
            }
            if let Err(e) = session.accept(id, &mut buffer) {
                eprintln!("Warning: {}", e);
            }
        }
    }

    for event in session.take_events() {
        match serde_json::to_string(&event) {
            Ok(line) => eprintln!("{}", line),
            Err(e) => eprintln!("Warning: could not render event: {}", e),
        }
    }
    buffer.text()
}

fn load_settings(path: Option<&Path>) -> Settings {
    let loaded = match path {
        Some(path) => config::load_settings(path).map(Some),
        None => config::load_user_config(),
    };
    match loaded {
        Ok(settings) => settings.unwrap_or_default(),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn read_or_exit(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error: could not read {}: {}", path.display(), e);
        std::process::exit(1);
    })
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
