mod commands;
mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_LOG_FILTER: &str = "cat_alerts_core=info,cat_alerts=info";

#[derive(Parser)]
#[command(
    name = "cat-alerts",
    version,
    about = "Enrichment and classification of workplace accident reports (CAT)"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Enrich a batch of accident records (JSON array or XLSX extract)
    Enrich {
        /// Path to a .json or .xlsx batch
        input_file: PathBuf,

        /// Custom risk-factor rule file (YAML or JSON); defaults to the built-in preset
        #[arg(short, long, value_name = "FILE", env = "CAT_ALERTS_RULES")]
        rules: Option<PathBuf>,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,

        /// Write the enriched batch to a JSON file
        #[arg(short = 'O', long = "out", value_name = "FILE")]
        out: Option<PathBuf>,

        /// Worksheet to read from an XLSX batch (default: first sheet)
        #[arg(long, value_name = "NAME")]
        sheet: Option<String>,
    },
    /// Inspect and check risk-factor rule sets
    Rules {
        #[command(subcommand)]
        action: RulesAction,
    },
    /// Format a registration number for display
    FormatId {
        /// Identifier type: cnpj, cpf, caepf, cno (or the extract's 1-4)
        id_type: String,

        /// Digits of the identifier
        digits: String,
    },
}

#[derive(Subcommand)]
enum RulesAction {
    /// Show the compiled lookup tables of a rule set
    Show {
        /// Custom rule file; defaults to the built-in preset
        #[arg(short, long, value_name = "FILE", env = "CAT_ALERTS_RULES")]
        rules: Option<PathBuf>,
    },
    /// Validate and compile a custom rule file
    Validate {
        /// Path to a YAML or JSON rule file
        file: PathBuf,
    },
    /// Expand a diagnosis-code range such as S680-S689
    Expand {
        /// Range written as START-END
        range: String,
    },
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    let result = match cli.command {
        Commands::Enrich {
            input_file,
            rules,
            output,
            out,
            sheet,
        } => commands::enrich::run(input_file, rules, &output, out, sheet),
        Commands::Rules { action } => match action {
            RulesAction::Show { rules } => commands::rules::show(rules.as_deref()),
            RulesAction::Validate { file } => commands::rules::validate(&file),
            RulesAction::Expand { range } => commands::rules::expand(&range),
        },
        Commands::FormatId { id_type, digits } => commands::format_id::run(&id_type, &digits),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
