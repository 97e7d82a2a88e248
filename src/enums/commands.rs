use clap::Subcommand;
use crate::enums::export_format::ExportFormat;

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Write a sample configuration file
    Init,
    /// Check the configuration for mistakes
    ValidateConfig,
    /// Show Engine health and connection details
    Status,
    /// List pending approval requests
    Queue {
        #[clap(short, long)]
        priority: Option<String>,
        #[clap(short, long)]
        filter: Option<String>,
    },
    /// Approve one pending request
    Approve {
        id: String,
    },
    /// Reject one pending request
    Reject {
        id: String,
        #[clap(short, long)]
        reason: Option<String>,
    },
    /// Approve every pending request
    ApproveAll {
        #[clap(short, long)]
        yes: bool,
    },
    /// Reject every pending request
    RejectAll {
        #[clap(short, long)]
        yes: bool,
        #[clap(short, long)]
        reason: Option<String>,
    },
    /// Show resolved requests grouped by day
    History {
        #[clap(short, long)]
        status: Option<String>,
        #[clap(short, long, default_value_t = 1)]
        pages: u32,
    },
    /// Search resolved requests
    Search {
        query: String,
    },
    /// Export loaded history
    Export {
        #[clap(short, long, value_enum, default_value_t = ExportFormat::Json)]
        format: ExportFormat,
        #[clap(short, long)]
        output: Option<String>,
    },
    /// Show the recorded history of one line
    LineHistory {
        file: String,
        line: usize,
    },
    /// Validate a file against the Engine
    ValidateFile {
        file: String,
    },
    /// Stay connected and stream notifications until Ctrl-C
    Watch,
}
