//! Output formatting for the CLI
//!
//! Every command reports through [`OutputFormat`] so `--json` switches the
//! whole surface at once instead of per call site.

/// Output format selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Human,
    Json,
}

impl OutputFormat {
    #[must_use]
    pub fn is_json(self) -> bool {
        self == OutputFormat::Json
    }

    /// Reports a completed step
    pub fn success(self, message: &str) {
        match self {
            OutputFormat::Human => println!("\u{2713} {message}"),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"ok": true, "message": message}));
            }
        }
    }

    /// Reports a failure to stderr
    pub fn error(self, message: &str) {
        match self {
            OutputFormat::Human => eprintln!("\u{2717} Error: {message}"),
            OutputFormat::Json => {
                eprintln!("{}", serde_json::json!({"ok": false, "error": message}));
            }
        }
    }

    /// Reports a non-fatal problem to stderr
    pub fn warn(self, message: &str) {
        match self {
            OutputFormat::Human => eprintln!("\u{26a0} Warning: {message}"),
            OutputFormat::Json => {
                eprintln!(
                    "{}",
                    serde_json::json!({"level": "warning", "message": message})
                );
            }
        }
    }

    /// Indented detail line; silent in JSON mode
    pub fn detail(self, message: &str) {
        if self == OutputFormat::Human {
            println!("  {message}");
        }
    }

    /// Structured result document; silent in human mode
    pub fn document(self, value: &serde_json::Value) {
        if self == OutputFormat::Json {
            println!(
                "{}",
                serde_json::to_string_pretty(value).unwrap_or_default()
            );
        }
    }
}
