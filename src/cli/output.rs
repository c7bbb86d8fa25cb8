//! Output formatting module for cubecobra-infra
//!
//! Provides colored terminal output for plans, outputs and listings.

use colored::Colorize;
use cubecobra_infra::graph::{NodeOrigin, RemovalPolicy, ResourceNode};
use std::io::{self, Write};

/// What the apply engine will do with a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanAction {
    /// Managed node, created on first apply
    Create,
    /// Existing resource, only looked up
    Import,
}

impl PlanAction {
    /// Action for a node
    pub fn for_node(node: &ResourceNode) -> Self {
        match node.origin {
            NodeOrigin::Managed => PlanAction::Create,
            NodeOrigin::Imported => PlanAction::Import,
        }
    }

    /// Get the colored string representation
    pub fn colored_string(&self) -> String {
        match self {
            PlanAction::Create => "create".green().to_string(),
            PlanAction::Import => "import".cyan().to_string(),
        }
    }

    /// Get the plain string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanAction::Create => "create",
            PlanAction::Import => "import",
        }
    }
}

/// Output formatter for terminal output
pub struct OutputFormatter {
    /// Use colored output
    use_color: bool,
    /// Verbosity level
    verbosity: u8,
}

impl OutputFormatter {
    /// Create a new output formatter
    pub fn new(use_color: bool, verbosity: u8) -> Self {
        // Respect NO_COLOR environment variable
        let use_color = use_color && std::env::var("NO_COLOR").is_err();

        Self {
            use_color,
            verbosity,
        }
    }

    /// Print a banner/header
    pub fn banner(&self, title: &str) {
        let line = "=".repeat(title.len() + 4);
        if self.use_color {
            println!("\n{}", line.bright_blue());
            println!("{}", format!("  {}  ", title).bright_blue().bold());
            println!("{}\n", line.bright_blue());
        } else {
            println!("\n{}", line);
            println!("  {}  ", title);
            println!("{}\n", line);
        }
    }

    /// Print a section header
    pub fn section(&self, title: &str) {
        if self.use_color {
            println!("\n{}", title.cyan().bold());
            println!("{}", "-".repeat(title.len()).cyan());
        } else {
            println!("\n{}", title);
            println!("{}", "-".repeat(title.len()));
        }
    }

    /// Print one step of a creation plan
    pub fn plan_entry(&self, step: usize, node: &ResourceNode) {
        let action = PlanAction::for_node(node);
        let retain = node.removal_policy == RemovalPolicy::Retain;

        if self.use_color {
            let marker = if retain {
                format!(" {}", "[retain]".yellow())
            } else {
                String::new()
            };
            println!(
                "{:>4}. {:<8} {} {}{}",
                step,
                action.colored_string(),
                node.id.bold(),
                format!("({})", node.kind).bright_black(),
                marker
            );
        } else {
            let marker = if retain { " [retain]" } else { "" };
            println!(
                "{:>4}. {:<8} {} ({}){}",
                step,
                action.as_str(),
                node.id,
                node.kind,
                marker
            );
        }
    }

    /// Print an error message
    pub fn error(&self, message: &str) {
        if self.use_color {
            eprintln!("{} {}", "ERROR:".red().bold(), message);
        } else {
            eprintln!("ERROR: {}", message);
        }
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if self.use_color {
            eprintln!("{} {}", "WARNING:".yellow().bold(), message);
        } else {
            eprintln!("WARNING: {}", message);
        }
    }

    /// Print an info message (respects verbosity)
    pub fn info(&self, message: &str) {
        if self.verbosity < 1 {
            return;
        }

        if self.use_color {
            eprintln!("{} {}", "INFO:".blue(), message);
        } else {
            eprintln!("INFO: {}", message);
        }
    }

    /// Print plan output (always shows, bypasses verbosity)
    pub fn plan(&self, message: &str) {
        println!("{}", message);
    }

    /// Print a table
    pub fn table(&self, headers: &[&str], rows: &[Vec<String>]) {
        // Calculate column widths
        let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
        for row in rows {
            for (i, cell) in row.iter().enumerate() {
                if i < widths.len() {
                    widths[i] = widths[i].max(cell.len());
                }
            }
        }

        let mut header_line = String::new();
        for (i, h) in headers.iter().enumerate() {
            if i > 0 {
                header_line.push_str(" | ");
            }
            header_line.push_str(&format!("{:width$}", h, width = widths[i]));
        }

        if self.use_color {
            println!("{}", header_line.bright_white().bold());
        } else {
            println!("{}", header_line);
        }

        let sep: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        if self.use_color {
            println!("{}", sep.join("-+-").bright_black());
        } else {
            println!("{}", sep.join("-+-"));
        }

        for row in rows {
            let mut row_line = String::new();
            for (i, cell) in row.iter().enumerate() {
                if i > 0 {
                    row_line.push_str(" | ");
                }
                if i < widths.len() {
                    row_line.push_str(&format!("{:width$}", cell, width = widths[i]));
                }
            }
            println!("{}", row_line.trim_end());
        }
    }

    /// Flush stdout
    pub fn flush(&self) {
        let _ = io::stdout().flush();
    }
}
