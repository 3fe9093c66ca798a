use crate::stack::{PatchStatus, StackLine};
use console::style;
use std::fmt::Display;

/// Centralized output formatting utilities for consistent CLI presentation
pub struct Output;

impl Output {
    /// Print a success message with checkmark
    pub fn success<T: Display>(message: T) {
        println!("{} {}", style("✓").green(), message);
    }

    /// Print a warning message with warning emoji
    pub fn warning<T: Display>(message: T) {
        println!("{} {}", style("⚠").yellow(), message);
    }

    /// Print an info message with info emoji
    pub fn info<T: Display>(message: T) {
        println!("{} {}", style("ℹ").cyan(), message);
    }

    /// Print a sub-item with arrow prefix
    pub fn sub_item<T: Display>(message: T) {
        println!("  {} {}", style("→").dim(), message);
    }

    /// Print a tip/suggestion
    pub fn tip<T: Display>(message: T) {
        eprintln!("{} {}", style("TIP:").cyan(), style(message).dim());
    }

    /// Print one `show` line
    pub fn stack_line(line: &StackLine, show_counts: bool) {
        let marker = if line.is_current {
            style("*").green().bold().to_string()
        } else {
            " ".to_string()
        };

        let name = if line.is_current {
            style(&line.name).bold().to_string()
        } else if line.missing {
            style(&line.name).red().dim().to_string()
        } else {
            line.name.clone()
        };

        let mut details = Vec::new();
        if line.is_root {
            details.push(style("root").dim().to_string());
        }
        if line.missing {
            details.push(style("branch missing").red().to_string());
        }
        if let Some(status) = line.status {
            details.push(Self::status_label(status));
        }
        if show_counts {
            if let Some(count) = line.commits {
                let plural = if count == 1 { "" } else { "s" };
                details.push(style(format!("{count} commit{plural}")).dim().to_string());
            }
        }

        if details.is_empty() {
            println!("{marker} {name}");
        } else {
            println!("{marker} {name} ({})", details.join(", "));
        }
    }

    fn status_label(status: PatchStatus) -> String {
        match status {
            PatchStatus::UpToDate => style(status).green().to_string(),
            PatchStatus::Ahead => style(status).cyan().to_string(),
            PatchStatus::Diverged => style(status).yellow().to_string(),
        }
    }
}
