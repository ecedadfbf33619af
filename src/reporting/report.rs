//! Human-readable and JSON result reporting
//!
//! The CLI prints one `Result:` line per invocation; `--json` swaps in the
//! serialized report for pipeline consumers.

use std::path::PathBuf;

use anyhow::Result;
use serde::Serialize;

use crate::core::detector::Finding;
use crate::core::driver::SanitizeOutcome;

/// Outcome of a `check` invocation.
#[derive(Debug, Serialize)]
pub struct CheckReport {
    pub path: PathBuf,
    pub javascript_found: bool,
    /// Where JavaScript was first found, when it was
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finding: Option<Finding>,
    /// Whether the document could be opened at all; `false` means the
    /// negative result does not certify cleanliness
    pub checked: bool,
    /// The failure that prevented checking, when there was one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CheckReport {
    pub fn print_human(&self) {
        if self.javascript_found {
            println!("Result: JavaScript DETECTED in '{}'.", self.path.display());
            if let Some(finding) = &self.finding {
                println!("  {}", finding);
            }
        } else if !self.checked {
            match &self.error {
                Some(cause) => {
                    println!("Result: Cannot check '{}'. {}", self.path.display(), cause)
                }
                None => println!("Result: Cannot check '{}'.", self.path.display()),
            }
        } else {
            println!(
                "Result: No JavaScript detected (based on checks) in '{}'.",
                self.path.display()
            );
        }
    }
}

/// Outcome of a `remove` invocation.
#[derive(Debug, Serialize)]
pub struct RemoveReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub changed: bool,
    pub passes: usize,
    pub reached_pass_limit: bool,
    /// Post-removal verification of the written output
    pub verified_clean: bool,
}

impl RemoveReport {
    pub fn new(input: PathBuf, output: PathBuf, outcome: &SanitizeOutcome, verified_clean: bool) -> Self {
        Self {
            input,
            output,
            changed: outcome.changed,
            passes: outcome.passes,
            reached_pass_limit: outcome.reached_pass_limit,
            verified_clean,
        }
    }

    pub fn print_human(&self) {
        println!(
            "Result: Successfully processed '{}' and saved sanitized file to '{}'.",
            self.input.display(),
            self.output.display()
        );
        if self.verified_clean {
            println!(
                "Verification: Sanitized file '{}' appears clean.",
                self.output.display()
            );
        } else {
            println!(
                "Verification Warning: JavaScript may still be present in '{}'. Manual review recommended.",
                self.output.display()
            );
        }
    }
}

/// Serialize any report to pretty-printed JSON.
pub fn to_json<T: Serialize>(report: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}
