//! Output formatting and spinners for the CLI

use indicatif::{ProgressBar, ProgressStyle};

use crate::{Error, Result, policy::Policy, terrain::TerrainGrid};

/// Create a spinner for work without a known length
pub fn create_spinner(message: &str) -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .map_err(|e| Error::ProgressBarTemplate {
                message: e.to_string(),
            })?,
    );
    pb.set_message(message.to_string());
    Ok(pb)
}

/// Print a section header
pub fn print_section(title: &str) {
    println!("\n{}", "=".repeat(60));
    println!("{title}");
    println!("{}", "=".repeat(60));
}

/// Print a subsection header
pub fn print_subsection(title: &str) {
    println!("\n{title}");
    println!("{}", "-".repeat(40));
}

/// Format a number with thousands separators
pub fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i.is_multiple_of(3) {
            result.insert(0, ',');
        }
        result.insert(0, c);
    }
    result
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:20} {}", format!("{}:", key), value);
}

/// Height map as right-aligned rows, one line per grid row
pub fn format_heights(grid: &TerrainGrid) -> String {
    let width = grid.summary().max_height.to_string().len();
    grid.iter_rows()
        .map(|row| {
            row.iter()
                .map(|cell| format!("{:>width$}", cell.height))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Print a policy as a grid of arrows
pub fn print_policy_grid(policy: &Policy) -> Result<()> {
    for line in policy.render_grid()?.lines() {
        println!("  {line}");
    }
    Ok(())
}
