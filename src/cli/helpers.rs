//! Shared helper functions for CLI commands

use miette::Result;

use crate::cli::GlobalOpts;
use crate::core::{Config, Project};

/// Open the project named by `--project`, or the one containing the current directory
pub fn open_project(global: &GlobalOpts) -> Result<(Project, Config)> {
    let project =
        Project::open(global.project.as_deref()).map_err(|e| miette::miette!("{}", e))?;
    let config = Config::load_for(Some(&project));
    Ok((project, config))
}

/// Config for commands that also take explicit paths, where no project is required
pub fn load_config(global: &GlobalOpts) -> Config {
    let project = Project::open(global.project.as_deref()).ok();
    Config::load_for(project.as_ref())
}

/// Truncate a string to max_len characters, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Make a value safe for one TSV cell
pub fn escape_tsv(s: &str) -> String {
    s.replace(['\t', '\n', '\r'], " ")
}

/// Split comma-separated values from repeated flags into one trimmed list
pub fn split_csv_args(values: &[String]) -> Vec<String> {
    values
        .iter()
        .flat_map(|v| v.split(','))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("hello", 10), "hello");
        assert_eq!(truncate_str("hello world", 8), "hello...");
        assert_eq!(truncate_str("hi", 2), "hi");
        assert_eq!(truncate_str("림버스 컴퍼니", 5), "림버...");
    }

    #[test]
    fn test_escape_tsv() {
        assert_eq!(escape_tsv("a\tb\nc"), "a b c");
    }

    #[test]
    fn test_split_csv_args() {
        let args = vec!["Sinking, Slash".to_string(), " ,Rupture".to_string()];
        assert_eq!(split_csv_args(&args), vec!["Sinking", "Slash", "Rupture"]);
    }
}
