// merge.rs - Merge configuration file with CLI arguments

use crate::cli::args::{
    DEFAULT_BREAKWIN, DEFAULT_CP, DEFAULT_GAP, DEFAULT_MAX_REGION, DEFAULT_MERGE_POLICY,
    DEFAULT_METHOD, DEFAULT_STEP, DEFAULT_WINDOW,
};
use crate::cli::{Args, Config};
use crate::error::Result;

impl Args {
    /// Merge with configuration from file
    /// CLI arguments take precedence over config file values
    pub fn merge_with_config(mut self, config: Config) -> Self {
        // Input/Output
        if self.alignment.is_none() {
            self.alignment = config.alignment;
        }
        if self.query.is_none() {
            self.query = config.query;
        }
        // Lineage markers come from one source; any CLI source replaces both file keys
        if self.lineages.is_none() && self.lineage_file.is_none() {
            self.lineages = config.lineages.map(|markers| markers.join(","));
            self.lineage_file = config.lineage_file;
        }
        if self.output.is_none() {
            self.output = config.output;
        }

        // Scan settings (only override defaults, not explicit CLI values)
        if let Some(gap) = config.gap {
            if self.gap == DEFAULT_GAP {
                self.gap = gap;
            }
        }
        if let Some(method) = config.method {
            if self.method == DEFAULT_METHOD {
                self.method = method;
            }
        }
        if let Some(window) = config.window {
            if self.window == DEFAULT_WINDOW {
                self.window = window;
            }
        }
        if let Some(step) = config.step {
            if self.step == DEFAULT_STEP {
                self.step = step;
            }
        }
        if let Some(max_region) = config.max_region {
            if self.max_region == DEFAULT_MAX_REGION {
                self.max_region = max_region;
            }
        }
        if let Some(cp) = config.cp {
            if self.cp == DEFAULT_CP {
                self.cp = cp;
            }
        }
        if let Some(policy) = config.merge_policy {
            if self.merge_policy == DEFAULT_MERGE_POLICY {
                self.merge_policy = policy;
            }
        }

        // Breakpoint scan (CLI switch wins when set)
        if !self.breakpoint && config.breakpoint.unwrap_or(false) {
            self.breakpoint = true;
        }
        if let Some(breakwin) = config.breakwin {
            if self.breakwin == DEFAULT_BREAKWIN {
                self.breakwin = breakwin;
            }
        }

        // Presentation / performance
        if let Some(y_start) = config.y_start {
            if self.y_start == 0.0 {
                self.y_start = y_start;
            }
        }
        if self.threads.is_none() {
            self.threads = config.threads;
        }

        self
    }

    /// Load configuration and merge with CLI args
    pub fn with_config_file(self, config_path: &str) -> Result<Self> {
        let config = Config::from_file(config_path)?;
        Ok(self.merge_with_config(config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argh::FromArgs;

    fn parse(args: &[&str]) -> Args {
        Args::from_args(&["wicscan"], args).unwrap()
    }

    #[test]
    fn test_config_fills_missing_values() {
        let config = Config {
            alignment: Some("aln.fasta".to_string()),
            lineages: Some(vec!["BA.1".to_string(), "BA.2".to_string()]),
            window: Some(50),
            breakpoint: Some(true),
            ..Default::default()
        };
        let args = parse(&["--query", "XE"]).merge_with_config(config);
        assert_eq!(args.alignment.as_deref(), Some("aln.fasta"));
        assert_eq!(args.lineages.as_deref(), Some("BA.1,BA.2"));
        assert_eq!(args.query.as_deref(), Some("XE"));
        assert_eq!(args.window, 50);
        assert!(args.breakpoint);
    }

    #[test]
    fn test_cli_lineage_source_replaces_file_source() {
        let config = Config {
            lineages: Some(vec!["BA.2".to_string()]),
            lineage_file: Some("from_config.txt".to_string()),
            ..Default::default()
        };
        let args = parse(&["--lineage-file", "l.txt"]).merge_with_config(config.clone());
        assert_eq!(args.lineage_file.as_deref(), Some("l.txt"));
        assert!(args.lineages.is_none());

        let args = parse(&["-l", "BA.1"]).merge_with_config(config);
        assert_eq!(args.lineages.as_deref(), Some("BA.1"));
        assert!(args.lineage_file.is_none());
    }

    #[test]
    fn test_cli_values_take_precedence() {
        let config = Config {
            query: Some("FROM_FILE".to_string()),
            window: Some(50),
            gap: Some("y".to_string()),
            ..Default::default()
        };
        let args = parse(&["--query", "XE", "--window", "80", "--gap", "y"]).merge_with_config(config);
        assert_eq!(args.query.as_deref(), Some("XE"));
        assert_eq!(args.window, 80);
        assert_eq!(args.gap, "y");
    }
}
