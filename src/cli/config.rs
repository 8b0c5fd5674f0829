// config.rs - Configuration file support

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{Result, ScanError};

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    // Input/Output
    pub alignment: Option<String>,
    pub query: Option<String>,
    pub lineages: Option<Vec<String>>,
    pub lineage_file: Option<String>,
    pub output: Option<String>,

    // Scan settings
    pub gap: Option<String>,
    pub method: Option<String>,
    pub window: Option<usize>,
    pub step: Option<usize>,
    pub max_region: Option<usize>,
    pub cp: Option<f64>,
    pub merge_policy: Option<String>,

    // Breakpoint scan
    pub breakpoint: Option<bool>,
    pub breakwin: Option<usize>,

    // Presentation
    pub y_start: Option<f64>,

    // Performance
    pub threads: Option<usize>,
}

impl Config {
    /// Create a new empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ScanError::io(path, e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| ScanError::parse(path.display().to_string(), e.to_string()))?;

        println!("📄 Loaded configuration from: {}", path.display());
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self)
            .map_err(|e| ScanError::config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, content).map_err(|e| ScanError::io(path, e))?;

        println!("📄 Saved configuration to: {}", path.display());
        Ok(())
    }

    /// Generate a sample configuration file with comments
    pub fn generate_sample() -> String {
        r#"# wicscan.toml - Configuration file for wicscan
# Command line arguments will override these settings

# =============================================================================
# INPUT/OUTPUT
# =============================================================================

# Aligned FASTA file with the query and every lineage sequence
alignment = "/path/to/alignment.fasta"

# Marker identifying the query sequence(s)
query = "XE_"

# Lineage markers, in reporting order (or use lineage_file)
lineages = ["BA.1", "BA.2"]
# lineage_file = "lineages.txt"

# Output directory (default: result_<run id> next to the alignment)
# output = "results"

# =============================================================================
# SCAN SETTINGS
# =============================================================================

# Keep gaps as a fifth symbol: y (retain) or n (discard gap sites)
gap = "n"

# Site mode: p (polymorphic sites only) or a (all sites)
method = "p"

# Sliding window size and step, in sites
window = 100
step = 20

# Maximum length of a recombinant region
max_region = 1000

# Confidence proportion: minimum WIC share of the maximum entropy, in (0, 1]
cp = 0.9

# After a region is emitted: terminal (one region per lineage) or continue
merge_policy = "terminal"

# =============================================================================
# BREAKPOINT SCAN (polymorphic-site mode only)
# =============================================================================

breakpoint = false
breakwin = 200

# =============================================================================
# PRESENTATION / PERFORMANCE
# =============================================================================

# y-axis start recorded for plotting
y_start = 0.0

# Number of threads (omit for auto-detection)
# threads = 8
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_config_parses() {
        let config: Config = toml::from_str(&Config::generate_sample()).unwrap();
        assert_eq!(config.query.as_deref(), Some("XE_"));
        assert_eq!(config.lineages, Some(vec!["BA.1".to_string(), "BA.2".to_string()]));
        assert_eq!(config.window, Some(100));
        assert_eq!(config.cp, Some(0.9));
        assert_eq!(config.breakpoint, Some(false));
        assert!(config.threads.is_none());
    }

    #[test]
    fn test_config_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.toml");
        let config = Config {
            query: Some("Q".to_string()),
            step: Some(10),
            ..Default::default()
        };
        config.to_file(&path).unwrap();
        assert_eq!(Config::from_file(&path).unwrap(), config);
    }

    #[test]
    fn test_malformed_config_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "window = \"wide\"").unwrap();
        assert!(matches!(Config::from_file(&path), Err(ScanError::Parse { .. })));
    }
}
