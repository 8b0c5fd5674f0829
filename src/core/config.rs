// config.rs - Scan configuration and operating modes

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{Result, ScanError};

/// How gap symbols are handled before scoring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapHandling {
    /// Gaps are a fifth symbol; maximum entropy is log2(5)
    Retain,
    /// Columns containing a gap in any row are removed; maximum entropy is 2
    Discard,
}

impl GapHandling {
    /// Upper bound of the information content of one column
    pub fn max_entropy(&self) -> f64 {
        match self {
            GapHandling::Retain => 5f64.log2(),
            GapHandling::Discard => 2.0,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            GapHandling::Retain => "gaps retained as a fifth symbol",
            GapHandling::Discard => "gap sites discarded",
        }
    }
}

impl FromStr for GapHandling {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "y" | "yes" | "retain" => Ok(GapHandling::Retain),
            "n" | "no" | "discard" => Ok(GapHandling::Discard),
            _ => Err(ScanError::config(format!(
                "Invalid gap handling: {}. Use: y (retain), n (discard)",
                s
            ))),
        }
    }
}

/// Which alignment columns take part in the scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SiteMode {
    PolymorphicOnly,
    AllSites,
}

impl SiteMode {
    pub fn description(&self) -> &str {
        match self {
            SiteMode::PolymorphicOnly => "polymorphic sites only",
            SiteMode::AllSites => "all sites",
        }
    }
}

impl FromStr for SiteMode {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "p" | "polymorphic" | "polymorphic_only" => Ok(SiteMode::PolymorphicOnly),
            "a" | "all" | "all_sites" => Ok(SiteMode::AllSites),
            _ => Err(ScanError::config(format!(
                "Invalid site mode: {}. Use: p (polymorphic sites), a (all sites)",
                s
            ))),
        }
    }
}

/// What the region merger does after emitting a maximal extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergePolicy {
    /// The maximal extension ends the lineage's scan (one terminal region)
    Terminal,
    /// Keep scanning from the first candidate beyond the emitted region
    Continue,
}

impl FromStr for MergePolicy {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "terminal" => Ok(MergePolicy::Terminal),
            "continue" => Ok(MergePolicy::Continue),
            _ => Err(ScanError::config(format!(
                "Invalid merge policy: {}. Use: terminal, continue",
                s
            ))),
        }
    }
}

/// Options recognised by the scan engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanConfig {
    pub gap_handling: GapHandling,
    pub site_mode: SiteMode,
    pub window_size: usize,
    pub step_size: usize,
    pub max_fragment_length: usize,
    /// Minimum WIC share of the maximum entropy (cp)
    pub confidence_threshold: f64,
    /// Only honoured in polymorphic-only mode
    pub run_breakpoint_scan: bool,
    pub breakpoint_window_size: usize,
    pub merge_policy: MergePolicy,
    /// Presentation only
    pub y_axis_start: f64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            gap_handling: GapHandling::Discard,
            site_mode: SiteMode::PolymorphicOnly,
            window_size: 100,
            step_size: 20,
            max_fragment_length: 1000,
            confidence_threshold: 0.9,
            run_breakpoint_scan: false,
            breakpoint_window_size: 200,
            merge_policy: MergePolicy::Terminal,
            y_axis_start: 0.0,
        }
    }
}

impl ScanConfig {
    pub fn validate(&self) -> Result<()> {
        if self.window_size == 0 {
            return Err(ScanError::config("window size must be positive"));
        }
        if self.step_size == 0 {
            return Err(ScanError::config("step size must be positive"));
        }
        if self.step_size > self.window_size {
            return Err(ScanError::config(format!(
                "step size ({}) must not exceed window size ({})",
                self.step_size, self.window_size
            )));
        }
        if self.max_fragment_length == 0 {
            return Err(ScanError::config("maximum fragment length must be positive"));
        }
        if !(self.confidence_threshold > 0.0 && self.confidence_threshold <= 1.0) {
            return Err(ScanError::config(format!(
                "confidence threshold must be in (0, 1], got {}",
                self.confidence_threshold
            )));
        }
        if self.breakpoint_window_size == 0 {
            return Err(ScanError::config("breakpoint window size must be positive"));
        }
        Ok(())
    }

    pub fn max_entropy(&self) -> f64 {
        self.gap_handling.max_entropy()
    }

    /// Breakpoint scanning only makes sense over polymorphic sites
    pub fn breakpoint_scan_enabled(&self) -> bool {
        self.run_breakpoint_scan && self.site_mode == SiteMode::PolymorphicOnly
    }
}
