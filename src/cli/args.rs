// args.rs - Command line arguments definition

use argh::FromArgs;

/// Defaults shared by the argument parser and the config-file merge
pub const DEFAULT_GAP: &str = "n";
pub const DEFAULT_METHOD: &str = "p";
pub const DEFAULT_WINDOW: usize = 100;
pub const DEFAULT_STEP: usize = 20;
pub const DEFAULT_MAX_REGION: usize = 1000;
pub const DEFAULT_CP: f64 = 0.9;
pub const DEFAULT_BREAKWIN: usize = 200;
pub const DEFAULT_MERGE_POLICY: &str = "terminal";

#[derive(FromArgs)]
/// wicscan - Recombination scanner based on weighted information content
pub struct Args {
    /// aligned FASTA file containing the query and all lineage sequences
    #[argh(option, short = 'a')]
    pub alignment: Option<String>,

    /// marker identifying the query sequence(s) by substring of the identifier
    #[argh(option, short = 'q')]
    pub query: Option<String>,

    /// comma-separated lineage markers, in reporting order
    #[argh(option, short = 'l')]
    pub lineages: Option<String>,

    /// file listing lineage markers, one per line
    #[argh(option)]
    pub lineage_file: Option<String>,

    /// keep gaps as a fifth symbol: y (retain) or n (discard gap sites) (default: n)
    #[argh(option, short = 'g', default = "String::from(DEFAULT_GAP)")]
    pub gap: String,

    /// site mode: p (polymorphic sites only) or a (all sites) (default: p)
    #[argh(option, short = 'm', default = "String::from(DEFAULT_METHOD)")]
    pub method: String,

    /// sliding window size in sites (default: 100)
    #[argh(option, short = 'w', default = "DEFAULT_WINDOW")]
    pub window: usize,

    /// sliding window step in sites (default: 20)
    #[argh(option, short = 's', default = "DEFAULT_STEP")]
    pub step: usize,

    /// maximum length of a recombinant region (default: 1000)
    #[argh(option, default = "DEFAULT_MAX_REGION")]
    pub max_region: usize,

    /// confidence proportion: minimum WIC share of the maximum entropy (default: 0.9)
    #[argh(option, default = "DEFAULT_CP")]
    pub cp: f64,

    /// run the breakpoint scan (polymorphic-site mode only)
    #[argh(switch, short = 'b')]
    pub breakpoint: bool,

    /// breakpoint scan window size (default: 200)
    #[argh(option, default = "DEFAULT_BREAKWIN")]
    pub breakwin: usize,

    /// y-axis start recorded for plotting (default: 0.0)
    #[argh(option, default = "0.0")]
    pub y_start: f64,

    /// what to do after a region is emitted: terminal or continue (default: terminal)
    #[argh(option, default = "String::from(DEFAULT_MERGE_POLICY)")]
    pub merge_policy: String,

    /// number of threads (default: auto-detect)
    #[argh(option)]
    pub threads: Option<usize>,

    /// output directory (default: result_<run id> next to the alignment)
    #[argh(option, short = 'o')]
    pub output: Option<String>,

    /// hide progress bars
    #[argh(switch)]
    pub no_progress: bool,

    /// validate inputs and print the resolved groups without scanning
    #[argh(switch)]
    pub dry_run: bool,

    /// path to TOML configuration file
    #[argh(option)]
    pub config: Option<String>,

    /// generate sample configuration file and exit
    #[argh(switch)]
    pub generate_config: bool,
}
