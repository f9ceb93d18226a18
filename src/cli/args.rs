//! CLI argument definitions

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "elag")]
#[command(about = "Compile and apply ELAG disambiguation grammars")]
#[command(version)]
pub struct Cli {
    /// Custom configuration file path
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    /// Log debug messages
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compile one rule (.fst2) into a grammar (.elg)
    Compile {
        /// Rule automaton
        rule: PathBuf,

        /// Grammar file (defaults to the rule with an .elg extension)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also write the locate automaton <rule>-conc.fst2
        #[arg(long)]
        locate: bool,
    },

    /// Compile a list of rules into grammar files and an index
    CompileRules {
        /// File listing one rule per line
        list: PathBuf,

        /// Index file; grammars go to <output>-N.elg
        output: PathBuf,

        /// Split the grammar above this many states
        #[arg(long)]
        max_states: Option<usize>,

        /// Write locate automata next to the rules
        #[arg(long)]
        locate: bool,

        /// Recompile rules even when an .elg exists
        #[arg(long)]
        no_reuse: bool,

        /// Save grammars without minimizing them
        #[arg(long)]
        no_minimize: bool,
    },

    /// Filter text automata through compiled grammars
    Apply {
        /// Text automata (one per sentence)
        text: PathBuf,

        /// Grammar index written by compile-rules
        grammars: PathBuf,

        /// Output file (defaults to <text>-elag.<ext>)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Serialization format (auto-detected if not specified)
        #[arg(short = 'f', long)]
        format: Option<AutomatonFormat>,
    },

    /// Determinize every automaton of a file
    Determinize {
        /// Input file
        input: PathBuf,

        /// Output file
        output: PathBuf,

        /// Input format (auto-detected if not specified)
        #[arg(short = 'f', long)]
        format: Option<AutomatonFormat>,
    },

    /// Minimize every automaton of a file
    Minimize {
        /// Input file
        input: PathBuf,

        /// Output file
        output: PathBuf,

        /// Input format (auto-detected if not specified)
        #[arg(short = 'f', long)]
        format: Option<AutomatonFormat>,
    },

    /// Display automaton information
    Info {
        /// Automaton file
        input: PathBuf,

        /// Serialization format (auto-detected if not specified)
        #[arg(short = 'f', long)]
        format: Option<AutomatonFormat>,
    },

    /// Show or update compiler settings
    Config {
        /// What to do with the settings
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Subcommands of `config`
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current settings and the config file path
    Show,

    /// Update settings
    Set {
        /// Split grammars above this many states
        #[arg(long)]
        max_states: Option<usize>,

        /// Write locate automata
        #[arg(long)]
        locate: Option<bool>,

        /// Reuse existing .elg files
        #[arg(long)]
        reuse: Option<bool>,

        /// Minimize grammars before saving
        #[arg(long)]
        minimize: Option<bool>,
    },

    /// Reset configuration to defaults
    Reset,
}

/// On-disk layout of an automaton file
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, serde::Serialize, serde::Deserialize)]
pub enum AutomatonFormat {
    /// Line-oriented text (.fst2, .elg)
    Fst2,
    /// Bincode binary format
    Bincode,
    /// JSON format
    Json,
}

impl std::fmt::Display for AutomatonFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fst2 => write!(f, "fst2"),
            Self::Bincode => write!(f, "bincode"),
            Self::Json => write!(f, "json"),
        }
    }
}
