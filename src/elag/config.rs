//! Settings of the rule compiler.

/// Default size, in states, above which a running grammar is written out.
pub const DEFAULT_MAX_GRAMMAR_STATES: usize = 128;

/// Settings of [`compile_rules`](super::compile_rules).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct CompilerConfig {
    /// A running grammar larger than this is minimized, saved and restarted.
    pub max_grammar_states: usize,
    /// Save `<rule>-conc.fst2` next to each compiled rule.
    pub write_locate_automata: bool,
    /// Load `<rule>.elg` instead of compiling `<rule>.fst2` when it exists.
    pub reuse_compiled_rules: bool,
    /// Minimize each grammar before saving it.
    pub minimize_output: bool,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            max_grammar_states: DEFAULT_MAX_GRAMMAR_STATES,
            write_locate_automata: false,
            reuse_compiled_rules: true,
            minimize_output: true,
        }
    }
}
