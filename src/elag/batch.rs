//! Compiling a list of rules into a few grammar files.

use super::config::CompilerConfig;
use super::error::{Result, RuleError};
use super::rule::ElagRule;
use crate::automaton::Automaton;
use crate::label::GrammarSymbols;
use crate::serialization::{load_fst2, save_fst2};
use log::{debug, error, info, warn};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Outcome of [`compile_rules`].
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Rules folded into a grammar, in list order.
    pub compiled: Vec<String>,
    /// Rules that could not be compiled, with the reason.
    pub failed: Vec<(String, RuleError)>,
    /// Rules that forbid everything. They are left out of the grammars.
    pub degenerate: Vec<String>,
    /// Grammar files written, in order.
    pub outputs: Vec<PathBuf>,
}

impl BatchReport {
    /// Whether every listed rule was compiled.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty() && self.degenerate.is_empty()
    }
}

/// `dir/rule.fst2` becomes `dir/rule-conc.fst2`.
fn locate_path(rule: &Path) -> PathBuf {
    let stem = rule
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    rule.with_file_name(format!("{}-conc.fst2", stem))
}

/// Compile one listed rule, or load its `.elg` when allowed.
pub fn compile_rule_file(path: &Path, config: &CompilerConfig) -> Result<Automaton> {
    let elg = path.with_extension("elg");
    if config.reuse_compiled_rules && elg.exists() {
        info!("using already existing {}", elg.display());
        return Ok(load_fst2(&elg, &GrammarSymbols)?);
    }

    let fst2 = path.with_extension("fst2");
    info!("precompiling {}", fst2.display());
    let rule = ElagRule::load(&fst2)?;
    if config.write_locate_automata {
        let located = rule.locate_automaton()?;
        save_fst2(locate_path(&fst2), &rule.name, &located)?;
    }
    rule.compile()
}

/// Writes full running grammars to `<output>-N.elg`.
struct Splitter<'a> {
    output: &'a Path,
    index: BufWriter<File>,
    config: &'a CompilerConfig,
}

impl Splitter<'_> {
    fn flush(&mut self, grammar: Automaton, report: &mut BatchReport) -> Result<()> {
        let grammar = if self.config.minimize_output {
            grammar.minimize()?
        } else {
            grammar
        };
        let file = PathBuf::from(format!("{}-{}.elg", self.output.display(), report.outputs.len()));
        info!(
            "writing grammar '{}' ({} states)",
            file.display(),
            grammar.state_count()
        );
        let name = format!("{}: compiled elag grammar", file.display());
        save_fst2(&file, &name, &grammar)?;
        writeln!(self.index, "<{}>", file.display())?;
        report.outputs.push(file);
        Ok(())
    }
}

/// Compile every rule listed in `list` and intersect them into grammars.
///
/// `list` names one rule per line, relative to its own directory; blank
/// lines are skipped. The running grammar is written to `<output>-N.elg`
/// each time it grows past [`CompilerConfig::max_grammar_states`], and once
/// more at the end. `output` itself receives an index: each rule name on a
/// tab-prefixed line, each grammar file as `<file>`.
///
/// A rule that fails is logged and recorded in the report; the batch goes
/// on. Only errors reading the list or writing outputs abort it.
pub fn compile_rules(
    list: impl AsRef<Path>,
    output: impl AsRef<Path>,
    config: &CompilerConfig,
) -> Result<BatchReport> {
    let (list, output) = (list.as_ref(), output.as_ref());
    info!("compilation of {}", list.display());
    let contents = fs::read_to_string(list)?;
    let base = list.parent().unwrap_or_else(|| Path::new(""));

    let mut splitter = Splitter {
        output,
        index: BufWriter::new(File::create(output)?),
        config,
    };
    let mut report = BatchReport::default();
    let mut running: Option<Automaton> = None;

    for name in contents.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let compiled = compile_rule_file(&base.join(name), config).and_then(|grammar| {
            if grammar.is_empty() {
                return Ok(None);
            }
            let folded = match &running {
                Some(current) => current.intersect(&grammar)?.trim(),
                None => grammar,
            };
            Ok(Some(folded))
        });
        match compiled {
            Ok(Some(folded)) => {
                debug!("{}: running grammar has {} states", name, folded.state_count());
                running = Some(folded);
            }
            Ok(None) => {
                warn!("grammar {} forbids everything, skipped", name);
                report.degenerate.push(name.to_string());
                continue;
            }
            Err(e) => {
                error!("rule {}: {}", name, e);
                report.failed.push((name.to_string(), e));
                continue;
            }
        }

        writeln!(splitter.index, "\t{}", name)?;
        report.compiled.push(name.to_string());
        let full = running
            .as_ref()
            .is_some_and(|g| g.state_count() > config.max_grammar_states);
        if full {
            if let Some(grammar) = running.take() {
                info!("splitting big grammar ({} states)", grammar.state_count());
                splitter.flush(grammar, &mut report)?;
            }
        }
    }

    if let Some(grammar) = running {
        splitter.flush(grammar, &mut report)?;
    }
    splitter.index.flush()?;

    info!(
        "{} rule(s) from {} compiled in {} ({} automata)",
        report.compiled.len(),
        list.display(),
        output.display(),
        report.outputs.len()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locate_path() {
        assert_eq!(
            locate_path(Path::new("rules/det.fst2")),
            PathBuf::from("rules/det-conc.fst2")
        );
    }

    #[test]
    fn test_missing_rules_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        let list = dir.path().join("rules.lst");
        fs::write(&list, "missing-one\n\nmissing-two\n").unwrap();
        let output = dir.path().join("out.rul");

        let report = compile_rules(&list, &output, &CompilerConfig::default()).unwrap();
        assert_eq!(report.failed.len(), 2);
        assert_eq!(report.failed[0].0, "missing-one");
        assert!(report.outputs.is_empty());
        assert_eq!(fs::read_to_string(&output).unwrap(), "");
    }
}
