//! CLI command implementations

use anyhow::{bail, Context, Result};
use colored::Colorize;
use std::path::{Path, PathBuf};

use crate::automaton::Automaton;
use crate::elag::{apply_grammars, compile_rules, load_grammars, ElagRule};
use crate::label::{GrammarSymbols, SymbolLoader, TextSymbols};
use crate::serialization::{
    load_file, save_file, save_fst2, BincodeSerializer, Fst2Serializer, JsonSerializer,
    NamedAutomaton,
};

use super::args::{AutomatonFormat, Cli, Commands, ConfigAction};
use super::detect::{detect_format, format_for_output};
use super::paths::{config_file_path_with_override, PersistentConfig};

/// Execute a parsed command line
pub fn execute(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Compile {
            rule,
            output,
            locate,
        } => cmd_compile(&rule, output, locate, config_path),
        Commands::CompileRules {
            list,
            output,
            max_states,
            locate,
            no_reuse,
            no_minimize,
        } => {
            let settings = PersistentConfig::load_from(config_path)?.merge_with_cli(
                max_states,
                locate.then_some(true),
                no_reuse.then_some(false),
                no_minimize.then_some(false),
            );
            cmd_compile_rules(&list, &output, &settings)
        }
        Commands::Apply {
            text,
            grammars,
            output,
            format,
        } => cmd_apply(&text, &grammars, output, format),
        Commands::Determinize {
            input,
            output,
            format,
        } => cmd_transform(&input, &output, format, "Determinized", |a| {
            Ok(a.determinize()?)
        }),
        Commands::Minimize {
            input,
            output,
            format,
        } => cmd_transform(&input, &output, format, "Minimized", |a| Ok(a.minimize()?)),
        Commands::Info { input, format } => cmd_info(&input, format),
        Commands::Config { action } => cmd_config(action, config_path),
    }
}

/// Compile command
fn cmd_compile(
    rule: &Path,
    output: Option<PathBuf>,
    locate: bool,
    config_path: Option<&Path>,
) -> Result<()> {
    let mut config = PersistentConfig::load_from(config_path)?.compiler_config();
    config.write_locate_automata |= locate;
    let output = output.unwrap_or_else(|| rule.with_extension("elg"));

    println!(
        "{}  Rule:    {}",
        "→".cyan(),
        rule.display().to_string().yellow()
    );
    let loaded = ElagRule::load(rule)
        .with_context(|| format!("Failed to load rule: {}", rule.display()))?;
    println!(
        "  Side constraints: {}",
        loaded.sides.len().to_string().green()
    );
    if config.write_locate_automata {
        let located = loaded.locate_automaton()?;
        let path = rule.with_file_name(format!(
            "{}-conc.fst2",
            rule.file_stem().unwrap_or_default().to_string_lossy()
        ));
        save_fst2(&path, &loaded.name, &located)?;
        println!("  Locate:  {}", path.display().to_string().cyan());
    }

    let name = loaded.name.clone();
    let mut grammar = loaded
        .compile()
        .with_context(|| format!("Failed to compile rule: {}", name))?;
    if config.minimize_output {
        grammar = grammar.minimize()?;
    }
    if grammar.is_empty() {
        println!("  {}: rule forbids everything", "Warning".yellow());
    }
    save_fst2(&output, &format!("{}: compiled elag rule", name), &grammar)?;
    println!(
        "{}  Grammar: {} ({} states)",
        "→".cyan(),
        output.display().to_string().yellow(),
        grammar.state_count().to_string().green()
    );
    Ok(())
}

/// Batch compile command
fn cmd_compile_rules(list: &Path, output: &Path, settings: &PersistentConfig) -> Result<()> {
    let config = settings.compiler_config();
    let report = compile_rules(list, output, &config)
        .with_context(|| format!("Failed to compile rule list: {}", list.display()))?;

    println!("{}", "Compilation Report".bold().underline());
    println!();
    println!("  Compiled: {}", report.compiled.len().to_string().green());
    for name in &report.degenerate {
        println!("  {}: {} forbids everything", "Skipped".yellow(), name);
    }
    for (name, error) in &report.failed {
        println!("  {}: {}: {}", "Failed".red().bold(), name, error);
    }
    for file in &report.outputs {
        println!("  {}  {}", "→".cyan(), file.display().to_string().yellow());
    }
    println!("  Index:    {}", output.display().to_string().cyan());
    println!();

    if !report.failed.is_empty() {
        bail!("{} rule(s) failed to compile", report.failed.len());
    }
    Ok(())
}

/// Apply command
fn cmd_apply(
    text: &Path,
    index: &Path,
    output: Option<PathBuf>,
    format: Option<AutomatonFormat>,
) -> Result<()> {
    let detection = detect_format(text, format)?;
    let sentences = load_automata(text, detection.format, &TextSymbols)?;
    let grammars = load_grammars(index)
        .with_context(|| format!("Failed to load grammars from {}", index.display()))?;
    println!(
        "{}  Text:     {} ({} sentences, {})",
        "→".cyan(),
        text.display().to_string().yellow(),
        sentences.len().to_string().green(),
        detection.format
    );
    println!("  Grammars: {}", grammars.len().to_string().green());

    let mut rejected = 0;
    let mut filtered = Vec::with_capacity(sentences.len());
    for sentence in sentences {
        let result = apply_grammars(&sentence.automaton, &grammars)
            .with_context(|| format!("Failed to apply grammars to {}", sentence.name))?;
        if result.is_empty() {
            log::warn!("sentence {} rejected, kept unchanged", sentence.name);
            rejected += 1;
            filtered.push(sentence);
        } else {
            filtered.push(NamedAutomaton::new(sentence.name, result));
        }
    }

    let output = output.unwrap_or_else(|| default_apply_output(text, detection.format));
    save_automata(&output, format_for_output(&output), &filtered)?;
    if rejected > 0 {
        println!(
            "  {}: {} sentence(s) rejected",
            "Warning".yellow(),
            rejected
        );
    }
    println!(
        "{}  Output:   {}",
        "→".cyan(),
        output.display().to_string().yellow()
    );
    Ok(())
}

/// `dir/text.fst2` becomes `dir/text-elag.fst2`.
fn default_apply_output(text: &Path, format: AutomatonFormat) -> PathBuf {
    let stem = text.file_stem().unwrap_or_default().to_string_lossy();
    let ext = text
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| match format {
            AutomatonFormat::Fst2 => "fst2".to_string(),
            AutomatonFormat::Bincode => "bin".to_string(),
            AutomatonFormat::Json => "json".to_string(),
        });
    text.with_file_name(format!("{}-elag.{}", stem, ext))
}

/// Determinize and minimize commands
fn cmd_transform(
    input: &Path,
    output: &Path,
    format: Option<AutomatonFormat>,
    verb: &str,
    transform: impl Fn(&Automaton) -> Result<Automaton>,
) -> Result<()> {
    let detection = detect_format(input, format)?;
    let automata = load_automata(input, detection.format, &GrammarSymbols)?;
    let transformed = automata
        .iter()
        .map(|named| {
            let automaton = transform(&named.automaton)
                .with_context(|| format!("Failed on automaton {}", named.name))?;
            println!(
                "  {}: {} → {} states",
                named.name,
                named.automaton.state_count(),
                automaton.state_count().to_string().green()
            );
            Ok(NamedAutomaton::new(named.name.clone(), automaton))
        })
        .collect::<Result<Vec<_>>>()?;

    save_automata(output, format_for_output(output), &transformed)?;
    println!();
    println!(
        "  {}",
        format!("{} {} automata", verb, transformed.len()).green().bold()
    );
    Ok(())
}

/// Info command
fn cmd_info(input: &Path, format: Option<AutomatonFormat>) -> Result<()> {
    let detection = detect_format(input, format)?;
    let automata = load_automata(input, detection.format, &GrammarSymbols)?;

    println!("{}", "Automaton Information".bold().underline());
    println!();
    println!("  Path:     {}", input.display().to_string().cyan());
    println!(
        "  Format:   {} (detected via {})",
        detection.format.to_string().green(),
        detection.method.to_string().yellow()
    );
    println!("  Automata: {}", automata.len().to_string().green());

    for named in &automata {
        let automaton = &named.automaton;
        println!();
        println!("  {}", named.name.bold());
        println!("    States:        {}", automaton.state_count());
        println!("    Transitions:   {}", automaton.transition_count());
        println!("    Final states:  {}", automaton.final_states().count());
        println!("    Labels:        {}", automaton.alphabet().len());
        println!("    Deterministic: {}", yes_no(automaton.is_deterministic()?));
        println!("    Complete:      {}", yes_no(automaton.is_complete()));
    }
    println!();
    Ok(())
}

fn yes_no(value: bool) -> colored::ColoredString {
    if value {
        "yes".green()
    } else {
        "no".yellow()
    }
}

/// Config command
fn cmd_config(action: ConfigAction, config_path: Option<&Path>) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = PersistentConfig::load_from(config_path)?;
            println!("{}", "Config File Location:".bold().underline());
            println!();
            println!(
                "  {}",
                config_file_path_with_override(config_path)?
                    .display()
                    .to_string()
                    .cyan()
            );
            println!();
            print_config(&config);
        }
        ConfigAction::Set {
            max_states,
            locate,
            reuse,
            minimize,
        } => {
            let config = PersistentConfig::load_from(config_path)?
                .merge_with_cli(max_states, locate, reuse, minimize);
            config.save_to(config_path)?;
            println!("{}", "Configuration saved".green().bold());
            println!();
            print_config(&config);
        }
        ConfigAction::Reset => {
            let config = PersistentConfig::default();
            config.save_to(config_path)?;
            println!("{}", "Configuration reset to defaults".green().bold());
            println!();
            print_config(&config);
        }
    }
    Ok(())
}

/// Print current configuration
fn print_config(config: &PersistentConfig) {
    let effective = config.compiler_config();
    let source = |set: bool| if set { "" } else { " (default)" };

    println!("{}", "Current Configuration:".bold().underline());
    println!();
    println!(
        "  Max grammar states:  {}{}",
        effective.max_grammar_states.to_string().yellow(),
        source(config.max_grammar_states.is_some())
    );
    println!(
        "  Locate automata:     {}{}",
        effective.write_locate_automata.to_string().yellow(),
        source(config.write_locate_automata.is_some())
    );
    println!(
        "  Reuse compiled:      {}{}",
        effective.reuse_compiled_rules.to_string().yellow(),
        source(config.reuse_compiled_rules.is_some())
    );
    println!(
        "  Minimize output:     {}{}",
        effective.minimize_output.to_string().yellow(),
        source(config.minimize_output.is_some())
    );
}

/// Load every automaton of a file
pub fn load_automata<L: SymbolLoader>(
    path: &Path,
    format: AutomatonFormat,
    loader: &L,
) -> Result<Vec<NamedAutomaton>> {
    if !path.exists() {
        bail!("File does not exist: {}", path.display());
    }
    let automata = match format {
        AutomatonFormat::Fst2 => load_file::<Fst2Serializer, _>(path, loader),
        AutomatonFormat::Bincode => load_file::<BincodeSerializer, _>(path, loader),
        AutomatonFormat::Json => load_file::<JsonSerializer, _>(path, loader),
    };
    automata.with_context(|| format!("Failed to load {} file: {}", format, path.display()))
}

/// Save automata in the given format
pub fn save_automata(
    path: &Path,
    format: AutomatonFormat,
    automata: &[NamedAutomaton],
) -> Result<()> {
    let saved = match format {
        AutomatonFormat::Fst2 => save_file::<Fst2Serializer>(path, automata),
        AutomatonFormat::Bincode => save_file::<BincodeSerializer>(path, automata),
        AutomatonFormat::Json => save_file::<JsonSerializer>(path, automata),
    };
    saved.with_context(|| format!("Failed to save {} file: {}", format, path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_apply_output() {
        assert_eq!(
            default_apply_output(Path::new("corpus/text.fst2"), AutomatonFormat::Fst2),
            PathBuf::from("corpus/text-elag.fst2")
        );
        assert_eq!(
            default_apply_output(Path::new("text"), AutomatonFormat::Json),
            PathBuf::from("text-elag.json")
        );
    }
}
