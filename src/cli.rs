use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use crate::{
    dependency::DependencySet,
    extractor::{Extractor, MakeExtractor},
    makefile::{Makefile, find_makefile},
};

/// Native library inventory for Makefile projects.
///
/// Recovers variables, targets and recipes from Makefiles and reports the
/// `-lxxx` libraries they link against.
#[derive(Parser, Debug)]
#[clap(styles = cli_styles::CLAP_STYLES, verbatim_doc_comment)]
pub enum Cli {
    Scan(Scan),
    Parse(Parse),
    Usage(Usage),
    Export(Export),
}

/// List the libraries linked by one or more Makefiles
#[derive(Parser, Debug)]
pub struct Scan {
    /// Makefiles, or directories containing one
    #[clap(default_value = ".")]
    paths: Vec<PathBuf>,

    /// Output format
    #[clap(short, long, value_enum)]
    format: Option<OutputFormat>,
}

/// Show the variables, targets and comments of a Makefile
#[derive(Parser, Debug)]
pub struct Parse {
    #[clap(default_value = ".")]
    path: PathBuf,

    /// Strip surrounding whitespace (and the recipe tab) from every token and statement
    #[clap(long)]
    trim: bool,

    /// Output format
    #[clap(short, long, value_enum)]
    format: Option<OutputFormat>,
}

/// Show where libraries are referenced in a Makefile
#[derive(Parser, Debug)]
pub struct Usage {
    #[clap(default_value = ".")]
    path: PathBuf,

    /// Output format
    #[clap(short, long, value_enum)]
    format: Option<OutputFormat>,
}

/// Write the parsed variables and targets back to a new Makefile
#[derive(Parser, Debug)]
pub struct Export {
    path: PathBuf,

    /// Destination, must not exist
    output: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(ValueEnum)]
pub enum OutputFormat {
    Json,
}

pub fn main(args: &Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir().context("Failed to get current directory")?;

    match args {
        Cli::Scan(args) => scan(&cwd, args)?,
        Cli::Parse(args) => parse(&cwd, args)?,
        Cli::Usage(args) => usage(&cwd, args)?,
        Cli::Export(args) => {
            let path = resolve_makefile(&args.path)?;
            Makefile::from_file(&path)?.export(&args.output)?;
            println!("{} {}", "exported".green(), display_relative(&args.output, &cwd));
        }
    };

    Ok(())
}

/// Accepts a Makefile or a directory holding one
fn resolve_makefile(path: &Path) -> anyhow::Result<PathBuf> {
    if !path.is_dir() {
        return Ok(path.to_path_buf());
    }
    match find_makefile(path) {
        Some(makefile) => Ok(makefile),
        None => bail!("No Makefile found in {}", path.display()),
    }
}

fn display_relative(path: &Path, cwd: &Path) -> String {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    pathdiff::diff_paths(&absolute, cwd)
        .unwrap_or(absolute)
        .display()
        .to_string()
}

/// One extractor per path; paths without a Makefile are reported and skipped
fn scan_extractors(paths: &[PathBuf]) -> Vec<MakeExtractor> {
    paths
        .iter()
        .filter_map(|path| match resolve_makefile(path) {
            Ok(makefile) => Some(MakeExtractor::new(makefile)),
            Err(e) => {
                log::warn!("{e}");
                eprintln!("{} {e}, skipped", "warning:".yellow());
                None
            }
        })
        .collect()
}

fn scan(cwd: &Path, args: &Scan) -> anyhow::Result<()> {
    let extractors = scan_extractors(&args.paths);

    let bar = if extractors.len() > 1 && args.format.is_none() {
        let bar = ProgressBar::new(extractors.len() as u64);
        bar.set_style(
            ProgressStyle::with_template(
                "[{elapsed_precise}] [{bar:40.green/white}] {pos:>7}/{len:7} {msg}",
            )?
            .progress_chars("=>-"),
        );
        bar
    } else {
        ProgressBar::hidden()
    };

    let mut dependencies = DependencySet::new();
    for extractor in &extractors {
        bar.set_message(display_relative(extractor.target(), cwd));
        extractor.run(&mut dependencies);
        bar.inc(1);
    }
    bar.finish_and_clear();

    if let Some(OutputFormat::Json) = args.format {
        println!("{}", serde_json::to_string_pretty(&dependencies.into_vec())?);
        return Ok(());
    }

    if dependencies.is_empty() {
        println!("{}", "no libraries found".yellow());
        return Ok(());
    }

    for dependency in dependencies.iter() {
        println!("{}", dependency.name.cyan().bold());
        for evidence in &dependency.evidence {
            println!(
                "  {} {} ({})",
                evidence.extractor.green(),
                display_relative(Path::new(&evidence.source), cwd),
                evidence.confidence
            );
        }
    }

    Ok(())
}

fn parse(cwd: &Path, args: &Parse) -> anyhow::Result<()> {
    let path = resolve_makefile(&args.path)?;
    let mut makefile = Makefile::from_file(&path)?;
    if args.trim {
        makefile.trim();
    }

    if let Some(OutputFormat::Json) = args.format {
        #[derive(serde::Serialize)]
        struct VariableEntry<'a> {
            name: &'a str,
            operator: &'static str,
            value: &'a [String],
        }

        #[derive(serde::Serialize)]
        struct TargetEntry<'a> {
            name: &'a str,
            dependencies: &'a [String],
            statements: &'a [String],
        }

        #[derive(serde::Serialize)]
        struct MakefileEntry<'a> {
            variables: Vec<VariableEntry<'a>>,
            targets: Vec<TargetEntry<'a>>,
            comments: &'a std::collections::BTreeMap<usize, String>,
        }

        let entry = MakefileEntry {
            variables: makefile.variables.values().map(|variable| VariableEntry {
                name: &variable.name,
                operator: variable.operator.as_str(),
                value: &variable.value,
            }).collect(),
            targets: makefile.targets.values().map(|target| TargetEntry {
                name: &target.name,
                dependencies: &target.dependencies,
                statements: &target.statements,
            }).collect(),
            comments: &makefile.comments,
        };

        println!("{}", serde_json::to_string_pretty(&entry)?);
        return Ok(());
    }

    println!("{}", display_relative(&path, cwd).bold());

    println!("{}", "variables:".green());
    for variable in makefile.variables.values() {
        println!("  {} {} {}", variable.name.cyan(), variable.operator, variable.value.join(" "));
    }

    println!("{}", "targets:".green());
    for target in makefile.targets.values() {
        println!("  {}: {}", target.name.cyan().bold(), target.dependencies.join(" "));
        for statement in &target.statements {
            println!("      {}", statement.trim());
        }
    }

    if !makefile.comments.is_empty() {
        println!("{}", "comments:".green());
        for (index, comment) in &makefile.comments {
            println!("  {:>4} {}", index + 1, comment.trim());
        }
    }

    Ok(())
}

fn usage(cwd: &Path, args: &Usage) -> anyhow::Result<()> {
    let path = resolve_makefile(&args.path)?;
    let usage = MakeExtractor::new(&path).library_usage();

    if let Some(OutputFormat::Json) = args.format {
        #[derive(serde::Serialize)]
        struct UsageEntry<'a> {
            libraries: Vec<&'a String>,
            used_in_targets: Vec<&'a String>,
            direct_library_usage: Vec<(&'a String, &'a Vec<String>)>,
            all_libraries: Vec<String>,
        }

        let entry = UsageEntry {
            libraries: usage.libraries.iter().collect(),
            used_in_targets: usage.used_in_targets.iter().collect(),
            direct_library_usage: usage.direct_library_usage.iter().collect(),
            all_libraries: usage.all_libraries().into_iter().collect(),
        };

        println!("{}", serde_json::to_string_pretty(&entry)?);
        return Ok(());
    }

    println!("{}", display_relative(&path, cwd).bold());
    println!("{:<20} {}", "libraries".green(), join(&usage.libraries));
    println!("{:<20} {}", "used in targets".green(), join(&usage.used_in_targets));
    println!("{}", "direct usage".green());
    for (target, libraries) in usage.direct_library_usage.iter() {
        println!("  {:<18} {}", target.cyan(), libraries.join(" "));
    }

    Ok(())
}

fn join<'a>(values: impl IntoIterator<Item = &'a String>) -> String {
    values.into_iter().map(String::as_str).collect::<Vec<_>>().join(" ")
}
