//! Minimal CLI: resolver documents → (go | plan)
use std::path::{Path, PathBuf};
use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, Args};
use colored::Colorize;
use tracing::{debug, info};

use reset_gen::codegen::{emit_plan, Codegen};
use reset_gen::ir::ResolvedPackage;
use reset_gen::{emit, path_de};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// synthesize Go `Reset()` methods from type-checked struct declarations
#[derive(Parser, Debug)]
#[command(version)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// emit the generated Go source
    Go(GoOut),
    /// print the per-field reset plan as JSON, omitted fields included
    Plan(PlanOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// JSON Pointer to select the package node in each document (e.g. /result/package)
    #[arg(long)]
    json_pointer: Option<String>,

    /// JQ pre-process filter for each document; every output is one package document
    #[arg(long)]
    jq_expr: Option<String>,

    /// One or more resolver documents. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(Args, Debug, Clone)]
struct Selection {
    /// struct types to generate, in output order (all structs if omitted)
    #[arg(long = "type", short = 't', value_delimiter = ',')]
    types: Vec<String>,
}

#[derive(clap::Parser, Debug)]
struct GoOut {
    #[command(flatten)]
    input_settings: InputSettings,

    #[command(flatten)]
    selection: Selection,

    /// output .go file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// debugging
    #[arg(long)]
    no_op: bool,
}

#[derive(clap::Parser, Debug)]
struct PlanOut {
    #[command(flatten)]
    input_settings: InputSettings,

    #[command(flatten)]
    selection: Selection,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    /// Read every input and merge the documents into one package.
    fn load_package(&self) -> Result<ResolvedPackage> {
        let source_paths = resolve_file_path_patterns(&self.input)
            .map_err(|error| anyhow!("failed to resolve input file paths: {error}"))?;

        let mut package: Option<ResolvedPackage> = None;
        for source_path in source_paths {
            for document in self.load_documents(&source_path)? {
                let next = path_de::package_from_value(document)
                    .with_context(|| format!("invalid resolver document ({})", source_path.display()))?;
                debug!(path = %next.path, types = next.types.len(), "decoded package document");
                package = Some(match package {
                    None => next,
                    Some(acc) => acc.merge(next)?,
                });
            }
        }
        package.ok_or_else(|| anyhow!("no package documents in input"))
    }

    fn load_documents(&self, source_path: &Path) -> Result<Vec<serde_json::Value>> {
        let source_path_str = source_path.to_string_lossy().to_string();
        info!(source = %source_path_str, "reading resolver output");
        let source = std::fs::read_to_string(source_path)
            .with_context(|| format!("failed to read source file ({source_path_str})"))?;
        let mut json_value = serde_json::from_str::<serde_json::Value>(&source)
            .with_context(|| format!("failed to parse JSON source file ({source_path_str})"))?;

        if let Some(pointer) = self.json_pointer.as_ref() {
            json_value = json_value
                .pointer(pointer)
                .cloned()
                .ok_or_else(|| anyhow!("JSON pointer {pointer} matched nothing in {source_path_str}"))?;
        }

        match self.jq_expr.as_ref() {
            None => Ok(vec![json_value]),
            Some(jq_expr) => crate::jq_exec::run_jaq(jq_expr, &json_value, &source_path_str),
        }
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }
    pub fn run(&self) -> Result<()> {
        match &self.cmd {
            Command::Go(target) => {
                // debug path
                if target.no_op {
                    eprintln!("{self:#?}");
                    return Ok(())
                }

                // 1) load resolver output
                let package = target.input_settings.load_package()?;

                // 2) synthesize every selected struct; nothing is written on failure
                let output = emit::run(&package, &target.selection.types)?;

                // 3) render Go source
                let mut cg = Codegen::new();
                cg.emit(&output);
                let go_src = cg.into_string();

                write_output(target.out.as_deref(), &go_src)?;
                if let Some(out) = target.out.as_ref() {
                    eprintln!(
                        "{} {} Reset method(s) → {}",
                        "generated".green().bold(),
                        output.methods.len(),
                        out.display(),
                    );
                }
                Ok(())
            }
            Command::Plan(target) => {
                let package = target.input_settings.load_package()?;
                let output = emit::run(&package, &target.selection.types)?;
                let plan = emit_plan(&output);
                let plan_src = serde_json::to_string_pretty(&plan)?;
                write_output(target.out.as_deref(), &plan_src)
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn write_output(out: Option<&Path>, src: &str) -> Result<()> {
    match out {
        Some(out) => {
            if let Some(parent) = out.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(out, src)
                .with_context(|| format!("failed to write {}", out.display()))
        }
        None => {
            print!("{src}");
            Ok(())
        }
    }
}

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>, Box<dyn std::error::Error + Send + Sync>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{' ))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched = glob::glob(pattern)?.collect::<Result<Vec<_>, _>>()?;
            if matched.is_empty() {
                // Pattern was explicitly a glob but matched nothing -> surface as an error
                return Err(format!("glob pattern matched no files: {pattern}").into());
            }
            // glob yields alphabetical order already; keep it stable across platforms
            matched.sort();
            out.append(&mut matched);
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}
