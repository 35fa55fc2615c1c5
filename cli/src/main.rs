//! pdfstruct CLI - infer document structure from PDF typography

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

use pdfstruct::render::DEFAULT_BASE_URL;
use pdfstruct::{
    ConvertOptions, JsonFormat, PdfConverter, Role, ThresholdStrategy, Thresholds,
};

#[derive(Parser)]
#[command(name = "pdfstruct")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Infer headings and paragraphs from PDF typography and emit JSON", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert PDFs to structured JSON
    Convert {
        /// Input PDF files
        #[arg(value_name = "FILE", required = true)]
        inputs: Vec<PathBuf>,

        /// Output file, or output directory when several inputs are given
        /// (stdout for a single input if not specified)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        /// Emit the page index on every node
        #[arg(long)]
        include_pages: bool,

        /// Attach PDF document information under `pdf_info`
        #[arg(long)]
        info: bool,

        #[command(flatten)]
        pipeline: PipelineArgs,
    },

    /// Print every extracted run with its classification
    Runs {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Print runs as JSON lines
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        pipeline: PipelineArgs,
    },

    /// Show document information and conversion statistics
    Info {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        #[command(flatten)]
        pipeline: PipelineArgs,
    },

    /// Show version information
    Version,
}

/// Options shared by every command that runs the pipeline.
#[derive(Args, Debug, Clone, Default)]
struct PipelineArgs {
    /// Base URL written to `source_url` (empty string to omit)
    #[arg(long, env = "PDFSTRUCT_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Threshold table as a JSON file
    #[arg(long, value_name = "FILE", env = "PDFSTRUCT_THRESHOLDS")]
    thresholds: Option<PathBuf>,

    /// Minimum size for level-1 headings
    #[arg(long, value_name = "PT")]
    h1: Option<f32>,

    /// Minimum size for level-2 headings
    #[arg(long, value_name = "PT")]
    h2: Option<f32>,

    /// Minimum size for level-3 headings
    #[arg(long, value_name = "PT")]
    h3: Option<f32>,

    /// Treat bold body-sized text as emphasis
    #[arg(long)]
    bold_emphasis: bool,

    /// Derive thresholds from the body font size
    #[arg(long, conflicts_with_all = ["thresholds", "h1", "h2", "h3"])]
    adaptive: bool,

    /// Document password
    #[arg(long, env = "PDFSTRUCT_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Page range (e.g., "1-10", "1,3,5")
    #[arg(long)]
    pages: Option<String>,

    /// Skip undecodable pages instead of failing
    #[arg(long)]
    lenient: bool,
}

impl PipelineArgs {
    fn strategy(&self) -> Result<ThresholdStrategy, Box<dyn std::error::Error>> {
        if self.adaptive {
            return Ok(ThresholdStrategy::adaptive().with_bold_implies_heading(self.bold_emphasis));
        }

        let mut thresholds = match &self.thresholds {
            Some(path) => Thresholds::from_json_str(&fs::read_to_string(path)?)?,
            None => Thresholds::default(),
        };
        if let Some(size) = self.h1 {
            thresholds.heading1_min_size = size;
        }
        if let Some(size) = self.h2 {
            thresholds.heading2_min_size = size;
        }
        if let Some(size) = self.h3 {
            thresholds.heading3_min_size = size;
        }
        if self.bold_emphasis {
            thresholds.bold_implies_heading = true;
        }
        Ok(ThresholdStrategy::Fixed(thresholds))
    }

    fn options(&self) -> Result<ConvertOptions, Box<dyn std::error::Error>> {
        let mut options = ConvertOptions::new()
            .with_base_url(self.base_url.clone())
            .with_strategy(self.strategy()?);

        if let Some(pages) = &self.pages {
            options = options.with_page_range(pages)?;
        }
        if let Some(password) = &self.password {
            options = options.with_password(password.clone());
        }
        if self.lenient {
            options = options.lenient();
        }
        Ok(options)
    }

    fn converter(&self) -> Result<PdfConverter, Box<dyn std::error::Error>> {
        Ok(PdfConverter::new(self.options()?)?)
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Convert {
            inputs,
            output,
            compact,
            include_pages,
            info,
            pipeline,
        } => cmd_convert(&inputs, output.as_deref(), compact, include_pages, info, &pipeline),
        Commands::Runs {
            input,
            json,
            pipeline,
        } => cmd_runs(&input, json, &pipeline),
        Commands::Info { input, pipeline } => cmd_info(&input, &pipeline),
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

/// Where the JSON for `input` goes when several inputs share one directory.
fn output_path(dir: &Path, input: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    dir.join(format!("{}.json", stem))
}

/// One output path per input. Repeated file stems get a numeric suffix
/// (`report.json`, `report-2.json`) so no two inputs write the same file.
fn output_paths(dir: &Path, inputs: &[PathBuf]) -> Vec<PathBuf> {
    let mut taken = HashSet::new();
    inputs
        .iter()
        .map(|input| {
            let mut path = output_path(dir, input);
            let stem = input.file_stem().unwrap_or_default().to_string_lossy();
            let mut n = 2;
            while !taken.insert(path.clone()) {
                path = dir.join(format!("{}-{}.json", stem, n));
                n += 1;
            }
            path
        })
        .collect()
}

fn cmd_convert(
    inputs: &[PathBuf],
    output: Option<&Path>,
    compact: bool,
    include_pages: bool,
    info: bool,
    pipeline: &PipelineArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };
    let options = pipeline
        .options()?
        .with_page_numbers(include_pages)
        .with_info(info)
        .with_format(format);
    let converter = PdfConverter::new(options)?;
    log::debug!(
        "Converting {} inputs with {:?}",
        inputs.len(),
        converter.options().thresholds
    );

    if let [input] = inputs {
        let json = converter.convert_file(input)?.to_json()?;
        if let Some(path) = output {
            fs::write(path, &json)?;
            println!("{} {}", "Saved to".green(), path.display());
        } else {
            println!("{}", json);
        }
        return Ok(());
    }

    let output_dir = output.map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("."));
    fs::create_dir_all(&output_dir)?;

    let pb = ProgressBar::new(inputs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );

    let targets = output_paths(&output_dir, inputs);
    let outcomes: Vec<(PathBuf, Result<PathBuf, String>)> = inputs
        .par_iter()
        .zip(targets.par_iter())
        .map(|(input, path)| {
            let outcome = converter
                .convert_file(input)
                .and_then(|result| result.to_json())
                .map_err(|e| e.to_string())
                .and_then(|json| {
                    fs::write(path, json).map_err(|e| e.to_string())?;
                    Ok(path.clone())
                });
            pb.set_message(input.display().to_string());
            pb.inc(1);
            (input.clone(), outcome)
        })
        .collect();

    pb.finish_with_message("Done!");

    let mut failed = 0;
    println!("\n{}", "Output files:".green().bold());
    for (input, outcome) in &outcomes {
        match outcome {
            Ok(path) => println!("  {} {}", "├─".dimmed(), path.display()),
            Err(e) => {
                failed += 1;
                println!("  {} {}: {}", "├─".dimmed(), input.display(), e.red());
            }
        }
    }

    if failed > 0 {
        return Err(format!("{} of {} files failed", failed, outcomes.len()).into());
    }
    Ok(())
}

fn role_label(role: Role) -> colored::ColoredString {
    let label = format!("{:<9}", role.as_str());
    let label = label.as_str();
    match role {
        Role::Heading1 => label.magenta().bold(),
        Role::Heading2 => label.cyan().bold(),
        Role::Heading3 => label.blue().bold(),
        Role::Emphasis => label.yellow(),
        Role::Paragraph => label.normal(),
        Role::Unknown => label.red(),
    }
}

fn cmd_runs(input: &Path, json: bool, pipeline: &PipelineArgs) -> Result<(), Box<dyn std::error::Error>> {
    let data = fs::read(input)?;
    let classified = pipeline.converter()?.classify_bytes(&data)?;

    for (run, role) in &classified {
        if json {
            let line = serde_json::json!({
                "page": run.page_index(),
                "sequence": run.sequence(),
                "role": role,
                "font": run.font_name(),
                "size": run.font_size(),
                "bold": run.is_bold(),
                "italic": run.is_italic(),
                "text": run.text(),
            });
            println!("{}", line);
        } else {
            println!(
                "{} {:>4} {:>6.1}pt {} {}",
                role_label(*role),
                run.page_index(),
                run.font_size(),
                if run.is_bold() { "B".bold() } else { " ".normal() },
                run.text()
            );
        }
    }

    if !json {
        println!("\n{} {} runs", "Total:".bold(), classified.len());
    }
    Ok(())
}

fn cmd_info(input: &Path, pipeline: &PipelineArgs) -> Result<(), Box<dyn std::error::Error>> {
    let converter = pipeline.converter()?;
    let result = converter.convert_file(input)?;
    let info = &result.info;

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: PDF {}", "Format".bold(), info.pdf_version);
    println!("{}: {}", "Pages".bold(), info.page_count);
    println!(
        "{}: {}",
        "Encrypted".bold(),
        if info.encrypted { "Yes" } else { "No" }
    );

    if let Some(ref title) = info.title {
        println!("{}: {}", "Title".bold(), title);
    }
    if let Some(ref author) = info.author {
        println!("{}: {}", "Author".bold(), author);
    }
    if let Some(ref subject) = info.subject {
        println!("{}: {}", "Subject".bold(), subject);
    }
    if let Some(ref creator) = info.creator {
        println!("{}: {}", "Creator".bold(), creator);
    }
    if let Some(ref producer) = info.producer {
        println!("{}: {}", "Producer".bold(), producer);
    }
    if let Some(ref created) = info.created {
        println!("{}: {}", "Created".bold(), created);
    }
    if let Some(ref modified) = info.modified {
        println!("{}: {}", "Modified".bold(), modified);
    }

    let thresholds = &result.thresholds;
    let stats = &result.stats;

    println!();
    println!("{}", "Structure".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!(
        "{}: h1 >= {:.1}, h2 >= {:.1}, h3 >= {:.1}",
        "Thresholds".bold(),
        thresholds.heading1_min_size,
        thresholds.heading2_min_size,
        thresholds.heading3_min_size
    );
    println!("{}: {}", "Runs".bold(), stats.runs);
    if stats.unknown_runs > 0 {
        println!("{}: {}", "Unclassified".bold(), stats.unknown_runs.to_string().red());
    }
    println!(
        "{}: {} / {} / {}",
        "Headings (h1/h2/h3)".bold(),
        stats.heading1,
        stats.heading2,
        stats.heading3
    );
    println!("{}: {}", "Paragraphs".bold(), stats.paragraphs);
    println!("{}: {}", "Emphasis".bold(), stats.emphasis);
    println!(
        "{}: {}",
        "Title".bold(),
        result.document.generated_title().unwrap_or_default()
    );

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "pdfstruct".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("PDF structure inference tool");
    println!();
    println!("License: MIT");
}
