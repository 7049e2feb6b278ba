//! pdfgloss CLI - translate PDF paragraphs into FreeText annotations

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pdfgloss::{
    AnnotationStyle, Interrupt, Language, ParagraphOutcome, PdfGloss, RunReport, TranslateOptions,
};

/// Exit status after Ctrl-C, as shells report SIGINT.
const EXIT_INTERRUPTED: i32 = 130;

#[derive(Parser)]
#[command(name = "pdfgloss")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Translate PDF paragraphs into FreeText annotations", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Translate one page and write an annotated copy
    Translate {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (default: <name>_translated.pdf next to the input)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Page to translate (1-indexed)
        #[arg(short, long, default_value = "1")]
        page: u32,

        /// Source language (code or English name)
        #[arg(long, env = "PDFGLOSS_FROM", default_value = "zh-CN")]
        from: Language,

        /// Target language (code or English name)
        #[arg(long, env = "PDFGLOSS_TO", default_value = "en")]
        to: Language,

        /// Paragraph merge sensitivity; lower splits more
        #[arg(long, default_value = "5")]
        merge: u32,

        /// Minimum delay between translation requests in milliseconds
        #[arg(long, env = "PDFGLOSS_DELAY_MS", default_value = "250")]
        delay_ms: u64,

        /// Annotation font size
        #[arg(long, default_value = "10")]
        font_size: f32,

        /// Translation endpoint
        #[arg(long, env = "PDFGLOSS_ENDPOINT")]
        endpoint: Option<String>,

        /// Summary format
        #[arg(long, value_enum, default_value = "text")]
        report: ReportFormat,
    },

    /// List detected paragraphs and their text without translating
    Paragraphs {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Page to inspect (1-indexed)
        #[arg(short, long, default_value = "1")]
        page: u32,

        /// Paragraph merge sensitivity; lower splits more
        #[arg(long, default_value = "5")]
        merge: u32,

        /// Output JSON
        #[arg(long)]
        json: bool,
    },

    /// Show version information
    Version,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug, ValueEnum)]
enum ReportFormat {
    /// Human-readable summary
    Text,
    /// JSON run report on stdout
    Json,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Translate {
            input,
            output,
            page,
            from,
            to,
            merge,
            delay_ms,
            font_size,
            endpoint,
            report,
        } => {
            let output = output.unwrap_or_else(|| default_output_path(&input));
            let options = TranslateOptions::new()
                .with_page(page)
                .with_languages(from, to)
                .with_merge_sensitivity(merge)
                .with_min_interval(Duration::from_millis(delay_ms))
                .with_style(AnnotationStyle::default().with_font_size(font_size));
            cmd_translate(&input, &output, options, endpoint, report)
        }
        Commands::Paragraphs {
            input,
            page,
            merge,
            json,
        } => cmd_paragraphs(&input, page, merge, json),
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    };

    if let Err(e) = result {
        let interrupted = e
            .downcast_ref::<pdfgloss::Error>()
            .is_some_and(pdfgloss::Error::is_interrupted);
        if interrupted {
            eprintln!("{}", "Interrupted".yellow().bold());
            std::process::exit(EXIT_INTERRUPTED);
        }
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

/// `<dir>/<stem>_translated.pdf` for `<dir>/<stem>.pdf`.
fn default_output_path(input: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    input.with_file_name(format!("{}_translated.pdf", stem))
}

/// Trigger `interrupt` on Ctrl-C from a helper thread.
fn install_interrupt_handler(interrupt: Interrupt) {
    std::thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(e) => {
                log::warn!("Ctrl-C handling unavailable: {}", e);
                return;
            }
        };
        runtime.block_on(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                log::info!("Ctrl-C received, stopping after the current request");
                interrupt.trigger();
            }
        });
    });
}

fn cmd_translate(
    input: &Path,
    output: &Path,
    options: TranslateOptions,
    endpoint: Option<String>,
    format: ReportFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let interrupt = Interrupt::new();
    install_interrupt_handler(interrupt.clone());

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );
    pb.set_message(format!(
        "{} -> {}",
        options.source.code(),
        options.target.code()
    ));

    let mut gloss = PdfGloss::new()
        .with_options(options)
        .with_interrupt(interrupt);
    if let Some(endpoint) = endpoint {
        gloss = gloss.with_endpoint(endpoint);
    }

    let result = gloss.translate_with_progress(input, output, |done, total| {
        pb.set_length(total as u64);
        pb.set_position(done as u64);
    });
    let report = match result {
        Ok(report) => {
            pb.finish_with_message("Done!");
            report
        }
        Err(e) => {
            pb.abandon();
            return Err(e.into());
        }
    };

    match format {
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        ReportFormat::Text => print_report(&report, output),
    }
    Ok(())
}

fn print_report(report: &RunReport, output: &Path) {
    println!(
        "{} page {} ({} -> {})",
        "Translated".green().bold(),
        report.page,
        report.source,
        report.target
    );
    println!("{}", "─".repeat(40).dimmed());

    for paragraph in &report.paragraphs {
        let label = format!("#{}", paragraph.index + 1).bold();
        match &paragraph.outcome {
            ParagraphOutcome::Translated { translated, .. } => {
                println!("{} {}", label, translated);
            }
            ParagraphOutcome::NoWords => println!("{} {}", label, "(no text)".dimmed()),
            ParagraphOutcome::EmptyText => println!("{} {}", label, "(empty after cleanup)".dimmed()),
        }
    }

    println!("{}", "─".repeat(40).dimmed());
    println!(
        "{}: {} translated, {} skipped",
        "Paragraphs".bold(),
        report.translated_count(),
        report.skipped_count()
    );
    println!("{}: {}", "Output".bold(), output.display());
}

fn cmd_paragraphs(
    input: &Path,
    page: u32,
    merge: u32,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = TranslateOptions::new()
        .with_page(page)
        .with_merge_sensitivity(merge);
    let previews = PdfGloss::new().with_options(options).paragraphs(input)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&previews)?);
        return Ok(());
    }

    println!("{} {}", "Paragraphs on page".cyan().bold(), page);
    println!("{}", "─".repeat(40).dimmed());
    for preview in &previews {
        let r = preview.rect;
        let position = format!("[{}, {}, {}, {}]", r.x1, r.y1, r.x2, r.y2).dimmed();
        match &preview.text {
            Some(text) => println!("#{} {} {}", preview.index + 1, position, text),
            None => println!("#{} {} {}", preview.index + 1, position, "(no text)".dimmed()),
        }
    }
    println!("{}: {}", "Total".bold(), previews.len());
    Ok(())
}

fn cmd_version() {
    println!("{} {}", "pdfgloss".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Translate PDF paragraphs into FreeText annotations");
    println!();
    println!("License: MIT");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output_path() {
        assert_eq!(
            default_output_path(Path::new("docs/paper.pdf")),
            PathBuf::from("docs/paper_translated.pdf")
        );
        assert_eq!(
            default_output_path(Path::new("scan")),
            PathBuf::from("scan_translated.pdf")
        );
    }

    #[test]
    fn test_parse_translate_defaults() {
        let cli = Cli::try_parse_from(["pdfgloss", "translate", "in.pdf"]).unwrap();
        match cli.command {
            Commands::Translate {
                page,
                from,
                to,
                merge,
                delay_ms,
                report,
                ..
            } => {
                assert_eq!(page, 1);
                assert_eq!(from, Language::ChineseSimplified);
                assert_eq!(to, Language::English);
                assert_eq!(merge, 5);
                assert_eq!(delay_ms, 250);
                assert_eq!(report, ReportFormat::Text);
            }
            _ => panic!("expected translate"),
        }
    }

    #[test]
    fn test_parse_languages_by_name() {
        let cli = Cli::try_parse_from([
            "pdfgloss", "translate", "in.pdf", "--from", "japanese", "--to", "de",
        ])
        .unwrap();
        match cli.command {
            Commands::Translate { from, to, .. } => {
                assert_eq!(from, Language::Japanese);
                assert_eq!(to, Language::German);
            }
            _ => panic!("expected translate"),
        }
    }

    #[test]
    fn test_parse_rejects_unknown_language() {
        assert!(Cli::try_parse_from(["pdfgloss", "translate", "in.pdf", "--to", "xx"]).is_err());
    }
}
