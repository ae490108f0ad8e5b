//! pdfblocks CLI - turn PDF pages into editable blocks

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pdfblocks::transport::vector_ref;
use pdfblocks::{
    is_pdf_bytes, load_file_with_options, to_json, DocumentService, DocumentState,
    DocumentSummary, JsonFormat, LoadOptions, LoadReport, Loaded, PageSelection, SceneModel,
};

#[derive(Parser)]
#[command(name = "pdfblocks")]
#[command(version)]
#[command(about = "Turn PDF pages into editable text and vector blocks", long_about = None)]
struct Cli {
    /// Input PDF file
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output directory
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract blocks to a state JSON and per-block SVG files
    Convert {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,
    },

    /// Print the element state of a PDF as JSON
    #[command(alias = "json")]
    Extract {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        /// Page range (e.g., "1-10", "1,3,5")
        #[arg(long)]
        pages: Option<String>,

        /// Abort when a page's text cannot be read
        #[arg(long)]
        strict: bool,

        /// Rendering scale in pixels per point
        #[arg(long, env = "PDFBLOCKS_SCALE")]
        scale: Option<f64>,
    },

    /// Count elements of a PDF or of a saved state JSON
    Summary {
        /// Input PDF or state JSON file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Apply an edited state JSON to a PDF and write the result
    Apply {
        /// Source PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Edited state JSON
        #[arg(value_name = "STATE")]
        state: PathBuf,

        /// Output PDF file
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Show document information
    Info {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Show version information
    Version,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Convert { input, output }) => cmd_convert(&input, output.as_deref()),
        Some(Commands::Extract {
            input,
            output,
            compact,
            pages,
            strict,
            scale,
        }) => cmd_extract(
            &input,
            output.as_deref(),
            compact,
            pages.as_deref(),
            strict,
            scale,
        ),
        Some(Commands::Summary { input }) => cmd_summary(&input),
        Some(Commands::Apply {
            input,
            state,
            output,
        }) => cmd_apply(&input, &state, output.as_deref()),
        Some(Commands::Info { input }) => cmd_info(&input),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            // Default behavior: convert if input is provided
            if let Some(input) = cli.input {
                cmd_convert(&input, cli.output.as_deref())
            } else {
                println!("{}", "Usage: pdfblocks <FILE> [OUTPUT]".yellow());
                println!("       pdfblocks --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn load(input: &Path, options: &LoadOptions) -> Result<Loaded, Box<dyn std::error::Error>> {
    let loaded = load_file_with_options(input, options)?;
    print_report(&loaded.report);
    Ok(loaded)
}

fn print_report(report: &LoadReport) {
    for notice in &report.notices {
        eprintln!("{} {}", "Note:".yellow(), notice);
    }
    for page in &report.pages {
        for warning in &page.warnings {
            eprintln!("{} page {}: {}", "Warning:".yellow(), page.index + 1, warning);
        }
    }
}

/// Write one SVG per vector block into `dir`, returning how many were written.
fn write_vector_assets(
    scene: &SceneModel,
    dir: &Path,
    pb: Option<&ProgressBar>,
) -> Result<usize, Box<dyn std::error::Error>> {
    fs::create_dir_all(dir)?;
    let mut count = 0;
    for block in scene.blocks() {
        let Some(vector) = block.as_vector() else {
            continue;
        };
        fs::write(
            dir.join(vector_ref(block.id())),
            vector.to_svg(block.local_size()),
        )?;
        count += 1;
        if let Some(pb) = pb {
            pb.inc(1);
        }
    }
    Ok(count)
}

fn cmd_convert(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let output_dir = output.map(|p| p.to_path_buf()).unwrap_or_else(|| {
        let stem = input.file_stem().unwrap_or_default().to_string_lossy();
        PathBuf::from(format!("{}_blocks", stem))
    });

    fs::create_dir_all(&output_dir)?;

    // Lenient so one unreadable page doesn't lose the rest
    let loaded = load(input, &LoadOptions::new().lenient())?;
    let scene = &loaded.scene;

    let vectors = scene.blocks().filter(|b| b.as_vector().is_some()).count();
    let pb = ProgressBar::new(vectors as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );
    pb.set_message("Writing vector blocks...");
    let written = write_vector_assets(scene, &output_dir.join("vectors"), Some(&pb))?;
    pb.finish_with_message("Done!");

    let json = to_json(&DocumentState::from_scene(scene), JsonFormat::Pretty)?;
    fs::write(output_dir.join("state.json"), &json)?;

    let summary = DocumentSummary::from_scene(scene);
    fs::write(
        output_dir.join("summary.json"),
        to_json(&summary, JsonFormat::Pretty)?,
    )?;

    println!("\n{}", "Output files:".green().bold());
    println!("  {} state.json", "├─".dimmed());
    println!("  {} summary.json", "├─".dimmed());
    println!("  {} vectors/ ({} files)", "└─".dimmed(), written);

    Ok(())
}

fn cmd_extract(
    input: &Path,
    output: Option<&Path>,
    compact: bool,
    pages: Option<&str>,
    strict: bool,
    scale: Option<f64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let page_selection = if let Some(p) = pages {
        PageSelection::parse(p).map_err(|e| format!("Invalid page range: {}", e))?
    } else {
        PageSelection::All
    };

    let mut options = LoadOptions::new().with_pages(page_selection);
    if !strict {
        options = options.lenient();
    }
    if let Some(scale) = scale {
        options = options.with_scale(scale);
    }
    let loaded = load(input, &options)?;

    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };
    let json = to_json(&DocumentState::from_scene(&loaded.scene), format)?;

    if let Some(path) = output {
        fs::write(path, &json)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", json);
    }

    Ok(())
}

fn cmd_summary(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let data = fs::read(input)?;
    let summary = if is_pdf_bytes(&data) {
        let loaded = load(input, &LoadOptions::new().lenient())?;
        DocumentSummary::from_scene(&loaded.scene)
    } else {
        let state = DocumentState::from_json(&String::from_utf8_lossy(&data))?;
        DocumentSummary::from_state(&state)
    };

    println!("{}", "Element Summary".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "Pages".bold(), summary.page_count);
    println!("{}: {}", "Elements".bold(), summary.element_count);
    println!();
    for page in &summary.pages {
        println!(
            "  {} {:>4}  {} text, {} vector, {} image",
            "Page".dimmed(),
            page.index + 1,
            page.text_elements,
            page.vector_elements,
            page.image_elements
        );
    }

    Ok(())
}

fn cmd_apply(
    input: &Path,
    state: &Path,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let output = output.map(|p| p.to_path_buf()).unwrap_or_else(|| {
        let stem = input.file_stem().unwrap_or_default().to_string_lossy();
        PathBuf::from(format!("{}_edited.pdf", stem))
    });

    let mut service = DocumentService::with_options(LoadOptions::new().lenient());
    let name = input.file_name().unwrap_or_default().to_string_lossy();
    service.upload(&fs::read(input)?, &name)?;
    if let Some(report) = service.report() {
        print_report(report);
    }

    let state = DocumentState::from_json(&fs::read_to_string(state)?)?;
    let updated = service.replace(&state)?;
    let bytes = service.render_output()?;
    fs::write(&output, &bytes)?;

    println!(
        "{} {} ({} elements)",
        "Saved to".green(),
        output.display(),
        updated.element_count()
    );

    Ok(())
}

fn cmd_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    // Lenient: show metadata even if some text can't be read
    let loaded = load(input, &LoadOptions::new().lenient())?;
    let scene = &loaded.scene;
    let metadata = scene.metadata();

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: PDF {}", "Format".bold(), metadata.pdf_version);
    println!("{}: {}", "Pages".bold(), metadata.page_count);

    if let Some(ref title) = metadata.title {
        println!("{}: {}", "Title".bold(), title);
    }
    if let Some(ref author) = metadata.author {
        println!("{}: {}", "Author".bold(), author);
    }
    if let Some(ref creator) = metadata.creator {
        println!("{}: {}", "Creator".bold(), creator);
    }
    if let Some(ref producer) = metadata.producer {
        println!("{}: {}", "Producer".bold(), producer);
    }

    println!();
    println!("{}", "Block Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    let summary = DocumentSummary::from_scene(scene);
    let text: usize = summary.pages.iter().map(|p| p.text_elements).sum();
    let images: usize = summary.pages.iter().map(|p| p.image_elements).sum();
    let rasterized = loaded.report.pages.iter().filter(|p| p.rasterized).count();

    println!("{}: {}", "Blocks".bold(), summary.element_count);
    println!("{}: {}", "Text".bold(), text);
    println!("{}: {}", "Vector".bold(), summary.element_count - text - images);
    println!("{}: {}", "Image".bold(), images);
    println!("{}: {}", "Rasterized pages".bold(), rasterized);
    println!("{}: {}", "Warnings".bold(), loaded.report.warning_count());

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "pdfblocks".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("PDF page to editable blocks tool");
    println!();
    println!("License: MIT");
}
