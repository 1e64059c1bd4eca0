use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use log::LevelFilter;

use securite_travailleurs::brochure::GenerateOptions;
use securite_travailleurs::OUTPUT_FILENAME;

/// Generates the "La Sécurité des Travailleurs" brochure as a PDF.
///
/// Text metrics come from the Liberation Sans family; see `SECURITE_PDF_FONTS_DIR` in the
/// library's `fonts` module for the search order.
#[derive(Parser)]
#[command(author, version, about = "Génère la brochure « La Sécurité des Travailleurs » en PDF")]
struct Cli {
    /// Output file.
    #[arg(short, long, value_name = "FILE", default_value = OUTPUT_FILENAME)]
    output: PathBuf,

    /// Skip section bookmarks and descriptive metadata.
    #[arg(long)]
    no_outline: bool,

    /// Log debug details about fonts and layout.
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let options = GenerateOptions {
        outline: !cli.no_outline,
    };

    match securite_travailleurs::generate_document_to(&cli.output, options) {
        Ok(path) => println!("✓ PDF créé avec succès : {}", path.display()),
        Err(err) => {
            eprintln!("Erreur : {}", err);
            print_error_sources(&err);
            std::process::exit(1);
        }
    }
}

fn print_error_sources(mut error: &(dyn Error + 'static)) {
    while let Some(source) = error.source() {
        eprintln!("  caused by: {}", source);
        error = source;
    }
}
