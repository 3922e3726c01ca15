use clap::{Parser, ValueEnum};
use qrpath::helper::{save_png, to_svg_path, to_svg_string, to_terminal_string};
use qrpath::{encode, EncodeOptions, Mask, QrCode, QrCodeEcc, Version};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;

#[derive(Parser)]
#[command(name = "qrpath", version, about = "Encode text as a QR Code symbol")]
struct Cli {
    /// Text to encode
    text: String,

    #[arg(long, value_enum, default_value_t = Ecl::Medium)]
    ecl: Ecl,

    #[arg(long, default_value_t = 1)]
    min_version: i32,

    #[arg(long, default_value_t = 40)]
    max_version: i32,

    /// Mask pattern 0-7, or -1 to pick the lowest penalty
    #[arg(long, default_value_t = -1, allow_hyphen_values = true)]
    mask: i32,

    /// Keep the requested ECC level even if a higher one fits
    #[arg(long)]
    no_boost: bool,

    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Module size in SVG units or PNG pixels
    #[arg(long, default_value_t = 8)]
    unit: u32,

    /// Quiet zone in modules for text and PNG output
    #[arg(long, default_value_t = 4)]
    border: u32,

    /// Write to this file instead of stdout (required for PNG)
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, ValueEnum)]
enum Ecl {
    Low,
    Medium,
    Quartile,
    High,
}

impl From<Ecl> for QrCodeEcc {
    fn from(ecl: Ecl) -> Self {
        match ecl {
            Ecl::Low => QrCodeEcc::Low,
            Ecl::Medium => QrCodeEcc::Medium,
            Ecl::Quartile => QrCodeEcc::Quartile,
            Ecl::High => QrCodeEcc::High,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    /// Full SVG document
    Svg,
    /// SVG path data only
    Path,
    /// Terminal art
    Text,
    Png,
}

fn options(cli: &Cli) -> qrpath::Result<EncodeOptions> {
    let options = EncodeOptions::default()
        .with_ecl(cli.ecl.into())
        .with_version_range(
            Version::try_from(cli.min_version)?,
            Version::try_from(cli.max_version)?,
        )
        .with_mask(Mask::from_forced(cli.mask)?)
        .with_boost_ecl(!cli.no_boost);
    options.validate()?;
    Ok(options)
}

fn render(cli: &Cli, qr: &QrCode) -> Result<(), Box<dyn std::error::Error>> {
    let text = match cli.format {
        Format::Svg => to_svg_string(qr, cli.unit),
        Format::Path => to_svg_path(qr, cli.unit) + "\n",
        Format::Text => to_terminal_string(qr, cli.border as i32),
        Format::Png => {
            let path = cli.output.as_ref().ok_or("PNG output requires --output")?;
            save_png(qr, path, cli.border, cli.unit)?;
            return Ok(());
        }
    };
    match &cli.output {
        Some(path) => fs::write(path, text)?,
        None => print!("{}", text),
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let result = options(&cli)
        .and_then(|opts| encode(&cli.text, &opts))
        .map_err(Box::<dyn std::error::Error>::from)
        .and_then(|qr| {
            eprintln!(
                "version {}, ECC {:?}, mask {}, {}x{}",
                qr.version().value(),
                qr.error_correction_level(),
                qr.mask().value(),
                qr.size(),
                qr.size()
            );
            render(&cli, &qr)
        });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
