use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use clap::Parser;
use clap::Subcommand;
use miette::IntoDiagnostic;
use miette::WrapErr;
use pixcalc::{Calculator, CompressedImage, Image, Session, lex, render};

#[derive(Parser, Debug)]
struct Args {
    /// Log more, once per occurrence (error, warn, info, debug, trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the numbers and operators of an expression.
    Tokenize { expression: String },
    /// Evaluate one expression.
    Eval { expression: String },
    /// Evaluate every line of a file.
    Calc { filename: PathBuf },
    /// Compress a text grid into the packed run-length form.
    Compress {
        filename: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print a packed run-length stream back as a text grid.
    Decompress { filename: PathBuf },
    /// Draw a text grid, or a packed stream with `--packed`, as characters.
    Render {
        filename: PathBuf,
        #[arg(long)]
        packed: bool,
    },
}

fn main() -> miette::Result<()> {
    let args = Args::parse();
    init_logger(args.verbose);

    match args.command {
        Commands::Tokenize { expression } => {
            let tokens = lex::tokenize(&expression);
            for number in &tokens.numbers {
                println!("{number}");
            }
            for operator in &tokens.operators {
                println!("{operator}");
            }
        }
        Commands::Eval { expression } => {
            match Calculator::new(None, &expression).evaluate() {
                Ok(value) => println!("{value}"),
                Err(e) => {
                    eprintln!("{:?}", miette::Report::new(e));
                    std::process::exit(70);
                }
            }
        }
        Commands::Calc { filename } => {
            let file_contents = read_text(&filename)?;

            for (line, result) in Session::new(filename.to_str(), &file_contents) {
                match result {
                    Ok(value) => println!("{value}"),
                    Err(e) => {
                        eprintln!("[line {line}]");
                        eprintln!("{:?}", miette::Report::new(e));
                        std::process::exit(70);
                    }
                }
            }
        }
        Commands::Compress { filename, output } => {
            let file_contents = read_text(&filename)?;
            let image = Image::parse(filename.to_str(), &file_contents)?;
            let compressed = pixcalc::compress(&image);
            let packed = compressed.to_bytes()?;
            log::info!(
                "{} pixels -> {} runs, {} bytes packed",
                image.pixels().len(),
                compressed.runs().len(),
                packed.len()
            );

            match output {
                Some(output) => fs::write(&output, &packed)
                    .into_diagnostic()
                    .wrap_err_with(|| format!("writing `{}` failed", output.display()))?,
                None => std::io::stdout().write_all(&packed).into_diagnostic()?,
            }
        }
        Commands::Decompress { filename } => {
            let compressed = read_packed(&filename)?;
            let image = pixcalc::decompress(&compressed)?;
            print!("{image}");
        }
        Commands::Render { filename, packed } => {
            let mut stdout = std::io::stdout().lock();
            if packed {
                let compressed = read_packed(&filename)?;
                render::write_compressed(&mut stdout, &compressed).into_diagnostic()?;
            } else {
                let file_contents = read_text(&filename)?;
                let image = Image::parse(filename.to_str(), &file_contents)?;
                render::write_image(&mut stdout, &image).into_diagnostic()?;
            }
            stdout.flush().into_diagnostic()?;
        }
    }
    Ok(())
}

fn init_logger(verbosity: u8) {
    let filter_level = match verbosity {
        0 => log::LevelFilter::Error,
        1 => log::LevelFilter::Warn,
        2 => log::LevelFilter::Info,
        3 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    // <tool name> : <level> : <message>
    env_logger::builder()
        .format(|buf, record| writeln!(buf, "pixcalc : {} : {}", record.level(), record.args()))
        .filter_level(filter_level)
        .parse_default_env()
        .init();
}

fn read_text(filename: &Path) -> miette::Result<String> {
    fs::read_to_string(filename)
        .into_diagnostic()
        .wrap_err_with(|| format!("reading `{}` failed", filename.display()))
}

fn read_packed(filename: &Path) -> miette::Result<CompressedImage> {
    let data = fs::read(filename)
        .into_diagnostic()
        .wrap_err_with(|| format!("reading `{}` failed", filename.display()))?;
    CompressedImage::from_bytes(Bytes::from(data))
        .wrap_err_with(|| format!("`{}` is not a packed image", filename.display()))
}
