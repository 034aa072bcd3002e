use anyhow::Result;
use statement_extractor::{core::ParserConfig, input, ParsePipeline};
use std::path::PathBuf;
use structopt::StructOpt;

#[derive(StructOpt, Debug)]
#[structopt(
    name = "statement-extractor",
    about = "Extract confidence-scored financial statements from filing text"
)]
struct Opt {
    /// Extracted filing text
    #[structopt(parse(from_os_str))]
    input: PathBuf,

    /// JSON array of OCR words with positions, enables table reconstruction
    #[structopt(long, parse(from_os_str))]
    words: Option<PathBuf>,

    /// JSON parser configuration; defaults come from the environment
    #[structopt(long, parse(from_os_str))]
    config: Option<PathBuf>,

    /// Print the flat legacy projection instead of the full result
    #[structopt(long)]
    legacy: bool,

    #[structopt(long)]
    pretty: bool,
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();
    let opt = Opt::from_args();

    if !opt.input.exists() {
        eprintln!("Input file does not exist: {:?}", opt.input);
        std::process::exit(1);
    }

    let config = match &opt.config {
        Some(path) => ParserConfig::from_file(path)?,
        None => ParserConfig::from_env()?,
    };

    let text = input::load_text(&opt.input)?;
    let words = opt
        .words
        .as_deref()
        .map(input::load_positioned_words)
        .transpose()?;

    let result = ParsePipeline::new(config).parse(&text, words.as_deref());
    log::info!(
        "{}: confidence {}, {} warning(s)",
        opt.input.display(),
        result.confidence_score,
        result.warnings.len()
    );

    let output = if opt.legacy {
        result.to_legacy_json()
    } else {
        serde_json::to_value(&result)?
    };
    if opt.pretty {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", output);
    }
    Ok(())
}
