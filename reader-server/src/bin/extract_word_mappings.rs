//! Build the word mapping table from a phonics dictionary.
//!
//! ```bash
//! cargo run -p reader-server --bin extract_word_mappings -- dictionary.tsv word_mappings.json
//! ```
//!
//! The dictionary is tab separated: the word in the first column and its
//! `grapheme-phoneme` pairs, comma separated, in the fourth.

use reader_core::word_map::parse_phonics_dictionary;
use std::fs::File;
use std::io::BufReader;
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();
    let (input, output) = match args.as_slice() {
        [_, input, output] => (input, output),
        _ => {
            eprintln!("Usage: extract_word_mappings <dictionary.tsv> <word_mappings.json>");
            return ExitCode::FAILURE;
        }
    };

    match run(input, output) {
        Ok(count) => {
            log::info!("Extracted {count} words into {output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(input: &str, output: &str) -> Result<usize, Box<dyn std::error::Error>> {
    let reader = BufReader::new(File::open(input)?);
    let mappings = parse_phonics_dictionary(reader)?;

    for word in mappings.keys() {
        log::debug!("{word}");
    }

    std::fs::write(output, serde_json::to_string_pretty(&mappings)?)?;
    Ok(mappings.len())
}
