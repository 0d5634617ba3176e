//! Dictionary optimizer driver.
//!
//! Operates on JSON datafiles produced by the font importer. Committed
//! optimizer moves are logged at debug level; run with
//! `RUST_LOG=krympa=debug` to watch the search.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use krympa::{
    decode_glyph, encode_font, encoded_size, get_encoded_size, init_dictionary, optimize,
    optimize_bigjump, DataFile, DICTIONARY_SIZE,
};

#[derive(Parser)]
#[command(name = "krympa")]
#[command(version, about = "Compress monochrome bitmap fonts")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed the dictionary with repeated glyph substrings.
    InitDict {
        /// Datafile to modify in place.
        file: PathBuf,
    },
    /// Run the randomized dictionary optimizer.
    Optimize {
        /// Datafile to modify in place.
        file: PathBuf,

        /// Rounds of mutation operators to run.
        #[arg(short, long, default_value_t = 1000)]
        iterations: usize,

        /// Finish with a clear-and-rebuild escape attempt.
        #[arg(long)]
        bigjump: bool,
    },
    /// Print the encoded size of the font.
    Size {
        file: PathBuf,
    },
    /// Decode one glyph and print it as ASCII art.
    Show {
        file: PathBuf,

        /// Glyph index.
        glyph: usize,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    if let Err(error) = run(cli.command) {
        eprintln!("{error}");
        std::process::exit(1);
    }
}

fn run(command: Commands) -> krympa::Result<()> {
    match command {
        Commands::InitDict { file } => {
            let mut datafile = DataFile::load(&file)?;
            init_dictionary(&mut datafile);
            datafile.save(&file)?;
            println!("seeded {DICTIONARY_SIZE} dictionary slots");
        }
        Commands::Optimize {
            file,
            iterations,
            bigjump,
        } => {
            let mut datafile = DataFile::load(&file)?;
            let before = encoded_size(&datafile)?;
            optimize(&mut datafile, iterations)?;
            if bigjump {
                optimize_bigjump(&mut datafile)?;
            }
            let after = encoded_size(&datafile)?;
            datafile.save(&file)?;
            println!("{before} -> {after} bytes");
        }
        Commands::Size { file } => {
            let datafile = DataFile::load(&file)?;
            let encoded = encode_font(&datafile)?;
            let rle: usize = encoded.rle_dictionary.iter().map(Vec::len).sum();
            let refs: usize = encoded.ref_dictionary.iter().map(Vec::len).sum();
            let glyphs: usize = encoded.glyphs.iter().map(Vec::len).sum();
            println!("RLE dictionary:  {rle} bytes in {} entries", encoded.rle_dictionary.len());
            println!("ref dictionary:  {refs} bytes in {} entries", encoded.ref_dictionary.len());
            println!("glyphs:          {glyphs} bytes in {} entries", encoded.glyphs.len());
            println!("total with offsets: {} bytes", get_encoded_size(&encoded));
        }
        Commands::Show { file, glyph } => {
            let datafile = DataFile::load(&file)?;
            let encoded = encode_font(&datafile)?;
            let bits = decode_glyph(&encoded, glyph, datafile.fontinfo())?;
            let width = datafile.fontinfo().max_width as usize;
            for row in bits.chunks(width) {
                let line: String = row.iter().map(|&bit| if bit { '#' } else { '.' }).collect();
                println!("{line}");
            }
        }
    }
    Ok(())
}
