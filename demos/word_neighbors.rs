//! Fuzzy word lookup over a word list.
//!
//! Loads one word per line, builds a BK-tree with the Levenshtein distance and prints every word
//! within the given radius of the query.
//!
//! ```shell
//! cargo run --release --example word_neighbors -- [QUERY] [RADIUS] [WORD_LIST]
//! ```
//!
//! Defaults to querying `exaple` with radius 2 against `/usr/share/dict/words`, falling back to the
//! bundled fixture list when no system dictionary exists.

use std::env;
use std::error::Error;
use std::fs::read_to_string;
use std::path::Path;
use std::time::Instant;

use bk_index::distance::Levenshtein;
use bk_index::BKTree;

const SYSTEM_WORDS: &str = "/usr/share/dict/words";
const FIXTURE_WORDS: &str = "fixtures/words.txt";

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt::init();

    let mut args = env::args().skip(1);
    let query = args.next().unwrap_or_else(|| "exaple".to_string());
    let radius: usize = match args.next() {
        Some(radius) => radius.parse()?,
        None => 2,
    };
    let path = args.next().unwrap_or_else(|| {
        if Path::new(SYSTEM_WORDS).exists() {
            SYSTEM_WORDS.to_string()
        } else {
            FIXTURE_WORDS.to_string()
        }
    });

    let contents = read_to_string(&path)?;
    let words = contents.lines().map(str::trim).filter(|word| !word.is_empty());

    let start = Instant::now();
    let tree = BKTree::with_elements(Levenshtein, words)?;
    tracing::info!(
        words = tree.len(),
        elapsed = ?start.elapsed(),
        "loaded word list from {}",
        path
    );

    let start = Instant::now();
    let neighbors = tree.nearest_neighbors(&query.as_str(), radius);
    tracing::info!(matches = neighbors.len(), elapsed = ?start.elapsed(), "searched");

    println!("| Neighbor | Distance |");
    println!("|----------|----------|");
    for neighbor in neighbors {
        println!("| {:<8} | {:<8} |", neighbor.value, neighbor.distance);
    }

    Ok(())
}
