use colored::Colorize;
use std::fs;
use std::path::Path;

use credimanager_core::seed;
use credimanager_core::types::LoanBook;

/// Load the book snapshot.
///
/// A missing file is a normal first run and loads the built-in starter
/// book quietly; an unreadable file falls back to the starter book with a
/// warning so a typo in `--state` cannot silently shadow real data.
pub fn load(path: &Path) -> LoanBook {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(_) => return seed::seed_book(),
    };

    match LoanBook::from_json(&contents) {
        Ok(book) => book,
        Err(e) => {
            eprintln!(
                "{}: snapshot '{}' is unreadable ({}); starting from the built-in book",
                "warning".yellow().bold(),
                path.display(),
                e
            );
            seed::seed_book()
        }
    }
}

/// Persist the book snapshot as pretty-printed JSON.
pub fn save(path: &Path, book: &LoanBook) -> Result<(), Box<dyn std::error::Error>> {
    let raw = book.to_json()?;
    fs::write(path, raw)
        .map_err(|e| format!("Failed to write '{}': {}", path.display(), e))?;
    Ok(())
}
