use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use pulse_core::{PulseError, PulseResult};

/// Symbol -> company name mapping merged from one or more exchange listing
/// files. Sources are merged in the order given; the first name seen for a
/// symbol wins, so file order is the duplicate tie-break.
#[derive(Debug, Clone, Default)]
pub struct TickerCatalog {
    symbols: HashMap<String, String>,
}

impl TickerCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one tab-delimited `symbol<TAB>name` source into the catalog.
    /// Lines with fewer than two fields are skipped. Returns the number of
    /// symbols added (duplicates of already-loaded symbols don't count).
    pub fn load_reader<R: BufRead>(&mut self, reader: R) -> PulseResult<usize> {
        let mut added = 0;
        for line in reader.lines() {
            let line = line.map_err(|e| PulseError::Catalog(e.to_string()))?;
            let mut fields = line.trim().split('\t');
            let (Some(symbol), Some(name)) = (fields.next(), fields.next()) else {
                continue;
            };
            if symbol.is_empty() || name.is_empty() {
                continue;
            }
            if !self.symbols.contains_key(symbol) {
                self.symbols.insert(symbol.to_string(), name.to_string());
                added += 1;
            }
        }
        Ok(added)
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.symbols.contains_key(symbol)
    }

    pub fn name_of(&self, symbol: &str) -> Option<&str> {
        self.symbols.get(symbol).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

/// Load the catalog from listing files in priority order. A missing or
/// unreadable file is fatal: without reference data the whole run is
/// meaningless.
pub fn load_catalog_files<P: AsRef<Path>>(paths: &[P]) -> PulseResult<TickerCatalog> {
    let mut catalog = TickerCatalog::new();
    for path in paths {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            PulseError::Catalog(format!("cannot open {}: {}", path.display(), e))
        })?;
        let added = catalog.load_reader(BufReader::new(file))?;
        tracing::debug!("Loaded {} symbols from {}", added, path.display());
    }
    tracing::info!("Ticker catalog ready: {} symbols", catalog.len());
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tab_delimited_lines() {
        let mut catalog = TickerCatalog::new();
        let added = catalog
            .load_reader("GME\tGameStop Corp.\nAMC\tAMC Entertainment\n".as_bytes())
            .unwrap();

        assert_eq!(added, 2);
        assert_eq!(catalog.name_of("GME"), Some("GameStop Corp."));
        assert!(catalog.contains("AMC"));
        assert!(!catalog.contains("TSLA"));
    }

    #[test]
    fn skips_malformed_rows() {
        let mut catalog = TickerCatalog::new();
        let input = "GME\tGameStop Corp.\nJUSTASYMBOL\n\nAMC\tAMC Entertainment\n";
        let added = catalog.load_reader(input.as_bytes()).unwrap();

        assert_eq!(added, 2);
        assert!(!catalog.contains("JUSTASYMBOL"));
    }

    #[test]
    fn first_loaded_name_wins_on_duplicates() {
        let mut catalog = TickerCatalog::new();
        catalog.load_reader("GME\tGameStop Corp.\n".as_bytes()).unwrap();
        let added = catalog
            .load_reader("GME\tGameStop (duplicate listing)\n".as_bytes())
            .unwrap();

        assert_eq!(added, 0);
        assert_eq!(catalog.name_of("GME"), Some("GameStop Corp."));
    }

    #[test]
    fn missing_file_is_fatal() {
        let result = load_catalog_files(&["/nonexistent/NASDAQ.txt"]);
        assert!(result.is_err());
    }
}
