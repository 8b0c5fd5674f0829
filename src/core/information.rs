// information.rs - Shannon entropy and information content of one column

/// Symbol frequencies observed in one column of a lineage
#[derive(Debug, Clone)]
pub struct SymbolCounts {
    counts: [usize; 256],
    total: usize,
}

impl SymbolCounts {
    pub fn from_symbols<I: IntoIterator<Item = u8>>(symbols: I) -> Self {
        let mut counts = [0usize; 256];
        let mut total = 0;
        for symbol in symbols {
            counts[symbol as usize] += 1;
            total += 1;
        }
        Self { counts, total }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn count(&self, symbol: u8) -> usize {
        self.counts[symbol as usize]
    }

    /// Fraction of observations equal to `symbol` (0 for an empty column)
    pub fn frequency(&self, symbol: u8) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.count(symbol) as f64 / self.total as f64
    }

    /// Base-2 Shannon entropy of the empirical distribution
    pub fn entropy(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        let n = self.total as f64;
        let h: f64 = self
            .counts
            .iter()
            .filter(|&&c| c > 0)
            .map(|&c| {
                let p = c as f64 / n;
                -p * p.log2()
            })
            .sum();
        // A single-symbol column can round to -0.0
        h.max(0.0)
    }
}

/// Information content `max_entropy - H`, clamped to `[0, max_entropy]`.
///
/// Symbols outside the scored alphabet can push the entropy above the
/// alphabet bound; such columns carry no information.
pub fn information_content(counts: &SymbolCounts, max_entropy: f64) -> f64 {
    (max_entropy - counts.entropy()).clamp(0.0, max_entropy)
}
