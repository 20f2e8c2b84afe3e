use std::fmt;

/// Weighted 1D histogram serving as both booking specification and results
/// container.
#[derive(Debug, Clone)]
pub struct Histogram {
    pub title: String,
    pub bins: usize,
    pub lower: f64,
    pub upper: f64,

    // Results fields (populated during simulation)
    pub counts: Vec<f64>,
    pub underflow: f64,
    pub overflow: f64,
    pub entries: u64,
    // Weighted moments over in-range fills
    sum_w: f64,
    sum_wx: f64,
    sum_wx2: f64,
}

impl Histogram {
    pub fn new(title: &str, bins: usize, lower: f64, upper: f64) -> Self {
        Self {
            title: title.to_string(),
            bins,
            lower,
            upper,
            counts: vec![0.0; bins],
            underflow: 0.0,
            overflow: 0.0,
            entries: 0,
            sum_w: 0.0,
            sum_wx: 0.0,
            sum_wx2: 0.0,
        }
    }

    pub fn fill(&mut self, value: f64) {
        self.fill_weighted(value, 1.0);
    }

    pub fn fill_weighted(&mut self, value: f64, weight: f64) {
        self.entries += 1;
        if value < self.lower {
            self.underflow += weight;
            return;
        }
        if value >= self.upper {
            self.overflow += weight;
            return;
        }
        let width = (self.upper - self.lower) / self.bins as f64;
        let bin = ((value - self.lower) / width) as usize;
        // value just below upper can round up to bins
        let bin = bin.min(self.bins - 1);
        self.counts[bin] += weight;
        self.sum_w += weight;
        self.sum_wx += weight * value;
        self.sum_wx2 += weight * value * value;
    }

    /// Weighted mean of in-range fills.
    pub fn mean(&self) -> f64 {
        if self.sum_w > 0.0 {
            self.sum_wx / self.sum_w
        } else {
            0.0
        }
    }

    /// Weighted standard deviation of in-range fills.
    pub fn std_dev(&self) -> f64 {
        if self.sum_w <= 0.0 {
            return 0.0;
        }
        let mean = self.mean();
        (self.sum_wx2 / self.sum_w - mean * mean).max(0.0).sqrt()
    }

    pub fn total_weight(&self) -> f64 {
        self.sum_w + self.underflow + self.overflow
    }
}

impl fmt::Display for Histogram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Histogram: {}", self.title)?;
        writeln!(f, "  Range: [{}, {}) in {} bins", self.lower, self.upper, self.bins)?;
        writeln!(f, "  Entries: {}", self.entries)?;
        writeln!(f, "  Mean: {:.6}", self.mean())?;
        writeln!(f, "  Std Dev: {:.6}", self.std_dev())?;
        writeln!(f, "  Underflow: {:.3}  Overflow: {:.3}", self.underflow, self.overflow)?;
        write!(f, "  Counts: {:?}", self.counts)
    }
}

/// Weighted 2D histogram, row-major in x.
#[derive(Debug, Clone)]
pub struct Histogram2D {
    pub title: String,
    pub x_bins: usize,
    pub x_lower: f64,
    pub x_upper: f64,
    pub y_bins: usize,
    pub y_lower: f64,
    pub y_upper: f64,
    pub counts: Vec<f64>,
    /// Weight landing outside either axis range.
    pub out_of_range: f64,
    pub entries: u64,
}

impl Histogram2D {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        title: &str,
        x_bins: usize,
        x_lower: f64,
        x_upper: f64,
        y_bins: usize,
        y_lower: f64,
        y_upper: f64,
    ) -> Self {
        Self {
            title: title.to_string(),
            x_bins,
            x_lower,
            x_upper,
            y_bins,
            y_lower,
            y_upper,
            counts: vec![0.0; x_bins * y_bins],
            out_of_range: 0.0,
            entries: 0,
        }
    }

    pub fn fill_weighted(&mut self, x: f64, y: f64, weight: f64) {
        self.entries += 1;
        if x < self.x_lower || x >= self.x_upper || y < self.y_lower || y >= self.y_upper {
            self.out_of_range += weight;
            return;
        }
        let x_width = (self.x_upper - self.x_lower) / self.x_bins as f64;
        let y_width = (self.y_upper - self.y_lower) / self.y_bins as f64;
        let i = (((x - self.x_lower) / x_width) as usize).min(self.x_bins - 1);
        let j = (((y - self.y_lower) / y_width) as usize).min(self.y_bins - 1);
        self.counts[i * self.y_bins + j] += weight;
    }

    pub fn bin(&self, i: usize, j: usize) -> f64 {
        self.counts[i * self.y_bins + j]
    }

    pub fn total_weight(&self) -> f64 {
        self.counts.iter().sum::<f64>() + self.out_of_range
    }
}

impl fmt::Display for Histogram2D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Histogram2D: {}", self.title)?;
        writeln!(
            f,
            "  x: [{}, {}) in {} bins; y: [{}, {}) in {} bins",
            self.x_lower, self.x_upper, self.x_bins, self.y_lower, self.y_upper, self.y_bins
        )?;
        writeln!(f, "  Entries: {}", self.entries)?;
        write!(
            f,
            "  In-range weight: {:.3}  Out of range: {:.3}",
            self.total_weight() - self.out_of_range,
            self.out_of_range
        )
    }
}

/// The run's booked histograms, filled during event generation and
/// rendered together at the end of the run.
#[derive(Debug, Clone, Default)]
pub struct HistogramSet {
    histograms: Vec<Histogram>,
    histograms_2d: Vec<Histogram2D>,
}

impl HistogramSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Books a histogram and returns its handle for later fills.
    pub fn book(&mut self, title: &str, bins: usize, lower: f64, upper: f64) -> usize {
        self.histograms.push(Histogram::new(title, bins, lower, upper));
        self.histograms.len() - 1
    }

    pub fn fill(&mut self, id: usize, value: f64, weight: f64) {
        if let Some(h) = self.histograms.get_mut(id) {
            h.fill_weighted(value, weight);
        }
    }

    pub fn get(&self, id: usize) -> Option<&Histogram> {
        self.histograms.get(id)
    }

    /// Books a 2D histogram and returns its handle for later fills.
    #[allow(clippy::too_many_arguments)]
    pub fn book_2d(
        &mut self,
        title: &str,
        x_bins: usize,
        x_lower: f64,
        x_upper: f64,
        y_bins: usize,
        y_lower: f64,
        y_upper: f64,
    ) -> usize {
        self.histograms_2d.push(Histogram2D::new(
            title, x_bins, x_lower, x_upper, y_bins, y_lower, y_upper,
        ));
        self.histograms_2d.len() - 1
    }

    pub fn fill_2d(&mut self, id: usize, x: f64, y: f64, weight: f64) {
        if let Some(h) = self.histograms_2d.get_mut(id) {
            h.fill_weighted(x, y, weight);
        }
    }

    pub fn get_2d(&self, id: usize) -> Option<&Histogram2D> {
        self.histograms_2d.get(id)
    }

    /// Renders every booked histogram to the writer.
    pub fn render_all<W: std::io::Write>(&self, out: &mut W) -> std::io::Result<()> {
        for h in &self.histograms {
            writeln!(out, "{h}")?;
        }
        for h in &self.histograms_2d {
            writeln!(out, "{h}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_lands_in_expected_bin() {
        let mut h = Histogram::new("energy", 10, 0.0, 10.0);
        h.fill(3.5);
        assert_eq!(h.counts[3], 1.0);
        assert_eq!(h.entries, 1);
    }

    #[test]
    fn test_under_and_overflow_are_separated() {
        let mut h = Histogram::new("energy", 4, 0.0, 4.0);
        h.fill(-1.0);
        h.fill(4.0); // upper edge goes to overflow
        h.fill(7.0);
        assert_eq!(h.underflow, 1.0);
        assert_eq!(h.overflow, 2.0);
        assert_eq!(h.counts.iter().sum::<f64>(), 0.0);
        assert_eq!(h.entries, 3);
    }

    #[test]
    fn test_weighted_moments() {
        let mut h = Histogram::new("x", 100, 0.0, 10.0);
        h.fill_weighted(2.0, 1.0);
        h.fill_weighted(4.0, 3.0);
        // mean = (2 + 12) / 4 = 3.5
        assert!((h.mean() - 3.5).abs() < 1e-12);
        let var: f64 = (1.0 * 4.0 + 3.0 * 16.0) / 4.0 - 3.5 * 3.5;
        assert!((h.std_dev() - var.sqrt()).abs() < 1e-12);
        assert!((h.total_weight() - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_weight_fill_counts_entry_only() {
        let mut h = Histogram::new("x", 10, 0.0, 1.0);
        h.fill_weighted(0.5, 0.0);
        assert_eq!(h.entries, 1);
        assert_eq!(h.counts[5], 0.0);
        assert_eq!(h.mean(), 0.0);
    }

    #[test]
    fn test_2d_fill_lands_in_expected_bin() {
        let mut h = Histogram2D::new("x-y", 10, -5.0, 5.0, 10, -5.0, 5.0);
        h.fill_weighted(-4.9, 4.9, 2.0);
        assert_eq!(h.bin(0, 9), 2.0);
        assert_eq!(h.entries, 1);
        assert_eq!(h.out_of_range, 0.0);
    }

    #[test]
    fn test_2d_out_of_range_weight_is_kept() {
        let mut h = Histogram2D::new("x-y", 4, 0.0, 1.0, 4, 0.0, 1.0);
        h.fill_weighted(0.5, 1.5, 0.7);
        h.fill_weighted(-0.1, 0.5, 0.3);
        assert_eq!(h.out_of_range, 1.0);
        assert_eq!(h.total_weight(), 1.0);
        assert_eq!(h.counts.iter().sum::<f64>(), 0.0);
    }

    #[test]
    fn test_set_books_and_fills_2d_by_handle() {
        let mut set = HistogramSet::new();
        let id = set.book_2d("at plane", 20, -2.0, 2.0, 20, -2.0, 2.0);
        set.fill_2d(id, 0.1, -0.1, 0.5);
        let h = set.get_2d(id).unwrap();
        assert_eq!(h.entries, 1);
        assert!((h.total_weight() - 0.5).abs() < 1e-15);
    }

    #[test]
    fn test_set_books_and_fills_by_handle() {
        let mut set = HistogramSet::new();
        let a = set.book("nu_e energy", 10, 0.0, 5.0);
        let b = set.book("nu_mu energy", 10, 0.0, 5.0);
        set.fill(a, 1.0, 1.0);
        set.fill(b, 2.0, 0.5);
        assert_eq!(set.get(a).unwrap().entries, 1);
        assert!((set.get(b).unwrap().total_weight() - 0.5).abs() < 1e-15);
    }
}
