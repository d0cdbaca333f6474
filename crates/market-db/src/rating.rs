/// Review scores of one app, kept as an integer sum so the average can be
/// rounded exactly.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RatingTotals {
    pub sum: i64,
    pub count: i64,
}

impl RatingTotals {
    pub fn from_scores<I: IntoIterator<Item = i64>>(scores: I) -> Self {
        scores.into_iter().fold(Self::default(), |acc, score| Self {
            sum: acc.sum + score,
            count: acc.count + 1,
        })
    }

    /// Mean score rounded to one decimal, half away from zero; 0 without reviews.
    pub fn average(&self) -> f64 {
        if self.count <= 0 {
            return 0.0;
        }
        // round(10 * sum / count) on integers: add half the divisor before dividing.
        let numerator = 20 * self.sum.abs() + self.count;
        let tenths = numerator / (2 * self.count);
        let tenths = if self.sum < 0 { -tenths } else { tenths };
        tenths as f64 / 10.0
    }
}
