//! Chart and palm readings, and the per-session cache that holds them.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::zodiac::ZodiacSign;

/// Astrology reading for the profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartReading {
    pub sun_sign: ZodiacSign,
    pub moon_sign: String,
    pub ascendant: String,
    pub prediction: String,
    pub power_word: String,
    pub lucky_color: String,
    pub compatibility_note: String,
}

impl ChartReading {
    /// Canned reading used when generation fails.
    pub fn fallback() -> Self {
        Self {
            sun_sign: ZodiacSign::Aquarius,
            moon_sign: "Virgo".to_string(),
            ascendant: "Libra".to_string(),
            prediction: "The stars align to bring new opportunities in your career sector. \
                         Embrace the unexpected."
                .to_string(),
            power_word: "Transformation".to_string(),
            lucky_color: "Teal".to_string(),
            compatibility_note: "Air and fire signs bring out your boldest side.".to_string(),
        }
    }

    /// Replace the sun sign with the one computed from `birth_date`.
    ///
    /// The calendar always wins over whatever the model said. If the date
    /// does not parse the reading is returned as is.
    pub fn with_sun_sign_from(mut self, birth_date: &str) -> Self {
        match ZodiacSign::for_date_str(birth_date) {
            Some(sign) => {
                if sign != self.sun_sign {
                    debug!(model = %self.sun_sign, computed = %sign, "Overriding sun sign");
                }
                self.sun_sign = sign;
            }
            None => warn!(birth_date, "Birth date does not parse, keeping model sun sign"),
        }
        self
    }
}

/// Palmistry reading for the uploaded photo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PalmReading {
    pub love_score: u8,
    pub health_score: u8,
    pub wisdom_score: u8,
    pub career_score: u8,
    pub love_text: String,
    pub health_text: String,
    pub wisdom_text: String,
    pub career_text: String,
    pub summary: String,
    pub dominant_hand_prediction: String,
}

impl PalmReading {
    /// Canned reading used when analysis fails.
    pub fn fallback() -> Self {
        Self {
            love_score: 78,
            health_score: 88,
            wisdom_score: 82,
            career_score: 91,
            love_text: "Your Heart Line indicates a passionate nature.".to_string(),
            health_text: "Strong vitality is shown in your Life Line.".to_string(),
            wisdom_text: "A clear thinker with practical solutions.".to_string(),
            career_text: "Success is indicated through persistence.".to_string(),
            summary: "Your palm reveals a balanced life with strong potential for leadership."
                .to_string(),
            dominant_hand_prediction: "Your dominant hand shows a future you are already \
                                       shaping with quiet determination."
                .to_string(),
        }
    }

    /// The four trait scores as (label, score) pairs, in display order.
    pub fn scores(&self) -> [(&'static str, u8); 4] {
        [
            ("Love", self.love_score),
            ("Health", self.health_score),
            ("Wisdom", self.wisdom_score),
            ("Career", self.career_score),
        ]
    }
}

/// A cache slot as seen by a screen.
#[derive(Debug, PartialEq, Eq)]
pub enum ReadingView<'a, T> {
    Pending,
    Ready(&'a T),
}

impl<T> Clone for ReadingView<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ReadingView<'_, T> {}

impl<'a, T> ReadingView<'a, T> {
    pub fn ready(&self) -> Option<&'a T> {
        match self {
            Self::Ready(r) => Some(r),
            Self::Pending => None,
        }
    }
}

/// The two generated readings for the current session.
///
/// Each slot is written at most once until `clear`.
#[derive(Debug, Clone, Default)]
pub struct ResultCache {
    chart: Option<ChartReading>,
    palm: Option<PalmReading>,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chart(&self) -> ReadingView<'_, ChartReading> {
        match &self.chart {
            Some(r) => ReadingView::Ready(r),
            None => ReadingView::Pending,
        }
    }

    pub fn palm(&self) -> ReadingView<'_, PalmReading> {
        match &self.palm {
            Some(r) => ReadingView::Ready(r),
            None => ReadingView::Pending,
        }
    }

    pub fn has_chart(&self) -> bool {
        self.chart.is_some()
    }

    pub fn has_palm(&self) -> bool {
        self.palm.is_some()
    }

    /// Fill the chart slot. Returns false, leaving the slot alone, if it was
    /// already filled.
    pub fn store_chart(&mut self, reading: ChartReading) -> bool {
        if self.chart.is_some() {
            warn!("Chart slot already filled, ignoring new reading");
            return false;
        }
        self.chart = Some(reading);
        true
    }

    /// Fill the palm slot. Same write-once rule as `store_chart`.
    pub fn store_palm(&mut self, reading: PalmReading) -> bool {
        if self.palm.is_some() {
            warn!("Palm slot already filled, ignoring new reading");
            return false;
        }
        self.palm = Some(reading);
        true
    }

    pub fn clear(&mut self) {
        self.chart = None;
        self.palm = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_cache_reads_pending() {
        let cache = ResultCache::new();
        assert_eq!(cache.chart(), ReadingView::Pending);
        assert_eq!(cache.palm(), ReadingView::Pending);
        assert!(cache.chart().ready().is_none());
    }

    #[test]
    fn slots_are_write_once() {
        let mut cache = ResultCache::new();
        assert!(cache.store_chart(ChartReading::fallback()));

        let mut other = ChartReading::fallback();
        other.power_word = "Second".into();
        assert!(!cache.store_chart(other));
        assert_eq!(cache.chart().ready().unwrap().power_word, "Transformation");

        assert!(cache.store_palm(PalmReading::fallback()));
        assert!(!cache.store_palm(PalmReading::fallback()));
    }

    #[test]
    fn clear_empties_both_slots() {
        let mut cache = ResultCache::new();
        cache.store_chart(ChartReading::fallback());
        cache.store_palm(PalmReading::fallback());
        cache.clear();
        assert!(!cache.has_chart());
        assert!(!cache.has_palm());

        // Writable again after a clear.
        assert!(cache.store_chart(ChartReading::fallback()));
    }

    #[test]
    fn sun_sign_comes_from_calendar() {
        let reading = ChartReading::fallback().with_sun_sign_from("1975-07-23");
        assert_eq!(reading.sun_sign, ZodiacSign::Leo);

        let kept = ChartReading::fallback().with_sun_sign_from("sometime in spring");
        assert_eq!(kept.sun_sign, ZodiacSign::Aquarius);
    }

    #[test]
    fn fallback_scores_in_range() {
        let palm = PalmReading::fallback();
        for (label, score) in palm.scores() {
            assert!(score <= 100, "{label} out of range");
        }
        assert_eq!(palm.scores()[3], ("Career", 91));
    }

    #[test]
    fn chart_wire_format_is_camel_case() {
        let json = serde_json::to_value(ChartReading::fallback()).unwrap();
        assert_eq!(json["sunSign"], "Aquarius");
        assert_eq!(json["powerWord"], "Transformation");
        assert!(json.get("compatibilityNote").is_some());
    }
}
