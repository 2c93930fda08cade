//! Sun sign lookup from a calendar date.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// The twelve tropical zodiac signs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZodiacSign {
    Aries,
    Taurus,
    Gemini,
    Cancer,
    Leo,
    Virgo,
    Libra,
    Scorpio,
    Sagittarius,
    Capricorn,
    Aquarius,
    Pisces,
}

impl ZodiacSign {
    pub const ALL: [ZodiacSign; 12] = [
        Self::Aries,
        Self::Taurus,
        Self::Gemini,
        Self::Cancer,
        Self::Leo,
        Self::Virgo,
        Self::Libra,
        Self::Scorpio,
        Self::Sagittarius,
        Self::Capricorn,
        Self::Aquarius,
        Self::Pisces,
    ];

    /// Sun sign for a calendar date.
    pub fn for_date(date: NaiveDate) -> Self {
        // (month, first day of the later sign, sign before the cusp, sign from it)
        const CUSPS: [(u32, u32, ZodiacSign, ZodiacSign); 12] = [
            (1, 20, ZodiacSign::Capricorn, ZodiacSign::Aquarius),
            (2, 19, ZodiacSign::Aquarius, ZodiacSign::Pisces),
            (3, 21, ZodiacSign::Pisces, ZodiacSign::Aries),
            (4, 20, ZodiacSign::Aries, ZodiacSign::Taurus),
            (5, 21, ZodiacSign::Taurus, ZodiacSign::Gemini),
            (6, 21, ZodiacSign::Gemini, ZodiacSign::Cancer),
            (7, 23, ZodiacSign::Cancer, ZodiacSign::Leo),
            (8, 23, ZodiacSign::Leo, ZodiacSign::Virgo),
            (9, 23, ZodiacSign::Virgo, ZodiacSign::Libra),
            (10, 23, ZodiacSign::Libra, ZodiacSign::Scorpio),
            (11, 22, ZodiacSign::Scorpio, ZodiacSign::Sagittarius),
            (12, 22, ZodiacSign::Sagittarius, ZodiacSign::Capricorn),
        ];

        let (_, cusp_day, before, after) = CUSPS[date.month0() as usize];
        if date.day() < cusp_day { before } else { after }
    }

    /// Sun sign for a `YYYY-MM-DD` string, if it parses.
    pub fn for_date_str(date: &str) -> Option<Self> {
        NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
            .ok()
            .map(Self::for_date)
    }
}

impl std::fmt::Display for ZodiacSign {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl std::str::FromStr for ZodiacSign {
    type Err = String;

    /// Case-insensitive; model output is not trusted to match our casing.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|sign| sign.to_string().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("unknown zodiac sign: {wanted}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign(date: &str) -> ZodiacSign {
        ZodiacSign::for_date_str(date).unwrap()
    }

    #[test]
    fn known_dates() {
        assert_eq!(sign("1990-03-21"), ZodiacSign::Aries);
        assert_eq!(sign("2000-12-22"), ZodiacSign::Capricorn);
        assert_eq!(sign("1975-07-23"), ZodiacSign::Leo);
    }

    #[test]
    fn cusp_edges() {
        assert_eq!(sign("1990-03-20"), ZodiacSign::Pisces);
        assert_eq!(sign("2000-12-21"), ZodiacSign::Sagittarius);
        assert_eq!(sign("1975-07-22"), ZodiacSign::Cancer);
        assert_eq!(sign("1984-01-19"), ZodiacSign::Capricorn);
        assert_eq!(sign("1984-01-20"), ZodiacSign::Aquarius);
        assert_eq!(sign("1992-02-29"), ZodiacSign::Pisces);
        assert_eq!(sign("1999-12-31"), ZodiacSign::Capricorn);
    }

    #[test]
    fn unparseable_date_has_no_sign() {
        assert!(ZodiacSign::for_date_str("").is_none());
        assert!(ZodiacSign::for_date_str("21/03/1990").is_none());
        assert!(ZodiacSign::for_date_str("1990-02-30").is_none());
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("leo".parse::<ZodiacSign>().unwrap(), ZodiacSign::Leo);
        assert_eq!(" SCORPIO ".parse::<ZodiacSign>().unwrap(), ZodiacSign::Scorpio);
        assert!("Ophiuchus".parse::<ZodiacSign>().is_err());
    }
}
