//! Fix sentence parsing

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::warn;
use thiserror::Error;

// Internal
use super::MAX_CONSEC_PARSE_ERRORS;
use comms_if::eqpt::gps::GpsFix;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Converts raw fix sentences into position fixes.
///
/// A single corrupted sentence must not produce an abrupt fix change, so the
/// last known-good fix is returned until [`MAX_CONSEC_PARSE_ERRORS`]
/// consecutive failures have been seen, after which the fix-lost sentinel is
/// returned until a sentence parses again.
pub struct PositionParser {
    /// Consecutive parse failures seen so far
    num_errors: u32,

    /// The last fix which parsed successfully
    latest_fix: GpsFix,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors raised when converting a single fix sentence.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Sentence has too few fields ({0})")]
    MissingFields(usize),

    #[error("Could not convert the {0} field to a number: {1}")]
    NumericField(&'static str, std::num::ParseFloatError),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for PositionParser {
    fn default() -> Self {
        Self {
            num_errors: 0,
            latest_fix: GpsFix::FIX_LOST,
        }
    }
}

impl PositionParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one raw sentence from the receiver.
    ///
    /// Sentences without the fix-data talker are ignored and yield `None`,
    /// which is not an error, just no data this call. For fix sentences a
    /// position is always returned, with failures absorbed by the recovery
    /// policy described on the struct.
    pub fn feed(&mut self, sentence: &str) -> Option<GpsFix> {
        if !sentence.contains("$GPGGA") {
            return None;
        }

        match parse_gga(sentence) {
            Ok(fix) => {
                self.num_errors = 0;
                self.latest_fix = fix;
                Some(fix)
            },
            Err(e) => {
                self.num_errors = self.num_errors.saturating_add(1);
                warn!(
                    "Could not parse fix sentence ({} consecutive failures): {}",
                    self.num_errors, e
                );

                if self.num_errors < MAX_CONSEC_PARSE_ERRORS
                    && !self.latest_fix.is_fix_lost()
                {
                    Some(self.latest_fix)
                }
                else {
                    Some(GpsFix::FIX_LOST)
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Convert a single GGA sentence into a fix.
///
/// Latitude and longitude arrive as degrees-and-decimal-minutes (`ddmm.mmm`)
/// and are converted to decimal degrees, negated for the southern and western
/// hemispheres. The altitude field is taken as sent.
pub fn parse_gga(sentence: &str) -> Result<GpsFix, ParseError> {
    let fields: Vec<&str> = sentence.split(',').collect();

    if fields.len() < 10 {
        return Err(ParseError::MissingFields(fields.len()));
    }

    let lat_raw: f64 = fields[2]
        .parse()
        .map_err(|e| ParseError::NumericField("latitude", e))?;
    let mut lat_deg = dm_to_decimal(lat_raw);
    if fields[3] == "S" {
        lat_deg = -lat_deg;
    }

    let lon_raw: f64 = fields[4]
        .parse()
        .map_err(|e| ParseError::NumericField("longitude", e))?;
    let mut lon_deg = dm_to_decimal(lon_raw);
    if fields[5] == "W" {
        lon_deg = -lon_deg;
    }

    let alt: f64 = fields[9]
        .parse()
        .map_err(|e| ParseError::NumericField("altitude", e))?;

    Ok(GpsFix {
        lat_deg,
        lon_deg,
        alt,
    })
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Convert a degrees-and-decimal-minutes value (`ddmm.mmm`) to decimal
/// degrees.
fn dm_to_decimal(raw: f64) -> f64 {
    let degrees = (raw / 100.0).trunc();
    let minutes = raw - degrees * 100.0;

    degrees + minutes / 60.0
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    const GOOD_SENTENCE: &str =
        "$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47";

    const BAD_SENTENCE: &str = "$GPGGA,123519,garbage";

    #[test]
    fn test_parse_gga_northern_eastern() {
        let fix = parse_gga(GOOD_SENTENCE).unwrap();

        assert!((fix.lat_deg - (48.0 + 7.038 / 60.0)).abs() < 1e-9);
        assert!((fix.lon_deg - (11.0 + 31.0 / 60.0)).abs() < 1e-9);
        assert!((fix.alt - 545.4).abs() < 1e-9);
    }

    #[test]
    fn test_parse_gga_southern_western() {
        let sentence =
            "$GPGGA,021044,2728.207,S,15301.264,W,1,10,1.1,38.2,M,39.5,M,,*4F";
        let fix = parse_gga(sentence).unwrap();

        assert!((fix.lat_deg + (27.0 + 28.207 / 60.0)).abs() < 1e-9);
        assert!((fix.lon_deg + (153.0 + 1.264 / 60.0)).abs() < 1e-9);
    }

    #[test]
    fn test_parse_gga_failures() {
        assert!(matches!(
            parse_gga(BAD_SENTENCE),
            Err(ParseError::MissingFields(3))
        ));

        let bad_lat = "$GPGGA,123519,not_a_number,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47";
        assert!(matches!(
            parse_gga(bad_lat),
            Err(ParseError::NumericField("latitude", _))
        ));
    }

    #[test]
    fn test_non_gga_sentences_ignored() {
        let mut parser = PositionParser::new();

        assert!(parser
            .feed("$GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W*6A")
            .is_none());

        // Ignored sentences do not count towards the failure threshold
        parser.feed(GOOD_SENTENCE).unwrap();
        for _ in 0..100 {
            assert!(parser.feed("$GPVTG,084.4,T,077.8,M,022.4,N,041.5,K*43").is_none());
        }
        assert!(!parser.feed(GOOD_SENTENCE).unwrap().is_fix_lost());
    }

    #[test]
    fn test_failure_threshold_and_recovery() {
        let mut parser = PositionParser::new();

        let good = parser.feed(GOOD_SENTENCE).unwrap();

        // Four consecutive failures still return the last good fix
        for _ in 0..4 {
            assert_eq!(parser.feed(BAD_SENTENCE).unwrap(), good);
        }

        // The fifth declares the fix lost, and it stays lost
        assert!(parser.feed(BAD_SENTENCE).unwrap().is_fix_lost());
        assert!(parser.feed(BAD_SENTENCE).unwrap().is_fix_lost());

        // One good sentence recovers and resets the counter
        let recovered = parser.feed(GOOD_SENTENCE).unwrap();
        assert!(!recovered.is_fix_lost());
        assert_eq!(parser.feed(BAD_SENTENCE).unwrap(), recovered);
    }

    #[test]
    fn test_no_good_fix_yet_goes_straight_to_lost() {
        let mut parser = PositionParser::new();

        // With no known-good fix there is nothing to fall back on
        assert!(parser.feed(BAD_SENTENCE).unwrap().is_fix_lost());
    }
}
