use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, Offset, TimeZone, Timelike, Utc};
use game_types::{GameError, MAX_QUESTIONS, RoundInfo, RoundStatus};
use rand::Rng;

pub const OPEN_HOUR: u32 = 12;
pub const CLOSE_HOUR: u32 = 17;

/// Countdown shown while a round is force-opened
fn forced_open_countdown() -> Duration {
    Duration::hours(5)
}

/// Calendar day identifying a round, rendered as `YYYY-MM-DD`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RoundKey(NaiveDate);

impl RoundKey {
    pub fn date(&self) -> NaiveDate {
        self.0
    }

    pub fn next(&self) -> Self {
        Self(self.0.succ_opt().unwrap_or(self.0))
    }
}

impl fmt::Display for RoundKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl FromStr for RoundKey {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|_| GameError::invalid(format!("invalid round id: {}", s)))?;
        let key = RoundKey(date);

        // chrono accepts unpadded fields, round ids must be canonical
        if key.to_string() != s {
            return Err(GameError::invalid(format!("invalid round id: {}", s)));
        }
        Ok(key)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RoundOptions {
    pub force_open: bool,
    pub round_override: Option<RoundKey>,
}

impl RoundOptions {
    pub fn forced(force_open: bool) -> Self {
        Self {
            force_open,
            round_override: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Round {
    pub key: RoundKey,
    pub opens_at: DateTime<Utc>,
    pub closes_at: DateTime<Utc>,
    pub status: RoundStatus,
    pub countdown_target: DateTime<Utc>,
    pub countdown_ms: i64,
    next_opens_at: DateTime<Utc>,
}

impl Round {
    pub fn id(&self) -> String {
        self.key.to_string()
    }

    pub fn is_open(&self) -> bool {
        self.status == RoundStatus::Open
    }

    /// Replace the computed status with an administrative override
    pub fn with_status_override(mut self, status: RoundStatus, now: DateTime<Utc>) -> Self {
        self.status = status;
        self.countdown_target = match status {
            RoundStatus::Scheduled => self.opens_at,
            RoundStatus::Open if self.closes_at > now => self.closes_at,
            RoundStatus::Open => now + forced_open_countdown(),
            RoundStatus::Closed => self.next_opens_at,
        };
        self.countdown_ms = (self.countdown_target - now).num_milliseconds().max(0);
        self
    }

    pub fn info(&self) -> RoundInfo {
        RoundInfo {
            id: self.id(),
            status: self.status,
            opens_at: self.opens_at.timestamp_millis(),
            closes_at: self.closes_at.timestamp_millis(),
            countdown_ms: self.countdown_ms,
            max_questions: MAX_QUESTIONS,
        }
    }
}

/// Maps wall-clock time to the daily round in a fixed timezone offset
#[derive(Debug, Clone, Copy)]
pub struct RoundCalculator {
    offset: FixedOffset,
}

impl Default for RoundCalculator {
    fn default() -> Self {
        Self::utc()
    }
}

impl RoundCalculator {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Atlantic/Reykjavik keeps UTC+0 all year
    pub fn utc() -> Self {
        Self { offset: Utc.fix() }
    }

    pub fn from_offset_hours(hours: i32) -> Option<Self> {
        FixedOffset::east_opt(hours.checked_mul(3600)?).map(Self::new)
    }

    pub fn today(&self, now: DateTime<Utc>) -> RoundKey {
        RoundKey(now.with_timezone(&self.offset).date_naive())
    }

    /// Opening and closing instants of a round
    pub fn window(&self, key: RoundKey) -> (DateTime<Utc>, DateTime<Utc>) {
        (
            self.local_hour_to_utc(key.date(), OPEN_HOUR),
            self.local_hour_to_utc(key.date(), CLOSE_HOUR),
        )
    }

    pub fn current(&self, now: DateTime<Utc>, options: RoundOptions) -> Round {
        let local = now.with_timezone(&self.offset);
        let hour = local.hour();
        let key = options
            .round_override
            .unwrap_or_else(|| RoundKey(local.date_naive()));

        let (opens_at, closes_at) = self.window(key);
        let next_opens_at = self.local_hour_to_utc(key.next().date(), OPEN_HOUR);

        let (status, countdown_target) = if options.force_open {
            (RoundStatus::Open, now + forced_open_countdown())
        } else if hour < OPEN_HOUR {
            (RoundStatus::Scheduled, opens_at)
        } else if hour < CLOSE_HOUR {
            (RoundStatus::Open, closes_at)
        } else {
            (RoundStatus::Closed, next_opens_at)
        };

        Round {
            key,
            opens_at,
            closes_at,
            status,
            countdown_target,
            countdown_ms: (countdown_target - now).num_milliseconds().max(0),
            next_opens_at,
        }
    }

    fn local_hour_to_utc(&self, date: NaiveDate, hour: u32) -> DateTime<Utc> {
        let naive = date.and_time(NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or_default());
        self.offset
            .from_local_datetime(&naive)
            .single()
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|| naive.and_utc())
    }
}

/// 32-bit FNV-1a over the UTF-16 code units of a round id.
/// Stable across releases so that past rounds keep their person.
pub fn round_hash(round_id: &str) -> u32 {
    let mut hash: u32 = 2_166_136_261;
    for unit in round_id.encode_utf16() {
        hash ^= u32::from(unit);
        hash = hash.wrapping_mul(16_777_619);
    }
    (hash as i32).unsigned_abs()
}

/// Uniformly random day between 2000-01-01 and 2099-12-31
pub fn random_round_key<R: Rng + ?Sized>(rng: &mut R) -> RoundKey {
    let start = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or_default();
    let end = NaiveDate::from_ymd_opt(2099, 12, 31).unwrap_or_default();
    let span = (end - start).num_days().max(0);
    RoundKey(start + Duration::days(rng.gen_range(0..=span)))
}
