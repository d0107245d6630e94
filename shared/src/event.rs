//! The wedding event itself: calendar export and the countdown.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;
use url::Url;

/// File name offered when the calendar payload is downloaded.
pub const ICS_FILE_NAME: &str = "wedding_invitation.ics";

const ICS_TIME_FORMAT: &str = "%Y%m%dT%H%M%S";
const ICS_UTC_FORMAT: &str = "%Y%m%dT%H%M%SZ";
/// Maximum octets per content line before folding.
const ICS_LINE_LIMIT: usize = 75;
const GOOGLE_CALENDAR_URL: &str = "https://calendar.google.com/calendar/render";
const PRODID: &str = "-//wedding-invitation//calendar export//KO";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeddingEvent {
    pub groom: String,
    pub bride: String,
    pub venue: String,
    pub address: String,
    pub description: String,
    /// Local wall-clock start time at the venue.
    pub start: NaiveDateTime,
    pub duration: Duration,
}

impl Default for WeddingEvent {
    fn default() -> Self {
        let start = NaiveDate::from_ymd_opt(2026, 3, 21)
            .and_then(|d| d.and_hms_opt(14, 0, 0))
            .unwrap_or_default();
        Self {
            groom: "홍승호".to_string(),
            bride: "서희주".to_string(),
            venue: "우리들교회 판교채플".to_string(),
            address: "경기 성남시 분당구 안양판교로 1219".to_string(),
            description: "저희 두 사람의 새로운 시작을 함께 축복해 주세요.".to_string(),
            start,
            duration: Duration::hours(2),
        }
    }
}

/// Time remaining until the ceremony, broken down for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TimeLeft {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl WeddingEvent {
    pub fn title(&self) -> String {
        format!("{} & {} 결혼식", self.groom, self.bride)
    }

    pub fn location(&self) -> String {
        format!("{} ({})", self.venue, self.address)
    }

    pub fn end(&self) -> NaiveDateTime {
        self.start + self.duration
    }

    fn uid(&self) -> String {
        format!(
            "{}-{}-{}@wedding-invitation",
            self.start.format(ICS_TIME_FORMAT),
            self.groom,
            self.bride
        )
    }

    /// Renders a single-event iCalendar document stamped with the current time.
    pub fn to_ics(&self) -> String {
        self.to_ics_stamped(Utc::now())
    }

    /// Renders the document with an explicit `DTSTAMP`.
    pub fn to_ics_stamped(&self, stamp: DateTime<Utc>) -> String {
        let lines = [
            "BEGIN:VCALENDAR".to_string(),
            "VERSION:2.0".to_string(),
            format!("PRODID:{}", PRODID),
            "BEGIN:VEVENT".to_string(),
            format!("UID:{}", escape_text(&self.uid())),
            format!("DTSTAMP:{}", stamp.format(ICS_UTC_FORMAT)),
            format!("DTSTART:{}", self.start.format(ICS_TIME_FORMAT)),
            format!("DTEND:{}", self.end().format(ICS_TIME_FORMAT)),
            format!("SUMMARY:{}", escape_text(&self.title())),
            format!("DESCRIPTION:{}", escape_text(&self.description)),
            format!("LOCATION:{}", escape_text(&self.location())),
            "END:VEVENT".to_string(),
            "END:VCALENDAR".to_string(),
        ];
        let mut ics = String::new();
        for line in &lines {
            ics.push_str(&fold_line(line));
            ics.push_str("\r\n");
        }
        ics
    }

    /// Prefilled "create event" link for Google Calendar.
    pub fn google_calendar_url(&self) -> Result<Url, url::ParseError> {
        let dates = format!(
            "{}/{}",
            self.start.format(ICS_TIME_FORMAT),
            self.end().format(ICS_TIME_FORMAT)
        );
        Url::parse_with_params(
            GOOGLE_CALENDAR_URL,
            &[
                ("action", "TEMPLATE".to_string()),
                ("text", self.title()),
                ("dates", dates),
                ("details", self.description.clone()),
                ("location", self.location()),
            ],
        )
    }

    /// Countdown from `now` (local time at the venue). Zero once started.
    pub fn time_until(&self, now: NaiveDateTime) -> TimeLeft {
        let remaining = self.start - now;
        if remaining <= Duration::zero() {
            return TimeLeft::default();
        }
        let total = remaining.num_seconds();
        TimeLeft {
            days: total / 86_400,
            hours: (total / 3_600) % 24,
            minutes: (total / 60) % 60,
            seconds: total % 60,
        }
    }
}

/// Folds a content line so no physical line exceeds 75 octets. Breaks fall
/// between characters, never inside a UTF-8 sequence.
fn fold_line(line: &str) -> String {
    let mut out = String::with_capacity(line.len() + line.len() / ICS_LINE_LIMIT * 3);
    let mut width = 0;
    for c in line.chars() {
        let len = c.len_utf8();
        if width + len > ICS_LINE_LIMIT {
            out.push_str("\r\n ");
            width = 1;
        }
        out.push(c);
        width += len;
    }
    out
}

/// Escapes a TEXT property value (RFC 5545 section 3.3.11).
fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            _ => out.push(c),
        }
    }
    out
}
