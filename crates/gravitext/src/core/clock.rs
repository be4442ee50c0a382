use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Source of the current calendar date (UTC), formatted `YYYY-MM-DD`.
pub trait Clock {
    fn today(&self) -> String;
}

/// Wall clock in UTC.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> String {
        format_date(OffsetDateTime::now_utc().date())
    }
}

/// `YYYY-MM-DD`, the form challenge days are keyed by.
pub fn format_date(date: Date) -> String {
    date.format(DATE_FORMAT).unwrap_or_else(|err| {
        log::warn!("Could not format {date}: {err}");
        date.to_string()
    })
}

/// A clock stuck on one date. Tests move it forward with [`FixedClock::set`].
#[derive(Debug, Clone)]
pub struct FixedClock {
    date: std::rc::Rc<std::cell::RefCell<String>>,
}

impl FixedClock {
    pub fn new(date: &str) -> Self {
        Self {
            date: std::rc::Rc::new(std::cell::RefCell::new(date.to_string())),
        }
    }

    /// Change the date seen by this clock and every clone of it.
    pub fn set(&self, date: &str) {
        *self.date.borrow_mut() = date.to_string();
    }
}

impl Clock for FixedClock {
    fn today(&self) -> String {
        self.date.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dates_are_zero_padded() {
        use time::macros::date;
        assert_eq!(format_date(date!(1970 - 01 - 01)), "1970-01-01");
        assert_eq!(format_date(date!(2000 - 02 - 29)), "2000-02-29");
        assert_eq!(format_date(date!(2024 - 12 - 31)), "2024-12-31");
    }

    #[test]
    fn system_clock_format() {
        let today = SystemClock.today();
        assert_eq!(today.len(), 10);
        assert_eq!(&today[4..5], "-");
        assert_eq!(&today[7..8], "-");
    }

    #[test]
    fn fixed_clock_clones_share_the_date() {
        let clock = FixedClock::new("2025-03-01");
        let other = clock.clone();
        clock.set("2025-03-02");
        assert_eq!(other.today(), "2025-03-02");
    }
}
