use crate::backup::result_error::error::Error;
use crate::backup::result_error::result::Result;
use chrono::{DateTime, Local};
use tracing::info;

/// Cron driven trigger for daemon mode.
#[derive(Clone, Debug)]
pub struct Schedule {
    cron: String,
}

impl Schedule {
    pub fn new<S: Into<String>>(cron: S) -> Result<Self> {
        let cron = cron.into();
        Self::parse(&cron, &Local::now())?;
        Ok(Self { cron })
    }

    fn parse(cron: &str, after: &DateTime<Local>) -> Result<DateTime<Local>> {
        cron_parser::parse(cron, after).map_err(|e| Error::invalid_cron(format!("{cron:?}: {e:?}")))
    }

    /// First tick strictly after `after`.
    pub fn next_after(&self, after: &DateTime<Local>) -> Result<DateTime<Local>> {
        Self::parse(&self.cron, after)
    }

    /// Calls `job` at every tick, one run at a time. Only returns on error.
    ///
    /// A run that overshoots the following tick is not replayed, the next
    /// run is the first tick after it finished.
    pub fn run_forever<F: FnMut()>(&self, mut job: F) -> Result<()> {
        let mut next = self.next_after(&Local::now())?;
        loop {
            let now = Local::now();
            if now < next {
                info!("Sleeping until {next}");
                std::thread::sleep((next - now).to_std().unwrap_or_default());
                continue;
            }
            job();
            next = self.next_after(&Local::now())?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    #[test]
    fn test_next_after() {
        let schedule = Schedule::new("0 2 * * *").unwrap();
        let after = Local.with_ymd_and_hms(2024, 3, 15, 1, 30, 0).unwrap();
        let next = schedule.next_after(&after).unwrap();
        assert_eq!(next, Local.with_ymd_and_hms(2024, 3, 15, 2, 0, 0).unwrap());

        let following = schedule.next_after(&next).unwrap();
        assert_eq!(following, Local.with_ymd_and_hms(2024, 3, 16, 2, 0, 0).unwrap());
    }

    #[test]
    fn test_every_minute() {
        let schedule = Schedule::new("* * * * *").unwrap();
        let after = Local.with_ymd_and_hms(2024, 3, 15, 10, 15, 30).unwrap();
        let next = schedule.next_after(&after).unwrap();
        assert_eq!(next.minute(), 16);
        assert!(next > after);
    }

    #[test]
    fn test_invalid_cron() {
        let error = Schedule::new("every night").unwrap_err();
        assert!(matches!(error, Error::InvalidCron(_)));
    }
}
