//! Availability calculator - core business logic
//!
//! Produces the working-day slot grid for an advisor and date by merging two
//! busy-interval sources: internal bookings and the advisor's external
//! calendar. External-calendar failures degrade to internal-only busy
//! intervals; they never abort the computation.

use std::sync::Arc;

use chrono::{DateTime, LocalResult, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use tracing::{debug, warn};
use uuid::Uuid;

use advisorly_domain::{
    AdvisorlyError, AvailabilityDay, BookingConfig, BusyInterval, Result, TimeSlot,
};

use super::ports::{AdvisorRepository, BookingRepository, CalendarGateway, GatewayError};

/// Fixed working-day partition shared by every availability computation
#[derive(Debug, Clone)]
pub struct WorkdayGrid {
    start_hour: u32,
    end_hour: u32,
    slot_minutes: u32,
    tz: Tz,
}

impl WorkdayGrid {
    /// Build a grid from configuration.
    ///
    /// # Errors
    /// Returns `AdvisorlyError::Config` for an unknown time zone, an empty
    /// window, or a zero slot length.
    pub fn new(config: &BookingConfig, time_zone: &str) -> Result<Self> {
        let tz: Tz = time_zone
            .parse()
            .map_err(|_| AdvisorlyError::Config(format!("unknown time zone: {time_zone}")))?;

        if config.day_end_hour <= config.day_start_hour || config.day_end_hour > 23 {
            return Err(AdvisorlyError::Config(format!(
                "invalid working window: {}..{}",
                config.day_start_hour, config.day_end_hour
            )));
        }
        if config.slot_minutes == 0 {
            return Err(AdvisorlyError::Config("slot length must be positive".into()));
        }

        Ok(Self {
            start_hour: config.day_start_hour,
            end_hour: config.day_end_hour,
            slot_minutes: config.slot_minutes,
            tz,
        })
    }

    /// Window bounds `[start, end)` for a date, as UTC instants
    pub fn window_bounds(&self, date: NaiveDate) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
        Ok((self.local_instant(date, self.start_hour)?, self.local_instant(date, self.end_hour)?))
    }

    /// Contiguous slot bounds covering the window
    pub fn slot_bounds(&self, date: NaiveDate) -> Result<Vec<(DateTime<Utc>, DateTime<Utc>)>> {
        let (window_start, window_end) = self.window_bounds(date)?;
        let step = chrono::Duration::minutes(i64::from(self.slot_minutes));

        let mut bounds = Vec::new();
        let mut slot_start = window_start;
        while slot_start + step <= window_end {
            bounds.push((slot_start, slot_start + step));
            slot_start += step;
        }
        Ok(bounds)
    }

    /// The grid's calendar date for an instant
    pub fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.tz).date_naive()
    }

    fn local_instant(&self, date: NaiveDate, hour: u32) -> Result<DateTime<Utc>> {
        let naive = date.and_hms_opt(hour, 0, 0).ok_or_else(|| {
            AdvisorlyError::InvalidInput(format!("invalid hour {hour} for {date}"))
        })?;

        match self.tz.from_local_datetime(&naive) {
            LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
            // DST fold: take the earlier wall-clock occurrence
            LocalResult::Ambiguous(earliest, _) => Ok(earliest.with_timezone(&Utc)),
            LocalResult::None => Err(AdvisorlyError::InvalidInput(format!(
                "{date} {hour:02}:00 does not exist in {}",
                self.tz
            ))),
        }
    }
}

/// Availability calculation service
pub struct AvailabilityService {
    advisors: Arc<dyn AdvisorRepository>,
    bookings: Arc<dyn BookingRepository>,
    calendar: Arc<dyn CalendarGateway>,
    grid: WorkdayGrid,
}

impl AvailabilityService {
    /// Create a new availability service
    pub fn new(
        advisors: Arc<dyn AdvisorRepository>,
        bookings: Arc<dyn BookingRepository>,
        calendar: Arc<dyn CalendarGateway>,
        grid: WorkdayGrid,
    ) -> Self {
        Self { advisors, bookings, calendar, grid }
    }

    /// The slot grid this service computes against
    pub fn grid(&self) -> &WorkdayGrid {
        &self.grid
    }

    /// Compute the slot sequence for an advisor and date.
    ///
    /// Unknown advisors yield an empty sequence (logged, not an error). Past
    /// dates compute normally; date filtering is a caller concern. Every
    /// slot of the window is returned, unavailable ones included.
    pub async fn compute_availability(
        &self,
        advisor_id: Uuid,
        date: NaiveDate,
    ) -> Result<AvailabilityDay> {
        if self.advisors.get_advisor(advisor_id).await?.is_none() {
            warn!(%advisor_id, "availability requested for unknown advisor");
            return Ok(AvailabilityDay { date, slots: Vec::new() });
        }

        let (window_start, window_end) = self.grid.window_bounds(date)?;
        let busy = self.collect_busy_intervals(advisor_id, window_start, window_end).await?;

        let slots = self
            .grid
            .slot_bounds(date)?
            .into_iter()
            .map(|(start, end)| TimeSlot {
                start,
                end,
                available: !busy.iter().any(|interval| interval.overlaps(start, end)),
            })
            .collect();

        Ok(AvailabilityDay { date, slots })
    }

    /// Busy intervals from internal bookings plus, when connected, the
    /// external calendar.
    async fn collect_busy_intervals(
        &self,
        advisor_id: Uuid,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Result<Vec<BusyInterval>> {
        let mut busy: Vec<BusyInterval> = self
            .bookings
            .active_bookings_in_range(advisor_id, window_start, window_end)
            .await?
            .iter()
            .filter(|booking| booking.is_active())
            .map(|booking| BusyInterval::new(booking.start_time, booking.end_time))
            .collect();

        match self.calendar.list_events(advisor_id, window_start, window_end).await {
            Ok(events) => {
                busy.extend(events.iter().map(|event| {
                    if event.is_all_day {
                        // All-day events block the whole working window
                        BusyInterval::new(window_start, window_end)
                    } else {
                        BusyInterval::new(event.start, event.end)
                    }
                }));
            }
            Err(GatewayError::NotConnected) => {
                debug!(%advisor_id, "no calendar connection; using internal bookings only");
            }
            Err(err) => {
                warn!(
                    %advisor_id,
                    error = %err,
                    "external calendar unavailable; falling back to internal bookings"
                );
            }
        }

        Ok(busy)
    }
}
