//! Gestational calculator.
//!
//! Pure date arithmetic: completed weeks and days since the last menstrual
//! period, and the trimester they fall in. Dates after the reference day and
//! missing inputs yield [`GestationalAge::unknown`], never an error.

use chrono::{Duration, NaiveDate};

use crate::entities::gestation::{GestationalAge, Trimester};
use crate::entities::profile::Profile;

/// Days from LMP to the estimated due date
pub const PREGNANCY_LENGTH_DAYS: i64 = 280;

/// Gestational age on `today` counted from the last menstrual period
pub fn calculate_by_lmp(
    lmp_date: impl Into<Option<NaiveDate>>,
    today: impl Into<Option<NaiveDate>>,
) -> GestationalAge {
    let (Some(lmp_date), Some(today)) = (lmp_date.into(), today.into()) else {
        return GestationalAge::unknown();
    };

    let delta = today.signed_duration_since(lmp_date).num_days();
    if delta < 0 {
        return GestationalAge::unknown();
    }

    let weeks = delta / 7;
    GestationalAge {
        weeks: Some(weeks),
        days: Some(delta % 7),
        trimester: Some(Trimester::from_weeks(weeks)),
    }
}

/// Gestational age on `today` from the estimated due date
pub fn calculate_by_due(
    due_date: impl Into<Option<NaiveDate>>,
    today: impl Into<Option<NaiveDate>>,
) -> GestationalAge {
    let lmp_date = due_date
        .into()
        .and_then(|due| due.checked_sub_signed(Duration::days(PREGNANCY_LENGTH_DAYS)));
    calculate_by_lmp(lmp_date, today)
}

/// LMP wins when both dates are set
pub fn gestational_age_for_profile(profile: &Profile, today: NaiveDate) -> GestationalAge {
    match (profile.lmp_date, profile.due_date) {
        (Some(lmp), _) => calculate_by_lmp(lmp, today),
        (None, Some(due)) => calculate_by_due(due, today),
        (None, None) => GestationalAge::unknown(),
    }
}
