pub mod audit;
pub mod bulk;
pub mod day_replace;
pub mod series_create;

use crate::error::AppError;
use crate::models::Actor;

pub use bulk::{BulkOutcome, NewTemplateRequest, copy_week, clear_week, create_template, replace_teacher};
pub use day_replace::{ReplaceDayRequest, ReplacedDay, replace_day};
pub use series_create::{CreateSeriesRequest, CreatedSeries, create_series};

/// Every mutating operation enforces its own role precondition before any I/O.
pub fn require_admin(actor: &Actor) -> Result<(), AppError> {
    if actor.is_admin() {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}
