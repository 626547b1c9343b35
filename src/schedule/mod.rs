pub mod series;
pub mod week;

pub use series::generate_dates;
pub use week::compute_week;
