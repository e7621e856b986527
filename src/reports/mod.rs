// Reports module - daily flow decomposition, period returns, report records

pub mod flows;
pub mod performance;
pub mod summary;

pub use flows::{decompose, decompose_day, AnnotatedSeries, DailyFlow};
pub use performance::{
    calculate_period, calculate_periods, parse_period_spec, resolve_window, standard_periods,
    Period, PeriodResult, ReturnMethod, StandardPeriod, Window,
};
pub use summary::{assemble, frontend_entries, write_json, FrontendEntry, PeriodReport};
