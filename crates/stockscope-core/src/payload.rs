//! Pure mapping from raw form fields to validated requests. No I/O.

use time::Date;

use crate::domain::{parse_date, FilterMode, RangeSpec};
use crate::{
    FormSnapshot, InsightsRequest, MaWindow, Period, PlotRequest, PlotSpec, PlotType, Ticker,
    ValidationError,
};

/// Build the plot endpoint payload from a form snapshot.
///
/// Checks run in field order: ticker, range, then the window (only for a
/// moving average). `today` bounds date ranges; neither date may be after it.
pub fn build(snapshot: &FormSnapshot, today: Date) -> Result<PlotRequest, ValidationError> {
    let ticker = Ticker::parse(&snapshot.ticker)?;
    let range = build_range(snapshot, today)?;
    let plot = match snapshot.plot_type {
        PlotType::MovingAverage => PlotSpec::MovingAverage {
            window: MaWindow::new(snapshot.window)?,
        },
        other => PlotSpec::new(other, MaWindow::DEFAULT),
    };

    Ok(PlotRequest::new(ticker, plot, range))
}

/// Build the insights request; plot type and window are ignored.
pub fn build_insights(
    snapshot: &FormSnapshot,
    today: Date,
) -> Result<InsightsRequest, ValidationError> {
    let ticker = Ticker::parse(&snapshot.ticker)?;
    let range = build_range(snapshot, today)?;
    Ok(InsightsRequest::new(ticker, range))
}

/// Range for the active filter mode; fields of the inactive mode are not read.
pub fn build_range(snapshot: &FormSnapshot, today: Date) -> Result<RangeSpec, ValidationError> {
    match snapshot.filter_mode {
        FilterMode::ByPeriod => Ok(RangeSpec::Period(Period::parse(&snapshot.period)?)),
        FilterMode::ByDateRange => {
            let start = parse_date("start", &snapshot.start_date)?;
            let end = parse_date("end", &snapshot.end_date)?;
            RangeSpec::dates(start, end, today)
        }
    }
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::*;

    const TODAY: Date = date!(2024 - 06 - 15);

    fn snapshot(ticker: &str) -> FormSnapshot {
        FormSnapshot {
            ticker: ticker.to_owned(),
            ..FormSnapshot::default()
        }
    }

    fn date_snapshot(start: &str, end: &str) -> FormSnapshot {
        FormSnapshot {
            filter_mode: FilterMode::ByDateRange,
            start_date: start.to_owned(),
            end_date: end.to_owned(),
            ..snapshot("NVDA")
        }
    }

    #[test]
    fn normalizes_ticker_and_uses_period() {
        let request = build(&snapshot("nvda"), TODAY).expect("valid");
        assert_eq!(request.ticker.as_str(), "NVDA");
        assert_eq!(request.plot, PlotSpec::Close);
        assert_eq!(request.range, RangeSpec::Period(Period::default()));
    }

    #[test]
    fn blank_ticker_fails_first() {
        let mut fields = date_snapshot("2024-06-01", "2024-05-01");
        fields.ticker = String::from("  ");
        assert_eq!(build(&fields, TODAY), Err(ValidationError::EmptyTicker));
        assert_eq!(build_insights(&fields, TODAY), Err(ValidationError::EmptyTicker));
    }

    #[test]
    fn reversed_dates_are_invalid_range() {
        let fields = date_snapshot("2024-06-01", "2024-05-01");
        assert_eq!(build(&fields, TODAY), Err(ValidationError::InvalidRange));
    }

    #[test]
    fn future_end_is_invalid_range() {
        let fields = date_snapshot("2024-06-01", "2024-06-16");
        assert_eq!(build(&fields, TODAY), Err(ValidationError::InvalidRange));
    }

    #[test]
    fn inactive_mode_fields_are_ignored() {
        let mut fields = snapshot("nvda");
        fields.start_date = String::from("garbage");
        assert!(build(&fields, TODAY).is_ok());

        let mut fields = date_snapshot("2024-05-01", "2024-06-01");
        fields.period = String::from("garbage");
        assert!(build(&fields, TODAY).is_ok());
    }

    #[test]
    fn window_only_checked_for_moving_average() {
        let mut fields = snapshot("nvda");
        fields.window = 5;
        assert!(build(&fields, TODAY).is_ok());

        fields.plot_type = PlotType::MovingAverage;
        assert!(matches!(
            build(&fields, TODAY),
            Err(ValidationError::WindowOutOfRange { value: 5, .. })
        ));

        fields.window = 50;
        let request = build(&fields, TODAY).expect("valid");
        assert_eq!(request.window().map(MaWindow::get), Some(50));
    }

    #[test]
    fn insights_ignore_plot_selection() {
        let mut fields = snapshot("nvda");
        fields.plot_type = PlotType::MovingAverage;
        fields.window = 1;
        let request = build_insights(&fields, TODAY).expect("valid");
        assert_eq!(request.ticker.as_str(), "NVDA");
    }
}
