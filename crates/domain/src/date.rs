use chrono::NaiveDate;

/// Parses a `YYYY-M-D` date string as used by the availability query
/// parameters. Delegates the calendar arithmetic (leap years, month
/// lengths) to chrono.
pub fn parse_date(datestr: &str) -> anyhow::Result<NaiveDate> {
    let parts = datestr.split('-').collect::<Vec<_>>();
    if parts.len() != 3 {
        return Err(anyhow::Error::msg(datestr.to_string()));
    }
    let year: i32 = parts[0]
        .parse()
        .map_err(|_| anyhow::Error::msg(datestr.to_string()))?;
    let month: u32 = parts[1]
        .parse()
        .map_err(|_| anyhow::Error::msg(datestr.to_string()))?;
    let day: u32 = parts[2]
        .parse()
        .map_err(|_| anyhow::Error::msg(datestr.to_string()))?;

    if !(1970..=2100).contains(&year) {
        return Err(anyhow::Error::msg(datestr.to_string()));
    }

    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| anyhow::Error::msg(datestr.to_string()))
}
