//! Download names: `snipprok-YYYY-MM-DD[@Nx].png`

use chrono::{Local, NaiveDate};
use snipprok_core::PixelScale;

pub const FILENAME_PREFIX: &str = "snipprok";

/// Name for an export made on `date`; scales above 1 get an `@Nx` suffix
pub fn filename_for(date: NaiveDate, scale: PixelScale, extension: &str) -> String {
    let day = date.format("%Y-%m-%d");
    match scale.factor() {
        1 => format!("{FILENAME_PREFIX}-{day}.{extension}"),
        factor => format!("{FILENAME_PREFIX}-{day}@{factor}x.{extension}"),
    }
}

/// Name for an export made now, in local time
pub fn filename_today(scale: PixelScale, extension: &str) -> String {
    filename_for(Local::now().date_naive(), scale, extension)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn march_fifth() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 5).unwrap_or_default()
    }

    #[test]
    fn test_scale_two_gets_suffix() {
        assert_eq!(
            filename_for(march_fifth(), PixelScale::X2, "png"),
            "snipprok-2024-03-05@2x.png"
        );
        assert_eq!(
            filename_for(march_fifth(), PixelScale::X3, "png"),
            "snipprok-2024-03-05@3x.png"
        );
    }

    #[test]
    fn test_scale_one_has_no_suffix() {
        assert_eq!(
            filename_for(march_fifth(), PixelScale::X1, "png"),
            "snipprok-2024-03-05.png"
        );
    }

    #[test]
    fn test_today_uses_the_pattern() {
        let name = filename_today(PixelScale::X1, "png");
        assert!(name.starts_with("snipprok-20"));
        assert_eq!(name.len(), "snipprok-YYYY-MM-DD.png".len());
    }
}
