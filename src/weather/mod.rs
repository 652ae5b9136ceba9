//! Weather data model: condition kinds, the snapshot fed to the sky
//! animation, and the WMO weather-code mapping.

pub mod provider;

/// Coarse weather condition, mapped from WMO codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeatherKind {
    Clear,
    PartlyCloudy,
    Overcast,
    Fog,
    Drizzle,
    Rain,
    Snow,
    Showers,
    Thunderstorm,
}

impl WeatherKind {
    /// Rain-family kinds share the rain particle visuals.
    pub fn is_rainy(self) -> bool {
        matches!(
            self,
            WeatherKind::Rain | WeatherKind::Drizzle | WeatherKind::Showers | WeatherKind::Thunderstorm
        )
    }

    pub fn is_snowy(self) -> bool {
        self == WeatherKind::Snow
    }

    pub fn description(self) -> &'static str {
        match self {
            WeatherKind::Clear => "Clear",
            WeatherKind::PartlyCloudy => "Partly Cloudy",
            WeatherKind::Overcast => "Overcast",
            WeatherKind::Fog => "Fog",
            WeatherKind::Drizzle => "Drizzle",
            WeatherKind::Rain => "Rain",
            WeatherKind::Snow => "Snow",
            WeatherKind::Showers => "Showers",
            WeatherKind::Thunderstorm => "Thunderstorm",
        }
    }
}

/// WMO weather code table: (code, kind, intensity). Codes missing from the
/// table read as clear sky with zero intensity.
const WMO_TABLE: &[(u16, WeatherKind, f64)] = &[
    (0, WeatherKind::Clear, 0.0),
    (1, WeatherKind::PartlyCloudy, 0.3),
    (2, WeatherKind::PartlyCloudy, 0.6),
    (3, WeatherKind::Overcast, 0.0),
    (45, WeatherKind::Fog, 0.0),
    (48, WeatherKind::Fog, 0.0),
    (51, WeatherKind::Drizzle, 0.3),
    (53, WeatherKind::Drizzle, 0.6),
    (55, WeatherKind::Drizzle, 1.0),
    (61, WeatherKind::Rain, 0.3),
    (63, WeatherKind::Rain, 0.6),
    (65, WeatherKind::Rain, 1.0),
    (66, WeatherKind::Rain, 0.3),
    (67, WeatherKind::Rain, 0.7),
    (71, WeatherKind::Snow, 0.3),
    (73, WeatherKind::Snow, 0.6),
    (75, WeatherKind::Snow, 1.0),
    (77, WeatherKind::Snow, 0.5),
    (80, WeatherKind::Showers, 0.3),
    (81, WeatherKind::Showers, 0.6),
    (82, WeatherKind::Showers, 1.0),
    (85, WeatherKind::Snow, 0.5),
    (86, WeatherKind::Snow, 1.0),
    (95, WeatherKind::Thunderstorm, 0.7),
    (96, WeatherKind::Thunderstorm, 0.8),
    (99, WeatherKind::Thunderstorm, 1.0),
];

/// Map a WMO weather code to (kind, intensity).
pub fn wmo_lookup(code: u16) -> (WeatherKind, f64) {
    WMO_TABLE
        .iter()
        .find(|&&(c, _, _)| c == code)
        .map(|&(_, kind, intensity)| (kind, intensity))
        .unwrap_or((WeatherKind::Clear, 0.0))
}

/// Current weather as consumed by the sky animation. Immutable once
/// produced; replaced wholesale on each successful refresh.
#[derive(Debug, Clone, Copy)]
pub struct WeatherSnapshot {
    /// Celsius
    pub temperature: f64,
    /// km/h
    pub windspeed: f64,
    pub kind: WeatherKind,
    /// 0.0 - 1.0
    pub intensity: f64,
    /// 0 - 100 percent
    pub cloudcover: f64,
    /// mm
    pub precipitation: f64,
    pub is_day: bool,
    /// fractional local hours (6.5 = 06:30)
    pub sunrise: f64,
    pub sunset: f64,
}

impl Default for WeatherSnapshot {
    /// A calm clear day — shown until the first successful fetch.
    fn default() -> Self {
        WeatherSnapshot {
            temperature: 18.0,
            windspeed: 0.0,
            kind: WeatherKind::Clear,
            intensity: 0.0,
            cloudcover: 10.0,
            precipitation: 0.0,
            is_day: true,
            sunrise: 6.0,
            sunset: 20.0,
        }
    }
}

/// Format fractional hours as "HH:MM", rounding to the nearest minute.
pub fn format_hours(hours: f64) -> String {
    let mut h = hours.floor() as i64;
    let mut m = ((hours - hours.floor()) * 60.0 + 0.5) as i64;
    if m >= 60 {
        h += 1;
        m -= 60;
    }
    format!("{:02}:{:02}", h.rem_euclid(24), m)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wmo_lookup_known_codes() {
        assert_eq!(wmo_lookup(0), (WeatherKind::Clear, 0.0));
        assert_eq!(wmo_lookup(2), (WeatherKind::PartlyCloudy, 0.6));
        assert_eq!(wmo_lookup(55), (WeatherKind::Drizzle, 1.0));
        assert_eq!(wmo_lookup(65), (WeatherKind::Rain, 1.0));
        assert_eq!(wmo_lookup(77), (WeatherKind::Snow, 0.5));
        assert_eq!(wmo_lookup(82), (WeatherKind::Showers, 1.0));
        assert_eq!(wmo_lookup(99), (WeatherKind::Thunderstorm, 1.0));
    }

    #[test]
    fn test_wmo_lookup_unknown_code_is_clear() {
        assert_eq!(wmo_lookup(42), (WeatherKind::Clear, 0.0));
        assert_eq!(wmo_lookup(1000), (WeatherKind::Clear, 0.0));
    }

    #[test]
    fn test_rain_family() {
        assert!(WeatherKind::Rain.is_rainy());
        assert!(WeatherKind::Drizzle.is_rainy());
        assert!(WeatherKind::Showers.is_rainy());
        assert!(WeatherKind::Thunderstorm.is_rainy());
        assert!(!WeatherKind::Snow.is_rainy());
        assert!(WeatherKind::Snow.is_snowy());
        assert!(!WeatherKind::Fog.is_rainy());
    }

    #[test]
    fn test_format_hours_rounds_and_carries() {
        assert_eq!(format_hours(6.5), "06:30");
        assert_eq!(format_hours(0.0), "00:00");
        // 59.7 minutes rounds up and carries into the hour
        assert_eq!(format_hours(7.995), "08:00");
        assert_eq!(format_hours(23.999), "00:00");
    }
}
