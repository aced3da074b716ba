/// Physical unit a schedule type or limits object is expressed in.
///
/// Unit types are compared through this resolution, not as strings, so that
/// e.g. `"Capacity"` and `"Power"` are interchangeable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Unit {
    Dimensionless,
    Celsius,
    DeltaCelsius,
    MetersPerSecond,
    Degrees,
    WattsPerSquareMeterKelvin,
    WattsPerPerson,
    Watts,
    WattsPerMeter,
    Percent,
    KilogramsPerSecond,
    CubicMetersPerSecond,
    RevolutionsPerMinute,
    Clo,
    Pascals,
    /// Text that names no known unit type. Equal only to the same spelling.
    Unrecognized(String),
}

/// Resolves a unit type (case-insensitive) to its unit.
pub fn units_for(unit_type: &str) -> Unit {
    let key = unit_type.trim().to_ascii_lowercase();
    match key.as_str() {
        "" | "dimensionless" | "availability" | "controlmode" | "control" | "mode" => {
            Unit::Dimensionless
        }
        "temperature" => Unit::Celsius,
        "deltatemperature" => Unit::DeltaCelsius,
        "velocity" | "precipitationrate" => Unit::MetersPerSecond,
        "angle" => Unit::Degrees,
        "convectioncoefficient" => Unit::WattsPerSquareMeterKelvin,
        "activitylevel" => Unit::WattsPerPerson,
        "capacity" | "power" => Unit::Watts,
        "linearpowerdensity" => Unit::WattsPerMeter,
        "percent" => Unit::Percent,
        "massflowrate" => Unit::KilogramsPerSecond,
        "volumetricflowrate" => Unit::CubicMetersPerSecond,
        "rotationsperminute" => Unit::RevolutionsPerMinute,
        "clothinginsulation" => Unit::Clo,
        "pressure" => Unit::Pascals,
        _ => Unit::Unrecognized(key),
    }
}
