use chrono::{DateTime, FixedOffset, Utc};
use serde::Deserialize;
use serde_with::serde_as;

use crate::prelude::*;

/// `data` of the list responses.
#[serde_as]
#[derive(Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ListData<T> {
    #[serde_as(as = "serde_with::DefaultOnNull")]
    #[serde(rename = "page", default)]
    pub page: Page<T>,
}

impl<T> Default for ListData<T> {
    fn default() -> Self {
        Self { page: Page::default() }
    }
}

#[serde_as]
#[derive(Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Page<T> {
    #[serde(rename = "current", default)]
    pub current: Option<u32>,

    #[serde(rename = "pages", default)]
    pub n_pages: Option<u32>,

    #[serde_as(as = "serde_with::DefaultOnNull")]
    #[serde(rename = "records", default)]
    pub records: Vec<T>,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self { current: None, n_pages: None, records: Vec::new() }
    }
}

#[must_use]
#[derive(Clone, Debug, Deserialize)]
pub struct UserStation {
    #[serde(rename = "id")]
    pub id: String,

    #[serde(rename = "stationName", default)]
    pub name: Option<String>,

    #[serde(rename = "installer", default)]
    pub installer: Option<String>,

    #[serde(rename = "installerId", default)]
    pub installer_id: Option<String>,

    #[serde(rename = "allEnergy1", default)]
    pub all_energy: f64,

    #[serde(rename = "allIncome", default)]
    pub all_income: f64,

    #[serde(rename = "dayEnergy1", default)]
    pub day_energy: f64,

    #[serde(rename = "dayIncome", default)]
    pub day_income: f64,

    #[serde(rename = "gridPurchasedTodayEnergy", default)]
    pub grid_purchased_today_energy: f64,

    #[serde(rename = "gridPurchasedTotalEnergy", default)]
    pub grid_purchased_total_energy: f64,

    #[serde(rename = "gridSellTodayEnergy", default)]
    pub grid_sell_today_energy: f64,

    #[serde(rename = "gridSellTotalEnergy", default)]
    pub grid_sell_total_energy: f64,

    #[serde(rename = "homeLoadTodayEnergy", default)]
    pub home_load_today_energy: f64,

    #[serde(rename = "homeLoadTotalEnergy", default)]
    pub home_load_total_energy: f64,

    #[serde(rename = "monthEnergy1", default)]
    pub month_energy: f64,

    /// Current power.
    #[serde(rename = "power1", default)]
    pub power: f64,

    #[serde(rename = "yearEnergy1", default)]
    pub year_energy: f64,
}

#[must_use]
#[derive(Clone, Debug, Deserialize)]
pub struct Inverter {
    #[serde(rename = "id")]
    pub id: String,

    #[serde(rename = "sn", default)]
    pub serial_number: Option<String>,

    #[serde(rename = "collectorId", default)]
    pub collector_id: Option<String>,

    #[serde(rename = "collectorSn", default)]
    pub collector_serial_number: Option<String>,

    #[serde(rename = "dataTimestamp", default)]
    pub data_timestamp: Option<String>,

    #[serde(rename = "dataTimestampStr", default)]
    pub data_timestamp_str: Option<String>,

    #[serde(rename = "etoday1", default)]
    pub energy_today: f64,

    #[serde(rename = "etotal1", default)]
    pub energy_total: f64,

    #[serde(rename = "familyLoadPower", default)]
    pub family_load_power: f64,

    #[serde(rename = "gridPurchasedTodayEnergy", default)]
    pub grid_purchased_today_energy: f64,

    #[serde(rename = "gridSellTodayEnergy", default)]
    pub grid_sell_today_energy: f64,

    #[serde(rename = "homeLoadTodayEnergy", default)]
    pub home_load_today_energy: f64,

    #[serde(rename = "pac1", default)]
    pub pac: f64,

    #[serde(rename = "pow1", default)]
    pub pow1: f64,

    #[serde(rename = "pow2", default)]
    pub pow2: f64,

    #[serde(rename = "power1", default)]
    pub power: f64,

    #[serde(rename = "totalFullHour", default)]
    pub total_full_hours: f64,

    #[serde(rename = "totalLoadPower", default)]
    pub total_load_power: f64,
}

/// Raw `stationDay` sample.
#[serde_as]
#[derive(Deserialize)]
pub struct StationDayData {
    #[serde_as(as = "serde_with::TimestampMilliSeconds<i64>")]
    #[serde(rename = "time")]
    pub time: DateTime<Utc>,

    /// Time zone offset in hours.
    #[serde(rename = "timeZone", default)]
    pub time_zone: f64,

    #[serde(rename = "produceEnergy", default)]
    pub produce_energy: f64,

    #[serde(rename = "batteryPower", default)]
    pub battery_power: f64,

    #[serde(rename = "psum", default)]
    pub grid_power: f64,

    #[serde(rename = "consumeEnergy", default)]
    pub consume_energy: f64,

    #[serde(rename = "familyLoadPower", default)]
    pub family_load_power: f64,

    #[serde(rename = "power", default)]
    pub power: f64,
}

/// Station power sample in the station local time.
#[must_use]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct StationPower {
    pub time: DateTime<FixedOffset>,

    /// Produced energy.
    pub pv: f64,

    /// Battery power, positive when charging.
    pub battery: f64,

    /// Net grid power.
    pub grid: f64,

    /// Consumed energy.
    pub load: f64,
}

impl TryFrom<StationDayData> for StationPower {
    type Error = Error;

    fn try_from(data: StationDayData) -> Result<Self> {
        Ok(Self {
            time: data.time.with_timezone(&offset_from_hours(data.time_zone)?),
            pv: data.produce_energy,
            battery: data.battery_power,
            grid: data.grid_power,
            load: data.consume_energy,
        })
    }
}

/// Raw `inverterDay` sample.
#[serde_as]
#[derive(Deserialize)]
pub struct InverterDayData {
    #[serde_as(as = "serde_with::TimestampMilliSeconds<String>")]
    #[serde(rename = "dataTimestamp")]
    pub timestamp: DateTime<Utc>,

    #[serde(rename = "timeZone", default)]
    pub time_zone: f64,

    #[serde(rename = "inverterTemperature", default)]
    pub temperature: f64,

    #[serde(rename = "pac", default)]
    pub pac: f64,

    /// Multiplier of [`Self::pac`].
    #[serde_as(as = "Option<serde_with::DisplayFromStr>")]
    #[serde(rename = "pacPec", default)]
    pub pac_precision: Option<f64>,

    #[serde(rename = "pacStr", default)]
    pub pac_unit: Option<String>,
}

/// Inverter AC power sample in the station local time.
#[must_use]
#[derive(Clone, Debug, PartialEq)]
pub struct InverterPower {
    pub time: DateTime<FixedOffset>,
    pub power: f64,
    pub unit: Option<String>,
    pub temperature: f64,
}

impl TryFrom<InverterDayData> for InverterPower {
    type Error = Error;

    fn try_from(data: InverterDayData) -> Result<Self> {
        Ok(Self {
            time: data.timestamp.with_timezone(&offset_from_hours(data.time_zone)?),
            power: data.pac * data.pac_precision.unwrap_or(1.0),
            unit: data.pac_unit,
            temperature: data.temperature,
        })
    }
}

#[allow(clippy::cast_possible_truncation)]
fn offset_from_hours(hours: f64) -> Result<FixedOffset> {
    let seconds = (hours * 3600.0).round();
    if !seconds.is_finite() {
        bail!("invalid time zone offset: {hours}");
    }
    FixedOffset::east_opt(seconds as i32).with_context(|| format!("invalid time zone offset: {hours}"))
}
