use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, TimeZone, Utc};
use serde::{Deserialize, Deserializer, de};
use serde_with::serde_as;

/// Station aggregates keyed by the period start.
pub type StationDataMap = BTreeMap<DateTime<Utc>, StationDataPoint>;

/// Figures shared by all the period aggregates.
#[must_use]
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct StationTotals {
    #[serde(rename = "id", default)]
    pub id: Option<String>,

    /// Income in [`super::request::MONEY`].
    #[serde(rename = "money", default)]
    pub money: f64,

    #[serde(rename = "moneyStr", default)]
    pub money_unit: Option<String>,

    /// Produced energy in [`Self::energy_unit`].
    #[serde(rename = "energy", default)]
    pub energy: f64,

    #[serde(rename = "energyStr", default)]
    pub energy_unit: Option<String>,

    #[serde(rename = "fullHour", default)]
    pub full_hours: f64,

    #[serde(rename = "batteryDischargeEnergy", default)]
    pub battery_discharge_energy: f64,

    #[serde(rename = "batteryChargeEnergy", default)]
    pub battery_charge_energy: f64,

    #[serde(rename = "gridPurchasedEnergy", default)]
    pub grid_purchased_energy: f64,

    #[serde(rename = "gridPurchasedIncome", default)]
    pub grid_purchased_income: f64,

    #[serde(rename = "gridSellEnergy", default)]
    pub grid_sell_energy: f64,

    #[serde(rename = "gridSellIncome", default)]
    pub grid_sell_income: f64,

    #[serde(rename = "homeLoadEnergy", default)]
    pub home_load_energy: f64,

    #[serde(rename = "consumeEnergy", default)]
    pub consume_energy: f64,

    #[serde(rename = "produceEnergy", default)]
    pub produce_energy: f64,

    #[serde(rename = "offSetEnergy", default)]
    pub offset_energy: f64,

    #[serde(rename = "offSetIncome", default)]
    pub offset_income: f64,

    #[serde(rename = "errorFlag", default)]
    pub error_flag: i32,
}

/// Common capability of the station aggregates.
pub trait StationData {
    fn period_start(&self) -> DateTime<Utc>;

    fn totals(&self) -> &StationTotals;
}

/// All-time aggregate of a single year.
#[must_use]
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct StationAllData {
    /// January 1st of the year, midnight UTC.
    #[serde(rename = "year", deserialize_with = "StationAllData::deserialize_year")]
    pub year_start: DateTime<Utc>,

    #[serde(flatten)]
    pub totals: StationTotals,
}

impl StationAllData {
    pub fn year(&self) -> i32 {
        self.year_start.year()
    }

    fn deserialize_year<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let year = i32::deserialize(deserializer)?;
        Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0).single().ok_or_else(|| {
            de::Error::invalid_value(de::Unexpected::Signed(year.into()), &"a valid year")
        })
    }
}

impl StationData for StationAllData {
    fn period_start(&self) -> DateTime<Utc> {
        self.year_start
    }

    fn totals(&self) -> &StationTotals {
        &self.totals
    }
}

/// Yearly or monthly aggregate, identified by the period start in epoch milliseconds.
#[must_use]
#[serde_as]
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct StationPeriodData {
    #[serde_as(as = "serde_with::TimestampMilliSeconds<i64>")]
    #[serde(rename = "date")]
    pub date: DateTime<Utc>,

    #[serde(rename = "dateStr", default)]
    pub date_str: Option<String>,

    #[serde(flatten)]
    pub totals: StationTotals,
}

impl StationData for StationPeriodData {
    fn period_start(&self) -> DateTime<Utc> {
        self.date
    }

    fn totals(&self) -> &StationTotals {
        &self.totals
    }
}

#[must_use]
#[derive(Clone, Debug, PartialEq, derive_more::From)]
pub enum StationDataPoint {
    AllTime(StationAllData),
    Period(StationPeriodData),
}

impl StationData for StationDataPoint {
    fn period_start(&self) -> DateTime<Utc> {
        match self {
            Self::AllTime(data) => data.period_start(),
            Self::Period(data) => data.period_start(),
        }
    }

    fn totals(&self) -> &StationTotals {
        match self {
            Self::AllTime(data) => data.totals(),
            Self::Period(data) => data.totals(),
        }
    }
}

/// Key the records by their period start.
pub fn collect_station_data<D>(records: Vec<D>) -> StationDataMap
where
    D: StationData + Into<StationDataPoint>,
{
    records.into_iter().map(|record| (record.period_start(), record.into())).collect()
}
