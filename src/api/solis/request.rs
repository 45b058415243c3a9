use chrono::NaiveDate;
use serde::Serialize;

/// Currency of the financial figures, fixed by the protocol.
pub const MONEY: &str = "GBP";

/// Time zone offset of the aggregates, fixed by the protocol.
pub const TIME_ZONE: i32 = 0;

/// List pagination, starting from page 1.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Pagination {
    #[serde(rename = "pageNo")]
    pub page_no: u32,

    #[serde(rename = "pageSize")]
    pub page_size: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self { page_no: 1, page_size: 10 }
    }
}

#[derive(Serialize)]
pub struct UserStationListRequest {
    #[serde(flatten)]
    pub pagination: Pagination,
}

#[derive(Serialize)]
pub struct InverterListRequest {
    #[serde(flatten)]
    pub pagination: Pagination,

    #[serde(rename = "stationId")]
    pub station_id: Option<String>,
}

/// Station aggregate request: all-time, year, month, or day depending on the period field set.
#[must_use]
#[derive(Clone, Debug, Serialize)]
pub struct StationRequest {
    #[serde(rename = "id")]
    pub station_id: String,

    #[serde(rename = "money")]
    pub money: &'static str,

    /// `yyyy`.
    #[serde(rename = "year", skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,

    /// `yyyy-MM`.
    #[serde(rename = "month", skip_serializing_if = "Option::is_none")]
    pub month: Option<String>,

    /// `yyyy-MM-dd`.
    #[serde(rename = "time", skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,

    #[serde(rename = "timeZone")]
    pub time_zone: i32,

    #[serde(rename = "nmiCode")]
    pub nmi_code: Option<String>,
}

impl StationRequest {
    pub fn all(station_id: &str) -> Self {
        Self {
            station_id: station_id.to_owned(),
            money: MONEY,
            year: None,
            month: None,
            time: None,
            time_zone: TIME_ZONE,
            nmi_code: None,
        }
    }

    pub fn year(station_id: &str, year: i32) -> Self {
        Self { year: Some(year.to_string()), ..Self::all(station_id) }
    }

    pub fn month(station_id: &str, year: i32, month: u32) -> Self {
        Self { month: Some(format!("{year}-{month:02}")), ..Self::all(station_id) }
    }

    pub fn day(station_id: &str, day: NaiveDate) -> Self {
        Self { time: Some(day.format("%Y-%m-%d").to_string()), ..Self::all(station_id) }
    }
}

#[derive(Serialize)]
pub struct InverterDayRequest {
    #[serde(rename = "sn")]
    pub serial_number: String,

    /// `yyyy-MM-dd`.
    #[serde(rename = "time")]
    pub time: String,

    #[serde(rename = "timeZone")]
    pub time_zone: i32,
}

impl InverterDayRequest {
    pub fn new(serial_number: &str, day: NaiveDate) -> Self {
        Self {
            serial_number: serial_number.to_owned(),
            time: day.format("%Y-%m-%d").to_string(),
            time_zone: TIME_ZONE,
        }
    }
}
