use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use reqwest::Url;
use solis_cloud::{
    api::solis::{Api, DEFAULT_BASE_URL, Pagination},
    prelude::*,
};

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
pub struct Args {
    #[clap(flatten)]
    pub api: SolisApiArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Parser)]
pub struct SolisApiArgs {
    #[clap(long = "key-id", env = "SOLIS_KEY_ID")]
    pub key_id: String,

    #[clap(long = "key-secret", env = "SOLIS_KEY_SECRET", hide_env_values = true)]
    pub key_secret: String,

    #[clap(long = "api-url", env = "SOLIS_API_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: Url,

    /// Log the raw requests and responses.
    #[clap(long, env = "SOLIS_DEBUG")]
    pub debug: bool,
}

impl SolisApiArgs {
    pub fn try_new_client(&self) -> Result<Api> {
        Ok(Api::builder()
            .key_id(&self.key_id)
            .key_secret(&self.key_secret)
            .base_url(self.base_url.as_str())
            .debug(self.debug)
            .build()?)
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// List the stations.
    Stations(PageArgs),

    /// List the inverters.
    Inverters(InvertersArgs),

    /// Yearly totals of the station.
    All(StationArgs),

    /// Monthly totals of the year.
    Year(YearArgs),

    /// Daily totals of the month.
    Month(MonthArgs),

    /// Power samples of the day.
    Day(DayArgs),

    /// Inverter AC power samples of the day.
    InverterDay(InverterDayArgs),
}

#[derive(Copy, Clone, Parser)]
pub struct PageArgs {
    #[clap(long = "page", default_value = "1")]
    pub page_no: u32,

    #[clap(long = "page-size", default_value = "10")]
    pub page_size: u32,
}

impl From<PageArgs> for Pagination {
    fn from(args: PageArgs) -> Self {
        Self { page_no: args.page_no, page_size: args.page_size }
    }
}

#[derive(Parser)]
pub struct InvertersArgs {
    #[clap(flatten)]
    pub page: PageArgs,

    #[clap(long = "station-id", env = "SOLIS_STATION_ID")]
    pub station_id: Option<String>,
}

#[derive(Parser)]
pub struct StationArgs {
    #[clap(long = "station-id", env = "SOLIS_STATION_ID")]
    pub station_id: String,
}

#[derive(Parser)]
pub struct YearArgs {
    #[clap(flatten)]
    pub station: StationArgs,

    pub year: i32,
}

#[derive(Parser)]
pub struct MonthArgs {
    #[clap(flatten)]
    pub station: StationArgs,

    pub year: i32,

    #[clap(value_parser = clap::value_parser!(u32).range(1..=12))]
    pub month: u32,
}

#[derive(Parser)]
pub struct DayArgs {
    #[clap(flatten)]
    pub station: StationArgs,

    /// Day in `YYYY-MM-DD` format.
    pub day: NaiveDate,
}

#[derive(Parser)]
pub struct InverterDayArgs {
    #[clap(long = "serial-number", alias = "sn", env = "SOLIS_INVERTER_SN")]
    pub serial_number: String,

    /// Day in `YYYY-MM-DD` format.
    pub day: NaiveDate,
}
