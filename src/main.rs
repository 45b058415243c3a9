#![doc = "SolisCloud command-line client."]

mod cli;
mod tables;

use clap::{Parser, crate_version};
use solis_cloud::{api::solis::Pagination, prelude::*};

use crate::{
    cli::{Args, Command},
    tables::{
        build_inverter_power_table,
        build_inverters_table,
        build_station_data_table,
        build_station_power_table,
        build_stations_table,
    },
};

#[tokio::main]
async fn main() -> Result {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().without_time().compact().init();
    info!(version = crate_version!(), "starting…");

    let args = Args::parse();
    let api = args.api.try_new_client()?;

    let table = match args.command {
        Command::Stations(args) => {
            build_stations_table(&api.user_station_list(Pagination::from(args)).await?)
        }
        Command::Inverters(args) => build_inverters_table(
            &api.inverter_list(args.page.into(), args.station_id.as_deref()).await?,
        ),
        Command::All(args) => build_station_data_table(&*api.station_all(&args.station_id).await?),
        Command::Year(args) => {
            build_station_data_table(&*api.station_year(&args.station.station_id, args.year).await?)
        }
        Command::Month(args) => build_station_data_table(
            &*api.station_month(&args.station.station_id, args.year, args.month).await?,
        ),
        Command::Day(args) => {
            build_station_power_table(&api.station_day(&args.station.station_id, args.day).await?)
        }
        Command::InverterDay(args) => {
            build_inverter_power_table(&api.inverter_day(&args.serial_number, args.day).await?)
        }
    };
    println!("{table}");

    Ok(())
}
