use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};
use solis_cloud::api::solis::{
    Inverter,
    InverterPower,
    StationData,
    StationDataMap,
    StationPower,
    UserStation,
};

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED).apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    table.enforce_styling();
    table.set_header(header);
    table
}

fn number(value: f64) -> Cell {
    Cell::new(format!("{value:.2}")).set_alignment(CellAlignment::Right)
}

#[must_use]
pub fn build_stations_table(stations: &[UserStation]) -> Table {
    let mut table = new_table(vec!["ID", "Name", "Power", "Today", "Month", "Year", "Total", "Income"]);
    for station in stations {
        table.add_row(vec![
            Cell::new(&station.id).add_attribute(Attribute::Dim),
            Cell::new(station.name.as_deref().unwrap_or_default()),
            number(station.power),
            number(station.day_energy),
            number(station.month_energy),
            number(station.year_energy),
            number(station.all_energy),
            number(station.all_income),
        ]);
    }
    table
}

#[must_use]
pub fn build_inverters_table(inverters: &[Inverter]) -> Table {
    let mut table = new_table(vec!["ID", "Serial number", "Updated", "AC power", "Today", "Total"]);
    for inverter in inverters {
        table.add_row(vec![
            Cell::new(&inverter.id).add_attribute(Attribute::Dim),
            Cell::new(inverter.serial_number.as_deref().unwrap_or_default()),
            Cell::new(inverter.data_timestamp_str.as_deref().unwrap_or_default()),
            number(inverter.pac),
            number(inverter.energy_today),
            number(inverter.energy_total),
        ]);
    }
    table
}

#[must_use]
pub fn build_station_data_table(data: &StationDataMap) -> Table {
    let mut table = new_table(vec![
        "Period", "Energy", "Income", "Import", "Export", "Charge", "Discharge", "Load",
    ]);
    for (period_start, point) in data {
        let totals = point.totals();
        table.add_row(vec![
            Cell::new(period_start.format("%Y-%m-%d")),
            number(totals.energy),
            number(totals.money),
            number(totals.grid_purchased_energy).fg(Color::Red),
            number(totals.grid_sell_energy).fg(Color::Green),
            number(totals.battery_charge_energy),
            number(totals.battery_discharge_energy),
            number(totals.home_load_energy),
        ]);
    }
    table
}

#[must_use]
pub fn build_station_power_table(samples: &[StationPower]) -> Table {
    let mut table = new_table(vec!["Time", "PV", "Battery", "Grid", "Load"]);
    for sample in samples {
        table.add_row(vec![
            Cell::new(sample.time.format("%H:%M")),
            number(sample.pv),
            number(sample.battery).fg(if sample.battery >= 0.0 { Color::Green } else { Color::Red }),
            number(sample.grid).fg(if sample.grid > 0.0 { Color::Red } else { Color::Green }),
            number(sample.load),
        ]);
    }
    table
}

#[must_use]
pub fn build_inverter_power_table(samples: &[InverterPower]) -> Table {
    let mut table = new_table(vec!["Time", "AC power", "Unit", "Temperature"]);
    for sample in samples {
        table.add_row(vec![
            Cell::new(sample.time.format("%H:%M")),
            Cell::new(format!("{:.3}", sample.power)).set_alignment(CellAlignment::Right),
            Cell::new(sample.unit.as_deref().unwrap_or_default()).add_attribute(Attribute::Dim),
            number(sample.temperature),
        ]);
    }
    table
}
