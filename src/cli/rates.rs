use super::{rates_status, refresh_message, refresh_with_spinner, ui};
use crate::core::{ConversionEngine, Currency, RateSnapshot};
use anyhow::Result;
use comfy_table::Cell;

/// Table of multipliers against the snapshot's base currency.
///
/// Only supported currencies are listed unless `all` is set.
pub fn display_rates_table(snapshot: &RateSnapshot, all: bool) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Code"),
        ui::header_cell("Currency"),
        ui::header_cell(&format!("Per 1 {}", snapshot.base_currency)),
    ]);

    let mut codes: Vec<&String> = snapshot
        .rates
        .keys()
        .filter(|code| all || Currency::is_supported(code))
        .collect();
    codes.sort();

    for code in codes {
        let name = code.parse::<Currency>().map_or("", |c| c.name());
        table.add_row(vec![
            Cell::new(code),
            Cell::new(name),
            ui::rate_cell(snapshot.exchange_rate(&snapshot.base_currency, code)),
        ]);
    }
    table.to_string()
}

pub fn display_currencies_table() -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Code"), ui::header_cell("Currency")]);
    for currency in ConversionEngine::supported_currencies() {
        table.add_row(vec![Cell::new(currency.code()), Cell::new(currency.name())]);
    }
    table.to_string()
}

pub async fn run(engine: &ConversionEngine, all: bool) -> Result<()> {
    if engine.provider().is_online() {
        let updated = refresh_with_spinner(engine).await;
        if !updated {
            eprintln!("{}", refresh_message(updated, engine.provider()));
        }
    }

    let snapshot = engine.get_all_rates();
    if snapshot.is_empty() {
        println!(
            "{}",
            ui::style_text("No exchange rates available", ui::StyleType::Error)
        );
        return Ok(());
    }
    println!("{}", display_rates_table(&snapshot, all));
    println!(
        "{}",
        ui::style_text(&rates_status(engine.provider()), ui::StyleType::Subtle)
    );
    Ok(())
}

pub async fn refresh(engine: &ConversionEngine) -> Result<()> {
    let updated = refresh_with_spinner(engine).await;
    println!("{}", refresh_message(updated, engine.provider()));
    println!(
        "{}",
        ui::style_text(&rates_status(engine.provider()), ui::StyleType::Subtle)
    );
    Ok(())
}

pub fn currencies() -> Result<()> {
    println!("{}", display_currencies_table());
    Ok(())
}
