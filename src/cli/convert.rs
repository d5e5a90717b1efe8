use super::{rates_status, refresh_message, refresh_with_spinner, ui};
use crate::core::{ConversionEngine, ConversionRecord};
use anyhow::Result;

/// Renders a conversion as `<amount> <from> = <result> <to>` plus its rate.
pub fn format_conversion(record: &ConversionRecord) -> String {
    let result = format!("{:.2} {}", record.result, record.to_currency);
    let rate = format!(
        "1 {} = {:.6} {}",
        record.from_currency, record.rate, record.to_currency
    );
    format!(
        "{:.2} {} = {}\n{}",
        record.amount,
        record.from_currency,
        ui::style_text(&result, ui::StyleType::Result),
        ui::style_text(&rate, ui::StyleType::Subtle)
    )
}

pub async fn run(engine: &mut ConversionEngine, amount: &str, from: &str, to: &str) -> Result<()> {
    if engine.provider().is_online() {
        let updated = refresh_with_spinner(engine).await;
        if !updated {
            eprintln!("{}", refresh_message(updated, engine.provider()));
        }
    }

    engine.convert(amount, from, to)?;

    let history = engine.get_history();
    if let Some(record) = history.last() {
        println!("{}", format_conversion(record));
    }
    println!(
        "{}",
        ui::style_text(&rates_status(engine.provider()), ui::StyleType::Subtle)
    );
    Ok(())
}
