//! Interactive conversion session.
//!
//! One engine lives for the whole session, so history accumulates and the
//! provider can be switched between online and offline without restarting.
use super::convert::format_conversion;
use super::rates::display_rates_table;
use super::{rates_status, refresh_message, refresh_with_spinner, ui};
use crate::core::{ConversionEngine, ConversionRecord};
use crate::providers::ProviderFactory;
use anyhow::{Result, anyhow};
use comfy_table::Cell;
use std::io::Write;
use std::str::FromStr;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::debug;

const HELP: &str = "\
Commands:
  <amount> <from> <to>   convert, e.g. `100 USD EUR`
  swap                   convert the last result back the other way round
  history                show the last 10 conversions, newest first
  clear                  clear the history
  online | offline       switch rate provider
  refresh                fetch the latest rates
  rates                  show the current rate table
  help                   show this help
  quit                   leave the session";

#[derive(Debug, Clone, PartialEq)]
pub enum ShellCommand {
    Convert {
        amount: String,
        from: String,
        to: String,
    },
    Swap,
    History,
    Clear,
    Online,
    Offline,
    Refresh,
    Rates,
    Help,
    Quit,
}

impl FromStr for ShellCommand {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tokens: Vec<&str> = s.split_whitespace().collect();
        match tokens.as_slice() {
            [amount, from, to] => Ok(ShellCommand::Convert {
                amount: amount.to_string(),
                from: from.to_string(),
                to: to.to_string(),
            }),
            [word] => match word.to_lowercase().as_str() {
                "swap" => Ok(ShellCommand::Swap),
                "history" => Ok(ShellCommand::History),
                "clear" => Ok(ShellCommand::Clear),
                "online" => Ok(ShellCommand::Online),
                "offline" => Ok(ShellCommand::Offline),
                "refresh" => Ok(ShellCommand::Refresh),
                "rates" => Ok(ShellCommand::Rates),
                "help" | "?" => Ok(ShellCommand::Help),
                "quit" | "exit" | "q" => Ok(ShellCommand::Quit),
                _ => Err(anyhow!("Unknown command: {}", s.trim())),
            },
            _ => Err(anyhow!("Unknown command: {}", s.trim())),
        }
    }
}

const HISTORY_DISPLAY_LIMIT: usize = 10;

/// Renders the most recent conversions, newest first.
pub fn display_history_table(records: &[ConversionRecord]) -> String {
    if records.is_empty() {
        return ui::style_text("No conversions yet", ui::StyleType::Subtle);
    }
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Time"),
        ui::header_cell("Amount"),
        ui::header_cell("From"),
        ui::header_cell("To"),
        ui::header_cell("Rate"),
        ui::header_cell("Result"),
    ]);
    for record in records.iter().rev().take(HISTORY_DISPLAY_LIMIT) {
        table.add_row(vec![
            Cell::new(record.timestamp.format("%d.%m.%Y %H:%M")),
            ui::number_cell(format!("{:.2}", record.amount)),
            Cell::new(&record.from_currency),
            Cell::new(&record.to_currency),
            ui::rate_cell(record.rate),
            ui::number_cell(format!("{:.2}", record.result)),
        ]);
    }
    table.to_string()
}

/// Both sides of the last conversion, as entered and as produced.
struct LastConversion {
    amount: String,
    result: String,
    from: String,
    to: String,
}

/// Six decimals at most, trailing zeros dropped, so a result can be fed
/// back in as an amount.
fn format_amount_input(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    let text = format!("{value:.6}");
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

fn convert_and_print<W: Write>(
    engine: &mut ConversionEngine,
    amount: &str,
    from: &str,
    to: &str,
    out: &mut W,
) -> Result<Option<f64>> {
    match engine.convert(amount, from, to) {
        Ok(result) => {
            let history = engine.get_history();
            if let Some(record) = history.last() {
                writeln!(out, "{}", format_conversion(record))?;
            }
            Ok(Some(result))
        }
        Err(e) => {
            writeln!(out, "{}", ui::style_text(&e.to_string(), ui::StyleType::Error))?;
            Ok(None)
        }
    }
}

/// Runs the session until `quit` or end of input.
pub async fn run_session<R, W>(
    engine: &mut ConversionEngine,
    factory: &ProviderFactory,
    input: R,
    out: &mut W,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    writeln!(out, "{HELP}")?;
    writeln!(
        out,
        "{}",
        ui::style_text(&rates_status(engine.provider()), ui::StyleType::Subtle)
    )?;

    let mut lines = input.lines();
    let mut last: Option<LastConversion> = None;

    loop {
        write!(out, "> ")?;
        out.flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let command = match line.parse::<ShellCommand>() {
            Ok(command) => command,
            Err(e) => {
                writeln!(out, "{}", ui::style_text(&e.to_string(), ui::StyleType::Error))?;
                continue;
            }
        };
        debug!(?command, "Shell command");

        match command {
            ShellCommand::Quit => break,
            ShellCommand::Help => writeln!(out, "{HELP}")?,
            ShellCommand::Convert { amount, from, to } => {
                if let Some(result) = convert_and_print(engine, &amount, &from, &to, out)? {
                    let result = format_amount_input(result);
                    last = Some(LastConversion {
                        amount,
                        result,
                        from,
                        to,
                    });
                }
            }
            // The previous result becomes the new amount.
            ShellCommand::Swap => match last.take() {
                Some(previous) => {
                    let converted = convert_and_print(
                        engine,
                        &previous.result,
                        &previous.to,
                        &previous.from,
                        out,
                    )?;
                    last = Some(LastConversion {
                        result: converted
                            .map(format_amount_input)
                            .unwrap_or(previous.amount),
                        amount: previous.result,
                        from: previous.to,
                        to: previous.from,
                    });
                }
                None => writeln!(
                    out,
                    "{}",
                    ui::style_text("Nothing to swap yet", ui::StyleType::Subtle)
                )?,
            },
            ShellCommand::History => {
                writeln!(out, "{}", display_history_table(&engine.get_history()))?
            }
            ShellCommand::Clear => {
                engine.clear_history();
                writeln!(out, "History cleared")?;
            }
            ShellCommand::Online => match factory.online() {
                Ok(provider) => {
                    engine.set_provider(provider);
                    let updated = refresh_with_spinner(engine).await;
                    writeln!(out, "{}", refresh_message(updated, engine.provider()))?;
                    writeln!(out, "{}", rates_status(engine.provider()))?;
                }
                Err(e) => writeln!(
                    out,
                    "{}",
                    ui::style_text(&format!("Cannot go online: {e:#}"), ui::StyleType::Error)
                )?,
            },
            ShellCommand::Offline => {
                engine.set_provider(factory.offline());
                writeln!(out, "{}", rates_status(engine.provider()))?;
            }
            ShellCommand::Refresh => {
                let updated = refresh_with_spinner(engine).await;
                writeln!(out, "{}", refresh_message(updated, engine.provider()))?;
                writeln!(out, "{}", rates_status(engine.provider()))?;
            }
            ShellCommand::Rates => {
                let snapshot = engine.get_all_rates();
                if snapshot.is_empty() {
                    writeln!(
                        out,
                        "{}",
                        ui::style_text("No exchange rates available", ui::StyleType::Error)
                    )?;
                } else {
                    writeln!(out, "{}", display_rates_table(&snapshot, false))?;
                }
            }
        }
    }
    Ok(())
}

/// Interactive session on stdin/stdout.
pub async fn run(engine: &mut ConversionEngine, factory: &ProviderFactory) -> Result<()> {
    if engine.provider().is_online() {
        let updated = refresh_with_spinner(engine).await;
        println!("{}", refresh_message(updated, engine.provider()));
    }
    let input = BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();
    run_session(engine, factory, input, &mut stdout).await
}
