//! Command-line interface and REPL
//!
//! Interactive driver for the simulated host: flip inputs, issue app
//! commands, inject raw status events, and inspect channel state.

use anyhow::Result;
use colored::*;
use rustyline::DefaultEditor;
use std::sync::Arc;

use crate::component::StatusEvent;
use crate::engine::EngineHandle;
use crate::hosts::SimHost;
use crate::registry::ChannelRegistry;

pub async fn run_repl(
    registry: Arc<ChannelRegistry>,
    host: Arc<SimHost>,
    handle: EngineHandle,
) -> Result<()> {
    let mut rl = DefaultEditor::new()?;

    println!("{}", "Impulse GW simulation REPL - type 'help' for commands".bold());

    loop {
        let readline = rl.readline("impulse> ");
        let line = match readline {
            Ok(line) => line,
            Err(_) => break,
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let _ = rl.add_history_entry(line);

        let mut parts = line.split_whitespace();
        let command = parts.next().unwrap_or_default();

        match command {
            "exit" | "quit" => break,
            "help" => print_help(),
            "status" => print_status(&registry, &host),
            "input" => {
                let (Some(id), level) = (
                    parts.next().and_then(|s| s.parse().ok()),
                    parts.next().and_then(parse_level),
                ) else {
                    println!("{}", "usage: input <channel> <on|off|flip>".red());
                    continue;
                };
                let result = match level {
                    Some(level) => host.set_input(id, level),
                    None => host.flip_input(id),
                };
                match result {
                    Some(level) => println!("input:{} -> {}", id, format_level(level)),
                    None => println!("{}", format!("unknown channel {}", id).red()),
                }
            }
            "toggle" => {
                let (Some(id), Some(value)) = (
                    parts.next().and_then(|s| s.parse().ok()),
                    parts.next().and_then(parse_level),
                ) else {
                    println!("{}", "usage: toggle <toggle-id> <on|off>".red());
                    continue;
                };
                match host.app_set_toggle(id, value) {
                    Some(value) => println!("boolean:{} -> {}", id, format_level(value)),
                    None => println!("{}", format!("unknown toggle {}", id).red()),
                }
            }
            "event" => {
                let raw = line.strip_prefix("event").unwrap_or_default().trim();
                match serde_json::from_str::<StatusEvent>(raw) {
                    Ok(event) => {
                        handle.publish_status(event);
                        println!("{}", "event published".green());
                    }
                    Err(e) => println!("{}", format!("invalid event JSON: {}", e).red()),
                }
            }
            other => {
                println!("{}", format!("unknown command: {}", other).red());
            }
        }
    }

    Ok(())
}

fn print_help() {
    println!("{}", "Commands:".bold());
    println!("  status                      show channel levels");
    println!("  input <channel> <on|off|flip>  actuate a wall switch");
    println!("  toggle <toggle-id> <on|off>    simulate an app command");
    println!("  event <json>                inject a raw status event");
    println!("                              e.g. event {{\"component\":\"input:0\",\"delta\":{{\"state\":true}}}}");
    println!("  exit                        quit");
}

fn print_status(registry: &ChannelRegistry, host: &SimHost) {
    println!(
        "{:<12} {:>4} {:>8} {:>9} {:>7} {:>7}",
        "name".bold(),
        "ch".bold(),
        "toggle".bold(),
        "enabled".bold(),
        "input".bold(),
        "value".bold()
    );
    for channel in registry.all_channels() {
        let enabled = if channel.enabled {
            "yes".green()
        } else {
            "no".yellow()
        };
        let input = level_cell(host.input_level(channel.id));
        let value = level_cell(host.toggle_level(channel.toggle_id));
        println!(
            "{:<12} {:>4} {:>8} {:>9} {:>7} {:>7}",
            channel.name, channel.id, channel.toggle_id, enabled, input, value
        );
    }
}

fn level_cell(level: Option<bool>) -> ColoredString {
    match level {
        Some(level) => format_level(level),
        None => "?".red(),
    }
}

fn parse_level(s: &str) -> Option<bool> {
    match s {
        "on" | "true" | "1" => Some(true),
        "off" | "false" | "0" => Some(false),
        _ => None,
    }
}

fn format_level(level: bool) -> ColoredString {
    if level {
        "on".green()
    } else {
        "off".dimmed()
    }
}
