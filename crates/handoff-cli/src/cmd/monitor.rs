use crate::output::{print_banner, print_json};
use anyhow::Context;
use handoff_core::monitor::{self, ContextUsage, CHECK_INTERVAL_SECS};
use std::time::Duration;

const RULE: usize = 60;

pub fn run(threshold: u8, watch: bool, install_hook: bool, json: bool) -> anyhow::Result<()> {
    if install_hook {
        return print_hook(threshold, json);
    }
    if watch {
        if json {
            anyhow::bail!("--watch redraws a status screen and cannot be combined with --json");
        }
        return watch_loop(threshold);
    }

    let usage = monitor::estimate_current()?;
    if json {
        let mut value = serde_json::to_value(&usage)?;
        value["threshold"] = threshold.into();
        value["should_handoff"] = usage.should_handoff(threshold).into();
        print_json(&value)?;
    } else {
        print_status(&usage, threshold);
    }

    if usage.should_handoff(threshold) {
        anyhow::bail!(
            "context usage {}% is at or above the {threshold}% threshold",
            usage.percentage
        );
    }
    Ok(())
}

fn print_status(usage: &ContextUsage, threshold: u8) {
    print_banner(
        &format!(
            "Context Monitor  {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        ),
        RULE,
    );
    println!("Status:         {}", usage.status);
    println!(
        "Tokens Used:    {} / {}",
        usage.tokens_used, usage.tokens_total
    );
    println!("Usage:          {}%", usage.percentage);
    match &usage.context_path {
        Some(path) => println!("Source:         {}", path.display()),
        None => println!("Source:         session directories"),
    }
    println!("\n[{}] {}%", usage.bar(), usage.percentage);

    if usage.should_handoff(threshold) {
        print_banner("RECOMMENDATION: write a handoff now", RULE);
        println!(
            "Your context is at {}% (threshold: {threshold}%).",
            usage.percentage
        );
        println!("Run: handoff run\n");
    } else if usage.approaching(threshold) {
        println!("\nApproaching threshold. Consider `handoff run` soon.\n");
    } else {
        println!("\nContext level is healthy.\n");
    }
}

fn watch_loop(threshold: u8) -> anyhow::Result<()> {
    println!("Monitoring context usage (updating every {CHECK_INTERVAL_SECS}s). Press Ctrl+C to stop.");
    loop {
        let usage = monitor::estimate_current()?;
        // Clear the screen and move the cursor home.
        print!("\x1b[2J\x1b[H");
        print_status(&usage, threshold);
        std::thread::sleep(Duration::from_secs(CHECK_INTERVAL_SECS));
    }
}

fn print_hook(threshold: u8, json: bool) -> anyhow::Result<()> {
    let exe = std::env::current_exe().context("failed to locate the handoff binary")?;
    let command = format!("{} monitor --threshold {threshold}", exe.display());
    let hook = monitor::hook_config(&command);
    if json {
        return print_json(&hook);
    }
    print_banner("Hook Installation", RULE);
    println!("Add the following to your ~/.claude/settings.json:\n");
    print_json(&hook)?;
    println!("\nThe check then runs at the start of each session and warns when");
    println!("context usage is above the threshold.");
    Ok(())
}
