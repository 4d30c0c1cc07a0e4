//! `adsdash stats` – summarize the persisted error log.

use adsdash_core::storage::KeyValueStore;
use adsdash_core::ErrorHandler;
use anyhow::Result;

pub fn run_stats<S: KeyValueStore>(handler: &ErrorHandler<S>, json: bool) -> Result<()> {
    let stats = handler.stats();
    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("Total: {} (capacity {})", stats.total, handler.log().capacity());
    if stats.total == 0 {
        return Ok(());
    }
    println!();
    println!("{:<16} {}", "CODE/KIND", "COUNT");
    for (key, count) in &stats.breakdown {
        println!("{:<16} {}", key, count);
    }
    println!();
    println!("{:<25} {:<16} {:<14} {:<8} {}", "TIME", "CONTEXT", "KIND", "CODE", "MESSAGE");
    for e in &stats.recent {
        let code = e.code.map(|c| c.to_string()).unwrap_or_else(|| "-".to_string());
        println!(
            "{:<25} {:<16} {:<14} {:<8} {}",
            e.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            e.context,
            e.kind.as_str(),
            code,
            e.message
        );
    }
    Ok(())
}
