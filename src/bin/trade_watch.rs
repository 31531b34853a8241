//! Binary that bootstraps a realtime session and prints trades for the
//! stock codes given on the command line.
//!
//! # Usage
//!
//! ```sh
//! RUST_LOG=tossinvest_rs=debug cargo run --bin trade_watch --features cli -- US20220225003
//! ```

use std::env;

use tossinvest_rs::ws::session::{CloseReason, connect_toss};

#[tokio::main]
async fn main() -> tossinvest_rs::error::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let codes: Vec<String> = env::args().skip(1).collect();
    if codes.is_empty() {
        eprintln!("usage: trade_watch <stock-code>...");
        std::process::exit(2);
    }

    println!("Connecting to Toss Invest realtime WebSocket…");
    let session = connect_toss(|trade| {
        println!(
            "{} {} {:?} {} @ {} {} ({:?})",
            trade.dt, trade.code, trade.trade_type, trade.volume, trade.close, trade.currency,
            trade.change_type
        );
    })
    .await?;

    for code in &codes {
        let id = session.subscribe(code).await?;
        println!("Subscribed {code} (id {id})");
    }

    println!("Listening for trades — Ctrl-C to stop\n");

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            println!("\nInterrupted — unsubscribing…");
            for code in &codes {
                if let Err(e) = session.unsubscribe(code).await {
                    eprintln!("unsubscribe {code}: {e}");
                }
            }
            session.close().await?;
        }
        reason = session.closed() => {
            match reason {
                CloseReason::Requested => println!("Session closed"),
                other => eprintln!("Session ended: {other:?}"),
            }
        }
    }

    println!("Done.");
    Ok(())
}
