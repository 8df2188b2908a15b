//! # Seed Data Generator
//!
//! Populates the database with demo registers and transactions for
//! development of the admin front-end.
//!
//! ## Usage
//! ```bash
//! # Generate 30 register sessions (default)
//! cargo run -p caixa-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p caixa-db --bin seed -- --count 100
//!
//! # Specify database path
//! cargo run -p caixa-db --bin seed -- --db ./data/caixa.db
//! ```
//!
//! Each generated register gets an opening float, a handful of inflow and
//! outflow movements, and a randomized position in the lifecycle (roughly a
//! third each open, closed, reconciled) so every admin table state has data.

use chrono::{Duration, Utc};
use std::env;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use caixa_core::TransactionKind;
use caixa_db::{Database, DbConfig, NewRegister, NewTransaction, RegisterFilter};

/// Descriptions used for inflow movements.
const INFLOWS: &[(&str, i64)] = &[
    ("day pass", 2500),
    ("monthly membership (cash)", 9900),
    ("personal training session", 8000),
    ("protein shake", 1200),
    ("towel rental", 500),
    ("locker fee", 300),
];

/// Descriptions used for outflow movements.
const OUTFLOWS: &[(&str, i64)] = &[
    ("cleaning supplies", 1800),
    ("membership refund", 2500),
    ("water delivery", 3500),
    ("petty cash withdrawal", 2000),
];

const OPENING_NOTES: &[&str] = &[
    "morning shift",
    "afternoon shift",
    "evening shift",
    "weekend shift",
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 30;
    let mut db_path = String::from("./caixa_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(30);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Caixa Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of registers to generate (default: 30)");
                println!("  -d, --db <PATH>    Database file path (default: ./caixa_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Caixa Seed Data Generator");
    println!("============================");
    println!("Database:  {}", db_path);
    println!("Registers: {}", count);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.registers().count(&RegisterFilter::default()).await?;
    if existing > 0 {
        println!("⚠ Database already has {} registers", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    // A small fixed pool of operators, like a real front desk roster.
    let operators: Vec<String> = (0..4).map(|_| Uuid::new_v4().to_string()).collect();

    println!();
    println!("Generating registers...");
    let start = std::time::Instant::now();

    let mut transactions = 0usize;
    for n in 0..count {
        let operator_id = operators[n % operators.len()].clone();
        let register = db
            .registers()
            .create(NewRegister {
                operator_id,
                opening_balance_cents: [0, 5_000, 10_000, 20_000][n % 4],
                opening_notes: Some(OPENING_NOTES[n % OPENING_NOTES.len()].to_string()),
            })
            .await?;

        // A few movements per register, mostly inflows.
        for k in 0..(2 + n % 5) {
            let (description, amount) = if k % 4 == 3 {
                OUTFLOWS[(n + k) % OUTFLOWS.len()]
            } else {
                INFLOWS[(n + k) % INFLOWS.len()]
            };
            db.transactions()
                .insert(NewTransaction {
                    register_id: register.id.clone(),
                    kind: if k % 4 == 3 {
                        TransactionKind::Outflow
                    } else {
                        TransactionKind::Inflow
                    },
                    amount_cents: amount,
                    description: Some(description.to_string()),
                })
                .await?;
            transactions += 1;
        }

        // Walk two thirds of the registers forward in the lifecycle.
        if n % 3 != 0 {
            let closed_at = Utc::now() - Duration::hours((n % 24) as i64);
            db.registers().close(&register.id, closed_at).await?;
        }
        if n % 3 == 2 {
            db.registers().reconcile(&register.id).await?;
        }
    }

    println!();
    println!(
        "✓ Seeded {} registers / {} transactions in {:?}",
        count,
        transactions,
        start.elapsed()
    );

    db.close().await;
    Ok(())
}
