use registrar::prelude::*;
use serde_json::Value;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// `registrar-shell [USERNAME [PASSWORD]]`, falling back to
/// `REGISTRAR_USERNAME` / `REGISTRAR_PASSWORD`.
fn credentials_from(
    args: &[String],
    env: impl Fn(&str) -> Option<String>,
) -> Option<Credentials> {
    let username = args.first().cloned().or_else(|| env("REGISTRAR_USERNAME"))?;
    let password = args.get(1).cloned().or_else(|| env("REGISTRAR_PASSWORD"))?;
    Some(Credentials::new(username, password))
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Student listings come back either as a bare array or paginated
/// (`{"count": .., "results": [..]}`).
fn student_count(payload: &Value) -> usize {
    match payload {
        Value::Array(items) => items.len(),
        Value::Object(map) => map
            .get("count")
            .and_then(Value::as_u64)
            .map(|n| n as usize)
            .or_else(|| map.get("results").and_then(Value::as_array).map(Vec::len))
            .unwrap_or(0),
        _ => 0,
    }
}

fn print_stats(payload: &Value) {
    let Some(stats) = payload.as_object() else {
        println!("dashboard: {payload}");
        return;
    };
    println!("dashboard:");
    for (key, value) in stats {
        println!("  {key:<24} {value}");
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    registrar::init_tracing();

    let client = RegistrarClientBuilder::new()
        .config(ClientConfig::from_env()?)
        .build(|route: &str| tracing::warn!(%route, "session over, sign in again"))?;

    let user = match client.bootstrap().await {
        Some(user) => user,
        None => {
            let args: Vec<String> = std::env::args().skip(1).collect();
            let Some(credentials) = credentials_from(&args, |k| std::env::var(k).ok()) else {
                eprintln!("usage: registrar-shell USERNAME PASSWORD");
                return Ok(());
            };
            client.sign_in(&credentials).await?
        }
    };
    println!("signed in as {} ({})", user.username, user.id);

    match client.gateway().dashboard_stats().await {
        Ok(envelope) => {
            if let Some(stats) = envelope.payload() {
                print_stats(stats);
            }
        }
        Err(e) => eprintln!("dashboard unavailable: {e}"),
    }

    let students = client.gateway().students(&StudentQuery::default()).await?;
    let count = students.payload().map(student_count).unwrap_or(0);
    println!("{count} students on record");

    if let Some(overlay) = client.session().expiry_overlay() {
        println!(
            "session expired; signing out in {:.0}s",
            overlay.remaining.as_secs_f64()
        );
    }

    client.shutdown();
    Ok(())
}
