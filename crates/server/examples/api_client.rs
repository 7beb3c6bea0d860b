//! Walk through the card-server HTTP API against a running instance.
//!
//! Start the server first (`cargo run -p card-server`), then:
//! `cargo run -p card-server --example api_client`

use reqwest::Client;
use serde_json::json;

const SERVER_URL: &str = "http://localhost:8088";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let client = Client::new();

    println!("1. Readiness:");
    let resp = client.get(format!("{SERVER_URL}/ready")).send().await?;
    println!("Status: {}", resp.status());
    println!("Body: {}", resp.text().await?);
    println!();

    println!("2. Cards similar to a pair of burn spells:");
    let resp = client
        .post(format!("{SERVER_URL}/similar"))
        .json(&json!({ "names": ["Lightning Bolt", "Shock"], "k": 5 }))
        .send()
        .await?;
    println!("Status: {}", resp.status());
    println!("Body: {}", resp.text().await?);
    println!();

    println!("3. Legendary creatures near Niv-Mizzet, cheapest first:");
    let resp = client
        .get(format!("{SERVER_URL}/similar"))
        .query(&[
            ("name", "Niv-Mizzet, Parun"),
            ("legendary", "1"),
            ("type", "creature"),
            ("sort", "cmc"),
            ("order", "asc"),
            ("k", "100"),
        ])
        .send()
        .await?;
    println!("Status: {}", resp.status());
    println!("Body: {}", resp.text().await?);
    println!();

    println!("4. Name search:");
    let resp = client
        .get(format!("{SERVER_URL}/cards/search"))
        .query(&[("q", "Lightning"), ("sort", "name"), ("order", "asc")])
        .send()
        .await?;
    println!("Status: {}", resp.status());
    println!("Body: {}", resp.text().await?);
    println!();

    println!("5. Unknown card:");
    let resp = client
        .post(format!("{SERVER_URL}/similar"))
        .json(&json!({ "names": ["Totally Nonexistent Card XYZ"] }))
        .send()
        .await?;
    println!("Status: {}", resp.status());
    println!("Body: {}", resp.text().await?);

    Ok(())
}
