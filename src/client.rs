// src/client.rs

//! The interactive client: connects to a server, logs in, and drives the
//! account through a stdin menu loop.

use crate::core::account::Account;
use crate::core::protocol::{ClientCodec, RequestKind, WireRequest, WireResponse};
use anyhow::{Context, Result, anyhow, bail};
use futures::{SinkExt, StreamExt};
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::net::TcpStream;
use tokio_util::codec::Framed;

type ClientFramed = Framed<TcpStream, ClientCodec>;

/// Connects to the server and runs the interactive session until logout or
/// disconnect.
pub async fn run(host: &str, port: u16) -> Result<()> {
    let addr = format!("{host}:{port}");
    let socket = TcpStream::connect(&addr)
        .await
        .with_context(|| format!("Failed to connect to {addr}"))?;
    let mut framed = Framed::new(socket, ClientCodec::new());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let nickname = prompt(&mut lines, "Enter your nickname: ").await?;
    let response = request(
        &mut framed,
        RequestKind::Login,
        json!({ "nickname": nickname }),
    )
    .await?;

    if !response.is_success() {
        println!("Login failed for {nickname}: {}", error_message(&response));
        return Ok(());
    }

    let mut account: Account = field(&response, "account")?;
    let items: BTreeMap<String, i64> = field(&response, "items")?;

    println!("Welcome, {nickname}! You have successfully logged in.");
    println!("Your starting balance: {} credits.", account.credits);

    loop {
        display_main_menu();
        let option = prompt(&mut lines, "Select an option: ").await?;
        match option.trim() {
            "1" => {
                let response = request(
                    &mut framed,
                    RequestKind::GetBalance,
                    json!({ "nickname": nickname }),
                )
                .await?;
                match response.payload.get("credits").and_then(Value::as_i64) {
                    Some(credits) => println!("Your current balance is: {credits} credits."),
                    None => println!("Error: {}", error_message(&response)),
                }
            }
            "2" => {
                println!("Available items for purchase:");
                for (name, price) in &items {
                    println!("{name} - {price} credits");
                }
            }
            "3" => {
                println!("Items you own:");
                for item in &account.items {
                    println!("- {item}");
                }
            }
            "4" => {
                let item_name = prompt(&mut lines, "Enter the name of the item to buy: ").await?;
                let response = request(
                    &mut framed,
                    RequestKind::BuyItem,
                    json!({ "nickname": nickname, "item_name": item_name }),
                )
                .await?;
                if response.is_success() {
                    account = field(&response, "account")?;
                    println!("You have successfully purchased {item_name}.");
                } else {
                    println!("Error: {}", error_message(&response));
                }
            }
            "5" => {
                let item_name = prompt(&mut lines, "Enter the name of the item to sell: ").await?;
                let response = request(
                    &mut framed,
                    RequestKind::SellItem,
                    json!({ "nickname": nickname, "item_name": item_name }),
                )
                .await?;
                if response.is_success() {
                    account = field(&response, "account")?;
                    println!("You have successfully sold {item_name}.");
                } else {
                    println!("Error: {}", error_message(&response));
                }
            }
            "6" => {
                let _ = request(&mut framed, RequestKind::Logout, json!({})).await?;
                println!("You have logged out. Goodbye!");
                break;
            }
            _ => println!("Invalid option. Please try again."),
        }
    }

    println!("Disconnected from the server.");
    Ok(())
}

/// Sends one request and waits for the matching response.
async fn request(
    framed: &mut ClientFramed,
    kind: RequestKind,
    payload: Value,
) -> Result<WireResponse> {
    framed.send(WireRequest::new(kind, payload)).await?;
    match framed.next().await {
        Some(Ok(response)) => Ok(response),
        Some(Err(e)) => Err(e.into()),
        None => bail!("Server closed the connection."),
    }
}

fn display_main_menu() {
    println!("\nMain Menu");
    println!("1 - Show Balance");
    println!("2 - Show Available Items");
    println!("3 - Show Owned Items");
    println!("4 - Buy an Item");
    println!("5 - Sell an Item");
    println!("6 - Logout");
}

/// Prints a prompt and reads one trimmed line from stdin.
async fn prompt(lines: &mut Lines<BufReader<Stdin>>, text: &str) -> Result<String> {
    print!("{text}");
    std::io::stdout().flush()?;
    let line = lines
        .next_line()
        .await?
        .ok_or_else(|| anyhow!("stdin closed"))?;
    Ok(line.trim().to_string())
}

/// Deserializes one payload field of a response.
fn field<T: serde::de::DeserializeOwned>(response: &WireResponse, name: &str) -> Result<T> {
    let value = response
        .payload
        .get(name)
        .cloned()
        .ok_or_else(|| anyhow!("response payload is missing '{name}'"))?;
    Ok(serde_json::from_value(value)?)
}

fn error_message(response: &WireResponse) -> String {
    response
        .payload
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("unknown error")
        .to_string()
}
