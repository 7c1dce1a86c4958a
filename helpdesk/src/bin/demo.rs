//! Helpdesk Demo
//!
//! Walks through the ticket lifecycle against in-memory collaborators:
//! - Routing gate waiting for the first session report
//! - Sign-in (including a rejected attempt)
//! - Registering tickets and watching the live open list
//! - Closing a ticket, then reloading it
//! - Sign-out
//!
//! # Usage
//!
//! ```bash
//! RUST_LOG=info,helpdesk=debug cargo run --bin helpdesk-demo
//! ```

use helpdesk::{Config, Helpdesk, Notification, Screen};
use helpdesk_core::environment::SystemClock;
use helpdesk_core::ticket::TicketStatus;
use helpdesk_testing::{InMemoryAuthProvider, InMemoryDocumentStore};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const WAIT: Duration = Duration::from_secs(2);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,helpdesk=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("\n🛠  ============================================");
    println!("   Helpdesk - Live Demo");
    println!("============================================\n");

    let config = Config::from_env();
    let auth = InMemoryAuthProvider::new().with_account("tech@example.com", "secret", "tech-1");
    let store = InMemoryDocumentStore::new(Arc::new(SystemClock)).with_collection(config.collection.clone());

    let helpdesk = Helpdesk::start(config, Arc::new(auth), Arc::new(store))?;
    let gate = helpdesk.routing_gate();

    // Step 1: first session report
    gate.wait_for_screen(Screen::SignIn, WAIT).await?;
    println!("1️⃣  No session: showing the sign-in screen");

    // Step 2: sign in
    if let Err(error) = helpdesk.session().sign_in("tech@example.com", "wrong").await {
        println!("   ✗ {}", Notification::sign_in_failed(&error));
    }
    let session = helpdesk.session().sign_in("tech@example.com", "secret").await?;
    gate.wait_for_screen(Screen::App, WAIT).await?;
    println!("2️⃣  Signed in as {}\n", session.user_id);

    // Step 3: live list of open tickets
    let list = helpdesk.ticket_list();
    let subscription = list.activate(TicketStatus::Open).await?;

    let psu = helpdesk.registrar().register("1234", "no power").await?;
    helpdesk.registrar().register("5678", "cracked screen").await?;
    list.wait_for(|s| s.items.len() == 2, WAIT).await?;

    println!("3️⃣  Open requests:");
    for item in list.items().await {
        println!("   • [{}] {} - {} ({})", item.id, item.patrimony, item.description, item.when);
    }

    // Step 4: close one from its detail screen
    let detail = helpdesk.ticket_detail(psu.clone()).await?;
    if let Err(error) = detail.submit_close("").await {
        println!("\n   ✗ {}", Notification::close_failed(&error));
    }
    detail.submit_close("replaced PSU").await?;
    println!("\n4️⃣  {}", Notification::ticket_closed());

    list.wait_for(|s| s.items.len() == 1, WAIT).await?;
    println!("   Open requests left: {}", list.items().await.len());

    let closed = helpdesk.loader().load(&psu).await?;
    println!(
        "   {} closed at {} with \"{}\"",
        closed.id,
        closed.closed.as_deref().unwrap_or("-"),
        closed.solution
    );

    if let Err(error) = helpdesk.closer().close(&psu, "again").await {
        println!("   ✗ {}", Notification::close_failed(&error));
    }

    // Step 5: switch the list to closed tickets
    list.select_filter(TicketStatus::Closed).await?;
    list.wait_for(|s| !s.loading, WAIT).await?;
    println!("\n5️⃣  Closed requests: {}", list.items().await.len());
    subscription.release().await?;

    // Step 6: sign out
    helpdesk.session().sign_out().await?;
    gate.wait_for_screen(Screen::SignIn, WAIT).await?;
    println!("6️⃣  Signed out\n");

    list.shutdown(helpdesk.config().shutdown_timeout()).await?;
    println!("✓ Demo complete");
    Ok(())
}
