use materials_auth::Page;
use materials_inventory::Quantity;

use crate::app::App;

pub async fn entry(app: &App, item: &str, quantity: &str, note: Option<String>) -> anyhow::Result<()> {
    let quantity = Quantity::parse(quantity)?;
    let session = app.enter(Page::Entry).await?;
    let item = app.resolve_item(&session, item).await?;

    let recorded = app.ledger.record_entry(&session, item.id, quantity, note).await?;
    let balance = app.ledger.balance(&session, item.id).await?;
    println!(
        "entry of {quantity} {} recorded for {} (type {}); balance now {}",
        item.unit,
        item.label(),
        recorded.label,
        balance.map_or_else(|| "unknown".to_string(), |b| b.to_string()),
    );
    Ok(())
}

pub async fn exit(
    app: &App,
    item: &str,
    quantity: &str,
    receiver: Option<&str>,
    note: Option<String>,
) -> anyhow::Result<()> {
    let quantity = Quantity::parse(quantity)?;
    let session = app.enter(Page::Exit).await?;
    let item = app.resolve_item(&session, item).await?;
    let receiver = match receiver {
        Some(needle) => Some(app.resolve_receiver(&session, needle).await?),
        None => None,
    };

    let recorded = app
        .ledger
        .record_exit(&session, item.id, quantity, receiver.as_ref().map(|r| r.id), note)
        .await?;
    let balance = app.ledger.balance(&session, item.id).await?;
    println!(
        "exit of {quantity} {} of {} to {} recorded (type {}); balance now {}",
        item.unit,
        item.label(),
        receiver.map(|r| r.name).unwrap_or_default(),
        recorded.label,
        balance.map_or_else(|| "unknown".to_string(), |b| b.to_string()),
    );
    Ok(())
}
