use materials_auth::Page;
use materials_inventory::{CollaboratorDraft, ItemDraft};

use crate::app::App;
use crate::render;
use crate::{CollaboratorCommand, ItemCommand};

pub async fn items(app: &App, cmd: ItemCommand) -> anyhow::Result<()> {
    let session = app.enter(Page::Items).await?;
    match cmd {
        ItemCommand::List { search } => {
            let items = app.catalog.items(&session).await?;
            let needle = search.unwrap_or_default();
            let rows: Vec<_> = items.iter().filter(|i| i.matches(&needle)).collect();
            print!("{}", render::items(&rows));
        }
        ItemCommand::Save {
            id,
            category,
            name,
            sku,
            unit,
            min_stock,
            inactive,
        } => {
            let draft = ItemDraft {
                id,
                category,
                name,
                sku,
                unit,
                min_stock,
                active: !inactive,
            };
            let item = app.catalog.save_item(&session, draft).await?;
            println!("saved {} ({})", item.label(), item.id);
        }
        ItemCommand::Delete { id } => {
            let outcome = app.catalog.delete_item(&session, id).await?;
            println!("item {id}: {outcome}");
        }
    }
    Ok(())
}

pub async fn collaborators(app: &App, cmd: CollaboratorCommand) -> anyhow::Result<()> {
    let session = app.enter(Page::Collaborators).await?;
    match cmd {
        CollaboratorCommand::List { search } => {
            let collaborators = app.catalog.collaborators(&session).await?;
            let needle = search.unwrap_or_default();
            let rows: Vec<_> = collaborators.iter().filter(|c| c.matches(&needle)).collect();
            print!("{}", render::collaborators(&rows));
        }
        CollaboratorCommand::Save {
            id,
            name,
            sector,
            inactive,
        } => {
            let draft = CollaboratorDraft {
                id,
                name,
                sector,
                active: !inactive,
            };
            let collaborator = app.catalog.save_collaborator(&session, draft).await?;
            println!("saved {} ({})", collaborator.name, collaborator.id);
        }
        CollaboratorCommand::Delete { id } => {
            let outcome = app.catalog.delete_collaborator(&session, id).await?;
            println!("collaborator {id}: {outcome}");
        }
    }
    Ok(())
}
