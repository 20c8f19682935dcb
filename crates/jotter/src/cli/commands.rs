use super::render::{self, ItemRef};
use super::setup::{CheckCommands, Commands, ListFilter, TagCommands};
use anyhow::{bail, Result};
use jotterapp::blocks::ItemRemoval;
use jotterapp::config::{JotterConfig, SessionTimings};
use jotterapp::formatting::char_len;
use jotterapp::model::FormatType;
use jotterapp::session::{DeleteOutcome, DocumentRequest, EditorSession, SaveOutcome};
use jotterapp::store::fs::FileStore;
use jotterapp::store::{BlockStore, DocumentFilter, DocumentStore};
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

type Session = EditorSession<FileStore, FileStore>;

pub struct AppContext {
    pub store: Arc<FileStore>,
    pub timings: SessionTimings,
    pub config: JotterConfig,
    pub data_dir: PathBuf,
    pub config_file: Option<PathBuf>,
}

pub async fn dispatch(ctx: &AppContext, command: Commands) -> Result<()> {
    match command {
        Commands::New { text, title } => new_note(ctx, title, text).await,
        Commands::List { filter } => list(ctx, filter).await,
        Commands::Show { id } => show(ctx, &id).await,
        Commands::Edit { id, title, text } => edit(ctx, &id, title, text).await,
        Commands::Format {
            id,
            start,
            end,
            style,
        } => format_range(ctx, &id, start, end, &style).await,
        Commands::Tag { action } => tag(ctx, action).await,
        Commands::Check { action } => check(ctx, action).await,
        Commands::Pin { id } => {
            let id = modify(ctx, &id, |s| s.set_pinned(true)).await?;
            report(format!("Pinned {}", id));
            Ok(())
        }
        Commands::Unpin { id } => {
            let id = modify(ctx, &id, |s| s.set_pinned(false)).await?;
            report(format!("Unpinned {}", id));
            Ok(())
        }
        Commands::Archive { id } => {
            let id = modify(ctx, &id, |s| s.set_archived(true)).await?;
            report(format!("Archived {}", id));
            Ok(())
        }
        Commands::Unarchive { id } => {
            let id = modify(ctx, &id, |s| s.set_archived(false)).await?;
            report(format!("Unarchived {}", id));
            Ok(())
        }
        Commands::Delete { id } => delete(ctx, &id).await,
        Commands::Restore { id } => {
            let id = resolve_id(&ctx.store, &id).await?;
            ctx.store.restore_from_trash(id).await?;
            report(format!("Restored {}", id));
            Ok(())
        }
        Commands::Purge { id } => {
            let id = resolve_id(&ctx.store, &id).await?;
            ctx.store.delete_permanently(id).await?;
            report(format!("Purged {}", id));
            Ok(())
        }
        Commands::EmptyTrash => {
            let removed = ctx.store.empty_trash().await?;
            report(format!("Removed {} note(s) from the trash", removed));
            Ok(())
        }
        Commands::Config => {
            print!(
                "{}",
                render::render_config(&ctx.config, &ctx.data_dir, ctx.config_file.as_deref())
            );
            Ok(())
        }
    }
}

fn report(message: String) {
    print!("{}", render::success(&message));
}

/// Resolves a full id or a unique id prefix, across all notes including
/// archived and trashed ones.
async fn resolve_id(store: &FileStore, reference: &str) -> Result<Uuid> {
    let reference = reference.trim().to_ascii_lowercase();
    if reference.is_empty() {
        bail!("Empty note id");
    }
    let matches: Vec<Uuid> = store
        .list(DocumentFilter::All)
        .await?
        .into_iter()
        .map(|doc| doc.id())
        .filter(|id| id.to_string().starts_with(&reference))
        .collect();
    match matches.as_slice() {
        [id] => Ok(*id),
        [] => bail!("No note matches '{}'", reference),
        _ => bail!(
            "'{}' matches {} notes, use a longer id",
            reference,
            matches.len()
        ),
    }
}

async fn open(ctx: &AppContext, id: Uuid) -> Result<Session> {
    let session = EditorSession::open_in(
        Arc::clone(&ctx.store),
        DocumentRequest::Existing(id),
        ctx.timings,
    )
    .await?;
    Ok(session)
}

/// Opens a session on `reference`, applies `change` and closes the session,
/// which flushes the save it scheduled.
async fn modify(ctx: &AppContext, reference: &str, change: impl FnOnce(&Session)) -> Result<Uuid> {
    let id = resolve_id(&ctx.store, reference).await?;
    let session = open(ctx, id).await?;
    change(&session);
    session.close().await?;
    Ok(id)
}

async fn new_note(ctx: &AppContext, title: Option<String>, text: Option<String>) -> Result<()> {
    let session: Session =
        EditorSession::open_in(Arc::clone(&ctx.store), DocumentRequest::New, ctx.timings).await?;
    if let Some(title) = title {
        session.set_title(title);
    }
    if let Some(text) = text {
        session.set_content(text);
    }
    let outcome = session.save_now().await?;
    let id = session.document_id();
    session.close().await?;

    if outcome == SaveOutcome::SkippedBlank {
        bail!("Nothing to save, give the note a title or some text");
    }
    report(format!("Created {}", id));
    Ok(())
}

async fn list(ctx: &AppContext, filter: ListFilter) -> Result<()> {
    let (filter, empty) = if filter.all {
        (DocumentFilter::All, "No notes")
    } else if filter.archived {
        (DocumentFilter::Archived, "No archived notes")
    } else if filter.trashed {
        (DocumentFilter::Trashed, "Trash is empty")
    } else {
        (DocumentFilter::Active, "No notes")
    };
    let documents = ctx.store.list(filter).await?;
    print!("{}", render::render_list(&documents, empty));
    Ok(())
}

async fn show(ctx: &AppContext, reference: &str) -> Result<()> {
    let id = resolve_id(&ctx.store, reference).await?;
    let Some(document) = ctx.store.get_by_id(id).await? else {
        bail!("No note matches '{}'", reference);
    };
    let blocks = ctx.store.snapshot(id).await?;
    print!("{}", render::render_document(&document, &blocks));
    Ok(())
}

async fn edit(
    ctx: &AppContext,
    reference: &str,
    title: Option<String>,
    text: Option<String>,
) -> Result<()> {
    if title.is_none() && text.is_none() {
        bail!("Nothing to change, pass --title or --text");
    }
    let id = modify(ctx, reference, |session| {
        if let Some(title) = title {
            session.set_title(title);
        }
        if let Some(text) = text {
            session.set_content(text);
        }
    })
    .await?;
    report(format!("Updated {}", id));
    Ok(())
}

async fn format_range(
    ctx: &AppContext,
    reference: &str,
    start: usize,
    end: usize,
    style: &str,
) -> Result<()> {
    let kind: FormatType = style.parse().map_err(anyhow::Error::msg)?;
    let id = resolve_id(&ctx.store, reference).await?;
    let session = open(ctx, id).await?;

    let len = char_len(&session.content());
    if start >= end || end > len {
        session.close().await?;
        bail!(
            "Invalid range {}..{}, the note body has {} characters",
            start,
            end,
            len
        );
    }
    let on = session.apply_format(start, end, kind);
    session.close().await?;

    let verb = if on { "Applied" } else { "Removed" };
    report(format!("{} {} on {}..{}", verb, kind, start, end));
    Ok(())
}

async fn tag(ctx: &AppContext, action: TagCommands) -> Result<()> {
    match action {
        TagCommands::Add { id, tag } => {
            let id = resolve_id(&ctx.store, &id).await?;
            let session = open(ctx, id).await?;
            let added = session.add_tag(&tag);
            session.close().await?;
            if added? {
                report(format!("Tagged {} with '{}'", id, tag.trim()));
            } else {
                report(format!("{} already has '{}'", id, tag.trim()));
            }
        }
        TagCommands::Rm { id, tag } => {
            let id = resolve_id(&ctx.store, &id).await?;
            let session = open(ctx, id).await?;
            let removed = session.remove_tag(&tag);
            session.close().await?;
            if !removed {
                bail!("{} has no tag '{}'", id, tag);
            }
            report(format!("Removed '{}' from {}", tag, id));
        }
    }
    Ok(())
}

/// Looks up the item shown as `number` by `jotter show`.
fn item_at(blocks: &[jotterapp::model::BlockRef], number: usize) -> Result<ItemRef> {
    let numbering = render::number_items(blocks);
    match number.checked_sub(1).and_then(|i| numbering.get(i)) {
        Some(item) => Ok(item.clone()),
        None => bail!(
            "No checklist item {}, the note has {} item(s)",
            number,
            numbering.len()
        ),
    }
}

async fn check(ctx: &AppContext, action: CheckCommands) -> Result<()> {
    match action {
        CheckCommands::Add { id, items, to } => {
            let id = resolve_id(&ctx.store, &id).await?;
            let session = open(ctx, id).await?;
            let result = match to {
                Some(number) => append_items(&session, number, &items).await,
                None => session
                    .add_checklist(items.as_slice())
                    .await
                    .map(|_| ())
                    .map_err(anyhow::Error::from),
            };
            session.close().await?;
            result?;
            report(format!("Added {} item(s) to {}", items.len(), id));
        }
        CheckCommands::Toggle { id, item } => {
            let id = resolve_id(&ctx.store, &id).await?;
            let target = item_at(&ctx.store.snapshot(id).await?, item)?;
            let session = open(ctx, id).await?;
            let checked = session.toggle_item(&target.block_id, &target.item_id).await;
            session.close().await?;
            let state = if checked? { "checked" } else { "unchecked" };
            report(format!("Item {} {}", item, state));
        }
        CheckCommands::Edit { id, item, text } => {
            let id = resolve_id(&ctx.store, &id).await?;
            let target = item_at(&ctx.store.snapshot(id).await?, item)?;
            let session = open(ctx, id).await?;
            let result = session
                .edit_item(&target.block_id, &target.item_id, &text)
                .await;
            session.close().await?;
            result?;
            report(format!("Item {} updated", item));
        }
        CheckCommands::Rm { id, item } => {
            let id = resolve_id(&ctx.store, &id).await?;
            let target = item_at(&ctx.store.snapshot(id).await?, item)?;
            let session = open(ctx, id).await?;
            let removal = session.delete_item(&target.block_id, &target.item_id).await;
            session.close().await?;
            match removal? {
                ItemRemoval::ItemDeleted => report(format!("Item {} removed", item)),
                ItemRemoval::BlockDeleted => {
                    report(format!("Item {} removed, checklist deleted", item))
                }
            }
        }
    }
    Ok(())
}

async fn append_items(session: &Session, number: usize, items: &[String]) -> Result<()> {
    let target = item_at(&session.block_coordinator().snapshot().await?, number)?;
    for text in items {
        session.add_item(&target.block_id, text).await?;
    }
    Ok(())
}

async fn delete(ctx: &AppContext, reference: &str) -> Result<()> {
    let id = resolve_id(&ctx.store, reference).await?;
    let session = open(ctx, id).await?;
    let outcome = session.delete().await;
    session.close().await?;
    match outcome? {
        DeleteOutcome::Trashed => report(format!("Moved {} to the trash", id)),
        DeleteOutcome::Discarded => report(format!("Discarded {}", id)),
    }
    Ok(())
}
