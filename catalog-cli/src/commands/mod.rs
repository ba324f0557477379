//! CLI command implementations.

pub mod borrow;
pub mod create;
pub mod delete;
pub mod init;
pub mod list;
pub mod show;
pub mod summary;
pub mod update;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use bookify_client::{
    ApiRequest, ApiResponse, CatalogClient, HttpTransport, MockTransport, MutationFailure,
    Transport, TransportError,
};
use bookify_core::{DetailState, DialogAction, FormErrors, Notice};
use bookify_types::{Book, BookDraft, BookId, Genre};
use clap::Args;
use std::io::{self, BufRead, Write};
use std::sync::Arc;

use crate::config::Settings;
use crate::demo::DemoServer;
use crate::render;

/// HTTP or canned demo responses.
pub enum CliTransport {
    /// Real service.
    Http(HttpTransport),
    /// `--mock`
    Mock(MockTransport),
}

#[async_trait]
impl Transport for CliTransport {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        match self {
            CliTransport::Http(transport) => transport.execute(request).await,
            CliTransport::Mock(transport) => transport.execute(request).await,
        }
    }
}

/// Everything a command needs.
pub struct Session {
    /// Loaded settings.
    pub settings: Settings,
    /// The catalog client.
    pub client: CatalogClient<CliTransport>,
    demo: Option<DemoServer>,
}

impl Session {
    /// Build a session against the configured service, or the demo catalog.
    pub fn new(settings: Settings, api_url: Option<&str>, mock: bool) -> Result<Self> {
        let config = settings.client_config(api_url);
        if mock {
            let transport = MockTransport::new();
            let demo = DemoServer::new(transport.clone());
            return Ok(Self {
                settings,
                client: CatalogClient::new(config, CliTransport::Mock(transport)),
                demo: Some(demo),
            });
        }

        config.validate().context("Invalid client configuration")?;
        let transport = HttpTransport::new(config.base_url.trim(), config.timeout)
            .context("Failed to create HTTP transport")?;
        Ok(Self {
            settings,
            client: CatalogClient::new(config, CliTransport::Http(transport)),
            demo: None,
        })
    }

    /// Demo server, in `--mock` runs.
    pub fn demo(&self) -> Option<&DemoServer> {
        self.demo.as_ref()
    }
}

/// Load one book or fail with a readable message.
pub async fn fetch_book(session: &Session, id: &BookId) -> Result<Arc<Book>> {
    if let Some(demo) = session.demo() {
        demo.seed_book(id);
    }
    match session.client.detail().show(id).await {
        DetailState::Ready(book) => Ok(book),
        DetailState::NotFound => bail!("Book {id} not found"),
        DetailState::Error(message) => bail!("Failed to load book {id}: {message}"),
        DetailState::Loading => bail!("Book {id} is still loading"),
    }
}

/// Message for a rejected create or update.
///
/// Field errors are attached to the form so each one is reported against the
/// value that was submitted for it.
pub fn rejected(draft: &BookDraft, failure: &MutationFailure) -> String {
    let mut form = FormErrors::new();
    if let Some(fields) = failure.field_errors() {
        form.apply(fields);
    }
    if form.has_errors() {
        render::form_errors(draft, &form)
    } else {
        render::failure(failure)
    }
}

/// The notice among dialog actions, if any.
pub fn notice(actions: &[DialogAction]) -> Option<&Notice> {
    actions.iter().find_map(|action| match action {
        DialogAction::Notify(notice) => Some(notice),
        _ => None,
    })
}

/// Ask a yes/no question on stdin. Anything but `y`/`yes` is no.
pub fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt} [y/N] ");
    io::stdout().flush().context("Failed to write prompt")?;
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read answer")?;
    Ok(matches!(line.trim().to_lowercase().as_str(), "y" | "yes"))
}

/// Editable book fields.
#[derive(Args, Debug, Default, Clone)]
pub struct BookArgs {
    /// Title
    #[arg(long)]
    pub title: Option<String>,

    /// Author
    #[arg(long)]
    pub author: Option<String>,

    /// Genre (fiction, non-fiction, science, history, biography, fantasy)
    #[arg(long)]
    pub genre: Option<Genre>,

    /// ISBN
    #[arg(long)]
    pub isbn: Option<String>,

    /// Description
    #[arg(long)]
    pub description: Option<String>,

    /// Year of publication
    #[arg(long)]
    pub year: Option<i32>,

    /// Number of copies
    #[arg(long)]
    pub copies: Option<u32>,

    /// Availability flag
    #[arg(long)]
    pub available: Option<bool>,

    /// Cover image URL
    #[arg(long)]
    pub image: Option<String>,
}

impl BookArgs {
    /// Overwrite the fields that were given.
    pub fn apply(&self, draft: &mut BookDraft) {
        if let Some(title) = &self.title {
            draft.title = title.clone();
        }
        if let Some(author) = &self.author {
            draft.author = author.clone();
        }
        if let Some(genre) = self.genre {
            draft.genre = genre;
        }
        if let Some(isbn) = &self.isbn {
            draft.isbn = isbn.clone();
        }
        if let Some(description) = &self.description {
            draft.description = description.clone();
        }
        if let Some(year) = self.year {
            draft.published_year = Some(year);
        }
        if let Some(copies) = self.copies {
            draft.copies = copies;
        }
        if let Some(available) = self.available {
            draft.available = available;
        }
        if let Some(image) = &self.image {
            draft.image = Some(image.clone()).filter(|url| !url.trim().is_empty());
        }
    }
}
