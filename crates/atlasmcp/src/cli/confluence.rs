use colored::Colorize;
use serde_json::Value;

use super::{expect_success, print_envelope, text_of};
use crate::prelude::{eprintln, println, *};
use crate::tools::Services;

#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// Search content by keywords or CQL
    #[clap(name = "search")]
    Search(SearchOptions),

    /// Get a page by id, or by title within a space
    #[clap(name = "page")]
    Page(PageOptions),

    /// Create a page
    #[clap(name = "create")]
    Create(CreateOptions),

    /// Replace the title and content of a page
    #[clap(name = "update")]
    Update(UpdateOptions),

    /// Delete a page
    #[clap(name = "delete")]
    Delete(PageIdOptions),

    /// Add a comment to a page
    #[clap(name = "comment")]
    Comment(CommentOptions),

    /// List the comments of a page
    #[clap(name = "comments")]
    Comments(PageIdOptions),

    /// List the child pages of a page
    #[clap(name = "children")]
    Children(ChildrenOptions),

    /// List the labels of a page
    #[clap(name = "labels")]
    Labels(LabelsOptions),

    /// Add a label to a page
    #[clap(name = "label")]
    Label(LabelOptions),
}

#[derive(Debug, clap::Args)]
pub struct SearchOptions {
    /// Keywords or CQL
    pub query: String,

    /// Maximum number of results
    #[arg(long, default_value = "25")]
    pub limit: u64,

    /// Index of the first result
    #[arg(long, default_value = "0")]
    pub start: u64,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, clap::Args)]
pub struct PageOptions {
    /// Page id
    pub page_id: Option<String>,

    /// Page title, used together with --space
    #[arg(long)]
    pub title: Option<String>,

    /// Space key, used together with --title
    #[arg(long)]
    pub space: Option<String>,
}

#[derive(Debug, clap::Args)]
pub struct PageIdOptions {
    /// Page id
    pub page_id: String,
}

#[derive(Debug, clap::Args)]
pub struct CreateOptions {
    /// Space key
    #[arg(long)]
    pub space: String,

    /// Page title
    #[arg(long)]
    pub title: String,

    /// Page body in storage format
    #[arg(long)]
    pub content: String,

    /// Id of the parent page
    #[arg(long)]
    pub parent: Option<String>,
}

#[derive(Debug, clap::Args)]
pub struct UpdateOptions {
    /// Page id
    pub page_id: String,

    /// New page title
    #[arg(long)]
    pub title: String,

    /// New page body in storage format
    #[arg(long)]
    pub content: String,

    /// Id of the new parent page
    #[arg(long)]
    pub parent: Option<String>,
}

#[derive(Debug, clap::Args)]
pub struct CommentOptions {
    /// Page id
    pub page_id: String,

    /// Comment body in storage format
    pub content: String,
}

#[derive(Debug, clap::Args)]
pub struct ChildrenOptions {
    /// Id of the parent page
    pub parent_id: String,

    /// Maximum number of children
    #[arg(long, default_value = "25")]
    pub limit: u64,

    /// Index of the first child
    #[arg(long, default_value = "0")]
    pub start: u64,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, clap::Args)]
pub struct LabelsOptions {
    /// Page id
    pub page_id: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, clap::Args)]
pub struct LabelOptions {
    /// Page id
    pub page_id: String,

    /// Label to add
    pub label_name: String,
}

pub async fn run(command: Commands, global: crate::Global, services: &Services) -> Result<()> {
    let confluence = &services.confluence;

    if global.verbose {
        eprintln!("Running confluence {command:?}");
    }

    match command {
        Commands::Search(options) => {
            if global.verbose {
                eprintln!("CQL: {}", confluence.search_cql(&options.query));
            }

            let text = confluence
                .search(&options.query, options.limit, options.start)
                .await;

            if options.json {
                return print_envelope(&text);
            }
            display_pages(&expect_success(&text)?);
            Ok(())
        }
        Commands::Page(options) => {
            let text = confluence
                .get_page(
                    options.page_id.as_deref(),
                    options.title.as_deref(),
                    options.space.as_deref(),
                )
                .await;
            print_envelope(&text)
        }
        Commands::Create(options) => {
            let text = confluence
                .create_page(
                    &options.space,
                    &options.title,
                    &options.content,
                    options.parent.as_deref(),
                )
                .await;
            print_envelope(&text)
        }
        Commands::Update(options) => {
            let text = confluence
                .update_page(
                    &options.page_id,
                    &options.title,
                    &options.content,
                    options.parent.as_deref(),
                )
                .await;
            print_envelope(&text)
        }
        Commands::Delete(options) => print_envelope(&confluence.delete_page(&options.page_id).await),
        Commands::Comment(options) => {
            print_envelope(&confluence.add_comment(&options.page_id, &options.content).await)
        }
        Commands::Comments(options) => {
            print_envelope(&confluence.get_page_comments(&options.page_id).await)
        }
        Commands::Children(options) => {
            let text = confluence
                .get_page_children(&options.parent_id, options.limit, options.start)
                .await;

            if options.json {
                return print_envelope(&text);
            }
            let children = expect_success(&text)?;
            display_pages(children.get("results").unwrap_or(&Value::Null));
            Ok(())
        }
        Commands::Labels(options) => {
            let text = confluence.get_page_labels(&options.page_id).await;

            if options.json {
                return print_envelope(&text);
            }
            display_labels(&expect_success(&text)?);
            Ok(())
        }
        Commands::Label(options) => {
            let text = confluence
                .add_page_label(&options.page_id, &options.label_name)
                .await;
            print_envelope(&text)
        }
    }
}

fn display_pages(pages: &Value) {
    let pages = pages.as_array().cloned().unwrap_or_default();

    if pages.is_empty() {
        println!("No pages found.");
        return;
    }

    let mut table = new_table();
    table.add_row(prettytable::row!["Id", "Title", "Space", "URL"]);

    for page in &pages {
        table.add_row(prettytable::row![
            text_of(page, "id").bold().cyan(),
            text_of(page, "title"),
            text_of(page, "spaceKey").green(),
            text_of(page, "url").bright_black()
        ]);
    }

    table.printstd();
}

fn display_labels(labels: &Value) {
    let mut table = new_table();
    table.add_row(prettytable::row!["Prefix", "Name"]);

    for label in labels.as_array().into_iter().flatten() {
        table.add_row(prettytable::row![
            text_of(label, "prefix").bright_black(),
            text_of(label, "name").bold()
        ]);
    }

    table.printstd();
}
