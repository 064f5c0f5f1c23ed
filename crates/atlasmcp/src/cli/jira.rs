use atlasmcp_core::atlassian::jira::{summarize_issue, IssueSummary};
use colored::Colorize;
use serde_json::Value;

use super::{expect_success, parse_json_object, print_envelope, text_of};
use crate::prelude::{eprintln, println, *};
use crate::tools::Services;

#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// Get a Jira issue
    #[clap(name = "get")]
    Get(GetOptions),

    /// Search issues with JQL
    #[clap(name = "search")]
    Search(SearchOptions),

    /// Create an issue
    #[clap(name = "create")]
    Create(CreateOptions),

    /// Update fields of an issue
    #[clap(name = "update")]
    Update(UpdateOptions),

    /// Delete an issue
    #[clap(name = "delete")]
    Delete(IssueKeyOptions),

    /// Add a comment to an issue
    #[clap(name = "comment")]
    Comment(CommentOptions),

    /// List the transitions available for an issue
    #[clap(name = "transitions")]
    Transitions(TransitionsOptions),

    /// Move an issue through a transition
    #[clap(name = "transition")]
    Transition(TransitionOptions),

    /// List visible projects
    #[clap(name = "projects")]
    Projects(JsonOption),

    /// Show a user profile
    #[clap(name = "user")]
    User(UserOptions),
}

#[derive(Debug, clap::Args)]
pub struct JsonOption {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, clap::Args)]
pub struct IssueKeyOptions {
    /// Issue key (e.g., "PROJ-123")
    #[clap(env = "JIRA_ISSUE_KEY")]
    pub issue_key: String,
}

#[derive(Debug, clap::Args)]
pub struct GetOptions {
    /// Issue key (e.g., "PROJ-123")
    #[clap(env = "JIRA_ISSUE_KEY")]
    pub issue_key: String,

    /// Comma separated fields to return
    #[arg(long)]
    pub fields: Option<String>,

    /// Comma separated entities to expand
    #[arg(long)]
    pub expand: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, clap::Args)]
pub struct SearchOptions {
    /// JQL query
    pub jql: String,

    /// Comma separated fields to return
    #[arg(long)]
    pub fields: Option<String>,

    /// Index of the first result
    #[arg(long, default_value = "0")]
    pub start_at: u64,

    /// Maximum number of results
    #[arg(long, default_value = "50")]
    pub max_results: u64,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, clap::Args)]
pub struct CreateOptions {
    /// Project key
    #[arg(long)]
    pub project: String,

    /// Issue summary
    #[arg(long)]
    pub summary: String,

    /// Issue type name
    #[arg(long = "type", default_value = "Task")]
    pub issue_type: String,

    /// Plain text description
    #[arg(long)]
    pub description: Option<String>,

    /// Account id (Cloud) or username (Server)
    #[arg(long)]
    pub assignee: Option<String>,
}

#[derive(Debug, clap::Args)]
pub struct UpdateOptions {
    /// Issue key (e.g., "PROJ-123")
    pub issue_key: String,

    /// Fields to set, as a JSON object
    #[arg(long)]
    pub fields: String,
}

#[derive(Debug, clap::Args)]
pub struct CommentOptions {
    /// Issue key (e.g., "PROJ-123")
    pub issue_key: String,

    /// Comment text
    pub comment: String,
}

#[derive(Debug, clap::Args)]
pub struct TransitionsOptions {
    /// Issue key (e.g., "PROJ-123")
    pub issue_key: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, clap::Args)]
pub struct TransitionOptions {
    /// Issue key (e.g., "PROJ-123")
    pub issue_key: String,

    /// Transition id
    pub transition_id: String,

    /// Fields required by the transition, as a JSON object
    #[arg(long)]
    pub fields: Option<String>,

    /// Comment to add with the transition
    #[arg(long)]
    pub comment: Option<String>,
}

#[derive(Debug, clap::Args)]
pub struct UserOptions {
    /// Account id (Cloud) or username (Server)
    pub user_identifier: String,
}

pub async fn run(command: Commands, global: crate::Global, services: &Services) -> Result<()> {
    let jira = &services.jira;

    if global.verbose {
        eprintln!("Running jira {command:?}");
    }

    match command {
        Commands::Get(options) => {
            let text = jira
                .get_issue(
                    &options.issue_key,
                    options.fields.as_deref(),
                    options.expand.as_deref(),
                )
                .await;

            if options.json {
                return print_envelope(&text);
            }
            display_issue(&summarize_issue(&expect_success(&text)?));
            Ok(())
        }
        Commands::Search(options) => {
            let text = jira
                .search_issues(
                    &options.jql,
                    options.fields.as_deref(),
                    options.start_at,
                    options.max_results,
                )
                .await;

            if options.json {
                return print_envelope(&text);
            }
            display_search(&expect_success(&text)?);
            Ok(())
        }
        Commands::Create(options) => {
            let text = jira
                .create_issue(
                    &options.project,
                    &options.summary,
                    &options.issue_type,
                    options.description.as_deref(),
                    options.assignee.as_deref(),
                )
                .await;
            print_envelope(&text)
        }
        Commands::Update(options) => {
            let fields = parse_json_object(&options.fields, "--fields")?;
            print_envelope(&jira.update_issue(&options.issue_key, fields).await)
        }
        Commands::Delete(options) => print_envelope(&jira.delete_issue(&options.issue_key).await),
        Commands::Comment(options) => {
            print_envelope(&jira.add_comment(&options.issue_key, &options.comment).await)
        }
        Commands::Transitions(options) => {
            let text = jira.get_transitions(&options.issue_key).await;

            if options.json {
                return print_envelope(&text);
            }
            display_transitions(&expect_success(&text)?);
            Ok(())
        }
        Commands::Transition(options) => {
            let fields = options
                .fields
                .as_deref()
                .map(|raw| parse_json_object(raw, "--fields"))
                .transpose()?;

            let text = jira
                .transition_issue(
                    &options.issue_key,
                    &options.transition_id,
                    fields.as_ref(),
                    options.comment.as_deref(),
                )
                .await;
            print_envelope(&text)
        }
        Commands::Projects(options) => {
            let text = jira.get_projects().await;

            if options.json {
                return print_envelope(&text);
            }
            display_projects(&expect_success(&text)?);
            Ok(())
        }
        Commands::User(options) => {
            print_envelope(&jira.get_user_profile(&options.user_identifier).await)
        }
    }
}

fn display_issue(issue: &IssueSummary) {
    println!(
        "\n{} - {}\n",
        issue.key.bold().cyan(),
        issue.summary.as_deref().unwrap_or("").bright_white()
    );

    let mut table = new_table();
    if let Some(status) = &issue.status {
        table.add_row(prettytable::row![
            "Status".bold().cyan(),
            status.green().to_string()
        ]);
    }

    if let Some(issue_type) = &issue.issue_type {
        table.add_row(prettytable::row![
            "Type".bold().cyan(),
            issue_type.bright_blue().to_string()
        ]);
    }

    let assignee = match &issue.assignee {
        Some(assignee) => assignee.bright_magenta().to_string(),
        None => "Unassigned".bright_black().to_string(),
    };
    table.add_row(prettytable::row!["Assignee".bold().cyan(), assignee]);

    table.printstd();

    if let Some(description) = &issue.description {
        println!("\n{}\n{}", "Description".bold().cyan(), description);
    }
}

fn display_search(result: &Value) {
    let issues = result
        .get("issues")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    if issues.is_empty() {
        println!("No issues found.");
        return;
    }

    let mut table = new_table();
    table.add_row(prettytable::row!["Key", "Summary", "Status", "Assignee"]);

    for issue in issues.iter().map(summarize_issue) {
        table.add_row(prettytable::row![
            issue.key.bold().cyan(),
            issue.summary.unwrap_or_default(),
            issue.status.unwrap_or_default().green(),
            issue.assignee.unwrap_or_else(|| "Unassigned".to_string())
        ]);
    }

    table.printstd();

    if let Some(total) = result.get("total").and_then(Value::as_u64) {
        println!("\nShowing {} of {} issues", issues.len(), total);
    }
}

fn display_transitions(transitions: &Value) {
    let mut table = new_table();
    table.add_row(prettytable::row!["Id", "Name", "To"]);

    for transition in transitions.as_array().into_iter().flatten() {
        let to = transition
            .get("to")
            .map(|to| text_of(to, "name"))
            .unwrap_or_default();
        table.add_row(prettytable::row![
            text_of(transition, "id").bold().cyan(),
            text_of(transition, "name"),
            to.green()
        ]);
    }

    table.printstd();
}

fn display_projects(projects: &Value) {
    let mut table = new_table();
    table.add_row(prettytable::row!["Key", "Name"]);

    for project in projects.as_array().into_iter().flatten() {
        table.add_row(prettytable::row![
            text_of(project, "key").bold().cyan(),
            text_of(project, "name")
        ]);
    }

    table.printstd();
}
