//! CLI command execution.
//!
//! Commands fetch from the backend first and only then update the session or
//! project context, so a failed request leaves saved state untouched.

use std::io::{BufRead, Write};

use anyhow::{bail, Context, Result};

use crate::api::ApiClient;
use crate::config::Config;
use crate::context::{ProjectContext, SessionContext};
use crate::models::{
    Credentials, NewProject, NewResource, NewWorkflow, OutputMode, ProjectPatch, Resource,
    Workflow, WorkflowAction,
};
use crate::store::FileStore;

use super::args::{Cli, Commands, DocsCommand, ProjectCommand, ResourceCommand, WorkflowCommand};

/// Everything a command needs: config, backend client and both contexts.
pub struct App {
    pub config: Config,
    pub client: ApiClient,
    pub session: SessionContext<FileStore>,
    pub project: ProjectContext<FileStore>,
}

impl App {
    /// Load both contexts from the profile. Unreadable saved state counts as
    /// logged out with no project open.
    pub fn open(config: Config) -> Self {
        let store = FileStore::in_dir(&config.state_dir);
        let session = SessionContext::restore(store.clone());
        let project = ProjectContext::load(store);
        let client = ApiClient::new(config.backend_url.clone())
            .with_token(session.current().map(|s| s.token.clone()));

        tracing::debug!(backend = %client.base_url(), "client ready");
        Self {
            config,
            client,
            session,
            project,
        }
    }

    fn require_login(&self) -> Result<()> {
        self.session.require()?;
        Ok(())
    }

    fn active_project_id(&self) -> Result<String> {
        self.project
            .active()
            .map(|p| p.id.clone())
            .context("No project is open. Run `mindgrid projects open <id>` first.")
    }

    /// Make `id` the active project, fetching its metadata and resources.
    pub async fn open_project(&mut self, id: &str) -> Result<()> {
        let projects = self.client.list_projects().await.context("Failed to fetch projects")?;
        let found = projects
            .into_iter()
            .find(|p| p.id == id)
            .with_context(|| format!("Project {id} not found"))?;

        self.project.set_active_project(ProjectPatch::from(found))?;
        self.refresh_resources().await?;
        Ok(())
    }

    /// Re-fetch the active project's resources into the cache.
    pub async fn refresh_resources(&mut self) -> Result<usize> {
        let ticket = self
            .project
            .begin_fetch()
            .context("No project is open. Run `mindgrid projects open <id>` first.")?;
        let resources = self
            .client
            .list_project_resources(ticket.project_id())
            .await
            .context("Failed to fetch resources")?;
        let count = resources.len();
        self.project.apply_fetched(&ticket, resources)?;
        Ok(count)
    }
}

// === Command Execution ===

pub async fn execute(cli: Cli) -> Result<()> {
    let config = Config::resolve(cli.backend, cli.state_dir)?;
    let mut app = App::open(config);

    match cli.command {
        Commands::Login {
            email,
            password,
            google_code,
        } => login(&mut app, email, password, google_code).await,
        Commands::Signup {
            email,
            full_name,
            password,
        } => {
            let password = password_or_prompt(password)?;
            let message = app.client.signup(&email, &password, &full_name).await?;
            println!("{message}");
            println!("Run `mindgrid login --email {email}` to continue.");
            Ok(())
        }
        Commands::Logout => {
            app.session.logout();
            app.project.clear()?;
            println!("Logged out.");
            Ok(())
        }
        Commands::Whoami => {
            match app.session.current() {
                Some(s) => println!("{} <{}> (id {})", s.display_name, s.email, s.user_id),
                None => println!("Not logged in."),
            }
            Ok(())
        }
        Commands::Projects(cmd) => projects(&mut app, cmd).await,
        Commands::Resources(cmd) => resources(&mut app, cmd).await,
        Commands::Graph => graph(&app).await,
        Commands::Docs(cmd) => docs(&app, cmd).await,
        Commands::Workflows(cmd) => workflows(&app, cmd).await,
        Commands::Chat { query, push } => chat(&app, &query.join(" "), push).await,
    }
}

fn password_or_prompt(password: Option<String>) -> Result<String> {
    if let Some(p) = password {
        return Ok(p);
    }
    eprint!("Password: ");
    std::io::stderr().flush()?;
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read password")?;
    let password = line.trim_end_matches(|c: char| c == '\r' || c == '\n').to_string();
    if password.is_empty() {
        bail!("Password is required");
    }
    Ok(password)
}

async fn login(
    app: &mut App,
    email: Option<String>,
    password: Option<String>,
    google_code: Option<String>,
) -> Result<()> {
    let session = if let Some(code) = google_code {
        app.session.login_with_google(&app.client, &code).await?
    } else {
        let email = email.context("--email is required")?;
        let password = password_or_prompt(password)?;
        app.session
            .login(&app.client, &Credentials::new(email, password))
            .await?
    };

    println!("Logged in as {} <{}>", session.display_name, session.email);
    let token = session.token.clone();
    app.client.set_token(Some(token));
    Ok(())
}

async fn projects(app: &mut App, cmd: ProjectCommand) -> Result<()> {
    match cmd {
        ProjectCommand::List => {
            app.require_login()?;
            let projects = app.client.list_projects().await.context("Failed to fetch projects")?;
            if projects.is_empty() {
                println!("No projects found.");
                return Ok(());
            }

            let active = app.project.active().map(|p| p.id.clone());
            println!("  {:<38} {:<24} {}", "ID", "NAME", "DESCRIPTION");
            println!("{}", "-".repeat(80));
            for p in projects {
                let marker = if active.as_deref() == Some(p.id.as_str()) { "*" } else { " " };
                println!(
                    "{marker} {:<38} {:<24} {}",
                    p.id,
                    truncate(&p.name, 24),
                    truncate(&p.description, 40)
                );
            }
        }
        ProjectCommand::Create {
            name,
            description,
            open,
        } => {
            app.require_login()?;
            let created = app
                .client
                .create_project(&NewProject { name, description })
                .await
                .context("Failed to add project")?;
            let project = created.into_iter().next().context("Backend returned no project")?;
            println!("Created project {} ({})", project.name, project.id);
            if open {
                app.project.set_active_project(ProjectPatch::from(project))?;
                app.refresh_resources().await?;
            }
        }
        ProjectCommand::Open { id } => {
            app.require_login()?;
            app.open_project(&id).await?;
            let p = app.project.project();
            println!("Opened {} ({})", p.name, p.id);
            println!("{} resources cached.", app.project.resources().len());
        }
        ProjectCommand::Current => match app.project.active() {
            Some(p) => {
                println!("ID:          {}", p.id);
                println!("Name:        {}", p.name);
                println!("Description: {}", p.description);
                if let Some(url) = &p.doc_url {
                    println!("Doc:         {url}");
                }
                println!("Resources:   {}", app.project.resources().len());
            }
            None => println!("No project is open."),
        },
    }
    Ok(())
}

async fn resources(app: &mut App, cmd: ResourceCommand) -> Result<()> {
    match cmd {
        ResourceCommand::List { all: true, .. } => {
            app.require_login()?;
            let list = app.client.list_resources().await.context("Failed to fetch resources")?;
            print_resources(&list);
        }
        ResourceCommand::List { all: false, refresh } => {
            app.require_login()?;
            if refresh || app.project.resources().is_empty() {
                app.refresh_resources().await?;
            }
            print_resources(app.project.resources());
        }
        ResourceCommand::Add {
            name,
            description,
            link,
        } => {
            app.require_login()?;
            let project_id = app.active_project_id()?;
            let created = app
                .client
                .create_resource(&NewResource {
                    name,
                    description,
                    link,
                    project_id,
                })
                .await
                .context("Failed to add resource")?;
            for r in created {
                println!("Added {} ({})", r.file_name, r.id);
                app.project.add_resource(r)?;
            }
        }
        ResourceCommand::Upload { path } => {
            app.require_login()?;
            let project_id = app.active_project_id()?;
            let created = app
                .client
                .upload_resource(&project_id, &path)
                .await
                .context("Upload failed")?;
            for r in created {
                println!("Uploaded {} ({})", r.file_name, r.id);
                app.project.add_resource(r)?;
            }
        }
        ResourceCommand::Show { id } => {
            let r = app
                .project
                .get_resource_by_id(&id)
                .with_context(|| format!("Resource {id} is not in the open project"))?;
            println!("ID:         {}", r.id);
            println!("File:       {}", r.file_name);
            println!("Type:       {}", r.file_type);
            if let Some(url) = &r.file_url {
                println!("URL:        {url}");
            }
            println!("Created:    {} by {}", r.created_at.format("%Y-%m-%d %H:%M"), r.created_by);
            if let Some(text) = &r.parsed_text {
                println!();
                println!("{text}");
            }
        }
    }
    Ok(())
}

fn print_resources(list: &[Resource]) {
    if list.is_empty() {
        println!("No resources found.");
        return;
    }
    println!(
        "{:<38} {:<28} {:<12} {:<34} {:<11} {}",
        "ID", "FILE", "TYPE", "TEXT", "CREATED", "BY"
    );
    println!("{}", "-".repeat(132));
    for r in list {
        println!(
            "{:<38} {:<28} {:<12} {:<34} {:<11} {}",
            r.id,
            truncate(&r.file_name, 28),
            truncate(&r.file_type, 12),
            r.preview(30).unwrap_or_else(|| "-".to_string()),
            r.created_at.format("%Y-%m-%d"),
            r.created_by,
        );
    }
}

async fn graph(app: &App) -> Result<()> {
    let project_id = app.active_project_id()?;
    let graph = app
        .client
        .project_graph(&project_id)
        .await
        .context("Failed to fetch graph")?;

    if graph.nodes.is_empty() {
        println!("Graph is empty.");
        return Ok(());
    }

    for (group, count) in graph.group_counts() {
        println!("{group}: {count}");
    }
    println!();
    for link in &graph.links {
        let label = |id: &str| graph.node(id).map_or_else(|| id.to_string(), |n| n.label.clone());
        match &link.kind {
            Some(kind) => println!("{} -[{kind}]-> {}", label(&link.source), label(&link.target)),
            None => println!("{} --> {}", label(&link.source), label(&link.target)),
        }
    }
    Ok(())
}

async fn docs(app: &App, cmd: DocsCommand) -> Result<()> {
    match cmd {
        DocsCommand::List => {
            app.require_login()?;
            let docs = app.client.list_google_docs().await.context("Failed to fetch docs")?;
            if docs.is_empty() {
                println!("No Google Docs found.");
                return Ok(());
            }
            println!("{:<46} {:<32} {:<22} {}", "ID", "NAME", "MODIFIED", "OWNERS");
            println!("{}", "-".repeat(110));
            for d in docs {
                println!(
                    "{:<46} {:<32} {:<22} {}",
                    d.id,
                    truncate(&d.name, 32),
                    d.modified_time,
                    d.owners
                );
            }
        }
        DocsCommand::Import { ids, all } => {
            app.require_login()?;
            let project_id = app.active_project_id()?;
            let docs = app.client.list_google_docs().await.context("Failed to fetch docs")?;
            let selected: Vec<_> = docs
                .into_iter()
                .filter(|d| all || ids.contains(&d.id))
                .collect();
            if selected.is_empty() {
                bail!("None of the given docs were found in the linked Drive");
            }
            let result = app
                .client
                .import_google_docs(&project_id, &selected)
                .await
                .context("Failed to import docs")?;
            tracing::debug!(%result, "import results");
            println!("Imported {} docs.", selected.len());
            println!("Run `mindgrid resources list --refresh` to see them.");
        }
        DocsCommand::Push { text } => {
            let result = app
                .client
                .push_to_docs(&text.join(" "))
                .await
                .context("Failed to push to Google Doc")?;
            tracing::debug!(%result, "pushed to doc");
            println!("Pushed to Google Doc.");
        }
        DocsCommand::Open => {
            let url = app
                .project
                .active()
                .and_then(|p| p.doc_url.clone())
                .context("The open project has no linked Google Doc")?;
            open::that(&url).with_context(|| format!("Failed to open {url}"))?;
        }
    }
    Ok(())
}

async fn workflows(app: &App, cmd: WorkflowCommand) -> Result<()> {
    match cmd {
        WorkflowCommand::List => {
            app.require_login()?;
            let list = app.client.list_workflows().await.context("Failed to fetch workflows")?;
            if list.is_empty() {
                println!("No workflows found.");
                return Ok(());
            }
            for w in list {
                println!(
                    "{:<8} {} ({} -> {})",
                    w.workflow_id,
                    w.action.to_uppercase(),
                    app.resource_label(&w.input),
                    w.output.as_deref().map_or_else(|| "auto".to_string(), |o| app.resource_label(o)),
                );
            }
        }
        WorkflowCommand::Show { id } => {
            app.require_login()?;
            let wf = find_workflow(app, &id).await?;
            let flow = wf.to_flow();
            for node in &flow.nodes {
                println!("[{}] {}", node.id, node.label);
            }
            for edge in &flow.edges {
                println!("  {} -> {}", edge.source, edge.target);
            }
        }
        WorkflowCommand::Create {
            input,
            action,
            prompt,
            output,
        } => {
            app.require_login()?;
            let action = WorkflowAction::parse(&action).with_context(|| {
                format!("Unknown action '{action}'. Run `mindgrid workflows actions`.")
            })?;
            if app.project.active().is_some() && app.project.get_resource_by_id(&input).is_none() {
                bail!("Input {input} is not a resource of the open project");
            }
            if let Some(out) = output.as_deref().filter(|o| *o != "auto") {
                let rule = action.output_rule();
                if rule.mode == OutputMode::Filtered
                    && !action
                        .eligible_outputs(app.project.resources())
                        .iter()
                        .any(|r| r.id == out)
                {
                    bail!("Output of '{action}' must be a '{}' resource", rule.resource_type);
                }
            }

            let body = NewWorkflow::new(input, action, prompt, output);
            let result = app
                .client
                .create_workflow(&body)
                .await
                .context("Error creating workflow")?;
            tracing::debug!(%result, "workflow created");
            println!(
                "Created workflow: {} ({} -> {})",
                body.action,
                body.input,
                body.output.as_deref().unwrap_or("auto")
            );
        }
        WorkflowCommand::Run { id } => {
            app.require_login()?;
            let wf = find_workflow(app, &id).await?;
            let result = app
                .client
                .run_workflow(&wf.run_key())
                .await
                .context("Error running workflow")?;
            println!("Workflow {} executed successfully!", wf.workflow_id);
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        WorkflowCommand::Actions => {
            for action in WorkflowAction::ALL {
                let rule = action.output_rule();
                let mode = match rule.mode {
                    OutputMode::Locked => "locked to",
                    OutputMode::Filtered => "any",
                };
                println!("{:<16} output {mode} {}", action.as_str(), rule.resource_type);
            }
        }
    }
    Ok(())
}

async fn find_workflow(app: &App, id: &str) -> Result<Workflow> {
    let list = app.client.list_workflows().await.context("Failed to fetch workflows")?;
    list.into_iter()
        .find(|w| w.workflow_id == id || w.run_key() == id)
        .with_context(|| format!("Workflow {id} not found"))
}

async fn chat(app: &App, query: &str, push: bool) -> Result<()> {
    let reply = app.client.ask(query).await.context("Failed to reach the server")?;
    println!("{reply}");
    if push {
        app.client
            .push_to_docs(&reply)
            .await
            .context("Failed to push to Google Doc")?;
        println!("\nPushed to Google Doc.");
    }
    Ok(())
}

impl App {
    /// File name of a cached resource, or the bare id.
    fn resource_label(&self, id: &str) -> String {
        self.project
            .get_resource_by_id(id)
            .map_or_else(|| id.to_string(), |r| r.file_name.clone())
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let head: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{head}...")
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        extract::Path,
        http::{HeaderMap, StatusCode},
        routing::{get, post},
        Json, Router,
    };
    use serde_json::{json, Value};
    use tempfile::tempdir;

    use super::*;
    use crate::api::testing::spawn_backend;

    fn authorized(headers: &HeaderMap) -> bool {
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v == "Bearer tok-1")
    }

    fn resource_row(id: &str, project: &str) -> Value {
        json!({
            "id": id, "file_name": format!("{id}.pdf"), "file_type": "pdf",
            "created_at": "2025-03-01T10:00:00Z", "created_by": "ada", "project_id": project
        })
    }

    fn backend() -> Router {
        Router::new()
            .route(
                "/auth/login",
                post(|| async { Json(json!({"access_token": "tok-1"})) }),
            )
            .route(
                "/auth/me",
                get(|| async {
                    Json(json!({"user": {"id": "u1", "email": "ada@x.io", "full_name": "Ada"}}))
                }),
            )
            .route(
                "/projects/",
                get(|headers: HeaderMap| async move {
                    if authorized(&headers) {
                        (
                            StatusCode::OK,
                            Json(json!({"projects": [
                                {"id": "p1", "name": "Alpha", "description": "first"},
                                {"id": "p2", "name": "Beta", "description": "second"}
                            ]})),
                        )
                    } else {
                        (StatusCode::UNAUTHORIZED, Json(json!({"detail": "Not authenticated"})))
                    }
                }),
            )
            .route(
                "/resources/project/{id}",
                get(|Path(id): Path<String>| async move {
                    Json(json!([resource_row("r1", &id), resource_row("r2", &id)]))
                }),
            )
            .route(
                "/google-services/docs",
                get(|| async {
                    Json(json!({"documents": {"files": [
                        {"id": "d1", "name": "Plan", "modifiedTime": "2025-01-01T00:00:00Z",
                         "owners": [{"displayName": "Ada"}]}
                    ]}}))
                }),
            )
            .route(
                "/google-services/import-docs",
                post(|Json(body): Json<Value>| async move {
                    Json(json!({"imported": body["docs"].as_array().map_or(0, Vec::len)}))
                }),
            )
            .route(
                "/agents/create-workflow",
                post(|Json(body): Json<Value>| async move { Json(json!({"created": body})) }),
            )
    }

    async fn app_with(token: Option<&str>) -> (App, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let config = Config {
            backend_url: spawn_backend(backend()).await,
            state_dir: dir.path().to_path_buf(),
        };
        let mut app = App::open(config);
        app.client.set_token(token.map(String::from));
        (app, dir)
    }

    #[tokio::test]
    async fn test_open_project_fetches_resources() {
        let (mut app, dir) = app_with(Some("tok-1")).await;
        app.open_project("p2").await.unwrap();

        assert_eq!(app.project.project().name, "Beta");
        assert_eq!(app.project.resources().len(), 2);
        assert!(app.project.get_resource_by_id("r2").is_some());

        // A fresh process sees the same project.
        let reopened = App::open(app.config.clone());
        assert_eq!(reopened.project.active().map(|p| p.id.as_str()), Some("p2"));
        assert_eq!(reopened.project.resources().len(), 2);
        drop(dir);
    }

    #[tokio::test]
    async fn test_unauthorized_fetch_leaves_cache_untouched() {
        let (mut app, _dir) = app_with(Some("tok-1")).await;
        app.open_project("p1").await.unwrap();
        let before = (app.project.project().clone(), app.project.resources().to_vec());

        app.client.set_token(Some("expired".to_string()));
        let err = app.open_project("p2").await.unwrap_err();
        let api_err = err.downcast_ref::<crate::api::ApiError>().unwrap();
        assert_eq!(api_err.status(), Some(401));

        assert_eq!(app.project.project(), &before.0);
        assert_eq!(app.project.resources(), before.1.as_slice());
    }

    #[tokio::test]
    async fn test_unknown_project_is_an_error() {
        let (mut app, _dir) = app_with(Some("tok-1")).await;
        let err = app.open_project("p404").await.unwrap_err();
        assert!(err.to_string().contains("p404"));
        assert!(app.project.active().is_none());
    }

    #[tokio::test]
    async fn test_login_then_reopen_restores_session() {
        let (mut app, _dir) = app_with(None).await;
        login(&mut app, Some("ada@x.io".into()), Some("pw".into()), None)
            .await
            .unwrap();
        assert!(app.session.is_authenticated());

        let reopened = App::open(app.config.clone());
        let session = reopened.session.current().unwrap();
        assert_eq!(session.token, "tok-1");
        assert_eq!(session.display_name, "Ada");
    }

    #[tokio::test]
    async fn test_corrupt_state_file_still_allows_logout() {
        let (first, dir) = app_with(None).await;
        let state_file = dir.path().join("state.json");
        std::fs::write(&state_file, r#"{"token": "t", "#).unwrap();

        let mut app = App::open(first.config.clone());
        assert!(!app.session.is_authenticated());
        assert!(app.project.active().is_none());

        app.session.logout();
        app.project.clear().unwrap();
        let saved = std::fs::read_to_string(&state_file).unwrap();
        assert!(serde_json::from_str::<Value>(&saved).is_ok());
    }

    fn create_workflow(input: &str, action: &str, output: Option<&str>) -> WorkflowCommand {
        WorkflowCommand::Create {
            input: input.to_string(),
            action: action.to_string(),
            prompt: None,
            output: output.map(String::from),
        }
    }

    #[tokio::test]
    async fn test_create_workflow_checks_resources() {
        let (mut app, _dir) = app_with(Some("tok-1")).await;
        login(&mut app, Some("ada@x.io".into()), Some("pw".into()), None)
            .await
            .unwrap();
        app.open_project("p1").await.unwrap();

        let err = workflows(&app, create_workflow("r9", "summarise", None))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not a resource of the open project"));

        // summarise only writes into google doc resources; r2 is a pdf
        let err = workflows(&app, create_workflow("r1", "summarise", Some("r2")))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("must be a 'google doc' resource"));

        let err = workflows(&app, create_workflow("r1", "dance", None))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Unknown action"));

        workflows(&app, create_workflow("r1", "add_event", Some("auto")))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_import_docs_needs_a_listed_doc() {
        let (mut app, _dir) = app_with(Some("tok-1")).await;
        login(&mut app, Some("ada@x.io".into()), Some("pw".into()), None)
            .await
            .unwrap();
        app.open_project("p1").await.unwrap();

        let missing = DocsCommand::Import {
            ids: vec!["d404".to_string()],
            all: false,
        };
        let err = docs(&app, missing).await.unwrap_err();
        assert!(err.to_string().contains("None of the given docs"));

        let found = DocsCommand::Import {
            ids: vec!["d1".to_string()],
            all: false,
        };
        docs(&app, found).await.unwrap();
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 5), "ab...");
    }
}
