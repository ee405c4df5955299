use log::info;
use std::error::Error;
use std::io::Write as _;
use tokio::io::{ AsyncBufReadExt, BufReader };

use crate::capabilities::CapabilitiesController;
use crate::catalog::{ CatalogController, ModelPicker };
use crate::chat::{ ChatController, SendOutcome };
use crate::error::ControlError;
use crate::models::capabilities::{ AnalysisReport, CloneRow, Suggestions };
use crate::models::chat::TranscriptEntry;

const HELP: &str = "\
Commands:
  /models                                refresh and show the model lists
  /select preferred|source <name>        pick a model in one of the lists
  /download <model> [source] [repo_url]  download a model (default source: huggingface)
  /clone-model <original> <new> [json]   clone a model with optional JSON modifications
  /generate <language> <description>     generate code
  /analyze <code>                        analyze code
  /dataset <format> <size> <description> generate a sample dataset
  /netscript <description>               generate a network script
  /clones                                list clones
  /create-clone <description>            create a clone
  /update-clone <name> desc|caps <value> update a clone
  /activate <name>                       activate a clone (deactivates the others)
  /deactivate                            deactivate all clones
  /improve                               request self-improvement suggestions
  /history                               show the transcript
  /help                                  this text
  /quit                                  leave
Anything else is sent to the assistant as a chat message.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Chat(String),
    Help,
    Quit,
    History,
    Models,
    Select { picker: String, name: String },
    Download { model: String, source: String, repo_url: Option<String> },
    CloneModel { original: String, new_name: String, modifications: String },
    Generate { language: String, description: String },
    Analyze { code: String },
    Dataset { format: String, size: Option<u32>, description: String },
    NetScript { description: String },
    Clones,
    CreateClone { description: String },
    UpdateClone { name: String, field: String, value: String },
    Activate { name: String },
    Deactivate,
    Improve,
    Unknown(String),
}

/// Split one console line into a command. Plain text is a chat send; the
/// slash commands cover the catalog and capabilities surfaces.
pub fn parse_command(line: &str) -> Command {
    let trimmed = line.trim();
    if !trimmed.starts_with('/') {
        return Command::Chat(trimmed.to_string());
    }

    let mut parts = trimmed.split_whitespace();
    let head = parts.next().unwrap_or("");
    let rest = |skip: usize| -> String {
        trimmed
            .split_whitespace()
            .skip(skip)
            .collect::<Vec<_>>()
            .join(" ")
    };

    match head {
        "/help" => Command::Help,
        "/quit" | "/exit" => Command::Quit,
        "/history" => Command::History,
        "/models" => Command::Models,
        "/select" => {
            let picker = parts.next().unwrap_or("").to_string();
            let name = rest(2);
            Command::Select { picker, name }
        }
        "/download" => {
            let model = parts.next().unwrap_or("").to_string();
            let source = parts.next().unwrap_or("").to_string();
            let repo_url = parts.next().map(str::to_string);
            Command::Download { model, source, repo_url }
        }
        "/clone-model" => {
            let original = parts.next().unwrap_or("").to_string();
            let new_name = parts.next().unwrap_or("").to_string();
            Command::CloneModel { original, new_name, modifications: rest(3) }
        }
        "/generate" => {
            let language = parts.next().unwrap_or("").to_string();
            Command::Generate { language, description: rest(2) }
        }
        "/analyze" => Command::Analyze { code: rest(1) },
        "/dataset" => {
            let format = parts.next().unwrap_or("").to_string();
            // The size token is optional; a non-number starts the description.
            match parts.next() {
                Some(token) => match token.parse::<u32>() {
                    Ok(size) => Command::Dataset { format, size: Some(size), description: rest(3) },
                    Err(_) => Command::Dataset { format, size: None, description: rest(2) },
                },
                None => Command::Dataset { format, size: None, description: String::new() },
            }
        }
        "/netscript" => Command::NetScript { description: rest(1) },
        "/clones" => Command::Clones,
        "/create-clone" => Command::CreateClone { description: rest(1) },
        "/update-clone" => {
            let name = parts.next().unwrap_or("").to_string();
            let field = parts.next().unwrap_or("").to_string();
            Command::UpdateClone { name, field, value: rest(3) }
        }
        "/activate" => Command::Activate { name: rest(1) },
        "/deactivate" => Command::Deactivate,
        "/improve" => Command::Improve,
        other => Command::Unknown(other.to_string()),
    }
}

// --- Rendering (typed view models in, text out) ---

pub fn danger(detail: &str) -> String {
    format!("!! {}", detail)
}

/// Validation failures read as input errors; everything else is a
/// danger-styled transport or application failure.
fn describe(e: &ControlError) -> String {
    match e {
        ControlError::Validation(v) => format!("invalid input: {}", v),
        other => danger(&other.to_string()),
    }
}

pub fn render_models(title: &str, picker: &ModelPicker) -> String {
    let mut out = format!("{}:", title);
    if picker.options().is_empty() {
        out.push_str("\n  (none)");
        return out;
    }
    for model in picker.options() {
        let marker = if picker.selected() == Some(model.name.as_str()) { "*" } else { " " };
        out.push_str(&format!("\n {} {} [{}]", marker, model.name, model.source));
    }
    out
}

pub fn render_clones(rows: &[CloneRow]) -> String {
    if rows.is_empty() {
        return "No clones.".to_string();
    }
    let mut out = format!(
        "{:<10} {:<8} {:<12} {:<22} {:>4}  {}",
        "NAME",
        "STATUS",
        "BASE",
        "CREATED",
        "CAPS",
        "DESCRIPTION"
    );
    for row in rows {
        out.push_str(&format!(
            "\n{:<10} {:<8} {:<12} {:<22} {:>4}  {}",
            row.name,
            row.badge.label(),
            row.base_version,
            row.created_at,
            row.capability_count,
            row.description
        ));
    }
    out
}

pub fn render_analysis(report: &AnalysisReport) -> String {
    match report {
        AnalysisReport::Text(text) => text.clone(),
        AnalysisReport::Structured(analysis) => {
            let mut out = String::new();
            if !analysis.issues.is_empty() {
                out.push_str("Issues:");
                for issue in &analysis.issues {
                    out.push_str(&format!("\n  - {}", issue));
                }
            }
            if !analysis.improvements.is_empty() {
                if !out.is_empty() {
                    out.push('\n');
                }
                out.push_str("Improvements:");
                for improvement in &analysis.improvements {
                    out.push_str(&format!("\n  - {}", improvement));
                }
            }
            if let Some(summary) = &analysis.summary {
                if !out.is_empty() {
                    out.push('\n');
                }
                out.push_str(&format!("Summary: {}", summary));
            }
            if out.is_empty() {
                out.push_str("Nothing to report.");
            }
            out
        }
    }
}

pub fn render_suggestions(suggestions: &Suggestions) -> String {
    match suggestions {
        Suggestions::Text(text) => text.clone(),
        Suggestions::Wrapped { text } => text.clone(),
        Suggestions::Detailed(items) => {
            if items.is_empty() {
                return "No suggestions.".to_string();
            }
            let mut out = String::new();
            for (index, item) in items.iter().enumerate() {
                if index > 0 {
                    out.push('\n');
                }
                out.push_str(&format!("{}. {} [{}]", index + 1, item.title, item.priority));
                if !item.description.is_empty() {
                    out.push_str(&format!("\n   {}", item.description));
                }
                if !item.implementation.is_empty() {
                    out.push_str(&format!("\n   how: {}", item.implementation));
                }
            }
            out
        }
    }
}

pub fn render_transcript(entries: &[TranscriptEntry]) -> String {
    if entries.is_empty() {
        return "Transcript is empty.".to_string();
    }
    entries
        .iter()
        .map(|e| format!("[{}] {}: {}", e.timestamp, e.sender.label(), e.content))
        .collect::<Vec<_>>()
        .join("\n")
}

// --- The interactive loop ---

fn prompt(route: Option<&str>) {
    print!("{}> ", route.unwrap_or("thor"));
    let _ = std::io::stdout().flush();
}

fn report(result: Result<String, ControlError>) {
    match result {
        Ok(message) => println!("{}", message),
        Err(e) => println!("{}", describe(&e)),
    }
}

fn print_outcome(outcome: &SendOutcome) {
    match outcome {
        SendOutcome::Ignored => {}
        SendOutcome::Answered { text } => println!("thor> {}", text),
        SendOutcome::Failed { detail } => println!("{}", danger(detail)),
        SendOutcome::PermissionRequested { .. } => {}
    }
}

pub async fn run(
    mut chat: ChatController,
    mut catalog: CatalogController,
    mut capabilities: CapabilitiesController
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("THOR console ready. Type /help for commands.");

    loop {
        prompt(chat.session().route());
        let Some(line) = lines.next_line().await? else {
            break;
        };

        match parse_command(&line) {
            Command::Quit => break,
            Command::Help => println!("{}", HELP),
            Command::History => println!("{}", render_transcript(chat.session().transcript())),
            Command::Chat(message) => {
                let route_before = chat.session().route().map(str::to_string);
                match chat.send(&message).await {
                    Ok(SendOutcome::PermissionRequested { reason }) => {
                        announce_route(route_before.as_deref(), chat.session().route());
                        let outcome = decide_permission(&mut chat, &mut lines, &reason).await?;
                        print_outcome(&outcome);
                    }
                    Ok(outcome) => {
                        announce_route(route_before.as_deref(), chat.session().route());
                        print_outcome(&outcome);
                    }
                    Err(e) => println!("{}", describe(&e)),
                }
            }
            Command::Models => match catalog.refresh_models().await {
                Ok(count) => {
                    println!("{} models available.", count);
                    println!("{}", render_models("Preferred model", &catalog.preferred));
                    println!("{}", render_models("Clone source", &catalog.clone_source));
                }
                Err(e) => println!("{}", describe(&e)),
            },
            Command::Select { picker, name } => {
                let target = match picker.as_str() {
                    "preferred" => Some(&mut catalog.preferred),
                    "source" => Some(&mut catalog.clone_source),
                    _ => None,
                };
                match target {
                    Some(target) => {
                        if target.select(&name) {
                            println!("Selected {}.", name);
                        } else {
                            println!("{}", danger(&format!("'{}' is not in the list", name)));
                        }
                    }
                    None => println!("{}", danger("usage: /select preferred|source <name>")),
                }
            }
            Command::Download { model, source, repo_url } => {
                report(catalog.download(&model, &source, repo_url.as_deref()).await);
            }
            Command::CloneModel { original, new_name, modifications } => {
                report(catalog.clone_model(&original, &new_name, &modifications).await);
            }
            Command::Generate { language, description } => {
                match capabilities.generate_code(&description, &language).await {
                    Ok(generated) => {
                        println!("--- {} ---", generated.language);
                        println!("{}", generated.code);
                    }
                    Err(e) => println!("{}", describe(&e)),
                }
            }
            Command::Analyze { code } => match capabilities.analyze_code(&code).await {
                Ok(report) => println!("{}", render_analysis(&report)),
                Err(e) => println!("{}", describe(&e)),
            },
            Command::Dataset { format, size, description } => {
                match capabilities.create_dataset(&description, &format, size.unwrap_or(10)).await {
                    Ok(preview) => {
                        println!("--- dataset ({}) ---", preview.format);
                        println!("{}", preview.body);
                    }
                    Err(e) => println!("{}", describe(&e)),
                }
            }
            Command::NetScript { description } => {
                match capabilities.network_script(&description).await {
                    Ok(bundle) => {
                        println!("{}", bundle.script);
                        if let Some(explanation) = bundle.explanation {
                            println!("-- {}", explanation);
                        }
                    }
                    Err(e) => println!("{}", describe(&e)),
                }
            }
            Command::Clones => match capabilities.list_clones().await {
                Ok(rows) => println!("{}", render_clones(&rows)),
                Err(e) => println!("{}", describe(&e)),
            },
            Command::CreateClone { description } => {
                match capabilities.create_clone(&description).await {
                    Ok(name) => println!("Created clone {}.", name),
                    Err(e) => println!("{}", describe(&e)),
                }
            }
            Command::UpdateClone { name, field, value } => {
                let result = match field.as_str() {
                    "desc" => capabilities.update_clone(&name, Some(&value), None).await,
                    "caps" => capabilities.update_clone(&name, None, Some(&value)).await,
                    _ => {
                        println!("{}", danger("usage: /update-clone <name> desc|caps <value>"));
                        continue;
                    }
                };
                report(result);
            }
            Command::Activate { name } => report(capabilities.activate_clone(&name).await),
            Command::Deactivate => report(capabilities.deactivate_clones().await),
            Command::Improve => match capabilities.suggest_improvements().await {
                Ok(suggestions) => println!("{}", render_suggestions(&suggestions)),
                Err(e) => println!("{}", describe(&e)),
            },
            Command::Unknown(head) => {
                println!("{}", danger(&format!("unknown command {}; try /help", head)));
            }
        }
    }

    info!("Console session ended");
    Ok(())
}

fn announce_route(before: Option<&str>, after: Option<&str>) {
    if before != after {
        if let Some(route) = after {
            println!("Conversation: {}", route);
        }
    }
}

/// The modal equivalent: show the reason, read an allow/deny answer, post
/// the decision. A closed stdin counts as deny so the pending request
/// cannot linger.
async fn decide_permission(
    chat: &mut ChatController,
    lines: &mut tokio::io::Lines<BufReader<tokio::io::Stdin>>,
    reason: &str
) -> Result<SendOutcome, Box<dyn Error + Send + Sync>> {
    println!("Permission required: {}", reason);
    loop {
        print!("Allow? [y/N]: ");
        let _ = std::io::stdout().flush();
        let granted = match lines.next_line().await? {
            None => false,
            Some(answer) => match answer.trim().to_lowercase().as_str() {
                "y" | "yes" => true,
                "n" | "no" | "" => false,
                _ => {
                    println!("Please answer y or n.");
                    continue;
                }
            },
        };
        return Ok(chat.resolve_permission(granted).await?);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::capabilities::{ StatusBadge, SuggestionItem };

    #[test]
    fn plain_text_is_a_chat_command() {
        assert_eq!(parse_command("hello there"), Command::Chat("hello there".to_string()));
    }

    #[test]
    fn download_parses_optional_fields() {
        assert_eq!(
            parse_command("/download gpt2"),
            Command::Download {
                model: "gpt2".to_string(),
                source: String::new(),
                repo_url: None,
            }
        );
        assert_eq!(
            parse_command("/download mymodel github https://github.com/a/b"),
            Command::Download {
                model: "mymodel".to_string(),
                source: "github".to_string(),
                repo_url: Some("https://github.com/a/b".to_string()),
            }
        );
    }

    #[test]
    fn clone_model_keeps_the_json_tail_intact() {
        assert_eq!(
            parse_command(r#"/clone-model gpt2 gpt2-tuned {"temperature": 0.9}"#),
            Command::CloneModel {
                original: "gpt2".to_string(),
                new_name: "gpt2-tuned".to_string(),
                modifications: r#"{"temperature": 0.9}"#.to_string(),
            }
        );
    }

    #[test]
    fn unknown_slash_command_is_flagged() {
        assert!(matches!(parse_command("/frobnicate"), Command::Unknown(_)));
    }

    #[test]
    fn clone_rows_render_with_badges() {
        let rows = vec![CloneRow {
            name: "THOR2".to_string(),
            description: "experimental".to_string(),
            base_version: "1.0".to_string(),
            created_at: "2024-01-01T00:00:00".to_string(),
            badge: StatusBadge::Active,
            capability_count: 3,
        }];
        let rendered = render_clones(&rows);
        assert!(rendered.contains("THOR2"));
        assert!(rendered.contains("ACTIVE"));
        assert!(rendered.contains("experimental"));
    }

    #[test]
    fn suggestions_render_every_shape() {
        assert_eq!(render_suggestions(&Suggestions::Text("just text".to_string())), "just text");
        assert_eq!(
            render_suggestions(&Suggestions::Wrapped { text: "wrapped".to_string() }),
            "wrapped"
        );
        let detailed = Suggestions::Detailed(vec![SuggestionItem {
            title: "Cache".to_string(),
            description: "add caching".to_string(),
            priority: "high".to_string(),
            implementation: "use redis".to_string(),
        }]);
        let rendered = render_suggestions(&detailed);
        assert!(rendered.contains("1. Cache [high]"));
        assert!(rendered.contains("add caching"));
    }
}
