use std::error::Error;
use std::fs;
use std::path::{ Path, PathBuf };

use log::warn;
use tokio::io::{ AsyncBufReadExt, BufReader };

use crate::agent::{ ChatError, ForgeAgent };
use crate::config::prompt::PromptConfig;
use crate::history::is_conversation_file;
use crate::models::chat::{ Conversation, Role };

const HELP: &str = "\
Commands:
  <text>            reply to the smith (or ask, if no conversation is open)
  /new <question>   start a new conversation
  /save             save the active conversation
  /list             list saved conversations
  /load <file>      load a saved conversation
  /show             show the whole conversation
  /help             this message
  /quit             leave the forge";

#[derive(Debug, PartialEq, Eq)]
enum Command<'a> {
    Say(&'a str),
    New(&'a str),
    Save,
    List,
    Load(&'a str),
    Show,
    Help,
    Quit,
    Unknown(&'a str),
}

fn parse_command(line: &str) -> Command<'_> {
    let trimmed = line.trim();
    if !trimmed.starts_with('/') {
        return Command::Say(trimmed);
    }
    let (name, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (trimmed, ""),
    };
    match name {
        "/new" => Command::New(rest),
        "/save" => Command::Save,
        "/list" => Command::List,
        "/load" => Command::Load(rest),
        "/show" => Command::Show,
        "/help" => Command::Help,
        "/quit" | "/exit" => Command::Quit,
        other => Command::Unknown(other),
    }
}

/// Full transcript, a blank line after every turn.
pub fn render_conversation(conversation: &Conversation, prompts: &PromptConfig) -> String {
    let mut out = String::new();
    for turn in conversation.turns() {
        let label = match turn.role {
            Role::User => prompts.user_display_label.as_str(),
            Role::Assistant => prompts.persona_name.as_str(),
        };
        out.push_str(&format!("{}: {}\n\n", label, turn.content));
    }
    out
}

/// Saved conversations in the storage directory, newest name last.
pub fn list_conversations(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut files: Vec<PathBuf> = fs
        ::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && is_conversation_file(path))
        .collect();
    files.sort();
    Ok(files)
}

/// A bare file name is looked up in the storage directory first; the
/// literal path is used only when the storage directory has no such file.
fn resolve_load_path(arg: &str, dir: &Path) -> PathBuf {
    let path = PathBuf::from(arg);
    if path.components().count() != 1 {
        return path;
    }
    let stored = dir.join(&path);
    if stored.exists() || !path.exists() {
        stored
    } else {
        path
    }
}

fn report(err: &ChatError, prompts: &PromptConfig) {
    match err {
        ChatError::Validation(nudge) => println!("{}: {}", prompts.persona_name, nudge),
        ChatError::NoActiveConversation =>
            println!("No active conversation. Ask something first or /load a saved one."),
        ChatError::Gateway(e) => println!("Error: {}", e),
        ChatError::Load(e) => println!("Error: Failed to load file: {}", e),
    }
}

async fn handle_say(agent: &mut ForgeAgent, text: &str) {
    if agent.current().is_none() {
        return handle_new(agent, text).await;
    }
    let prompts = agent.prompts().clone();
    match agent.reply(text).await {
        Ok(answer) => println!("\n{} responde novamente:\n{}\n", prompts.persona_name, answer),
        Err(e) => report(&e, &prompts),
    }
}

async fn handle_new(agent: &mut ForgeAgent, question: &str) {
    let prompts = agent.prompts().clone();
    match agent.ask(question).await {
        Ok(conversation) => println!("\n{}", render_conversation(conversation, &prompts)),
        Err(e) => report(&e, &prompts),
    }
}

fn handle_load(agent: &mut ForgeAgent, arg: &str) {
    if arg.is_empty() {
        println!("Usage: /load <file>");
        return;
    }
    let path = resolve_load_path(arg, agent.store().dir());
    let prompts = agent.prompts().clone();
    match agent.load(&path) {
        Ok(conversation) => print!("\n{}", render_conversation(conversation, &prompts)),
        Err(e) => report(&e, &prompts),
    }
}

fn handle_list(agent: &ForgeAgent) {
    match list_conversations(agent.store().dir()) {
        Ok(files) if files.is_empty() => println!("No saved conversations yet."),
        Ok(files) => {
            for file in files {
                if let Some(name) = file.file_name() {
                    println!("  {}", name.to_string_lossy());
                }
            }
        }
        Err(e) => {
            warn!("Failed to list {}: {}", agent.store().dir().display(), e);
            println!("Error: cannot read {}", agent.store().dir().display());
        }
    }
}

/// Reads stdin line by line until EOF or `/quit`.
pub async fn run_repl(mut agent: ForgeAgent) -> Result<(), Box<dyn Error + Send + Sync>> {
    println!("{}\n", agent.prompts().empty_input_nudge);
    println!("Type /help for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_command(&line) {
            Command::Say(text) => handle_say(&mut agent, text).await,
            Command::New(question) => handle_new(&mut agent, question).await,
            Command::Save =>
                match agent.save_active() {
                    Ok(Some(path)) => println!("Conversation saved to {}", path.display()),
                    Ok(None) => println!("Could not save right now; see the log."),
                    Err(e) => report(&e, agent.prompts()),
                }
            Command::List => handle_list(&agent),
            Command::Load(arg) => handle_load(&mut agent, arg),
            Command::Show =>
                match agent.current() {
                    Some(conversation) =>
                        print!("{}", render_conversation(conversation, agent.prompts())),
                    None => report(&ChatError::NoActiveConversation, agent.prompts()),
                }
            Command::Help => println!("{}", HELP),
            Command::Quit => break,
            Command::Unknown(name) => println!("Unknown command {}. Type /help.", name),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands_and_plain_text() {
        assert_eq!(parse_command("  Olá, ferreiro "), Command::Say("Olá, ferreiro"));
        assert_eq!(parse_command("/new Quem é você?"), Command::New("Quem é você?"));
        assert_eq!(parse_command("/load convo_1.json"), Command::Load("convo_1.json"));
        assert_eq!(parse_command("/load"), Command::Load(""));
        assert_eq!(parse_command("/exit"), Command::Quit);
        assert_eq!(parse_command("/dance"), Command::Unknown("/dance"));
    }

    #[test]
    fn renders_with_display_labels() {
        let convo = Conversation::seeded("Quem é você?", "Eu sou Shibori.");
        assert_eq!(
            render_conversation(&convo, &PromptConfig::default()),
            "Você: Quem é você?\n\nShibori: Eu sou Shibori.\n\n"
        );
    }

    #[test]
    fn lists_only_json_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("convo_20250102_000000.json"), "[]").unwrap();
        fs::write(dir.path().join("convo_20250101_000000.json"), "[]").unwrap();
        fs::write(dir.path().join("readme.txt"), "").unwrap();

        let names: Vec<_> = list_conversations(dir.path())
            .unwrap()
            .into_iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["convo_20250101_000000.json", "convo_20250102_000000.json"]);
        assert!(list_conversations(&dir.path().join("missing")).unwrap().is_empty());
    }

    #[test]
    fn bare_names_resolve_into_storage_dir() {
        let dir = Path::new("/srv/convos");
        assert_eq!(
            resolve_load_path("convo_x.json", dir),
            PathBuf::from("/srv/convos/convo_x.json")
        );
        assert_eq!(resolve_load_path("/abs/a.json", dir), PathBuf::from("/abs/a.json"));
    }

    #[test]
    fn storage_dir_wins_over_working_dir() {
        let dir = tempfile::tempdir().unwrap();
        // Cargo.toml exists in the working directory while tests run.
        fs::write(dir.path().join("Cargo.toml"), "[]").unwrap();
        assert_eq!(resolve_load_path("Cargo.toml", dir.path()), dir.path().join("Cargo.toml"));

        let empty = tempfile::tempdir().unwrap();
        assert_eq!(resolve_load_path("Cargo.toml", empty.path()), PathBuf::from("Cargo.toml"));
    }
}
