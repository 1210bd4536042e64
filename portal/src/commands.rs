//! Turns a line typed at the prompt into view intents.

use gif_portal_client::view::Intent;

pub const HELP: &str = "\
commands:
  connect              connect the wallet (prompts for approval)
  disconnect           drop the wallet session
  init                 one-time initialization of the program account
  add <gif link>       submit a gif link
  draft <text>         edit the input without submitting
  submit               submit the current input
  upvote <link | #n>   upvote an entry by link or by its position in the list
  refresh              re-read the program account
  show                 print the current view
  help                 print this message
  quit                 exit";

#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Intents(Vec<Intent>),
    /// Upvote the n-th (1-based) listed entry.
    UpvoteNth(usize),
    Show,
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let (word, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(w, r)| (w, r.trim()));

    let single = |intent: Intent| -> Result<Command, String> { Ok(Command::Intents(vec![intent])) };
    match (word, rest) {
        ("connect", "") => single(Intent::Connect),
        ("disconnect", "") => single(Intent::Disconnect),
        ("init" | "initialize", "") => single(Intent::Initialize),
        ("refresh", "") => single(Intent::Refresh),
        ("submit", "") => single(Intent::Submit),
        ("add", link) => Ok(Command::Intents(vec![
            Intent::SetDraft(link.to_string()),
            Intent::Submit,
        ])),
        ("draft", text) => single(Intent::SetDraft(text.to_string())),
        ("upvote", "") => Err("upvote needs a link or #n".into()),
        ("upvote", target) => match target.strip_prefix('#') {
            Some(n) => n
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .map(Command::UpvoteNth)
                .ok_or_else(|| format!("`{target}` isn't a list position")),
            None => single(Intent::Upvote {
                link: target.to_string(),
            }),
        },
        ("show" | "", "") => Ok(Command::Show),
        ("help" | "?", _) => Ok(Command::Help),
        ("quit" | "exit" | "q", "") => Ok(Command::Quit),
        _ => Err(format!("Unknown command `{line}`; type `help`")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_sets_the_draft_then_submits() {
        assert_eq!(
            parse_command("add https://example.com/a.gif").unwrap(),
            Command::Intents(vec![
                Intent::SetDraft("https://example.com/a.gif".into()),
                Intent::Submit
            ])
        );
        // A bare `add` still goes through the empty-input check.
        assert_eq!(
            parse_command("add").unwrap(),
            Command::Intents(vec![Intent::SetDraft(String::new()), Intent::Submit])
        );
    }

    #[test]
    fn upvote_by_link_or_position() {
        assert_eq!(
            parse_command("upvote https://example.com/a.gif").unwrap(),
            Command::Intents(vec![Intent::Upvote {
                link: "https://example.com/a.gif".into()
            }])
        );
        assert_eq!(parse_command("upvote #2").unwrap(), Command::UpvoteNth(2));
        assert!(parse_command("upvote #0").is_err());
        assert!(parse_command("upvote").is_err());
    }

    #[test]
    fn unknown_commands_are_errors() {
        assert!(parse_command("connect now").is_err());
        assert!(parse_command("launch").is_err());
        assert_eq!(parse_command("  ").unwrap(), Command::Show);
    }
}
