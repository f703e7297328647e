//! Parser for the `;`-delimited command grammar.
//!
//! ```text
//! start; <requirements text>; <session_id or empty>
//! refine; <feedback text>; <session_id>
//! enhance; <context text>; <session_id>
//! edited; <replacement content>; <session_id>
//! review; score:<1-10>; feedback:<text>; <session_id>
//! approved; ; <session_id>
//! rejected; <reason>; <session_id>
//! feedback_history; <session_id>
//! suggest_improvements; <session_id>
//! ```

use crate::domain::errors::ParseError;
use crate::domain::models::{Command, Verb};

const SCORE_PREFIX: &str = "score:";
const FEEDBACK_PREFIX: &str = "feedback:";

/// Parses one command line into a typed [`Command`].
///
/// The first field is the verb (case-insensitive), the last field is the session
/// id and everything in between belongs to the verb. Every field is trimmed.
pub fn parse_command(line: &str) -> Result<Command, ParseError> {
    let line = line.trim();
    if line.is_empty() {
        return Err(ParseError::Empty);
    }

    let fields: Vec<&str> = line.split(';').map(str::trim).collect();
    let verb = Verb::parse(fields[0]).ok_or_else(|| ParseError::UnknownVerb(fields[0].to_string()))?;

    let (args, session_id) = match fields.len() {
        1 => (&fields[1..], ""),
        n => (&fields[1..n - 1], fields[n - 1]),
    };

    if session_id.is_empty() && verb != Verb::Start {
        return Err(ParseError::MissingSessionId(verb));
    }
    let session_id = session_id.to_string();

    let command = match verb {
        Verb::Start => Command::Start {
            requirements: required_text(verb, args)?,
            session_id: (!session_id.is_empty()).then_some(session_id),
        },
        Verb::Refine => Command::Refine {
            feedback: required_text(verb, args)?,
            session_id,
        },
        Verb::Enhance => Command::Enhance {
            context: required_text(verb, args)?,
            session_id,
        },
        Verb::Edited => Command::Edited {
            content: required_text(verb, args)?,
            session_id,
        },
        Verb::Review => {
            let (score, feedback) = parse_review(args)?;
            Command::Review {
                score,
                feedback,
                session_id,
            }
        }
        Verb::Approved => Command::Approved {
            note: join_text(args),
            session_id,
        },
        Verb::Rejected => Command::Rejected {
            reason: join_text(args),
            session_id,
        },
        Verb::FeedbackHistory => {
            ensure_no_args(verb, args)?;
            Command::FeedbackHistory { session_id }
        }
        Verb::SuggestImprovements => {
            ensure_no_args(verb, args)?;
            Command::SuggestImprovements { session_id }
        }
    };

    Ok(command)
}

/// Re-joins middle fields so free text containing `;` survives the split.
fn join_text(args: &[&str]) -> String {
    args.iter()
        .copied()
        .filter(|arg| !arg.is_empty())
        .collect::<Vec<_>>()
        .join("; ")
}

fn required_text(verb: Verb, args: &[&str]) -> Result<String, ParseError> {
    let text = join_text(args);
    if text.is_empty() {
        return Err(ParseError::MissingArgument(verb));
    }
    Ok(text)
}

fn ensure_no_args(verb: Verb, args: &[&str]) -> Result<(), ParseError> {
    if args.iter().any(|arg| !arg.is_empty()) {
        return Err(ParseError::UnexpectedArgument(verb));
    }
    Ok(())
}

/// Strips `prefix` from `token` ignoring ASCII case.
fn strip_prefix_ignore_case<'a>(token: &'a str, prefix: &str) -> Option<&'a str> {
    let head = token.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &token[prefix.len()..])
}

/// Reads `score:` and `feedback:` tokens in any order.
///
/// Tokens without a known prefix continue the feedback text.
fn parse_review(args: &[&str]) -> Result<(u8, String), ParseError> {
    let mut score: Option<u8> = None;
    let mut feedback: Vec<&str> = Vec::new();

    for token in args.iter().copied().filter(|t| !t.is_empty()) {
        if let Some(raw) = strip_prefix_ignore_case(token, SCORE_PREFIX) {
            if score.is_none() {
                score = Some(parse_score(raw.trim())?);
            }
        } else if let Some(text) = strip_prefix_ignore_case(token, FEEDBACK_PREFIX) {
            let text = text.trim();
            if !text.is_empty() {
                feedback.push(text);
            }
        } else {
            feedback.push(token);
        }
    }

    let score = score.ok_or_else(|| ParseError::InvalidScore("missing".to_string()))?;
    Ok((score, feedback.join("; ")))
}

fn parse_score(raw: &str) -> Result<u8, ParseError> {
    match raw.parse::<u8>() {
        Ok(score) if (1..=10).contains(&score) => Ok(score),
        _ => Err(ParseError::InvalidScore(raw.to_string())),
    }
}
