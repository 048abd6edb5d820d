use regex::Regex;
use std::sync::OnceLock;

/// Case-insensitive substring match, not whole-word: `robotics42` is flagged
/// on `bot`. Coarse by intent; false positives are accepted behavior.
pub const BOT_NAME_PATTERN: &str = "(?i)bot|automation|crawler";

fn bot_name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(BOT_NAME_PATTERN).expect("bot name pattern is valid"))
}

/// Heuristic verdict for one actor name. A missing name is never a bot.
pub fn is_bot(username: Option<&str>) -> bool {
    match username {
        Some(name) => bot_name_re().is_match(name),
        None => false,
    }
}
