//! Player-list response parsing
//!
//! The `players` RCON response format is not a stable contract across server
//! versions, so two extraction rules run on every response: bullet lines
//! (`- Name`) and the summary line (`Players connected (2): Alice, Bob`).
//! When both fire on the same response the set semantics deduplicate.

use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

static CONNECTED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Players connected \((\d+)\):(.*)").unwrap());

/// Parse a `players` RCON response into the set of online player names
///
/// # Examples
///
/// ```
/// use palisade::presence::parse_player_list;
///
/// let players = parse_player_list("Players connected (2): Alice, Bob");
/// assert!(players.contains("Alice"));
/// assert!(players.contains("Bob"));
/// ```
pub fn parse_player_list(response: &str) -> BTreeSet<String> {
    let mut players = BTreeSet::new();

    for line in response.lines() {
        let line = line.trim();

        if let Some(rest) = line.strip_prefix('-') {
            let name = rest.trim();
            if !name.is_empty() {
                players.insert(name.to_string());
            }
        }

        if line.contains("Players connected") {
            if let Some(caps) = CONNECTED_RE.captures(line) {
                if let Some(list) = caps.get(2) {
                    for name in list.as_str().split(',') {
                        let name = name.trim();
                        if !name.is_empty() {
                            players.insert(name.to_string());
                        }
                    }
                }
            }
        }
    }

    players
}
