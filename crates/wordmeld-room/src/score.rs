//! Matching and scoring: pure functions over one round's submissions.
//!
//! No clocks, no side effects — given the same submissions and player
//! count, the output is identical on every call. The room actor owns
//! when to call this; this module owns what a round is worth.

use wordmeld_protocol::{PlayerId, WordMatch};

/// Points credited to every member of a matching group, per group member.
/// A 3-way match is worth 30 to each of the three.
pub const POINTS_PER_MEMBER: u32 = 10;

/// The verdict on one round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundScore {
    /// One entry per word chosen by 2+ players, in first-seen order.
    pub matches: Vec<WordMatch>,
    /// `true` when every currently-present player submitted the same
    /// non-empty word — the game-ending condition.
    pub unanimous: bool,
}

/// Canonical form of a submitted word: surrounding whitespace trimmed,
/// case folded. `"Cat "` and `"cat"` are the same submission.
pub fn normalize(word: &str) -> String {
    word.trim().to_lowercase()
}

/// Groups submissions by word and scores the round.
///
/// `submissions` must already be normalized and hold at most one entry
/// per player; `player_count` is the number of players present at round
/// end (not the number who submitted). Players who submitted nothing are
/// simply absent — they can neither match nor win. An empty-string
/// submission never matches and never scores.
pub fn score_round(submissions: &[(PlayerId, String)], player_count: usize) -> RoundScore {
    // Group in first-seen order so match order is deterministic.
    let mut groups: Vec<(&str, Vec<PlayerId>)> = Vec::new();
    for (player, word) in submissions {
        if word.is_empty() {
            continue;
        }
        match groups.iter_mut().find(|(w, _)| *w == word.as_str()) {
            Some((_, members)) => members.push(*player),
            None => groups.push((word.as_str(), vec![*player])),
        }
    }

    let unanimous = player_count > 0
        && groups
            .iter()
            .any(|(_, members)| members.len() == player_count);

    let matches = groups
        .into_iter()
        .filter(|(_, members)| members.len() >= 2)
        .map(|(word, players)| WordMatch {
            word: word.to_string(),
            points: players.len() as u32 * POINTS_PER_MEMBER,
            players,
        })
        .collect();

    RoundScore { matches, unanimous }
}
