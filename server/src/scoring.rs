//! Ranking and standings text for LEADERBOARD and FINISHED messages

use crate::config::ServerConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Standing<'a> {
    pub rank: usize,
    pub username: &'a str,
    pub points: u32,
}

/// Orders players by points (descending) then username, with competition
/// ranking: tied players share a rank and the next score group takes its
/// 1-based position, so points `[3, 3, 1]` rank as `[1, 1, 3]`.
pub fn rank<'a>(players: impl IntoIterator<Item = (&'a str, u32)>) -> Vec<Standing<'a>> {
    let mut ordered: Vec<(&str, u32)> = players.into_iter().collect();
    ordered.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    let mut standings: Vec<Standing> = Vec::with_capacity(ordered.len());
    for (position, (username, points)) in ordered.into_iter().enumerate() {
        let rank = match standings.last() {
            Some(previous) if previous.points == points => previous.rank,
            _ => position + 1,
        };
        standings.push(Standing {
            rank,
            username,
            points,
        });
    }
    standings
}

/// Everyone sharing the top point total
pub fn winners<'a>(standings: &[Standing<'a>]) -> Vec<&'a str> {
    let Some(top) = standings.first() else {
        return Vec::new();
    };
    standings
        .iter()
        .take_while(|s| s.points == top.points)
        .map(|s| s.username)
        .collect()
}

/// One `"<rank>. <username>: <points> <noun>"` line per player
pub fn format_leaderboard(standings: &[Standing], config: &ServerConfig) -> String {
    standings
        .iter()
        .map(|s| {
            format!(
                "{}. {}: {} {}",
                s.rank,
                s.username,
                s.points,
                config.points_noun(s.points)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Heading, leaderboard and winner line, newline separated
pub fn format_final_standings(standings: &[Standing], config: &ServerConfig) -> String {
    let mut lines = vec![
        config.final_standings_heading.clone(),
        format_leaderboard(standings, config),
    ];
    let winners = winners(standings);
    if !winners.is_empty() {
        lines.push(config.render_winners(&winners));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;

    #[test]
    fn test_rank_orders_by_points_then_name() {
        let standings = rank([("zoe", 1), ("alice", 2), ("bob", 1)]);
        let names: Vec<&str> = standings.iter().map(|s| s.username).collect();
        assert_eq!(names, vec!["alice", "bob", "zoe"]);
        let ranks: Vec<usize> = standings.iter().map(|s| s.rank).collect();
        assert_eq!(ranks, vec![1, 2, 2]);
    }

    #[test]
    fn test_ties_share_rank_and_skip_positions() {
        let standings = rank([("carl", 1), ("bob", 3), ("alice", 3), ("dan", 0)]);
        let ranks: Vec<(usize, &str)> = standings.iter().map(|s| (s.rank, s.username)).collect();
        assert_eq!(ranks, vec![(1, "alice"), (1, "bob"), (3, "carl"), (4, "dan")]);
    }

    #[test]
    fn test_leaderboard_text() {
        let config = test_config(3, &["Mathematics"]);
        let standings = rank([("zoe", 1), ("alice", 2), ("bob", 1)]);
        assert_eq!(
            format_leaderboard(&standings, &config),
            "1. alice: 2 points\n2. bob: 1 point\n2. zoe: 1 point"
        );
    }

    #[test]
    fn test_zero_points_uses_plural() {
        let config = test_config(1, &["Mathematics"]);
        assert_eq!(
            format_leaderboard(&rank([("alice", 0)]), &config),
            "1. alice: 0 points"
        );
    }

    #[test]
    fn test_winners() {
        let tied = rank([("alice", 3), ("bob", 3), ("carl", 1)]);
        assert_eq!(winners(&tied), vec!["alice", "bob"]);

        let single = rank([("bob", 2), ("alice", 4)]);
        assert_eq!(winners(&single), vec!["alice"]);

        assert!(winners(&[]).is_empty());
    }

    #[test]
    fn test_final_standings_multiple_winners() {
        let config = test_config(3, &["Mathematics"]);
        let standings = rank([("alice", 3), ("bob", 3), ("carl", 1)]);
        assert_eq!(
            format_final_standings(&standings, &config),
            "Final standings:\n1. alice: 3 points\n1. bob: 3 points\n3. carl: 1 point\nWinners: alice, bob"
        );
    }

    #[test]
    fn test_final_standings_single_winner() {
        let config = test_config(2, &["Mathematics"]);
        let standings = rank([("alice", 4), ("bob", 2)]);
        let text = format_final_standings(&standings, &config);
        assert!(text.ends_with("\nWinner: alice"));
        assert!(text.starts_with("Final standings:\n1. alice: 4 points\n2. bob: 2 points"));
    }

    #[test]
    fn test_single_player_all_zero_is_winner() {
        let config = test_config(1, &["Mathematics"]);
        let standings = rank([("alice", 0)]);
        assert_eq!(
            format_final_standings(&standings, &config),
            "Final standings:\n1. alice: 0 points\nWinner: alice"
        );
    }
}
