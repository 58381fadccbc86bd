//! Player scoreboard
//!
//! Scores are plain integers adjusted by the host after each spin; the wheel
//! itself never scores anybody.

use rf_core::{Player, RfError, RfResult};

/// Ordered list of players with their scores
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scoreboard {
    players: Vec<Player>,
}

impl Scoreboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_players(players: Vec<Player>) -> Self {
        Self { players }
    }

    /// Players in insertion order
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn into_players(self) -> Vec<Player> {
        self.players
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    /// Add a player with score 0. The name is trimmed; blank names are rejected.
    pub fn add_player(&mut self, name: &str) -> RfResult<&Player> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RfError::InvalidName);
        }
        let player = Player::new(uuid::Uuid::new_v4().to_string(), name);
        log::debug!("[Scoreboard] Added {} ({})", player.name, player.id);
        self.players.push(player);
        Ok(&self.players[self.players.len() - 1])
    }

    /// Add `delta` (may be negative) to a player's score, returning the new score
    pub fn adjust_score(&mut self, id: &str, delta: i64) -> RfResult<i64> {
        let player = self
            .players
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| RfError::UnknownPlayer(id.to_string()))?;
        player.score = player.score.saturating_add(delta);
        Ok(player.score)
    }

    pub fn remove_player(&mut self, id: &str) -> RfResult<Player> {
        let index = self
            .players
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| RfError::UnknownPlayer(id.to_string()))?;
        Ok(self.players.remove(index))
    }

    /// Players by score, highest first. Equal scores keep insertion order.
    pub fn ranked(&self) -> Vec<&Player> {
        let mut ranked: Vec<&Player> = self.players.iter().collect();
        ranked.sort_by(|a, b| b.score.cmp(&a.score));
        ranked
    }

    /// First player in the ranking
    pub fn leader(&self) -> Option<&Player> {
        self.ranked().into_iter().next()
    }

    /// Holds the top score. Never true with fewer than two players.
    pub fn is_leader(&self, id: &str) -> bool {
        self.score_of(id).is_some_and(|score| self.scores().max() == Some(score))
    }

    /// Holds the bottom score. Never true with fewer than two players.
    pub fn is_last(&self, id: &str) -> bool {
        self.score_of(id).is_some_and(|score| self.scores().min() == Some(score))
    }

    fn score_of(&self, id: &str) -> Option<i64> {
        if self.players.len() < 2 {
            return None;
        }
        self.get(id).map(|p| p.score)
    }

    fn scores(&self) -> impl Iterator<Item = i64> + '_ {
        self.players.iter().map(|p| p.score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(names: &[&str]) -> (Scoreboard, Vec<String>) {
        let mut board = Scoreboard::new();
        let ids = names
            .iter()
            .map(|n| board.add_player(n).unwrap().id.clone())
            .collect();
        (board, ids)
    }

    #[test]
    fn test_add_player_trims_and_rejects_blank() {
        let mut board = Scoreboard::new();
        let player = board.add_player("  Ana  ").unwrap();
        assert_eq!(player.name, "Ana");
        assert_eq!(player.score, 0);

        assert!(matches!(board.add_player("   "), Err(RfError::InvalidName)));
        assert!(matches!(board.add_player(""), Err(RfError::InvalidName)));
        assert_eq!(board.len(), 1);
    }

    #[test]
    fn test_adjust_and_remove() {
        let (mut board, ids) = board(&["Ana", "Bo"]);
        assert_eq!(board.adjust_score(&ids[0], 3).unwrap(), 3);
        assert_eq!(board.adjust_score(&ids[0], -5).unwrap(), -2);
        assert!(matches!(
            board.adjust_score("ghost", 1),
            Err(RfError::UnknownPlayer(_))
        ));

        let removed = board.remove_player(&ids[1]).unwrap();
        assert_eq!(removed.name, "Bo");
        assert!(board.remove_player(&ids[1]).is_err());
        assert_eq!(board.len(), 1);
    }

    #[test]
    fn test_ranking_is_stable() {
        let (mut board, ids) = board(&["Ana", "Bo", "Cy"]);
        board.adjust_score(&ids[2], 2).unwrap();

        let names: Vec<_> = board.ranked().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Cy", "Ana", "Bo"]);
        assert_eq!(board.leader().unwrap().name, "Cy");
        // Insertion order untouched
        assert_eq!(board.players()[0].name, "Ana");
    }

    #[test]
    fn test_leader_and_last_flags() {
        let (mut board, ids) = board(&["Solo"]);
        assert!(!board.is_leader(&ids[0]));
        assert!(!board.is_last(&ids[0]));

        let bo = board.add_player("Bo").unwrap().id.clone();
        // Tied: both lead and both trail
        assert!(board.is_leader(&ids[0]) && board.is_leader(&bo));
        assert!(board.is_last(&ids[0]) && board.is_last(&bo));

        board.adjust_score(&bo, 1).unwrap();
        assert!(board.is_leader(&bo));
        assert!(!board.is_leader(&ids[0]));
        assert!(board.is_last(&ids[0]));
        assert!(!board.is_last("ghost"));
    }

    #[test]
    fn test_empty_board() {
        let board = Scoreboard::new();
        assert!(board.leader().is_none());
        assert!(board.ranked().is_empty());
    }
}
