//! MCTS Tree structure and node management
//!
//! Uses arena allocation: nodes live in one `Vec`, children are indices,
//! and backpropagation walks parent indices instead of back-pointers.

use ghostship_core::rules::{legal_moves, simulate_turn};
use ghostship_core::{Board, Move, Player};

// ============================================================================
// TYPES
// ============================================================================

/// Node identifier (index into arena)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub usize);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);
}

/// Statistics for a tree node
#[derive(Clone, Debug, Default)]
pub struct NodeStats {
    /// Number of simulations through this node
    pub visits: u32,
    /// Sum of simulation scores from the searching AI's point of view
    pub wins: f32,
}

impl NodeStats {
    /// AI win rate through this node
    pub fn win_rate(&self) -> f32 {
        if self.visits == 0 {
            0.5
        } else {
            self.wins / self.visits as f32
        }
    }
}

/// A node in the MCTS tree
#[derive(Clone, Debug)]
pub struct MctsNode {
    /// Board at this node
    pub board: Board,
    /// Player who places next from this node
    pub to_move: Player,
    /// Parent node (None for root)
    pub parent: Option<NodeId>,
    /// Move that led here (None for root)
    pub incoming_move: Option<Move>,
    /// Children in expansion order
    pub children: Vec<NodeId>,
    /// Moves not yet expanded, next one last
    pub untried_moves: Vec<Move>,
    pub stats: NodeStats,
}

impl MctsNode {
    pub fn new(board: Board, to_move: Player, parent: Option<NodeId>, incoming_move: Option<Move>) -> Self {
        // Expand in ascending column order, so store reversed for pop()
        let untried_moves = if board.winner().is_none() {
            let mut moves = legal_moves(&board, to_move);
            moves.reverse();
            moves
        } else {
            Vec::new()
        };

        Self {
            board,
            to_move,
            parent,
            incoming_move,
            children: Vec::new(),
            untried_moves,
            stats: NodeStats::default(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.board.winner().is_some()
    }

    pub fn is_fully_expanded(&self) -> bool {
        self.untried_moves.is_empty()
    }
}

// ============================================================================
// MCTS TREE
// ============================================================================

/// MCTS search tree with arena allocation
#[derive(Debug)]
pub struct MctsTree {
    nodes: Vec<MctsNode>,
    /// Player the search is run for
    ai: Player,
}

impl MctsTree {
    /// New tree rooted at `board` with `ai` to move
    pub fn new(board: Board, ai: Player) -> Self {
        Self {
            nodes: vec![MctsNode::new(board, ai, None, None)],
            ai,
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    pub fn ai(&self) -> Player {
        self.ai
    }

    pub fn get(&self, id: NodeId) -> &MctsNode {
        &self.nodes[id.0]
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut MctsNode {
        &mut self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // ========================================================================
    // Selection and expansion
    // ========================================================================

    /// Walk down by UCB1 while nodes are fully expanded and not terminal.
    ///
    /// Returns the path from root to the selected node.
    pub fn select_leaf(&self, exploration: f32) -> Vec<NodeId> {
        let mut path = vec![self.root()];
        let mut current = self.root();

        while self.get(current).is_fully_expanded() && !self.get(current).is_terminal() {
            match self.select_best_child(current, exploration) {
                Some(child) => {
                    path.push(child);
                    current = child;
                }
                None => break,
            }
        }

        path
    }

    /// Add one child for the next untried move.
    ///
    /// Returns `None` if the node is already fully expanded.
    pub fn expand(&mut self, node_id: NodeId) -> Option<NodeId> {
        let mv = self.get_mut(node_id).untried_moves.pop()?;
        let parent = self.get(node_id);
        let mover = parent.to_move;
        let child_board = simulate_turn(&parent.board, mv, mover);

        let child_id = NodeId(self.nodes.len());
        self.nodes
            .push(MctsNode::new(child_board, mover.opponent(), Some(node_id), Some(mv)));
        self.get_mut(node_id).children.push(child_id);

        Some(child_id)
    }

    /// Child with the highest UCB1, first one on ties
    fn select_best_child(&self, node_id: NodeId, exploration: f32) -> Option<NodeId> {
        let node = self.get(node_id);
        let parent_visits = node.stats.visits;
        // Win rates are stored for the AI; the opponent picks by its own
        let for_ai = node.to_move == self.ai;

        let mut best: Option<(NodeId, f32)> = None;
        for &child in &node.children {
            let value = self.ucb1(child, parent_visits, exploration, for_ai);
            if best.map_or(true, |(_, v)| value > v) {
                best = Some((child, value));
            }
        }
        best.map(|(id, _)| id)
    }

    /// UCB1 = rate + C * sqrt(ln(parent_visits) / visits), infinite when
    /// unvisited. With C = sqrt(2) this is rate + sqrt(2 ln N / n).
    fn ucb1(&self, node_id: NodeId, parent_visits: u32, exploration: f32, for_ai: bool) -> f32 {
        let stats = &self.get(node_id).stats;
        if stats.visits == 0 {
            return f32::INFINITY;
        }

        let rate = if for_ai {
            stats.win_rate()
        } else {
            1.0 - stats.win_rate()
        };
        let explore = exploration * ((parent_visits as f32).ln() / stats.visits as f32).sqrt();
        rate + explore
    }

    // ========================================================================
    // Backpropagation
    // ========================================================================

    /// Add one visit and `score` (AI perspective) to `leaf` and every
    /// ancestor up to the root
    pub fn backpropagate(&mut self, leaf: NodeId, score: f32) {
        let mut current = Some(leaf);
        while let Some(id) = current {
            let node = self.get_mut(id);
            node.stats.visits += 1;
            node.stats.wins += score;
            current = node.parent;
        }
    }

    // ========================================================================
    // Results
    // ========================================================================

    /// Root child with the most visits, first one on ties
    pub fn best_move(&self) -> Option<Move> {
        let mut best: Option<(&MctsNode, u32)> = None;
        for &id in &self.get(self.root()).children {
            let child = self.get(id);
            if best.map_or(true, |(_, visits)| child.stats.visits > visits) {
                best = Some((child, child.stats.visits));
            }
        }
        best.and_then(|(node, _)| node.incoming_move)
    }

    /// (move, visits, AI win rate) for every root child
    pub fn move_statistics(&self) -> Vec<(Move, u32, f32)> {
        self.get(self.root())
            .children
            .iter()
            .filter_map(|&id| {
                let node = self.get(id);
                node.incoming_move
                    .map(|mv| (mv, node.stats.visits, node.stats.win_rate()))
            })
            .collect()
    }

    /// Simulations run so far (root visits)
    pub fn total_simulations(&self) -> u32 {
        self.get(self.root()).stats.visits
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use ghostship_core::TroopType;

    fn mock_board() -> Board {
        Board::new(3, 4)
    }

    #[test]
    fn test_node_creation() {
        let node = MctsNode::new(mock_board(), Player::One, None, None);
        assert!(node.parent.is_none());
        assert!(node.incoming_move.is_none());
        assert!(node.children.is_empty());
        assert_eq!(node.untried_moves.len(), 3);
        assert_eq!(node.untried_moves.last().unwrap().col, 0);
        assert_eq!(node.stats.visits, 0);
    }

    #[test]
    fn test_terminal_node_has_no_moves() {
        let mut board = Board::new(1, 2);
        ghostship_core::rules::place_troop(&mut board, 1, 0, Player::One, TroopType::Small);
        board.check_for_winner();

        let node = MctsNode::new(board, Player::Two, None, None);
        assert!(node.is_terminal());
        assert!(node.untried_moves.is_empty());
    }

    #[test]
    fn test_node_stats_win_rate() {
        let mut stats = NodeStats::default();
        assert_eq!(stats.win_rate(), 0.5);

        stats.visits = 10;
        stats.wins = 7.0;
        assert!((stats.win_rate() - 0.7).abs() < 0.001);
    }

    #[test]
    fn test_ucb1_unexplored() {
        let tree = MctsTree::new(mock_board(), Player::One);
        assert!(tree.ucb1(NodeId::ROOT, 100, 1.41, true).is_infinite());
    }

    #[test]
    fn test_tree_expansion_in_column_order() {
        let mut tree = MctsTree::new(mock_board(), Player::Two);

        let first = tree.expand(NodeId::ROOT).unwrap();
        let second = tree.expand(NodeId::ROOT).unwrap();
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.get(first).parent, Some(NodeId::ROOT));
        assert_eq!(tree.get(first).incoming_move.unwrap().col, 0);
        assert_eq!(tree.get(second).incoming_move.unwrap().col, 1);
        assert_eq!(tree.get(first).to_move, Player::One);
        // The child board is a separate clone
        assert!(tree.get(NodeId::ROOT).board.troops().next().is_none());
        assert_eq!(tree.get(first).board.troop_count(Player::Two), 1);
    }

    #[test]
    fn test_unvisited_children_selected_first() {
        let mut tree = MctsTree::new(mock_board(), Player::One);
        let a = tree.expand(NodeId::ROOT).unwrap();
        let b = tree.expand(NodeId::ROOT).unwrap();
        let c = tree.expand(NodeId::ROOT).unwrap();
        tree.backpropagate(a, 1.0);
        tree.backpropagate(c, 1.0);

        let path = tree.select_leaf(2f32.sqrt());
        assert_eq!(path, vec![NodeId::ROOT, b]);
    }

    #[test]
    fn test_backpropagation_reaches_root() {
        let mut tree = MctsTree::new(mock_board(), Player::One);
        let child = tree.expand(NodeId::ROOT).unwrap();
        let grandchild = tree.expand(child).unwrap();

        tree.backpropagate(grandchild, 1.0);
        tree.backpropagate(child, 0.0);

        assert_eq!(tree.get(grandchild).stats.visits, 1);
        assert_eq!(tree.get(child).stats.visits, 2);
        assert_eq!(tree.get(child).stats.wins, 1.0);
        assert_eq!(tree.total_simulations(), 2);
    }

    #[test]
    fn test_best_move_most_visits_first_on_ties() {
        let mut tree = MctsTree::new(mock_board(), Player::One);
        let a = tree.expand(NodeId::ROOT).unwrap();
        let b = tree.expand(NodeId::ROOT).unwrap();
        tree.backpropagate(a, 0.0);
        tree.backpropagate(b, 1.0);

        // Equal visits: first child wins despite the lower win rate
        assert_eq!(tree.best_move().unwrap().col, 0);

        tree.backpropagate(b, 0.0);
        assert_eq!(tree.best_move().unwrap().col, 1);
        assert_eq!(tree.move_statistics().len(), 2);
    }

    #[test]
    fn test_opponent_selects_by_own_rate() {
        let mut tree = MctsTree::new(mock_board(), Player::One);
        let child = tree.expand(NodeId::ROOT).unwrap();
        let good_for_ai = tree.expand(child).unwrap();
        let bad_for_ai = tree.expand(child).unwrap();
        let neutral = tree.expand(child).unwrap();

        for _ in 0..5 {
            tree.backpropagate(good_for_ai, 1.0);
            tree.backpropagate(bad_for_ai, 0.0);
            tree.backpropagate(neutral, 0.5);
        }

        // At the opponent's node the child worst for the AI scores highest
        assert_eq!(tree.select_best_child(child, 0.0), Some(bad_for_ai));
    }
}
