//! Memory matching: find each word's picture.
//!
//! The selection buffer holds at most two face-up, unresolved tiles. A
//! second flip schedules the match check; a match clears the buffer after a
//! short pause, a mismatch turns both tiles back after a longer one.

use std::num::NonZeroU32;
use std::time::Duration;

use rand::seq::SliceRandom;

use crate::clock::Timers;
use crate::error::QuizError;
use crate::hooks::{MemoryHooks, Outcome, Position, ScoreSnapshot};
use crate::model::{Card, CardKind, Pair};
use crate::sound::SoundKind;
use crate::statistics::percentage;

use super::{ms, EngineContext, RunLoop};

/// One card on the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryTile {
    pub card: Card,
    pub flipped: bool,
    pub matched: bool,
}

/// Result of a flip request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flip {
    /// Tile matched, already face up, two tiles awaiting resolution, or
    /// the game is over.
    Ignored,
    First,
    /// The second tile; the match check is scheduled.
    Second,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryPhase {
    Idle,
    OneFlipped,
    Resolving,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MemoryTask {
    Resolve,
    ClearSelection,
    FlipBack,
    Finish,
}

/// What the page needs to draw the board.
#[derive(Debug, Clone, Copy)]
pub struct MemoryView<'a> {
    pub tiles: &'a [MemoryTile],
    pub matches: u32,
    pub pairs: u32,
}

pub struct MemoryGame<H: MemoryHooks> {
    pairs: Vec<Pair>,
    total: NonZeroU32,
    hooks: H,
    ctx: EngineContext,
    tiles: Vec<MemoryTile>,
    first: Option<usize>,
    second: Option<usize>,
    matches: u32,
    attempts: u32,
    started: Duration,
    timers: Timers<MemoryTask>,
    outcome: Option<Outcome>,
}

impl<H: MemoryHooks> MemoryGame<H> {
    /// Deal a shuffled deck of one word card and one picture card per pair.
    pub fn new(pairs: Vec<Pair>, hooks: H, ctx: EngineContext) -> Result<Self, QuizError> {
        let total = u32::try_from(pairs.len())
            .ok()
            .and_then(NonZeroU32::new)
            .ok_or(QuizError::NoPairs)?;

        let mut game = Self {
            pairs,
            total,
            hooks,
            ctx,
            tiles: Vec::new(),
            first: None,
            second: None,
            matches: 0,
            attempts: 0,
            started: Duration::ZERO,
            timers: Timers::new(),
            outcome: None,
        };
        game.start();
        Ok(game)
    }

    fn start(&mut self) {
        self.first = None;
        self.second = None;
        self.matches = 0;
        self.attempts = 0;
        self.started = self.ctx.now();
        self.timers.clear();
        self.outcome = None;

        let mut deck: Vec<Card> = self
            .pairs
            .iter()
            .enumerate()
            .flat_map(|(pair, p)| {
                [
                    Card {
                        kind: CardKind::Word,
                        value: p.word.clone(),
                        pair,
                    },
                    Card {
                        kind: CardKind::Pic,
                        value: p.pic.clone(),
                        pair,
                    },
                ]
            })
            .collect();
        deck.shuffle(&mut self.ctx.rng);
        self.tiles = deck
            .into_iter()
            .map(|card| MemoryTile {
                card,
                flipped: false,
                matched: false,
            })
            .collect();

        tracing::debug!(pairs = self.pairs.len(), "memory game started");
        self.render();
    }

    fn render(&mut self) {
        let view = MemoryView {
            tiles: &self.tiles,
            matches: self.matches,
            pairs: self.total.get(),
        };
        self.hooks.present(&view);
    }

    /// Turn tile `index` face up.
    pub fn flip(&mut self, index: usize) -> Flip {
        if self.outcome.is_some() || (self.first.is_some() && self.second.is_some()) {
            return Flip::Ignored;
        }
        let Some(tile) = self.tiles.get_mut(index) else {
            return Flip::Ignored;
        };
        if tile.matched || tile.flipped {
            return Flip::Ignored;
        }
        tile.flipped = true;
        self.ctx.sound.play(SoundKind::Click);

        let result = if self.first.is_none() {
            self.first = Some(index);
            Flip::First
        } else {
            self.second = Some(index);
            self.attempts += 1;
            let now = self.ctx.now();
            let delay = ms(self.ctx.timings.memory_flip_resolve);
            self.timers.schedule(now, delay, MemoryTask::Resolve);
            Flip::Second
        };
        self.render();
        result
    }

    fn resolve(&mut self) {
        let (Some(a), Some(b)) = (self.first, self.second) else {
            return;
        };
        let now = self.ctx.now();
        let is_match = self.tiles[a].card.matches(&self.tiles[b].card);

        if is_match {
            self.tiles[a].matched = true;
            self.tiles[b].matched = true;
            self.matches += 1;
            self.ctx.sound.play(SoundKind::Correct);
            self.hooks.on_answer(true);
            tracing::debug!(matches = self.matches, "pair matched");

            if self.matches == self.total.get() {
                let delay = ms(self.ctx.timings.memory_finish_celebration);
                self.timers.schedule(now, delay, MemoryTask::Finish);
            } else {
                let delay = ms(self.ctx.timings.memory_match_clear);
                self.timers.schedule(now, delay, MemoryTask::ClearSelection);
            }
        } else {
            self.ctx.sound.play(SoundKind::Incorrect);
            self.hooks.on_answer(false);
            let delay = ms(self.ctx.timings.memory_mismatch_reset);
            self.timers.schedule(now, delay, MemoryTask::FlipBack);
        }
        self.render();
    }

    fn flip_back(&mut self) {
        for index in [self.first, self.second].into_iter().flatten() {
            self.tiles[index].flipped = false;
        }
        self.clear_selection();
        self.render();
    }

    fn clear_selection(&mut self) {
        self.first = None;
        self.second = None;
    }

    fn finish(&mut self) {
        self.clear_selection();
        let elapsed = self.ctx.now().saturating_sub(self.started);
        let outcome = Outcome::new(self.matches, self.total, elapsed);
        self.outcome = Some(outcome);
        self.ctx.sound.play(SoundKind::Complete);
        tracing::info!(
            pairs = outcome.total.get(),
            attempts = self.attempts,
            "memory game finished"
        );
        self.hooks.on_finish(&outcome);
    }

    pub fn phase(&self) -> MemoryPhase {
        if self.outcome.is_some() {
            return MemoryPhase::Finished;
        }
        match (self.first, self.second) {
            (None, _) => MemoryPhase::Idle,
            (Some(_), None) => MemoryPhase::OneFlipped,
            (Some(_), Some(_)) => MemoryPhase::Resolving,
        }
    }

    pub fn tiles(&self) -> &[MemoryTile] {
        &self.tiles
    }

    pub fn matches(&self) -> u32 {
        self.matches
    }

    /// Pairs of tiles turned over so far, matched or not.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    pub fn hooks_mut(&mut self) -> &mut H {
        &mut self.hooks
    }

    pub fn into_hooks(self) -> H {
        self.hooks
    }
}

impl<H: MemoryHooks> RunLoop for MemoryGame<H> {
    fn tick(&mut self) -> usize {
        let mut fired = 0;
        while let Some(task) = self.timers.pop_due(self.ctx.now()) {
            match task {
                MemoryTask::Resolve => self.resolve(),
                MemoryTask::ClearSelection => self.clear_selection(),
                MemoryTask::FlipBack => self.flip_back(),
                MemoryTask::Finish => self.finish(),
            }
            fired += 1;
        }
        fired
    }

    fn time_until_next(&self) -> Option<Duration> {
        self.timers
            .next_due()
            .map(|due| due.saturating_sub(self.ctx.now()))
    }

    fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }

    fn score(&self) -> ScoreSnapshot {
        ScoreSnapshot {
            score: self.matches,
            total: self.total.get(),
            percentage: percentage(self.matches, self.total),
        }
    }

    fn progress(&self) -> Position {
        Position {
            current: self.matches,
            total: self.total.get(),
            percentage: percentage(self.matches, self.total),
        }
    }

    fn restart(&mut self) {
        self.start();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing::{Fixture, Recorded};
    use crate::hooks::QuizHooks;

    #[derive(Default)]
    struct Board {
        renders: usize,
        recorded: Recorded,
    }

    impl QuizHooks for Board {
        fn on_answer(&mut self, correct: bool) {
            self.recorded.answers.push(correct);
        }

        fn on_finish(&mut self, outcome: &Outcome) {
            self.recorded.finished.push(*outcome);
        }
    }

    impl MemoryHooks for Board {
        fn present(&mut self, _view: &MemoryView<'_>) {
            self.renders += 1;
        }
    }

    fn game(pairs: Vec<Pair>) -> (Fixture, MemoryGame<Board>) {
        let fx = Fixture::new();
        let game = MemoryGame::new(pairs, Board::default(), fx.context(11)).unwrap();
        (fx, game)
    }

    fn find(game: &MemoryGame<Board>, pair: usize, kind: CardKind) -> usize {
        game.tiles()
            .iter()
            .position(|t| t.card.pair == pair && t.card.kind == kind)
            .unwrap()
    }

    fn two_pairs() -> Vec<Pair> {
        vec![Pair::new("ቤት", "🏠"), Pair::new("ድሙ", "🐱")]
    }

    #[test]
    fn deck_has_word_and_pic_per_pair() {
        let (_fx, game) = game(two_pairs());
        assert_eq!(game.tiles().len(), 4);
        for pair in 0..2 {
            find(&game, pair, CardKind::Word);
            find(&game, pair, CardKind::Pic);
        }
        assert!(game.tiles().iter().all(|t| !t.flipped && !t.matched));
    }

    #[test]
    fn word_and_pic_of_same_pair_match() {
        let (fx, mut game) = game(vec![Pair::new("ቤት", "🏠")]);
        let word = find(&game, 0, CardKind::Word);
        let pic = find(&game, 0, CardKind::Pic);

        assert_eq!(game.flip(pic), Flip::First);
        assert_eq!(game.flip(word), Flip::Second);
        assert_eq!(game.phase(), MemoryPhase::Resolving);

        fx.clock.advance_ms(300);
        game.tick();
        assert!(game.tiles().iter().all(|t| t.matched));
        assert_eq!(game.matches(), 1);

        fx.clock.advance_ms(1000);
        game.tick();
        assert!(game.is_finished());
        let outcome = game.outcome().unwrap();
        assert_eq!((outcome.score, outcome.total.get()), (1, 1));
        assert_eq!(game.hooks().recorded.answers, vec![true]);
    }

    #[test]
    fn same_tile_twice_is_a_no_op() {
        let (_fx, mut game) = game(vec![Pair::new("ቤት", "🏠")]);
        let word = find(&game, 0, CardKind::Word);
        assert_eq!(game.flip(word), Flip::First);
        assert_eq!(game.flip(word), Flip::Ignored);
        assert_eq!(game.phase(), MemoryPhase::OneFlipped);
        assert_eq!(game.time_until_next(), None);
    }

    #[test]
    fn mismatch_flips_back_after_delay() {
        let (fx, mut game) = game(two_pairs());
        let a = find(&game, 0, CardKind::Word);
        let b = find(&game, 1, CardKind::Pic);
        game.flip(a);
        game.flip(b);

        fx.clock.advance_ms(300);
        game.tick();
        assert!(game.tiles()[a].flipped && game.tiles()[b].flipped);
        assert_eq!(game.phase(), MemoryPhase::Resolving);

        fx.clock.advance_ms(999);
        assert_eq!(game.tick(), 0);
        fx.clock.advance_ms(1);
        assert_eq!(game.tick(), 1);
        assert!(!game.tiles()[a].flipped && !game.tiles()[b].flipped);
        assert_eq!(game.phase(), MemoryPhase::Idle);
        assert_eq!(game.hooks().recorded.answers, vec![false]);
    }

    #[test]
    fn two_words_never_match() {
        let (fx, mut game) = game(two_pairs());
        game.flip(find(&game, 0, CardKind::Word));
        game.flip(find(&game, 1, CardKind::Word));
        fx.clock.advance_ms(300);
        game.tick();
        assert_eq!(game.matches(), 0);
    }

    #[test]
    fn third_flip_is_ignored_while_resolving() {
        let (fx, mut game) = game(two_pairs());
        game.flip(find(&game, 0, CardKind::Word));
        game.flip(find(&game, 1, CardKind::Word));
        let third = find(&game, 0, CardKind::Pic);
        assert_eq!(game.flip(third), Flip::Ignored);

        fx.clock.advance_ms(300);
        game.tick();
        assert_eq!(game.flip(third), Flip::Ignored);
        assert!(!game.tiles()[third].flipped);
    }

    #[test]
    fn matched_tiles_cannot_be_flipped() {
        let (fx, mut game) = game(two_pairs());
        let word = find(&game, 0, CardKind::Word);
        game.flip(word);
        game.flip(find(&game, 0, CardKind::Pic));
        fx.clock.advance_ms(300);
        game.tick();
        fx.clock.advance_ms(500);
        game.tick();
        assert_eq!(game.phase(), MemoryPhase::Idle);
        assert_eq!(game.flip(word), Flip::Ignored);
    }

    #[test]
    fn full_game_reports_attempts_and_sounds() {
        let (fx, mut game) = game(two_pairs());
        game.flip(find(&game, 0, CardKind::Word));
        game.flip(find(&game, 1, CardKind::Pic));
        fx.clock.advance_ms(300);
        game.tick();
        fx.clock.advance_ms(1000);
        game.tick();

        for pair in 0..2 {
            game.flip(find(&game, pair, CardKind::Word));
            game.flip(find(&game, pair, CardKind::Pic));
            fx.clock.advance_ms(300);
            game.tick();
            fx.clock.advance_ms(1000);
            game.tick();
        }

        assert!(game.is_finished());
        assert_eq!(game.attempts(), 3);
        assert_eq!(game.hooks().recorded.finished.len(), 1);
        let sounds = fx.sound.kinds();
        assert_eq!(sounds.last(), Some(&SoundKind::Complete));
        assert_eq!(
            sounds.iter().filter(|k| **k == SoundKind::Correct).count(),
            2
        );
        assert_eq!(game.flip(0), Flip::Ignored);
    }

    #[test]
    fn out_of_range_flip_is_ignored() {
        let (_fx, mut game) = game(two_pairs());
        assert_eq!(game.flip(99), Flip::Ignored);
    }

    #[test]
    fn restart_reshuffles_and_drops_pending() {
        let (_fx, mut game) = game(two_pairs());
        game.flip(0);
        game.flip(1);
        game.restart();
        assert_eq!(game.phase(), MemoryPhase::Idle);
        assert_eq!(game.matches(), 0);
        assert_eq!(game.time_until_next(), None);
        assert!(game.tiles().iter().all(|t| !t.flipped));
    }

    #[test]
    fn progress_counts_matches() {
        let (fx, mut game) = game(two_pairs());
        assert_eq!(game.progress().current, 0);
        game.flip(find(&game, 1, CardKind::Word));
        game.flip(find(&game, 1, CardKind::Pic));
        fx.clock.advance_ms(300);
        game.tick();
        let p = game.progress();
        assert_eq!((p.current, p.total, p.percentage), (1, 2, 50));
    }

    #[test]
    fn empty_pair_list_is_rejected() {
        let fx = Fixture::new();
        let err = MemoryGame::new(vec![], Board::default(), fx.context(1))
            .err()
            .unwrap();
        assert_eq!(err, QuizError::NoPairs);
    }
}
