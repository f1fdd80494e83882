//! Drag-and-drop word building.
//!
//! Every question starts with its tiles shuffled into the bank and an empty
//! drop zone. Tiles move between the two zones through [`BuildQuiz::move_item`]
//! and [`BuildQuiz::reorder_item`] (or the gesture helpers built on them); the
//! bank and the drop zone together always hold each tile of the question
//! exactly once. [`BuildQuiz::check_answer`] compares the drop zone, read left
//! to right, with the target word.
//!
//! Pointer-driven front ends go through [`BuildQuiz::begin_drag`] and
//! [`BuildQuiz::drop_dragged`], using [`insertion_index`] to turn the pointer
//! position into a slot among the rendered tiles.

use std::fmt;
use std::num::NonZeroU32;
use std::time::Duration;

use rand::seq::SliceRandom;

use crate::clock::Timers;
use crate::error::{DragError, QuizError};
use crate::hooks::{Answer, BuildHooks, Outcome, Position, ScoreSnapshot};
use crate::model::BuildQuestion;
use crate::sound::SoundKind;
use crate::statistics::percentage;

use super::{ms, EngineContext, RunLoop};

/// Index of a tile in the current question's `tiles`.
///
/// Ids stay unique when two tiles carry the same text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    Bank,
    Drop,
}

impl Zone {
    fn name(self) -> &'static str {
        match self {
            Zone::Bank => "bank",
            Zone::Drop => "drop zone",
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Vertical extent of a rendered tile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileBox {
    pub top: f32,
    pub height: f32,
}

impl TileBox {
    pub fn midpoint(&self) -> f32 {
        self.top + self.height / 2.0
    }
}

/// Where a dragged tile lands among `boxes` (the other tiles of the zone, in
/// order) for a pointer at `pointer_y`: before the first tile whose midpoint
/// is below the pointer, else at the end.
pub fn insertion_index(boxes: &[TileBox], pointer_y: f32) -> usize {
    boxes
        .iter()
        .position(|b| pointer_y < b.midpoint())
        .unwrap_or(boxes.len())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildPhase {
    Presenting(usize),
    /// The word was built; waiting to advance.
    Correct(usize),
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BuildTask {
    Advance,
}

#[derive(Debug, Clone, Copy)]
struct Gesture {
    tile: TileId,
    from: Zone,
}

/// What the page needs to draw the current word.
#[derive(Debug, Clone, Copy)]
pub struct BuildView<'a> {
    pub index: usize,
    pub total: usize,
    pub question: &'a BuildQuestion,
    pub bank: &'a [TileId],
    pub drop: &'a [TileId],
    /// Whether tile moves and checks are accepted.
    pub accepting: bool,
}

impl<'a> BuildView<'a> {
    /// Text of a tile.
    pub fn tile(&self, id: TileId) -> &'a str {
        self.question.tiles.get(id.0).map(String::as_str).unwrap_or("")
    }

    /// Drop zone contents read left to right.
    pub fn assembled(&self) -> String {
        self.drop.iter().map(|&id| self.tile(id)).collect()
    }
}

pub struct BuildQuiz<H: BuildHooks> {
    questions: Vec<BuildQuestion>,
    total: NonZeroU32,
    hooks: H,
    ctx: EngineContext,
    phase: BuildPhase,
    score: u32,
    mistakes: u32,
    started: Duration,
    timers: Timers<BuildTask>,
    bank: Vec<TileId>,
    drop: Vec<TileId>,
    gesture: Option<Gesture>,
    outcome: Option<Outcome>,
}

impl<H: BuildHooks> BuildQuiz<H> {
    /// Validate `questions` and deal the first word's tiles into the bank.
    pub fn new(
        questions: Vec<BuildQuestion>,
        hooks: H,
        ctx: EngineContext,
    ) -> Result<Self, QuizError> {
        let total = u32::try_from(questions.len())
            .ok()
            .and_then(NonZeroU32::new)
            .ok_or(QuizError::NoQuestions)?;
        for (index, q) in questions.iter().enumerate() {
            if q.tiles.is_empty() {
                return Err(QuizError::NoTiles {
                    index,
                    word: q.word.clone(),
                });
            }
            if !q.tiles_spell_word() {
                return Err(QuizError::TilesDoNotSpellWord {
                    index,
                    word: q.word.clone(),
                    tiles: q.tiles.clone(),
                });
            }
        }

        let mut quiz = Self {
            questions,
            total,
            hooks,
            ctx,
            phase: BuildPhase::Presenting(0),
            score: 0,
            mistakes: 0,
            started: Duration::ZERO,
            timers: Timers::new(),
            bank: Vec::new(),
            drop: Vec::new(),
            gesture: None,
            outcome: None,
        };
        quiz.start();
        Ok(quiz)
    }

    fn start(&mut self) {
        self.score = 0;
        self.mistakes = 0;
        self.started = self.ctx.now();
        self.timers.clear();
        self.outcome = None;
        tracing::debug!(words = self.questions.len(), "build quiz started");
        self.enter(0);
    }

    fn enter(&mut self, index: usize) {
        self.phase = BuildPhase::Presenting(index);
        self.gesture = None;
        self.drop.clear();
        self.bank = (0..self.questions[index].tiles.len()).map(TileId).collect();
        self.bank.shuffle(&mut self.ctx.rng);
        self.render();
    }

    fn render(&mut self) {
        let (index, accepting) = match self.phase {
            BuildPhase::Presenting(i) => (i, true),
            BuildPhase::Correct(i) => (i, false),
            BuildPhase::Finished => return,
        };
        let view = BuildView {
            index,
            total: self.questions.len(),
            question: &self.questions[index],
            bank: &self.bank,
            drop: &self.drop,
            accepting,
        };
        self.hooks.present(&view);
    }

    fn accepting(&self) -> Result<usize, DragError> {
        match self.phase {
            BuildPhase::Presenting(i) => Ok(i),
            _ => Err(DragError::NotAccepting),
        }
    }

    fn zone_mut(&mut self, zone: Zone) -> &mut Vec<TileId> {
        match zone {
            Zone::Bank => &mut self.bank,
            Zone::Drop => &mut self.drop,
        }
    }

    pub fn zone(&self, zone: Zone) -> &[TileId] {
        match zone {
            Zone::Bank => &self.bank,
            Zone::Drop => &self.drop,
        }
    }

    fn check_tile(&self, index: usize, tile: TileId) -> Result<(), DragError> {
        if tile.0 >= self.questions[index].tiles.len() {
            return Err(DragError::UnknownTile(tile.0));
        }
        match self.gesture {
            Some(g) if g.tile == tile => Err(DragError::GestureInProgress(tile.0)),
            _ => Ok(()),
        }
    }

    fn take(&mut self, tile: TileId, from: Zone) -> Result<(), DragError> {
        let zone = self.zone_mut(from);
        let pos = zone
            .iter()
            .position(|&t| t == tile)
            .ok_or(DragError::NotInZone {
                tile: tile.0,
                zone: from.name(),
            })?;
        zone.remove(pos);
        Ok(())
    }

    fn put(&mut self, tile: TileId, to: Zone, at: usize) {
        let zone = self.zone_mut(to);
        let at = at.min(zone.len());
        zone.insert(at, tile);
    }

    /// Move `tile` from one zone to position `at` of another. `at` past the
    /// end appends.
    pub fn move_item(
        &mut self,
        tile: TileId,
        from: Zone,
        to: Zone,
        at: usize,
    ) -> Result<(), DragError> {
        let index = self.accepting()?;
        self.check_tile(index, tile)?;
        self.take(tile, from)?;
        self.put(tile, to, at);
        tracing::debug!(tile = tile.0, %from, %to, at, "tile moved");
        self.ctx.sound.play(SoundKind::Click);
        self.render();
        Ok(())
    }

    /// Move `tile` to position `at` within its own zone, counted without the
    /// tile itself.
    pub fn reorder_item(&mut self, tile: TileId, zone: Zone, at: usize) -> Result<(), DragError> {
        let index = self.accepting()?;
        self.check_tile(index, tile)?;
        self.take(tile, zone)?;
        self.put(tile, zone, at);
        tracing::debug!(tile = tile.0, %zone, at, "tile reordered");
        self.render();
        Ok(())
    }

    /// Pick `tile` up from wherever it lies. One tile per gesture.
    pub fn begin_drag(&mut self, tile: TileId) -> Result<(), DragError> {
        let index = self.accepting()?;
        if let Some(g) = self.gesture {
            return Err(DragError::GestureInProgress(g.tile.0));
        }
        self.check_tile(index, tile)?;
        let from = if self.bank.contains(&tile) {
            Zone::Bank
        } else {
            Zone::Drop
        };
        self.gesture = Some(Gesture { tile, from });
        Ok(())
    }

    /// Release the dragged tile into `to` at `at`, ending the gesture.
    pub fn drop_dragged(&mut self, to: Zone, at: usize) -> Result<(), DragError> {
        let gesture = self.gesture.take().ok_or(DragError::NoGesture)?;
        if gesture.from == to {
            self.reorder_item(gesture.tile, to, at)
        } else {
            self.move_item(gesture.tile, gesture.from, to, at)
        }
    }

    /// Abandon the gesture, leaving the tile where it was.
    pub fn cancel_drag(&mut self) -> bool {
        self.gesture.take().is_some()
    }

    pub fn dragging(&self) -> Option<TileId> {
        self.gesture.map(|g| g.tile)
    }

    /// Compare the drop zone with the target word.
    ///
    /// A wrong word shakes the page and leaves every tile where it is.
    pub fn check_answer(&mut self) -> Answer {
        let Ok(index) = self.accepting() else {
            return Answer::Ignored;
        };
        let question = &self.questions[index];
        let assembled: String = self
            .drop
            .iter()
            .map(|t| question.tiles[t.0].as_str())
            .collect();
        let correct = assembled == question.word;

        if correct {
            self.score += 1;
            self.gesture = None;
            self.phase = BuildPhase::Correct(index);
            self.ctx.sound.play(SoundKind::Correct);
            self.hooks.on_answer(true);
            let now = self.ctx.now();
            let delay = ms(self.ctx.timings.build_correct_advance);
            self.timers.schedule(now, delay, BuildTask::Advance);
            self.render();
        } else {
            tracing::debug!(%assembled, "wrong word");
            self.mistakes += 1;
            self.ctx.sound.play(SoundKind::Incorrect);
            self.hooks.on_answer(false);
            self.hooks.shake();
        }
        Answer::from_bool(correct)
    }

    fn advance(&mut self) {
        let BuildPhase::Correct(index) = self.phase else {
            return;
        };
        if index + 1 < self.questions.len() {
            self.enter(index + 1);
        } else {
            self.finish();
        }
    }

    fn finish(&mut self) {
        let elapsed = self.ctx.now().saturating_sub(self.started);
        let outcome = Outcome::new(self.score, self.total, elapsed);
        self.phase = BuildPhase::Finished;
        self.gesture = None;
        self.outcome = Some(outcome);
        self.ctx.sound.play(SoundKind::Complete);
        tracing::info!(
            score = outcome.score,
            total = outcome.total.get(),
            mistakes = self.mistakes,
            "build quiz finished"
        );
        self.hooks.on_finish(&outcome);
    }

    pub fn phase(&self) -> BuildPhase {
        self.phase
    }

    /// Wrong checks so far in this run.
    pub fn mistakes(&self) -> u32 {
        self.mistakes
    }

    pub fn current_question(&self) -> Option<&BuildQuestion> {
        match self.phase {
            BuildPhase::Presenting(i) | BuildPhase::Correct(i) => self.questions.get(i),
            BuildPhase::Finished => None,
        }
    }

    /// Text of `tile` in the current question.
    pub fn tile_text(&self, tile: TileId) -> Option<&str> {
        self.current_question()?.tiles.get(tile.0).map(String::as_str)
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

impl<H: BuildHooks> RunLoop for BuildQuiz<H> {
    fn tick(&mut self) -> usize {
        let mut fired = 0;
        while let Some(task) = self.timers.pop_due(self.ctx.now()) {
            match task {
                BuildTask::Advance => self.advance(),
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
        self.phase == BuildPhase::Finished
    }

    fn score(&self) -> ScoreSnapshot {
        ScoreSnapshot {
            score: self.score,
            total: self.total.get(),
            percentage: percentage(self.score, self.total),
        }
    }

    fn progress(&self) -> Position {
        let current = match self.phase {
            BuildPhase::Presenting(i) | BuildPhase::Correct(i) => i as u32 + 1,
            BuildPhase::Finished => self.total.get(),
        };
        Position {
            current,
            total: self.total.get(),
            percentage: percentage(current, self.total),
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
    struct Page {
        assembled: Vec<String>,
        bank_sizes: Vec<usize>,
        shakes: usize,
        recorded: Recorded,
    }

    impl QuizHooks for Page {
        fn on_answer(&mut self, correct: bool) {
            self.recorded.answers.push(correct);
        }

        fn on_finish(&mut self, outcome: &Outcome) {
            self.recorded.finished.push(*outcome);
        }
    }

    impl BuildHooks for Page {
        fn present(&mut self, view: &BuildView<'_>) {
            self.assembled.push(view.assembled());
            self.bank_sizes.push(view.bank.len());
        }

        fn shake(&mut self) {
            self.shakes += 1;
        }
    }

    fn bet() -> Vec<BuildQuestion> {
        vec![BuildQuestion::new("ቤት", &["ቤ", "ት"])]
    }

    fn quiz(questions: Vec<BuildQuestion>) -> (Fixture, BuildQuiz<Page>) {
        let fx = Fixture::new();
        let quiz = BuildQuiz::new(questions, Page::default(), fx.context(3)).unwrap();
        (fx, quiz)
    }

    /// Drag tiles into the drop zone in the given order.
    fn assemble(quiz: &mut BuildQuiz<Page>, order: &[usize]) {
        for (at, &t) in order.iter().enumerate() {
            quiz.move_item(TileId(t), Zone::Bank, Zone::Drop, at).unwrap();
        }
    }

    fn sorted(ids: &[TileId]) -> Vec<TileId> {
        let mut ids = ids.to_vec();
        ids.sort();
        ids
    }

    #[test]
    fn bank_starts_with_exactly_the_tiles() {
        let (_fx, quiz) = quiz(bet());
        assert_eq!(sorted(quiz.zone(Zone::Bank)), vec![TileId(0), TileId(1)]);
        assert!(quiz.zone(Zone::Drop).is_empty());
    }

    #[test]
    fn correct_order_succeeds() {
        let (fx, mut quiz) = quiz(bet());
        assemble(&mut quiz, &[0, 1]);
        assert_eq!(quiz.check_answer(), Answer::Correct);
        assert_eq!(quiz.phase(), BuildPhase::Correct(0));

        fx.clock.advance_ms(1000);
        quiz.tick();
        assert!(quiz.is_finished());
        let outcome = quiz.outcome().unwrap();
        assert_eq!((outcome.score, outcome.percentage), (1, 100));
    }

    #[test]
    fn wrong_order_fails_and_tiles_stay_movable() {
        let (_fx, mut quiz) = quiz(bet());
        assemble(&mut quiz, &[1, 0]);
        assert_eq!(quiz.check_answer(), Answer::Incorrect);
        assert_eq!(quiz.phase(), BuildPhase::Presenting(0));
        assert_eq!(quiz.zone(Zone::Drop), &[TileId(1), TileId(0)]);
        assert_eq!(quiz.hooks().shakes, 1);
        assert_eq!(quiz.mistakes(), 1);

        quiz.reorder_item(TileId(0), Zone::Drop, 0).unwrap();
        assert_eq!(quiz.check_answer(), Answer::Correct);
        assert_eq!(quiz.hooks().recorded.answers, vec![false, true]);
    }

    #[test]
    fn tiles_can_return_to_the_bank() {
        let (_fx, mut quiz) = quiz(bet());
        assemble(&mut quiz, &[1, 0]);
        quiz.move_item(TileId(1), Zone::Drop, Zone::Bank, 0).unwrap();
        assert_eq!(quiz.zone(Zone::Bank), &[TileId(1)]);
        assert_eq!(quiz.zone(Zone::Drop), &[TileId(0)]);
    }

    #[test]
    fn tiles_are_never_lost_or_duplicated() {
        let (_fx, mut quiz) = quiz(vec![BuildQuestion::new("ሰላም", &["ሰ", "ላ", "ም"])]);
        assemble(&mut quiz, &[2, 0]);
        quiz.reorder_item(TileId(2), Zone::Drop, 9).unwrap();
        quiz.move_item(TileId(0), Zone::Drop, Zone::Bank, 1).unwrap();
        let err = quiz.move_item(TileId(0), Zone::Drop, Zone::Bank, 0);
        assert_eq!(
            err,
            Err(DragError::NotInZone {
                tile: 0,
                zone: "drop zone"
            })
        );

        let mut all: Vec<TileId> = quiz.zone(Zone::Bank).to_vec();
        all.extend_from_slice(quiz.zone(Zone::Drop));
        assert_eq!(sorted(&all), vec![TileId(0), TileId(1), TileId(2)]);
    }

    #[test]
    fn unknown_tile_is_rejected() {
        let (_fx, mut quiz) = quiz(bet());
        assert_eq!(
            quiz.move_item(TileId(7), Zone::Bank, Zone::Drop, 0),
            Err(DragError::UnknownTile(7))
        );
    }

    #[test]
    fn duplicate_tile_text_keeps_distinct_ids() {
        let (_fx, mut quiz) = quiz(vec![BuildQuestion::new("ማማ", &["ማ", "ማ"])]);
        assemble(&mut quiz, &[1, 0]);
        assert_eq!(quiz.check_answer(), Answer::Correct);
    }

    #[test]
    fn drag_gesture_owns_one_tile() {
        let (_fx, mut quiz) = quiz(bet());
        quiz.begin_drag(TileId(1)).unwrap();
        assert_eq!(
            quiz.begin_drag(TileId(0)),
            Err(DragError::GestureInProgress(1))
        );
        assert_eq!(
            quiz.move_item(TileId(1), Zone::Bank, Zone::Drop, 0),
            Err(DragError::GestureInProgress(1))
        );
        quiz.drop_dragged(Zone::Drop, 0).unwrap();
        assert_eq!(quiz.zone(Zone::Drop), &[TileId(1)]);
        assert_eq!(quiz.dragging(), None);
        assert_eq!(quiz.drop_dragged(Zone::Drop, 0), Err(DragError::NoGesture));
    }

    #[test]
    fn drag_within_zone_reorders() {
        let (_fx, mut quiz) = quiz(bet());
        assemble(&mut quiz, &[1, 0]);
        quiz.begin_drag(TileId(0)).unwrap();
        quiz.drop_dragged(Zone::Drop, 0).unwrap();
        assert_eq!(quiz.zone(Zone::Drop), &[TileId(0), TileId(1)]);
    }

    #[test]
    fn cancelled_drag_leaves_tile_in_place() {
        let (_fx, mut quiz) = quiz(bet());
        let before = quiz.zone(Zone::Bank).to_vec();
        quiz.begin_drag(TileId(0)).unwrap();
        assert!(quiz.cancel_drag());
        assert!(!quiz.cancel_drag());
        assert_eq!(quiz.zone(Zone::Bank), before.as_slice());
    }

    #[test]
    fn input_refused_while_advancing() {
        let (_fx, mut quiz) = quiz(vec![
            BuildQuestion::new("ቤት", &["ቤ", "ት"]),
            BuildQuestion::new("ማይ", &["ማ", "ይ"]),
        ]);
        assemble(&mut quiz, &[0, 1]);
        quiz.check_answer();
        assert_eq!(quiz.check_answer(), Answer::Ignored);
        assert_eq!(
            quiz.move_item(TileId(0), Zone::Drop, Zone::Bank, 0),
            Err(DragError::NotAccepting)
        );
        assert_eq!(quiz.score().score, 1);
    }

    #[test]
    fn next_word_is_dealt_after_delay() {
        let (fx, mut quiz) = quiz(vec![
            BuildQuestion::new("ቤት", &["ቤ", "ት"]),
            BuildQuestion::new("ሰላም", &["ሰ", "ላ", "ም"]),
        ]);
        assemble(&mut quiz, &[0, 1]);
        quiz.check_answer();
        fx.clock.advance_ms(999);
        assert_eq!(quiz.tick(), 0);
        fx.clock.advance_ms(1);
        assert_eq!(quiz.tick(), 1);

        assert_eq!(quiz.phase(), BuildPhase::Presenting(1));
        assert_eq!(quiz.zone(Zone::Bank).len(), 3);
        assert!(quiz.zone(Zone::Drop).is_empty());
        assert_eq!(quiz.progress().current, 2);
        assert_eq!(quiz.hooks().bank_sizes.last(), Some(&3));
    }

    #[test]
    fn restart_redeals_first_word() {
        let (_fx, mut quiz) = quiz(bet());
        assemble(&mut quiz, &[0, 1]);
        quiz.check_answer();
        quiz.restart();
        assert_eq!(quiz.phase(), BuildPhase::Presenting(0));
        assert_eq!(quiz.score().score, 0);
        assert_eq!(quiz.zone(Zone::Bank).len(), 2);
        assert_eq!(quiz.time_until_next(), None);
    }

    #[test]
    fn invalid_words_fail_construction() {
        let fx = Fixture::new();
        let err = BuildQuiz::new(
            vec![BuildQuestion::new("ቤት", &["ት"])],
            Page::default(),
            fx.context(1),
        )
        .err()
        .unwrap();
        assert!(matches!(err, QuizError::TilesDoNotSpellWord { index: 0, .. }));

        let err = BuildQuiz::new(vec![BuildQuestion::new("ቤት", &[])], Page::default(), fx.context(1))
            .err()
            .unwrap();
        assert!(matches!(err, QuizError::NoTiles { index: 0, .. }));

        let err = BuildQuiz::new(vec![], Page::default(), fx.context(1))
            .err()
            .unwrap();
        assert_eq!(err, QuizError::NoQuestions);
    }

    #[test]
    fn insertion_index_uses_midpoints() {
        let boxes = [
            TileBox { top: 0.0, height: 10.0 },
            TileBox { top: 10.0, height: 10.0 },
            TileBox { top: 20.0, height: 10.0 },
        ];
        assert_eq!(insertion_index(&boxes, 2.0), 0);
        assert_eq!(insertion_index(&boxes, 6.0), 1);
        assert_eq!(insertion_index(&boxes, 14.0), 1);
        assert_eq!(insertion_index(&boxes, 26.0), 3);
        assert_eq!(insertion_index(&[], 5.0), 0);
    }
}
