//! Multiple-choice run-loop.
//!
//! `Presenting(i)` --pick--> `Evaluating(i)` --advance timer--> `Presenting(i + 1)`
//! or `Finished` after the last question. Picks arriving while the advance
//! timer is pending are ignored, so a double click cannot skip a question.

use std::num::NonZeroU32;
use std::time::Duration;

use rand::seq::SliceRandom;

use crate::clock::Timers;
use crate::error::QuizError;
use crate::hooks::{Answer, ChoiceHooks, Outcome, Position, ScoreSnapshot};
use crate::model::Question;
use crate::sound::SoundKind;
use crate::statistics::percentage;

use super::{ms, EngineContext, RunLoop};

/// Hints and skips granted per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerUps {
    pub hints: u32,
    pub skips: u32,
}

impl Default for PowerUps {
    fn default() -> Self {
        Self { hints: 3, skips: 2 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoicePhase {
    Presenting(usize),
    /// Answer judged, waiting for the advance timer.
    Evaluating(usize),
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChoiceTask {
    Advance,
}

/// What the page needs to draw the current question.
#[derive(Debug, Clone, Copy)]
pub struct ChoiceView<'a> {
    /// 0-based question index.
    pub index: usize,
    pub total: usize,
    pub question: &'a Question,
    /// Wrong choices removed by hints.
    pub eliminated: &'a [String],
}

pub struct ChoiceQuiz<H: ChoiceHooks> {
    questions: Vec<Question>,
    total: NonZeroU32,
    hooks: H,
    ctx: EngineContext,
    phase: ChoicePhase,
    score: u32,
    started: Duration,
    timers: Timers<ChoiceTask>,
    power_ups: PowerUps,
    granted: PowerUps,
    eliminated: Vec<String>,
    outcome: Option<Outcome>,
}

impl<H: ChoiceHooks> ChoiceQuiz<H> {
    /// Validate `questions` and present the first one.
    pub fn new(questions: Vec<Question>, hooks: H, ctx: EngineContext) -> Result<Self, QuizError> {
        Self::with_power_ups(questions, hooks, ctx, PowerUps::default())
    }

    pub fn with_power_ups(
        questions: Vec<Question>,
        hooks: H,
        ctx: EngineContext,
        power_ups: PowerUps,
    ) -> Result<Self, QuizError> {
        let total = u32::try_from(questions.len())
            .ok()
            .and_then(NonZeroU32::new)
            .ok_or(QuizError::NoQuestions)?;
        if let Some((index, q)) = questions.iter().enumerate().find(|(_, q)| !q.is_answerable()) {
            return Err(QuizError::CorrectAnswerMissing {
                index,
                correct: q.correct.clone(),
            });
        }

        let mut quiz = Self {
            questions,
            total,
            hooks,
            ctx,
            phase: ChoicePhase::Presenting(0),
            score: 0,
            started: Duration::ZERO,
            timers: Timers::new(),
            power_ups,
            granted: power_ups,
            eliminated: Vec::new(),
            outcome: None,
        };
        quiz.start();
        Ok(quiz)
    }

    fn start(&mut self) {
        self.phase = ChoicePhase::Presenting(0);
        self.score = 0;
        self.started = self.ctx.now();
        self.timers.clear();
        self.power_ups = self.granted;
        self.eliminated.clear();
        self.outcome = None;
        tracing::debug!(questions = self.questions.len(), "choice quiz started");
        self.render();
    }

    fn render(&mut self) {
        if let ChoicePhase::Presenting(index) = self.phase {
            let view = ChoiceView {
                index,
                total: self.questions.len(),
                question: &self.questions[index],
                eliminated: &self.eliminated,
            };
            self.hooks.present(&view);
        }
    }

    /// Judge `choice` against the current question.
    pub fn pick(&mut self, choice: &str) -> Answer {
        let ChoicePhase::Presenting(index) = self.phase else {
            tracing::debug!(phase = ?self.phase, "pick ignored");
            return Answer::Ignored;
        };
        if self.eliminated.iter().any(|c| c == choice) {
            tracing::debug!(choice, "pick of an eliminated choice ignored");
            return Answer::Ignored;
        }

        let correct = choice == self.questions[index].correct;
        let delay = if correct {
            self.score += 1;
            self.ctx.sound.play(SoundKind::Correct);
            self.ctx.timings.choice_correct_advance
        } else {
            self.ctx.sound.play(SoundKind::Incorrect);
            self.ctx.timings.choice_incorrect_advance
        };
        self.hooks.on_answer(correct);

        self.phase = ChoicePhase::Evaluating(index);
        let now = self.ctx.now();
        self.timers.schedule(now, ms(delay), ChoiceTask::Advance);
        Answer::from_bool(correct)
    }

    /// Remove one wrong choice from the current question.
    ///
    /// Returns the eliminated choice, or `None` when no hint is left, no
    /// wrong choice remains, or the quiz is not presenting.
    pub fn use_hint(&mut self) -> Option<String> {
        let ChoicePhase::Presenting(index) = self.phase else {
            return None;
        };
        if self.power_ups.hints == 0 {
            return None;
        }

        let question = &self.questions[index];
        let candidates: Vec<&String> = question
            .choices
            .iter()
            .filter(|c| **c != question.correct && !self.eliminated.contains(c))
            .collect();
        let removed = (*candidates.choose(&mut self.ctx.rng)?).clone();

        self.power_ups.hints -= 1;
        self.eliminated.push(removed.clone());
        self.ctx.sound.play(SoundKind::Click);
        self.render();
        Some(removed)
    }

    /// Move past the current question without scoring it.
    pub fn skip(&mut self) -> bool {
        let ChoicePhase::Presenting(index) = self.phase else {
            return false;
        };
        if self.power_ups.skips == 0 {
            return false;
        }
        self.power_ups.skips -= 1;
        self.ctx.sound.play(SoundKind::Click);
        self.phase = ChoicePhase::Evaluating(index);
        self.advance();
        true
    }

    fn advance(&mut self) {
        let ChoicePhase::Evaluating(index) = self.phase else {
            return;
        };
        let next = index + 1;
        if next < self.questions.len() {
            self.phase = ChoicePhase::Presenting(next);
            self.eliminated.clear();
            self.render();
        } else {
            self.finish();
        }
    }

    fn finish(&mut self) {
        let elapsed = self.ctx.now().saturating_sub(self.started);
        let outcome = Outcome::new(self.score, self.total, elapsed);
        self.phase = ChoicePhase::Finished;
        self.outcome = Some(outcome);
        self.ctx.sound.play(SoundKind::Complete);
        tracing::info!(
            score = outcome.score,
            total = outcome.total.get(),
            percentage = outcome.percentage,
            "choice quiz finished"
        );
        self.hooks.on_finish(&outcome);
    }

    pub fn phase(&self) -> ChoicePhase {
        self.phase
    }

    /// The question being shown or judged; `None` once finished.
    pub fn current_question(&self) -> Option<&Question> {
        match self.phase {
            ChoicePhase::Presenting(i) | ChoicePhase::Evaluating(i) => self.questions.get(i),
            ChoicePhase::Finished => None,
        }
    }

    pub fn power_ups(&self) -> PowerUps {
        self.power_ups
    }

    pub fn eliminated(&self) -> &[String] {
        &self.eliminated
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

impl<H: ChoiceHooks> RunLoop for ChoiceQuiz<H> {
    fn tick(&mut self) -> usize {
        let mut fired = 0;
        while let Some(task) = self.timers.pop_due(self.ctx.now()) {
            match task {
                ChoiceTask::Advance => self.advance(),
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
        self.phase == ChoicePhase::Finished
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
            ChoicePhase::Presenting(i) | ChoicePhase::Evaluating(i) => i as u32 + 1,
            ChoicePhase::Finished => self.total.get(),
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
        headers: Vec<(usize, usize)>,
        prompts: Vec<String>,
        eliminated_seen: Vec<usize>,
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

    impl ChoiceHooks for Page {
        fn present(&mut self, view: &ChoiceView<'_>) {
            self.eliminated_seen.push(view.eliminated.len());
            self.set_header(view.index + 1, view.total);
            self.render_prompt(view.question);
        }

        fn set_header(&mut self, current: usize, total: usize) {
            self.headers.push((current, total));
        }

        fn render_prompt(&mut self, question: &Question) {
            self.prompts.push(question.prompt.clone());
        }
    }

    fn questions() -> Vec<Question> {
        vec![
            Question::new("Q1", &["a", "b"], "a"),
            Question::new("Q2", &["c", "d"], "d"),
        ]
    }

    #[test]
    fn all_correct_scores_full_marks() {
        let fx = Fixture::new();
        let mut quiz = ChoiceQuiz::new(questions(), Page::default(), fx.context(1)).unwrap();

        assert_eq!(quiz.pick("a"), Answer::Correct);
        fx.clock.advance_ms(600);
        quiz.tick();
        assert_eq!(quiz.pick("d"), Answer::Correct);
        fx.clock.advance_ms(600);
        quiz.tick();

        assert!(quiz.is_finished());
        let outcome = quiz.outcome().copied().unwrap();
        assert_eq!(outcome.score, 2);
        assert_eq!(outcome.total.get(), 2);
        assert_eq!(outcome.percentage, 100);

        let page = quiz.into_hooks();
        assert_eq!(page.headers, vec![(1, 2), (2, 2)]);
        assert_eq!(page.prompts, vec!["Q1", "Q2"]);
        assert_eq!(page.recorded.answers, vec![true, true]);
        assert_eq!(page.recorded.finished.len(), 1);
    }

    #[test]
    fn all_wrong_scores_zero() {
        let fx = Fixture::new();
        let mut quiz = ChoiceQuiz::new(questions(), Page::default(), fx.context(1)).unwrap();

        assert_eq!(quiz.pick("b"), Answer::Incorrect);
        quiz.tick();
        assert_eq!(quiz.pick("c"), Answer::Incorrect);
        quiz.tick();

        let outcome = quiz.outcome().copied().unwrap();
        assert_eq!(outcome.score, 0);
        assert_eq!(outcome.percentage, 0);
    }

    #[test]
    fn correct_answer_waits_before_advancing() {
        let fx = Fixture::new();
        let mut quiz = ChoiceQuiz::new(questions(), Page::default(), fx.context(1)).unwrap();

        quiz.pick("a");
        assert_eq!(quiz.phase(), ChoicePhase::Evaluating(0));
        assert_eq!(quiz.tick(), 0);
        assert_eq!(quiz.time_until_next(), Some(Duration::from_millis(600)));

        fx.clock.advance_ms(599);
        assert_eq!(quiz.tick(), 0);
        fx.clock.advance_ms(1);
        assert_eq!(quiz.tick(), 1);
        assert_eq!(quiz.phase(), ChoicePhase::Presenting(1));
    }

    #[test]
    fn wrong_answer_advances_without_delay() {
        let fx = Fixture::new();
        let mut quiz = ChoiceQuiz::new(questions(), Page::default(), fx.context(1)).unwrap();

        quiz.pick("b");
        assert_eq!(quiz.time_until_next(), Some(Duration::ZERO));
        assert_eq!(quiz.tick(), 1);
        assert_eq!(quiz.phase(), ChoicePhase::Presenting(1));
    }

    #[test]
    fn rapid_second_pick_is_ignored() {
        let fx = Fixture::new();
        let mut quiz = ChoiceQuiz::new(questions(), Page::default(), fx.context(1)).unwrap();

        assert_eq!(quiz.pick("a"), Answer::Correct);
        assert_eq!(quiz.pick("a"), Answer::Ignored);
        assert_eq!(quiz.pick("d"), Answer::Ignored);
        fx.clock.advance_ms(600);
        quiz.tick();

        assert_eq!(quiz.phase(), ChoicePhase::Presenting(1));
        assert_eq!(quiz.score().score, 1);
    }

    #[test]
    fn picks_after_finish_are_ignored() {
        let fx = Fixture::new();
        let mut quiz = ChoiceQuiz::new(questions(), Page::default(), fx.context(1)).unwrap();
        quiz.pick("b");
        quiz.tick();
        quiz.pick("c");
        quiz.tick();
        assert_eq!(quiz.pick("d"), Answer::Ignored);
        assert_eq!(quiz.hooks().recorded.finished.len(), 1);
    }

    #[test]
    fn elapsed_time_comes_from_clock() {
        let fx = Fixture::new();
        fx.clock.advance_ms(5_000);
        let mut quiz = ChoiceQuiz::new(questions(), Page::default(), fx.context(1)).unwrap();
        fx.clock.advance_ms(12_000);
        quiz.pick("a");
        fx.clock.advance_ms(600);
        quiz.tick();
        quiz.pick("c");
        quiz.tick();

        let outcome = quiz.outcome().unwrap();
        assert_eq!(outcome.time_taken.total_ms, 12_600);
        assert_eq!(outcome.time_taken.seconds, 12);
    }

    #[test]
    fn sounds_follow_answers() {
        let fx = Fixture::new();
        let mut quiz = ChoiceQuiz::new(questions(), Page::default(), fx.context(1)).unwrap();
        quiz.pick("a");
        fx.clock.advance_ms(600);
        quiz.tick();
        quiz.pick("c");
        quiz.tick();
        assert_eq!(
            fx.sound.kinds(),
            vec![SoundKind::Correct, SoundKind::Incorrect, SoundKind::Complete]
        );
    }

    #[test]
    fn restart_resets_score_and_drops_pending_advance() {
        let fx = Fixture::new();
        let mut quiz = ChoiceQuiz::new(questions(), Page::default(), fx.context(1)).unwrap();
        quiz.pick("a");
        quiz.restart();

        assert_eq!(quiz.phase(), ChoicePhase::Presenting(0));
        assert_eq!(quiz.score().score, 0);
        assert_eq!(quiz.time_until_next(), None);
        fx.clock.advance_ms(1_000);
        assert_eq!(quiz.tick(), 0);
        assert_eq!(quiz.phase(), ChoicePhase::Presenting(0));
    }

    #[test]
    fn progress_and_score_queries() {
        let fx = Fixture::new();
        let mut quiz = ChoiceQuiz::new(questions(), Page::default(), fx.context(1)).unwrap();
        let p = quiz.progress();
        assert_eq!((p.current, p.total, p.percentage), (1, 2, 50));

        quiz.pick("a");
        fx.clock.advance_ms(600);
        quiz.tick();
        let p = quiz.progress();
        assert_eq!((p.current, p.percentage), (2, 100));
        let s = quiz.score();
        assert_eq!((s.score, s.total, s.percentage), (1, 2, 50));
    }

    #[test]
    fn empty_quiz_is_rejected() {
        let fx = Fixture::new();
        let err = ChoiceQuiz::new(vec![], Page::default(), fx.context(1))
            .err()
            .unwrap();
        assert_eq!(err, QuizError::NoQuestions);
    }

    #[test]
    fn unanswerable_question_is_rejected() {
        let fx = Fixture::new();
        let qs = vec![
            Question::new("ok", &["a", "b"], "a"),
            Question::new("broken", &["a", "b"], "z"),
        ];
        let err = ChoiceQuiz::new(qs, Page::default(), fx.context(1))
            .err()
            .unwrap();
        assert_eq!(
            err,
            QuizError::CorrectAnswerMissing {
                index: 1,
                correct: "z".into()
            }
        );
    }

    #[test]
    fn hints_remove_only_wrong_choices() {
        let fx = Fixture::new();
        let qs = vec![Question::new("Q", &["a", "b", "c", "d"], "c")];
        let mut quiz = ChoiceQuiz::new(qs, Page::default(), fx.context(9)).unwrap();

        let mut removed = Vec::new();
        for _ in 0..3 {
            removed.push(quiz.use_hint().unwrap());
        }
        removed.sort();
        assert_eq!(removed, vec!["a", "b", "d"]);
        assert_eq!(quiz.power_ups().hints, 0);
        assert_eq!(quiz.use_hint(), None);
        assert_eq!(quiz.hooks().eliminated_seen, vec![0, 1, 2, 3]);
    }

    #[test]
    fn eliminated_choice_cannot_be_picked() {
        let fx = Fixture::new();
        let qs = vec![Question::new("Q", &["a", "b"], "a")];
        let mut quiz = ChoiceQuiz::new(qs, Page::default(), fx.context(3)).unwrap();

        assert_eq!(quiz.use_hint().as_deref(), Some("b"));
        assert_eq!(quiz.pick("b"), Answer::Ignored);
        assert_eq!(quiz.phase(), ChoicePhase::Presenting(0));
        assert!(quiz.hooks().recorded.answers.is_empty());

        assert_eq!(quiz.pick("a"), Answer::Correct);
    }

    #[test]
    fn hint_not_spent_when_nothing_to_remove() {
        let fx = Fixture::new();
        let qs = vec![Question::new("Q", &["only"], "only")];
        let mut quiz = ChoiceQuiz::new(qs, Page::default(), fx.context(1)).unwrap();
        assert_eq!(quiz.use_hint(), None);
        assert_eq!(quiz.power_ups().hints, 3);
    }

    #[test]
    fn skip_advances_without_scoring() {
        let fx = Fixture::new();
        let mut quiz = ChoiceQuiz::new(questions(), Page::default(), fx.context(1)).unwrap();
        assert!(quiz.skip());
        assert_eq!(quiz.phase(), ChoicePhase::Presenting(1));
        assert!(quiz.skip());
        assert!(quiz.is_finished());
        assert_eq!(quiz.outcome().unwrap().score, 0);
        assert!(!quiz.skip());

        quiz.restart();
        assert_eq!(quiz.power_ups(), PowerUps::default());
    }
}
