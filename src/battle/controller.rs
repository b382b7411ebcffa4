//! Battle/tutorial controller
//!
//! Owns all game state and every transition. Intents arrive through the
//! event channel (or direct calls), notices go back out through it, and
//! sounds are requested from the audio service. Guards that reject an
//! action are silent no-ops: nothing is published and nothing changes.

use bevy::log::{debug, info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::time::Duration;

use super::choices::{generate_choices, shuffled};
use super::schedule::{Continuation, TurnScheduler};
use super::script::{self, INTRO_MESSAGES, REWARD_MESSAGES, TUTORIAL_COMBAT_SEQUENCE, TutorialAction};
use super::state::{Combatant, GameMode, GameState, TutorialPhase, TutorialState};
use crate::audio::AudioService;
use crate::events::{EventChannel, Intent, Notice};
use crate::spellbook::{STARTER_SPELLS, Spellbook};
use crate::tuning::BattleTuning;

pub struct BattleController<C: EventChannel, A: AudioService> {
    game: GameState,
    tutorial: TutorialState,
    mode: GameMode,
    tuning: BattleTuning,
    spellbook: Spellbook,
    rng: StdRng,
    scheduler: TurnScheduler,
    channel: C,
    audio: A,
    /// Cleared on shutdown; every handler checks it first
    active: bool,
}

impl<C: EventChannel, A: AudioService> BattleController<C, A> {
    /// Controller with an entropy-seeded RNG
    pub fn new(channel: C, audio: A) -> Self {
        Self::with_rng(channel, audio, StdRng::from_entropy())
    }

    /// Controller with a deterministic RNG
    pub fn with_seed(channel: C, audio: A, seed: u64) -> Self {
        Self::with_rng(channel, audio, StdRng::seed_from_u64(seed))
    }

    fn with_rng(channel: C, audio: A, rng: StdRng) -> Self {
        Self {
            game: GameState::default(),
            tutorial: TutorialState::default(),
            mode: GameMode::Tutorial,
            tuning: BattleTuning::default(),
            spellbook: Spellbook::standard(),
            rng,
            scheduler: TurnScheduler::new(),
            channel,
            audio,
            active: true,
        }
    }

    pub fn with_tuning(mut self, tuning: BattleTuning) -> Self {
        self.game.player_health = tuning.starting_health;
        self.game.enemy_health = tuning.starting_health;
        self.tuning = tuning;
        self
    }

    /// Swap tuning mid-session. Current health is left alone.
    pub fn set_tuning(&mut self, tuning: BattleTuning) {
        self.tuning = tuning;
    }

    pub fn with_spellbook(mut self, spellbook: Spellbook) -> Self {
        self.spellbook = spellbook;
        self
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    pub fn game(&self) -> &GameState {
        &self.game
    }

    pub fn tutorial(&self) -> &TutorialState {
        &self.tutorial
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn tuning(&self) -> &BattleTuning {
        &self.tuning
    }

    pub fn spellbook(&self) -> &Spellbook {
        &self.spellbook
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    pub fn channel_mut(&mut self) -> &mut C {
        &mut self.channel
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    pub fn audio_mut(&mut self) -> &mut A {
        &mut self.audio
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Virtual time of the turn clock
    pub fn now_ms(&self) -> u64 {
        self.scheduler.now_ms()
    }

    pub fn pending_continuations(&self) -> usize {
        self.scheduler.pending_count()
    }

    // =========================================================================
    // SESSION LIFECYCLE
    // =========================================================================

    /// Announce the opening tutorial screen
    pub fn begin(&mut self) {
        if !self.active {
            return;
        }
        self.mode = GameMode::Tutorial;
        self.tutorial = TutorialState::default();
        self.channel.publish(Notice::SetGameState(GameMode::Tutorial));
        self.channel
            .publish(Notice::SetTutorialPhase(TutorialPhase::Intro));
        self.channel.publish(Notice::SetTutorialMessageIndex(0));
    }

    /// Tear the session down: drop pending continuations and ignore
    /// everything that arrives afterwards.
    pub fn shutdown(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        let cancelled = self.scheduler.close();
        info!("Session shut down ({} pending continuations cancelled)", cancelled);
    }

    /// Handle every intent queued on the channel, oldest first
    pub fn pump(&mut self) -> usize {
        let intents = self.channel.take_intents();
        let count = intents.len();
        for intent in intents {
            self.dispatch(intent);
        }
        count
    }

    pub fn dispatch(&mut self, intent: Intent) {
        if !self.active {
            debug!("Session closed, ignoring {}", intent.topic());
            return;
        }
        info!("Received {}: {:?}", intent.topic(), intent);

        match intent {
            Intent::PlayerAction(choice) => self.handle_player_action(&choice),
            Intent::StartBattle => self.start_battle(),
            Intent::HandleTutorialAction(action) => self.handle_tutorial_action(action),
            Intent::AdvanceTutorial => self.advance_tutorial(),
            Intent::PlayNextTutorialAttack => self.play_next_tutorial_attack(),
            Intent::PlaySound { note1, note2 } => match note2 {
                Some(note2) => self.audio.play_two_note_sequence(&note1, &note2),
                None => self.audio.play_note(&note1),
            },
            Intent::PlayGreatHarmonyTheme => self.audio.play_background_theme(),
        }
    }

    /// Advance the turn clock and run continuations that came due
    pub fn update(&mut self, delta: Duration) {
        for continuation in self.scheduler.advance(delta) {
            self.run_continuation(continuation);
        }
    }

    fn run_continuation(&mut self, continuation: Continuation) {
        if !self.active {
            return;
        }
        match continuation {
            Continuation::ResumeBattle => {
                self.game.turn_in_progress = false;
                if self.game.is_battling {
                    self.enemy_attack();
                }
            }
            Continuation::NextTutorialAttack => self.play_next_tutorial_attack(),
        }
    }

    // =========================================================================
    // BATTLE
    // =========================================================================

    /// Reset both combatants and pose the first question
    pub fn start_battle(&mut self) {
        if !self.active {
            return;
        }
        if let Err(e) = self.audio.ensure_started() {
            warn!("Audio failed to start, continuing silently: {}", e);
        }

        // A restart must not inherit the previous battle's turn
        self.scheduler.cancel_kind(Continuation::ResumeBattle);
        self.game.turn_in_progress = false;
        self.game.current_answer = None;

        self.mode = GameMode::Battle;
        self.game.is_battling = true;
        self.game.player_health = self.tuning.starting_health;
        self.game.enemy_health = self.tuning.starting_health;
        self.publish_health(Combatant::Player);
        self.publish_health(Combatant::Enemy);
        self.channel
            .publish(Notice::Message(script::BATTLE_BEGINS.to_string()));

        self.game.choices = shuffled(&STARTER_SPELLS, &mut self.rng);

        self.enemy_attack();
    }

    /// Pose a new question: pick a random spell, build choices, play it
    pub fn enemy_attack(&mut self) {
        if !self.active {
            return;
        }
        if self.game.turn_in_progress {
            debug!("Turn already in progress, ignoring enemy attack");
            return;
        }

        let names = self.spellbook.names();
        let Some(answer) = names.choose(&mut self.rng).cloned() else {
            warn!("Spellbook is empty, the enemy has nothing to cast");
            return;
        };

        self.game.turn_in_progress = true;
        self.channel
            .publish(Notice::Message(script::ENEMY_ATTACK.to_string()));

        self.game.choices = generate_choices(&answer, &names, &mut self.rng);
        self.channel
            .publish(Notice::SetChoices(self.game.choices.clone()));

        let notes = self
            .spellbook
            .get(&answer)
            .map(|spell| spell.notes.clone());
        debug!("Enemy casts {}", answer);
        self.game.current_answer = Some(answer);

        if let Some([first, second]) = notes {
            self.audio.play_two_note_sequence(&first, &second);
        }
    }

    /// Resolve the player's answer to the pending question
    pub fn handle_player_action(&mut self, choice: &str) {
        if !self.active || !self.game.is_battling || !self.game.turn_in_progress {
            return;
        }
        // Taking the answer closes the question until the next turn
        let Some(answer) = self.game.current_answer.take() else {
            return;
        };

        if choice == answer {
            let damage = self.tuning.correct_damage;
            self.game.damage(Combatant::Enemy, damage);
            self.publish_health(Combatant::Enemy);
            self.channel
                .publish(Notice::Message(script::correct_spell(choice, damage)));
        } else {
            let damage = self.tuning.wrong_damage;
            self.game.damage(Combatant::Player, damage);
            self.publish_health(Combatant::Player);
            self.channel
                .publish(Notice::Message(script::wrong_answer(Some(&answer), damage)));
        }

        if self.game.is_defeated(Combatant::Enemy) {
            self.channel
                .publish(Notice::Message(script::BATTLE_VICTORY.to_string()));
            self.game.is_battling = false;
            info!("Battle won");
        } else if self.game.is_defeated(Combatant::Player) {
            self.channel
                .publish(Notice::Message(script::DEFEAT.to_string()));
            self.game.is_battling = false;
            info!("Battle lost");
        } else {
            self.scheduler
                .schedule(self.tuning.turn_delay_ms, Continuation::ResumeBattle);
        }
    }

    // =========================================================================
    // TUTORIAL
    // =========================================================================

    /// Step through the intro or reward script
    pub fn advance_tutorial(&mut self) {
        if !self.active {
            return;
        }
        if self.mode == GameMode::Battle {
            debug!("Tutorial already handed off to battle");
            return;
        }

        match self.tutorial.phase {
            TutorialPhase::Intro => {
                self.tutorial.message_index += 1;
                self.publish_message_index();
                if self.tutorial.message_index >= INTRO_MESSAGES.len() {
                    self.set_phase(TutorialPhase::LearningPitch);
                    self.tutorial.message_index = 0;
                    self.publish_message_index();
                } else if self.tutorial.message_index == 1 {
                    self.audio.play_background_theme();
                }
            }
            TutorialPhase::Reward => {
                self.tutorial.message_index += 1;
                self.publish_message_index();
                if self.tutorial.message_index >= REWARD_MESSAGES.len() {
                    self.mode = GameMode::Battle;
                    self.channel.publish(Notice::SetGameState(GameMode::Battle));
                    self.start_battle();
                }
            }
            phase => debug!("advance_tutorial has nothing to do in {}", phase),
        }
    }

    /// Resolve a higher/lower/equal answer in the tutorial drill
    pub fn handle_tutorial_action(&mut self, action: TutorialAction) {
        if !self.active {
            return;
        }
        let Some(attack) = TUTORIAL_COMBAT_SEQUENCE
            .get(self.tutorial.combat_index)
            .copied()
        else {
            return;
        };
        // The drill's outcome has already been announced
        if self.game.is_defeated(Combatant::Enemy) || self.game.is_defeated(Combatant::Player) {
            return;
        }
        let expected = match attack.expected_relation() {
            Ok(relation) => relation,
            Err(e) => {
                warn!("Tutorial attack has an unplayable note: {}", e);
                return;
            }
        };

        if action.relation() == expected {
            let damage = self.tuning.correct_damage;
            self.game.damage(Combatant::Enemy, damage);
            self.publish_health(Combatant::Enemy);
            self.channel
                .publish(Notice::Message(script::correct_action(action, damage)));
        } else {
            let damage = self.tuning.wrong_damage;
            self.game.damage(Combatant::Player, damage);
            self.publish_health(Combatant::Player);
            // Reads the battle answer, not the tutorial attack
            let narration = script::wrong_answer(self.game.current_answer.as_deref(), damage);
            self.channel.publish(Notice::Message(narration));
        }

        self.tutorial.combat_index += 1;
        self.channel
            .publish(Notice::SetTutorialCombatIndex(self.tutorial.combat_index));

        if self.game.is_defeated(Combatant::Enemy) {
            self.channel
                .publish(Notice::Message(script::TUTORIAL_VICTORY.to_string()));
            self.set_phase(TutorialPhase::Reward);
        } else if self.game.is_defeated(Combatant::Player) {
            self.channel
                .publish(Notice::Message(script::DEFEAT.to_string()));
        } else if self.tutorial.combat_index >= TUTORIAL_COMBAT_SEQUENCE.len() {
            self.set_phase(TutorialPhase::Reward);
        } else {
            self.scheduler
                .schedule(self.tuning.turn_delay_ms, Continuation::NextTutorialAttack);
        }
    }

    /// Play the current drill attack and announce its relation
    pub fn play_next_tutorial_attack(&mut self) {
        if !self.active {
            return;
        }
        if let Some(attack) = TUTORIAL_COMBAT_SEQUENCE.get(self.tutorial.combat_index) {
            self.audio
                .play_two_note_sequence(attack.notes[0], attack.notes[1]);
            self.channel
                .publish(Notice::Message(script::tutorial_attack(attack.relation)));
        }
    }

    // =========================================================================
    // HELPERS
    // =========================================================================

    fn publish_health(&mut self, combatant: Combatant) {
        let health = self.game.health(combatant);
        self.channel
            .publish(Notice::UpdateHealth { combatant, health });
    }

    fn publish_message_index(&mut self) {
        self.channel
            .publish(Notice::SetTutorialMessageIndex(self.tutorial.message_index));
    }

    fn set_phase(&mut self, phase: TutorialPhase) {
        debug!("Tutorial phase {} -> {}", self.tutorial.phase, phase);
        self.tutorial.phase = phase;
        self.channel.publish(Notice::SetTutorialPhase(phase));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{Playback, RecordingAudio};
    use crate::events::EventBus;

    type TestController = BattleController<EventBus, RecordingAudio>;

    fn controller() -> TestController {
        BattleController::with_seed(EventBus::new(), RecordingAudio::new(), 42)
    }

    fn drain(ctrl: &mut TestController) -> Vec<Notice> {
        ctrl.channel_mut()
            .drain()
            .into_iter()
            .map(|e| e.notice)
            .collect()
    }

    fn messages(notices: &[Notice]) -> Vec<String> {
        notices
            .iter()
            .filter_map(|n| match n {
                Notice::Message(text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    fn answer(ctrl: &TestController) -> String {
        ctrl.game().current_answer.clone().expect("question pending")
    }

    fn wrong(ctrl: &TestController) -> String {
        let correct = answer(ctrl);
        ctrl.spellbook()
            .names()
            .into_iter()
            .find(|n| *n != correct)
            .unwrap()
    }

    fn turn_delay() -> Duration {
        Duration::from_millis(2000)
    }

    // --- session -------------------------------------------------------------

    #[test]
    fn test_begin_announces_tutorial() {
        let mut ctrl = controller();
        ctrl.begin();
        assert_eq!(
            drain(&mut ctrl),
            vec![
                Notice::SetGameState(GameMode::Tutorial),
                Notice::SetTutorialPhase(TutorialPhase::Intro),
                Notice::SetTutorialMessageIndex(0),
            ]
        );
    }

    #[test]
    fn test_pump_dispatches_in_order() {
        let mut ctrl = controller();
        ctrl.channel_mut().post(Intent::AdvanceTutorial);
        ctrl.channel_mut().post(Intent::AdvanceTutorial);
        assert_eq!(ctrl.pump(), 2);
        assert_eq!(ctrl.tutorial().message_index, 2);
        assert_eq!(
            drain(&mut ctrl),
            vec![
                Notice::SetTutorialMessageIndex(1),
                Notice::SetTutorialMessageIndex(2),
            ]
        );
    }

    #[test]
    fn test_play_sound_intents() {
        let mut ctrl = controller();
        ctrl.dispatch(Intent::PlaySound {
            note1: "A4".to_string(),
            note2: None,
        });
        ctrl.dispatch(Intent::PlaySound {
            note1: "C4".to_string(),
            note2: Some("G4".to_string()),
        });
        ctrl.dispatch(Intent::PlayGreatHarmonyTheme);
        assert_eq!(
            ctrl.audio().played,
            vec![
                Playback::Note("A4".to_string()),
                Playback::Sequence("C4".to_string(), "G4".to_string()),
                Playback::Theme,
            ]
        );
        assert!(drain(&mut ctrl).is_empty());
    }

    #[test]
    fn test_shutdown_cancels_and_ignores() {
        let mut ctrl = controller();
        ctrl.start_battle();
        let correct = answer(&ctrl);
        ctrl.handle_player_action(&correct);
        assert_eq!(ctrl.pending_continuations(), 1);
        drain(&mut ctrl);

        ctrl.shutdown();
        assert!(!ctrl.is_active());
        assert_eq!(ctrl.pending_continuations(), 0);

        ctrl.update(Duration::from_secs(10));
        ctrl.dispatch(Intent::StartBattle);
        ctrl.advance_tutorial();
        assert!(drain(&mut ctrl).is_empty());
    }

    // --- battle --------------------------------------------------------------

    #[test]
    fn test_start_battle_poses_first_question() {
        let mut ctrl = controller();
        ctrl.start_battle();

        let notices = drain(&mut ctrl);
        assert_eq!(
            notices[..4],
            [
                Notice::UpdateHealth {
                    combatant: Combatant::Player,
                    health: 100
                },
                Notice::UpdateHealth {
                    combatant: Combatant::Enemy,
                    health: 100
                },
                Notice::Message("The battle begins!".to_string()),
                Notice::Message("The Imp shrieks a dissonant sound...".to_string()),
            ]
        );
        let Notice::SetChoices(choices) = &notices[4] else {
            panic!("expected choices, got {:?}", notices[4]);
        };
        let correct = answer(&ctrl);
        assert_eq!(choices.len(), 3);
        assert!(choices.contains(&correct));
        assert_eq!(&ctrl.game().choices, choices);

        let spell = ctrl.spellbook().get(&correct).unwrap().clone();
        assert_eq!(
            ctrl.audio().last(),
            Some(&Playback::Sequence(spell.notes[0].clone(), spell.notes[1].clone()))
        );
        assert_eq!(ctrl.audio().start_calls, 1);
        assert!(ctrl.game().is_battling);
        assert!(ctrl.game().turn_in_progress);
        assert_eq!(ctrl.mode(), GameMode::Battle);
    }

    #[test]
    fn test_enemy_attack_is_guarded() {
        let mut ctrl = controller();
        ctrl.start_battle();
        drain(&mut ctrl);
        let before = answer(&ctrl);
        let played = ctrl.audio().played.len();

        ctrl.enemy_attack();

        assert!(drain(&mut ctrl).is_empty());
        assert_eq!(ctrl.audio().played.len(), played);
        assert_eq!(answer(&ctrl), before);
    }

    #[test]
    fn test_empty_spellbook_poses_no_question() {
        let mut ctrl = controller().with_spellbook(Spellbook::from_spells(vec![]));
        ctrl.start_battle();

        assert!(ctrl.game().is_battling);
        assert!(!ctrl.game().turn_in_progress);
        assert_eq!(ctrl.game().current_answer, None);
        let notices = drain(&mut ctrl);
        assert!(!notices.iter().any(|n| matches!(n, Notice::SetChoices(_))));
        assert_eq!(messages(&notices), vec![script::BATTLE_BEGINS.to_string()]);
        assert!(ctrl.audio().played.is_empty());
        assert_eq!(ctrl.pending_continuations(), 0);
    }

    #[test]
    fn test_player_action_ignored_without_question() {
        let mut ctrl = controller();
        ctrl.handle_player_action("Tritone");
        assert!(drain(&mut ctrl).is_empty());
        assert_eq!(ctrl.game().player_health, 100);
        assert_eq!(ctrl.game().enemy_health, 100);

        // Battling, but the turn flag is down
        ctrl.start_battle();
        drain(&mut ctrl);
        let mut stalled = ctrl.game().clone();
        stalled.turn_in_progress = false;
        ctrl.game = stalled;
        ctrl.handle_player_action("Tritone");
        assert!(drain(&mut ctrl).is_empty());
        assert_eq!(ctrl.game().player_health, 100);
    }

    #[test]
    fn test_correct_answer_damages_enemy() {
        let mut ctrl = controller();
        ctrl.start_battle();
        drain(&mut ctrl);
        let correct = answer(&ctrl);

        ctrl.handle_player_action(&correct);

        assert_eq!(ctrl.game().enemy_health, 66);
        assert_eq!(ctrl.game().player_health, 100);
        assert_eq!(
            drain(&mut ctrl),
            vec![
                Notice::UpdateHealth {
                    combatant: Combatant::Enemy,
                    health: 66
                },
                Notice::Message(format!(
                    "Correct! You cast \"{}\" and deal 34 damage!",
                    correct
                )),
            ]
        );
        assert_eq!(ctrl.pending_continuations(), 1);
    }

    #[test]
    fn test_wrong_answer_damages_player() {
        let mut ctrl = controller();
        ctrl.start_battle();
        drain(&mut ctrl);
        let correct = answer(&ctrl);
        let guess = wrong(&ctrl);

        ctrl.handle_player_action(&guess);

        assert_eq!(ctrl.game().player_health, 75);
        assert_eq!(ctrl.game().enemy_health, 100);
        assert_eq!(
            messages(&drain(&mut ctrl)),
            vec![format!("Wrong! It was a {}. You take 25 damage!", correct)]
        );
    }

    #[test]
    fn test_answer_only_counts_once_per_turn() {
        let mut ctrl = controller();
        ctrl.start_battle();
        let correct = answer(&ctrl);
        ctrl.handle_player_action(&correct);
        drain(&mut ctrl);

        ctrl.handle_player_action(&correct);
        assert!(drain(&mut ctrl).is_empty());
        assert_eq!(ctrl.game().enemy_health, 66);
    }

    #[test]
    fn test_next_turn_after_delay() {
        let mut ctrl = controller();
        ctrl.start_battle();
        let correct = answer(&ctrl);
        ctrl.handle_player_action(&correct);
        drain(&mut ctrl);

        ctrl.update(Duration::from_millis(1999));
        assert!(drain(&mut ctrl).is_empty());
        assert!(ctrl.game().turn_in_progress);

        ctrl.update(Duration::from_millis(1));
        let notices = drain(&mut ctrl);
        assert_eq!(
            messages(&notices),
            vec!["The Imp shrieks a dissonant sound...".to_string()]
        );
        assert!(ctrl.game().turn_in_progress);
        assert!(ctrl.game().current_answer.is_some());
    }

    #[test]
    fn test_victory_after_three_hits_ends_loop() {
        let mut ctrl = controller();
        ctrl.start_battle();

        let mut hits = 0;
        while ctrl.game().is_battling {
            let correct = answer(&ctrl);
            ctrl.handle_player_action(&correct);
            hits += 1;
            ctrl.update(turn_delay());
            assert!(hits <= 3, "enemy should fall in three hits");
        }

        assert_eq!(hits, 3);
        assert_eq!(ctrl.game().enemy_health, -2);
        assert_eq!(ctrl.pending_continuations(), 0);
        let notices = drain(&mut ctrl);
        assert_eq!(
            notices.last(),
            Some(&Notice::Message(
                "You have defeated the Shrieking Imp! Victory!".to_string()
            ))
        );

        // Nothing else happens, however long we wait
        ctrl.update(Duration::from_secs(30));
        assert!(drain(&mut ctrl).is_empty());
    }

    #[test]
    fn test_defeat_after_four_misses() {
        let mut ctrl = controller();
        ctrl.start_battle();

        for _ in 0..4 {
            let guess = wrong(&ctrl);
            ctrl.handle_player_action(&guess);
            ctrl.update(turn_delay());
        }

        assert_eq!(ctrl.game().player_health, 0);
        assert!(!ctrl.game().is_battling);
        let notices = drain(&mut ctrl);
        assert_eq!(
            messages(&notices).last().map(String::as_str),
            Some("You have been defeated... The world remains in dissonance.")
        );
        assert_eq!(ctrl.pending_continuations(), 0);
    }

    #[test]
    fn test_restart_after_victory_poses_new_question() {
        let mut ctrl = controller();
        ctrl.start_battle();
        while ctrl.game().is_battling {
            let correct = answer(&ctrl);
            ctrl.handle_player_action(&correct);
            ctrl.update(turn_delay());
        }
        drain(&mut ctrl);

        ctrl.start_battle();
        assert!(ctrl.game().is_battling);
        assert!(ctrl.game().current_answer.is_some());
        assert_eq!(ctrl.game().enemy_health, 100);
    }

    #[test]
    fn test_audio_failure_does_not_block_battle() {
        let mut ctrl = BattleController::with_seed(EventBus::new(), RecordingAudio::failing(), 7);
        ctrl.start_battle();
        assert!(ctrl.game().is_battling);
        assert!(ctrl.game().current_answer.is_some());
    }

    #[test]
    fn test_custom_tuning() {
        let tuning = BattleTuning {
            starting_health: 50,
            correct_damage: 50,
            wrong_damage: 10,
            turn_delay_ms: 500,
        };
        let mut ctrl = controller().with_tuning(tuning);
        ctrl.start_battle();
        let correct = answer(&ctrl);
        ctrl.handle_player_action(&correct);
        assert_eq!(ctrl.game().enemy_health, 0);
        assert!(!ctrl.game().is_battling);
    }

    // --- tutorial ------------------------------------------------------------

    #[test]
    fn test_intro_plays_theme_on_first_advance() {
        let mut ctrl = controller();
        ctrl.advance_tutorial();
        assert_eq!(ctrl.audio().played, vec![Playback::Theme]);
        ctrl.advance_tutorial();
        assert_eq!(ctrl.audio().played.len(), 1);
    }

    #[test]
    fn test_intro_end_moves_to_learning_pitch() {
        let mut ctrl = controller();
        for _ in 0..6 {
            ctrl.advance_tutorial();
        }
        assert_eq!(ctrl.tutorial().message_index, 6);
        drain(&mut ctrl);

        ctrl.advance_tutorial();

        assert_eq!(ctrl.tutorial().phase, TutorialPhase::LearningPitch);
        assert_eq!(ctrl.tutorial().message_index, 0);
        assert_eq!(
            drain(&mut ctrl),
            vec![
                Notice::SetTutorialMessageIndex(7),
                Notice::SetTutorialPhase(TutorialPhase::LearningPitch),
                Notice::SetTutorialMessageIndex(0),
            ]
        );

        // Nothing drives learningPitch from here
        ctrl.advance_tutorial();
        assert!(drain(&mut ctrl).is_empty());
        assert_eq!(ctrl.tutorial().phase, TutorialPhase::LearningPitch);
    }

    #[test]
    fn test_drill_all_correct_wins_early() {
        let mut ctrl = controller();
        ctrl.handle_tutorial_action(TutorialAction::Bend);
        ctrl.update(turn_delay());
        ctrl.handle_tutorial_action(TutorialAction::Jump);
        ctrl.update(turn_delay());
        drain(&mut ctrl);
        ctrl.handle_tutorial_action(TutorialAction::Brace);

        assert_eq!(ctrl.game().enemy_health, -2);
        assert_eq!(ctrl.tutorial().combat_index, 3);
        assert_eq!(ctrl.tutorial().phase, TutorialPhase::Reward);
        assert_eq!(
            drain(&mut ctrl),
            vec![
                Notice::UpdateHealth {
                    combatant: Combatant::Enemy,
                    health: -2
                },
                Notice::Message("Correct! You chose Brace and deal 34 damage!".to_string()),
                Notice::SetTutorialCombatIndex(3),
                Notice::Message("You have defeated the Dissonant Beast! Victory!".to_string()),
                Notice::SetTutorialPhase(TutorialPhase::Reward),
            ]
        );

        // The fourth attack is never played and further answers do nothing
        ctrl.update(Duration::from_secs(5));
        ctrl.handle_tutorial_action(TutorialAction::Bend);
        assert!(drain(&mut ctrl).is_empty());
    }

    #[test]
    fn test_drill_schedules_next_attack() {
        let mut ctrl = controller();
        ctrl.handle_tutorial_action(TutorialAction::Bend);
        drain(&mut ctrl);

        ctrl.update(turn_delay());

        assert_eq!(
            ctrl.audio().last(),
            Some(&Playback::Sequence("G4".to_string(), "D4".to_string()))
        );
        assert_eq!(
            drain(&mut ctrl),
            vec![Notice::Message(
                "The Dissonant Beast plays a lower interval.".to_string()
            )]
        );
    }

    #[test]
    fn test_drill_wrong_answer_without_battle_answer() {
        let mut ctrl = controller();
        ctrl.handle_tutorial_action(TutorialAction::Jump);
        assert_eq!(ctrl.game().player_health, 75);
        assert_eq!(
            messages(&drain(&mut ctrl)),
            vec!["Wrong! You take 25 damage!".to_string()]
        );
    }

    #[test]
    fn test_drill_defeat_stalls() {
        let mut ctrl = controller();
        for _ in 0..4 {
            ctrl.handle_tutorial_action(TutorialAction::Brace);
            ctrl.update(turn_delay());
        }
        // Brace is right for the third attack only
        assert_eq!(ctrl.game().player_health, 25);
        drain(&mut ctrl);

        let mut ctrl = controller();
        let wrong_actions = [
            TutorialAction::Jump,
            TutorialAction::Bend,
            TutorialAction::Bend,
            TutorialAction::Jump,
        ];
        for action in wrong_actions {
            ctrl.handle_tutorial_action(action);
        }
        assert_eq!(ctrl.game().player_health, 0);
        assert_eq!(ctrl.tutorial().phase, TutorialPhase::Intro);
        let notices = drain(&mut ctrl);
        assert_eq!(
            messages(&notices).last().map(String::as_str),
            Some("You have been defeated... The world remains in dissonance.")
        );
        assert_eq!(
            notices.iter().filter(|n| matches!(n, Notice::SetTutorialPhase(_))).count(),
            0
        );
    }

    #[test]
    fn test_drill_completes_into_reward_and_then_ignores_actions() {
        let mut ctrl = controller();
        // wrong, right, right, wrong: nobody falls
        for action in [
            TutorialAction::Jump,
            TutorialAction::Jump,
            TutorialAction::Brace,
            TutorialAction::Brace,
        ] {
            ctrl.handle_tutorial_action(action);
        }
        assert_eq!(ctrl.game().enemy_health, 32);
        assert_eq!(ctrl.game().player_health, 50);
        assert_eq!(ctrl.tutorial().combat_index, 4);
        assert_eq!(ctrl.tutorial().phase, TutorialPhase::Reward);
        drain(&mut ctrl);

        ctrl.handle_tutorial_action(TutorialAction::Bend);
        assert!(drain(&mut ctrl).is_empty());
        assert_eq!(ctrl.game().player_health, 50);
        assert_eq!(ctrl.tutorial().combat_index, 4);
    }

    #[test]
    fn test_reward_hands_off_to_battle() {
        let mut ctrl = controller();
        for action in [
            TutorialAction::Bend,
            TutorialAction::Jump,
            TutorialAction::Brace,
        ] {
            ctrl.handle_tutorial_action(action);
        }
        assert_eq!(ctrl.tutorial().phase, TutorialPhase::Reward);
        drain(&mut ctrl);

        for _ in 0..3 {
            ctrl.advance_tutorial();
        }
        assert_eq!(ctrl.mode(), GameMode::Tutorial);
        drain(&mut ctrl);

        ctrl.advance_tutorial();
        let notices = drain(&mut ctrl);
        assert_eq!(notices[0], Notice::SetTutorialMessageIndex(4));
        assert_eq!(notices[1], Notice::SetGameState(GameMode::Battle));
        assert_eq!(ctrl.mode(), GameMode::Battle);
        assert!(ctrl.game().is_battling);
        assert_eq!(ctrl.game().enemy_health, 100);

        // Further advances no longer restart the battle
        let question = answer(&ctrl);
        ctrl.advance_tutorial();
        assert!(drain(&mut ctrl).is_empty());
        assert_eq!(answer(&ctrl), question);
    }

    #[test]
    fn test_play_next_tutorial_attack_out_of_range() {
        let mut ctrl = controller();
        ctrl.play_next_tutorial_attack();
        assert_eq!(
            ctrl.audio().played,
            vec![Playback::Sequence("C4".to_string(), "E4".to_string())]
        );
        drain(&mut ctrl);

        ctrl.tutorial.combat_index = TUTORIAL_COMBAT_SEQUENCE.len();
        ctrl.play_next_tutorial_attack();
        assert!(drain(&mut ctrl).is_empty());
        assert_eq!(ctrl.audio().played.len(), 1);
    }
}
