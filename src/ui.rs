//! DOM HUD collaborator
//!
//! Pure display: looks up the HUD elements once and writes text into them.
//! Every element is optional and every DOM call is allowed to fail silently -
//! a missing node must never interrupt the game loop.

use web_sys::{Document, Element};

use crate::format_mmss;

/// Cached handles to the HUD and overlay elements
pub struct Hud {
    score: Option<Element>,
    time: Option<Element>,
    boost: Option<Element>,
    combo: Option<Element>,
    phase: Option<Element>,
    target: Option<Element>,
    elapsed: Option<Element>,
    phase_time: Option<Element>,
    fps: Option<Element>,

    menu_overlay: Option<Element>,
    replay_overlay: Option<Element>,
    replay_score: Option<Element>,
    replay_phase: Option<Element>,
    replay_duration: Option<Element>,
}

impl Hud {
    pub fn new(document: &Document) -> Self {
        let get = |id: &str| document.get_element_by_id(id);
        Self {
            score: get("hud-score"),
            time: get("hud-time"),
            boost: get("hud-boost"),
            combo: get("hud-combo"),
            phase: get("hud-phase"),
            target: get("hud-target"),
            elapsed: get("hud-elapsed"),
            phase_time: get("hud-phase-time"),
            fps: get("hud-fps"),
            menu_overlay: get("menu-overlay"),
            replay_overlay: get("replay-overlay"),
            replay_score: get("replay-score"),
            replay_phase: get("replay-phase"),
            replay_duration: get("replay-duration"),
        }
    }

    fn set_text(el: &Option<Element>, text: &str) {
        if let Some(el) = el {
            el.set_text_content(Some(text));
        }
    }

    fn set_hidden(el: &Option<Element>, hidden: bool) {
        if let Some(el) = el {
            let _ = el.set_attribute("class", if hidden { "hidden" } else { "" });
        }
    }

    /// Refresh the HUD numbers; called once per frame unconditionally
    #[allow(clippy::too_many_arguments)]
    pub fn update_hud(
        &self,
        score: u32,
        time_remaining: f32,
        boost_remaining: f32,
        combo_count: u32,
        phase: u8,
        phase_target: u32,
        elapsed_time: f32,
        phase_time_remaining: f32,
    ) {
        Self::set_text(&self.score, &score.to_string());
        Self::set_text(&self.time, &format!("{:.1} s", time_remaining.max(0.0)));
        Self::set_text(&self.boost, &format!("{:.1} s", boost_remaining.max(0.0)));

        // Combo only shows once an actual chain is going
        if let Some(el) = &self.combo {
            if combo_count > 1 {
                el.set_text_content(Some(&format!("x{}", combo_count)));
                let _ = el.set_attribute("class", "");
            } else {
                el.set_text_content(Some(""));
                let _ = el.set_attribute("class", "hidden");
            }
        }

        Self::set_text(&self.phase, &phase.to_string());
        Self::set_text(&self.target, &phase_target.to_string());
        Self::set_text(&self.elapsed, &format_mmss(elapsed_time));
        Self::set_text(
            &self.phase_time,
            &format!("{:.1} s", phase_time_remaining.max(0.0)),
        );
    }

    pub fn update_fps(&self, fps: u32) {
        Self::set_text(&self.fps, &fps.to_string());
    }

    pub fn hide_menu(&self) {
        Self::set_hidden(&self.menu_overlay, true);
    }

    pub fn show_menu(&self) {
        Self::set_hidden(&self.menu_overlay, false);
        Self::set_hidden(&self.replay_overlay, true);
    }

    /// Game-over summary; called exactly once per run
    pub fn show_game_over(&self, score: u32, phase: u8, elapsed_time: f32) {
        Self::set_text(&self.replay_score, &format!("Score: {}", score));
        Self::set_text(&self.replay_phase, &format!("Phase: {}", phase));
        Self::set_text(
            &self.replay_duration,
            &format!("Total Time: {}", format_mmss(elapsed_time)),
        );
        Self::set_hidden(&self.replay_overlay, false);
    }
}
