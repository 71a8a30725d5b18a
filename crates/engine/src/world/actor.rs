use glam::Vec3;
use rand::Rng;

/// How long the avatar's own message stays overhead.
pub const AVATAR_SPEECH_SECONDS: f32 = 5.0;
/// NPC bubbles only show while the timer is above this.
pub const NPC_BUBBLE_VISIBLE_ABOVE_SECONDS: f32 = 2.0;
pub const NPC_CHATTER_MIN_SECONDS: f32 = 3.0;
pub const NPC_CHATTER_MAX_SECONDS: f32 = 5.0;
pub const AVATAR_LABEL_LIFT: f32 = 2.5;
pub const NPC_LABEL_LIFT: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorKind {
    Avatar,
    Npc,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Actor {
    kind: ActorKind,
    display_name: String,
    pub position: Vec3,
    speech_text: String,
    speech_timer: f32,
}

impl Actor {
    pub fn avatar(display_name: impl Into<String>, position: Vec3) -> Self {
        Self {
            kind: ActorKind::Avatar,
            display_name: display_name.into(),
            position,
            speech_text: String::new(),
            speech_timer: 0.0,
        }
    }

    /// NPCs keep a fixed line and only cycle its visibility.
    pub fn npc(display_name: impl Into<String>, position: Vec3, speech: impl Into<String>) -> Self {
        Self {
            kind: ActorKind::Npc,
            display_name: display_name.into(),
            position,
            speech_text: speech.into(),
            speech_timer: 0.0,
        }
    }

    pub fn kind(&self) -> ActorKind {
        self.kind
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn speech_text(&self) -> &str {
        &self.speech_text
    }

    pub fn speech_timer(&self) -> f32 {
        self.speech_timer
    }

    pub fn set_speech_timer(&mut self, seconds: f32) {
        self.speech_timer = seconds;
    }

    pub fn say(&mut self, text: impl Into<String>, seconds: f32) {
        self.speech_text = text.into();
        self.speech_timer = seconds;
    }

    pub fn bubble_visible(&self) -> bool {
        match self.kind {
            ActorKind::Avatar => self.speech_timer > 0.0,
            ActorKind::Npc => self.speech_timer > NPC_BUBBLE_VISIBLE_ABOVE_SECONDS,
        }
    }

    /// World point the speech label is drawn above.
    pub fn label_anchor(&self) -> Vec3 {
        let lift = match self.kind {
            ActorKind::Avatar => AVATAR_LABEL_LIFT,
            ActorKind::Npc => NPC_LABEL_LIFT,
        };
        self.position + Vec3::new(0.0, lift, 0.0)
    }

    /// Advances the speech countdown by one tick.
    ///
    /// The avatar's bubble is cleared once its timer runs out. An NPC whose timer is
    /// spent is rearmed to a random interval in `[3, 5)` seconds instead.
    pub fn tick_speech<R: Rng + ?Sized>(&mut self, dt_seconds: f32, rng: &mut R) {
        match self.kind {
            ActorKind::Avatar => {
                if self.speech_timer <= 0.0 {
                    return;
                }
                self.speech_timer -= dt_seconds;
                if self.speech_timer <= 0.0 {
                    self.speech_timer = 0.0;
                    self.speech_text.clear();
                }
            }
            ActorKind::Npc => {
                if self.speech_timer > 0.0 {
                    self.speech_timer -= dt_seconds;
                } else {
                    self.speech_timer =
                        rng.gen_range(NPC_CHATTER_MIN_SECONDS..NPC_CHATTER_MAX_SECONDS);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn shopkeeper() -> Actor {
        Actor::npc(
            "Shopkeeper",
            Vec3::new(5.0, 0.8, -1.0),
            "Selling 2 coal certs",
        )
    }

    #[test]
    fn npc_bubble_threshold_is_strictly_above_two_seconds() {
        let mut npc = shopkeeper();
        npc.set_speech_timer(2.0);
        assert!(!npc.bubble_visible());
        npc.set_speech_timer(2.0001);
        assert!(npc.bubble_visible());
    }

    #[test]
    fn avatar_bubble_hides_at_exactly_zero() {
        let mut avatar = Actor::avatar("UNNAMED", Vec3::ZERO);
        avatar.set_speech_timer(0.0);
        assert!(!avatar.bubble_visible());
        avatar.set_speech_timer(0.01);
        assert!(avatar.bubble_visible());
    }

    #[test]
    fn avatar_speech_clears_once_the_timer_runs_out() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut avatar = Actor::avatar("UNNAMED", Vec3::ZERO);
        avatar.say("hello", 0.04);

        avatar.tick_speech(0.016, &mut rng);
        avatar.tick_speech(0.016, &mut rng);
        assert_eq!(avatar.speech_text(), "hello");
        avatar.tick_speech(0.016, &mut rng);

        assert_eq!(avatar.speech_timer(), 0.0);
        assert!(avatar.speech_text().is_empty());
        assert!(!avatar.bubble_visible());
    }

    #[test]
    fn idle_avatar_timer_stays_at_zero() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut avatar = Actor::avatar("UNNAMED", Vec3::ZERO);
        avatar.tick_speech(0.016, &mut rng);
        assert_eq!(avatar.speech_timer(), 0.0);
    }

    #[test]
    fn spent_npc_timer_rearms_within_chatter_window() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            let mut npc = shopkeeper();
            npc.tick_speech(0.016, &mut rng);
            let armed = npc.speech_timer();
            assert!((NPC_CHATTER_MIN_SECONDS..NPC_CHATTER_MAX_SECONDS).contains(&armed));
        }
    }

    #[test]
    fn npc_timer_counts_down_then_rearms() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut npc = shopkeeper();
        npc.set_speech_timer(0.02);

        npc.tick_speech(0.016, &mut rng);
        assert!((npc.speech_timer() - 0.004).abs() < 1e-6);
        npc.tick_speech(0.016, &mut rng);
        assert!(npc.speech_timer() <= 0.0);
        npc.tick_speech(0.016, &mut rng);
        assert!(npc.speech_timer() >= NPC_CHATTER_MIN_SECONDS);
        assert_eq!(npc.speech_text(), "Selling 2 coal certs");
    }

    #[test]
    fn label_anchor_sits_higher_for_the_avatar() {
        let avatar = Actor::avatar("UNNAMED", Vec3::new(1.0, 0.8, 2.0));
        let npc = shopkeeper();
        assert!(avatar
            .label_anchor()
            .abs_diff_eq(Vec3::new(1.0, 3.3, 2.0), 1e-5));
        assert!(npc.label_anchor().abs_diff_eq(Vec3::new(5.0, 2.8, -1.0), 1e-5));
    }
}
