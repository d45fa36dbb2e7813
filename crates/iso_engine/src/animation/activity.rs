//! Backend activity names to animation states

use super::state_machine::AnimationState;

/// Pick the resting animation for a backend activity name
///
/// Matching is case-insensitive; unknown or missing activities idle.
pub fn activity_to_state(activity: Option<&str>) -> AnimationState {
    let Some(activity) = activity else {
        return AnimationState::Idle;
    };
    match activity.trim().to_ascii_lowercase().as_str() {
        "work" | "working" | "study" | "studying" => AnimationState::Working,
        "socialize" | "socializing" | "chat" | "chatting" | "in_conversation" => AnimationState::Chatting,
        "move" | "moving" | "walk" | "walking" => AnimationState::Walking,
        _ => AnimationState::Idle,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_activities() {
        assert_eq!(activity_to_state(Some("work")), AnimationState::Working);
        assert_eq!(activity_to_state(Some("Study")), AnimationState::Working);
        assert_eq!(activity_to_state(Some("socialize")), AnimationState::Chatting);
        assert_eq!(activity_to_state(Some("moving")), AnimationState::Walking);
    }

    #[test]
    fn test_everything_else_idles() {
        assert_eq!(activity_to_state(Some("sleep")), AnimationState::Idle);
        assert_eq!(activity_to_state(Some("")), AnimationState::Idle);
        assert_eq!(activity_to_state(None), AnimationState::Idle);
    }
}
