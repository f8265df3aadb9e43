#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    MoveForward,
    MoveBackward,
    MoveLeft,
    MoveRight,
    Run,
    TurnLeft,
    TurnRight,
}

/// Discrete presses. Each one is visible in exactly one tick snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputEdge {
    Interact,
    Confirm,
    Pause,
    Restart,
    Back,
    DumpState,
}

const ACTION_COUNT: usize = 7;
const EDGE_COUNT: usize = 6;

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ActionStates {
    down: [bool; ACTION_COUNT],
}

impl ActionStates {
    pub(crate) fn set(&mut self, action: InputAction, is_down: bool) {
        self.down[action.index()] = is_down;
    }

    pub(crate) fn is_down(&self, action: InputAction) -> bool {
        self.down[action.index()]
    }
}

impl InputAction {
    const fn index(self) -> usize {
        match self {
            InputAction::MoveForward => 0,
            InputAction::MoveBackward => 1,
            InputAction::MoveLeft => 2,
            InputAction::MoveRight => 3,
            InputAction::Run => 4,
            InputAction::TurnLeft => 5,
            InputAction::TurnRight => 6,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct EdgeStates {
    pressed: [bool; EDGE_COUNT],
}

impl EdgeStates {
    pub(crate) fn mark(&mut self, edge: InputEdge) {
        self.pressed[edge.index()] = true;
    }

    pub(crate) fn was_pressed(&self, edge: InputEdge) -> bool {
        self.pressed[edge.index()]
    }
}

impl InputEdge {
    const fn index(self) -> usize {
        match self {
            InputEdge::Interact => 0,
            InputEdge::Confirm => 1,
            InputEdge::Pause => 2,
            InputEdge::Restart => 3,
            InputEdge::Back => 4,
            InputEdge::DumpState => 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_states_track_each_action_independently() {
        let mut states = ActionStates::default();
        states.set(InputAction::MoveForward, true);
        states.set(InputAction::Run, true);
        states.set(InputAction::Run, false);

        assert!(states.is_down(InputAction::MoveForward));
        assert!(!states.is_down(InputAction::Run));
        assert!(!states.is_down(InputAction::TurnRight));
    }

    #[test]
    fn edge_states_only_report_marked_edges() {
        let mut edges = EdgeStates::default();
        edges.mark(InputEdge::Interact);

        assert!(edges.was_pressed(InputEdge::Interact));
        assert!(!edges.was_pressed(InputEdge::Restart));
    }
}
