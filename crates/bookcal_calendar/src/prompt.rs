/// Question asked before a dragged booking is written back.
pub const MOVE_CONFIRMATION: &str = "Voulez-vous vraiment déplacer ce rendez-vous ?";

/// A blocking yes/no question to the user.
#[cfg_attr(test, mockall::automock)]
pub trait ConfirmPrompt {
    fn confirm(&self, message: &str) -> bool;
}

/// Fixed answer, for scripted sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoAnswer(pub bool);

impl ConfirmPrompt for AutoAnswer {
    fn confirm(&self, _message: &str) -> bool {
        self.0
    }
}
