/// Discrete input accepted by [`GameSession::handle_command`](crate::GameSession::handle_command).
///
/// Commands that mean nothing in the current state are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    MoveLeft,
    MoveRight,
    SoftDrop,
    /// Rotate clockwise, with wall kicks.
    Rotate,
    HardDrop,
    Hold,
    TogglePause,
    ToggleGhost,
    ToggleDemo,
    OpenMenu,
    ManualRise,
    MenuNavigate(MenuDirection),
    MenuAdjust(MenuDirection),
    MenuConfirm,
    MenuCancel,
    Restart,
}

/// Direction for menu navigation and value adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuDirection {
    Previous,
    Next,
}

impl MenuDirection {
    #[must_use]
    pub fn is_forward(self) -> bool {
        self == Self::Next
    }
}
