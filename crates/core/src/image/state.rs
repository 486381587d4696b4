//! Upload state machine.

/// Stage of a single upload request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadState {
    /// Request received, nothing done yet.
    Idle,
    /// Checking size and type.
    Validating,
    /// Rejected by validation. Terminal.
    Rejected,
    /// Calling the external endpoint.
    UploadingPrimary,
    /// Writing to the object store.
    UploadingFallback,
    /// Image stored. Terminal.
    Succeeded,
    /// Upload failed. Terminal.
    Failed,
}

impl UploadState {
    /// Whether no further transition is possible.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Rejected | Self::Succeeded | Self::Failed)
    }

    /// Whether `self -> next` is a legal transition.
    ///
    /// Validating may skip straight to the fallback when the external
    /// endpoint is disabled. UploadingPrimary fails directly only when the
    /// caller has no token.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Validating)
                | (
                    Self::Validating,
                    Self::Rejected | Self::UploadingPrimary | Self::UploadingFallback
                )
                | (
                    Self::UploadingPrimary,
                    Self::Succeeded | Self::UploadingFallback | Self::Failed
                )
                | (Self::UploadingFallback, Self::Succeeded | Self::Failed)
        )
    }
}
