use thiserror::Error;

#[derive(Debug, Error)]
pub enum EffectError {
    /// A handler's state cell disappeared before its region finished.
    #[error("{effect} handler lost its state")]
    MissingState { effect: &'static str },
}

impl EffectError {
    pub fn missing_state(effect: &'static str) -> Self {
        EffectError::MissingState { effect }
    }
}
