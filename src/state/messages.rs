use crate::state::loader::LoadingState;
use crossterm::event::KeyEvent;
use padel_core::Association;

#[derive(Debug, Clone)]
pub enum DataRequest {
    /// Read the snapshot unconditionally.
    Load,
    /// Re-read the snapshot only if the file changed since the last load.
    Refresh,
}

#[derive(Debug)]
pub enum DataResponse {
    LoadingStateChanged { loading_state: LoadingState },
    Loaded { association: Box<Association>, source: String },
    Unchanged,
    Error { message: String },
}

#[derive(Debug, Clone)]
pub enum UiEvent {
    KeyPressed(KeyEvent),
    Resize,
    AppStarted,
    AnimationTick,
}
