use crate::edit::EditKind;

/// Notifications emitted by the editor context
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    /// A new displayed image was prepared (load, undo/redo or edit result)
    ImageLoaded {
        image_id: usize,
        width: u32,
        height: u32,
    },
    HistoryMoved {
        cursor: usize,
        len: usize,
    },
    /// A stroke gesture finished and the mask was exported
    MaskUpdated {
        image_id: usize,
        selected_pixels: usize,
    },
    EditStarted {
        kind: EditKind,
    },
    EditCompleted {
        image_id: usize,
        version: usize,
    },
    EditFailed {
        message: String,
    },
}
