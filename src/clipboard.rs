/// System clipboard access for the CSV export action.

use arboard::Clipboard;

use crate::model::WxError;

/// Write `text` to the system clipboard verbatim. Opens a fresh clipboard
/// handle per call.
pub fn copy_text(text: &str) -> Result<(), WxError> {
    let mut clipboard = Clipboard::new().map_err(|e| WxError::Clipboard(e.to_string()))?;
    clipboard
        .set_text(text.to_string())
        .map_err(|e| WxError::Clipboard(e.to_string()))
}
