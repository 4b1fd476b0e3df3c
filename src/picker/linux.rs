// =============================================================================
// COLOR PICKER - VERSION LINUX
// =============================================================================
// Non implémenté: ni capture ni overlay
// Not implemented: neither capture nor overlay
// =============================================================================

use crate::common::Color;
use crate::config::PickerConfig;
use crate::error::PickError;
use crate::geometry::ScreenPoint;
use crate::picker::session::PickOutcome;

pub fn run(_config: &PickerConfig) -> Result<PickOutcome, PickError> {
    Err(PickError::Unsupported("screen color picking"))
}

pub fn capture_point(_at: Option<ScreenPoint>, _config: &PickerConfig) -> Result<Color, PickError> {
    Err(PickError::Unsupported("screen capture"))
}
