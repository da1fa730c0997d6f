use parking_lot::Mutex;

/// Where the cursor is and whether it is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CursorPosition {
    pub x: i32,
    pub y: i32,
    pub visible: bool,
}

impl CursorPosition {
    pub fn new(visible: bool, x: i32, y: i32) -> Self {
        Self { x, y, visible }
    }
}

/// Cursor position and visibility, updated as one unit.
///
/// The cursor image lives in the texture store and changes independently.
#[derive(Debug, Default)]
pub struct CursorState {
    position: Mutex<CursorPosition>,
}

impl CursorState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, visible: bool, x: i32, y: i32) {
        *self.position.lock() = CursorPosition::new(visible, x, y);
    }

    /// Consistent copy for one frame
    pub fn snapshot(&self) -> CursorPosition {
        *self.position.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn starts_hidden_at_origin() {
        let cursor = CursorState::new();
        assert_eq!(cursor.snapshot(), CursorPosition::new(false, 0, 0));
    }

    #[test]
    fn snapshots_never_mix_updates() {
        let cursor = Arc::new(CursorState::new());
        cursor.set(false, 1, -1);
        let writer = {
            let cursor = Arc::clone(&cursor);
            thread::spawn(move || {
                for i in 0..10_000 {
                    // Visible exactly when x == y, so a torn read would break the pairing
                    if i % 2 == 0 {
                        cursor.set(true, i, i);
                    } else {
                        cursor.set(false, i, -i);
                    }
                }
            })
        };

        for _ in 0..10_000 {
            let snap = cursor.snapshot();
            assert_eq!(snap.visible, snap.x == snap.y);
        }
        writer.join().unwrap();
    }
}
