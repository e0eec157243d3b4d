//! Vertical scroll synchronisation between the label panel and the time grid.
//!
//! Each panel's scroll event writes the other panel's offset, skipped when
//! the two already match. That equality guard is what stops the write from
//! bouncing back and forth, and it only holds because every update runs
//! synchronously on the UI thread. A threaded shell would need a single
//! designated writer instead.

/// One of the two vertically scrolled surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Labels,
    Grid,
}

impl Panel {
    fn slot(self) -> usize {
        match self {
            Panel::Labels => 0,
            Panel::Grid => 1,
        }
    }

    pub fn other(self) -> Panel {
        match self {
            Panel::Labels => Panel::Grid,
            Panel::Grid => Panel::Labels,
        }
    }
}

/// Last known offsets plus writes not yet applied by the shell.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScrollSync {
    offsets: [f32; 2],
    pending: [Option<f32>; 2],
}

impl ScrollSync {
    pub fn offset(&self, panel: Panel) -> f32 {
        self.offsets[panel.slot()]
    }

    /// Handle a scroll event from `panel`. Returns whether the other panel
    /// was written.
    pub fn on_scroll(&mut self, panel: Panel, offset: f32) -> bool {
        self.offsets[panel.slot()] = offset;
        let other = panel.other().slot();
        if self.offsets[other] == offset {
            return false;
        }
        self.offsets[other] = offset;
        self.pending[other] = Some(offset);
        true
    }

    /// Report the offset a panel ended up at this frame. Only a change from
    /// the last known value counts as a scroll event.
    ///
    /// A panel with a write still pending has not drawn at its new offset
    /// yet, so its report is stale and ignored.
    pub fn observe(&mut self, panel: Panel, offset: f32) -> bool {
        if self.pending[panel.slot()].is_some() {
            return false;
        }
        if self.offsets[panel.slot()] == offset {
            return false;
        }
        self.on_scroll(panel, offset)
    }

    /// Programmatic navigation: write both panels directly instead of relying
    /// on the propagated event alone.
    pub fn scroll_both_to(&mut self, offset: f32) {
        let offset = offset.max(0.0);
        for slot in 0..2 {
            self.offsets[slot] = offset;
            self.pending[slot] = Some(offset);
        }
    }

    /// Offset the shell must apply to `panel` before drawing it, if any.
    pub fn take_pending(&mut self, panel: Panel) -> Option<f32> {
        self.pending[panel.slot()].take()
    }

    pub fn has_pending(&self) -> bool {
        self.pending.iter().any(Option::is_some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scroll_writes_the_other_panel_once() {
        let mut sync = ScrollSync::default();
        assert!(sync.on_scroll(Panel::Grid, 120.0));
        assert_eq!(sync.take_pending(Panel::Labels), Some(120.0));
        assert_eq!(sync.take_pending(Panel::Grid), None);

        // The label panel now reports the mirrored offset: no write back.
        assert!(!sync.observe(Panel::Labels, 120.0));
        assert!(!sync.has_pending());
    }

    #[test]
    fn equal_offsets_skip_the_write() {
        let mut sync = ScrollSync::default();
        assert!(!sync.on_scroll(Panel::Labels, 0.0));
        assert!(!sync.has_pending());
    }

    #[test]
    fn clamped_echo_converges() {
        let mut sync = ScrollSync::default();
        sync.on_scroll(Panel::Labels, 500.0);
        sync.take_pending(Panel::Grid);
        // The grid could only scroll to 480; that echo moves the labels once.
        assert!(sync.observe(Panel::Grid, 480.0));
        assert_eq!(sync.take_pending(Panel::Labels), Some(480.0));
        assert!(!sync.observe(Panel::Labels, 480.0));
        assert_eq!(sync.offset(Panel::Labels), sync.offset(Panel::Grid));
    }

    #[test]
    fn navigation_writes_both() {
        let mut sync = ScrollSync::default();
        sync.scroll_both_to(-40.0);
        assert_eq!(sync.take_pending(Panel::Labels), Some(0.0));
        assert_eq!(sync.take_pending(Panel::Grid), Some(0.0));

        sync.scroll_both_to(360.0);
        assert_eq!(sync.offset(Panel::Labels), 360.0);
        assert_eq!(sync.offset(Panel::Grid), 360.0);
        assert!(!sync.observe(Panel::Grid, 360.0));
    }

    #[test]
    fn stale_report_from_the_other_panel_is_ignored() {
        let mut sync = ScrollSync::default();
        // One frame: the labels were scrolled, the grid still shows 0.
        assert!(sync.observe(Panel::Labels, 50.0));
        assert!(!sync.observe(Panel::Grid, 0.0));
        assert_eq!(sync.take_pending(Panel::Labels), None);
        assert_eq!(sync.offset(Panel::Labels), 50.0);

        // Next frame the grid applies the write and reports it back.
        assert_eq!(sync.take_pending(Panel::Grid), Some(50.0));
        assert!(!sync.observe(Panel::Labels, 50.0));
        assert!(!sync.observe(Panel::Grid, 50.0));
        assert!(!sync.has_pending());
        assert_eq!(sync.offset(Panel::Grid), 50.0);
    }

    #[test]
    fn frames_driven_like_the_shell_never_oscillate() {
        let mut sync = ScrollSync::default();
        let mut shown = [0.0_f32; 2];
        let panels = [Panel::Labels, Panel::Grid];
        // The user drags the labels on frames 0 to 2, then lets go.
        let drags = [Some(30.0), Some(60.0), Some(90.0), None, None, None];

        let mut label_history = Vec::new();
        for drag in drags {
            for (slot, panel) in panels.into_iter().enumerate() {
                if let Some(offset) = sync.take_pending(panel) {
                    shown[slot] = offset;
                }
            }
            if let Some(offset) = drag {
                shown[0] = offset;
            }
            for (slot, panel) in panels.into_iter().enumerate() {
                sync.observe(panel, shown[slot]);
            }
            label_history.push(shown[0]);
        }

        assert_eq!(label_history, vec![30.0, 60.0, 90.0, 90.0, 90.0, 90.0]);
        assert_eq!(shown, [90.0, 90.0]);
        assert!(!sync.has_pending());
    }
}
