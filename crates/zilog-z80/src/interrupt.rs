//! Pending interrupt tracking.

/// Interrupt accepted at an instruction boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptKind {
    Nmi,
    /// Maskable interrupt with the byte read from the data bus.
    Maskable(u8),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InterruptController {
    irq_pending: bool,
    irq_data: u8,
    nmi_pending: bool,
    /// Set by `EI`; holds off maskable acceptance for one boundary.
    ei_delay: bool,
    /// Set after a prefix byte that ran on its own. Nothing is accepted
    /// until the instruction it prefixes has run.
    after_prefix: bool,
}

impl InterruptController {
    /// Raise INT. The request stays pending until accepted or cleared.
    pub fn request_irq(&mut self, data: u8) {
        self.irq_pending = true;
        self.irq_data = data;
    }

    pub fn clear_irq(&mut self) {
        self.irq_pending = false;
    }

    /// Latch an NMI edge.
    pub fn request_nmi(&mut self) {
        self.nmi_pending = true;
    }

    /// Called by `EI`.
    pub fn defer_one_instruction(&mut self) {
        self.ei_delay = true;
    }

    /// Called after a lone DD/FD prefix.
    pub fn hold_after_prefix(&mut self) {
        self.after_prefix = true;
    }

    #[must_use]
    pub fn irq_pending(&self) -> bool {
        self.irq_pending
    }

    #[must_use]
    pub fn nmi_pending(&self) -> bool {
        self.nmi_pending
    }

    /// Decide what, if anything, to accept at this instruction boundary.
    ///
    /// The EI latch is consumed by every boundary, whether or not anything
    /// is accepted. NMI ignores both IFF1 and the latch, but nothing is
    /// accepted straight after a prefix byte.
    pub fn poll(&mut self, iff1: bool) -> Option<InterruptKind> {
        let deferred = std::mem::take(&mut self.ei_delay);
        if std::mem::take(&mut self.after_prefix) {
            return None;
        }
        if self.nmi_pending {
            self.nmi_pending = false;
            return Some(InterruptKind::Nmi);
        }
        if self.irq_pending && iff1 && !deferred {
            self.irq_pending = false;
            return Some(InterruptKind::Maskable(self.irq_data));
        }
        None
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
